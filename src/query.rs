//! Pagination, sorting, and filter predicates: validates request parameters,
//! drives store scans, and wraps results into typed pages.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::city::City;
use crate::error::AppError;
use crate::store::CityStore;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// One filter predicate. Each search endpoint maps to exactly one variant;
/// predicates are not composed.
#[derive(Debug, Clone)]
pub enum CityFilter {
    /// Exact name match, case-insensitive.
    NameEq(String),
    /// Substring of name, case-insensitive.
    NameContains(String),
    /// Exact state code.
    StateEq(String),
    /// Exact postal code.
    PostalCodeEq(String),
}

impl CityFilter {
    pub fn where_clause(&self) -> &'static str {
        match self {
            CityFilter::NameEq(_) => "lower(name) = lower(?)",
            CityFilter::NameContains(_) => "instr(lower(name), lower(?)) > 0",
            CityFilter::StateEq(_) => "state_code = ?",
            CityFilter::PostalCodeEq(_) => "postal_code = ?",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            CityFilter::NameEq(v)
            | CityFilter::NameContains(v)
            | CityFilter::StateEq(v)
            | CityFilter::PostalCodeEq(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    County,
    StateCode,
    PostalCode,
    Latitude,
    Longitude,
}

impl SortField {
    fn parse(s: &str) -> Option<SortField> {
        Some(match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "county" => SortField::County,
            "stateCode" => SortField::StateCode,
            "postalCode" => SortField::PostalCode,
            "latitude" => SortField::Latitude,
            "longitude" => SortField::Longitude,
            _ => return None,
        })
    }

    fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::County => "county",
            SortField::StateCode => "state_code",
            SortField::PostalCode => "postal_code",
            SortField::Latitude => "latitude",
            SortField::Longitude => "longitude",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Natural order: insertion order, i.e. id ascending.
    pub const NATURAL: SortSpec = SortSpec {
        field: SortField::Id,
        direction: SortDirection::Asc,
    };

    /// Parse `field` or `field,asc|desc` (API field names).
    pub fn parse(raw: &str) -> Result<SortSpec, AppError> {
        let (field_str, dir_str) = match raw.split_once(',') {
            Some((f, d)) => (f.trim(), Some(d.trim())),
            None => (raw.trim(), None),
        };
        let field = SortField::parse(field_str)
            .ok_or_else(|| AppError::BadRequest(format!("unknown sort field '{}'", field_str)))?;
        let direction = match dir_str {
            None => SortDirection::Asc,
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(AppError::BadRequest(format!(
                    "unknown sort direction '{}'",
                    other
                )))
            }
        };
        Ok(SortSpec { field, direction })
    }

    /// ORDER BY body, with a stable id tie-break for equal sort keys.
    pub fn order_clause(&self) -> String {
        let dir = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        if self.field == SortField::Id {
            format!("id {}", dir)
        } else {
            format!("{} {}, id ASC", self.field.column(), dir)
        }
    }
}

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<SortSpec>,
}

impl PageRequest {
    /// Parse raw query parameters. Bad page/size or an unknown sort field is
    /// a client error; an oversized page size is clamped.
    pub fn from_params(
        page: Option<&str>,
        size: Option<&str>,
        sort: Option<&str>,
    ) -> Result<PageRequest, AppError> {
        let page = match page {
            None => 0,
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| AppError::BadRequest("page must be a non-negative integer".into()))?,
        };
        let size = match size {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => {
                let n = raw
                    .parse::<u32>()
                    .map_err(|_| AppError::BadRequest("size must be a positive integer".into()))?;
                if n == 0 {
                    return Err(AppError::BadRequest("size must be a positive integer".into()));
                }
                n.min(MAX_PAGE_SIZE)
            }
        };
        let sort = sort.map(SortSpec::parse).transpose()?;
        Ok(PageRequest { page, size, sort })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
}

/// A bounded slice of a result set plus its pagination metadata.
#[derive(Debug)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub meta: PageMeta,
}

fn total_pages(total_elements: u64, size: u32) -> u64 {
    total_elements.div_ceil(size as u64)
}

pub struct QueryEngine;

impl QueryEngine {
    /// Run count + scan in one transaction so the page and its total come
    /// from a consistent snapshot. A page index beyond the last page yields
    /// an empty page.
    pub async fn fetch_page(
        pool: &SqlitePool,
        filter: Option<&CityFilter>,
        req: &PageRequest,
    ) -> Result<Page<City>, AppError> {
        let sort = req.sort.unwrap_or(SortSpec::NATURAL);
        let limit = req.size as i64;
        let offset = req.page as i64 * req.size as i64;

        let mut tx = pool.begin().await?;
        let total = CityStore::count(&mut *tx, filter).await? as u64;
        let content = CityStore::scan(&mut *tx, filter, sort, limit, offset).await?;
        tx.commit().await?;

        Ok(Page {
            content,
            meta: PageMeta {
                size: req.size,
                total_elements: total,
                total_pages: total_pages(total, req.size),
                number: req.page,
            },
        })
    }
}
