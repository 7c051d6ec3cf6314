//! Page envelope and navigation link building.

use serde::Serialize;

use crate::query::{Page, PageMeta};

/// Navigation links for a page. `self` is always present; the rest only when
/// applicable for `(page, size, total_pages)`.
#[derive(Debug, Serialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// The wire shape for collection responses.
#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
    pub links: PageLinks,
}

/// Inputs for link building: the collection path plus the request's own
/// parameters, echoed into every generated link.
pub struct LinkParams<'a> {
    pub path: &'a str,
    pub q: Option<&'a str>,
    pub sort: Option<&'a str>,
}

fn href(params: &LinkParams<'_>, page: u32, size: u32) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(q) = params.q {
        query.append_pair("q", q);
    }
    query.append_pair("page", &page.to_string());
    query.append_pair("size", &size.to_string());
    if let Some(sort) = params.sort {
        query.append_pair("sort", sort);
    }
    format!("{}?{}", params.path, query.finish())
}

/// Compute navigation links deterministically from the page metadata.
pub fn page_links(params: &LinkParams<'_>, meta: &PageMeta) -> PageLinks {
    let at = |page: u32| href(params, page, meta.size);
    let pages = meta.total_pages;
    PageLinks {
        self_: at(meta.number),
        first: (pages > 0).then(|| at(0)),
        prev: (meta.number > 0).then(|| at(meta.number - 1)),
        next: ((meta.number as u64 + 1) < pages).then(|| at(meta.number + 1)),
        last: (pages > 0).then(|| at((pages - 1) as u32)),
    }
}

/// Wrap a page into its wire envelope, attaching links.
pub fn paged<T>(page: Page<T>, params: &LinkParams<'_>) -> PageBody<T> {
    let links = page_links(params, &page.meta);
    PageBody {
        content: page.content,
        page: page.meta,
        links,
    }
}
