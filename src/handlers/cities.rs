//! City CRUD handlers: list, create, read, update, delete.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::city::{City, CityDraft};
use crate::error::AppError;
use crate::query::{PageRequest, QueryEngine};
use crate::response::{paged, LinkParams, PageBody};
use crate::state::AppState;
use crate::store::CityStore;

pub const COLLECTION_PATH: &str = "/cities";

#[derive(Deserialize)]
pub struct ListParams {
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageBody<City>>, AppError> {
    let req = PageRequest::from_params(
        params.page.as_deref(),
        params.size.as_deref(),
        params.sort.as_deref(),
    )?;
    let page = QueryEngine::fetch_page(&state.pool, None, &req).await?;
    let link_params = LinkParams {
        path: COLLECTION_PATH,
        q: None,
        sort: params.sort.as_deref(),
    };
    Ok(Json(paged(page, &link_params)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<CityDraft>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    draft.validate()?;
    let city = CityStore::create(&state.pool, &draft).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let city = CityStore::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("city {}", id)))?;
    Ok(Json(city))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(draft): Json<CityDraft>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    draft.validate()?;
    let city = CityStore::update(&state.pool, id, &draft)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("city {}", id)))?;
    Ok(Json(city))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    if !CityStore::delete(&state.pool, id).await? {
        return Err(AppError::NotFound(format!("city {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
