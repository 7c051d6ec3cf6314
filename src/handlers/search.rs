//! Search endpoints: one filter predicate each, plus the search directory.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::city::City;
use crate::error::AppError;
use crate::query::{CityFilter, PageRequest, QueryEngine};
use crate::response::{paged, LinkParams, PageBody};
use crate::state::AppState;

pub const SEARCH_PATH: &str = "/cities/search";

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
}

/// Directory of available search link relations, so a client can navigate
/// without hardcoding filter endpoint paths.
pub async fn directory() -> Json<serde_json::Value> {
    Json(json!({
        "links": {
            "self": SEARCH_PATH,
            "name": format!("{}/name", SEARCH_PATH),
            "nameContains": format!("{}/nameContains", SEARCH_PATH),
            "state": format!("{}/state", SEARCH_PATH),
            "postalCode": format!("{}/postalCode", SEARCH_PATH),
        }
    }))
}

fn required_q(params: &SearchParams) -> Result<String, AppError> {
    params
        .q
        .clone()
        .ok_or_else(|| AppError::BadRequest("missing required parameter 'q'".into()))
}

async fn run_search(
    state: &AppState,
    path: &'static str,
    filter: CityFilter,
    params: &SearchParams,
) -> Result<Json<PageBody<City>>, AppError> {
    let req = PageRequest::from_params(
        params.page.as_deref(),
        params.size.as_deref(),
        params.sort.as_deref(),
    )?;
    let page = QueryEngine::fetch_page(&state.pool, Some(&filter), &req).await?;
    let link_params = LinkParams {
        path,
        q: Some(filter.value()),
        sort: params.sort.as_deref(),
    };
    Ok(Json(paged(page, &link_params)))
}

pub async fn by_name(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PageBody<City>>, AppError> {
    let q = required_q(&params)?;
    run_search(&state, "/cities/search/name", CityFilter::NameEq(q), &params).await
}

pub async fn by_name_contains(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PageBody<City>>, AppError> {
    let q = required_q(&params)?;
    run_search(
        &state,
        "/cities/search/nameContains",
        CityFilter::NameContains(q),
        &params,
    )
    .await
}

pub async fn by_state(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PageBody<City>>, AppError> {
    let q = required_q(&params)?;
    run_search(&state, "/cities/search/state", CityFilter::StateEq(q), &params).await
}

pub async fn by_postal_code(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PageBody<City>>, AppError> {
    let q = required_q(&params)?;
    run_search(
        &state,
        "/cities/search/postalCode",
        CityFilter::PostalCodeEq(q),
        &params,
    )
    .await
}
