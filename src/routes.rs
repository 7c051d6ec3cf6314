//! Router assembly: common routes, the collection, and its search endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::handlers::{cities, search};
use crate::state::AppState;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthBody>, (axum::http::StatusCode, Json<HealthBody>)> {
    if sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_err() {
        return Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(HealthBody {
        status: "ok",
        database: Some("ok"),
    }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Directory of top-level link relations.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "links": {
            "self": "/",
            "cities": cities::COLLECTION_PATH,
            "search": search::SEARCH_PATH,
        }
    }))
}

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/cities", get(cities::list).post(cities::create))
        .route("/cities/search", get(search::directory))
        .route("/cities/search/name", get(search::by_name))
        .route("/cities/search/nameContains", get(search::by_name_contains))
        .route("/cities/search/state", get(search::by_state))
        .route("/cities/search/postalCode", get(search::by_postal_code))
        .route(
            "/cities/:id",
            get(cities::read).put(cities::update).delete(cities::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
