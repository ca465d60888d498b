use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::facets::FacetSelection;
use super::service::{BuilderError, BuilderService};
use crate::catalog::domain::ItemId;
use crate::catalog::repository::CatalogReader;

/// Router for the variant builder of one item.
pub fn builder_router<C>(service: Arc<BuilderService<C>>) -> Router
where
    C: CatalogReader + 'static,
{
    Router::new()
        .route(
            "/api/v1/builder/:slug/:item_id",
            get(facets_handler::<C>).post(matches_handler::<C>),
        )
        .with_state(service)
}

pub(crate) async fn facets_handler<C>(
    State(service): State<Arc<BuilderService<C>>>,
    Path((slug, item_id)): Path<(String, u64)>,
) -> Response
where
    C: CatalogReader + 'static,
{
    match service.facets(&slug, ItemId(item_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matches_handler<C>(
    State(service): State<Arc<BuilderService<C>>>,
    Path((slug, item_id)): Path<(String, u64)>,
    axum::Json(selection): axum::Json<FacetSelection>,
) -> Response
where
    C: CatalogReader + 'static,
{
    match service.matches(&slug, ItemId(item_id), selection) {
        Ok(matches) => (StatusCode::OK, axum::Json(matches)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: BuilderError) -> Response {
    let status = match error {
        BuilderError::GroupNotFound(_) | BuilderError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        BuilderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
