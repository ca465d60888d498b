use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::menu::product_menu;
use super::repository::CatalogReader;

/// Router exposing read-only catalog navigation.
pub fn catalog_router<C>(catalog: Arc<C>) -> Router
where
    C: CatalogReader + 'static,
{
    Router::new()
        .route("/api/product-menu", get(product_menu_handler::<C>))
        .with_state(catalog)
}

pub(crate) async fn product_menu_handler<C>(State(catalog): State<Arc<C>>) -> Response
where
    C: CatalogReader + 'static,
{
    match product_menu(catalog.as_ref()) {
        Ok(menu) => (StatusCode::OK, axum::Json(menu)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
