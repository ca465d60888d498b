use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{ContactInbox, ContactMessage, Participant};
use super::gateway::LeadGateway;
use super::service::{LeadService, LeadServiceError};
use crate::catalog::domain::ItemId;
use crate::catalog::repository::CatalogReader;

/// Router for quote requests and the public contact form.
pub fn lead_router<C, I, L>(service: Arc<LeadService<C, I, L>>) -> Router
where
    C: CatalogReader + 'static,
    I: ContactInbox + 'static,
    L: LeadGateway + 'static,
{
    Router::new()
        .route("/api/v1/items/:item_id/quote", post(quote_handler::<C, I, L>))
        .route("/api/v1/contact", post(contact_handler::<C, I, L>))
        .with_state(service)
}

pub(crate) async fn quote_handler<C, I, L>(
    State(service): State<Arc<LeadService<C, I, L>>>,
    Path(item_id): Path<u64>,
    axum::Json(participant): axum::Json<Participant>,
) -> Response
where
    C: CatalogReader + 'static,
    I: ContactInbox + 'static,
    L: LeadGateway + 'static,
{
    match service.request_quote(ItemId(item_id), participant).await {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn contact_handler<C, I, L>(
    State(service): State<Arc<LeadService<C, I, L>>>,
    axum::Json(message): axum::Json<ContactMessage>,
) -> Response
where
    C: CatalogReader + 'static,
    I: ContactInbox + 'static,
    L: LeadGateway + 'static,
{
    match service.contact(message).await {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: LeadServiceError) -> Response {
    match error {
        LeadServiceError::Invalid(errors) => {
            let payload = json!({
                "error": "invalid submission",
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        LeadServiceError::ItemNotFound(id) => {
            let payload = json!({
                "error": format!("item {id} not found"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
