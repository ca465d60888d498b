use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::form::RawSelections;
use super::repository::{SessionId, SessionStore};
use super::service::{QuizService, QuizServiceError};
use crate::catalog::domain::ItemId;
use crate::catalog::repository::{CatalogReader, ImpactReader};
use crate::workflows::leads::{LeadGateway, Participant};

/// Contact step body: participant fields plus the items they ticked.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(default)]
    pub interested_items: Vec<ItemId>,
}

/// Router exposing the quiz form, submission, results and contact step.
pub fn quiz_router<C, S, L>(service: Arc<QuizService<C, S, L>>) -> Router
where
    C: CatalogReader + ImpactReader + 'static,
    S: SessionStore + 'static,
    L: LeadGateway + 'static,
{
    Router::new()
        .route("/api/v1/quiz/:slug", get(form_handler::<C, S, L>))
        .route("/api/v1/quiz/:slug/answers", post(submit_handler::<C, S, L>))
        .route(
            "/api/v1/quiz/sessions/:session_id",
            get(result_handler::<C, S, L>),
        )
        .route(
            "/api/v1/quiz/sessions/:session_id/contact",
            post(contact_handler::<C, S, L>),
        )
        .with_state(service)
}

pub(crate) async fn form_handler<C, S, L>(
    State(service): State<Arc<QuizService<C, S, L>>>,
    Path(slug): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    C: CatalogReader + ImpactReader + 'static,
    S: SessionStore + 'static,
    L: LeadGateway + 'static,
{
    let raw: RawSelections = pairs.into_iter().collect();
    match service.form(&slug, &raw) {
        Ok(form) => (StatusCode::OK, axum::Json(form)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<C, S, L>(
    State(service): State<Arc<QuizService<C, S, L>>>,
    Path(slug): Path<String>,
    axum::Json(raw): axum::Json<RawSelections>,
) -> Response
where
    C: CatalogReader + ImpactReader + 'static,
    S: SessionStore + 'static,
    L: LeadGateway + 'static,
{
    match service.submit(&slug, &raw) {
        Ok(result) => (StatusCode::CREATED, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn result_handler<C, S, L>(
    State(service): State<Arc<QuizService<C, S, L>>>,
    Path(session_id): Path<u64>,
) -> Response
where
    C: CatalogReader + ImpactReader + 'static,
    S: SessionStore + 'static,
    L: LeadGateway + 'static,
{
    match service.result(SessionId(session_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn contact_handler<C, S, L>(
    State(service): State<Arc<QuizService<C, S, L>>>,
    Path(session_id): Path<u64>,
    axum::Json(request): axum::Json<ContactRequest>,
) -> Response
where
    C: CatalogReader + ImpactReader + 'static,
    S: SessionStore + 'static,
    L: LeadGateway + 'static,
{
    match service
        .submit_contact(
            SessionId(session_id),
            request.participant,
            request.interested_items,
        )
        .await
    {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: QuizServiceError) -> Response {
    match error {
        QuizServiceError::Invalid(errors) => {
            let payload = json!({
                "error": "invalid submission",
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        QuizServiceError::GroupNotFound(_) | QuizServiceError::SessionNotFound(_) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        other => {
            tracing::error!(error = %other, "quiz request failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
