use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{JobApplication, JobFilter};
use super::gateway::CareersGateway;
use super::service::{CareersService, CareersServiceError};
use crate::workflows::leads::ErpError;

/// Router for the job listing, job detail and application endpoints.
pub fn careers_router<G>(service: Arc<CareersService<G>>) -> Router
where
    G: CareersGateway + 'static,
{
    Router::new()
        .route("/api/v1/careers", get(listing_handler::<G>))
        .route("/api/v1/careers/jobs/:name", get(job_handler::<G>))
        .route("/api/v1/careers/apply", post(apply_handler::<G>))
        .with_state(service)
}

pub(crate) async fn listing_handler<G>(
    State(service): State<Arc<CareersService<G>>>,
    Query(filter): Query<JobFilter>,
) -> Response
where
    G: CareersGateway + 'static,
{
    axum::Json(service.openings(filter).await).into_response()
}

pub(crate) async fn job_handler<G>(
    State(service): State<Arc<CareersService<G>>>,
    Path(name): Path<String>,
) -> Response
where
    G: CareersGateway + 'static,
{
    match service.opening(&name).await {
        Ok(details) => axum::Json(details).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<G>(
    State(service): State<Arc<CareersService<G>>>,
    axum::Json(application): axum::Json<JobApplication>,
) -> Response
where
    G: CareersGateway + 'static,
{
    match service.apply(application).await {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CareersServiceError) -> Response {
    let status = match &error {
        CareersServiceError::Invalid(errors) => {
            let payload = json!({
                "error": "invalid submission",
                "fields": errors,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
        CareersServiceError::JobNotFound(_) => StatusCode::NOT_FOUND,
        CareersServiceError::Erp(ErpError::Disabled) => StatusCode::SERVICE_UNAVAILABLE,
        CareersServiceError::Erp(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
