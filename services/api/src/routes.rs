use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use configurator::catalog::catalog_router;
use configurator::workflows::builder::builder_router;
use configurator::workflows::careers::{careers_router, CareersGateway};
use configurator::workflows::leads::{lead_router, LeadGateway};
use configurator::workflows::quiz::quiz_router;

/// Every public endpoint plus the health, readiness and metrics endpoints.
pub(crate) fn with_configurator_routes<L>(services: &Services<L>) -> axum::Router
where
    L: LeadGateway + CareersGateway + 'static,
{
    quiz_router(services.quiz.clone())
        .merge(builder_router(services.builder.clone()))
        .merge(lead_router(services.leads.clone()))
        .merge(careers_router(services.careers.clone()))
        .merge(catalog_router(services.catalog.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::demo_catalog;
    use configurator::config::ErpConfig;
    use configurator::memory::RecordingGateway;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(ready: bool) -> axum::Router {
        let demo = demo_catalog().expect("demo catalog");
        let services = Services::new(
            Arc::new(demo.catalog),
            Arc::new(RecordingGateway::accepting()),
            ErpConfig::default(),
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_configurator_routes(&services).layer(Extension(state))
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                axum::http::Request::get(uri)
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (status, body) = get(router(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (status, body) = get(router(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, _) = get(router(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn merged_router_serves_menu_and_quiz() {
        let (status, menu) = get(router(true), "/api/product-menu").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = menu["groups"]
            .as_array()
            .expect("groups")
            .iter()
            .filter_map(|group| group["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Gearboxes", "Motors"]);

        let (status, form) = get(router(true), "/api/v1/quiz/gearboxes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["fields"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn merged_router_serves_the_job_board() {
        let (status, listing) = get(router(true), "/api/v1/careers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["available"], true);
        assert_eq!(listing["jobs"].as_array().map(Vec::len), Some(0));
    }
}
