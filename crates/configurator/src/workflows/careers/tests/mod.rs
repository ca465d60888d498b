use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crate::memory::RecordingGateway;
use crate::workflows::careers::{
    careers_router, CareersService, CareersServiceError, JobApplication, JobFilter, JobOpening,
};
use crate::workflows::leads::{ConfiguredGateway, ErpError};

fn opening(name: &str, designation: &str, territory: &str, status: &str) -> JobOpening {
    JobOpening {
        name: name.to_string(),
        designation: designation.to_string(),
        status: status.to_string(),
        territory: territory.to_string(),
        qualification: String::new(),
    }
}

fn board() -> Vec<JobOpening> {
    vec![
        opening("HR-OPN-0001", "Welder", "Pune", "Open"),
        opening("HR-OPN-0002", "Service Engineer", "Chennai", "Open"),
        opening("HR-OPN-0003", "Service Engineer", "Pune", "Open"),
        opening("HR-OPN-0004", "Draughtsman", "Delhi", "Closed"),
    ]
}

type TestService = CareersService<RecordingGateway>;

fn careers(gateway: RecordingGateway) -> (Arc<RecordingGateway>, Arc<TestService>) {
    let gateway = Arc::new(gateway);
    let service = Arc::new(CareersService::new(Arc::clone(&gateway)));
    (gateway, service)
}

fn application() -> JobApplication {
    JobApplication {
        applicant_name: " Priya Nair ".to_string(),
        job_title: "HR-OPN-0002".to_string(),
        designation: "Service Engineer".to_string(),
        email_id: "priya@example.com".to_string(),
        phone_number: "555-0123".to_string(),
        country: "India".to_string(),
        cover_letter: "Ten years of gearbox field service.".to_string(),
        lower_range: String::new(),
        upper_range: String::new(),
        resume_link: String::new(),
        source: "Website Listing".to_string(),
    }
}

fn names(jobs: &[JobOpening]) -> Vec<&str> {
    jobs.iter().map(|job| job.name.as_str()).collect()
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn listing_keeps_open_jobs_and_offers_filter_options() {
    let (_, service) = careers(RecordingGateway::accepting().with_openings(board()));
    let listing = service.openings(JobFilter::default()).await;

    assert!(listing.available);
    assert_eq!(
        names(&listing.jobs),
        vec!["HR-OPN-0001", "HR-OPN-0002", "HR-OPN-0003"]
    );
    assert_eq!(listing.designations, vec!["Service Engineer", "Welder"]);
    assert_eq!(listing.territories, vec!["Chennai", "Pune"]);
}

#[tokio::test]
async fn filters_combine_search_designation_and_territory() {
    let (_, service) = careers(RecordingGateway::accepting().with_openings(board()));

    let searched = service
        .openings(JobFilter {
            search: "ENGINEER".to_string(),
            ..JobFilter::default()
        })
        .await;
    assert_eq!(names(&searched.jobs), vec!["HR-OPN-0002", "HR-OPN-0003"]);

    let by_name = service
        .openings(JobFilter {
            search: "opn-0001".to_string(),
            ..JobFilter::default()
        })
        .await;
    assert_eq!(names(&by_name.jobs), vec!["HR-OPN-0001"]);

    let narrowed = service
        .openings(JobFilter {
            search: String::new(),
            designation: "Service Engineer".to_string(),
            territory: "Pune".to_string(),
        })
        .await;
    assert_eq!(names(&narrowed.jobs), vec!["HR-OPN-0003"]);
    assert_eq!(narrowed.territories, vec!["Chennai", "Pune"]);

    let closed_only = service
        .openings(JobFilter {
            territory: "Delhi".to_string(),
            ..JobFilter::default()
        })
        .await;
    assert!(closed_only.jobs.is_empty());
}

#[tokio::test]
async fn unreachable_erp_lists_nothing() {
    let (_, service) = careers(RecordingGateway::failing().with_openings(board()));
    let listing = service.openings(JobFilter::default()).await;

    assert!(!listing.available);
    assert!(listing.jobs.is_empty());
    assert!(listing.designations.is_empty());
}

#[tokio::test]
async fn job_detail_is_found_by_document_name() {
    let (_, service) = careers(RecordingGateway::accepting().with_openings(board()));
    let details = service.opening("HR-OPN-0003").await.expect("detail");
    assert_eq!(details.territory, "Pune");

    let missing = service.opening("HR-OPN-9999").await.expect_err("unknown job");
    assert!(matches!(missing, CareersServiceError::JobNotFound(name) if name == "HR-OPN-9999"));

    let (_, offline) = careers(RecordingGateway::failing().with_openings(board()));
    assert!(matches!(
        offline.opening("HR-OPN-0003").await,
        Err(CareersServiceError::JobNotFound(_))
    ));
}

#[tokio::test]
async fn application_is_trimmed_and_forwarded() {
    let (gateway, service) = careers(RecordingGateway::accepting());
    let receipt = service.apply(application()).await.expect("applied");

    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.applicant.as_deref(), Some("HR-APP-0001"));
    let sent = gateway.applications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].applicant_name, "Priya Nair");
}

#[tokio::test]
async fn failed_push_is_reported_to_the_applicant() {
    let (gateway, service) = careers(RecordingGateway::failing());
    let error = service.apply(application()).await.expect_err("erp down");
    assert!(matches!(error, CareersServiceError::Erp(ErpError::Transport(_))));
    assert_eq!(gateway.applications().len(), 1);

    let (_, rejecting) = careers(RecordingGateway::rejecting(417));
    let error = rejecting.apply(application()).await.expect_err("rejected");
    assert!(matches!(
        error,
        CareersServiceError::Erp(ErpError::Rejected { status: 417, .. })
    ));
}

#[tokio::test]
async fn invalid_application_never_reaches_the_erp() {
    let (gateway, service) = careers(RecordingGateway::accepting());
    let error = service
        .apply(JobApplication {
            email_id: String::new(),
            ..application()
        })
        .await
        .expect_err("email required");
    assert!(matches!(error, CareersServiceError::Invalid(_)));
    assert!(gateway.applications().is_empty());
}

#[tokio::test]
async fn routes_map_filters_and_failures() {
    let (_, service) = careers(RecordingGateway::accepting().with_openings(board()));
    let router = careers_router(service);

    let listed = router
        .clone()
        .oneshot(
            Request::get("/api/v1/careers?qualification=Welder&location=Pune")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = read_json_body(listed).await;
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["jobs"][0]["name"], "HR-OPN-0001");

    let missing = router
        .clone()
        .oneshot(
            Request::get("/api/v1/careers/jobs/HR-OPN-0004X")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let invalid = router
        .oneshot(
            Request::post("/api/v1/careers/apply")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&JobApplication {
                        source: "Billboard".to_string(),
                        ..application()
                    })
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(invalid).await;
    assert!(body["fields"]["source"][0]
        .as_str()
        .is_some_and(|message| message.contains("Billboard")));

    let (_, failing) = careers(RecordingGateway::failing());
    let failed = careers_router(failing)
        .oneshot(
            Request::post("/api/v1/careers/apply")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&application()).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn disabled_erp_turns_applications_away() {
    let service = Arc::new(CareersService::new(Arc::new(ConfiguredGateway::Disabled)));
    let router = careers_router(Arc::clone(&service));

    let response = router
        .oneshot(
            Request::post("/api/v1/careers/apply")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&application()).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!service.openings(JobFilter::default()).await.available);
}
