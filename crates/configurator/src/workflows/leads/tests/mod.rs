use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::catalog::domain::{GroupId, Item, ItemId, ProductGroup};
use crate::catalog::repository::CatalogWriter;
use crate::config::ErpConfig;
use crate::memory::{InMemoryCatalog, InMemoryContactInbox, RecordingGateway};
use crate::workflows::leads::{
    lead_router, ContactMessage, LeadDispatcher, LeadPushStatus, LeadService, LeadServiceError,
    Participant,
};

type TestService = LeadService<InMemoryCatalog, InMemoryContactInbox, RecordingGateway>;

struct Harness {
    inbox: Arc<InMemoryContactInbox>,
    gateway: Arc<RecordingGateway>,
    service: Arc<TestService>,
}

fn harness(gateway: RecordingGateway) -> Harness {
    let catalog = InMemoryCatalog::new();
    catalog
        .save_group(ProductGroup::named(GroupId(1), "Gearboxes"))
        .expect("group");
    for (id, name, active) in [(1, "Gear <X>", true), (2, "Retired Gear", false)] {
        catalog
            .save_item(Item {
                is_active: active,
                ..Item::new(ItemId(id), GroupId(1), name)
            })
            .expect("item");
    }

    let inbox = Arc::new(InMemoryContactInbox::new());
    let gateway = Arc::new(gateway);
    let dispatcher = Arc::new(LeadDispatcher::new(
        Arc::clone(&gateway),
        ErpConfig::default(),
    ));
    let service = Arc::new(LeadService::new(
        Arc::new(catalog),
        Arc::clone(&inbox),
        dispatcher,
    ));
    Harness {
        inbox,
        gateway,
        service,
    }
}

fn participant() -> Participant {
    Participant {
        name: "Dana Buyer".to_string(),
        email: "dana@example.com".to_string(),
        phone: "555-0100".to_string(),
        designation: String::new(),
        company: "Acme Mills".to_string(),
    }
}

fn message() -> ContactMessage {
    ContactMessage {
        name: "Lee".to_string(),
        email: "lee@example.com".to_string(),
        phone: "555-0199".to_string(),
        subject: "Gear ratios".to_string(),
        message: "Please call back.".to_string(),
        state: String::new(),
        contact_person: String::new(),
        contact_number: String::new(),
        remark: String::new(),
    }
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn quote_request_pushes_escaped_item_name() {
    let harness = harness(RecordingGateway::accepting());
    let receipt = harness
        .service
        .request_quote(ItemId(1), participant())
        .await
        .expect("quote");

    assert_eq!(receipt.erp, LeadPushStatus::Pushed { status: 201 });
    let payloads = harness.gateway.payloads();
    let html = payloads[0]
        .interested_product
        .as_deref()
        .expect("html table");
    assert!(html.contains("<td>Gear &lt;X&gt;</td>"));
    assert!(payloads[0].status.is_none());
}

#[tokio::test]
async fn quote_for_inactive_item_is_not_found() {
    let harness = harness(RecordingGateway::accepting());
    let error = harness
        .service
        .request_quote(ItemId(2), participant())
        .await
        .expect_err("inactive item");
    assert!(matches!(error, LeadServiceError::ItemNotFound(ItemId(2))));
    assert!(harness.gateway.payloads().is_empty());
}

#[tokio::test]
async fn contact_message_is_stored_even_when_push_fails() {
    let harness = harness(RecordingGateway::rejecting(500));
    let receipt = harness.service.contact(message()).await.expect("contact");

    assert_eq!(receipt.erp, LeadPushStatus::Rejected { status: 500 });
    let records = harness.inbox.records().expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, receipt.message_id);
    assert_eq!(
        harness.gateway.payloads()[0].remark.as_deref(),
        Some("Please call back.")
    );
}

#[tokio::test]
async fn invalid_contact_message_is_not_stored() {
    let harness = harness(RecordingGateway::accepting());
    let error = harness
        .service
        .contact(ContactMessage {
            email: String::new(),
            ..message()
        })
        .await
        .expect_err("email required");
    assert!(matches!(error, LeadServiceError::Invalid(_)));
    assert!(harness.inbox.records().expect("records").is_empty());
}

#[tokio::test]
async fn routes_map_errors_to_status_codes() {
    let harness = harness(RecordingGateway::accepting());
    let router = lead_router(Arc::clone(&harness.service));

    let accepted = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/items/1/quote")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&participant()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::ACCEPTED);
    let body = read_json_body(accepted).await;
    assert_eq!(body["erp"]["outcome"], "pushed");

    let missing = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/items/99/quote")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&participant()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let invalid = router
        .oneshot(
            axum::http::Request::post("/api/v1/contact")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({
                        "name": "Lee",
                        "email": "lee@example.com",
                        "message": ""
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(invalid).await;
    assert_eq!(body["fields"]["message"][0], "This field is required.");
}
