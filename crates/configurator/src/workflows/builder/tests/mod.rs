use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::catalog::domain::{
    GroupId, Item, ItemId, ItemVariant, ProductGroup, VariantId, VariantSpec,
};
use crate::catalog::repository::CatalogWriter;
use crate::memory::InMemoryCatalog;
use crate::workflows::builder::{builder_router, BuilderError, BuilderService, FacetSelection};

fn service() -> Arc<BuilderService<InMemoryCatalog>> {
    let catalog = InMemoryCatalog::new();
    catalog
        .save_group(ProductGroup::named(GroupId(1), "Gear Motors"))
        .expect("group");
    catalog
        .save_group(ProductGroup::named(GroupId(2), "Pumps"))
        .expect("other group");
    catalog
        .save_item(Item {
            item_code: Some("HX".to_string()),
            ..Item::new(ItemId(10), GroupId(1), "Helical")
        })
        .expect("item");

    let variants = [
        (100, "HX-15", true, vec![("Power", "1.5", "kW"), ("Mounting", "Foot", "")]),
        (101, "HX-30F", true, vec![("Power", "3", "kW"), ("Mounting", "Flange", "")]),
        (102, "HX-30", true, vec![("Power", "3", "kW"), ("Mounting", "Foot", "")]),
        (103, "HX-55", false, vec![("Power", "5.5", "kW"), ("Mounting", "Foot", "")]),
    ];
    for (id, name, active, specs) in variants {
        catalog
            .save_variant(ItemVariant {
                id: VariantId(id),
                item_id: ItemId(10),
                name: name.to_string(),
                code: None,
                is_active: active,
                specs: specs
                    .into_iter()
                    .map(|(label, value, unit)| VariantSpec::new(label, value, unit))
                    .collect(),
            })
            .expect("variant");
    }

    Arc::new(BuilderService::new(Arc::new(catalog)))
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 32 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[test]
fn facets_cover_active_variants_only() {
    let view = service()
        .facets("gear-motors", ItemId(10))
        .expect("facets");

    assert_eq!(view.tags, vec!["Mounting".to_string(), "Power".to_string()]);
    let power: Vec<&str> = view.facets[1]
        .values
        .iter()
        .map(|value| value.display.as_str())
        .collect();
    assert_eq!(power, vec!["1.5 kW", "3 kW"]);
}

#[test]
fn matches_apply_and_across_facets() {
    let service = service();
    let selection = FacetSelection::new()
        .with("power", "3", "kW")
        .with("mounting", "Foot", "");

    let result = service
        .matches("gear-motors", ItemId(10), selection)
        .expect("matches");
    let names: Vec<&str> = result.matches.iter().map(|variant| variant.name.as_str()).collect();
    assert_eq!(names, vec!["HX-30"]);
}

#[test]
fn item_outside_group_is_not_found() {
    let service = service();
    let error = service
        .facets("pumps", ItemId(10))
        .expect_err("item belongs to another group");
    assert!(matches!(error, BuilderError::ItemNotFound(ItemId(10))));

    let error = service
        .facets("fans", ItemId(10))
        .expect_err("unknown group");
    assert!(matches!(error, BuilderError::GroupNotFound(_)));
}

#[tokio::test]
async fn post_route_filters_with_field_prefixed_tokens() {
    let response = builder_router(service())
        .oneshot(
            axum::http::Request::post("/api/v1/builder/gear-motors/10")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({ "facet__power": ["3||kW"] })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let names: Vec<&str> = body["matches"]
        .as_array()
        .expect("matches array")
        .iter()
        .filter_map(|variant| variant["name"].as_str())
        .collect();
    assert_eq!(names, vec!["HX-30F", "HX-30"]);
    assert_eq!(body["item"]["name"], "Helical");
}

#[tokio::test]
async fn get_route_returns_not_found_for_unknown_item() {
    let response = builder_router(service())
        .oneshot(
            axum::http::Request::get("/api/v1/builder/gear-motors/404")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
