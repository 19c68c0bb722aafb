#![allow(clippy::unwrap_used)]
// Integration tests for `CrudPresenter` against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bizdash_api::ApiClient;
use bizdash_core::{
    CrudPresenter, ModalState, NoticeLevel, Paging, Record, RecordId, Resource, ResourceDataStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<ApiClient>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, Duration::from_secs(8));
    (server, Arc::new(client))
}

async fn presenter(client: Arc<ApiClient>, resource: Resource) -> CrudPresenter {
    let store = ResourceDataStore::bind(client, resource.endpoint()).await;
    CrudPresenter::for_resource(store, resource)
}

fn employees(n: usize) -> Value {
    Value::Array(
        (1..=n)
            .map(|i| json!({ "id": i, "name": format!("Employee {i}"), "department": "IT" }))
            .collect(),
    )
}

fn ids(rows: &[Arc<Record>]) -> Vec<String> {
    rows.iter().map(|r| r.display_value("id")).collect()
}

// ── Search ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_filters_loaded_page_only() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/employees/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employees(3)))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Employees).await;

    p.set_search("employee 2");
    assert_eq!(ids(&p.visible_rows()), vec!["2"]);

    p.set_search("");
    assert_eq!(p.visible_rows().len(), 3);

    p.set_search("EMPLOYEE");
    p.refresh_view();
    assert_eq!(p.search(), "");
    assert_eq!(p.visible_rows().len(), 3);
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_raw_list_pages_locally_by_ten() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/employees/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employees(25)))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Employees).await;
    assert_eq!(
        p.paging(),
        Paging::Client {
            current: 1,
            total: 25,
            page_size: 10
        }
    );
    assert_eq!(p.visible_rows().len(), 10);

    p.change_page(3).await;
    assert_eq!(ids(&p.visible_rows()), vec!["21", "22", "23", "24", "25"]);
    assert_eq!(p.paging().page_count(), 3);
}

#[tokio::test]
async fn test_envelope_pages_through_server() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 25, "next": "n", "previous": null,
            "results": [{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 25, "next": null, "previous": "p",
            "results": [{ "id": 21, "name": "U" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Projects).await;
    assert_eq!(
        p.paging(),
        Paging::Server {
            current: 1,
            total: 25,
            page_size: 20
        }
    );

    p.change_page(2).await;
    assert_eq!(p.paging().current(), 2);
    assert_eq!(p.paging().page_count(), 2);
    assert_eq!(ids(&p.visible_rows()), vec!["21"]);
}

// ── Modal and submit ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_success_closes_modal() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/customers/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Customers).await;
    p.open_create();
    assert_eq!(p.modal_title(), "Create customer");

    p.draft_mut().set("name", "ABC Corp");
    p.draft_mut().set("email", "contact@abc.com");
    p.draft_mut().set("status", "lead");
    assert!(p.validate());

    let values = p.draft_values();
    let notice = p.submit(&values).await;

    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Created successfully");
    assert_eq!(*p.modal(), ModalState::Closed);
}

#[tokio::test]
async fn test_edit_submit_puts_and_reports_update() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 4, "name": "Laptop", "category": "equipment", "value": 1500, "status": "active" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/assets/4/"))
        .and(body_json(json!({
            "name": "Laptop", "description": "", "category": "equipment",
            "value": 1200, "status": "active", "location": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 4 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Assets).await;
    let record = p.visible_rows()[0].clone();
    p.open_edit(record);
    assert_eq!(p.modal_title(), "Update asset");
    assert_eq!(p.draft().get("value"), "1500");

    p.draft_mut().set("value", "1200");
    let values = p.draft_values();
    let notice = p.submit(&values).await;

    assert_eq!(notice.message, "Updated successfully");
    assert!(!p.modal().is_open());
}

#[tokio::test]
async fn test_submit_failure_keeps_modal_open() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Transactions).await;
    p.open_create();
    let notice = p.submit(&json!({ "description": "Rent" })).await;

    assert!(notice.is_error());
    assert_eq!(notice.message, "Server error, please retry later.");
    assert_eq!(*p.modal(), ModalState::Create);
}

#[tokio::test]
async fn test_submit_error_messages_by_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 8, "name": "Gone" }])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "name": ["required"] })))
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Projects).await;

    let record = p.visible_rows()[0].clone();
    p.open_edit(record);
    let notice = p.submit(&json!({})).await;
    assert_eq!(notice.message, "Resource not found.");

    p.open_create();
    let notice = p.submit(&json!({})).await;
    assert_eq!(
        notice.message,
        "Something went wrong, please check your connection."
    );
}

#[tokio::test]
async fn test_invalid_draft_reports_field_errors() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut p = presenter(client, Resource::Employees).await;
    p.open_create();
    p.draft_mut().set("email", "not-an-email");

    assert!(!p.validate());
    assert_eq!(p.field_errors()["email"], "Invalid email address");
    assert!(p.field_errors().contains_key("name"));

    p.close_modal();
    assert!(p.field_errors().is_empty());
    assert_eq!(p.draft().get("email"), "");
}

// ── Remove ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_remove_reports_outcome() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/employees/1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/employees/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let p = presenter(client, Resource::Employees).await;

    let ok = p.remove(RecordId::Int(1)).await;
    assert_eq!(ok.message, "Deleted successfully");

    let failed = p.remove(RecordId::Int(2)).await;
    assert!(failed.is_error());
    assert_eq!(failed.message, "Could not delete, please retry.");
}
