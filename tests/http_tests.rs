use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use notification_pipeline::{
    clients::{memory::InMemoryRecordStore, store::RecordStore},
    gateway::{self, Gateway},
    models::{
        record::NotificationRecord, request::NotificationType, response::NotificationResponse,
        status::NotificationStatus,
    },
    status_api,
};
use tower::ServiceExt;

use crate::support::{FailingPublisher, RecordingPublisher, make_request};

fn gateway_app() -> (Router, Arc<InMemoryRecordStore>) {
    let store = Arc::new(InMemoryRecordStore::new());
    let gateway = Gateway::new(store.clone(), Arc::new(RecordingPublisher::new()));
    let app = gateway::app(Arc::new(gateway::AppState { gateway }));
    (app, store)
}

fn status_app() -> (Router, Arc<InMemoryRecordStore>) {
    let store = Arc::new(InMemoryRecordStore::new());
    let app = status_api::app(Arc::new(status_api::AppState {
        store: store.clone(),
    }));
    (app, store)
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test: A valid submit responds 200 with a queued response and persists the record
#[tokio::test]
async fn send_returns_200_and_persists_the_record() -> Result<()> {
    let (app, store) = gateway_app();

    let request = make_request(NotificationType::Email);
    let response = app
        .oneshot(post_json(
            "/notifications/send",
            serde_json::to_string(&request)?,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body: NotificationResponse = json_body(response.into_body()).await;
    assert_eq!(body.status, NotificationStatus::Queued);
    assert_eq!(body.id, request.id);

    assert!(store.get(&request.id).await?.is_some());

    Ok(())
}

/// Test: A missing recipient is a client error, not an enqueue
#[tokio::test]
async fn send_rejects_missing_recipient_with_400() -> Result<()> {
    let (app, store) = gateway_app();

    let mut request = make_request(NotificationType::Email);
    request.recipient = String::new();

    let response = app
        .oneshot(post_json(
            "/notifications/send",
            serde_json::to_string(&request)?,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.get(&request.id).await?.is_none());

    Ok(())
}

/// Test: A missing message is a client error
#[tokio::test]
async fn send_rejects_missing_message_with_400() -> Result<()> {
    let (app, _store) = gateway_app();

    let mut request = make_request(NotificationType::Sms);
    request.message = "   ".to_string();

    let response = app
        .oneshot(post_json(
            "/notifications/send",
            serde_json::to_string(&request)?,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

/// Test: A failed enqueue surfaces as 500 with a failed response body
#[tokio::test]
async fn send_reports_broker_failure_with_500() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    let gateway = Gateway::new(store.clone(), Arc::new(FailingPublisher));
    let app = gateway::app(Arc::new(gateway::AppState { gateway }));

    let request = make_request(NotificationType::Email);
    let response = app
        .oneshot(post_json(
            "/notifications/send",
            serde_json::to_string(&request)?,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: NotificationResponse = json_body(response.into_body()).await;
    assert_eq!(body.status, NotificationStatus::Failed);

    Ok(())
}

/// Test: An empty bulk batch is a client error
#[tokio::test]
async fn send_bulk_rejects_empty_array_with_400() -> Result<()> {
    let (app, _store) = gateway_app();

    let response = app
        .oneshot(post_json("/notifications/send-bulk", "[]".to_string()))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

/// Test: Bulk responses carry one status per request, in order
#[tokio::test]
async fn send_bulk_reports_per_item_statuses() -> Result<()> {
    let (app, _store) = gateway_app();

    let valid = make_request(NotificationType::Email);
    let mut invalid = make_request(NotificationType::Sms);
    invalid.recipient = String::new();

    let response = app
        .oneshot(post_json(
            "/notifications/send-bulk",
            serde_json::to_string(&vec![valid, invalid])?,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<NotificationResponse> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].status, NotificationStatus::Queued);
    assert_eq!(body[1].status, NotificationStatus::Failed);

    Ok(())
}

/// Test: Unknown ids resolve to 404 on the gateway lookup route
#[tokio::test]
async fn gateway_lookup_of_unknown_id_returns_404() -> Result<()> {
    let (app, _store) = gateway_app();

    let response = app.oneshot(get("/notifications/no-such-id")).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

/// Test: A persisted record is retrievable through the gateway lookup route
#[tokio::test]
async fn gateway_lookup_returns_the_record_status() -> Result<()> {
    let (app, store) = gateway_app();

    let request = make_request(NotificationType::Push);
    store
        .insert(&NotificationRecord::from_request(&request))
        .await?;

    let response = app
        .oneshot(get(&format!("/notifications/{}", request.id)))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body: NotificationResponse = json_body(response.into_body()).await;
    assert_eq!(body.id, request.id);
    assert_eq!(body.status, NotificationStatus::Queued);

    Ok(())
}

/// Test: Unknown ids resolve to 404 on the status API
#[tokio::test]
async fn status_lookup_of_unknown_id_returns_404() -> Result<()> {
    let (app, _store) = status_app();

    let response = app.oneshot(get("/status/no-such-id")).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

/// Test: An unparseable type segment is a client error
#[tokio::test]
async fn status_by_unknown_type_returns_400() -> Result<()> {
    let (app, _store) = status_app();

    let response = app.oneshot(get("/status/by-type/carrier-pigeon")).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

/// Test: Page and pageSize query parameters drive the listing
#[tokio::test]
async fn status_listing_honors_page_parameters() -> Result<()> {
    let (app, store) = status_app();

    for _ in 0..15 {
        store
            .insert(&NotificationRecord::from_request(&make_request(
                NotificationType::Email,
            )))
            .await?;
    }

    let response = app
        .clone()
        .oneshot(get("/status?page=2&pageSize=10"))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<NotificationResponse> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 5);

    let response = app.oneshot(get("/status/by-type/email?pageSize=10")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<NotificationResponse> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 10);

    Ok(())
}
