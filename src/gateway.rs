use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    clients::{
        broker::{INBOUND_QUEUE, Publisher},
        store::RecordStore,
    },
    models::{
        message::QueueMessage,
        record::NotificationRecord,
        request::NotificationRequest,
        response::NotificationResponse,
        status::NotificationStatus,
    },
};

pub struct Gateway {
    store: Arc<dyn RecordStore>,
    publisher: Arc<dyn Publisher>,
}

impl Gateway {
    pub fn new(store: Arc<dyn RecordStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    /// Persists a record with status queued, then publishes the envelope
    /// to the inbound queue. The two writes are not atomic; downstream
    /// processing is at-least-once.
    pub async fn submit(&self, request: NotificationRequest) -> NotificationResponse {
        if request.recipient.trim().is_empty() {
            warn!(id = %request.id, "Invalid notification request: recipient is required");
            return NotificationResponse::failed(request.id, "Recipient is required");
        }

        if request.message.trim().is_empty() {
            warn!(id = %request.id, "Invalid notification request: message is required");
            return NotificationResponse::failed(request.id, "Message is required");
        }

        let record = NotificationRecord::from_request(&request);

        if let Err(e) = self.store.insert(&record).await {
            error!(id = %record.id, error = %e, "Failed to persist notification record");
            return NotificationResponse::failed(
                record.id,
                format!("Error queuing notification: {}", e),
            );
        }

        let queue_message = QueueMessage::new(request);

        let payload = match serde_json::to_vec(&queue_message) {
            Ok(payload) => payload,
            Err(e) => {
                error!(id = %record.id, error = %e, "Failed to serialize queue message");
                return NotificationResponse::failed(
                    record.id,
                    format!("Error queuing notification: {}", e),
                );
            }
        };

        if let Err(e) = self.publisher.publish(INBOUND_QUEUE, &payload).await {
            error!(id = %record.id, error = %e, "Failed to publish to inbound queue");
            return NotificationResponse::failed(
                record.id,
                format!("Error queuing notification: {}", e),
            );
        }

        info!(
            id = %record.id,
            notification_type = %record.notification_type,
            recipient = %record.recipient,
            "Notification queued for delivery"
        );

        NotificationResponse::queued(record.id)
    }

    /// Each request is handled independently; one failure never aborts
    /// the rest of the batch.
    pub async fn submit_bulk(
        &self,
        requests: Vec<NotificationRequest>,
    ) -> Vec<NotificationResponse> {
        let mut responses = Vec::with_capacity(requests.len());

        for request in requests {
            responses.push(self.submit(request).await);
        }

        responses
    }

    pub async fn get_status(&self, id: &str) -> Result<Option<NotificationResponse>, Error> {
        Ok(self
            .store
            .get(id)
            .await?
            .map(|record| NotificationResponse::from_record(&record)))
    }
}

pub struct AppState {
    pub gateway: Gateway,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/notifications/send", post(send_notification))
        .route("/notifications/send-bulk", post(send_bulk_notifications))
        .route("/notifications/{id}", get(get_notification_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Gateway listening");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationRequest>,
) -> Response {
    if request.recipient.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Recipient is required").into_response();
    }

    if request.message.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Message is required").into_response();
    }

    let response = state.gateway.submit(request).await;

    let status_code = if response.status == NotificationStatus::Failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status_code, Json(response)).into_response()
}

async fn send_bulk_notifications(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<NotificationRequest>>,
) -> Response {
    if requests.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "At least one notification request is required",
        )
            .into_response();
    }

    Json(state.gateway.submit_bulk(requests).await).into_response()
}

async fn get_notification_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.gateway.get_status(&id).await {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            format!("Notification with id {} not found", id),
        )
            .into_response(),
        Err(e) => {
            error!(id = %id, error = %e, "Status lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Status lookup failed").into_response()
        }
    }
}
