use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    clients::store::RecordStore,
    models::{request::NotificationType, response::NotificationResponse},
};

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

impl PageParams {
    /// Saturates instead of overflowing; page and size are client input.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(get_all_notifications))
        .route("/status/{id}", get(get_notification_status))
        .route("/status/by-type/{notification_type}", get(get_notifications_by_type))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Status API listening");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn get_notification_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.get(&id).await {
        Ok(Some(record)) => {
            (StatusCode::OK, Json(NotificationResponse::from_record(&record))).into_response()
        }
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

async fn get_all_notifications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Response {
    match state.store.list(params.offset(), params.page_size).await {
        Ok(records) => {
            let responses: Vec<NotificationResponse> =
                records.iter().map(NotificationResponse::from_record).collect();
            Json(responses).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list notifications");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list notifications").into_response()
        }
    }
}

async fn get_notifications_by_type(
    State(state): State<Arc<AppState>>,
    Path(notification_type): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let Ok(notification_type) = notification_type.parse::<NotificationType>() else {
        return (StatusCode::BAD_REQUEST, "Invalid notification type").into_response();
    };

    match state
        .store
        .list_by_type(notification_type, params.offset(), params.page_size)
        .await
    {
        Ok(records) => {
            let responses: Vec<NotificationResponse> =
                records.iter().map(NotificationResponse::from_record).collect();
            Json(responses).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list notifications by type");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list notifications").into_response()
        }
    }
}
