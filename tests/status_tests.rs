use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use notification_pipeline::{
    clients::{memory::InMemoryRecordStore, store::RecordStore},
    models::{record::NotificationRecord, request::NotificationType},
    status_api::PageParams,
};

use crate::support::make_request;

async fn seed_records(
    store: &Arc<InMemoryRecordStore>,
    notification_type: NotificationType,
    count: usize,
) -> Result<()> {
    for i in 0..count {
        let mut record = NotificationRecord::from_request(&make_request(notification_type));
        // Spread creation times so ordering is deterministic.
        record.created_at += Duration::seconds(i as i64);
        store.insert(&record).await?;
    }

    Ok(())
}

/// Test: Listing pages through records in creation order
#[tokio::test]
async fn list_pages_through_records() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    seed_records(&store, NotificationType::Email, 25).await?;

    let first_page = store.list(0, 10).await?;
    let second_page = store.list(10, 10).await?;
    let last_page = store.list(20, 10).await?;

    assert_eq!(first_page.len(), 10);
    assert_eq!(second_page.len(), 10);
    assert_eq!(last_page.len(), 5);

    assert!(first_page.last().unwrap().created_at <= second_page[0].created_at);

    Ok(())
}

/// Test: Listing by type only returns records of that type
#[tokio::test]
async fn list_by_type_filters_records() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());
    seed_records(&store, NotificationType::Email, 6).await?;
    seed_records(&store, NotificationType::Sms, 4).await?;

    let emails = store.list_by_type(NotificationType::Email, 0, 10).await?;
    let sms = store.list_by_type(NotificationType::Sms, 0, 10).await?;

    assert_eq!(emails.len(), 6);
    assert_eq!(sms.len(), 4);
    assert!(
        emails
            .iter()
            .all(|record| record.notification_type == NotificationType::Email)
    );

    Ok(())
}

/// Test: Page parameters translate to offsets, clamping page zero
#[test]
fn page_params_compute_offsets() {
    let params = PageParams {
        page: 1,
        page_size: 10,
    };
    assert_eq!(params.offset(), 0);

    let params = PageParams {
        page: 3,
        page_size: 25,
    };
    assert_eq!(params.offset(), 50);

    let params = PageParams {
        page: 0,
        page_size: 10,
    };
    assert_eq!(params.offset(), 0);
}

/// Test: Hostile page parameters saturate instead of overflowing
#[test]
fn page_params_saturate_on_overflow() {
    let params = PageParams {
        page: u64::MAX,
        page_size: u64::MAX,
    };
    assert_eq!(params.offset(), u64::MAX);

    let params = PageParams {
        page: u64::MAX,
        page_size: 10,
    };
    assert_eq!(params.offset(), u64::MAX);
}

/// Test: Type strings parse case-insensitively, unknown strings are client errors
#[test]
fn type_strings_parse_case_insensitively() {
    assert_eq!(
        "EMAIL".parse::<NotificationType>().unwrap(),
        NotificationType::Email
    );
    assert_eq!(
        "Email".parse::<NotificationType>().unwrap(),
        NotificationType::Email
    );
    assert_eq!(
        "webhook".parse::<NotificationType>().unwrap(),
        NotificationType::Webhook
    );
    assert!("carrier-pigeon".parse::<NotificationType>().is_err());
}

/// Test: Duplicate ids are rejected by the store
#[tokio::test]
async fn duplicate_ids_are_rejected() -> Result<()> {
    let store = Arc::new(InMemoryRecordStore::new());

    let record = NotificationRecord::from_request(&make_request(NotificationType::Email));
    store.insert(&record).await?;

    assert!(store.insert(&record).await.is_err());

    Ok(())
}
