//! Deletion, listing and expiry tests.

mod common;

use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};

use common::{alice, bob, TestHarness};
use linkdrop::entry::expiry;
use linkdrop::{
    BlobStore, EntryOrder, EntryQuery, EntryStore, ShareError, StatusFilter, SubmitRequest,
};

#[tokio::test]
async fn test_delete_file_entry() {
    let h = TestHarness::new().await;
    let entry = h
        .service
        .submit(&alice(), SubmitRequest::new().with_file("a.txt", b"x".to_vec()))
        .await
        .unwrap();

    h.service.delete(&alice(), &entry.id).await.unwrap();

    assert!(h.stored_blobs("alice").await.is_empty());
    assert_eq!(h.record_count("alice").await, 0);
}

#[tokio::test]
async fn test_delete_message_only_entry() {
    let h = TestHarness::new().await;
    let entry = h
        .service
        .submit(&alice(), SubmitRequest::new().with_message("hi"))
        .await
        .unwrap();

    h.service.delete(&alice(), &entry.id).await.unwrap();

    assert_eq!(h.blobs.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.record_count("alice").await, 0);
}

#[tokio::test]
async fn test_blob_delete_failure_keeps_record() {
    let h = TestHarness::new().await;
    let entry = h
        .service
        .submit(&alice(), SubmitRequest::new().with_file("a.txt", b"x".to_vec()))
        .await
        .unwrap();
    h.blobs.fail_delete.store(true, Ordering::SeqCst);

    let result = h.service.delete(&alice(), &entry.id).await;

    assert!(matches!(result, Err(ShareError::Storage(_))));
    assert_eq!(h.entries.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.record_count("alice").await, 1);
    assert!(h
        .blobs
        .inner
        .exists(entry.blob_path().unwrap())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_record_delete_failure_is_persistence_error() {
    let h = TestHarness::new().await;
    let entry = h
        .service
        .submit(&alice(), SubmitRequest::new().with_message("hi"))
        .await
        .unwrap();
    h.entries.fail_delete.store(true, Ordering::SeqCst);

    let result = h.service.delete(&alice(), &entry.id).await;

    assert!(matches!(result, Err(ShareError::Persistence(_))));
    assert_eq!(h.record_count("alice").await, 1);
}

#[tokio::test]
async fn test_delete_by_other_owner_changes_nothing() {
    let h = TestHarness::new().await;
    let entry = h
        .service
        .submit(&bob(), SubmitRequest::new().with_file("b.txt", b"x".to_vec()))
        .await
        .unwrap();

    let result = h.service.delete(&alice(), &entry.id).await;

    assert!(matches!(result, Err(ShareError::Authorization(_))));
    assert_eq!(h.blobs.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.entries.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.record_count("bob").await, 1);
    assert_eq!(h.stored_blobs("bob").await.len(), 1);
}

#[tokio::test]
async fn test_delete_unknown_entry() {
    let h = TestHarness::new().await;

    let result = h.service.delete(&alice(), "no-such-entry").await;

    assert!(matches!(result, Err(ShareError::NotFound(_))));
}

#[tokio::test]
async fn test_expired_entries_stay_listed() {
    let h = TestHarness::new().await;
    let entry = h
        .service
        .submit(&alice(), SubmitRequest::new().with_message("old"))
        .await
        .unwrap();
    h.service
        .submit(&alice(), SubmitRequest::new().with_message("fresh").expires_in_days(1))
        .await
        .unwrap();
    let past = Utc::now() - Duration::days(1);
    assert!(h
        .entries
        .inner
        .update_expiry("alice", &entry.id, Some(past))
        .await
        .unwrap());

    let all = h.service.list(&alice(), &EntryQuery::new()).await.unwrap();
    let expired = h
        .service
        .list(&alice(), &EntryQuery::new().status(StatusFilter::Expired))
        .await
        .unwrap();
    let stats = h.service.stats(&alice()).await.unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, entry.id);
    assert!(!expiry::is_active(&expired[0], Utc::now()));
    assert_eq!(stats.active, 1);
    assert_eq!(stats.expired, 1);
}

#[tokio::test]
async fn test_list_ordering_and_paging() {
    let h = TestHarness::new().await;
    for name in ["c.txt", "a.txt", "b.txt"] {
        h.service
            .submit(&alice(), SubmitRequest::new().with_file(name, b"x".to_vec()))
            .await
            .unwrap();
    }

    let by_name = h
        .service
        .list(&alice(), &EntryQuery::new().order(EntryOrder::Name))
        .await
        .unwrap();
    let page = h
        .service
        .list(&alice(), &EntryQuery::new().order(EntryOrder::Name).page(1, 1))
        .await
        .unwrap();

    let names: Vec<_> = by_name.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "b.txt");
}
