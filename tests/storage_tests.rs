mod common;

use bookamovie::storage::{CapacityStore, MemoryStore, ReserveOutcome};
use bookamovie::{BookAMovieError, StorageConfig, Ticket};
use common::*;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn test_sqlite_reserve_and_read_back() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;
    store.register_screen(&grand_screen(10)).await.unwrap();

    let record = booking_record("00000000000000000001", 12);
    let outcome = store.reserve(&record).await.unwrap();
    assert_eq!(outcome, ReserveOutcome::Committed);

    let stored = store.find_booking(&record.ticket).await.unwrap();
    assert_eq!(stored, Some(record));
    assert_eq!(store.count_bookings(&session_key()).await.unwrap(), 1);

    let missing = store.find_booking(&Ticket::new("99999999999999999999")).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_sqlite_rejects_when_screen_full() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;
    store.register_screen(&grand_screen(1)).await.unwrap();

    let first = store.reserve(&booking_record("00000000000000000001", 12)).await.unwrap();
    let second = store.reserve(&booking_record("00000000000000000002", 13)).await.unwrap();

    assert_eq!(first, ReserveOutcome::Committed);
    assert_eq!(second, ReserveOutcome::AlreadyFull);
    assert_eq!(store.count_bookings(&session_key()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sqlite_rejects_duplicate_seat() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;
    store.register_screen(&grand_screen(100)).await.unwrap();

    let first = store.reserve(&booking_record("00000000000000000001", 12)).await.unwrap();
    let second = store.reserve(&booking_record("00000000000000000002", 12)).await.unwrap();

    assert_eq!(first, ReserveOutcome::Committed);
    assert_eq!(second, ReserveOutcome::AlreadyFull);
    assert!(store
        .find_booking(&Ticket::new("00000000000000000002"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sqlite_unknown_screen_has_no_capacity() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;

    let outcome = store.reserve(&booking_record("00000000000000000001", 1)).await.unwrap();
    assert_eq!(outcome, ReserveOutcome::AlreadyFull);
    assert_eq!(store.count_bookings(&session_key()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_sqlite_capacity_is_per_session_date() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;
    store.register_screen(&grand_screen(1)).await.unwrap();

    let evening = booking_record("00000000000000000001", 12);
    let mut late_show = booking_record("00000000000000000002", 12);
    late_show.date = session_date() + chrono::Duration::hours(3);

    assert_eq!(store.reserve(&evening).await.unwrap(), ReserveOutcome::Committed);
    assert_eq!(store.reserve(&late_show).await.unwrap(), ReserveOutcome::Committed);
}

#[tokio::test]
async fn test_sqlite_register_screen_updates_capacity() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;
    store.register_screen(&grand_screen(1)).await.unwrap();

    store.reserve(&booking_record("00000000000000000001", 1)).await.unwrap();
    assert_eq!(
        store.reserve(&booking_record("00000000000000000002", 2)).await.unwrap(),
        ReserveOutcome::AlreadyFull
    );

    store.register_screen(&grand_screen(2)).await.unwrap();
    assert_eq!(
        store.reserve(&booking_record("00000000000000000003", 2)).await.unwrap(),
        ReserveOutcome::Committed
    );

    let mut zero = grand_screen(5);
    zero.screen = 0;
    assert!(matches!(
        store.register_screen(&zero).await,
        Err(BookAMovieError::InvalidArgument(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_concurrent_reservations_never_exceed_capacity() {
    let temp_dir = tempdir().unwrap();
    let store = Arc::new(sqlite_store(&temp_dir).await);
    store.register_screen(&grand_screen(5)).await.unwrap();

    let mut handles = Vec::new();
    for seat in 1..=20u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let record = booking_record(&format!("{:020}", seat), seat);
            store.reserve(&record).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == ReserveOutcome::Committed {
            committed += 1;
        }
    }

    assert_eq!(committed, 5);
    assert_eq!(store.count_bookings(&session_key()).await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_concurrent_same_seat_books_once() {
    let temp_dir = tempdir().unwrap();
    let store = Arc::new(sqlite_store(&temp_dir).await);
    store.register_screen(&grand_screen(50)).await.unwrap();

    let mut handles = Vec::new();
    for n in 1..=10u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.reserve(&booking_record(&format!("{:020}", n), 12)).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == ReserveOutcome::Committed {
            committed += 1;
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(store.count_bookings(&session_key()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sqlite_closed_store_reports_infrastructure_error() {
    let temp_dir = tempdir().unwrap();
    let store = sqlite_store(&temp_dir).await;
    store.register_screen(&grand_screen(10)).await.unwrap();

    store.shutdown().await;
    store.shutdown().await;

    let result = store.reserve(&booking_record("00000000000000000001", 1)).await;
    assert!(matches!(result, Err(BookAMovieError::Database(_))));
}

#[tokio::test]
async fn test_sqlite_in_memory_database() {
    let config = StorageConfig {
        address: ":memory:".to_string(),
        ..StorageConfig::default()
    };
    let store = bookamovie::storage::SqliteStore::connect(&config).await.unwrap();
    store.migrate().await.unwrap();
    store.register_screen(&grand_screen(1)).await.unwrap();

    let outcome = store.reserve(&booking_record("00000000000000000001", 1)).await.unwrap();
    assert_eq!(outcome, ReserveOutcome::Committed);
}

#[tokio::test]
async fn test_memory_store_matches_sqlite_semantics() {
    let store = MemoryStore::with_screens([grand_screen(2)]);

    assert_eq!(
        store.reserve(&booking_record("00000000000000000001", 1)).await.unwrap(),
        ReserveOutcome::Committed
    );
    // same seat
    assert_eq!(
        store.reserve(&booking_record("00000000000000000002", 1)).await.unwrap(),
        ReserveOutcome::AlreadyFull
    );
    // same ticket, other seat
    assert_eq!(
        store.reserve(&booking_record("00000000000000000001", 3)).await.unwrap(),
        ReserveOutcome::AlreadyFull
    );
    assert_eq!(
        store.reserve(&booking_record("00000000000000000003", 2)).await.unwrap(),
        ReserveOutcome::Committed
    );
    // full
    assert_eq!(
        store.reserve(&booking_record("00000000000000000004", 4)).await.unwrap(),
        ReserveOutcome::AlreadyFull
    );

    assert_eq!(store.len(), 2);
    assert_eq!(store.count_bookings(&session_key()).await.unwrap(), 2);
    assert!(store
        .find_booking(&Ticket::new("00000000000000000003"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_memory_store_unknown_screen_and_shutdown() {
    let store = MemoryStore::new();
    assert_eq!(
        store.reserve(&booking_record("00000000000000000001", 1)).await.unwrap(),
        ReserveOutcome::AlreadyFull
    );

    store.shutdown().await;
    store.shutdown().await;
    assert!(store.is_closed());
    assert!(matches!(
        store.reserve(&booking_record("00000000000000000002", 2)).await,
        Err(BookAMovieError::ShutDown(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_store_concurrent_reservations_never_exceed_capacity() {
    let store = Arc::new(MemoryStore::with_screens([grand_screen(10)]));

    let mut handles = Vec::new();
    for seat in 1..=100u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.reserve(&booking_record(&format!("{:020}", seat), seat)).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == ReserveOutcome::Committed {
            committed += 1;
        }
    }

    assert_eq!(committed, 10);
    assert_eq!(store.len(), 10);
}
