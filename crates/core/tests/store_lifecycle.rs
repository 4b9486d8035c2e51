//! Ticket store lifecycle integration tests over the local file backend.
//!
//! These tests verify the full session flow against a real file:
//! open -> submit -> reopen -> external edit -> reload -> admin update

use std::sync::Arc;

use tempfile::TempDir;

use ticketdesk_core::{
    backend::{LocalFileBackend, LocalFileConfig},
    testing::fixtures,
    ticket::{TicketPatch, TicketStatus, COLUMNS},
    Identity, PersistenceBackend, RequiredField, TicketError, TicketStore, TicketTable,
    UpdateOutcome,
};

/// Test helper owning a temp dir with a ticket file path inside it.
struct TestHarness {
    backend: Arc<LocalFileBackend>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let backend = Arc::new(LocalFileBackend::new(LocalFileConfig {
            path: temp_dir.path().join("data").join("Data.csv"),
        }));
        Self {
            backend,
            _temp_dir: temp_dir,
        }
    }

    async fn open_store(&self) -> TicketStore {
        TicketStore::open(self.backend.clone(), RequiredField::ALL.to_vec())
            .await
            .expect("Failed to open store")
            .with_clock(fixtures::fixed_clock(2024, 3, 15))
    }

    async fn file_text(&self) -> String {
        tokio::fs::read_to_string(self.backend.path())
            .await
            .expect("ticket file should exist")
    }
}

#[tokio::test]
async fn test_open_without_file_starts_empty() {
    let harness = TestHarness::new();

    let store = harness.open_store().await;

    assert!(store.table().is_empty());
    assert!(!harness.backend.path().exists());
}

#[tokio::test]
async fn test_submissions_survive_reopen() {
    let harness = TestHarness::new();
    let mut store = harness.open_store().await;

    let first = store
        .append(&fixtures::submission("Automate invoice matching"))
        .await
        .unwrap();
    let second = store
        .append(&fixtures::submission("Self-service password reset"))
        .await
        .unwrap();
    assert_eq!(first.id, "PROJECT-1100");
    assert_eq!(second.id, "PROJECT-1101");

    let text = harness.file_text().await;
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), COLUMNS.join(","));
    assert!(lines.next().unwrap().starts_with("PROJECT-1100,Dana Whitfield,"));
    assert!(text.contains("03-15-2024"));

    let reopened = harness.open_store().await;
    assert_eq!(reopened.table(), store.table());
}

#[tokio::test]
async fn test_reload_picks_up_external_edit() {
    let harness = TestHarness::new();
    let mut store = harness.open_store().await;
    store
        .append(&fixtures::submission("Warehouse label printer"))
        .await
        .unwrap();

    // Someone edits the file in a spreadsheet.
    let edited = harness.file_text().await.replace(",Open,", ",Completed,");
    tokio::fs::write(harness.backend.path(), edited).await.unwrap();

    store.reload().await.unwrap();

    assert_eq!(
        store.table().get("PROJECT-1100").unwrap().status,
        TicketStatus::Completed
    );
}

#[tokio::test]
async fn test_admin_update_is_persisted() {
    let harness = TestHarness::new();
    let mut store = harness.open_store().await;
    store.append(&fixtures::submission("one")).await.unwrap();
    store.append(&fixtures::submission("two")).await.unwrap();

    let grant = Identity::admin("admin", "admin").admin_grant().unwrap();
    let mut records = store.table().clone().into_records();
    records[1].status = TicketStatus::InProgress;
    let outcome = store
        .update(TicketTable::from_records(records).unwrap(), &grant)
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Saved);

    let patch = TicketPatch {
        title: Some("one (revised)".to_string()),
        ..Default::default()
    };
    store
        .update_record("PROJECT-1100", &patch, &grant)
        .await
        .unwrap();

    let reopened = harness.open_store().await;
    let records = reopened.table().records();
    assert_eq!(records[0].title, "one (revised)");
    assert_eq!(records[1].status, TicketStatus::InProgress);
}

#[tokio::test]
async fn test_unchanged_update_does_not_touch_file() {
    let harness = TestHarness::new();
    let mut store = harness.open_store().await;
    store.append(&fixtures::submission("one")).await.unwrap();
    let before = harness.backend.probe().await.unwrap();

    let grant = Identity::admin("admin", "admin").admin_grant().unwrap();
    let outcome = store.update(store.table().clone(), &grant).await.unwrap();

    assert_eq!(outcome, UpdateOutcome::Unchanged);
    assert_eq!(harness.backend.probe().await.unwrap(), before);
}

#[tokio::test]
async fn test_corrupt_file_fails_open() {
    let harness = TestHarness::new();
    tokio::fs::create_dir_all(harness.backend.path().parent().unwrap())
        .await
        .unwrap();
    tokio::fs::write(
        harness.backend.path(),
        "ID,Title,Status\nPROJECT-1100,Broken,Archived\n",
    )
    .await
    .unwrap();

    let result = TicketStore::open(harness.backend.clone(), RequiredField::ALL.to_vec()).await;

    assert!(matches!(result, Err(TicketError::CorruptData(_))));
}

#[tokio::test]
async fn test_ids_continue_after_deleted_rows() {
    let harness = TestHarness::new();
    tokio::fs::create_dir_all(harness.backend.path().parent().unwrap())
        .await
        .unwrap();
    // One row left after manual deletions, but its suffix is ahead of the count.
    tokio::fs::write(
        harness.backend.path(),
        "ID,Title,Status,Priority,Date Submitted\nPROJECT-1104,Kept,Open,Low,01-02-2024\n",
    )
    .await
    .unwrap();

    let mut store = harness.open_store().await;
    let record = store.append(&fixtures::submission("next")).await.unwrap();

    assert_eq!(record.id, "PROJECT-1105");
}
