use std::fs;

use excaliapp::{Document, DocumentStore, Location, StoreConfig, StoreError};
use tempfile::TempDir;

fn open_store() -> (TempDir, DocumentStore) {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::open(StoreConfig::with_root(dir.path())).unwrap();
    (dir, store)
}

#[test]
fn test_draft_lifecycle() {
    let (_dir, store) = open_store();

    store
        .save(Document::with_id("abc", "u1", "Draft").content("DATA1"))
        .unwrap();
    let first = store.get("abc").unwrap();
    assert_eq!(first.content, "DATA1");
    assert_eq!(first.created_at, first.updated_at);

    store
        .save(Document::with_id("abc", "u1", "Draft2").content("DATA2"))
        .unwrap();
    let second = store.get("abc").unwrap();
    assert_eq!(second.content, "DATA2");
    assert_eq!(second.name, "Draft2");
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at > first.updated_at);

    store.delete("abc").unwrap();
    assert!(store.get("abc").unwrap_err().is_not_found());
}

#[test]
fn test_round_trip_keeps_fields() {
    let (_dir, store) = open_store();
    let doc = Document::with_id("rt", "owner-7", "Sketch")
        .content(r#"{"type":"excalidraw","elements":[]}"#)
        .thumbnail("data:image/png;base64,iVBORw0KGgo=")
        .public(true);
    store.save(doc.clone()).unwrap();

    let loaded = store.get("rt").unwrap();
    assert_eq!(loaded.id, doc.id);
    assert_eq!(loaded.owner, doc.owner);
    assert_eq!(loaded.name, doc.name);
    assert_eq!(loaded.content, doc.content);
    assert_eq!(loaded.thumbnail, doc.thumbnail);
    assert!(loaded.is_public);
    assert_eq!(loaded.location, Location::Local);
}

#[test]
fn test_rapid_saves_keep_updated_at_increasing() {
    let (_dir, store) = open_store();
    let mut last = store
        .save(Document::with_id("fast", "u1", "Fast"))
        .unwrap();
    for i in 0..20 {
        let saved = store
            .save(Document::with_id("fast", "u1", format!("Fast {i}")))
            .unwrap();
        assert!(saved.updated_at > last.updated_at);
        assert_eq!(saved.created_at, last.created_at);
        last = saved;
    }
}

#[test]
fn test_list_excludes_content() {
    let (dir, store) = open_store();
    let big = "x".repeat(1 << 20);
    store
        .save(Document::with_id("big", "u1", "Big").content(big))
        .unwrap();
    store.save(Document::with_id("small", "u1", "Small")).unwrap();

    let mut docs = store.list().unwrap();
    docs.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(
        docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
        ["big", "small"]
    );
    assert!(docs.iter().all(|d| d.content.is_empty()));
    assert!(docs.iter().all(|d| d.location == Location::Local));

    let record = fs::metadata(dir.path().join("big.i.json")).unwrap();
    assert!(record.len() < 1024);
}

#[test]
fn test_delete_removes_both_halves() {
    let (dir, store) = open_store();
    store
        .save(Document::with_id("gone", "u1", "Gone").content("x"))
        .unwrap();
    store.delete("gone").unwrap();

    assert!(!dir.path().join("gone.i.json").exists());
    assert!(!dir.path().join("gone.excalidraw").exists());
    assert!(!store.exists("gone").unwrap());
    assert!(store.get("gone").unwrap_err().is_not_found());
    assert!(store.delete("gone").unwrap_err().is_not_found());
}

#[test]
fn test_metadata_without_content() {
    let (dir, store) = open_store();
    store
        .save(Document::with_id("half", "u1", "Half").content("x"))
        .unwrap();
    fs::remove_file(dir.path().join("half.excalidraw")).unwrap();

    match store.get("half").unwrap_err() {
        StoreError::NotFound { id, path, .. } => {
            assert_eq!(id, "half");
            assert!(path.ends_with("half.excalidraw"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!store.exists("half").unwrap());

    let docs = store.list().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "half");
}

#[test]
fn test_reads_records_written_by_desktop_app() {
    let (dir, store) = open_store();
    fs::write(
        dir.path().join("0.8x1kq2.i.json"),
        r#"{"id":"0.8x1kq2","userId":"me@example.com","name":"Board","thumbnail":"data:image/png;base64,AA==","createdAt":"2024-03-01T09:30:00+01:00","updatedAt":"2024-03-02T11:00:00+01:00","isPublic":false,"inStorage":""}"#,
    )
    .unwrap();
    fs::write(dir.path().join("0.8x1kq2.excalidraw"), "{}").unwrap();

    let doc = store.get("0.8x1kq2").unwrap();
    assert_eq!(doc.owner, "me@example.com");
    assert_eq!(doc.content, "{}");
    let created = doc.created_at.unwrap();

    let saved = store.save(doc).unwrap();
    assert_eq!(saved.created_at, Some(created));
}

#[test]
fn test_save_request_without_id_creates_document() {
    let (_dir, store) = open_store();
    let request: excaliapp::SaveRequest =
        serde_json::from_str(r#"{"userId":"u1","data":"payload"}"#).unwrap();
    let saved = store.save(Document::from(request)).unwrap();

    let loaded = store.get(&saved.id).unwrap();
    assert_eq!(loaded.name, "Untitled");
    assert_eq!(loaded.content, "payload");
}
