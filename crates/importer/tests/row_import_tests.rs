//! End-to-end row import against an in-memory content store: source file
//! to chunked windows to per-row mapping/transform/write.

use std::io::Write;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;
use stanza_core::blueprint::{Blueprint, Field};
use stanza_core::chunking::{chunks, CHUNK_SIZE};
use stanza_core::import::{Destination, Mappings};
use stanza_core::transformer::TransformerRegistry;
use stanza_core::tree::{EntryRef, TreePlacement};
use stanza_importer::sources::Source;
use stanza_importer::store::{BlueprintProvider, ContentStore, Payload, RecordHandle, StoreError};
use stanza_importer::transformers::register_defaults;
use stanza_importer::worker::import_row;

// ── In-memory fake store ─────────────────────────────────────────────

struct MemoryStore {
    blueprint: Blueprint,
    written: Mutex<Vec<(String, Payload)>>,
}

impl MemoryStore {
    fn new(blueprint: Blueprint) -> Self {
        Self {
            blueprint,
            written: Mutex::new(Vec::new()),
        }
    }

    fn written(&self) -> Vec<(String, Payload)> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlueprintProvider for MemoryStore {
    async fn blueprint(&self, _destination: &Destination) -> Result<Blueprint, StoreError> {
        Ok(self.blueprint.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn write(
        &self,
        destination: &Destination,
        payload: &Payload,
    ) -> Result<RecordHandle, StoreError> {
        if destination == &Destination::Users {
            let email = payload.get("email").and_then(|v| v.as_str()).unwrap_or("");
            if email.is_empty() {
                return Err(StoreError::Rejected("row produced no email".to_string()));
            }
        }

        let mut written = self.written.lock().unwrap();
        written.push((destination.type_name().to_string(), payload.clone()));
        Ok(RecordHandle {
            id: written.len() as i64,
            key: format!("record-{}", written.len()),
        })
    }

    async fn collection_tree_rows(&self, _collection: &str) -> Result<Vec<EntryRef>, StoreError> {
        Ok(Vec::new())
    }

    async fn persist_tree(
        &self,
        _collection: &str,
        _placements: &[TreePlacement],
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn blog_blueprint() -> Blueprint {
    Blueprint {
        fields: vec![
            Field::new("title", "Title", "text"),
            Field::new("published_at", "Published At", "date"),
            Field::new("tags", "Tags", "list"),
        ],
    }
}

fn blog_mappings() -> Mappings {
    serde_json::from_value(json!({
        "title": { "key": "Title" },
        "published_at": { "key": "Date" },
        "tags": { "key": "Tags", "delimiter": "|" },
    }))
    .unwrap()
}

fn registry() -> Arc<TransformerRegistry> {
    let mut registry = TransformerRegistry::new();
    register_defaults(&mut registry);
    Arc::new(registry)
}

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write source");
    file
}

async fn import_all(
    source: Source,
    destination: &Destination,
    mappings: &Mappings,
    store: &MemoryStore,
) -> (usize, usize) {
    let registry = registry();
    let blueprint = store.blueprint(destination).await.unwrap();

    let mut succeeded = 0;
    let mut failed = 0;
    for row in source {
        let row = row.expect("readable row");
        match import_row(destination, mappings, &blueprint, &registry, store, &row).await {
            Ok(_) => succeeded += 1,
            Err(_) => failed += 1,
        }
    }
    (succeeded, failed)
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn csv_rows_land_as_entries() {
    let file = write_temp(
        "Title,Date,Tags\n\
         Hello World,2024-01-01,rust|tokio\n\
         Second Post,2024-02-03,sqlx\n",
    );
    let destination = Destination::Entries {
        collection: "blog".to_string(),
    };
    let store = MemoryStore::new(blog_blueprint());

    let source = Source::open(stanza_core::import::ImportType::Csv, file.path()).unwrap();
    let (succeeded, failed) = import_all(source, &destination, &blog_mappings(), &store).await;

    assert_eq!((succeeded, failed), (2, 0));

    let written = store.written();
    assert_eq!(written.len(), 2);
    assert!(written.iter().all(|(kind, _)| kind == "entries"));

    let first = &written[0].1;
    assert_eq!(first.get("title"), Some(&json!("Hello World")));
    assert_eq!(first.get("published_at"), Some(&json!("2024-01-01")));
    assert_eq!(first.get("tags"), Some(&json!(["rust", "tokio"])));
}

#[tokio::test]
async fn xml_rows_land_as_terms() {
    let file = write_temp(
        "<topics>\
           <topic><Title>Databases</Title></topic>\
           <topic><Title>Networking</Title></topic>\
         </topics>",
    );
    let destination = Destination::Terms {
        taxonomy: "topics".to_string(),
    };
    let mappings: Mappings =
        serde_json::from_value(json!({ "title": { "key": "Title" } })).unwrap();
    let store = MemoryStore::new(Blueprint {
        fields: vec![Field::new("title", "Title", "text")],
    });

    let source = Source::open(stanza_core::import::ImportType::Xml, file.path()).unwrap();
    let (succeeded, failed) = import_all(source, &destination, &mappings, &store).await;

    assert_eq!((succeeded, failed), (2, 0));
    assert!(store.written().iter().all(|(kind, _)| kind == "terms"));
}

#[tokio::test]
async fn failing_row_does_not_abort_siblings() {
    let file = write_temp(
        "Title,Date,Tags\n\
         Good,2024-01-01,a\n\
         Bad,not-a-date,b\n\
         AlsoGood,2024-03-03,c\n",
    );
    let destination = Destination::Entries {
        collection: "blog".to_string(),
    };
    let store = MemoryStore::new(blog_blueprint());

    let source = Source::open(stanza_core::import::ImportType::Csv, file.path()).unwrap();
    let (succeeded, failed) = import_all(source, &destination, &blog_mappings(), &store).await;

    assert_eq!(succeeded, 2);
    assert_eq!(failed, 1);
    assert_eq!(store.written().len(), 2);
}

#[tokio::test]
async fn users_destination_requires_an_email() {
    let file = write_temp(
        "Name,Email\n\
         Jane,jane@example.com\n\
         NoEmail,\n",
    );
    let destination = Destination::Users;
    let mappings: Mappings = serde_json::from_value(json!({
        "name": { "key": "Name" },
        "email": { "key": "Email" },
    }))
    .unwrap();
    let store = MemoryStore::new(stanza_core::blueprint::default_user_blueprint());

    let source = Source::open(stanza_core::import::ImportType::Csv, file.path()).unwrap();
    let (succeeded, failed) = import_all(source, &destination, &mappings, &store).await;

    // The second row maps email to "" which the store rejects.
    assert_eq!(succeeded, 1);
    assert_eq!(failed, 1);
}

#[tokio::test]
async fn store_rejection_surfaces_as_a_row_error() {
    let destination = Destination::Users;
    let mappings: Mappings =
        serde_json::from_value(json!({ "name": { "key": "Name" } })).unwrap();
    let store = MemoryStore::new(stanza_core::blueprint::default_user_blueprint());
    let registry = registry();
    let blueprint = store.blueprint(&destination).await.unwrap();

    let row: stanza_core::types::RowRecord =
        [("Name".to_string(), "No Email".to_string())].into();
    let err = import_row(&destination, &mappings, &blueprint, &registry, &store, &row)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        stanza_importer::ImporterError::Store(StoreError::Rejected(_))
    );
}

#[test]
fn twelve_hundred_rows_partition_into_three_batches() {
    let mut content = String::from("Title\n");
    for i in 0..1200 {
        content.push_str(&format!("Post {i}\n"));
    }
    let file = write_temp(&content);

    let source = Source::open(stanza_core::import::ImportType::Csv, file.path()).unwrap();
    let sizes: Vec<usize> = chunks(source, CHUNK_SIZE).map(|w| w.len()).collect();

    assert_eq!(sizes, vec![500, 500, 200]);
}

#[test]
fn first_row_reads_lazily_from_a_large_file() {
    let mut content = String::from("Title\n");
    for i in 0..10_000 {
        content.push_str(&format!("Post {i}\n"));
    }
    let file = write_temp(&content);

    let row = Source::first_row(stanza_core::import::ImportType::Csv, file.path())
        .unwrap()
        .expect("at least one row");
    assert_eq!(row.get("Title").map(String::as_str), Some("Post 0"));
}
