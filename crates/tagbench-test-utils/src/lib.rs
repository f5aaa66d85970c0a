//! Testing utilities for the Tagbench workspace
//!
//! Shared schemas, documents, stores, and a driver that fails on demand.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tagbench_schema::{
    AttributeDefinition, SchemaDefinition, SchemaModel, TagType, TagTypeDefinition,
};
use tagbench_span::Span;
use tagbench_store::{
    Document, DocumentSnapshot, MemoryDriver, PersistenceDriver, PersistenceError, TagId,
    TagRecord, TagStore,
};

/// Twenty characters
pub const SHORT_TEXT: &str = "Anna thanked Bob now";

pub const STORY_TEXT: &str = "John met Mary in Paris. Later, John called Mary again.";

/// PERSON (consuming, `role` required with default "subject"), EVENT
/// (non-consuming), RELATION (link, `arg1`/`arg2`)
pub fn person_relation_definition() -> SchemaDefinition {
    SchemaDefinition::new("relations")
        .tag(
            TagTypeDefinition::extent("PERSON").attribute(
                AttributeDefinition::new("role")
                    .with_default("subject")
                    .with_values(["subject", "object"])
                    .required(),
            ),
        )
        .tag(
            TagTypeDefinition::extent("EVENT")
                .non_consuming()
                .attribute(AttributeDefinition::new("tense")),
        )
        .tag(
            TagTypeDefinition::link("RELATION")
                .prefix("R")
                .argument("arg1")
                .argument("arg2"),
        )
}

pub fn person_relation_schema() -> Arc<SchemaModel> {
    Arc::new(
        person_relation_definition()
            .build()
            .expect("fixture schema is valid"),
    )
}

pub fn tag_type(schema: &SchemaModel, name: &str) -> Arc<TagType> {
    schema
        .type_by_name(name)
        .unwrap_or_else(|| panic!("fixture schema has no type {name}"))
}

pub fn span(start: usize, end: usize) -> Span {
    Span::new(start, end).expect("valid fixture span")
}

pub fn empty_store(text: &str) -> TagStore {
    TagStore::new(person_relation_schema(), Document::new("doc.txt", text))
}

pub fn store_with_driver(text: &str, driver: Box<dyn PersistenceDriver>) -> TagStore {
    TagStore::with_driver(person_relation_schema(), Document::new("doc.txt", text), driver)
}

/// Create a PERSON tag over one span with defaults populated
pub fn add_person(store: &mut TagStore, start: usize, end: usize) -> TagId {
    let person = tag_type(store.schema(), "PERSON");
    let id = store.next_id(&person);
    store
        .create_extent_tag(id.clone(), &person, None, Some(&[span(start, end)]))
        .expect("fixture person is valid");
    tagbench_store::populate_default_attributes(store, &id).expect("defaults apply");
    id
}

/// Create a RELATION tag binding whichever arguments are given
pub fn add_relation(store: &mut TagStore, arg1: Option<&TagId>, arg2: Option<&TagId>) -> TagId {
    let relation = tag_type(store.schema(), "RELATION");
    let id = store.next_id(&relation);
    store
        .create_link_tag(id.clone(), &relation)
        .expect("fixture relation is valid");
    for (name, target) in [("arg1", arg1), ("arg2", arg2)] {
        if let Some(target) = target {
            let argument = relation.argument(name).expect("declared slot").clone();
            store
                .add_or_update_argument(&id, &argument, target)
                .expect("fixture binding is valid");
        }
    }
    id
}

/// Snapshot of [`STORY_TEXT`] with two PERSON tags and one RELATION
pub fn story_snapshot(name: &str) -> DocumentSnapshot {
    DocumentSnapshot {
        task: "relations".into(),
        document: name.into(),
        text: STORY_TEXT.into(),
        tags: vec![
            TagRecord::extent("P1", "PERSON", "0~4".parse().expect("span"))
                .with_attribute("role", "subject"),
            TagRecord::extent("P2", "PERSON", "9~13".parse().expect("span"))
                .with_attribute("role", "object"),
            TagRecord::link("R1", "RELATION")
                .with_argument("arg1", "P1")
                .with_argument("arg2", "P2"),
        ],
    }
}

pub fn write_snapshot(dir: &Path, name: &str, snapshot: &DocumentSnapshot) -> PathBuf {
    let path = dir.join(name);
    let json = snapshot.to_json_string().expect("snapshot serializes");
    std::fs::write(&path, json).expect("write snapshot");
    path
}

pub fn write_text(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write text");
    path
}

pub fn write_schema_json(dir: &Path) -> PathBuf {
    let path = dir.join("relations.json");
    let json = serde_json::json!({
        "name": "relations",
        "tags": [
            {
                "name": "PERSON",
                "kind": "extent",
                "attributes": [
                    { "name": "role", "default": "subject", "values": ["subject", "object"], "required": true }
                ]
            },
            { "name": "EVENT", "kind": "extent", "non_consuming": true },
            { "name": "RELATION", "kind": "link", "prefix": "R", "arguments": ["arg1", "arg2"] }
        ]
    });
    std::fs::write(&path, json.to_string()).expect("write schema");
    path
}

pub fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Memory driver that refuses every call while its switch is on
#[derive(Debug, Clone)]
pub struct FailingDriver {
    inner: Arc<std::sync::Mutex<MemoryDriver>>,
    failing: Arc<FailFlags>,
}

#[derive(Debug, Default)]
struct FailFlags {
    all: AtomicBool,
    updates: AtomicBool,
}

/// Handle flipping a [`FailingDriver`] from outside its store
#[derive(Debug, Clone)]
pub struct FailSwitch(Arc<FailFlags>);

impl FailSwitch {
    pub fn fail(&self) {
        self.0.all.store(true, Ordering::SeqCst);
    }

    /// Refuse updates only; inserts, deletes and exports still succeed
    pub fn fail_updates(&self) {
        self.0.updates.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.0.all.store(false, Ordering::SeqCst);
        self.0.updates.store(false, Ordering::SeqCst);
    }
}

impl FailingDriver {
    pub fn new() -> (Self, FailSwitch) {
        let failing = Arc::new(FailFlags::default());
        let driver = Self {
            inner: Arc::new(std::sync::Mutex::new(MemoryDriver::new())),
            failing: Arc::clone(&failing),
        };
        (driver, FailSwitch(failing))
    }

    /// Records the inner driver holds, regardless of the switch
    pub fn record_count(&self) -> usize {
        self.inner.lock().expect("driver lock").len()
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), PersistenceError> {
        if self.failing.all.load(Ordering::SeqCst) || flag.load(Ordering::SeqCst) {
            Err(PersistenceError::Backend("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

impl PersistenceDriver for FailingDriver {
    fn insert(&mut self, record: &TagRecord) -> Result<(), PersistenceError> {
        self.check(&self.failing.all)?;
        self.inner.lock().expect("driver lock").insert(record)
    }

    fn update(&mut self, record: &TagRecord) -> Result<(), PersistenceError> {
        self.check(&self.failing.updates)?;
        self.inner.lock().expect("driver lock").update(record)
    }

    fn delete(&mut self, ids: &[TagId]) -> Result<(), PersistenceError> {
        self.check(&self.failing.all)?;
        self.inner.lock().expect("driver lock").delete(ids)
    }

    fn export(&self) -> Result<Vec<TagRecord>, PersistenceError> {
        self.check(&self.failing.all)?;
        self.inner.lock().expect("driver lock").export()
    }

    fn destroy(&mut self) -> Result<(), PersistenceError> {
        self.inner.lock().expect("driver lock").destroy()
    }

    fn source_name(&self) -> String {
        "failing".to_string()
    }
}
