//! Session lifecycle: schema load, documents, switching, edits and saving.

use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use tagbench_schema::{SchemaFile, SchemaModel, SchemaSource};
use tagbench_session::{
    AnnotationMode, SessionConfig, SessionError, SessionManager, SnapshotFile, TagField,
    TextDocument,
};
use tagbench_span::Anchor;
use tagbench_store::{StoreError, TagId};
use tagbench_test_utils::{
    person_relation_definition, span, story_snapshot, temp_dir, write_schema_json,
    write_snapshot, FailingDriver, SHORT_TEXT, STORY_TEXT,
};

fn session(config: SessionConfig) -> SessionManager {
    let mut session = SessionManager::new(config);
    session
        .load_schema(Arc::new(person_relation_definition()))
        .unwrap();
    session
}

fn anchors(range: std::ops::Range<usize>) -> BTreeSet<Anchor> {
    range.collect()
}

#[test]
fn activation_differences_drive_repaint() {
    let dir = temp_dir();
    let b_path = write_snapshot(dir.path(), "b.json", &story_snapshot("b.txt"));
    let mut session = session(SessionConfig::new().with_activate_all_on_open(false));

    let opened = session
        .open_document(&TextDocument::new("/corpus/a.txt", STORY_TEXT))
        .unwrap();
    assert!(opened.repaint.is_empty());
    session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    let shown = session.set_type_activated(0, "PERSON", true).unwrap();
    assert_eq!(shown, anchors(0..4));

    // A -> B: PERSON on in A, off in B
    let to_b = session.open_document(&SnapshotFile::new(&b_path)).unwrap();
    assert_eq!(to_b.index, 1);
    assert_eq!(to_b.repaint, anchors(0..4).union(&anchors(9..13)).copied().collect());

    // B -> A: only A's PERSON anchors flip
    let to_a = session.switch_to(0).unwrap();
    assert_eq!(to_a.repaint, anchors(0..4));

    // A -> A with nothing toggled
    assert!(session.switch_to(0).unwrap().repaint.is_empty());
}

#[test]
fn toggles_on_other_documents_wait_for_the_switch() {
    let mut session = session(SessionConfig::new().with_activate_all_on_open(false));
    session
        .open_document(&TextDocument::new("/corpus/a.txt", STORY_TEXT))
        .unwrap();
    session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    session
        .open_document(&TextDocument::new("/corpus/b.txt", STORY_TEXT))
        .unwrap();

    assert!(session.set_type_activated(0, "PERSON", true).unwrap().is_empty());
    assert!(session.document(0).unwrap().is_type_activated("PERSON"));
    assert_eq!(session.switch_to(0).unwrap().repaint, anchors(0..4));
}

#[test]
fn repeated_switch_without_toggle_is_empty() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/corpus/a.txt", STORY_TEXT))
        .unwrap();
    session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    session
        .open_document(&TextDocument::new("/corpus/b.txt", STORY_TEXT))
        .unwrap();

    for _ in 0..2 {
        session.switch_to(0).unwrap();
        let again = session.switch_to(1).unwrap();
        assert!(again.repaint.is_empty());
    }
}

#[test]
fn first_open_repaints_every_activated_tag() {
    let dir = temp_dir();
    let path = write_snapshot(dir.path(), "story.json", &story_snapshot("story.txt"));
    let mut session = session(SessionConfig::new());
    let opened = session.open_document(&SnapshotFile::new(&path)).unwrap();
    assert_eq!(opened.repaint, anchors(0..4).union(&anchors(9..13)).copied().collect());
    assert!(!session.has_unsaved_changes());
}

#[test]
fn duplicate_path_rejected() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/corpus/a.txt", SHORT_TEXT))
        .unwrap();
    let err = session
        .open_document(&TextDocument::new("/corpus/a.txt", SHORT_TEXT))
        .unwrap_err();
    assert!(matches!(err, SessionError::DuplicatePath(_)));
    assert!(err.is_validation());
    assert_eq!(session.documents().len(), 1);
}

#[test]
fn closing_documents() {
    let mut session = session(SessionConfig::new());
    for name in ["/c/a.txt", "/c/b.txt", "/c/c.txt"] {
        session
            .open_document(&TextDocument::new(name, SHORT_TEXT))
            .unwrap();
    }
    assert_eq!(session.current_index(), Some(2));

    // closing a non-current document shifts the current index
    assert!(session.close_document(0).unwrap().is_none());
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.current_document().unwrap().name(), "c.txt");

    // closing the current document switches to a neighbour
    let switched = session.close_document(1).unwrap().unwrap();
    assert_eq!(switched.index, 0);
    assert_eq!(session.current_document().unwrap().name(), "b.txt");

    assert!(matches!(
        session.close_document(4),
        Err(SessionError::IndexOutOfRange { index: 4, len: 1 })
    ));
}

#[test]
fn closing_last_document_reloads_schema() {
    let dir = temp_dir();
    let schema_path = write_schema_json(dir.path());
    let mut session = SessionManager::new(SessionConfig::new());
    let first = session
        .load_schema(Arc::new(SchemaFile::new(&schema_path)))
        .unwrap();

    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    assert!(session.close_document(0).unwrap().is_none());

    assert!(session.is_schema_loaded());
    assert!(session.documents().is_empty());
    assert_eq!(session.current_index(), None);
    let reloaded = session.schema().unwrap();
    assert!(!Arc::ptr_eq(&first, reloaded));
    let names = |schema: &SchemaModel| -> Vec<String> {
        schema.all_types().iter().map(|t| t.name().to_string()).collect()
    };
    assert_eq!(names(reloaded.as_ref()), names(first.as_ref()));

    // the next open starts from a fresh baseline
    let opened = session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    assert!(opened.repaint.is_empty());
    assert!(matches!(
        session.create_tag("PERSON", &[span(0, 4)]).unwrap().primary_id(),
        Some(id) if id.as_str() == "P1"
    ));
}

#[test]
fn failed_schema_load_keeps_prior_state() {
    let dir = temp_dir();
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();

    let missing: Arc<dyn SchemaSource> = Arc::new(SchemaFile::new(dir.path().join("none.json")));
    assert!(matches!(
        session.load_schema(missing),
        Err(SessionError::Schema(_))
    ));
    assert_eq!(session.documents().len(), 1);
    assert_eq!(session.schema().unwrap().name(), "relations");
}

#[test]
fn loading_a_schema_closes_everything() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    session
        .load_schema(Arc::new(person_relation_definition()))
        .unwrap();
    assert!(session.documents().is_empty());
    assert!(matches!(
        session.create_tag("PERSON", &[span(0, 4)]),
        Err(SessionError::NoDocument)
    ));
}

#[test]
fn create_and_delete_report_outcomes() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();

    let anna = session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    let anna_id = anna.primary_id().unwrap().clone();
    assert_eq!(anna.updated[0].attribute("role"), Some("subject"));
    assert_eq!(anna.repaint, anchors(0..4));

    let bob = session.create_tag("PERSON", &[span(13, 16)]).unwrap();
    let bob_id = bob.primary_id().unwrap().clone();
    let link = session
        .create_link_with_arguments("RELATION", &[anna_id.clone(), bob_id])
        .unwrap();
    let link_id = link.primary_id().unwrap().clone();
    assert!(tagbench_store::is_complete(&link.updated[0]));
    assert_eq!(link.repaint, anchors(0..4).union(&anchors(13..16)).copied().collect());

    let deleted = session.delete_tag(&anna_id).unwrap();
    let ids: Vec<_> = deleted.deleted.iter().map(|t| t.id().clone()).collect();
    assert_eq!(ids, vec![anna_id, link_id]);
    assert_eq!(deleted.repaint, anchors(0..4).union(&anchors(13..16)).copied().collect());
}

#[test]
fn creation_resets_mode_when_configured() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    session.set_mode(AnnotationMode::MultiSpan).unwrap();
    session
        .create_tag("PERSON", &[span(0, 4), span(13, 16)])
        .unwrap();
    assert_eq!(session.mode(), AnnotationMode::Normal);

    let mut sticky = self::session(SessionConfig::new().with_normal_mode_on_creation(false));
    sticky
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    sticky.set_mode(AnnotationMode::MultiSpan).unwrap();
    sticky.create_tag("PERSON", &[span(0, 4)]).unwrap();
    assert_eq!(sticky.mode(), AnnotationMode::MultiSpan);
}

#[test]
fn field_edits_dispatch_to_the_store() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    let anna = session
        .create_tag("PERSON", &[span(0, 4)])
        .unwrap()
        .primary_id()
        .unwrap()
        .clone();
    let rel = session
        .create_tag("RELATION", &[])
        .unwrap()
        .primary_id()
        .unwrap()
        .clone();

    let bound = session
        .update_field(
            &rel,
            TagField::Argument {
                name: "arg1".into(),
                target: Some(anna.clone()),
            },
        )
        .unwrap();
    assert_eq!(bound.repaint, anchors(0..4));

    let moved = session
        .update_field(&anna, TagField::Spans("0~4,13~16".into()))
        .unwrap();
    let ids: Vec<_> = moved.updated.iter().map(|t| t.id().clone()).collect();
    assert_eq!(ids, vec![anna.clone(), rel.clone()]);
    assert_eq!(moved.repaint, anchors(0..4).union(&anchors(13..16)).copied().collect());
    let text = moved.updated[0].as_extent().unwrap().text().to_string();
    assert_eq!(text, "Anna ... Bob");

    let declined = session
        .update_field(&anna, TagField::Spans("0~4,13~99".into()))
        .unwrap();
    assert!(declined.is_empty());

    let role = session
        .update_field(
            &anna,
            TagField::Attribute {
                name: "role".into(),
                value: "object".into(),
            },
        )
        .unwrap();
    assert_eq!(role.updated[0].attribute("role"), Some("object"));
    assert!(role.repaint.is_empty());

    let err = session
        .update_field(&anna, TagField::Spans("0-4".into()))
        .unwrap_err();
    assert!(matches!(err, SessionError::SpanFormat(_)));

    let err = session
        .update_field(
            &anna,
            TagField::Argument {
                name: "arg1".into(),
                target: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Store(StoreError::TypeMismatch { .. })
    ));

    let err = session
        .update_field(&TagId::new("P99"), TagField::Text("x".into()))
        .unwrap_err();
    assert!(matches!(err, SessionError::Store(StoreError::NotFound(_))));
}

#[test]
fn creation_writes_each_tag_once() {
    let mut session = session(SessionConfig::new());
    let (driver, switch) = FailingDriver::new();
    let records = driver.clone();
    session
        .open_document_with_driver(&TextDocument::new("/c/a.txt", SHORT_TEXT), Box::new(driver))
        .unwrap();
    switch.fail_updates();

    let anna = session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    assert_eq!(anna.updated[0].attribute("role"), Some("subject"));
    let anna_id = anna.primary_id().unwrap().clone();
    let bob_id = session
        .create_tag("PERSON", &[span(13, 16)])
        .unwrap()
        .primary_id()
        .unwrap()
        .clone();
    let link = session
        .create_link_with_arguments("RELATION", &[anna_id.clone(), bob_id.clone()])
        .unwrap();
    assert!(tagbench_store::is_complete(&link.updated[0]));
    assert_eq!(records.record_count(), 3);

    switch.fail();
    let err = session
        .create_link_with_arguments("RELATION", &[anna_id, bob_id])
        .unwrap_err();
    assert!(matches!(err, SessionError::Store(StoreError::Persistence(_))));
    let err = session.create_tag("PERSON", &[span(5, 12)]).unwrap_err();
    assert!(matches!(err, SessionError::Store(StoreError::Persistence(_))));
    switch.recover();

    assert_eq!(session.document(0).unwrap().store().len(), 3);
    assert_eq!(records.record_count(), 3);
}

#[test]
fn overlapping_span_edit_is_declined() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    let anna = session
        .create_tag("PERSON", &[span(0, 4)])
        .unwrap()
        .primary_id()
        .unwrap()
        .clone();

    let declined = session
        .update_field(&anna, TagField::Spans("0~5,3~8".into()))
        .unwrap();
    assert!(declined.is_empty());
    let doc = session.document(0).unwrap();
    let tag = doc.store().get_tag_by_tid(&anna).unwrap().as_extent().unwrap();
    assert_eq!(tag.spans().to_string(), "0~4");
    assert_eq!(tag.text(), "Anna");
}

#[test]
fn snapshot_with_overlapping_spans_is_refused() {
    let dir = temp_dir();
    let mut snapshot = story_snapshot("story.txt");
    snapshot.tags.push(tagbench_store::TagRecord::extent(
        "P3",
        "PERSON",
        "0~5,3~8".parse().unwrap(),
    ));
    let path = write_snapshot(dir.path(), "story.json", &snapshot);
    let raw = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, raw.replace("\"0~8\"", "\"0~5,3~8\"")).unwrap();

    let mut session = session(SessionConfig::new());
    let err = session.open_document(&SnapshotFile::new(&path)).unwrap_err();
    assert!(matches!(err, SessionError::Document(_)));
    assert!(session.documents().is_empty());
}

#[test]
fn unknown_types_are_rejected() {
    let mut session = session(SessionConfig::new());
    session
        .open_document(&TextDocument::new("/c/a.txt", SHORT_TEXT))
        .unwrap();
    assert!(matches!(
        session.create_tag("PLACE", &[span(0, 4)]),
        Err(SessionError::UnknownTagType(_))
    ));
    assert!(matches!(
        session.set_type_activated(0, "PLACE", true),
        Err(SessionError::UnknownTagType(_))
    ));
}

#[test]
fn saving_clears_unsaved_state() {
    let dir = temp_dir();
    let mut session = session(SessionConfig::new().with_filename_suffix("_gold"));
    let doc_path = dir.path().join("a.txt");
    std::fs::write(&doc_path, SHORT_TEXT).unwrap();
    session
        .open_document(&TextDocument::read(&doc_path).unwrap())
        .unwrap();
    session
        .open_document(&TextDocument::new(dir.path().join("b.txt"), SHORT_TEXT))
        .unwrap();
    session.switch_to(0).unwrap();
    session.create_tag("PERSON", &[span(0, 4)]).unwrap();
    assert_eq!(session.unsaved_documents(), vec!["a.txt".to_string()]);

    let suggested = session.suggested_save_path(0).unwrap();
    assert_eq!(suggested.file_name().unwrap(), "a_gold.json");
    let saved = session.save_current(&suggested).unwrap();
    assert!(!session.has_unsaved_changes());

    // the saved snapshot reopens with the same tags
    let mut other = self::session(SessionConfig::new());
    other.open_document(&SnapshotFile::new(&saved)).unwrap();
    let store = other.current_document().unwrap().store();
    assert_eq!(store.len(), 1);
    assert!(!store.is_annotation_changed());
}
