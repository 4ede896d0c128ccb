use std::sync::Arc;
use toolbox_notes::config::MissingPagePolicy;
use toolbox_notes::wiki::EditPath;
use toolbox_notes::{MemoryWikiStore, Note, ReadMode, ToolboxError, WriteMode};

use crate::integration::support::{config, reference_page, store, usernotes_page};

fn small_quota() -> toolbox_notes::ToolboxConfig {
    let mut config = config();
    config.wiki.max_page_size = 400;
    config.usernotes.quota_multiplier = 1;
    config
}

fn many_notes(count: i64) -> Vec<Note> {
    (0..count)
        .map(|i| Note::new(format!("user{}", i), format!("note {} {}", i, i * 7919)).with_time(i))
        .collect()
}

#[test]
fn oversized_document_is_never_sent() {
    let empty = usernotes_page(&[], &[None], "{}");
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", empty));
    let mut store = store(&wiki, small_quota());

    for note in many_notes(200) {
        store.add(note, WriteMode::Batch).unwrap();
    }
    let err = store.save("\"too much\"").unwrap_err();
    match err {
        ToolboxError::DocumentTooLarge { size, limit } => {
            assert_eq!(limit, 400);
            assert!(size > limit);
        }
        other => panic!("expected DocumentTooLarge, got {}", other),
    }
    assert!(wiki.edits().is_empty());
    assert_eq!(store.list_users(ReadMode::Local).unwrap().len(), 200);
}

#[test]
fn failed_immediate_write_rolls_back_memory() {
    let empty = usernotes_page(&[], &[None], "{}");
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", empty));
    let mut store = store(&wiki, small_quota());

    let mut seed: u64 = 42;
    let long_text: String = (0..3000)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            char::from(b'a' + ((seed >> 33) % 26) as u8)
        })
        .collect();
    let err = store
        .add(Note::new("bob", long_text), WriteMode::Immediate)
        .unwrap_err();
    assert!(matches!(err, ToolboxError::DocumentTooLarge { .. }));
    assert!(store.list_users(ReadMode::Local).unwrap().is_empty());
    assert!(store.document().unwrap().moderators().is_empty());
}

#[test]
fn transport_failure_uses_fallback_once() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    wiki.fail_primary_edits(true);
    let mut store = store(&wiki, config());

    store
        .add(Note::new("bob", "retry me").with_time(2000), WriteMode::Immediate)
        .unwrap();

    let edits = wiki.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].path, EditPath::RawEdit);
    assert_eq!(
        edits[0].reason,
        "\"create new note on user 'bob'\" via toolbox-notes"
    );
    assert_eq!(store.list_notes("bob", ReadMode::Fresh).unwrap().len(), 2);
}

#[test]
fn missing_page_is_created_by_default() {
    let wiki = Arc::new(MemoryWikiStore::new());
    let mut store = store(&wiki, config());

    store
        .add(Note::new("bob", "first").with_time(1), WriteMode::Immediate)
        .unwrap();

    let paths: Vec<_> = wiki.edits().iter().map(|e| e.path).collect();
    assert_eq!(paths, vec![EditPath::Create, EditPath::Edit]);
    assert_eq!(store.document().unwrap().version(), 6);
}

#[test]
fn missing_page_fails_under_fail_policy() {
    let wiki = Arc::new(MemoryWikiStore::new());
    let mut config = config();
    config.usernotes.missing_page = MissingPagePolicy::Fail;
    let mut store = store(&wiki, config);

    let err = store.list_users(ReadMode::Local).unwrap_err();
    assert!(matches!(err, ToolboxError::PageNotFound { .. }));
    assert!(wiki.page("usernotes").is_none());
}

#[test]
fn schema_mismatch_blocks_writes() {
    let page = reference_page().replace("\"ver\":6", "\"ver\":7");
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", page));
    let mut store = store(&wiki, config());

    let err = store
        .add(Note::new("bob", "x"), WriteMode::Immediate)
        .unwrap_err();
    assert!(matches!(
        err,
        ToolboxError::SchemaVersionMismatch {
            expected: 6,
            found: 7,
            ..
        }
    ));
    assert!(wiki.edits().is_empty());
}

#[test]
fn batch_mutations_share_one_load_and_one_save() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    store
        .add(Note::new("amy", "a").with_time(1), WriteMode::Batch)
        .unwrap();
    store
        .add(Note::new("amy", "b").with_time(2), WriteMode::Batch)
        .unwrap();
    store.remove("bob", 1000, WriteMode::Batch).unwrap();
    assert_eq!(wiki.fetch_count(), 1);
    assert!(wiki.edits().is_empty());

    store.save("\"batch edit\"").unwrap();
    assert_eq!(wiki.edits().len(), 1);
    assert_eq!(
        store.list_users(ReadMode::Fresh).unwrap(),
        vec!["amy".to_string()]
    );
}

#[test]
fn local_reads_do_not_see_external_edits_until_fresh() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());
    assert_eq!(store.list_users(ReadMode::Local).unwrap(), vec!["bob".to_string()]);

    let mut other = crate::integration::support::store(&wiki, config());
    other
        .add(Note::new("zoe", "elsewhere").with_time(9), WriteMode::Immediate)
        .unwrap();

    assert_eq!(store.list_users(ReadMode::Local).unwrap().len(), 1);
    assert_eq!(store.list_users(ReadMode::Fresh).unwrap().len(), 2);
}

#[test]
fn allowed_warnings_extend_the_table() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());
    store.set_allowed_warnings(vec!["ban".to_string()]);

    store
        .add(
            Note::new("bob", "banned").with_time(3000).with_warning("ban"),
            WriteMode::Immediate,
        )
        .unwrap();
    let page: serde_json::Value =
        serde_json::from_str(&wiki.page("usernotes").unwrap()).unwrap();
    assert_eq!(
        page["constants"]["warnings"],
        serde_json::json!(["spamwarn", null, "ban"])
    );
}
