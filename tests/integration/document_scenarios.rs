use std::sync::Arc;
use toolbox_notes::{
    MemoryWikiStore, Note, PruneCutoff, PruneOptions, ReadMode, Toolbox, ToolboxError, WriteMode,
};

use crate::integration::support::{config, reference_page, store, usernotes_page};

/// Alice has three notes stamped the same second, in this stored order.
fn same_second_page() -> String {
    usernotes_page(
        &["mod1"],
        &[Some("spamwarn"), Some("ban"), None],
        r#"{"alice":{"ns":[
            {"t":100,"n":"spam again","m":0,"w":0,"l":""},
            {"t":100,"n":"banned","m":0,"w":1,"l":""},
            {"t":100,"n":"plain","m":0,"w":2,"l":""}
        ]},"ghost":{"ns":[]}}"#,
    )
}

#[test]
fn reference_page_decodes() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    let notes = store.list_notes("bob", ReadMode::Local).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].note, "test");
    assert_eq!(notes[0].time, 1000);
    assert_eq!(notes[0].moderator.as_deref(), Some("mod1"));
    assert_eq!(notes[0].warning.as_deref(), Some("spamwarn"));
    assert_eq!(notes[0].link, None);
}

#[test]
fn removing_only_note_removes_user() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    let reason = store.remove("bob", 1000, WriteMode::Immediate).unwrap();
    assert_eq!(reason, "\"delete all notes on user 'bob'\"");
    assert!(store.list_users(ReadMode::Fresh).unwrap().is_empty());
}

#[test]
fn unknown_warning_kind_is_rejected() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    let err = store
        .add(
            Note::new("carol", "hello").with_warning("not_a_real_kind"),
            WriteMode::Immediate,
        )
        .unwrap_err();
    assert!(matches!(err, ToolboxError::InvalidWarningKind(_)));
    assert!(!store
        .list_users(ReadMode::Local)
        .unwrap()
        .contains(&"carol".to_string()));
    assert!(wiki.edits().is_empty());
}

#[test]
fn add_then_purge_leaves_no_user() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    store
        .add(Note::new("alice", "watch").with_time(5), WriteMode::Immediate)
        .unwrap();
    store.purge("alice", WriteMode::Immediate).unwrap();
    let users = store.list_users(ReadMode::Fresh).unwrap();
    assert_eq!(users, vec!["bob".to_string()]);
}

#[test]
fn user_lookup_ignores_case_and_keeps_stored_casing() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    store
        .add(Note::new("Alice", "first").with_time(10), WriteMode::Immediate)
        .unwrap();
    let reason = store
        .add(Note::new("aLiCe", "second").with_time(20), WriteMode::Immediate)
        .unwrap();
    assert_eq!(reason, "\"create new note on user 'aLiCe'\"");

    let notes = store.list_notes("ALICE", ReadMode::Fresh).unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.user == "Alice"));
}

#[test]
fn notes_come_back_newest_first() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    for t in [2000, 4000, 3000] {
        store
            .add(Note::new("bob", format!("at {}", t)).with_time(t), WriteMode::Batch)
            .unwrap();
    }
    store.save("\"three notes\"").unwrap();

    let times: Vec<_> = store
        .list_notes("bob", ReadMode::Fresh)
        .unwrap()
        .iter()
        .map(|n| n.time)
        .collect();
    assert_eq!(times, vec![4000, 3000, 2000, 1000]);
}

#[test]
fn new_moderator_is_appended_to_constants() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    store
        .add(
            Note::new("bob", "second opinion").with_moderator("mod2"),
            WriteMode::Immediate,
        )
        .unwrap();

    let page: serde_json::Value =
        serde_json::from_str(&wiki.page("usernotes").unwrap()).unwrap();
    assert_eq!(page["constants"]["users"], serde_json::json!(["mod1", "mod2"]));
    assert_eq!(
        page["constants"]["warnings"],
        serde_json::json!(["spamwarn", null])
    );
}

#[test]
fn links_round_trip_through_the_page() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", reference_page()));
    let mut store = store(&wiki, config());

    store
        .add(
            Note::new("dave", "spam comment")
                .with_time(50)
                .with_link("https://www.reddit.com/r/testsub/comments/abc123/some_title/def456/"),
            WriteMode::Immediate,
        )
        .unwrap();

    let notes = store.list_notes("dave", ReadMode::Fresh).unwrap();
    assert_eq!(
        notes[0].link.as_deref(),
        Some("https://www.reddit.com/r/testsub/comments/abc123/-/def456")
    );
}

#[test]
fn unknown_top_level_keys_survive_a_save() {
    let mut page: serde_json::Value = serde_json::from_str(&reference_page()).unwrap();
    page["constants"]["colors"] = serde_json::json!({"spamwarn": "purple"});
    page["note"] = serde_json::json!("kept");
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", page.to_string()));
    let mut store = store(&wiki, config());

    store
        .add(Note::new("erin", "hi").with_time(1), WriteMode::Immediate)
        .unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(&wiki.page("usernotes").unwrap()).unwrap();
    assert_eq!(saved["note"], "kept");
    assert_eq!(saved["constants"]["colors"]["spamwarn"], "purple");
}

#[test]
fn empty_user_on_page_is_not_loaded() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", same_second_page()));
    let mut store = store(&wiki, config());
    assert_eq!(store.list_users(ReadMode::Local).unwrap(), vec!["alice".to_string()]);
}

#[test]
fn same_second_notes_list_in_page_order() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", same_second_page()));
    let mut store = store(&wiki, config());
    let texts: Vec<String> = store
        .list_notes("alice", ReadMode::Local)
        .unwrap()
        .into_iter()
        .map(|n| n.note)
        .collect();
    assert_eq!(texts, vec!["spam again", "banned", "plain"]);
}

#[test]
fn remove_at_position_picks_the_listed_note_among_equal_timestamps() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", same_second_page()));
    let mut tb = Toolbox::new("testsub", wiki, Arc::new(config()));

    tb.remove_note_at("alice", 2, WriteMode::Immediate).unwrap();
    let texts: Vec<String> = tb
        .usernotes_mut()
        .list_notes("alice", ReadMode::Fresh)
        .unwrap()
        .into_iter()
        .map(|n| n.note)
        .collect();
    assert_eq!(texts, vec!["spam again", "banned"]);
}

#[test]
fn prune_keeps_excluded_kind_among_equal_timestamps() {
    let wiki = Arc::new(MemoryWikiStore::new().with_page("usernotes", same_second_page()));
    let mut tb = Toolbox::new("testsub", wiki, Arc::new(config()));

    let report = tb
        .prune_notes_at(
            &PruneOptions {
                cutoff: PruneCutoff::Before(1_000),
                exclude_kinds: vec!["ban".to_string()],
                dry_run: false,
            },
            10_000,
        )
        .unwrap();
    assert_eq!(report.notes_removed, 2);
    assert_eq!(report.notes_preserved, 1);
    assert_eq!(report.users_affected, 1);

    let left = tb
        .usernotes_mut()
        .list_notes("alice", ReadMode::Fresh)
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].note, "banned");
    assert_eq!(left[0].warning.as_deref(), Some("ban"));
}
