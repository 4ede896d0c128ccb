use std::sync::Arc;
use tempfile::TempDir;
use toolbox_notes::wiki::WikiPageStore;
use toolbox_notes::{
    DirectoryWikiStore, Note, PruneCutoff, PruneOptions, ReadMode, SearchField, Toolbox,
    WriteMode,
};

use crate::integration::support::{config, reference_page};

const SETTINGS: &str = r#"{"ver":1,"usernoteColors":[{"key":"spamwarn","text":"Spam"},{"key":"ban","text":"Ban"}]}"#;

fn toolbox(dir: &TempDir) -> (Arc<DirectoryWikiStore>, Toolbox) {
    let wiki = Arc::new(DirectoryWikiStore::new(dir.path().join("testsub")));
    let tb = Toolbox::new("testsub", wiki.clone(), Arc::new(config()));
    (wiki, tb)
}

#[test]
fn notes_persist_across_store_instances() {
    let dir = TempDir::new().unwrap();
    {
        let (wiki, mut tb) = toolbox(&dir);
        wiki.edit_page("toolbox", SETTINGS, "seed settings").unwrap();
        tb.load().unwrap();
        tb.usernotes_mut()
            .add(
                Note::new("bob", "ban evasion").with_time(10).with_warning("ban"),
                WriteMode::Immediate,
            )
            .unwrap();
    }

    let (_, mut tb) = toolbox(&dir);
    tb.load().unwrap();
    let notes = tb.usernotes_mut().list_notes("BOB", ReadMode::Local).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].warning.as_deref(), Some("ban"));

    let log = std::fs::read_to_string(dir.path().join("testsub").join("usernotes.log")).unwrap();
    let reasons: Vec<_> = log.lines().collect();
    assert_eq!(reasons.len(), 2);
    assert!(reasons[0].ends_with("\"initialize usernotes page\" via toolbox-notes"));
    assert!(reasons[1].ends_with("\"create new note on new user 'bob'\" via toolbox-notes"));
}

#[test]
fn prune_and_search_over_files() {
    let dir = TempDir::new().unwrap();
    let (wiki, mut tb) = toolbox(&dir);
    wiki.edit_page("usernotes", &reference_page(), "seed").unwrap();
    tb.load().unwrap();
    tb.usernotes_mut()
        .add(Note::new("amy", "recent").with_time(900_000), WriteMode::Immediate)
        .unwrap();

    let hits = tb
        .search_notes("mod1", SearchField::Moderator, ReadMode::Fresh)
        .unwrap();
    assert_eq!(hits.len(), 2);

    let report = tb
        .prune_notes(&PruneOptions {
            cutoff: PruneCutoff::Before(500_000),
            exclude_kinds: Vec::new(),
            dry_run: false,
        })
        .unwrap();
    assert_eq!(report.notes_removed, 1);
    assert_eq!(
        tb.usernotes_mut().list_users(ReadMode::Fresh).unwrap(),
        vec!["amy".to_string()]
    );
}
