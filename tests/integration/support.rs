use std::sync::Arc;
use toolbox_notes::usernotes::{BlobCodec, UserMap};
use toolbox_notes::{MemoryWikiStore, ToolboxConfig, UsernotesStore};

/// Usernotes page text with `users_json` packed into the blob.
pub fn usernotes_page(moderators: &[&str], warnings: &[Option<&str>], users_json: &str) -> String {
    let users: UserMap = serde_json::from_str(users_json).unwrap();
    let blob = BlobCodec::new(9).encode_users(&users).unwrap();
    serde_json::json!({
        "ver": 6,
        "constants": { "users": moderators, "warnings": warnings },
        "blob": blob,
    })
    .to_string()
}

/// The reference page: bob has one note by mod1 with a spam warning.
pub fn reference_page() -> String {
    usernotes_page(
        &["mod1"],
        &[Some("spamwarn"), None],
        r#"{"bob":{"ns":[{"t":1000,"n":"test","m":0,"w":0,"l":""}]}}"#,
    )
}

pub fn config() -> ToolboxConfig {
    let mut config = ToolboxConfig::default();
    config.usernotes.default_moderator = Some("mod1".to_string());
    config
}

pub fn store(wiki: &Arc<MemoryWikiStore>, config: ToolboxConfig) -> UsernotesStore {
    UsernotesStore::new("testsub", wiki.clone(), Arc::new(config))
}
