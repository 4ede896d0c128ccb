//! Toolbox Notes: Moderator Toolbox usernotes engine
//!
//! Loads the usernotes wiki page of a subreddit, decodes its compressed blob
//! into an editable document, applies note additions and removals, and
//! re-encodes and saves the page within the wiki size quota.

pub mod config;
pub mod error;
pub mod logging;
pub mod settings;
pub mod toolbox;
pub mod tooling;
pub mod types;
pub mod usernotes;
pub mod wiki;

pub use config::ToolboxConfig;
pub use error::ToolboxError;
pub use settings::ToolboxSettings;
pub use toolbox::{PruneCutoff, PruneOptions, PruneReport, SearchField, Toolbox};
pub use usernotes::{Note, ReadMode, SortOrder, UsernotesStore, WriteMode};
pub use wiki::{DirectoryWikiStore, MemoryWikiStore, RedditWikiStore, WikiPageStore};
