//! Wiki page storage
//!
//! The usernotes engine never talks HTTP itself; it reads and writes whole
//! pages through a [`WikiPageStore`].

pub mod contract;
pub mod directory;
pub mod memory;
pub mod reddit;

pub use contract::{EditPath, WikiPageStore};
pub use directory::DirectoryWikiStore;
pub use memory::{EditRecord, MemoryWikiStore};
pub use reddit::RedditWikiStore;
