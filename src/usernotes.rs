//! Usernotes engine
//!
//! Reads and writes the Toolbox usernotes wiki page: a versioned JSON
//! document whose per-user notes are packed into a compressed blob, with
//! moderators and warning kinds interned in constants tables and links
//! shortened to tokens.

pub mod blob;
pub mod document;
pub mod index;
pub mod link;
pub mod note;
pub mod store;

pub use blob::{BlobCodec, WireConstants, WireDocument};
pub use document::{NotesDocument, StoredNote, UserMap, UserRecord};
pub use index::{IndexTable, KnownWarnings, ModeratorTable, WarningTable};
pub use link::LinkCodec;
pub use note::{Note, ReadMode, SortOrder, WriteMode};
pub use store::UsernotesStore;
