//! Core scalar types for the usernotes engine.

/// Timestamp: unix seconds at which a note was written
pub type Timestamp = i64;

/// ModIndex: position of a moderator name in the constants table
pub type ModIndex = usize;

/// WarningIndex: position of a warning kind in the constants table
pub type WarningIndex = usize;
