//! Blob codec
//!
//! On the wire the per-user notes are not stored as JSON directly: the users
//! mapping is serialized, zlib-compressed and base64-encoded into the `blob`
//! field so that the page fits the wiki size quota.
//!
//! ```text
//! { "ver": 6,
//!   "constants": { "users": [..], "warnings": [..] },
//!   "blob": base64(zlib(json({ "<user>": { "ns": [..] } }))) }
//! ```

use crate::error::ToolboxError;
use crate::usernotes::document::{NotesDocument, UserMap};
use crate::usernotes::index::{ModeratorTable, WarningTable};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Constants section as written on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireConstants {
    #[serde(default)]
    pub users: ModeratorTable,
    #[serde(default)]
    pub warnings: WarningTable,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Usernotes page as written on the wiki, users still packed in `blob`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    pub ver: u64,
    #[serde(default)]
    pub constants: WireConstants,
    pub blob: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// zlib + base64 codec at a fixed compression level.
#[derive(Debug, Clone, Copy)]
pub struct BlobCodec {
    level: u32,
}

impl BlobCodec {
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn encode_users(&self, users: &UserMap) -> Result<String, ToolboxError> {
        let json = serde_json::to_vec(users)?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(&json)
            .map_err(|e| ToolboxError::Codec(format!("Failed to deflate blob: {}", e)))?;
        let compressed = encoder
            .finish()
            .map_err(|e| ToolboxError::Codec(format!("Failed to finish deflate stream: {}", e)))?;
        Ok(STANDARD.encode(compressed))
    }

    pub fn decode_users(&self, blob: &str) -> Result<UserMap, ToolboxError> {
        let compressed = STANDARD
            .decode(blob.trim())
            .map_err(|e| ToolboxError::Codec(format!("Blob is not valid base64: {}", e)))?;
        let mut json = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .map_err(|e| ToolboxError::Codec(format!("Failed to inflate blob: {}", e)))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Unpack `blob` into the users mapping. Users with no notes are dropped.
    pub fn expand(&self, wire: WireDocument) -> Result<NotesDocument, ToolboxError> {
        let version = u32::try_from(wire.ver).map_err(|_| {
            ToolboxError::CorruptDocument(format!("schema version {} out of range", wire.ver))
        })?;
        let mut users = self.decode_users(&wire.blob)?;
        for name in users.drop_empty() {
            tracing::warn!(user = %name, "Dropping user with an empty note list");
        }
        Ok(NotesDocument {
            version,
            moderators: wire.constants.users,
            warnings: wire.constants.warnings,
            users,
            extra: wire.extra,
            extra_constants: wire.constants.extra,
        })
    }

    /// Pack the users mapping into `blob`. The document itself is not touched.
    pub fn compress(&self, doc: &NotesDocument) -> Result<WireDocument, ToolboxError> {
        Ok(WireDocument {
            ver: u64::from(doc.version),
            constants: WireConstants {
                users: doc.moderators.clone(),
                warnings: doc.warnings.clone(),
                extra: doc.extra_constants.clone(),
            },
            blob: self.encode_users(&doc.users)?,
            extra: doc.extra.clone(),
        })
    }
}
