use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Document, Node};

/// Schema tag written into every saved document.
pub const SCHEMA: &str = "plate-format";
/// Newest envelope version this crate reads and the one it writes.
pub const VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown document schema {0:?}, expected {SCHEMA:?}")]
    Schema(String),
    #[error("document version {0} is newer than the supported version {VERSION}")]
    Version(u32),
}

/// Saved form of a document: `{"schema", "version", "document"}`.
///
/// Loading also accepts a bare array of top-level nodes, the shape editors
/// usually keep as their initial value; it is read as the current version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValue {
    pub schema: String,
    pub version: u32,
    pub document: Document,
}

impl DocumentValue {
    pub fn new(document: Document) -> Self {
        Self {
            schema: SCHEMA.to_string(),
            version: VERSION,
            document,
        }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn to_json_pretty(&self) -> Result<String, ValueError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a saved document.
    pub fn from_json_str(s: &str) -> Result<Self, ValueError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        if value.is_array() {
            let children: Vec<Node> = serde_json::from_value(value)?;
            return Ok(Self::new(Document::new(children)));
        }

        let value: Self = serde_json::from_value(value)?;
        value.check()?;
        Ok(value)
    }

    fn check(&self) -> Result<(), ValueError> {
        if self.schema != SCHEMA {
            return Err(ValueError::Schema(self.schema.clone()));
        }
        if self.version > VERSION {
            return Err(ValueError::Version(self.version));
        }
        Ok(())
    }
}
