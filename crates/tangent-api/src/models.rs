// Save endpoint wire types
//
// The endpoint receives one key per request and rewrites the matching
// literal in the caller's source file. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

// ── Request ─────────────────────────────────────────────────────────

/// Body of a single save request.
///
/// ```json
/// { "filePath": "src/App.tsx", "id": "hero", "key": "padding", "value": 24 }
/// ```
///
/// `value` is kept as raw JSON so this crate does not depend on the engine's
/// value type; callers convert a number, string, or boolean into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub file_path: String,
    pub id: String,
    pub key: String,
    pub value: serde_json::Value,
}

impl SaveRequest {
    pub fn new(
        file_path: impl Into<String>,
        id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            id: id.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

// ── Response ────────────────────────────────────────────────────────

/// Error payload returned on failure. Only `message` is guaranteed.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}
