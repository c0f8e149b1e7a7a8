// src/api/responses.rs
//! Wire-shape types for the public Notion API.
//!
//! These mirror the JSON the API actually sends; conversion into the
//! domain model lives in `parser`. Block payloads are kept as raw JSON
//! values keyed by the block's type discriminant, because the payload
//! key changes with the type (`"paragraph"`, `"heading_1"`, …).

use serde::Deserialize;
use serde_json::Value;

/// Generic paginated list response.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePaginated {
    #[serde(default)]
    pub results: Vec<Value>,
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
}

/// Envelope fields common to every block object.
#[derive(Debug, Clone, Deserialize)]
pub struct WireBlockEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub archived: bool,
}

/// One rich text run on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRichText {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<WireTextPayload>,
    pub mention: Option<Value>,
    pub equation: Option<WireEquation>,
    #[serde(default)]
    pub annotations: WireAnnotations,
    #[serde(default)]
    pub plain_text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTextPayload {
    #[serde(default)]
    pub content: String,
    pub link: Option<WireLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLink {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireEquation {
    pub expression: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireAnnotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
    pub color: Option<String>,
}

/// Page object envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePage {
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    pub url: Option<String>,
    pub icon: Option<Value>,
    pub cover: Option<Value>,
    pub created_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_edited_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

/// Database object envelope — only what the schema summary needs.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDatabase {
    #[serde(default)]
    pub title: Vec<WireRichText>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}
