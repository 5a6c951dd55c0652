//! # Domain Model: Blocks, Legacy Blocks, and the Persisted Envelope
//!
//! This module defines the core data structures of tilegarden: [`Block`]
//! (current schema), [`LegacyBlock`] (untrusted pre-template records), and
//! [`Envelope`] (the versioned persistence container).
//!
//! ## Current vs. Legacy
//!
//! A current-schema [`Block`] is always bound to a template and carries a
//! `{x, y}` position. A [`LegacyBlock`] is a loose view over arbitrary JSON:
//! free `x/y/w/h` geometry, a type tag that may be missing or inconsistent,
//! and content of unknown shape. No invariants hold on legacy data; the
//! migration pipeline (see [`crate::migrate`]) is what turns one into the
//! other.
//!
//! ## Deserialization Tolerance
//!
//! `Block` uses a helper-struct deserializer so documents written by older
//! versions stay loadable:
//!
//! - `template` may be a bare id string or an inline template object.
//! - `position` may be missing, with top-level `x`/`y` as fallback.
//! - Timestamps default to load time when absent.
//!
//! Content payloads are kept as raw JSON objects ([`ContentFields`]) so
//! unrecognized legacy keys survive round-trips instead of being dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Content payload of a block: a JSON object whose well-known fields are
/// determined by the block's kind, plus any preserved legacy keys.
pub type ContentFields = serde_json::Map<String, Value>;

/// The fixed enumeration of block kinds, open to extension: unrecognized
/// tags round-trip through [`BlockKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Thought,
    Quote,
    Image,
    Video,
    Project,
    Status,
    #[serde(untagged)]
    Other(String),
}

impl BlockKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "thought" => Self::Thought,
            "quote" => Self::Quote,
            "image" => Self::Image,
            "video" => Self::Video,
            "project" => Self::Project,
            "status" => Self::Status,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Thought => "thought",
            Self::Quote => "quote",
            Self::Image => "image",
            Self::Video => "video",
            Self::Project => "project",
            Self::Status => "status",
            Self::Other(tag) => tag,
        }
    }

    /// True for kinds this crate models explicitly (everything except
    /// [`BlockKind::Other`]).
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid position of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// One positioned, typed content item in a garden (current schema).
///
/// Invariant: `template_id` names a registry template whose compatibility
/// predicate accepts `kind`. The migration validator enforces this for
/// migrated data; [`Block::new`] expects the caller to pick a compatible
/// template (production callers go through the registry UI).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: ContentFields,
    #[serde(rename = "template")]
    pub template_id: String,
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    /// Create a fresh block with a new v4 id and empty content.
    pub fn new(kind: BlockKind, template_id: impl Into<String>, position: Position) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: ContentFields::new(),
            template_id: template_id.into(),
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

// Custom deserializer to tolerate older document shapes: `template` as an
// inline object, top-level `x`/`y` instead of `position`, and missing
// timestamps.
impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let helper = BlockHelper::deserialize(deserializer)?;
        let now = Utc::now();

        let position = helper.position.unwrap_or(Position {
            x: helper.x.unwrap_or(0),
            y: helper.y.unwrap_or(0),
        });

        Ok(Block {
            id: helper.id,
            kind: helper.kind,
            content: helper.content,
            template_id: match helper.template {
                TemplateRef::Id(id) => id,
                TemplateRef::Inline { id } => id,
            },
            position,
            created_at: helper.created_at.unwrap_or(now),
            updated_at: helper.updated_at.unwrap_or(now),
        })
    }
}

#[derive(Deserialize)]
struct BlockHelper {
    id: String,
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(default)]
    content: ContentFields,
    #[serde(rename = "template")]
    template: TemplateRef,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    x: Option<i64>,
    #[serde(default)]
    y: Option<i64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateRef {
    Id(String),
    Inline { id: String },
}

/// Loose, owned view over one legacy block record. Built from untrusted
/// JSON; every field is optional and nothing is validated here.
#[derive(Debug, Clone, Default)]
pub struct LegacyBlock {
    pub id: Option<String>,
    pub kind: Option<BlockKind>,
    pub content: Option<Value>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub size: Option<String>,
    pub category: Option<String>,
    pub template: Option<String>,
}

impl LegacyBlock {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            id: obj.get("id").and_then(loose_string),
            kind: obj
                .get("type")
                .and_then(Value::as_str)
                .map(BlockKind::parse),
            content: obj.get("content").cloned(),
            x: obj.get("x").and_then(loose_i64),
            y: obj.get("y").and_then(loose_i64),
            w: obj.get("w").and_then(loose_u32),
            h: obj.get("h").and_then(loose_u32),
            size: obj.get("size").and_then(Value::as_str).map(str::to_string),
            category: obj
                .get("category")
                .and_then(Value::as_str)
                .map(str::to_string),
            template: obj
                .get("template")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

// Legacy ids are sometimes numbers instead of strings.
fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn loose_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn loose_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f.max(0.0) as u64))
        .map(|n| n.min(u32::MAX as u64) as u32)
}

/// Version tag written into every envelope this crate produces.
pub const ENVELOPE_VERSION: &str = "2.0";

/// The versioned container wrapping a persisted block collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub blocks: Vec<Block>,
    pub metadata: EnvelopeMetadata,
}

impl Envelope {
    pub fn new(blocks: Vec<Block>, now: DateTime<Utc>) -> Self {
        let metadata = EnvelopeMetadata::compute(&blocks, now);
        Self {
            version: ENVELOPE_VERSION.to_string(),
            saved_at: now,
            blocks,
            metadata,
        }
    }
}

/// Derived metadata stored alongside the block sequence. `template_usage`
/// uses a BTreeMap so exported documents have stable field ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    pub total_blocks: usize,
    pub template_usage: BTreeMap<String, usize>,
    pub last_modified: DateTime<Utc>,
}

impl EnvelopeMetadata {
    pub fn compute(blocks: &[Block], now: DateTime<Utc>) -> Self {
        let mut template_usage = BTreeMap::new();
        for block in blocks {
            *template_usage.entry(block.template_id.clone()).or_insert(0) += 1;
        }
        Self {
            total_blocks: blocks.len(),
            template_usage,
            last_modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_kind_parse_known_and_unknown() {
        assert_eq!(BlockKind::parse("text"), BlockKind::Text);
        assert_eq!(BlockKind::parse("status"), BlockKind::Status);
        assert_eq!(
            BlockKind::parse("poll"),
            BlockKind::Other("poll".to_string())
        );
        assert!(!BlockKind::parse("poll").is_known());
    }

    #[test]
    fn test_block_kind_serde_roundtrip() {
        let json = serde_json::to_string(&BlockKind::Image).unwrap();
        assert_eq!(json, "\"image\"");
        let back: BlockKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BlockKind::Image);

        // Unrecognized tags survive
        let other: BlockKind = serde_json::from_str("\"poll\"").unwrap();
        assert_eq!(other, BlockKind::Other("poll".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"poll\"");
    }

    #[test]
    fn test_block_serialization_roundtrip() {
        let mut block = Block::new(BlockKind::Quote, "card", Position::new(2, 3));
        block
            .content
            .insert("quote".to_string(), json!("So it goes."));

        let doc = serde_json::to_string(&block).unwrap();
        let loaded: Block = serde_json::from_str(&doc).unwrap();

        assert_eq!(loaded.id, block.id);
        assert_eq!(loaded.kind, BlockKind::Quote);
        assert_eq!(loaded.template_id, "card");
        assert_eq!(loaded.position, Position::new(2, 3));
        assert_eq!(loaded.content.get("quote").unwrap(), "So it goes.");
    }

    #[test]
    fn test_block_deserialize_inline_template_object() {
        let doc = json!({
            "id": "b1",
            "type": "text",
            "content": {"text": "hi"},
            "template": {"id": "note-small", "width": 1, "height": 1},
            "position": {"x": 0, "y": 1}
        });

        let block: Block = serde_json::from_value(doc).unwrap();
        assert_eq!(block.template_id, "note-small");
        assert_eq!(block.position, Position::new(0, 1));
    }

    #[test]
    fn test_block_deserialize_top_level_geometry_fallback() {
        let doc = json!({
            "id": "b2",
            "type": "image",
            "template": "media",
            "x": 4,
            "y": 2
        });

        let block: Block = serde_json::from_value(doc).unwrap();
        assert_eq!(block.position, Position::new(4, 2));
        assert!(block.content.is_empty());
    }

    #[test]
    fn test_block_deserialize_missing_template_fails() {
        let doc = json!({"id": "b3", "type": "text"});
        assert!(serde_json::from_value::<Block>(doc).is_err());
    }

    #[test]
    fn test_legacy_block_from_loose_value() {
        let doc = json!({
            "id": 42,
            "type": "image",
            "content": {"imageUrl": "x.png"},
            "x": 1.9,
            "y": 0,
            "w": 2.4,
            "h": 2,
            "size": "medium",
            "template": "old-card"
        });

        let legacy = LegacyBlock::from_value(&doc);
        assert_eq!(legacy.id.as_deref(), Some("42"));
        assert_eq!(legacy.kind, Some(BlockKind::Image));
        assert_eq!(legacy.x, Some(1));
        assert_eq!(legacy.w, Some(2));
        assert_eq!(legacy.size.as_deref(), Some("medium"));
        assert_eq!(legacy.template.as_deref(), Some("old-card"));
    }

    #[test]
    fn test_legacy_block_from_non_object() {
        let legacy = LegacyBlock::from_value(&json!("not a block"));
        assert!(legacy.id.is_none());
        assert!(legacy.kind.is_none());
    }

    #[test]
    fn test_envelope_metadata_counts_template_usage() {
        let now = Utc::now();
        let blocks = vec![
            Block::new(BlockKind::Text, "card", Position::default()),
            Block::new(BlockKind::Text, "card", Position::default()),
            Block::new(BlockKind::Image, "media", Position::default()),
        ];
        let meta = EnvelopeMetadata::compute(&blocks, now);

        assert_eq!(meta.total_blocks, 3);
        assert_eq!(meta.template_usage.get("card"), Some(&2));
        assert_eq!(meta.template_usage.get("media"), Some(&1));
        assert_eq!(meta.last_modified, now);
    }

    #[test]
    fn test_envelope_carries_version_tag() {
        let envelope = Envelope::new(Vec::new(), Utc::now());
        assert_eq!(envelope.version, ENVELOPE_VERSION);
        assert_eq!(envelope.metadata.total_blocks, 0);
    }
}
