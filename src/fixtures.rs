//! Built-in template catalog and sample legacy documents.
//!
//! The production template catalog is registry-owned and external; this
//! module provides a representative [`StaticRegistry`] covering every
//! block kind, used by tests and by hosts that want a sensible default.

use crate::model::BlockKind;
use crate::template::{StaticRegistry, Template};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Default catalog: one or more templates per kind, with the 2x2 shapes
/// first so common legacy geometry resolves onto them.
pub static DEFAULT_REGISTRY: Lazy<StaticRegistry> = Lazy::new(|| {
    StaticRegistry::new()
        .with(
            Template::new("card", 2, 2).with_default_status("active"),
            vec![
                BlockKind::Text,
                BlockKind::Quote,
                BlockKind::Project,
                BlockKind::Status,
                BlockKind::Thought,
            ],
        )
        .with(
            Template::new("media", 2, 2),
            vec![BlockKind::Image, BlockKind::Video],
        )
        .with(
            Template::new("note-small", 1, 1).with_default_color("#fef3c7"),
            vec![BlockKind::Text, BlockKind::Thought, BlockKind::Status],
        )
        .with(
            Template::new("note-wide", 2, 1).with_default_color("#e0e7ff"),
            vec![
                BlockKind::Text,
                BlockKind::Thought,
                BlockKind::Quote,
                BlockKind::Status,
            ],
        )
        .with(
            Template::new("media-tall", 2, 3),
            vec![BlockKind::Image, BlockKind::Video],
        )
        .with(
            Template::new("banner", 4, 2),
            vec![BlockKind::Image, BlockKind::Project, BlockKind::Quote],
        )
        .with(
            Template::new("showcase", 3, 2),
            vec![BlockKind::Project, BlockKind::Video],
        )
});

/// A pre-template-era export: bare sequence, raw geometry, mixed content
/// field conventions.
pub fn legacy_bare_sequence() -> Value {
    json!([
        {"id": "t1", "type": "text", "x": 0, "y": 0, "w": 2, "h": 2,
         "content": {"content": "Welcome to my garden"}},
        {"id": "t2", "type": "image", "x": 2, "y": 0, "w": 2, "h": 2,
         "content": {"imageUrl": "sunset.jpg", "caption": "golden hour"}},
        {"id": "t3", "type": "quote", "x": 0, "y": 2, "w": 2, "h": 1,
         "content": {"text": "Make it so.", "author": "Picard"}},
        {"id": "t4", "type": "thought", "x": 2, "y": 2, "w": 1, "h": 1,
         "content": {"thought": "water the ferns"}}
    ])
}

/// The same era, wrapped the way the grid-layout exporter wrote it.
pub fn legacy_layout_document() -> Value {
    json!({
        "layout": [
            {"id": "p1", "type": "project", "x": 0, "y": 0, "w": 4, "h": 2,
             "content": {"name": "tilegarden", "url": "https://example.org",
                          "tags": ["rust", "storage"]}},
            {"id": "s1", "type": "status", "x": 0, "y": 2, "w": 1, "h": 1,
             "content": {"status": "shipping"}}
        ]
    })
}
