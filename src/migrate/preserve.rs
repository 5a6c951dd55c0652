//! Content preservation: normalize legacy free-form content into the
//! shape a block kind expects, without discarding unrecognized fields.
//!
//! For each known kind, every derived field is populated from the first
//! non-empty candidate in an ordered list of legacy field names. After the
//! derived fields, all *other* legacy keys are spread in unchanged so
//! future readers can still see them. Fields with no legacy source default
//! to type-appropriate empty values, or to the template's declared default
//! for color/status-bearing kinds.
//!
//! Unrecognized kinds get the legacy content back unchanged (spread only),
//! so not-yet-modeled types round-trip.

use crate::model::{BlockKind, ContentFields};
use crate::template::Template;
use serde_json::Value;

/// Normalize `legacy_content` for `kind`, using `template` defaults where
/// the legacy data offers nothing. Non-object legacy content is treated as
/// empty.
pub fn preserve(
    legacy_content: Option<&Value>,
    kind: &BlockKind,
    template: &Template,
) -> ContentFields {
    let legacy = legacy_content
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut fields = match kind {
        BlockKind::Text => {
            let mut f = ContentFields::new();
            f.insert(
                "text".into(),
                first_string(&legacy, &["text", "content", "body"]).into(),
            );
            f
        }
        BlockKind::Thought => {
            let mut f = ContentFields::new();
            f.insert(
                "text".into(),
                first_string(&legacy, &["text", "thought", "content"]).into(),
            );
            f.insert(
                "color".into(),
                first_string_or(&legacy, &["color"], template.default_color.as_deref()).into(),
            );
            f
        }
        BlockKind::Quote => {
            let mut f = ContentFields::new();
            f.insert(
                "quote".into(),
                first_string(&legacy, &["quote", "text", "content"]).into(),
            );
            f.insert("author".into(), first_string(&legacy, &["author"]).into());
            f.insert("source".into(), first_string(&legacy, &["source"]).into());
            f
        }
        BlockKind::Image => {
            let mut f = ContentFields::new();
            f.insert(
                "src".into(),
                first_string(&legacy, &["src", "imageUrl", "url"]).into(),
            );
            f.insert(
                "alt".into(),
                first_string(&legacy, &["alt", "caption"]).into(),
            );
            f.insert("caption".into(), first_string(&legacy, &["caption"]).into());
            f
        }
        BlockKind::Video => {
            let mut f = ContentFields::new();
            f.insert(
                "src".into(),
                first_string(&legacy, &["src", "videoUrl", "url"]).into(),
            );
            f.insert("title".into(), first_string(&legacy, &["title"]).into());
            f
        }
        BlockKind::Project => {
            let mut f = ContentFields::new();
            f.insert(
                "title".into(),
                first_string(&legacy, &["title", "name"]).into(),
            );
            f.insert(
                "description".into(),
                first_string(&legacy, &["description", "text"]).into(),
            );
            f.insert("link".into(), first_string(&legacy, &["link", "url"]).into());
            f.insert(
                "tags".into(),
                first_array(&legacy, &["tags"]).unwrap_or_else(|| Value::Array(Vec::new())),
            );
            f
        }
        BlockKind::Status => {
            let mut f = ContentFields::new();
            f.insert(
                "text".into(),
                first_string(&legacy, &["text", "status", "content"]).into(),
            );
            f.insert(
                "status".into(),
                first_string_or(&legacy, &["status"], template.default_status.as_deref()).into(),
            );
            f
        }
        // Future kinds round-trip untouched.
        BlockKind::Other(_) => return legacy,
    };

    // Spread every legacy key the derivation above did not claim, so
    // nothing is silently dropped.
    for (key, value) in legacy {
        fields.entry(key).or_insert(value);
    }

    fields
}

/// First candidate field holding a non-empty string.
fn first_string(legacy: &ContentFields, candidates: &[&str]) -> String {
    candidates
        .iter()
        .filter_map(|key| legacy.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

/// First candidate field holding a non-empty array.
fn first_array(legacy: &ContentFields, candidates: &[&str]) -> Option<Value> {
    candidates
        .iter()
        .filter_map(|key| legacy.get(*key))
        .find(|v| v.as_array().is_some_and(|a| !a.is_empty()))
        .cloned()
}

/// Like [`first_string`], falling back to a template-declared default.
fn first_string_or(legacy: &ContentFields, candidates: &[&str], fallback: Option<&str>) -> String {
    let found = first_string(legacy, candidates);
    if found.is_empty() {
        fallback.unwrap_or_default().to_string()
    } else {
        found
    }
}
