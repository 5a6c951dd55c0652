//! Migration validation: structural completeness, template/type
//! compatibility, and non-fatal signals of lost information.
//!
//! Fatal checks produce errors and the caller must discard the migrated
//! block. Warning checks inform but never block.

use crate::model::{Block, ContentFields, LegacyBlock};
use crate::template::{Template, TemplateRegistry};
use serde_json::Value;

/// Outcome of validating one migrated block.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

pub fn validate(
    legacy: &LegacyBlock,
    block: &Block,
    template: &Template,
    registry: &dyn TemplateRegistry,
) -> Validation {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    // --- Fatal checks ---

    if block.id.is_empty() {
        errors.push("missing block id".to_string());
    }
    if block.kind.as_str().is_empty() {
        errors.push("missing block type".to_string());
    }
    if block.template_id.is_empty() {
        errors.push("missing template binding".to_string());
    } else if !registry.is_compatible(template, &block.kind) {
        errors.push(format!(
            "template '{}' is not compatible with type '{}'",
            template.id, block.kind
        ));
    }

    // --- Warning checks ---

    let legacy_w = legacy.w.unwrap_or(template.width);
    let legacy_h = legacy.h.unwrap_or(template.height);
    if legacy_w != template.width || legacy_h != template.height {
        warnings.push(format!(
            "template '{}' is {}x{} but legacy geometry was {}x{}",
            template.id, template.width, template.height, legacy_w, legacy_h
        ));
    }

    if legacy_content_present(legacy) && content_is_empty(&block.content) {
        warnings.push("legacy content was present but migrated content is empty".to_string());
    }

    check_defining_field(legacy, block, &mut warnings);

    Validation {
        valid: errors.is_empty(),
        warnings,
        errors,
    }
}

// For text/image/video, an empty defining field despite non-empty legacy
// content is a strong signal something was lost in preservation.
fn check_defining_field(legacy: &LegacyBlock, block: &Block, warnings: &mut Vec<String>) {
    let (field, label) = match block.kind.as_str() {
        "text" => ("text", "text content"),
        "image" => ("src", "image source"),
        "video" => ("src", "video source"),
        _ => return,
    };

    let migrated_empty = block
        .content
        .get(field)
        .and_then(Value::as_str)
        .is_none_or(str::is_empty);
    if migrated_empty && legacy_content_present(legacy) {
        warnings.push(format!(
            "suspected loss of {}: legacy data was present but migrated '{}' is empty",
            label, field
        ));
    }
}

fn legacy_content_present(legacy: &LegacyBlock) -> bool {
    legacy
        .content
        .as_ref()
        .and_then(Value::as_object)
        .is_some_and(|obj| obj.values().any(|v| !value_is_empty(v)))
}

fn content_is_empty(content: &ContentFields) -> bool {
    content.values().all(value_is_empty)
}

fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Position};
    use crate::template::StaticRegistry;
    use serde_json::json;

    fn registry() -> StaticRegistry {
        StaticRegistry::new()
            .with(
                Template::new("card", 2, 2),
                vec![BlockKind::Text, BlockKind::Quote],
            )
            .with(
                Template::new("media", 2, 2),
                vec![BlockKind::Image, BlockKind::Video],
            )
    }

    fn legacy_with_content(content: serde_json::Value) -> LegacyBlock {
        LegacyBlock {
            id: Some("b1".to_string()),
            kind: Some(BlockKind::Text),
            content: Some(content),
            w: Some(2),
            h: Some(2),
            ..LegacyBlock::default()
        }
    }

    fn migrated(kind: BlockKind, template_id: &str) -> Block {
        let mut block = Block::new(kind, template_id, Position::default());
        block.id = "b1".to_string();
        block
    }

    #[test]
    fn test_valid_block_passes() {
        let registry = registry();
        let template = registry.get("card").unwrap().clone();
        let legacy = legacy_with_content(json!({"text": "hi"}));
        let mut block = migrated(BlockKind::Text, "card");
        block.content.insert("text".into(), json!("hi"));

        let result = validate(&legacy, &block, &template, &registry);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let registry = registry();
        let template = registry.get("card").unwrap().clone();
        let legacy = legacy_with_content(json!({}));
        let mut block = migrated(BlockKind::Text, "card");
        block.id = String::new();

        let result = validate(&legacy, &block, &template, &registry);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("missing block id")));
    }

    #[test]
    fn test_incompatible_template_is_fatal() {
        let registry = registry();
        let template = registry.get("media").unwrap().clone();
        let legacy = legacy_with_content(json!({}));
        let block = migrated(BlockKind::Text, "media");

        let result = validate(&legacy, &block, &template, &registry);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("not compatible with type 'text'")));
    }

    #[test]
    fn test_missing_template_binding_is_fatal() {
        let registry = registry();
        let template = registry.get("card").unwrap().clone();
        let legacy = legacy_with_content(json!({}));
        let block = migrated(BlockKind::Text, "");

        let result = validate(&legacy, &block, &template, &registry);
        assert!(!result.valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("missing template binding")));
    }

    #[test]
    fn test_dimension_drift_is_warning_only() {
        let registry = registry();
        let template = registry.get("card").unwrap().clone();
        let mut legacy = legacy_with_content(json!({"text": "hi"}));
        legacy.w = Some(4);
        legacy.h = Some(1);
        let mut block = migrated(BlockKind::Text, "card");
        block.content.insert("text".into(), json!("hi"));

        let result = validate(&legacy, &block, &template, &registry);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("4x1"));
    }

    #[test]
    fn test_emptied_content_is_warning() {
        let registry = registry();
        let template = registry.get("card").unwrap().clone();
        let legacy = legacy_with_content(json!({"note": "was here"}));
        let block = migrated(BlockKind::Quote, "card");

        let result = validate(&legacy, &block, &template, &registry);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("migrated content is empty")));
    }

    #[test]
    fn test_lost_image_source_names_the_field() {
        let registry = registry();
        let template = registry.get("media").unwrap().clone();
        let mut legacy = legacy_with_content(json!({"imageUrl": 12345}));
        legacy.kind = Some(BlockKind::Image);
        let mut block = migrated(BlockKind::Image, "media");
        block.content.insert("src".into(), json!(""));

        let result = validate(&legacy, &block, &template, &registry);
        assert!(result.valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("image source") && w.contains("'src'")));
    }

    #[test]
    fn test_lost_source_warning_without_any_candidate_field() {
        let registry = registry();
        let template = registry.get("media").unwrap().clone();
        let mut legacy = legacy_with_content(json!({"filename": "x.hevc"}));
        legacy.kind = Some(BlockKind::Image);
        let mut block = migrated(BlockKind::Image, "media");
        block.content.insert("src".into(), json!(""));
        block.content.insert("filename".into(), json!("x.hevc"));

        let result = validate(&legacy, &block, &template, &registry);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("image source")));
    }

    #[test]
    fn test_no_source_warning_when_legacy_had_none() {
        let registry = registry();
        let template = registry.get("media").unwrap().clone();
        let mut legacy = legacy_with_content(json!({}));
        legacy.kind = Some(BlockKind::Image);
        let mut block = migrated(BlockKind::Image, "media");
        block.content.insert("src".into(), json!(""));

        let result = validate(&legacy, &block, &template, &registry);
        assert!(!result
            .warnings
            .iter()
            .any(|w| w.contains("image source")));
    }
}
