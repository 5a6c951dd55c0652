//! Per-block and batch migration orchestration.
//!
//! The per-block pipeline is fixed: resolve template, preserve content,
//! construct a candidate block with fresh timestamps, validate. A fatal
//! validation error discards the candidate; it never reaches callers.
//! Batch processing is independent per block: one failure never aborts the
//! others, and input order is preserved for successes.

use crate::migrate::preserve::preserve;
use crate::migrate::resolver::resolve;
use crate::migrate::validate::validate;
use crate::migrate::{MigrationResult, MigrationSummary};
use crate::model::{Block, BlockKind, LegacyBlock, Position};
use crate::template::TemplateRegistry;
use chrono::Utc;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};

// Geometry fallbacks when legacy records carry a named size instead of
// explicit w/h, or nothing at all.
const DEFAULT_WIDTH: u32 = 2;
const DEFAULT_HEIGHT: u32 = 2;

/// True only for a sequence holding at least one object that lacks a
/// template binding while carrying legacy `w`/`h` geometry. Intentionally
/// conservative: current-schema collections never trigger migration.
pub fn needs_migration(data: &Value) -> bool {
    let Some(items) = data.as_array() else {
        return false;
    };
    sequence_needs_migration(items)
}

/// Slice-level form of [`needs_migration`], for callers that already
/// extracted the legacy sequence.
pub fn sequence_needs_migration(items: &[Value]) -> bool {
    items.iter().any(|item| {
        item.as_object().is_some_and(|obj| {
            !obj.contains_key("template")
                && (obj.contains_key("w") || obj.contains_key("h"))
        })
    })
}

/// Migrate a single legacy record. Unexpected panics from the registry (or
/// anywhere else in the pipeline) are caught and converted into a single
/// fatal error so batch processing can never be aborted by one bad block.
pub fn migrate_one(value: &Value, registry: &dyn TemplateRegistry) -> MigrationResult {
    match catch_unwind(AssertUnwindSafe(|| migrate_one_inner(value, registry))) {
        Ok(result) => result,
        Err(panic) => MigrationResult::failure(vec![format!(
            "unexpected failure during migration: {}",
            panic_message(&panic)
        )]),
    }
}

fn migrate_one_inner(value: &Value, registry: &dyn TemplateRegistry) -> MigrationResult {
    let legacy = LegacyBlock::from_value(value);
    let kind = legacy
        .kind
        .clone()
        .unwrap_or_else(|| BlockKind::Other(String::new()));
    let (width, height) = legacy_dimensions(&legacy);

    let Some(template) = resolve(registry, width, height, &kind) else {
        return MigrationResult::failure(vec![format!(
            "no template found for type '{}' with {}x{} geometry",
            kind, width, height
        )]);
    };

    let content = preserve(legacy.content.as_ref(), &kind, template);
    let now = Utc::now();
    let candidate = Block {
        id: legacy.id.clone().unwrap_or_default(),
        kind,
        content,
        template_id: template.id.clone(),
        position: Position {
            x: legacy.x.unwrap_or(0),
            y: legacy.y.unwrap_or(0),
        },
        created_at: now,
        updated_at: now,
    };

    let validation = validate(&legacy, &candidate, template, registry);
    if validation.valid {
        MigrationResult {
            ok: true,
            block: Some(candidate),
            warnings: validation.warnings,
            errors: Vec::new(),
        }
    } else {
        // The candidate was constructed but must not leak on fatal errors.
        MigrationResult {
            ok: false,
            block: None,
            warnings: validation.warnings,
            errors: validation.errors,
        }
    }
}

/// Migrate every record independently, preserving input order for
/// successes, and aggregate per-block messages into a summary with each
/// message prefixed by the originating block's identifier.
pub fn migrate_many(
    values: &[Value],
    registry: &dyn TemplateRegistry,
) -> (Vec<Block>, MigrationSummary) {
    let mut blocks = Vec::new();
    let mut successful = 0;
    let mut failed = 0;
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    for (index, value) in values.iter().enumerate() {
        let label = LegacyBlock::from_value(value)
            .id
            .unwrap_or_else(|| format!("item {}", index));
        let result = migrate_one(value, registry);

        warnings.extend(
            result
                .warnings
                .iter()
                .map(|w| format!("[{}] {}", label, w)),
        );
        errors.extend(result.errors.iter().map(|e| format!("[{}] {}", label, e)));

        match result.block {
            Some(block) if result.ok => {
                successful += 1;
                blocks.push(block);
            }
            _ => failed += 1,
        }
    }

    let summary = MigrationSummary {
        total_items: values.len(),
        successful,
        failed,
        warnings,
        errors,
    };
    (blocks, summary)
}

fn legacy_dimensions(legacy: &LegacyBlock) -> (u32, u32) {
    if legacy.w.is_some() || legacy.h.is_some() {
        return (
            legacy.w.unwrap_or(DEFAULT_WIDTH).max(1),
            legacy.h.unwrap_or(DEFAULT_HEIGHT).max(1),
        );
    }
    match legacy.size.as_deref() {
        Some("small") => (1, 1),
        Some("large") => (4, 2),
        _ => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
