//! # Legacy-Data Migration
//!
//! Converts older, free-form block records (arbitrary `x/y/w/h` geometry,
//! loosely-typed content) into the current template-bound schema. The
//! pipeline for one block is fixed:
//!
//! 1. [`resolver`]: find the best-matching template for the legacy
//!    geometry and block kind.
//! 2. [`preserve`]: normalize the legacy content for that kind, keeping
//!    unrecognized fields.
//! 3. [`validate`]: check structural completeness and template/type
//!    compatibility; collect information-loss warnings.
//!
//! [`migrator`] orchestrates this per block and over batches, producing a
//! [`MigrationSummary`]. Fatal errors discard the affected block only;
//! batches always run to completion.

pub mod migrator;
pub mod preserve;
pub mod resolver;
pub mod validate;

pub use migrator::{migrate_many, migrate_one, needs_migration, sequence_needs_migration};
pub use validate::Validation;

use crate::model::Block;

/// Outcome of migrating one legacy block.
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    pub ok: bool,
    pub block: Option<Block>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl MigrationResult {
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            ok: false,
            block: None,
            warnings: Vec::new(),
            errors,
        }
    }
}

/// Aggregate outcome of a batch migration. Built once per batch and never
/// mutated afterwards; every message is prefixed with the originating
/// block's identifier.
#[derive(Debug, Clone, Default)]
pub struct MigrationSummary {
    pub total_items: usize,
    pub successful: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl MigrationSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.warnings.is_empty()
    }
}
