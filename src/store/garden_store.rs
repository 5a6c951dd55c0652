//! The versioned persistence store.
//!
//! `GardenStore` owns exactly two logical storage slots: the live envelope
//! and a rolling one-slot backup. Everything else, including what
//! "durable" means, is behind the injected [`StorageBackend`].
//!
//! ## Save ordering
//!
//! The one hard sequencing invariant: the previous live envelope's raw
//! bytes are copied into the backup slot *before* the new live write. A
//! failed save therefore never destroys the only recoverable copy. The
//! backup advance is not rolled back when the live write fails; the
//! backup then still holds the last successfully saved generation, which
//! is what restore needs.
//!
//! ## Load pipeline
//!
//! decode → current-schema check → legacy shape detection
//! ([`super::shape`]) → migration when warranted ([`crate::migrate`]).
//! Corrupt elements are filtered, not fatal; only an undecodable document
//! is.

use super::backend::StorageBackend;
use super::shape::detect_legacy_shape;
use crate::error::{GardenError, Result};
use crate::events::{EventBus, StoreEvent, StoreListener};
use crate::migrate::{migrate_many, sequence_needs_migration, MigrationSummary};
use crate::model::{Block, Envelope};
use crate::template::TemplateRegistry;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

/// Storage key of the live envelope.
pub const LIVE_KEY: &str = "garden-data";
/// Storage key of the rolling one-slot backup.
pub const BACKUP_KEY: &str = "garden-data-backup";

/// Result of a load or import.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub blocks: Vec<Block>,
    pub migration_performed: bool,
    pub summary: Option<MigrationSummary>,
    /// Pending opportunistic re-save of freshly migrated data. Dropping
    /// the task cancels it; see [`ResaveTask`].
    pub resave: Option<ResaveTask>,
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// An explicit handle for the post-migration re-save, so callers can run
/// it, observe its outcome, or drop it to cancel. A successful load is
/// never blocked by this write.
#[derive(Debug, Clone)]
pub struct ResaveTask {
    blocks: Vec<Block>,
}

impl ResaveTask {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn run<B: StorageBackend, R: TemplateRegistry>(
        self,
        store: &mut GardenStore<B, R>,
    ) -> Result<()> {
        store.save(&self.blocks)
    }
}

/// Presence and size of both slots, plus the best-available last-modified
/// timestamp. Corrupt live content yields `last_modified: None` rather
/// than an error.
#[derive(Debug, Clone, Default)]
pub struct StorageUsage {
    pub live_bytes: Option<usize>,
    pub backup_bytes: Option<usize>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl StorageUsage {
    pub fn has_live(&self) -> bool {
        self.live_bytes.is_some()
    }

    pub fn has_backup(&self) -> bool {
        self.backup_bytes.is_some()
    }
}

pub struct GardenStore<B: StorageBackend, R: TemplateRegistry> {
    backend: B,
    registry: R,
    events: EventBus,
}

impl<B: StorageBackend, R: TemplateRegistry> GardenStore<B, R> {
    pub fn new(backend: B, registry: R) -> Self {
        Self {
            backend,
            registry,
            events: EventBus::new(),
        }
    }

    /// Register a listener for "data saved" / "data cleared" events.
    /// Delivery is best-effort and synchronous with the triggering call.
    pub fn subscribe(&mut self, listener: StoreListener) {
        self.events.subscribe(listener);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persist the collection as a new live envelope.
    ///
    /// The previous live document advances into the backup slot first;
    /// every block's `updated_at` is stamped to the save time.
    pub fn save(&mut self, blocks: &[Block]) -> Result<()> {
        if let Some(live) = self.backend.read(LIVE_KEY)? {
            self.backend.write(BACKUP_KEY, &live)?;
        }

        let now = Utc::now();
        let mut stamped = blocks.to_vec();
        for block in &mut stamped {
            block.updated_at = now;
        }

        let envelope = Envelope::new(stamped, now);
        let document = serde_json::to_string_pretty(&envelope)
            .map_err(|e| GardenError::Store(format!("failed to encode garden data: {}", e)))?;
        self.backend.write(LIVE_KEY, &document)?;

        self.events.emit(&StoreEvent::DataSaved {
            blocks: envelope.blocks,
            metadata: envelope.metadata,
        });
        Ok(())
    }

    /// Load the live collection, migrating legacy formats on the fly.
    ///
    /// An absent live slot yields an empty outcome; a malformed document
    /// is a fatal parse error. When migration ran, the outcome carries the
    /// summary and a pending [`ResaveTask`].
    pub fn load(&self) -> Result<LoadOutcome> {
        let Some(raw) = self.backend.read(LIVE_KEY)? else {
            return Ok(LoadOutcome::default());
        };
        self.parse_document(&raw)
    }

    /// Load and immediately run any pending post-migration re-save,
    /// logging its failure instead of surfacing it. Migrated data is
    /// usable either way.
    pub fn load_and_resave(&mut self) -> Result<LoadOutcome> {
        let mut outcome = self.load()?;
        if let Some(task) = outcome.resave.take() {
            if let Err(err) = self.save(task.blocks()) {
                warn!(error = %err, "post-migration re-save failed; migrated data stays in memory");
            }
        }
        Ok(outcome)
    }

    /// Parse an externally supplied document through the same
    /// format-detection and migration path as [`GardenStore::load`].
    /// Never touches the live or backup slots; the caller decides whether
    /// to persist the result.
    pub fn import(&self, document: &str) -> Result<LoadOutcome> {
        self.parse_document(document)
    }

    /// Export the current live collection as a portable document, running
    /// migration first when the slot still holds a legacy format. Never
    /// writes to the slots.
    pub fn export(&self) -> Result<String> {
        let outcome = self.load()?;
        export_document(&outcome.blocks)
    }

    fn parse_document(&self, raw: &str) -> Result<LoadOutcome> {
        let doc: Value = serde_json::from_str(raw)
            .map_err(|e| GardenError::Store(format!("malformed garden document: {}", e)))?;

        // Current schema: version tag plus a block sequence. Partial
        // corruption is filtered element-wise, never fatal.
        if doc.get("version").is_some() {
            if let Some(items) = doc.get("blocks").and_then(Value::as_array) {
                return Ok(LoadOutcome {
                    blocks: decode_blocks(items),
                    ..LoadOutcome::default()
                });
            }
        }

        let Some((_, items)) = detect_legacy_shape(&doc) else {
            return Ok(LoadOutcome::default());
        };
        if items.is_empty() {
            return Ok(LoadOutcome::default());
        }

        if sequence_needs_migration(items) {
            let (blocks, summary) = migrate_many(items, &self.registry);
            if blocks.is_empty() {
                // Migration produced nothing. Fall back to the raw
                // sequence so elements that already decode are not lost
                // alongside the failed ones; the summary still reports
                // what went wrong.
                return Ok(LoadOutcome {
                    blocks: decode_blocks(items),
                    migration_performed: false,
                    summary: Some(summary),
                    resave: None,
                });
            }
            let resave = Some(ResaveTask {
                blocks: blocks.clone(),
            });
            return Ok(LoadOutcome {
                blocks,
                migration_performed: true,
                summary: Some(summary),
                resave,
            });
        }

        // Legacy-shaped but already template-bound: keep whatever decodes.
        Ok(LoadOutcome {
            blocks: decode_blocks(items),
            ..LoadOutcome::default()
        })
    }

    /// Remove both slots and notify listeners.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove(LIVE_KEY)?;
        self.backend.remove(BACKUP_KEY)?;
        self.events.emit(&StoreEvent::DataCleared);
        Ok(())
    }

    /// Promote the backup slot into the live slot and reload. A failed
    /// reload reverts the live slot to its pre-restore content, so a bad
    /// backup never destroys good data.
    pub fn restore_from_backup(&mut self) -> Result<LoadOutcome> {
        let backup = self
            .backend
            .read(BACKUP_KEY)?
            .ok_or_else(|| GardenError::Store("no backup available".to_string()))?;
        let prior_live = self.backend.read(LIVE_KEY)?;

        self.backend.write(LIVE_KEY, &backup)?;
        match self.load() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                match prior_live {
                    Some(doc) => self.backend.write(LIVE_KEY, &doc)?,
                    None => self.backend.remove(LIVE_KEY)?,
                }
                Err(err)
            }
        }
    }

    /// Report slot presence/size and the best-available last-modified
    /// timestamp without mutating anything.
    pub fn storage_usage(&self) -> Result<StorageUsage> {
        Ok(StorageUsage {
            live_bytes: self.backend.len(LIVE_KEY)?,
            backup_bytes: self.backend.len(BACKUP_KEY)?,
            last_modified: self
                .backend
                .read(LIVE_KEY)?
                .as_deref()
                .and_then(last_modified_of),
        })
    }
}

/// Encode a collection as a portable, human-inspectable document: a full
/// envelope with freshly computed metadata, pretty-printed with stable
/// field ordering. Used for download/sharing, never for the live slots.
pub fn export_document(blocks: &[Block]) -> Result<String> {
    let envelope = Envelope::new(blocks.to_vec(), Utc::now());
    Ok(serde_json::to_string_pretty(&envelope)?)
}

// Element-wise decode: elements missing an id or type (or otherwise
// undecodable) are dropped, the rest survive.
fn decode_blocks(items: &[Value]) -> Vec<Block> {
    items
        .iter()
        .filter(|item| {
            let id_present = item
                .get("id")
                .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
            let kind_present = item
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| !t.is_empty());
            id_present && kind_present
        })
        .filter_map(|item| serde_json::from_value::<Block>(item.clone()).ok())
        .collect()
}

fn last_modified_of(raw: &str) -> Option<DateTime<Utc>> {
    let doc: Value = serde_json::from_str(raw).ok()?;
    let stamp = doc
        .get("saved_at")
        .filter(|v| !v.is_null())
        .or_else(|| doc.get("metadata").and_then(|m| m.get("last_modified")))?;
    serde_json::from_value(stamp.clone()).ok()
}
