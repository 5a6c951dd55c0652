//! Autosave coordination.
//!
//! Debounces high-frequency edits into a single persistence write per
//! quiescent period, tracks save state, and keeps an independent periodic
//! local safety snapshot in case the debounced write never fires (page
//! closed mid-delay).
//!
//! The pending buffer, not any in-flight write, is the single source of
//! truth for "what to save next". A field set more recently always wins
//! over one set earlier but not yet flushed; on a failed write the buffer
//! is deliberately kept so the next edit or manual save retries with the
//! accumulated changes still pending.
//!
//! Timing goes through the [`Scheduler`] port, so this module never
//! touches wall-clock timers itself.

use crate::error::Result;
use crate::model::Block;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::store::backend::StorageBackend;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// Quiescent delay after the last edit before a write fires.
pub const DEBOUNCE_DELAY: Duration = Duration::from_secs(2);
/// Cadence of the local safety snapshot, independent of the debounce.
pub const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(30);

/// Grid placement entry, as produced by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

/// Full value of everything autosave manages for one garden record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    pub title: String,
    pub tiles: Vec<Block>,
    pub layout: Vec<Placement>,
}

/// In-memory pending-change buffer: only fields that were actually edited
/// are set. Applying a patch overwrites field-by-field.
#[derive(Debug, Clone, Default)]
pub struct GardenDraft {
    pub title: Option<String>,
    pub tiles: Option<Vec<Block>>,
    pub layout: Option<Vec<Placement>>,
}

impl GardenDraft {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.tiles.is_none() && self.layout.is_none()
    }
}

/// Where autosave writes go. Implementations wrap whatever the host uses
/// for durable record storage (a remote table, a local store, ...).
pub trait SaveTarget {
    fn persist(&mut self, record_id: &str, snapshot: &GardenSnapshot) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveState {
    Idle,
    Saving,
    Saved(DateTime<Utc>),
    Error(String),
}

pub struct AutosaveCoordinator<W: SaveTarget + 'static, B: StorageBackend + 'static> {
    inner: Rc<RefCell<Inner<W, B>>>,
    scheduler: Rc<dyn Scheduler>,
    debounce: Option<TimerHandle>,
    interval: TimerHandle,
}

struct Inner<W: SaveTarget, B: StorageBackend> {
    record_id: String,
    target: W,
    snapshots: B,
    committed: GardenSnapshot,
    draft: GardenDraft,
    state: SaveState,
    dirty: bool,
    disposed: bool,
}

impl<W: SaveTarget, B: StorageBackend> Inner<W, B> {
    fn snapshot_key(&self) -> String {
        format!("autosave-{}", self.record_id)
    }

    // Draft over last committed values.
    fn compose(&self) -> GardenSnapshot {
        GardenSnapshot {
            title: self
                .draft
                .title
                .clone()
                .unwrap_or_else(|| self.committed.title.clone()),
            tiles: self
                .draft
                .tiles
                .clone()
                .unwrap_or_else(|| self.committed.tiles.clone()),
            layout: self
                .draft
                .layout
                .clone()
                .unwrap_or_else(|| self.committed.layout.clone()),
        }
    }

    fn apply_patch(&mut self, patch: GardenDraft) {
        if let Some(title) = patch.title {
            self.draft.title = Some(title);
        }
        if let Some(tiles) = patch.tiles {
            self.draft.tiles = Some(tiles);
        }
        if let Some(layout) = patch.layout {
            self.draft.layout = Some(layout);
        }
    }

    fn flush(&mut self) {
        if self.disposed {
            return;
        }
        let snapshot = self.compose();
        self.state = SaveState::Saving;

        match self.target.persist(&self.record_id, &snapshot) {
            Ok(()) => {
                self.committed = snapshot;
                self.state = SaveState::Saved(Utc::now());
                self.draft = GardenDraft::default();
                self.dirty = false;
                // The durable write supersedes the local safety snapshot.
                let key = self.snapshot_key();
                if let Err(err) = self.snapshots.remove(&key) {
                    debug!(error = %err, "could not drop local safety snapshot");
                }
            }
            Err(err) => {
                // Buffer is kept: the next edit or manual save retries
                // with the accumulated changes.
                self.state = SaveState::Error(err.to_string());
            }
        }
    }

    fn capture_safety_snapshot(&mut self) {
        if self.disposed {
            return;
        }
        let snapshot = self.compose();
        let key = self.snapshot_key();
        match serde_json::to_string(&snapshot) {
            Ok(doc) => {
                if let Err(err) = self.snapshots.write(&key, &doc) {
                    warn!(error = %err, "local safety snapshot write failed");
                }
            }
            Err(err) => warn!(error = %err, "could not encode safety snapshot"),
        }
    }
}

impl<W: SaveTarget + 'static, B: StorageBackend + 'static> AutosaveCoordinator<W, B> {
    pub fn new(
        record_id: impl Into<String>,
        target: W,
        snapshots: B,
        committed: GardenSnapshot,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let inner = Rc::new(RefCell::new(Inner {
            record_id: record_id.into(),
            target,
            snapshots,
            committed,
            draft: GardenDraft::default(),
            state: SaveState::Idle,
            dirty: false,
            disposed: false,
        }));

        let snapshot_inner = Rc::clone(&inner);
        let interval = scheduler.every(
            SNAPSHOT_INTERVAL,
            Rc::new(RefCell::new(move || {
                snapshot_inner.borrow_mut().capture_safety_snapshot();
            })),
        );

        Self {
            inner,
            scheduler,
            debounce: None,
            interval,
        }
    }

    /// Record an edit: merge provided fields into the pending buffer and
    /// reset the debounce timer.
    pub fn on_edit(&mut self, patch: GardenDraft) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.apply_patch(patch);
            inner.dirty = true;
        }

        if let Some(handle) = self.debounce.take() {
            handle.cancel();
        }
        let flush_inner = Rc::clone(&self.inner);
        self.debounce = Some(self.scheduler.after(
            DEBOUNCE_DELAY,
            Rc::new(RefCell::new(move || {
                flush_inner.borrow_mut().flush();
            })),
        ));
    }

    /// Bypass the debounce: write immediately when the buffer holds
    /// anything, otherwise just refresh the displayed status.
    pub fn save_now(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.cancel();
        }
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        if inner.draft.is_empty() {
            inner.state = SaveState::Saved(Utc::now());
            inner.dirty = false;
        } else {
            inner.flush();
        }
    }

    /// Cancel both timers. In-flight callbacks that fire afterwards see
    /// the disposed flag and no-op.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.cancel();
        }
        self.interval.cancel();
        self.inner.borrow_mut().disposed = true;
    }

    pub fn state(&self) -> SaveState {
        self.inner.borrow().state.clone()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.inner.borrow().dirty
    }

    pub fn committed(&self) -> GardenSnapshot {
        self.inner.borrow().committed.clone()
    }
}
