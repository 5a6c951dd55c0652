//! # Storage Layer
//!
//! This module defines the persistence engine for garden data. The
//! [`backend::StorageBackend`] trait handles the "how" of durability
//! (filesystem, memory, or a remote table) while [`GardenStore`] handles
//! the "what": the versioned envelope format, the backup-before-live
//! write ordering, format detection, and automatic migration on load.
//!
//! ## Slots
//!
//! The store owns exactly two keys: the live envelope
//! ([`garden_store::LIVE_KEY`]) and a rolling one-slot backup
//! ([`garden_store::BACKUP_KEY`]). The backup is overwritten with the
//! previous live document immediately *before* each new save, giving
//! restore-from-backup exactly one generation of history.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: file-per-key production backend with
//!   atomic writes.
//! - [`mem_backend::MemBackend`]: for testing without filesystem I/O.

pub mod backend;
pub mod fs_backend;
pub mod garden_store;
pub mod mem_backend;
pub mod shape;

pub use backend::StorageBackend;
pub use garden_store::{
    export_document, GardenStore, LoadOutcome, ResaveTask, StorageUsage, BACKUP_KEY, LIVE_KEY,
};
pub use shape::{detect_legacy_shape, LegacyShape};
