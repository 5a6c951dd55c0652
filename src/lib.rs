//! # tilegarden Architecture
//!
//! tilegarden is the persistence and legacy-data migration engine behind a
//! grid-based page builder: it stores a user's arrangement of typed
//! content blocks ("tiles"), converts older free-form records into the
//! current template-bound schema, and coordinates debounced autosaves.
//! It is a **UI-agnostic library**: rendering, routing, and the remote
//! record service live in the host application and talk to this crate
//! through narrow ports.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (UI, remote services; not this crate)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Autosave Coordinator (autosave.rs, scheduler.rs)           │
//! │  - Debounces edits into one write per quiescent period      │
//! │  - Periodic local safety snapshot, save-state machine       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence Store (store/)                                 │
//! │  - Versioned envelope, live + one-slot backup               │
//! │  - Format detection, export/import, usage introspection     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Migration Pipeline (migrate/)                              │
//! │  - resolve template → preserve content → validate           │
//! │  - Batch orchestration with per-block error isolation       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Ports (store/backend.rs, template.rs, scheduler.rs)        │
//! │  - StorageBackend: read/write/remove opaque documents       │
//! │  - TemplateRegistry: the consumed, external catalog         │
//! │  - Scheduler: after/every with cancellable handles          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principles
//!
//! - **Untrusted legacy input**: pre-template records carry no invariants.
//!   Migration reverse-engineers intent, preserves unrecognized fields,
//!   and validates the result; corrupt elements are filtered, never fatal
//!   for the rest of the collection.
//! - **Backup before live**: every save advances the backup slot with the
//!   previous live document before writing the new one. This ordering is
//!   the store's one hard sequencing invariant.
//! - **Single-threaded, port-driven**: no wall-clock timers, no global
//!   storage, no network I/O inside the core. Everything timing- or
//!   durability-shaped goes through an injected trait, which is also what
//!   makes the whole crate testable with an in-memory backend and a
//!   virtual clock.
//!
//! ## Module Overview
//!
//! - [`model`]: `Block`, `BlockKind`, `LegacyBlock`, `Envelope`
//! - [`template`]: `Template` and the consumed registry port
//! - [`migrate`]: the resolver → preserver → validator pipeline
//! - [`store`]: backends, the `GardenStore`, legacy shape detection
//! - [`autosave`]: the debounced write coordinator
//! - [`scheduler`]: the timer port and its virtual-clock implementation
//! - [`events`]: "data saved" / "data cleared" notifications
//! - [`fixtures`]: default template catalog and sample legacy documents
//! - [`error`]: error types

pub mod autosave;
pub mod error;
pub mod events;
pub mod fixtures;
pub mod migrate;
pub mod model;
pub mod scheduler;
pub mod store;
pub mod template;

pub use error::{GardenError, Result};
