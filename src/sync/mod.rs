//! Incremental sync of upstream scrobbles into the local database.
//!
//! - [`cursor`]: per-source high-water mark in the `sync_log` table
//! - [`reconciler`]: maps one upstream record onto local entities
//! - [`orchestrator`]: fetch, reconcile per record, advance the cursor

pub mod cursor;
pub mod orchestrator;
pub mod reconciler;

pub use orchestrator::{SyncOrchestrator, SyncReport, SyncState};
pub use reconciler::{DurationPolicy, FailureKind, Prepared, ReconcileError, Reconciled, Reconciler};
