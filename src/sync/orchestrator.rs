//! Sync orchestrator - one incremental pass over an upstream source
//!
//! A run moves through `Idle -> Fetching -> Processing -> (Committing | Idle)`:
//! 1. Read the cursor for the source
//! 2. Health-check the source, then fetch everything after the cursor
//! 3. Reconcile each record: metadata is resolved on a plain connection,
//!    then the writes run in the record's own transaction; failures roll
//!    back that record only
//! 4. If anything new was stored, advance the cursor to the newest
//!    successfully reconciled timestamp
//!
//! Runs for the same source are serialized by a per-source async mutex
//! owned by the orchestrator. Runs for different sources proceed
//! independently.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use sqlx::sqlite::SqlitePool;

use super::cursor;
use super::reconciler::{FailureKind, ReconcileError, Reconciled, Reconciler};
use crate::error::{Error, Result, ResultExt};
use crate::source::{RawScrobble, ScrobbleSource};

/// Log progress every this many records
const PROGRESS_INTERVAL: usize = 100;

/// Where a source's sync currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Fetching,
    Processing,
    Committing,
}

/// Summary of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub source: String,
    /// Records returned by the source
    pub fetched: usize,
    /// New scrobbles stored
    pub created: u64,
    /// Records whose scrobble already existed
    pub already_synced: u64,
    /// Records rejected or rolled back
    pub failed: u64,
    /// `failed`, broken down by reason
    pub failures: BTreeMap<FailureKind, u64>,
    /// Records at or before the cursor that the source returned anyway
    pub stale: u64,
    pub cursor_before: i64,
    pub cursor_after: i64,
}

impl SyncReport {
    /// Whether this run advanced the cursor
    pub fn advanced(&self) -> bool {
        self.cursor_after > self.cursor_before
    }
}

/// Drives sync runs against a local database
pub struct SyncOrchestrator {
    pool: SqlitePool,
    reconciler: Reconciler,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    states: Mutex<HashMap<String, SyncState>>,
}

impl SyncOrchestrator {
    pub fn new(pool: SqlitePool, reconciler: Reconciler) -> Self {
        Self {
            pool,
            reconciler,
            locks: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of the run for `source` (`Idle` if none is active)
    pub fn state(&self, source: &str) -> SyncState {
        self.states.lock().get(source).copied().unwrap_or_default()
    }

    /// Run one incremental sync of `source`.
    ///
    /// Only an unhealthy source or a failed fetch ([`Error::SourceUnavailable`])
    /// or a failure to touch the cursor itself is returned as an error.
    /// Per-record problems are logged and counted in the report.
    pub async fn run_sync(&self, source: &dyn ScrobbleSource) -> Result<SyncReport> {
        let name = source.name().to_string();
        let lock = self.source_lock(&name);
        let _guard = lock.lock().await;

        let result = self.run_locked(&name, source).await;
        self.set_state(&name, SyncState::Idle);
        result
    }

    async fn run_locked(&self, name: &str, source: &dyn ScrobbleSource) -> Result<SyncReport> {
        let cursor_before = {
            let mut conn = self.pool.acquire().await.with_context("acquiring connection")?;
            cursor::get_cursor(&mut conn, name)
                .await
                .with_context(format!("reading cursor for {}", name))?
        };
        let mut report = SyncReport {
            source: name.to_string(),
            cursor_before,
            cursor_after: cursor_before,
            ..Default::default()
        };

        // ---- Fetching ----
        self.set_state(name, SyncState::Fetching);
        if !source.health_check().await {
            return Err(Error::source_unavailable(format!(
                "{} failed its health check",
                name
            )));
        }
        let records = source
            .fetch_since(cursor_before)
            .await
            .map_err(|e| Error::source_unavailable(format!("{}: {}", name, e)))?;
        report.fetched = records.len();

        if records.is_empty() {
            tracing::info!(source = name, cursor = cursor_before, "Nothing new to sync");
            return Ok(report);
        }
        tracing::info!(source = name, records = records.len(), since = cursor_before, "Fetched records");

        // ---- Processing ----
        self.set_state(name, SyncState::Processing);
        let mut newest: Option<i64> = None;

        for (i, raw) in records.iter().enumerate() {
            if raw.time.is_some_and(|t| t <= cursor_before) {
                report.stale += 1;
            } else {
                match self.reconcile_one(raw).await {
                    Ok(Reconciled::Created(scrobble)) => {
                        report.created += 1;
                        newest = newest.max(Some(scrobble.timestamp));
                    }
                    Ok(Reconciled::AlreadySynced(scrobble)) => {
                        report.already_synced += 1;
                        newest = newest.max(Some(scrobble.timestamp));
                    }
                    Err(ReconcileError::DuplicateKey(detail)) => {
                        tracing::debug!(source = name, time = ?raw.time, %detail, "Record already stored");
                        report.already_synced += 1;
                        newest = newest.max(raw.time);
                    }
                    Err(e) => {
                        tracing::warn!(
                            source = name,
                            time = ?raw.time,
                            title = raw.title.as_deref().unwrap_or(""),
                            error = %e,
                            "Skipping record"
                        );
                        report.failed += 1;
                        *report.failures.entry(e.kind()).or_default() += 1;
                    }
                }
            }

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                tracing::info!(source = name, "Processed {}/{} records", i + 1, records.len());
            }
        }

        if report.failed > 0 {
            let reasons: Vec<String> = report
                .failures
                .iter()
                .map(|(kind, n)| format!("{} {}", n, kind))
                .collect();
            tracing::warn!(source = name, failed = report.failed, reasons = %reasons.join(", "), "Some records were not stored");
        }
        if report.stale > 0 {
            tracing::warn!(source = name, stale = report.stale, "Source returned records at or before the cursor");
        }

        // ---- Committing ----
        if let Some(timestamp) = newest.filter(|_| report.created > 0) {
            self.set_state(name, SyncState::Committing);
            let mut conn = self.pool.acquire().await.with_context("acquiring connection")?;
            cursor::advance_cursor(&mut conn, name, timestamp, report.created)
                .await
                .with_context(format!("advancing cursor for {}", name))?;
            report.cursor_after = timestamp;
        }

        tracing::info!(
            source = name,
            fetched = report.fetched,
            created = report.created,
            already_synced = report.already_synced,
            failed = report.failed,
            cursor = report.cursor_after,
            "Sync complete"
        );
        Ok(report)
    }

    /// Reconcile one record. Lookups and catalog calls happen before the
    /// transaction starts, so it never spans network I/O.
    async fn reconcile_one(&self, raw: &RawScrobble) -> std::result::Result<Reconciled, ReconcileError> {
        let prepared = {
            let mut conn = self.pool.acquire().await?;
            self.reconciler.prepare(&mut conn, raw).await?
        };

        let mut tx = self.pool.begin().await?;
        match self.reconciler.apply(&mut tx, prepared).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    fn source_lock(&self, source: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(source.to_string())
            .or_default()
            .clone()
    }

    fn set_state(&self, source: &str, state: SyncState) {
        tracing::debug!(source, ?state, "Sync state");
        self.states.lock().insert(source.to_string(), state);
    }
}
