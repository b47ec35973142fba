//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`
//! ([`EnrichmentError`](crate::enrichment::EnrichmentError),
//! [`SourceError`](crate::source::SourceError),
//! [`ReconcileError`](crate::sync::ReconcileError)); those that can abort a
//! sync run surface here. The CLI uses `anyhow`.
//!
//! # Example
//!
//! ```ignore
//! use scrobble_sync::error::{Error, Result};
//!
//! async fn count(pool: &SqlitePool) -> Result<i64> {
//!     let stats = db::library_stats(pool).await?; // Database errors auto-convert
//!     Ok(stats.scrobbles)
//! }
//! ```

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Upstream source failed its health check or could not be listed
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Attempt to move a sync cursor backwards
    #[error("Cursor for {name} cannot move from {current} back to {requested}")]
    CursorRegression {
        name: String,
        current: i64,
        requested: i64,
    },

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a source-unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_regression_display() {
        let err = Error::CursorRegression {
            name: "maloja".to_string(),
            current: 200,
            requested: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("maloja"));
        assert!(msg.contains("200"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::source_unavailable("health check failed").context("while syncing maloja");
        let msg = err.to_string();
        assert!(msg.contains("while syncing maloja"));
        assert!(msg.contains("health check failed"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::source_unavailable("timeout"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }

    #[test]
    fn test_sqlx_result_ext() {
        let result: std::result::Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let err = result.with_context("reading cursor").unwrap_err();
        assert!(matches!(
            err,
            Error::WithContext { ref source, .. } if matches!(**source, Error::Database(_))
        ));
    }
}
