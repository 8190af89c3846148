use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::OlapError;
use crate::types::StarTable;

use super::{StorageOperation, TableFormat};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StorageSeverity {
    /// Error-level event (operation failed).
    Error,
    /// Critical error (missing files and other I/O failures).
    Critical,
}

/// Context about a single table read or write.
#[derive(Debug, Clone)]
pub struct StorageContext {
    /// File that was read or written.
    pub path: PathBuf,
    /// Table stored in the file.
    pub table: StarTable,
    /// File format.
    pub format: TableFormat,
    /// Whether the table was being read or written.
    pub operation: StorageOperation,
}

/// Minimal stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of rows read or written.
    pub rows: usize,
}

/// Observer interface for storage outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait StorageObserver: Send + Sync {
    /// Called when a table was read or written.
    fn on_success(&self, _ctx: &StorageContext, _stats: StorageStats) {}

    /// Called when reading or writing a table failed.
    fn on_failure(&self, _ctx: &StorageContext, _severity: StorageSeverity, _error: &OlapError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &StorageContext, severity: StorageSeverity, error: &OlapError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn StorageObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn StorageObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl StorageObserver for CompositeObserver {
    fn on_success(&self, ctx: &StorageContext, stats: StorageStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &StorageContext, severity: StorageSeverity, error: &OlapError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &StorageContext, severity: StorageSeverity, error: &OlapError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits storage events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl StorageObserver for TracingObserver {
    fn on_success(&self, ctx: &StorageContext, stats: StorageStats) {
        info!(
            operation = ?ctx.operation,
            table = %ctx.table,
            format = %ctx.format,
            path = %ctx.path.display(),
            rows = stats.rows,
            "table stored"
        );
    }

    fn on_failure(&self, ctx: &StorageContext, severity: StorageSeverity, error: &OlapError) {
        warn!(
            operation = ?ctx.operation,
            table = %ctx.table,
            format = %ctx.format,
            path = %ctx.path.display(),
            ?severity,
            %error,
            "table storage failed"
        );
    }

    fn on_alert(&self, ctx: &StorageContext, severity: StorageSeverity, error: &OlapError) {
        error!(
            operation = ?ctx.operation,
            table = %ctx.table,
            format = %ctx.format,
            path = %ctx.path.display(),
            ?severity,
            %error,
            "ALERT: table storage failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alerted(threshold: StorageSeverity) -> Vec<StorageSeverity> {
        [StorageSeverity::Error, StorageSeverity::Critical]
            .into_iter()
            .filter(|severity| *severity >= threshold)
            .collect()
    }

    #[test]
    fn thresholds_cover_both_failure_levels() {
        assert_eq!(
            alerted(StorageSeverity::Error),
            vec![StorageSeverity::Error, StorageSeverity::Critical]
        );
        assert_eq!(alerted(StorageSeverity::Critical), vec![StorageSeverity::Critical]);
    }
}
