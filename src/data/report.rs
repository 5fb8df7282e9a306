//! Turning a parse cycle into a dashboard report, and change detection.

use chronywatch_types::{ClientList, ClientReport};
use tracing::debug;

use crate::source::InvocationError;

/// Timestamp layout used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted for a report.
pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Build a report from the outcome of one invocation-parse cycle.
pub fn build_report(
    outcome: Result<ClientList, InvocationError>,
    timestamp: impl Into<String>,
) -> ClientReport {
    match outcome {
        Ok(list) => ClientReport::success(list, timestamp),
        Err(e) => ClientReport::failure(e.to_string(), timestamp),
    }
}

/// Check whether `current` shows something different from `previous`.
///
/// Only the client rows and the error are compared. No previous report
/// counts as a change.
pub fn has_changed(previous: Option<&ClientReport>, current: &ClientReport) -> bool {
    match previous {
        Some(prev) => !prev.same_content(current),
        None => true,
    }
}

/// Check `current` against the fingerprint a viewer last rendered.
///
/// Viewers that have not rendered anything yet always see a change.
pub fn changed_since(seen: Option<&str>, current: &ClientReport) -> bool {
    seen != Some(current.fingerprint.as_str())
}

/// The last report one consumer has seen, for change detection.
///
/// Each consumer owns its own cache; the parser keeps no state.
#[derive(Debug, Default)]
pub struct ReportCache {
    last: Option<ClientReport>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `report` as the latest and return whether it changed.
    pub fn observe(&mut self, report: &ClientReport) -> bool {
        let changed = has_changed(self.last.as_ref(), report);
        if changed {
            debug!(count = report.count, error = report.error.is_some(), "client set changed");
        }
        self.last = Some(report.clone());
        changed
    }

    /// The last observed report.
    pub fn last(&self) -> Option<&ClientReport> {
        self.last.as_ref()
    }

    /// Forget the last report so the next one counts as changed.
    pub fn clear(&mut self) {
        self.last = None;
    }
}
