//! One invocation-parse cycle per call.

use std::sync::Arc;

use chronywatch_types::ClientReport;
use tracing::{info, warn};

use crate::data::{build_report, changed_since, local_timestamp, parse_clients, ReportCache};
use crate::source::ClientSource;

/// Fetch from `source` once, parse, and build a report.
///
/// Failures become the report's `error`; this never returns an error
/// itself.
pub async fn collect(source: &dyn ClientSource) -> ClientReport {
    let outcome = source.fetch().await.map(|raw| parse_clients(&raw));
    if let Err(e) = &outcome {
        warn!(source = source.description(), error = %e, "failed to collect clients");
    }
    build_report(outcome, local_timestamp())
}

/// A shared source. Change tracking belongs to each consumer, never to
/// the collector.
#[derive(Debug, Clone)]
pub struct Collector {
    source: Arc<dyn ClientSource>,
}

impl Collector {
    pub fn new(source: Arc<dyn ClientSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &dyn ClientSource {
        self.source.as_ref()
    }

    /// Collect a report with `changed` left unset.
    pub async fn collect(&self) -> ClientReport {
        collect(self.source.as_ref()).await
    }

    /// Collect a report for a viewer that last rendered `seen`.
    pub async fn collect_since(&self, seen: Option<&str>) -> ClientReport {
        let mut report = self.collect().await;
        report.changed = changed_since(seen, &report);
        report
    }

    /// Collect a report and set `changed` against the caller's own cache.
    pub async fn refresh(&self, cache: &mut ReportCache) -> ClientReport {
        let mut report = self.collect().await;
        report.changed = cache.observe(&report);
        if report.changed {
            info!(count = report.count, error = ?report.error, "client list updated");
        }
        report
    }
}
