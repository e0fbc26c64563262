//! Age-triggered improvement scheduler
//!
//! Runs on a fixed wall-clock cadence, inspects every stored record's age in
//! whole days, and invokes the improvement engine when the age hits a
//! milestone. Owns its own lifecycle: `tick` can be driven synchronously in
//! tests, `run` loops until a shutdown signal arrives.

use crate::improve::{ImproveOutcome, Improver};
use crate::store::RecordStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Whole-day ages at which a record becomes eligible for an improvement pass.
pub const DEFAULT_MILESTONE_DAYS: &[i64] = &[1, 3, 7, 30, 90, 365];

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Milestone ages in whole days
    #[serde(default = "default_milestones")]
    pub milestone_days: Vec<i64>,
}

fn default_interval() -> u64 { 60 }
fn default_milestones() -> Vec<i64> { DEFAULT_MILESTONE_DAYS.to_vec() }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            milestone_days: default_milestones(),
        }
    }
}

/// Summary of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Records fetched from the store
    pub scanned: usize,
    /// Improvement passes persisted
    pub improved: usize,
    /// Passes aborted because post-update content was flagged
    pub skipped: usize,
    /// Per-record store failures
    pub failed: usize,
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scanned {}, improved {}, skipped {}, failed {}",
            self.scanned, self.improved, self.skipped, self.failed
        )
    }
}

/// The scheduler. Holds no persisted state; the per-day gate below lives in
/// process memory only.
pub struct ImprovementScheduler {
    config: SchedulerConfig,
    store: Arc<dyn RecordStore>,
    improver: Improver,
    // fingerprint -> last milestone day a pass was attempted. Age stays
    // constant for a full day while ticks come every minute, so without this
    // gate the same milestone would fire on every tick of that day.
    last_handled: HashMap<String, i64>,
}

impl ImprovementScheduler {
    pub fn new(config: SchedulerConfig, store: Arc<dyn RecordStore>, improver: Improver) -> Self {
        Self {
            config,
            store,
            improver,
            last_handled: HashMap::new(),
        }
    }

    /// Execute one tick: fetch everything, improve each record whose age in
    /// whole days sits on a milestone.
    ///
    /// A fetch error aborts the whole tick and surfaces as `Err`; per-record
    /// failures and skips are counted and the loop continues. A store-level
    /// failure does not mark the day handled, so the next tick retries that
    /// record.
    pub async fn tick(&mut self) -> Result<TickReport, crate::store::StoreError> {
        let records = self.store.query_all(None).await?;
        let now = Utc::now();
        let mut report = TickReport {
            scanned: records.len(),
            ..TickReport::default()
        };

        for record in &records {
            let age = record.age_days(now);
            if !self.config.milestone_days.contains(&age) {
                continue;
            }
            if self.last_handled.get(&record.fingerprint) == Some(&age) {
                debug!(fingerprint = %record.fingerprint, age, "milestone already handled today");
                continue;
            }

            match self.improver.improve(record).await {
                Ok(ImproveOutcome::Updated(_)) => {
                    self.last_handled.insert(record.fingerprint.clone(), age);
                    report.improved += 1;
                }
                Ok(ImproveOutcome::Skipped) => {
                    // Flagged content stays flagged for the rest of the day;
                    // mark it handled instead of retrying every tick
                    self.last_handled.insert(record.fingerprint.clone(), age);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!(fingerprint = %record.fingerprint, error = %e, "improvement pass failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run the tick loop until a shutdown signal arrives.
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval_secs,
            milestones = ?self.config.milestone_days,
            "improvement scheduler started"
        );

        let interval = std::time::Duration::from_secs(self.config.interval_secs);
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.tick().await {
                        Ok(report) => {
                            if report.improved > 0 || report.skipped > 0 || report.failed > 0 {
                                info!(%report, "scheduler tick");
                            } else {
                                debug!(%report, "scheduler tick");
                            }
                        }
                        // Tick aborted; not retried until the next natural tick
                        Err(e) => warn!(error = %e, "scheduler tick aborted: record fetch failed"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("improvement scheduler shutting down");
                    break;
                }
            }
        }
    }
}
