//! Poll output tables until rows for a submission show up.
//!
//! Each iteration reads every configured table in order, filters it with the
//! dataset's declared match schema and keeps any non-empty result. The loop
//! ends when the match policy is satisfied or the wall-clock budget runs out.
//! Running out of budget is not an error: the caller gets whatever was seen.

use std::collections::BTreeMap;
use std::time::Duration;

use foundry_client::Table;
use serde::Serialize;
use tokio::time::Instant;

use super::matching::select_matching_rows;
use super::models::{DatasetKey, MatchTarget, OutputTable};
use crate::kernel::BasePipelinePlatform;

/// When a poll counts as done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// First table with matching rows ends the loop
    #[default]
    AnyTable,
    /// Every configured table must have matching rows
    AllTables,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub policy: MatchPolicy,
}

impl PollConfig {
    /// Text artifact outputs
    pub const TEXT: PollConfig = PollConfig::new(Duration::from_secs(5), Duration::from_secs(900));
    /// Essay analysis
    pub const CHAT: PollConfig = PollConfig::new(Duration::from_secs(2), Duration::from_secs(300));
    /// Media item rows in the events table
    pub const MEDIA: PollConfig = PollConfig::new(Duration::from_secs(5), Duration::from_secs(900));

    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            policy: MatchPolicy::AnyTable,
        }
    }

    pub const fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Polling,
    /// Last iteration had at least one failed read
    TransientErrorRetry,
    Matched,
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollOutcome {
    pub state: PollState,
    /// Matching rows per table; tables with no match map to an empty table
    pub results: BTreeMap<DatasetKey, Table>,
    pub iterations: u32,
    pub elapsed_ms: u64,
}

impl PollOutcome {
    pub fn is_matched(&self) -> bool {
        self.state == PollState::Matched
    }

    pub fn rows(&self, key: DatasetKey) -> Option<&Table> {
        self.results.get(&key)
    }

    /// Total matching rows across all tables
    pub fn total_rows(&self) -> usize {
        self.results.values().map(Table::len).sum()
    }
}

fn satisfied(policy: MatchPolicy, tables: &[OutputTable], results: &BTreeMap<DatasetKey, Table>) -> bool {
    let matched = |t: &OutputTable| results.get(&t.key).is_some_and(|rows| !rows.is_empty());
    match policy {
        MatchPolicy::AnyTable => tables.iter().any(matched),
        MatchPolicy::AllTables => !tables.is_empty() && tables.iter().all(matched),
    }
}

/// Poll `tables` until rows matching `target` appear or `config.timeout` elapses.
///
/// Reads are sequential. A failed or deadline-cut read counts as an empty
/// result for that iteration, and so does a table whose columns cannot be
/// matched against the target. Matches found in earlier iterations are kept.
pub async fn poll_until_match(
    platform: &dyn BasePipelinePlatform,
    tables: &[OutputTable],
    target: &MatchTarget,
    config: PollConfig,
) -> PollOutcome {
    let start = Instant::now();
    let deadline = start + config.timeout;

    let mut results: BTreeMap<DatasetKey, Table> = tables
        .iter()
        .map(|t| (t.key, Table::default()))
        .collect();
    let mut iterations = 0u32;

    tracing::info!(
        tables = ?tables.iter().map(|t| t.key).collect::<Vec<_>>(),
        ?target,
        interval_secs = config.interval.as_secs_f64(),
        timeout_secs = config.timeout.as_secs_f64(),
        policy = ?config.policy,
        "Polling output tables"
    );

    let state = loop {
        iterations += 1;
        let mut had_error = false;

        for table in tables {
            if results.get(&table.key).is_some_and(|rows| !rows.is_empty()) {
                continue;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let read = match tokio::time::timeout(remaining, platform.read_table(&table.rid)).await {
                Ok(Ok(read)) => read,
                Ok(Err(e)) => {
                    tracing::warn!(dataset = %table.key, rid = %table.rid, error = %e, "Table read failed; will retry");
                    had_error = true;
                    continue;
                }
                Err(_) => {
                    tracing::warn!(dataset = %table.key, rid = %table.rid, "Table read cut off at poll deadline");
                    had_error = true;
                    continue;
                }
            };

            match select_matching_rows(&table.key.schema(), &read, target) {
                Ok(rows) if !rows.is_empty() => {
                    tracing::info!(dataset = %table.key, rows = rows.len(), iteration = iterations, "Matching rows found");
                    results.insert(table.key, rows);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Output table cannot be matched this iteration");
                }
            }
        }

        if satisfied(config.policy, tables, &results) {
            break PollState::Matched;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break PollState::TimedOut;
        }

        let waiting = if had_error {
            PollState::TransientErrorRetry
        } else {
            PollState::Polling
        };
        tracing::debug!(iteration = iterations, state = ?waiting, "No match yet");
        tokio::time::sleep(config.interval.min(remaining)).await;
    };

    let elapsed = start.elapsed();
    if state == PollState::TimedOut {
        tracing::warn!(
            iterations,
            elapsed_secs = elapsed.as_secs_f64(),
            "Poll timed out; returning partial results"
        );
    }

    PollOutcome {
        state,
        results,
        iterations,
        elapsed_ms: elapsed.as_millis() as u64,
    }
}
