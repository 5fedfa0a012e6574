//! Search control: stop token, time and node budget.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::SearchLimits;

/// The search ran out of budget or was stopped. Unwinds the tree with `?`
/// and is caught at the root, which keeps the best move found so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("search aborted")
    }
}

impl std::error::Error for Aborted {}

/// Shared flag another thread can raise to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Decides when a search must stop.
///
/// Inside the tree the budget is checked every `nodes_between_checks`
/// nodes. While the root score is unstable the search may run until
/// `max_time`; otherwise `min_time` applies.
pub struct SearchControl {
    start: Instant,
    limits: SearchLimits,
    stop: StopToken,
    nodes_between_checks: u32,
    nodes_to_go: u32,
    need_more_time: bool,
    budget_held: bool,
    last_stats: Instant,
}

impl SearchControl {
    pub fn new(limits: SearchLimits, stop: StopToken, nodes_between_checks: u32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            limits,
            stop,
            nodes_between_checks: nodes_between_checks.max(1),
            nodes_to_go: 0,
            need_more_time: false,
            budget_held: false,
            last_stats: now,
        }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Elapsed time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Allow the search to run up to `max_time` instead of `min_time`.
    pub fn set_need_more_time(&mut self, need: bool) {
        self.need_more_time = need;
    }

    /// While held, `tick` never aborts. Used to finish the first iteration
    /// when the root has a single move.
    pub fn hold_budget(&mut self, held: bool) {
        self.budget_held = held;
    }

    fn time_limit(&self, need_more_time: bool) -> Option<Duration> {
        if need_more_time { self.limits.max_time } else { self.limits.min_time }
    }

    /// Return `true` if the time limit for the given urgency has passed.
    pub fn time_up(&self, need_more_time: bool) -> bool {
        self.time_limit(need_more_time).is_some_and(|limit| self.elapsed() >= limit)
    }

    /// Return `true` once the node budget is spent.
    pub fn nodes_exhausted(&self, total_nodes: u64) -> bool {
        self.limits.max_nodes.is_some_and(|max| total_nodes >= max)
    }

    /// Count one node and, when the check interval elapses, test the
    /// budget and the stop token.
    ///
    /// Returns `Ok(true)` when a check ran and passed.
    pub fn tick(&mut self, total_nodes: u64) -> Result<bool, Aborted> {
        if self.nodes_to_go > 0 {
            self.nodes_to_go -= 1;
            return Ok(false);
        }
        self.nodes_to_go = self.nodes_between_checks - 1;
        if self.budget_held {
            return Ok(false);
        }
        if self.stop.is_stopped() || self.time_up(self.need_more_time) || self.nodes_exhausted(total_nodes) {
            return Err(Aborted);
        }
        Ok(true)
    }

    /// Return `true` at most once per second, for periodic statistics.
    pub fn stats_due(&mut self) -> bool {
        if self.last_stats.elapsed() >= Duration::from_secs(1) {
            self.last_stats = Instant::now();
            true
        } else {
            false
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }
}
