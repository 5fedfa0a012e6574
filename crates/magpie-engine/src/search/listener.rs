//! Progress callbacks from a running search.

use std::time::Duration;

use magpie_core::Move;

/// A principal variation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PvInfo {
    /// Iteration depth in whole plies.
    pub depth: u32,
    /// Centipawn-like score, or moves to mate when `is_mate` is set
    /// (negative when getting mated).
    pub score: i32,
    pub is_mate: bool,
    /// The score is only an upper bound (root fail low).
    pub upper_bound: bool,
    /// The score is only a lower bound (root fail high).
    pub lower_bound: bool,
    pub time: Duration,
    pub nodes: u64,
    pub nps: u64,
    pub pv: Vec<Move>,
}

/// Receives search progress. Every method has an empty default.
pub trait SearchListener {
    /// A new iteration started.
    fn notify_depth(&mut self, _depth: u32) {}

    /// The root move with 1-based index `move_number` is being searched.
    fn notify_curr_move(&mut self, _mv: Move, _move_number: usize) {}

    fn notify_pv(&mut self, _info: &PvInfo) {}

    /// Periodic node statistics.
    fn notify_stats(&mut self, _nodes: u64, _nps: u64, _time: Duration) {}
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoListener;

impl SearchListener for NoListener {}

/// Nodes per second, 0 before the first millisecond.
pub(crate) fn nodes_per_second(nodes: u64, time: Duration) -> u64 {
    let millis = time.as_millis() as u64;
    if millis == 0 { 0 } else { nodes.saturating_mul(1000) / millis }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nps() {
        assert_eq!(nodes_per_second(5000, Duration::from_millis(500)), 10_000);
        assert_eq!(nodes_per_second(5000, Duration::ZERO), 0);
    }
}
