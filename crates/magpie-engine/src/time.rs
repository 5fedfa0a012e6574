//! Time management: convert clock parameters to search limits.

use std::time::Duration;

use crate::config::SearchLimits;

/// Never plan for more moves than this, even in sudden death.
const MAX_MOVES_TO_PLAN: u32 = 45;
/// Safety margin kept on the clock, capped at 90% of the remaining time.
const MAX_MARGIN: Duration = Duration::from_millis(1000);

/// Clock state of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeControl {
    /// Remaining time.
    pub time: Duration,
    pub increment: Duration,
    /// Moves until the next time control, if any.
    pub moves_to_go: Option<u32>,
}

impl TimeControl {
    pub fn new(time: Duration, increment: Duration, moves_to_go: Option<u32>) -> Self {
        Self { time, increment, moves_to_go }
    }

    /// Soft and hard limits for the next move.
    ///
    /// | quantity | value |
    /// |----------|-------|
    /// | moves    | `min(moves_to_go, 45)`, at least 1 |
    /// | margin   | `min(1000 ms, 0.9 * time)` |
    /// | min      | `0.85 * (time + inc * (moves - 1) - margin) / moves` |
    /// | max      | `min * clamp(moves / 2, 2.5, 4.0)` |
    ///
    /// Both limits are clamped to `[1 ms, time - margin]`.
    pub fn limits(&self) -> SearchLimits {
        let moves = self.moves_to_go.unwrap_or(999).clamp(1, MAX_MOVES_TO_PLAN);
        let time_ms = self.time.as_secs_f64() * 1000.0;
        let inc_ms = self.increment.as_secs_f64() * 1000.0;
        let margin = (MAX_MARGIN.as_secs_f64() * 1000.0).min(time_ms * 0.9);
        let moves_f = f64::from(moves);

        let min = 0.85 * (time_ms + inc_ms * (moves_f - 1.0) - margin) / moves_f;
        let max = min * (moves_f * 0.5).clamp(2.5, 4.0);

        let ceiling = (time_ms - margin).max(1.0);
        let clamp = |ms: f64| Duration::from_millis(ms.clamp(1.0, ceiling) as u64);
        SearchLimits::time(clamp(min), clamp(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(limit: Option<Duration>) -> u128 {
        limit.map_or(0, |d| d.as_millis())
    }

    #[test]
    fn sudden_death_plans_45_moves() {
        let limits = TimeControl::new(Duration::from_secs(60), Duration::ZERO, None).limits();
        // 0.85 * (60000 - 1000) / 45
        assert_eq!(ms(limits.min_time), 1114);
        assert_eq!(ms(limits.max_time), 4457);
    }

    #[test]
    fn increment_counts_for_future_moves() {
        let limits = TimeControl::new(Duration::from_secs(60), Duration::from_secs(1), None).limits();
        // 0.85 * (60000 + 44000 - 1000) / 45
        assert_eq!(ms(limits.min_time), 1945);
    }

    #[test]
    fn last_move_before_control() {
        let limits = TimeControl::new(Duration::from_secs(10), Duration::ZERO, Some(1)).limits();
        // 0.85 * 9000; the hard limit is capped by the clock.
        assert_eq!(ms(limits.min_time), 7650);
        assert_eq!(ms(limits.max_time), 9000);
    }

    #[test]
    fn nearly_flagged_still_moves() {
        let limits = TimeControl::new(Duration::from_millis(5), Duration::ZERO, None).limits();
        assert_eq!(ms(limits.min_time), 1);
        assert_eq!(ms(limits.max_time), 1);
        assert_eq!(limits.max_depth, None);
    }

    #[test]
    fn zero_moves_to_go_is_treated_as_one() {
        let a = TimeControl::new(Duration::from_secs(30), Duration::ZERO, Some(0)).limits();
        let b = TimeControl::new(Duration::from_secs(30), Duration::ZERO, Some(1)).limits();
        assert_eq!(a, b);
    }
}
