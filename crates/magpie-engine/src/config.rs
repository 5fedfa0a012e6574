//! Engine configuration, tuned search constants and per-search limits.

use std::path::PathBuf;
use std::time::Duration;

use crate::search::PLY_SCALE;

/// Knobs fixed when an [`Engine`](crate::Engine) is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size as log2 of the entry count.
    pub hash_bits: u8,
    /// Playing strength in `0..=1000`; anything below 1000 enables weak mode.
    pub strength: u32,
    /// Seed mixed into the weak-mode move choices.
    pub random_seed: u64,
    /// Directory holding `kpk.bitbase` and `krkp.winmasks`. When absent
    /// the tables are generated at startup.
    pub bitbase_dir: Option<PathBuf>,
    /// Opening book file in the 2-byte record format.
    pub book_path: Option<PathBuf>,
    /// Consult the opening book before searching.
    pub use_book: bool,
    /// Search one ply and pick a root move at random, favouring good ones.
    pub random_mode: bool,
    pub params: SearchParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_bits: 22,
            strength: 1000,
            random_seed: 0,
            bitbase_dir: None,
            book_path: None,
            use_book: true,
            random_mode: false,
            params: SearchParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_hash_bits(mut self, bits: u8) -> Self {
        self.hash_bits = bits.clamp(4, 30);
        self
    }

    pub fn with_strength(mut self, strength: u32, random_seed: u64) -> Self {
        self.strength = strength.min(1000);
        self.random_seed = random_seed;
        self
    }

    pub fn with_bitbase_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bitbase_dir = Some(dir.into());
        self
    }

    pub fn with_book(mut self, path: impl Into<PathBuf>) -> Self {
        self.book_path = Some(path.into());
        self
    }

    pub fn with_use_book(mut self, use_book: bool) -> Self {
        self.use_book = use_book;
        self
    }

    pub fn with_random_mode(mut self, random_mode: bool) -> Self {
        self.random_mode = random_mode;
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }
}

/// Tuned search constants. Depths are in fractional plies
/// ([`PLY_SCALE`] per ply); margins are in evaluation units.
///
/// Margin tables are indexed by remaining depth: entry `i` applies when the
/// depth is at most `i + 1` plies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Half-width of the root aspiration window.
    pub aspiration_delta: i32,
    /// Half-width used when the previous score was a mate score.
    pub aspiration_delta_mate: i32,
    pub razor_margin: i32,
    /// Razoring applies below this depth.
    pub razor_depth: i32,
    pub reverse_futility_margins: [i32; 4],
    pub futility_margins: [i32; 4],
    /// Quiet moves past these counts are skipped; beyond the table no move
    /// is skipped before this many.
    pub late_move_counts: [usize; 4],
    pub late_move_count_deep: usize,
    /// Null move is tried from this depth on.
    pub null_move_min_depth: i32,
    pub null_move_reduction: i32,
    /// Depth above which [`SearchParams::null_move_reduction_deep`] applies.
    pub null_move_deep_depth: i32,
    pub null_move_reduction_deep: i32,
    /// A failed null move whose threat was enabled by the reduced move one
    /// ply up forces a full-depth re-search below this depth.
    pub null_threat_max_depth: i32,
    /// Depth from which internal iterative deepening runs at PV nodes.
    pub iid_min_depth: i32,
    /// Depth from which internal iterative deepening also runs at non-PV nodes.
    pub iid_non_pv_depth: i32,
    /// Late move reductions apply from this depth.
    pub lmr_min_depth: i32,
    /// Reduced moves after this many get the larger reduction.
    pub lmr_late_count: usize,
    /// Root moves from this index on may be reduced.
    pub root_lmr_index: usize,
    /// Optimistic margin added to a capture before delta pruning.
    pub delta_margin: i32,
    /// Node interval between time and node budget checks.
    pub nodes_between_checks: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            aspiration_delta: 20,
            aspiration_delta_mate: 1000,
            razor_margin: 250,
            razor_depth: 4 * PLY_SCALE,
            reverse_futility_margins: [204, 420, 533, 788],
            futility_margins: [61, 144, 268, 334],
            late_move_counts: [3, 6, 12, 24],
            late_move_count_deep: 256,
            null_move_min_depth: 3 * PLY_SCALE,
            null_move_reduction: 3 * PLY_SCALE,
            null_move_deep_depth: 6 * PLY_SCALE,
            null_move_reduction_deep: 4 * PLY_SCALE,
            null_threat_max_depth: 5 * PLY_SCALE,
            iid_min_depth: 4 * PLY_SCALE,
            iid_non_pv_depth: 8 * PLY_SCALE,
            lmr_min_depth: 3 * PLY_SCALE,
            lmr_late_count: 3,
            root_lmr_index: 3,
            delta_margin: 200,
            nodes_between_checks: 5000,
        }
    }
}

impl SearchParams {
    /// Index into the four-entry margin tables for `depth`, or `None` when
    /// the depth is past the last entry.
    pub(crate) fn margin_index(depth: i32) -> Option<usize> {
        match depth {
            d if d <= PLY_SCALE => Some(0),
            d if d <= 2 * PLY_SCALE => Some(1),
            d if d <= 3 * PLY_SCALE => Some(2),
            d if d <= 4 * PLY_SCALE => Some(3),
            _ => None,
        }
    }

    pub(crate) fn reverse_futility_margin(&self, depth: i32) -> i32 {
        self.reverse_futility_margins[Self::margin_index(depth).unwrap_or(3)]
    }

    pub(crate) fn futility_margin(&self, depth: i32) -> i32 {
        self.futility_margins[Self::margin_index(depth).unwrap_or(3)]
    }

    pub(crate) fn late_move_count(&self, depth: i32) -> usize {
        Self::margin_index(depth).map_or(self.late_move_count_deep, |i| self.late_move_counts[i])
    }
}

/// Budget for one search. Every limit is optional; with none set the search
/// runs until stopped or until it reaches the maximum depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    /// Recommended thinking time. No new iteration starts after it.
    pub min_time: Option<Duration>,
    /// Hard limit, used while the root score is unstable.
    pub max_time: Option<Duration>,
    pub max_depth: Option<u32>,
    pub max_nodes: Option<u64>,
}

impl SearchLimits {
    pub fn infinite() -> Self {
        Self::default()
    }

    pub fn depth(depth: u32) -> Self {
        Self { max_depth: Some(depth), ..Self::default() }
    }

    pub fn nodes(nodes: u64) -> Self {
        Self { max_nodes: Some(nodes), ..Self::default() }
    }

    pub fn time(min: Duration, max: Duration) -> Self {
        Self { min_time: Some(min), max_time: Some(max.max(min)), ..Self::default() }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins_follow_depth() {
        let params = SearchParams::default();
        assert_eq!(params.futility_margin(PLY_SCALE), 61);
        assert_eq!(params.futility_margin(PLY_SCALE + 1), 144);
        assert_eq!(params.reverse_futility_margin(4 * PLY_SCALE), 788);
        assert_eq!(params.late_move_count(3 * PLY_SCALE), 12);
        assert_eq!(params.late_move_count(5 * PLY_SCALE), 256);
    }

    #[test]
    fn builder_clamps() {
        let config = EngineConfig::default().with_strength(5000, 7).with_hash_bits(2);
        assert_eq!(config.strength, 1000);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.hash_bits, 4);
    }

    #[test]
    fn time_limits_keep_max_above_min() {
        let limits = SearchLimits::time(Duration::from_millis(500), Duration::from_millis(100));
        assert_eq!(limits.max_time, Some(Duration::from_millis(500)));
        assert_eq!(SearchLimits::depth(3).with_nodes(10).max_nodes, Some(10));
    }
}
