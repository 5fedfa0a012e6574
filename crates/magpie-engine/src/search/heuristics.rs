//! Killer move table and history heuristic for quiet move ordering.

use magpie_core::{Move, Piece, Position};

use super::MAX_PLY;

/// Two killer moves per ply: quiet moves that caused beta cutoffs.
pub struct KillerTable {
    slots: Vec<[Move; 2]>,
}

impl KillerTable {
    /// Create an empty killer table.
    pub fn new() -> Self {
        Self { slots: vec![[Move::EMPTY; 2]; MAX_PLY] }
    }

    /// Store a killer move at the given ply.
    ///
    /// Shifts slot 0 to slot 1 if the new move differs from slot 0.
    pub fn add_killer(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] != mv {
            slot[1] = slot[0];
            slot[0] = mv;
        }
    }

    /// Ordering bonus: 4 or 3 for the killers of this ply, 2 or 1 for the
    /// killers two plies up, otherwise 0.
    pub fn killer_score(&self, ply: usize, mv: Move) -> i32 {
        if let Some(slot) = self.slots.get(ply) {
            if slot[0] == mv {
                return 4;
            }
            if slot[1] == mv {
                return 3;
            }
        }
        if let Some(slot) = ply.checked_sub(2).and_then(|p| self.slots.get(p)) {
            if slot[0] == mv {
                return 2;
            }
            if slot[1] == mv {
                return 1;
            }
        }
        0
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Success counts are halved (together with the failures) when they pass
/// this value.
const HISTORY_LIMIT: i32 = 1000;

/// History heuristic indexed by `[piece][to_square]`.
///
/// Tracks how often a quiet move caused a cutoff versus how often it was
/// tried without one. The resulting score lies in `0..=49` and is cached
/// until the counters change.
pub struct History {
    success: [[i32; 64]; Piece::COUNT],
    fail: [[i32; 64]; Piece::COUNT],
    score: [[i32; 64]; Piece::COUNT],
}

impl History {
    pub fn new() -> Self {
        Self { success: [[0; 64]; Piece::COUNT], fail: [[0; 64]; Piece::COUNT], score: [[-1; 64]; Piece::COUNT] }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn index(pos: &Position, mv: Move) -> Option<(usize, usize)> {
        pos.piece_at(mv.from()).map(|p| (p.index(), mv.to().index()))
    }

    /// Record a cutoff by `mv` at `depth` (whole plies).
    pub fn add_success(&mut self, pos: &Position, mv: Move, depth: i32) {
        let Some((p, to)) = Self::index(pos, mv) else {
            return;
        };
        let mut val = self.success[p][to] + depth;
        if val > HISTORY_LIMIT {
            val /= 2;
            self.fail[p][to] /= 2;
        }
        self.success[p][to] = val;
        self.score[p][to] = -1;
    }

    /// Record that `mv` was searched before the cutoff move without
    /// causing one.
    pub fn add_fail(&mut self, pos: &Position, mv: Move, depth: i32) {
        let Some((p, to)) = Self::index(pos, mv) else {
            return;
        };
        self.fail[p][to] += depth;
        self.score[p][to] = -1;
    }

    /// Ordering score in `0..=49`.
    pub fn hist_score(&mut self, pos: &Position, mv: Move) -> i32 {
        let Some((p, to)) = Self::index(pos, mv) else {
            return 0;
        };
        let cached = self.score[p][to];
        if cached >= 0 {
            return cached;
        }
        let succ = self.success[p][to];
        let fail = self.fail[p][to];
        let score = if succ + fail > 0 { succ * 49 / (succ + fail) } else { 0 };
        self.score[p][to] = score;
        score
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::{Square, Tables};

    fn e2e4() -> Move {
        Move::new(Square::E2, Square::E4, None)
    }

    fn d2d4() -> Move {
        Move::new(Square::D2, Square::D4, None)
    }

    #[test]
    fn killer_store_and_score() {
        let mut kt = KillerTable::new();
        kt.add_killer(5, e2e4());
        assert_eq!(kt.killer_score(5, e2e4()), 4);
        assert_eq!(kt.killer_score(5, d2d4()), 0);

        // Second killer shifts the first to slot 1.
        kt.add_killer(5, d2d4());
        assert_eq!(kt.killer_score(5, d2d4()), 4);
        assert_eq!(kt.killer_score(5, e2e4()), 3);
    }

    #[test]
    fn killer_same_move_no_shift() {
        let mut kt = KillerTable::new();
        kt.add_killer(0, e2e4());
        kt.add_killer(0, d2d4());
        kt.add_killer(0, d2d4());
        assert_eq!(kt.killer_score(0, d2d4()), 4);
        assert_eq!(kt.killer_score(0, e2e4()), 3);
    }

    #[test]
    fn killers_two_plies_up_score_lower() {
        let mut kt = KillerTable::new();
        kt.add_killer(3, e2e4());
        kt.add_killer(3, d2d4());
        assert_eq!(kt.killer_score(5, d2d4()), 2);
        assert_eq!(kt.killer_score(5, e2e4()), 1);
        assert_eq!(kt.killer_score(4, e2e4()), 0);
        assert_eq!(kt.killer_score(1, e2e4()), 0);
    }

    #[test]
    fn killer_out_of_range_is_ignored() {
        let mut kt = KillerTable::new();
        kt.add_killer(MAX_PLY + 10, e2e4());
        assert_eq!(kt.killer_score(MAX_PLY + 10, e2e4()), 0);
    }

    #[test]
    fn history_ratio() {
        let pos = Position::start(Tables::shared().unwrap());
        let mut ht = History::new();
        assert_eq!(ht.hist_score(&pos, e2e4()), 0);
        ht.add_success(&pos, e2e4(), 3);
        assert_eq!(ht.hist_score(&pos, e2e4()), 49);
        ht.add_fail(&pos, e2e4(), 3);
        assert_eq!(ht.hist_score(&pos, e2e4()), 24);
        // Same piece, other destination.
        assert_eq!(ht.hist_score(&pos, d2d4()), 0);
    }

    #[test]
    fn history_halves_on_overflow() {
        let pos = Position::start(Tables::shared().unwrap());
        let mut ht = History::new();
        ht.add_fail(&pos, e2e4(), 500);
        ht.add_success(&pos, e2e4(), 1000);
        ht.add_success(&pos, e2e4(), 2);
        // 1002 / 2 successes against 500 / 2 failures.
        assert_eq!(ht.hist_score(&pos, e2e4()), 501 * 49 / (501 + 250));
    }
}
