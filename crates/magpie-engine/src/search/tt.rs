//! Two-slot transposition table with generation aging.
//!
//! Every key hashes to two candidate slots:
//!
//! ```text
//! h0 = key         & mask
//! h1 = (key >> 32) & mask
//! ```
//!
//! An entry remembers which of its two slots it lives in, so a valuable
//! entry that is about to be overwritten can be moved to its other slot
//! when that slot holds something less valuable.
//!
//! ## Value ordering
//!
//! An entry written during the current search generation beats an older one.
//! Within a generation exact scores beat bounds, and deeper searches beat
//! shallower ones.
//!
//! ## Mate scores
//!
//! Mate scores are stored relative to the node (mate in N from here) and read
//! back relative to the root, see [`TtEntry::score`].

use magpie_core::{Move, Position, movegen};

use super::{MATE0, PLY_SCALE};

/// Kind of score stored in an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is exact.
    Exact,
    /// The true score is at least the stored score (fail high).
    LowerBound,
    /// The true score is at most the stored score (fail low).
    UpperBound,
    /// Unused slot.
    None,
}

/// Scores further than this from zero are mate scores.
const MATE_WINDOW: i32 = MATE0 - 1000;

/// One table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    key: u64,
    mv: u16,
    score: i16,
    /// Depth in fractional plies (bits 0-14) and hash slot (bit 15).
    depth_slot: u16,
    generation: u8,
    bound: Bound,
    eval: i16,
}

impl TtEntry {
    const EMPTY: TtEntry =
        TtEntry { key: 0, mv: 0, score: 0, depth_slot: 0, generation: 0, bound: Bound::None, eval: 0 };

    pub fn key(&self) -> u64 {
        self.key
    }

    /// The stored best move, [`Move::EMPTY`] when none was recorded.
    pub fn best_move(&self) -> Move {
        Move::from_raw(self.mv)
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    /// Stored score converted back to mate-at-ply form for a node at `ply`.
    pub fn score(&self, ply: i32) -> i32 {
        let score = i32::from(self.score);
        if score > MATE_WINDOW {
            score - ply
        } else if score < -MATE_WINDOW {
            score + ply
        } else {
            score
        }
    }

    /// Search depth in fractional plies.
    pub fn depth(&self) -> i32 {
        i32::from(self.depth_slot & 0x7fff)
    }

    /// Static evaluation cached with the entry.
    pub fn eval(&self) -> i32 {
        i32::from(self.eval)
    }

    pub fn generation(&self) -> u8 {
        self.generation
    }

    fn hash_slot(&self) -> usize {
        usize::from(self.depth_slot >> 15)
    }

    fn set_score(&mut self, score: i32, ply: i32) {
        let stored = if score > MATE_WINDOW {
            score + ply
        } else if score < -MATE_WINDOW {
            score - ply
        } else {
            score
        };
        self.score = stored as i16;
    }

    fn set_depth_and_slot(&mut self, depth: i32, slot: usize) {
        self.depth_slot = (depth.clamp(0, 0x7fff) as u16) | ((slot as u16) << 15);
    }

    fn better_than(&self, other: &TtEntry, generation: u8) -> bool {
        if (self.generation == generation) != (other.generation == generation) {
            return self.generation == generation;
        }
        if (self.bound == Bound::Exact) != (other.bound == Bound::Exact) {
            return self.bound == Bound::Exact;
        }
        self.depth() > other.depth()
    }

    fn valuable(&self, generation: u8) -> bool {
        self.generation == generation && (self.bound == Bound::Exact || self.depth() > 3 * PLY_SCALE)
    }
}

/// Occupancy figures for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtStats {
    pub size: usize,
    pub unused: usize,
    pub current_generation: usize,
}

/// Single-threaded transposition table of `1 << log2_size` entries.
pub struct TranspositionTable {
    entries: Vec<TtEntry>,
    mask: u64,
    generation: u8,
}

impl TranspositionTable {
    /// Create a table with `1 << log2_size` empty entries.
    pub fn new(log2_size: u8) -> TranspositionTable {
        let len = 1usize << log2_size;
        TranspositionTable { entries: vec![TtEntry::EMPTY; len], mask: (len - 1) as u64, generation: 0 }
    }

    fn h0(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }

    fn h1(&self, key: u64) -> usize {
        ((key >> 32) & self.mask) as usize
    }

    // ── Public API ───────────────────────────────────────────────────────────

    /// Store a search result.
    ///
    /// `score` is relative to the root at `ply`; `depth` is in fractional
    /// plies and clamped at zero. An entry for the same key and bound that
    /// is deeper survives unless the new score is a tighter bound.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(&mut self, key: u64, mv: Move, score: i32, bound: Bound, ply: i32, depth: i32, eval: i32) {
        let depth = depth.max(0);
        let idx0 = self.h0(key);
        let idx1 = self.h1(key);
        let (mut idx, mut slot) = (idx0, 0);
        if self.entries[idx].key != key {
            (idx, slot) = (idx1, 1);
        }
        if self.entries[idx].key != key {
            if self.entries[idx1].better_than(&self.entries[idx0], self.generation) {
                (idx, slot) = (idx0, 0);
            }
            let victim = self.entries[idx];
            if victim.valuable(self.generation) {
                let alt = if victim.hash_slot() == 0 { self.h1(victim.key) } else { self.h0(victim.key) };
                if victim.better_than(&self.entries[alt], self.generation) {
                    let mut moved = victim;
                    moved.set_depth_and_slot(victim.depth(), 1 - victim.hash_slot());
                    self.entries[alt] = moved;
                }
            }
        }

        let generation = self.generation;
        let ent = &mut self.entries[idx];
        if ent.key == key && ent.depth() > depth && ent.bound == bound {
            let keep = match bound {
                Bound::Exact => true,
                Bound::LowerBound => score <= ent.score(ply),
                Bound::UpperBound => score >= ent.score(ply),
                Bound::None => false,
            };
            if keep {
                return;
            }
        }
        if ent.key != key || !mv.is_empty() {
            ent.mv = mv.raw();
        }
        ent.key = key;
        ent.set_score(score, ply);
        ent.set_depth_and_slot(depth, slot);
        ent.generation = generation;
        ent.bound = bound;
        ent.eval = eval as i16;
    }

    /// Look up `key`. A hit is marked as belonging to the current
    /// generation.
    pub fn probe(&mut self, key: u64) -> Option<TtEntry> {
        let generation = self.generation;
        for idx in [self.h0(key), self.h1(key)] {
            let ent = &mut self.entries[idx];
            if ent.key == key {
                if ent.bound == Bound::None {
                    return None;
                }
                ent.generation = generation;
                return Some(*ent);
            }
        }
        None
    }

    /// Start a new generation; call once per move played on the board.
    pub fn next_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Mark every entry empty.
    pub fn clear(&mut self) {
        for ent in &mut self.entries {
            ent.bound = Bound::None;
        }
    }

    /// Principal variation starting with `first`: follows stored moves while
    /// they are legal, stopping at a repeated position or a miss.
    pub fn extract_pv_moves(&mut self, root: &Position, first: Move) -> Vec<Move> {
        let mut pos = root.clone();
        let mut pv = Vec::new();
        let mut seen: Vec<u64> = Vec::new();
        let mut mv = first;
        loop {
            pv.push(mv);
            pos.make_move(mv);
            if seen.contains(&pos.zobrist_hash()) {
                break;
            }
            seen.push(pos.zobrist_hash());
            let Some(ent) = self.probe(pos.history_hash()) else {
                break;
            };
            mv = ent.best_move();
            if !movegen::legal_moves(&mut pos).contains(mv) {
                break;
            }
        }
        pv
    }

    /// The stored variation from `root` in coordinate notation, bounds
    /// marked with `<` (upper) and `>` (lower).
    pub fn extract_pv(&mut self, root: &Position) -> String {
        let mut pos = root.clone();
        let mut text = Vec::new();
        let mut seen: Vec<u64> = Vec::new();
        while let Some(ent) = self.probe(pos.history_hash()) {
            let mv = ent.best_move();
            if !movegen::legal_moves(&mut pos).contains(mv) {
                break;
            }
            let marker = match ent.bound() {
                Bound::UpperBound => "<",
                Bound::LowerBound => ">",
                _ => "",
            };
            text.push(format!("{marker}{mv}"));
            pos.make_move(mv);
            if seen.contains(&pos.zobrist_hash()) {
                break;
            }
            seen.push(pos.zobrist_hash());
        }
        text.join(" ")
    }

    pub fn stats(&self) -> TtStats {
        let unused = self.entries.iter().filter(|e| e.bound == Bound::None).count();
        let current_generation = self
            .entries
            .iter()
            .filter(|e| e.bound != Bound::None && e.generation == self.generation)
            .count();
        TtStats { size: self.entries.len(), unused, current_generation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::{Square, Tables};

    fn e2e4() -> Move {
        Move::new(Square::E2, Square::E4, None)
    }

    #[test]
    fn store_and_probe_exact() {
        let mut tt = TranspositionTable::new(10);
        let key = 0xDEAD_BEEF_1234_5678;
        tt.insert(key, e2e4(), 37, Bound::Exact, 3, 5 * PLY_SCALE, 12);
        let ent = tt.probe(key).expect("entry stored");
        assert_eq!(ent.best_move(), e2e4());
        assert_eq!(ent.score(3), 37);
        assert_eq!(ent.depth(), 5 * PLY_SCALE);
        assert_eq!(ent.bound(), Bound::Exact);
        assert_eq!(ent.eval(), 12);
    }

    #[test]
    fn probe_miss() {
        let mut tt = TranspositionTable::new(10);
        assert!(tt.probe(42).is_none());
    }

    #[test]
    fn mate_scores_are_stored_relative_to_the_node() {
        let mut tt = TranspositionTable::new(10);
        let key = 0x1111_2222_3333_4444;
        // Mate found 5 plies below the root, stored at ply 2.
        tt.insert(key, e2e4(), MATE0 - 5, Bound::Exact, 2, 8, 0);
        // Reached again at ply 4 the mate is two plies further away.
        assert_eq!(tt.probe(key).unwrap().score(4), MATE0 - 7);

        tt.insert(key, e2e4(), -(MATE0 - 6), Bound::Exact, 2, 16, 0);
        assert_eq!(tt.probe(key).unwrap().score(2), -(MATE0 - 6));
        assert_eq!(tt.probe(key).unwrap().score(0), -(MATE0 - 4));
    }

    #[test]
    fn empty_move_keeps_stored_move() {
        let mut tt = TranspositionTable::new(10);
        let key = 77;
        tt.insert(key, e2e4(), 10, Bound::LowerBound, 0, 8, 0);
        tt.insert(key, Move::EMPTY, -5, Bound::UpperBound, 0, 16, 0);
        let ent = tt.probe(key).unwrap();
        assert_eq!(ent.best_move(), e2e4());
        assert_eq!(ent.bound(), Bound::UpperBound);
    }

    #[test]
    fn deeper_exact_entry_is_not_overwritten() {
        let mut tt = TranspositionTable::new(10);
        let key = 99;
        tt.insert(key, e2e4(), 50, Bound::Exact, 0, 6 * PLY_SCALE, 0);
        tt.insert(key, e2e4(), 10, Bound::Exact, 0, 2 * PLY_SCALE, 0);
        assert_eq!(tt.probe(key).unwrap().score(0), 50);
    }

    #[test]
    fn tighter_lower_bound_replaces_deeper_one() {
        let mut tt = TranspositionTable::new(10);
        let key = 123;
        tt.insert(key, e2e4(), 50, Bound::LowerBound, 0, 6 * PLY_SCALE, 0);
        tt.insert(key, e2e4(), 40, Bound::LowerBound, 0, 2 * PLY_SCALE, 0);
        assert_eq!(tt.probe(key).unwrap().score(0), 50);
        tt.insert(key, e2e4(), 80, Bound::LowerBound, 0, 2 * PLY_SCALE, 0);
        assert_eq!(tt.probe(key).unwrap().score(0), 80);
    }

    #[test]
    fn second_slot_holds_colliding_key() {
        let mut tt = TranspositionTable::new(4);
        // Same h0 slot, different h1 slots.
        let a = 0x0000_0001_0000_0003;
        let b = 0x0000_0002_0000_0003;
        tt.insert(a, e2e4(), 1, Bound::Exact, 0, 8, 0);
        tt.insert(b, e2e4(), 2, Bound::Exact, 0, 8, 0);
        assert_eq!(tt.probe(a).unwrap().score(0), 1);
        assert_eq!(tt.probe(b).unwrap().score(0), 2);
    }

    #[test]
    fn valuable_entry_is_relocated() {
        let mut tt = TranspositionTable::new(4);
        // d: both slots 5. a: h0 = 3, h1 = 5. b: both slots 3.
        let d = 0x0000_0005_0000_0005;
        let a = 0x0000_0005_0000_0003;
        let b = 0x0000_0003_0000_0013;
        tt.insert(d, e2e4(), 4, Bound::Exact, 0, 8 * PLY_SCALE, 0);
        // Slot 5 holds the better entry, so a lands in slot 3.
        tt.insert(a, e2e4(), 1, Bound::Exact, 0, 10 * PLY_SCALE, 0);
        assert_eq!(tt.probe(d).unwrap().score(0), 4);
        // b takes slot 3 and pushes the deeper a over the shallower d.
        tt.insert(b, e2e4(), 2, Bound::Exact, 0, 8 * PLY_SCALE, 0);
        assert_eq!(tt.probe(b).unwrap().score(0), 2);
        assert_eq!(tt.probe(a).unwrap().score(0), 1);
        assert!(tt.probe(d).is_none());
    }

    #[test]
    fn clear_empties_table() {
        let mut tt = TranspositionTable::new(8);
        tt.insert(5, e2e4(), 1, Bound::Exact, 0, 8, 0);
        tt.clear();
        assert!(tt.probe(5).is_none());
        assert_eq!(tt.stats().unused, 256);
    }

    #[test]
    fn probe_refreshes_generation() {
        let mut tt = TranspositionTable::new(8);
        tt.insert(5, e2e4(), 1, Bound::Exact, 0, 8, 0);
        tt.next_generation();
        assert_eq!(tt.stats().current_generation, 0);
        assert_eq!(tt.probe(5).unwrap().generation(), 1);
        assert_eq!(tt.stats().current_generation, 1);
    }

    #[test]
    fn pv_follows_legal_hash_moves() {
        let tables = Tables::shared().unwrap();
        let mut pos = Position::start(tables);
        let mut tt = TranspositionTable::new(12);
        let e7e5 = Move::new(Square::E7, Square::E5, None);
        let g1f3 = Move::new(Square::G1, Square::F3, None);
        let root = pos.clone();
        let u1 = pos.make_move(e2e4());
        tt.insert(pos.history_hash(), e7e5, 0, Bound::Exact, 1, 8, 0);
        let u2 = pos.make_move(e7e5);
        tt.insert(pos.history_hash(), g1f3, 0, Bound::LowerBound, 2, 8, 0);
        pos.unmake_move(e7e5, &u2);
        pos.unmake_move(e2e4(), &u1);
        assert_eq!(pos, root);

        let pv = tt.extract_pv_moves(&root, e2e4());
        assert_eq!(pv, vec![e2e4(), e7e5, g1f3]);

        tt.insert(root.history_hash(), e2e4(), 0, Bound::Exact, 0, 8, 0);
        assert_eq!(tt.extract_pv(&root), "e2e4 e7e5 >g1f3");
    }

    #[test]
    fn pv_stops_at_illegal_move() {
        let tables = Tables::shared().unwrap();
        let root = Position::start(tables);
        let mut tt = TranspositionTable::new(12);
        let mut pos = root.clone();
        pos.make_move(e2e4());
        // e2e4 again is not legal for black.
        tt.insert(pos.history_hash(), e2e4(), 0, Bound::Exact, 1, 8, 0);
        assert_eq!(tt.extract_pv_moves(&root, e2e4()), vec![e2e4()]);
    }
}
