//! Reduced playing strength.
//!
//! Below full strength the search pretends not to see some moves. Whether a
//! move is seen depends on the position hash, the move and a seed, so a
//! given position is always misjudged the same way during one game. Very
//! weak settings also search only a random subset of the root moves.

use magpie_core::{Color, Move, Position};
use rand::Rng;

use super::stack::SearchStack;
use crate::eval::{QUEEN_VALUE, interpolate};

/// Full strength; anything below enables weak mode.
pub const MAX_STRENGTH: u32 = 1000;

/// Below this strength only a subset of the root moves is searched.
const ROOT_SUBSET_STRENGTH: u32 = 100;

/// Map a 64-bit value to `[0, 1)`.
fn unit_interval(x: u64) -> f64 {
    ((x & i64::MAX as u64) % 1_000_000_000) as f64 / 1e9
}

/// Per-square key, independent of the piece on the square.
fn square_key(index: usize) -> u64 {
    let mut z = (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn lcg_next(x: u64) -> u64 {
    x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeakMode {
    strength: u32,
    seed: u64,
}

impl WeakMode {
    /// `None` at full strength.
    pub fn new(strength: u32, seed: u64) -> Option<Self> {
        (strength < MAX_STRENGTH).then_some(Self { strength, seed })
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    /// Root moves to search. Below strength 100 each move is kept with
    /// probability `strength² / 10000`; one pseudo-randomly chosen move is
    /// always kept.
    pub fn root_subset(&self, pos: &Position, moves: &[Move]) -> Vec<Move> {
        if moves.is_empty() {
            return Vec::new();
        }
        let mut rnd = pos.zobrist_hash() ^ self.seed;
        let mut included = vec![false; moves.len()];
        included[((rnd as i64).unsigned_abs() % moves.len() as u64) as usize] = true;
        let p_include = if self.strength < ROOT_SUBSET_STRENGTH {
            f64::from(self.strength * self.strength) * 1e-4
        } else {
            1.0
        };
        for keep in &mut included {
            rnd = lcg_next(rnd);
            if unit_interval(rnd) < p_include {
                *keep = true;
            }
        }
        moves.iter().zip(included).filter_map(|(&m, keep)| keep.then_some(m)).collect()
    }

    /// Return `true` if the search should act as if `m` at `ply` did not
    /// exist.
    ///
    /// The chance of seeing a move falls off with the distance from the
    /// root, and faster with lower strength. Captures, moves near the root
    /// and moves by the piece that just moved are easier to see.
    pub fn skip_move(&self, pos: &Position, m: Move, ply: usize, stack: &SearchStack) -> bool {
        let rnd = pos.zobrist_hash() ^ square_key(m.from().index()) ^ square_key(m.to().index()) ^ self.seed;
        let rnd = unit_interval(rnd);

        let s = f64::from(self.strength) * 1e-3;
        let offset = (17.0 - 50.0 * s) / 3.0;
        let total_material = pos.material(Color::White) + pos.material(Color::Black);
        let scale = f64::from(interpolate(total_material, 0, 30, QUEEN_VALUE * 4, 100));
        let effective_ply = ply as f64 * scale * 1e-2;
        let mut p = 1.0 / (1.0 + (effective_ply + offset).exp());

        let easy = pos.piece_at(m.to()).is_some()
            || ply < 2
            || stack.grandparent(ply).is_some_and(|info| info.current_move.to() == m.from());
        if easy {
            p = 1.0 - (1.0 - p) * (1.0 - p);
        }
        rnd > p
    }
}

/// Pick a root move at random, weighting each by how close its score is to
/// the best one: `ceil(100 * exp(-d² / 2))` with `d` the score difference
/// in pawns of 100.
pub fn pick_semi_random<R: Rng>(scored: &[Move], rng: &mut R) -> Option<Move> {
    let best = scored.iter().map(|m| m.score).max()?;
    let weight = |m: &Move| {
        let d = f64::from(best - m.score) / 100.0;
        (100.0 * (-d * d / 2.0).exp()).ceil() as u32
    };
    let total: u32 = scored.iter().map(weight).sum();
    let mut pick = rng.random_range(0..total);
    for m in scored {
        let w = weight(m);
        if pick < w {
            return Some(*m);
        }
        pick -= w;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::{Square, Tables, movegen};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn start() -> Position {
        Position::start(Tables::shared().unwrap())
    }

    #[test]
    fn full_strength_is_not_weak() {
        assert!(WeakMode::new(1000, 0).is_none());
        assert_eq!(WeakMode::new(999, 0).map(|w| w.strength()), Some(999));
    }

    #[test]
    fn root_subset_keeps_at_least_one_move() {
        let mut pos = start();
        let moves = movegen::legal_moves(&mut pos);
        let weak = WeakMode::new(0, 42).unwrap();
        let subset = weak.root_subset(&pos, moves.as_slice());
        assert_eq!(subset.len(), 1);
        assert!(moves.contains(subset[0]));

        let medium = WeakMode::new(500, 42).unwrap();
        assert_eq!(medium.root_subset(&pos, moves.as_slice()).len(), moves.len());
    }

    #[test]
    fn root_subset_is_deterministic() {
        let mut pos = start();
        let moves = movegen::legal_moves(&mut pos);
        let weak = WeakMode::new(60, 7).unwrap();
        assert_eq!(weak.root_subset(&pos, moves.as_slice()), weak.root_subset(&pos, moves.as_slice()));
    }

    #[test]
    fn near_full_strength_sees_shallow_moves() {
        let pos = start();
        let stack = SearchStack::new();
        let weak = WeakMode::new(999, 3).unwrap();
        let m = Move::new(Square::G1, Square::F3, None);
        // p is close to 1 at ply 1.
        assert!(!weak.skip_move(&pos, m, 1, &stack));
    }

    #[test]
    fn zero_strength_misses_most_deep_moves() {
        let mut pos = start();
        let stack = SearchStack::new();
        let weak = WeakMode::new(0, 11).unwrap();
        let moves = movegen::legal_moves(&mut pos);
        let skipped = moves.iter().filter(|&&m| weak.skip_move(&pos, m, 6, &stack)).count();
        assert!(skipped > moves.len() / 2, "skipped {skipped} of {}", moves.len());
    }

    #[test]
    fn semi_random_prefers_close_scores() {
        let good = Move::new(Square::E2, Square::E4, None).with_score(50);
        let bad = Move::new(Square::G1, Square::H3, None).with_score(-600);
        let mut rng = StdRng::seed_from_u64(1);
        let picks = (0..200).filter(|_| pick_semi_random(&[good, bad], &mut rng) == Some(good)).count();
        // The bad move has weight 1 against 100.
        assert!(picks > 180);
        assert_eq!(pick_semi_random(&[], &mut rng), None);
    }
}
