//! Pawn structure, passed pawns and pawn races.
//!
//! The structural part depends only on the pawns and is cached in a
//! direct-mapped table keyed by the pawn hash.

use magpie_core::{Bitboard, Color, PieceKind, Position, Square, direction, distance};

use super::{QUEEN_VALUE, ROOK_VALUE, interpolate};

const CACHE_SIZE: usize = 1 << 16;

/// Passed pawn bonus by rank, from the pawn owner's side.
const PASSED_BONUS: [i32; 8] = [-1, 24, 26, 30, 36, 55, 100, -1];

/// Bonus for a pawn that wins an unstoppable race to promotion.
const RACE_BONUS: i32 = 500;

#[derive(Debug, Clone, Copy)]
struct PawnEntry {
    key: u64,
    /// Structure score, positive when good for White.
    score: i32,
    passed_bonus_w: i32,
    passed_bonus_b: i32,
    passed_w: Bitboard,
    passed_b: Bitboard,
}

impl PawnEntry {
    // A key no real pawn hash produces, so an empty board never hits.
    const EMPTY: PawnEntry = PawnEntry {
        key: u64::MAX,
        score: 0,
        passed_bonus_w: 0,
        passed_bonus_b: 0,
        passed_w: Bitboard::EMPTY,
        passed_b: Bitboard::EMPTY,
    };
}

pub(super) struct PawnCache {
    entries: Vec<PawnEntry>,
}

/// Doubled pawns, pawn islands and isolated pawns of one side.
fn file_defects(pawns: Bitboard) -> (i32, i32, i32) {
    let files = pawns.south_fill().inner() & 0xff;
    let doubled = pawns.count() as i32 - files.count_ones() as i32;
    let islands = ((!files >> 1) & files).count_ones() as i32;
    let isolated = (!(files << 1) & files & !(files >> 1)).count_ones() as i32;
    (doubled, islands, isolated)
}

fn passed_bonus(passed: Bitboard, own_attacks: Bitboard, color: Color) -> i32 {
    if passed.is_empty() {
        return 0;
    }
    let mut bonus = 15 * (passed & own_attacks).count() as i32;
    for sq in passed {
        let rank = match color {
            Color::White => sq.rank(),
            Color::Black => 7 - sq.rank(),
        };
        bonus += PASSED_BONUS[rank as usize];
    }
    bonus
}

fn compute_entry(pos: &Position, key: u64) -> PawnEntry {
    let w_pawns = pos.pieces_of(PieceKind::Pawn, Color::White);
    let b_pawns = pos.pieces_of(PieceKind::Pawn, Color::Black);
    let mut score = 0;

    let (w_doubled, w_islands, w_isolated) = file_defects(w_pawns);
    let (b_doubled, b_islands, b_isolated) = file_defects(b_pawns);
    score -= (w_doubled - b_doubled) * 25;
    score -= (w_islands - b_islands) * 15;
    score -= (w_isolated - b_isolated) * 15;

    // Backward pawns: guard a friendly pawn, cannot be guarded themselves,
    // and cannot advance without being captured.
    let w_attacks = w_pawns.white_pawn_attacks();
    let b_attacks = b_pawns.black_pawn_attacks();
    let all_pawns = w_pawns | b_pawns;
    let w_files = Bitboard::new(w_pawns.south_fill().inner() & 0xff);
    let b_files = Bitboard::new(b_pawns.south_fill().inner() & 0xff);
    let w_backward = w_pawns
        & !(all_pawns >> 8)
        & (b_attacks >> 8)
        & !w_attacks.north_fill()
        & w_pawns.black_pawn_attacks()
        & !b_files.north_fill();
    let b_backward = b_pawns
        & !(all_pawns << 8)
        & (w_attacks << 8)
        & !b_attacks.south_fill()
        & b_pawns.white_pawn_attacks()
        & !w_files.north_fill();
    score -= (w_backward.count() as i32 - b_backward.count() as i32) * 15;

    let passed_w = w_pawns & !(b_pawns | b_attacks | (w_pawns >> 8)).south_fill();
    let passed_b = b_pawns & !(w_pawns | w_attacks | (b_pawns << 8)).north_fill();

    PawnEntry {
        key,
        score,
        passed_bonus_w: passed_bonus(passed_w, w_attacks, Color::White),
        passed_bonus_b: passed_bonus(passed_b, b_attacks, Color::Black),
        passed_w,
        passed_b,
    }
}

/// Best unstoppable passer of one side in a pure pawn ending, as
/// (moves to promote, promotion square).
struct Runner {
    dist: i32,
    promotion: Square,
}

/// Score the passers of `color` against the enemy king and find a runner.
///
/// Returns the king-distance score (positive for `color`) and the best
/// runner, if the enemy has no pieces left to stop it.
fn passer_race(pos: &Position, passed: Bitboard, color: Color) -> (i32, Option<Runner>) {
    let hi_mtrl = QUEEN_VALUE + ROOK_VALUE;
    let enemy = color.flip();
    let enemy_pieces = pos.piece_material(enemy);
    if passed.is_empty() || enemy_pieces >= hi_mtrl {
        return (0, None);
    }
    let enemy_king = pos.king_square(enemy);
    let own_king = pos.king_square(color).bitboard();
    let mut score = 0;
    let mut best: Option<Runner> = None;
    for sq in passed {
        let (promotion, rank_from_home) = match color {
            Color::White => (Square::from_coords(sq.file(), 7), sq.rank()),
            Color::Black => (Square::from_coords(sq.file(), 0), 7 - sq.rank()),
        };
        let mut pawn_dist = (7 - rank_from_home as i32).min(5);
        let mut king_dist = distance(enemy_king, promotion);
        let mut k_score = king_dist * 4;
        if king_dist > pawn_dist {
            k_score += (king_dist - pawn_dist) * (king_dist - pawn_dist);
        }
        score += interpolate(enemy_pieces, 0, k_score, hi_mtrl, 0);

        if pos.side_to_move() == enemy {
            king_dist -= 1;
        }
        if pawn_dist < king_dist && enemy_pieces == 0 {
            let path = match color {
                Color::White => sq.bitboard().north_fill(),
                Color::Black => sq.bitboard().south_fill(),
            };
            if (path & own_king).is_nonempty() {
                pawn_dist += 1;
            }
            if best.as_ref().is_none_or(|b| pawn_dist < b.dist) {
                best = Some(Runner { dist: pawn_dist, promotion });
            }
        }
    }
    (score, best)
}

impl PawnCache {
    pub(super) fn new() -> Self {
        Self { entries: vec![PawnEntry::EMPTY; CACHE_SIZE] }
    }

    fn entry(&mut self, pos: &Position) -> PawnEntry {
        let key = pos.pawn_zobrist_hash();
        let slot = &mut self.entries[(key as usize) & (CACHE_SIZE - 1)];
        if slot.key != key {
            *slot = compute_entry(pos, key);
        }
        *slot
    }

    /// Pawn structure, passed pawns and pawn races, positive when good
    /// for White.
    pub(super) fn pawn_bonus(&mut self, pos: &Position) -> i32 {
        let entry = self.entry(pos);
        let mut score = entry.score;

        // Passed pawns grow stronger as the defender's pieces come off.
        let hi_mtrl = QUEEN_VALUE + ROOK_VALUE;
        let w_bonus = entry.passed_bonus_w;
        let b_bonus = entry.passed_bonus_b;
        score += interpolate(pos.piece_material(Color::Black), 0, 2 * w_bonus, hi_mtrl, w_bonus);
        score -= interpolate(pos.piece_material(Color::White), 0, 2 * b_bonus, hi_mtrl, b_bonus);

        let (w_race, w_runner) = passer_race(pos, entry.passed_w, Color::White);
        let (b_race, b_runner) = passer_race(pos, entry.passed_b, Color::Black);
        score += w_race - b_race;

        match (w_runner, b_runner) {
            (Some(w), Some(b)) => {
                let white_to_move = pos.white_to_move();
                let w_ply = w.dist * 2 - i32::from(white_to_move);
                let b_ply = b.dist * 2 - i32::from(!white_to_move);
                if w_ply < b_ply - 1 {
                    score += RACE_BONUS;
                } else if w_ply == b_ply - 1 {
                    // The new queen may be able to stop the other pawn.
                    if direction(w.promotion, pos.king_square(Color::Black)) != 0 {
                        score += RACE_BONUS;
                    }
                } else if w_ply == b_ply + 1 {
                    if direction(b.promotion, pos.king_square(Color::White)) != 0 {
                        score -= RACE_BONUS;
                    }
                } else {
                    score -= RACE_BONUS;
                }
            }
            (Some(_), None) => score += RACE_BONUS,
            (None, Some(_)) => score -= RACE_BONUS,
            (None, None) => {}
        }
        score
    }
}
