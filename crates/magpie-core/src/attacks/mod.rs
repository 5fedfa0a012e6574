//! Precomputed attack tables, built once and shared read-only.

mod magic;
mod magic_data;
mod tables;

use tracing::debug;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::error::TableError;
use crate::square::Square;

use self::magic::{BISHOP_DIRS, ROOK_DIRS, SliderTable, build_slider};
use self::magic_data::{BISHOP_BITS, BISHOP_MAGICS, ROOK_BITS, ROOK_MAGICS};

/// Attack sets for every piece type plus the square geometry the move
/// generator and evaluator need.
#[derive(Debug, Clone)]
pub struct AttackTables {
    rook: SliderTable,
    bishop: SliderTable,
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    pawn_blockers: [[Bitboard; 64]; 2],
    between: Box<[[Bitboard; 64]; 64]>,
}

impl AttackTables {
    /// Build all tables, verifying the fixed magic constants.
    pub fn new() -> Result<AttackTables, TableError> {
        let rook = build_slider(&ROOK_MAGICS, &ROOK_BITS, &ROOK_DIRS, "rook")?;
        let bishop = build_slider(&BISHOP_MAGICS, &BISHOP_BITS, &BISHOP_DIRS, "bishop")?;
        debug!(
            rook_slots = rook.attacks.len(),
            bishop_slots = bishop.attacks.len(),
            "slider attack tables built"
        );
        Ok(AttackTables {
            rook,
            bishop,
            knight: tables::knight_table(),
            king: tables::king_table(),
            pawn: tables::pawn_tables(),
            pawn_blockers: tables::pawn_blocker_tables(),
            between: tables::between_table(),
        })
    }

    #[inline]
    pub fn rook(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook.attacks(sq.index(), occupied.inner())
    }

    #[inline]
    pub fn bishop(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop.attacks(sq.index(), occupied.inner())
    }

    #[inline]
    pub fn queen(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook(sq, occupied) | self.bishop(sq, occupied)
    }

    #[inline]
    pub fn knight(&self, sq: Square) -> Bitboard {
        self.knight[sq.index()]
    }

    #[inline]
    pub fn king(&self, sq: Square) -> Bitboard {
        self.king[sq.index()]
    }

    /// Squares a pawn of `color` on `sq` attacks.
    #[inline]
    pub fn pawn(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.index()]
    }

    /// Squares where an enemy pawn would stop a `color` pawn on `sq` from
    /// being passed.
    #[inline]
    pub fn pawn_blockers(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_blockers[color.index()][sq.index()]
    }

    /// Squares strictly between `a` and `b`; empty unless they share a
    /// rank, file or diagonal.
    #[inline]
    pub fn between(&self, a: Square, b: Square) -> Bitboard {
        self.between[a.index()][b.index()]
    }
}

/// Index step from `from` towards `to`: ±1, ±7, ±8 or ±9 when the squares
/// are aligned, the knight offset for a knight jump, otherwise 0.
#[inline]
pub fn direction(from: Square, to: Square) -> i8 {
    let (f, t) = (from.index() as i32, to.index() as i32);
    tables::DIRECTION[(t + (t | 7) - f - (f | 7) + 0x77) as usize]
}

/// Chebyshev (king-move) distance.
#[inline]
pub fn distance(a: Square, b: Square) -> i32 {
    let dx = (a.file() as i32 - b.file() as i32).abs();
    let dy = (a.rank() as i32 - b.rank() as i32).abs();
    dx.max(dy)
}

#[cfg(test)]
mod tests {
    use super::magic::ray_attacks;
    use super::*;

    fn tables() -> AttackTables {
        AttackTables::new().expect("fixed magics are valid")
    }

    #[test]
    fn leaper_counts() {
        let t = tables();
        assert_eq!(t.knight(Square::E4).count(), 8);
        assert_eq!(t.knight(Square::A1).count(), 2);
        assert_eq!(t.king(Square::E1).count(), 5);
        assert_eq!(t.king(Square::H8).count(), 3);
    }

    #[test]
    fn pawn_attacks_do_not_wrap() {
        let t = tables();
        assert_eq!(t.pawn(Color::White, Square::A4), Square::B5.bitboard());
        assert_eq!(t.pawn(Color::Black, Square::E5).count(), 2);
        assert!(t.pawn(Color::Black, Square::E5).contains(Square::D4));
    }

    #[test]
    fn blocker_masks() {
        let t = tables();
        let m = t.pawn_blockers(Color::White, Square::E4);
        assert_eq!(m.count(), 12);
        assert!(m.contains(Square::D5) && m.contains(Square::F8));
        assert!(!m.contains(Square::E4));
        assert_eq!(t.pawn_blockers(Color::Black, Square::A2).count(), 2);
    }

    #[test]
    fn rook_sees_blocker_but_not_beyond() {
        let t = tables();
        let atk = t.rook(Square::E4, Square::E6.bitboard());
        assert!(atk.contains(Square::E5));
        assert!(atk.contains(Square::E6));
        assert!(!atk.contains(Square::E7));
        for sq in Square::all() {
            assert_eq!(t.rook(sq, Bitboard::EMPTY).count(), 14, "rook on {sq}");
        }
        assert_eq!(t.bishop(Square::D4, Bitboard::EMPTY).count(), 13);
    }

    #[test]
    fn sliders_match_ray_walk() {
        let t = tables();
        let mut rng: u64 = 0x9E37_79B9_7F4A_7C15;
        for sq in Square::all() {
            for _ in 0..64 {
                rng = rng
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let occ = Bitboard::new(rng & (rng >> 7));
                assert_eq!(
                    t.rook(sq, occ).inner(),
                    ray_attacks(sq.index(), occ.inner(), &ROOK_DIRS, false),
                    "rook mismatch on {sq} with {:016x}",
                    occ.inner()
                );
                assert_eq!(
                    t.bishop(sq, occ).inner(),
                    ray_attacks(sq.index(), occ.inner(), &BISHOP_DIRS, false),
                    "bishop mismatch on {sq} with {:016x}",
                    occ.inner()
                );
            }
        }
    }

    #[test]
    fn between_segments() {
        let t = tables();
        assert_eq!(t.between(Square::E1, Square::E4).count(), 2);
        assert_eq!(t.between(Square::A1, Square::H8).count(), 6);
        assert!(t.between(Square::A1, Square::B3).is_empty());
        assert!(t.between(Square::E4, Square::E5).is_empty());
    }

    #[test]
    fn directions() {
        assert_eq!(direction(Square::E1, Square::E8), 8);
        assert_eq!(direction(Square::E8, Square::E1), -8);
        assert_eq!(direction(Square::A1, Square::H8), 9);
        assert_eq!(direction(Square::H1, Square::A8), 7);
        assert_eq!(direction(Square::A1, Square::H1), 1);
        assert_eq!(direction(Square::G1, Square::F3), 15);
        assert_eq!(direction(Square::A1, Square::C4), 0);
    }

    #[test]
    fn distances() {
        assert_eq!(distance(Square::A1, Square::H8), 7);
        assert_eq!(distance(Square::E4, Square::F6), 2);
        assert_eq!(distance(Square::E4, Square::E4), 0);
    }
}
