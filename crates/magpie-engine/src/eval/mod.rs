//! Static evaluation.
//!
//! All terms are computed from White's point of view and summed in a fixed
//! order; [`Evaluator::eval_pos`] flips the sign for Black to move. Several
//! terms share attack information collected by earlier ones, which lives in
//! an [`EvalState`] built fresh for every call.

pub mod bitbase;
mod bishops;
mod endgame;
mod king_safety;
mod material;
mod mobility;
mod pawns;
mod pst;
mod rooks;

use std::sync::Arc;

use magpie_core::{Bitboard, Color, PieceKind, Position};

pub use bitbase::Bitbases;

use king_safety::KingSafetyCache;
use pawns::PawnCache;

pub(crate) const PAWN_VALUE: i32 = PieceKind::Pawn.value();
pub(crate) const KNIGHT_VALUE: i32 = PieceKind::Knight.value();
pub(crate) const BISHOP_VALUE: i32 = PieceKind::Bishop.value();
pub(crate) const ROOK_VALUE: i32 = PieceKind::Rook.value();
pub(crate) const QUEEN_VALUE: i32 = PieceKind::Queen.value();

/// Linear interpolation between `(x1, y1)` and `(x2, y2)`, clamped to `y1`
/// below `x1` and to `y2` above `x2`.
pub fn interpolate(x: i32, x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    if x > x2 {
        y2
    } else if x < x1 {
        y1
    } else {
        (x - x1) * (y2 - y1) / (x2 - x1) + y1
    }
}

/// Attack information shared between evaluation terms.
pub(crate) struct EvalState {
    pub white_king_zone: Bitboard,
    pub black_king_zone: Bitboard,
    /// Attacks on the squares around each king, weighted by attacker.
    pub white_king_attacks: i32,
    pub black_king_attacks: i32,
    /// Squares attacked by sliders and knights of each side.
    pub white_attacks: Bitboard,
    pub black_attacks: Bitboard,
    pub white_pawn_attacks: Bitboard,
    pub black_pawn_attacks: Bitboard,
}

impl EvalState {
    fn new(pos: &Position) -> Self {
        let attacks = pos.attacks();
        let wk = attacks.king(pos.king_square(Color::White));
        let bk = attacks.king(pos.king_square(Color::Black));
        Self {
            white_king_zone: wk | (wk << 8),
            black_king_zone: bk | (bk >> 8),
            white_king_attacks: 0,
            black_king_attacks: 0,
            white_attacks: Bitboard::EMPTY,
            black_attacks: Bitboard::EMPTY,
            white_pawn_attacks: pos.pieces_of(PieceKind::Pawn, Color::White).white_pawn_attacks(),
            black_pawn_attacks: pos.pieces_of(PieceKind::Pawn, Color::Black).black_pawn_attacks(),
        }
    }
}

/// Static evaluator with its pawn-structure and king-shelter caches.
///
/// The caches make evaluation `&mut self`; one evaluator belongs to one
/// search. The bitbases are shared.
pub struct Evaluator {
    bitbases: Arc<Bitbases>,
    pawn_cache: PawnCache,
    king_cache: KingSafetyCache,
}

impl Evaluator {
    pub fn new(bitbases: Arc<Bitbases>) -> Self {
        Self { bitbases, pawn_cache: PawnCache::new(), king_cache: KingSafetyCache::new() }
    }

    pub fn bitbases(&self) -> &Arc<Bitbases> {
        &self.bitbases
    }

    /// Evaluate `pos` in centipawns, positive when good for the side to move.
    pub fn eval_pos(&mut self, pos: &Position) -> i32 {
        let mut state = EvalState::new(pos);

        let mut score = material::material(pos);
        score += pst::piece_square_eval(pos);
        score += mobility::queens(pos, &mut state);
        score += self.pawn_cache.pawn_bonus(pos);
        score += material::trade_bonus(pos);
        score += pst::castle_bonus(pos);

        score += rooks::rook_bonus(pos);
        score += mobility::rooks(pos, &mut state);
        score += mobility::bishops(pos, &mut state);
        score += bishops::bishop_eval(pos, score);
        score += mobility::threat_bonus(pos, &mut state);
        score += self.king_cache.king_safety(pos, &state);
        score = endgame::end_game_eval(pos, score, &self.bitbases);

        if pos.white_to_move() { score } else { -score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::Tables;

    fn evaluator() -> Evaluator {
        Evaluator::new(Bitbases::builtin())
    }

    fn eval(fen: &str) -> i32 {
        let pos = Position::from_fen(fen, Tables::shared().unwrap()).unwrap();
        evaluator().eval_pos(&pos)
    }

    #[test]
    fn interpolate_clamps() {
        assert_eq!(interpolate(-5, 0, 10, 100, 20), 10);
        assert_eq!(interpolate(500, 0, 10, 100, 20), 20);
        assert_eq!(interpolate(50, 0, 10, 100, 20), 15);
    }

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(eval(magpie_core::START_FEN), 0);
    }

    #[test]
    fn mirrored_positions_score_the_same() {
        let white = eval("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
        let black = eval("rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3");
        assert_eq!(white, black);
    }

    #[test]
    fn extra_queen_is_winning() {
        let score = eval("4k3/8/8/8/8/8/3Q4/4K3 w - - 0 1");
        assert!(score > 1000, "score {score}");
        let score = eval("4k3/8/8/8/8/8/3Q4/4K3 b - - 0 1");
        assert!(score < -1000, "score {score}");
    }

    #[test]
    fn minor_piece_endings_are_drawn() {
        assert_eq!(eval("4k3/8/8/8/8/8/3N4/4K3 w - - 0 1"), 0);
        assert_eq!(eval("4k3/3b4/8/8/8/8/3N4/4K3 w - - 0 1"), 0);
    }
}
