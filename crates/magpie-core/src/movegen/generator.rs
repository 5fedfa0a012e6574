//! The four pseudo-legal generators sharing one move sink.

use std::ops::ControlFlow;

use crate::bitboard::Bitboard;
use crate::castle_rights::CastleSide;
use crate::chess_move::Move;
use crate::color::Color;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;

use super::MoveList;
use super::pawns::PawnGeometry;

/// `Break` means the enemy king can be captured and the list holds only
/// that capture.
type Flow = ControlFlow<()>;

pub(super) struct Generator<'a> {
    pos: &'a Position,
    list: &'a mut MoveList,
    us: Color,
    own: Bitboard,
    enemy: Bitboard,
    occupied: Bitboard,
    enemy_king: Bitboard,
    pawn: PawnGeometry,
}

impl<'a> Generator<'a> {
    pub fn new(pos: &'a Position, list: &'a mut MoveList) -> Generator<'a> {
        let us = pos.side_to_move();
        Generator {
            pos,
            list,
            us,
            own: pos.side(us),
            enemy: pos.side(!us),
            occupied: pos.occupied(),
            enemy_king: pos.pieces_of(PieceKind::King, !us),
            pawn: PawnGeometry::of(us),
        }
    }

    fn push(&mut self, from: Square, to: Square, promotion: Option<PieceKind>) {
        self.list.push(Move::new(from, to, promotion));
    }

    /// Add a move from `from` to every square in `targets`.
    fn add_moves(&mut self, from: Square, targets: Bitboard) -> Flow {
        if let Some(king) = (targets & self.enemy_king).lsb() {
            self.list.clear();
            self.push(from, king, None);
            return ControlFlow::Break(());
        }
        for to in targets {
            self.push(from, to, None);
        }
        ControlFlow::Continue(())
    }

    /// Add a pawn move to every square in `targets`, each coming from
    /// `to - delta`. Promotions produce queen and knight, plus rook and
    /// bishop when `all_promotions` is set.
    fn add_pawn_moves(&mut self, targets: Bitboard, delta: i8, all_promotions: bool) -> Flow {
        if targets.is_empty() {
            return ControlFlow::Continue(());
        }
        if let Some(king) = (targets & self.enemy_king).lsb() {
            self.list.clear();
            self.push(king.offset(-delta), king, None);
            return ControlFlow::Break(());
        }
        let promotions = targets & Bitboard::BACK_RANKS;
        for to in promotions {
            let from = to.offset(-delta);
            self.push(from, to, Some(PieceKind::Queen));
            self.push(from, to, Some(PieceKind::Knight));
            if all_promotions {
                self.push(from, to, Some(PieceKind::Rook));
                self.push(from, to, Some(PieceKind::Bishop));
            }
        }
        for to in targets & !promotions {
            self.push(to.offset(-delta), to, None);
        }
        ControlFlow::Continue(())
    }

    fn add_double_pushes(&mut self, targets: Bitboard) {
        let delta = 2 * self.pawn.push;
        for to in targets {
            self.push(to.offset(-delta), to, None);
        }
    }

    /// Call `add_moves` for every piece of `kind` with the targets computed
    /// by `targets`.
    fn piece_moves(&mut self, kind: PieceKind, targets: impl Fn(Square) -> Bitboard) -> Flow {
        for from in self.pos.pieces_of(kind, self.us) {
            self.add_moves(from, targets(from))?;
        }
        ControlFlow::Continue(())
    }

    fn ep_mask(&self) -> Bitboard {
        self.pos.ep_square().map_or(Bitboard::EMPTY, Square::bitboard)
    }

    fn castling(&mut self) {
        let pos = self.pos;
        let us = self.us;
        let home = if us.is_white() { Square::E1 } else { Square::E8 };
        if pos.king_square(us) != home {
            return;
        }
        let rank_shift = if us.is_white() { 0 } else { 56 };
        let rook = Some(Piece::new(PieceKind::Rook, us));
        let rights = pos.castle_rights();
        if rights.has(us, CastleSide::KingSide)
            && (self.occupied & (Bitboard::new(0x60) << rank_shift)).is_empty()
            && pos.piece_at(home.offset(3)) == rook
            && !pos.sq_attacked(home)
            && !pos.sq_attacked(home.offset(1))
        {
            self.push(home, home.offset(2), None);
        }
        if rights.has(us, CastleSide::QueenSide)
            && (self.occupied & (Bitboard::new(0x0E) << rank_shift)).is_empty()
            && pos.piece_at(home.offset(-4)) == rook
            && !pos.sq_attacked(home)
            && !pos.sq_attacked(home.offset(-1))
        {
            self.push(home, home.offset(-2), None);
        }
    }

    pub fn all_moves(&mut self) -> Flow {
        let pos = self.pos;
        let atk = pos.attacks();
        let (occ, not_own) = (self.occupied, !self.own);
        self.piece_moves(PieceKind::Queen, |sq| atk.queen(sq, occ) & not_own)?;
        self.piece_moves(PieceKind::Rook, |sq| atk.rook(sq, occ) & not_own)?;
        self.piece_moves(PieceKind::Bishop, |sq| atk.bishop(sq, occ) & not_own)?;
        let king_sq = pos.king_square(self.us);
        self.add_moves(king_sq, atk.king(king_sq) & not_own)?;
        self.castling();
        self.piece_moves(PieceKind::Knight, |sq| atk.knight(sq) & not_own)?;

        let pawns = pos.pieces_of(PieceKind::Pawn, self.us);
        let push = self.pawn.pushes(pawns, !occ);
        self.add_pawn_moves(push, self.pawn.push, true)?;
        let double = self.pawn.pushes(push & self.pawn.double_rank, !occ);
        self.add_double_pushes(double);
        let targets = self.enemy | self.ep_mask();
        let west = self.pawn.west_captures(pawns, targets);
        self.add_pawn_moves(west, self.pawn.west, true)?;
        let east = self.pawn.east_captures(pawns, targets);
        self.add_pawn_moves(east, self.pawn.east, true)
    }

    pub fn evasions(&mut self) -> Flow {
        let pos = self.pos;
        let atk = pos.attacks();
        let them = !self.us;
        let king_sq = pos.king_square(self.us);
        let occ = self.occupied;
        let checkers = super::attackers_of(pos, king_sq, them) & !pos.pieces_of(PieceKind::King, them);

        let mut valid = Bitboard::EMPTY;
        if checkers.count() == 1
            && let Some(checker) = checkers.lsb()
        {
            valid = checkers | atk.between(king_sq, checker);
        }
        valid |= self.enemy_king;
        let targets = !self.own & valid;

        self.piece_moves(PieceKind::Queen, |sq| atk.queen(sq, occ) & targets)?;
        self.piece_moves(PieceKind::Rook, |sq| atk.rook(sq, occ) & targets)?;
        self.piece_moves(PieceKind::Bishop, |sq| atk.bishop(sq, occ) & targets)?;
        self.add_moves(king_sq, atk.king(king_sq) & !self.own)?;
        self.piece_moves(PieceKind::Knight, |sq| atk.knight(sq) & targets)?;

        let pawns = pos.pieces_of(PieceKind::Pawn, self.us);
        let push = self.pawn.pushes(pawns, !occ);
        self.add_pawn_moves(push & valid, self.pawn.push, true)?;
        let double = self.pawn.pushes(push & self.pawn.double_rank, !occ);
        self.add_double_pushes(double & valid);
        let capture_targets = (self.enemy & valid) | self.ep_mask();
        let west = self.pawn.west_captures(pawns, capture_targets);
        self.add_pawn_moves(west, self.pawn.west, true)?;
        let east = self.pawn.east_captures(pawns, capture_targets);
        self.add_pawn_moves(east, self.pawn.east, true)
    }

    pub fn captures_and_checks(&mut self) -> Flow {
        let pos = self.pos;
        let atk = pos.attacks();
        let them = !self.us;
        let enemy_king_sq = pos.king_square(them);
        let occ = self.occupied;
        let (own, enemy) = (self.own, self.enemy);

        // Squares from which a move could uncover a check by a slider
        // standing behind.
        let mut discovered = Bitboard::EMPTY;
        let queens = pos.pieces_of(PieceKind::Queen, self.us);
        let king_rook = atk.rook(enemy_king_sq, occ);
        if (atk.rook(enemy_king_sq, occ & !king_rook) & (queens | pos.pieces_of(PieceKind::Rook, self.us)))
            .is_nonempty()
        {
            discovered |= king_rook;
        }
        let king_bishop = atk.bishop(enemy_king_sq, occ);
        if (atk.bishop(enemy_king_sq, occ & !king_bishop) & (queens | pos.pieces_of(PieceKind::Bishop, self.us)))
            .is_nonempty()
        {
            discovered |= king_bishop;
        }
        let king_knight = atk.knight(enemy_king_sq);

        let restrict = |sq: Square, moves: Bitboard, checking: Bitboard| {
            let moves = if discovered.contains(sq) { moves } else { moves & (enemy | checking) };
            moves & !own
        };
        self.piece_moves(PieceKind::Queen, |sq| restrict(sq, atk.queen(sq, occ), king_rook | king_bishop))?;
        self.piece_moves(PieceKind::Rook, |sq| restrict(sq, atk.rook(sq, occ), king_rook))?;
        self.piece_moves(PieceKind::Bishop, |sq| restrict(sq, atk.bishop(sq, occ), king_bishop))?;

        let king_sq = pos.king_square(self.us);
        let king_targets = if discovered.contains(king_sq) { !own } else { enemy };
        self.add_moves(king_sq, atk.king(king_sq) & king_targets)?;
        self.castling();
        self.piece_moves(PieceKind::Knight, |sq| restrict(sq, atk.knight(sq), king_knight))?;

        let pawns = pos.pieces_of(PieceKind::Pawn, self.us);
        let capture_targets = enemy | self.ep_mask();
        let west = self.pawn.west_captures(pawns, capture_targets);
        self.add_pawn_moves(west, self.pawn.west, false)?;
        let east = self.pawn.east_captures(pawns, capture_targets);
        self.add_pawn_moves(east, self.pawn.east, false)?;

        // Discovered checks and promotions.
        let any_push = discovered | self.pawn.seventh;
        let push = self.pawn.pushes(pawns & any_push, !occ);
        self.add_pawn_moves(push, self.pawn.push, false)?;
        let double = self.pawn.pushes(push & self.pawn.double_rank, !occ);
        self.add_double_pushes(double);

        // Direct pawn checks.
        let checking = atk.pawn(them, enemy_king_sq);
        let push = self.pawn.pushes(pawns & !any_push, !occ);
        self.add_pawn_moves(push & checking, self.pawn.push, false)?;
        let double = self.pawn.pushes(push & self.pawn.double_rank, !occ);
        self.add_double_pushes(double & checking);
        ControlFlow::Continue(())
    }

    pub fn captures(&mut self) -> Flow {
        let pos = self.pos;
        let atk = pos.attacks();
        let (occ, enemy) = (self.occupied, self.enemy);
        self.piece_moves(PieceKind::Queen, |sq| atk.queen(sq, occ) & enemy)?;
        self.piece_moves(PieceKind::Rook, |sq| atk.rook(sq, occ) & enemy)?;
        self.piece_moves(PieceKind::Bishop, |sq| atk.bishop(sq, occ) & enemy)?;
        self.piece_moves(PieceKind::Knight, |sq| atk.knight(sq) & enemy)?;
        let king_sq = pos.king_square(self.us);
        self.add_moves(king_sq, atk.king(king_sq) & enemy)?;

        let pawns = pos.pieces_of(PieceKind::Pawn, self.us);
        let promotions = self.pawn.pushes(pawns, !occ) & self.pawn.last;
        self.add_pawn_moves(promotions, self.pawn.push, false)?;
        let targets = enemy | self.ep_mask();
        let west = self.pawn.west_captures(pawns, targets);
        self.add_pawn_moves(west, self.pawn.west, false)?;
        let east = self.pawn.east_captures(pawns, targets);
        self.add_pawn_moves(east, self.pawn.east, false)
    }
}
