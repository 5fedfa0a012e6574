//! Mutable board state with incremental hashing and material bookkeeping.

use std::fmt;
use std::sync::Arc;

use crate::attacks::AttackTables;
use crate::bitboard::Bitboard;
use crate::castle_rights::CastleRights;
use crate::chess_move::Move;
use crate::color::Color;
use crate::error::PositionError;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;
use crate::tables::Tables;

/// State needed to take back a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UndoInfo {
    pub captured: Option<Piece>,
    pub castle_rights: CastleRights,
    pub ep_square: Option<Square>,
    pub half_move_clock: u32,
}

/// A chess position.
///
/// The square array and the bitboards always describe the same board. The
/// full hash covers pieces, side to move, castling rights and the en
/// passant square; the pawn hash covers pawns only. Material sums exclude
/// the kings.
#[derive(Clone)]
pub struct Position {
    tables: Arc<Tables>,
    squares: [Option<Piece>; 64],
    pieces: [Bitboard; Piece::COUNT],
    sides: [Bitboard; Color::COUNT],
    side_to_move: Color,
    castle_rights: CastleRights,
    ep_square: Option<Square>,
    half_move_clock: u32,
    full_move_number: u32,
    king_sq: [Square; Color::COUNT],
    material: [i32; Color::COUNT],
    pawn_material: [i32; Color::COUNT],
    hash: u64,
    pawn_hash: u64,
}

impl Position {
    /// An empty board with White to move.
    pub fn empty(tables: Arc<Tables>) -> Position {
        Position {
            tables,
            squares: [None; 64],
            pieces: [Bitboard::EMPTY; Piece::COUNT],
            sides: [Bitboard::EMPTY; Color::COUNT],
            side_to_move: Color::White,
            castle_rights: CastleRights::NONE,
            ep_square: None,
            half_move_clock: 0,
            full_move_number: 1,
            king_sq: [Square::E1, Square::E8],
            material: [0; Color::COUNT],
            pawn_material: [0; Color::COUNT],
            hash: 0,
            pawn_hash: 0,
        }
    }

    #[inline]
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    #[inline]
    pub fn attacks(&self) -> &AttackTables {
        &self.tables.attacks
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn pieces(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn pieces_of(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.pieces[Piece::new(kind, color).index()]
    }

    /// Pieces of `kind` for both colours.
    #[inline]
    pub fn kind(&self, kind: PieceKind) -> Bitboard {
        self.pieces_of(kind, Color::White) | self.pieces_of(kind, Color::Black)
    }

    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0] | self.sides[1]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn white_to_move(&self) -> bool {
        self.side_to_move.is_white()
    }

    #[inline]
    pub fn castle_rights(&self) -> CastleRights {
        self.castle_rights
    }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    #[inline]
    pub fn full_move_number(&self) -> u32 {
        self.full_move_number
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_sq[color.index()]
    }

    /// Value of all non-king material of `color`.
    #[inline]
    pub fn material(&self, color: Color) -> i32 {
        self.material[color.index()]
    }

    /// Value of the pawns of `color`.
    #[inline]
    pub fn pawn_material(&self, color: Color) -> i32 {
        self.pawn_material[color.index()]
    }

    /// Value of the knights, bishops, rooks and queens of `color`.
    #[inline]
    pub fn piece_material(&self, color: Color) -> i32 {
        self.material[color.index()] - self.pawn_material[color.index()]
    }

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn pawn_zobrist_hash(&self) -> u64 {
        self.pawn_hash
    }

    /// Hash of the two king placements.
    #[inline]
    pub fn king_zobrist_hash(&self) -> u64 {
        let z = &self.tables.zobrist;
        z.piece_square(Piece::WHITE_KING, self.king_sq[0]) ^ z.piece_square(Piece::BLACK_KING, self.king_sq[1])
    }

    /// The hash used for the transposition table at the root. It differs
    /// from [`Position::zobrist_hash`] once the 50-move counter reaches 80,
    /// so nearly-drawn positions do not share entries with fresh ones.
    #[inline]
    pub fn history_hash(&self) -> u64 {
        if self.half_move_clock >= 80 {
            self.hash ^ self.tables.zobrist.move_count(self.half_move_clock)
        } else {
            self.hash
        }
    }

    /// Compare the parts of the position that matter for repetition.
    pub fn draw_rule_eq(&self, other: &Position) -> bool {
        self.squares == other.squares
            && self.side_to_move == other.side_to_move
            && self.castle_rights == other.castle_rights
            && self.ep_square == other.ep_square
    }

    /// Put `piece` on `sq`, replacing whatever stood there.
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        let z = &self.tables.zobrist;
        let mask = sq.bitboard();
        if let Some(old) = self.squares[sq.index()] {
            let color = old.color().index();
            self.hash ^= z.piece_square(old, sq);
            self.pieces[old.index()] &= !mask;
            self.sides[color] &= !mask;
            match old.kind() {
                PieceKind::King => {}
                PieceKind::Pawn => {
                    self.material[color] -= old.value();
                    self.pawn_material[color] -= old.value();
                    self.pawn_hash ^= z.piece_square(old, sq);
                }
                _ => self.material[color] -= old.value(),
            }
        }
        if let Some(new) = piece {
            let color = new.color().index();
            self.hash ^= z.piece_square(new, sq);
            self.pieces[new.index()] |= mask;
            self.sides[color] |= mask;
            match new.kind() {
                PieceKind::King => self.king_sq[color] = sq,
                PieceKind::Pawn => {
                    self.material[color] += new.value();
                    self.pawn_material[color] += new.value();
                    self.pawn_hash ^= z.piece_square(new, sq);
                }
                _ => self.material[color] += new.value(),
            }
        }
        self.squares[sq.index()] = piece;
    }

    /// Move a non-pawn piece to an empty square.
    fn move_piece(&mut self, from: Square, to: Square) {
        let Some(piece) = self.squares[from.index()] else {
            return;
        };
        let z = &self.tables.zobrist;
        self.hash ^= z.piece_square(piece, from) ^ z.piece_square(piece, to);
        let delta = from.bitboard() | to.bitboard();
        self.pieces[piece.index()] ^= delta;
        self.sides[piece.color().index()] ^= delta;
        if piece.kind() == PieceKind::King {
            self.king_sq[piece.color().index()] = to;
        }
        self.squares[from.index()] = None;
        self.squares[to.index()] = Some(piece);
    }

    pub fn set_side_to_move(&mut self, side: Color) {
        if side != self.side_to_move {
            let z = &self.tables.zobrist;
            self.hash ^= z.side(Color::Black);
            self.side_to_move = side;
        }
    }

    pub fn set_castle_rights(&mut self, rights: CastleRights) {
        let z = &self.tables.zobrist;
        self.hash ^= z.castling(self.castle_rights) ^ z.castling(rights);
        self.castle_rights = rights;
    }

    pub fn set_ep_square(&mut self, ep: Option<Square>) {
        if ep != self.ep_square {
            let z = &self.tables.zobrist;
            self.hash ^= z.en_passant(self.ep_square) ^ z.en_passant(ep);
            self.ep_square = ep;
        }
    }

    pub fn set_half_move_clock(&mut self, clock: u32) {
        self.half_move_clock = clock;
    }

    pub fn set_full_move_number(&mut self, number: u32) {
        self.full_move_number = number;
    }

    /// Play a pseudo-legal move. The source square must hold a piece of
    /// the side to move; otherwise the position is left untouched.
    pub fn make_move(&mut self, m: Move) -> UndoInfo {
        let (from, to) = (m.from(), m.to());
        let undo = UndoInfo {
            captured: self.squares[to.index()],
            castle_rights: self.castle_rights,
            ep_square: self.ep_square,
            half_move_clock: self.half_move_clock,
        };
        let Some(moved) = self.squares[from.index()] else {
            debug_assert!(false, "make_move from empty square {from}");
            return undo;
        };
        let us = self.side_to_move;
        let prev_ep = self.ep_square;
        self.set_ep_square(None);

        if undo.captured.is_some() || moved.kind() == PieceKind::Pawn {
            self.half_move_clock = 0;
            if moved.kind() == PieceKind::Pawn {
                let fwd = us.forward();
                if to.index() as i8 - from.index() as i8 == 2 * fwd {
                    let beside = to.bitboard();
                    let beside = ((beside << 1) & Bitboard::NOT_FILE_A) | ((beside >> 1) & Bitboard::NOT_FILE_H);
                    if (beside & self.pieces_of(PieceKind::Pawn, !us)).is_nonempty() {
                        self.set_ep_square(Some(from.offset(fwd)));
                    }
                } else if Some(to) == prev_ep {
                    self.set_piece(to.offset(-fwd), None);
                }
            }
            if moved.kind() == PieceKind::King {
                self.set_castle_rights(self.castle_rights.remove(CastleRights::both(us)));
            }
            self.set_piece(from, None);
            let placed = match m.promotion() {
                Some(kind) => Piece::new(kind, us),
                None => moved,
            };
            self.set_piece(to, Some(placed));
        } else {
            self.half_move_clock += 1;
            if moved.kind() == PieceKind::King {
                if to.index() == from.index() + 2 {
                    self.move_piece(from.offset(3), from.offset(1));
                } else if to.index() + 2 == from.index() {
                    self.move_piece(from.offset(-4), from.offset(-1));
                }
                self.set_castle_rights(self.castle_rights.remove(CastleRights::both(us)));
            }
            self.move_piece(from, to);
        }

        let corners = CastleRights::for_corner(from).insert(CastleRights::for_corner(to));
        if !corners.is_empty() {
            self.set_castle_rights(self.castle_rights.remove(corners));
        }
        if us == Color::Black {
            self.full_move_number += 1;
        }
        self.set_side_to_move(!us);
        undo
    }

    /// Take back `m`, which must be the last move made.
    pub fn unmake_move(&mut self, m: Move, undo: &UndoInfo) {
        let (from, to) = (m.from(), m.to());
        let Some(mut moved) = self.squares[to.index()] else {
            return;
        };
        let us = !self.side_to_move;
        self.set_side_to_move(us);
        self.set_piece(from, Some(moved));
        self.set_piece(to, undo.captured);
        self.set_castle_rights(undo.castle_rights);
        self.set_ep_square(undo.ep_square);
        self.half_move_clock = undo.half_move_clock;
        if m.is_promotion() {
            moved = Piece::new(PieceKind::Pawn, us);
            self.set_piece(from, Some(moved));
        }
        if us == Color::Black {
            self.full_move_number -= 1;
        }
        match moved.kind() {
            PieceKind::King => {
                if to.index() == from.index() + 2 {
                    self.move_piece(from.offset(1), from.offset(3));
                } else if to.index() + 2 == from.index() {
                    self.move_piece(from.offset(-1), from.offset(-4));
                }
            }
            PieceKind::Pawn if Some(to) == self.ep_square => {
                self.set_piece(to.offset(-us.forward()), Some(Piece::new(PieceKind::Pawn, !us)));
            }
            _ => {}
        }
    }

    /// Update only the board arrays; used by exchange evaluation.
    fn set_see_piece(&mut self, sq: Square, piece: Option<Piece>) {
        let mask = sq.bitboard();
        if let Some(old) = self.squares[sq.index()] {
            self.pieces[old.index()] &= !mask;
            self.sides[old.color().index()] &= !mask;
        }
        if let Some(new) = piece {
            self.pieces[new.index()] |= mask;
            self.sides[new.color().index()] |= mask;
        }
        self.squares[sq.index()] = piece;
    }

    /// Play a capture on the board arrays and flip the side to move,
    /// leaving hashes, material, castling and king squares stale. Only
    /// exchange evaluation may use this, paired with
    /// [`Position::unmake_see_move`].
    pub fn make_see_move(&mut self, m: Move) -> UndoInfo {
        let (from, to) = (m.from(), m.to());
        let undo = UndoInfo { captured: self.squares[to.index()], ..UndoInfo::default() };
        let moved = self.squares[from.index()];
        if let Some(p) = moved
            && p.kind() == PieceKind::Pawn
            && Some(to) == self.ep_square
        {
            self.set_see_piece(to.offset(-p.color().forward()), None);
        }
        self.set_see_piece(from, None);
        self.set_see_piece(to, moved);
        self.side_to_move = !self.side_to_move;
        undo
    }

    pub fn unmake_see_move(&mut self, m: Move, undo: &UndoInfo) {
        let (from, to) = (m.from(), m.to());
        self.side_to_move = !self.side_to_move;
        let moved = self.squares[to.index()];
        self.set_see_piece(from, moved);
        self.set_see_piece(to, undo.captured);
        if let Some(p) = moved
            && p.kind() == PieceKind::Pawn
            && Some(to) == self.ep_square
        {
            self.set_see_piece(to.offset(-p.color().forward()), Some(Piece::new(PieceKind::Pawn, !p.color())));
        }
    }

    /// Return `true` if `sq` is attacked by any piece of `by`.
    pub fn is_attacked_by(&self, sq: Square, by: Color) -> bool {
        let atk = self.attacks();
        let them = |kind| self.pieces_of(kind, by);
        if (atk.knight(sq) & them(PieceKind::Knight)).is_nonempty()
            || (atk.king(sq) & them(PieceKind::King)).is_nonempty()
            || (atk.pawn(!by, sq) & them(PieceKind::Pawn)).is_nonempty()
        {
            return true;
        }
        let occ = self.occupied();
        let queens = them(PieceKind::Queen);
        (atk.bishop(sq, occ) & (them(PieceKind::Bishop) | queens)).is_nonempty()
            || (atk.rook(sq, occ) & (them(PieceKind::Rook) | queens)).is_nonempty()
    }

    /// Return `true` if the opponent of the side to move attacks `sq`.
    #[inline]
    pub fn sq_attacked(&self, sq: Square) -> bool {
        self.is_attacked_by(sq, !self.side_to_move)
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.sq_attacked(self.king_square(self.side_to_move))
    }

    /// Return `true` if the side to move could capture the enemy king,
    /// i.e. the previous move was illegal.
    #[inline]
    pub fn can_take_king(&self) -> bool {
        let them = !self.side_to_move;
        self.is_attacked_by(self.king_square(them), self.side_to_move)
    }

    /// Recompute the full hash from scratch.
    pub fn compute_zobrist_hash(&self) -> u64 {
        let z = &self.tables.zobrist;
        let mut hash = Square::all()
            .filter_map(|sq| self.piece_at(sq).map(|p| z.piece_square(p, sq)))
            .fold(0, |h, k| h ^ k);
        hash ^= z.side(self.side_to_move);
        hash ^= z.castling(self.castle_rights);
        hash ^ z.en_passant(self.ep_square)
    }

    /// Recompute the pawn hash from scratch.
    pub fn compute_pawn_hash(&self) -> u64 {
        let z = &self.tables.zobrist;
        [Piece::WHITE_PAWN, Piece::BLACK_PAWN]
            .iter()
            .flat_map(|&p| self.pieces(p).map(move |sq| z.piece_square(p, sq)))
            .fold(0, |h, k| h ^ k)
    }

    /// Check the structural rules a searchable position must satisfy.
    pub fn validate(&self) -> Result<(), PositionError> {
        for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
            let count = self.pieces_of(PieceKind::King, color).count();
            if count != 1 {
                return Err(PositionError::InvalidKingCount { color: name, count });
            }
        }
        if (self.kind(PieceKind::Pawn) & Bitboard::BACK_RANKS).is_nonempty() {
            return Err(PositionError::PawnsOnBackRank);
        }
        if self.can_take_king() {
            return Err(PositionError::OpponentInCheck);
        }
        Ok(())
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Position) -> bool {
        self.draw_rule_eq(other)
            && self.half_move_clock == other.half_move_clock
            && self.full_move_number == other.full_move_number
            && self.hash == other.hash
            && self.pawn_hash == other.pawn_hash
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = self.piece_at(Square::from_coords(file, rank)).map_or('.', |p| p.fen_char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Position;
    use crate::chess_move::Move;
    use crate::color::Color;
    use crate::piece::Piece;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;
    use crate::tables::Tables;

    fn tables() -> Arc<Tables> {
        Tables::shared().expect("tables")
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen, tables()).expect("valid fen")
    }

    fn mv(from: Square, to: Square) -> Move {
        Move::new(from, to, None)
    }

    #[test]
    fn set_piece_tracks_material_and_hashes() {
        let mut p = Position::empty(tables());
        p.set_piece(Square::E1, Some(Piece::WHITE_KING));
        p.set_piece(Square::E8, Some(Piece::BLACK_KING));
        p.set_piece(Square::D4, Some(Piece::WHITE_PAWN));
        p.set_piece(Square::D5, Some(Piece::BLACK_ROOK));
        assert_eq!(p.material(Color::White), PieceKind::Pawn.value());
        assert_eq!(p.pawn_material(Color::White), PieceKind::Pawn.value());
        assert_eq!(p.material(Color::Black), PieceKind::Rook.value());
        assert_eq!(p.king_square(Color::Black), Square::E8);
        p.set_piece(Square::D5, Some(Piece::WHITE_QUEEN));
        assert_eq!(p.material(Color::Black), 0);
        assert_eq!(p.zobrist_hash(), p.compute_zobrist_hash());
        assert_eq!(p.pawn_zobrist_hash(), p.compute_pawn_hash());
    }

    #[test]
    fn double_push_sets_ep_only_next_to_enemy_pawn() {
        let mut p = pos("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        p.make_move(mv(Square::E2, Square::E4));
        assert_eq!(p.ep_square(), None);

        let mut p = pos("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1");
        p.make_move(mv(Square::E2, Square::E4));
        assert_eq!(p.ep_square(), Some(Square::E3));
        assert_eq!(p.zobrist_hash(), p.compute_zobrist_hash());
    }

    #[test]
    fn en_passant_capture_round_trip() {
        let mut p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let before = p.clone();
        let m = mv(Square::E5, Square::D6);
        let undo = p.make_move(m);
        assert_eq!(p.piece_at(Square::D5), None);
        assert_eq!(p.piece_at(Square::D6), Some(Piece::WHITE_PAWN));
        assert_eq!(p.material(Color::Black), 0);
        p.unmake_move(m, &undo);
        assert_eq!(p, before);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let before = p.clone();
        let m = mv(Square::E1, Square::G1);
        let undo = p.make_move(m);
        assert_eq!(p.piece_at(Square::F1), Some(Piece::WHITE_ROOK));
        assert_eq!(p.piece_at(Square::H1), None);
        assert_eq!(p.castle_rights().to_fen(), "kq");
        assert_eq!(p.zobrist_hash(), p.compute_zobrist_hash());
        p.unmake_move(m, &undo);
        assert_eq!(p, before);
    }

    #[test]
    fn rook_capture_on_corner_removes_right() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        p.make_move(mv(Square::A1, Square::A8));
        assert_eq!(p.castle_rights().to_fen(), "Kk");
    }

    #[test]
    fn promotion_round_trip() {
        let mut p = pos("3r2k1/4P3/8/8/8/8/8/4K3 w - - 3 40");
        let before = p.clone();
        let m = Move::new(Square::E7, Square::D8, Some(PieceKind::Knight));
        let undo = p.make_move(m);
        assert_eq!(p.piece_at(Square::D8), Some(Piece::WHITE_KNIGHT));
        assert_eq!(p.half_move_clock(), 0);
        assert_eq!(p.pawn_material(Color::White), 0);
        assert_eq!(p.material(Color::White), PieceKind::Knight.value());
        p.unmake_move(m, &undo);
        assert_eq!(p, before);
    }

    #[test]
    fn see_move_restores_board() {
        let mut p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let before = p.clone();
        let m = mv(Square::E5, Square::D6);
        let undo = p.make_see_move(m);
        assert_eq!(p.piece_at(Square::D5), None);
        assert_eq!(p.side_to_move(), Color::Black);
        p.unmake_see_move(m, &undo);
        assert_eq!(p, before);
    }

    #[test]
    fn history_hash_changes_near_fifty_moves() {
        let mut p = pos("4k3/8/8/8/8/8/8/4K2R w - - 0 1");
        assert_eq!(p.history_hash(), p.zobrist_hash());
        p.set_half_move_clock(85);
        assert_ne!(p.history_hash(), p.zobrist_hash());
    }

    #[test]
    fn attack_queries() {
        let p = pos("4k3/8/8/8/8/3n4/8/4K3 w - - 0 1");
        assert!(p.in_check());
        assert!(!p.can_take_king());
        assert!(p.is_attacked_by(Square::F2, Color::Black));
        assert!(!p.is_attacked_by(Square::E2, Color::Black));
    }
}
