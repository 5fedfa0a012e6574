//! Zobrist hashing keys.

use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::piece::Piece;
use crate::square::Square;

const SEED: u64 = 0x3C6E_F372_FE94_F82B;

#[inline]
const fn xorshift64(mut state: u64) -> u64 {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    state
}

/// Random keys for every hashed position feature.
#[derive(Debug, Clone)]
pub struct ZobristKeys {
    piece_square: [[u64; 64]; Piece::COUNT],
    black_to_move: u64,
    castling: [u64; 16],
    /// Index 0 means no en passant square, 1..=8 the ep file plus one.
    en_passant: [u64; 9],
    /// Indexed by `min(half_move_clock, 100)`.
    move_count: [u64; 101],
}

impl ZobristKeys {
    pub fn new() -> ZobristKeys {
        let mut state = SEED;
        let mut next = move || {
            state = xorshift64(state);
            state
        };
        let mut piece_square = [[0u64; 64]; Piece::COUNT];
        for row in piece_square.iter_mut() {
            row.iter_mut().for_each(|k| *k = next());
        }
        let black_to_move = next();
        let castling = std::array::from_fn(|_| next());
        let en_passant = std::array::from_fn(|_| next());
        let move_count = std::array::from_fn(|_| next());
        ZobristKeys { piece_square, black_to_move, castling, en_passant, move_count }
    }

    #[inline]
    pub fn piece_square(&self, piece: Piece, sq: Square) -> u64 {
        self.piece_square[piece.index()][sq.index()]
    }

    #[inline]
    pub fn side(&self, side: Color) -> u64 {
        match side {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    #[inline]
    pub fn castling(&self, rights: CastleRights) -> u64 {
        self.castling[rights.bits() as usize]
    }

    #[inline]
    pub fn en_passant(&self, ep: Option<Square>) -> u64 {
        self.en_passant[ep.map_or(0, |sq| sq.file() as usize + 1)]
    }

    /// Key mixed into the history hash once the 50-move counter gets close
    /// to a claimable draw.
    #[inline]
    pub fn move_count(&self, half_move_clock: u32) -> u64 {
        self.move_count[half_move_clock.min(100) as usize]
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}
