//! FEN import and export for [`Position`].

use std::sync::Arc;

use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::movegen;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;
use crate::tables::Tables;

/// The FEN string for the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// The standard starting position.
    pub fn start(tables: Arc<Tables>) -> Position {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut pos = Position::empty(tables);
        for (file, kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            pos.set_piece(Square::from_coords(file, 0), Some(Piece::new(*kind, Color::White)));
            pos.set_piece(Square::from_coords(file, 1), Some(Piece::WHITE_PAWN));
            pos.set_piece(Square::from_coords(file, 6), Some(Piece::BLACK_PAWN));
            pos.set_piece(Square::from_coords(file, 7), Some(Piece::new(*kind, Color::Black)));
        }
        pos.set_castle_rights(CastleRights::ALL);
        pos
    }

    /// Parse a FEN string. The move counters may be omitted. An en passant
    /// square is kept only when a legal en passant capture exists, so that
    /// equal positions hash equally regardless of how they were reached.
    pub fn from_fen(fen: &str, tables: Arc<Tables>) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::WrongFieldCount { found: fields.len() });
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }

        let mut pos = Position::empty(tables);
        for (rank_index, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_index as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    if !(1..=8).contains(&run) {
                        return Err(FenError::InvalidPieceChar { character: c });
                    }
                    file += run as u8;
                } else {
                    let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidPieceChar { character: c })?;
                    if file >= 8 {
                        return Err(FenError::BadRankLength { rank_index, length: file as usize + 1 });
                    }
                    pos.set_piece(Square::from_coords(file, rank), Some(piece));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankLength { rank_index, length: file as usize });
            }
        }

        let side = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidColor { found: other.to_string() }),
        };
        pos.set_side_to_move(side);
        pos.set_castle_rights(CastleRights::from_fen(fields[2])?);

        let ep = match fields[3] {
            "-" => None,
            text => Some(
                Square::from_algebraic(text).ok_or_else(|| FenError::InvalidEnPassant { found: text.to_string() })?,
            ),
        };

        let counter = |idx: usize, field: &'static str, default: u32| -> Result<u32, FenError> {
            fields.get(idx).map_or(Ok(default), |text| {
                text.parse().map_err(|_| FenError::InvalidMoveCounter { field, found: text.to_string() })
            })
        };
        pos.set_half_move_clock(counter(4, "halfmove clock", 0)?);
        pos.set_full_move_number(counter(5, "fullmove number", 1)?.max(1));

        pos.validate()?;

        if let Some(ep) = ep {
            pos.set_ep_square(Some(ep));
            let pawn = Piece::new(PieceKind::Pawn, side);
            let usable = movegen::legal_moves(&mut pos)
                .iter()
                .any(|m| m.to() == ep && pos.piece_at(m.from()) == Some(pawn));
            if !usable {
                pos.set_ep_square(None);
            }
        }
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(p) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(p.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        let ep = self.ep_square().map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{fen} {} {} {ep} {} {}",
            self.side_to_move(),
            self.castle_rights(),
            self.half_move_clock(),
            self.full_move_number()
        )
    }
}
