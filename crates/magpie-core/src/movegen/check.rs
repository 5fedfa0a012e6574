//! Deciding whether a move gives check without playing it.

use crate::attacks::direction;
use crate::chess_move::Move;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::position::Position;
use crate::square::Square;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Line {
    Orthogonal,
    Diagonal,
    Knight,
    None,
}

fn line_of(delta: i8) -> Line {
    match delta {
        1 | -1 | 8 | -8 => Line::Orthogonal,
        7 | -7 | 9 | -9 => Line::Diagonal,
        0 => Line::None,
        _ => Line::Knight,
    }
}

/// File and rank steps for a queen direction.
fn steps(delta: i8) -> Option<(i8, i8)> {
    match delta {
        1 => Some((1, 0)),
        9 => Some((1, 1)),
        8 => Some((0, 1)),
        7 => Some((-1, 1)),
        -1 => Some((-1, 0)),
        -9 => Some((-1, -1)),
        -8 => Some((0, -1)),
        -7 => Some((1, -1)),
        _ => None,
    }
}

/// First piece met walking from `sq` (exclusive) in direction `delta`,
/// or `None` at the board edge.
fn next_piece(pos: &Position, sq: Square, delta: i8) -> Option<Piece> {
    let (dx, dy) = steps(delta)?;
    let (mut x, mut y) = (sq.file() as i8, sq.rank() as i8);
    loop {
        x += dx;
        y += dy;
        if !(0..8).contains(&x) || !(0..8).contains(&y) {
            return None;
        }
        if let Some(p) = pos.piece_at(Square::from_coords(x as u8, y as u8)) {
            return Some(p);
        }
    }
}

fn slides(kind: PieceKind, line: Line) -> bool {
    match line {
        Line::Orthogonal => matches!(kind, PieceKind::Rook | PieceKind::Queen),
        Line::Diagonal => matches!(kind, PieceKind::Bishop | PieceKind::Queen),
        _ => false,
    }
}

/// Return `true` if playing the pseudo-legal move `m` checks the opponent.
/// Covers direct checks, discovered checks, promotions along the line they
/// vacate, the castling rook and en passant captures that open a line.
pub fn gives_check(pos: &Position, m: Move) -> bool {
    let us = pos.side_to_move();
    let Some(mover) = pos.piece_at(m.from()) else {
        return false;
    };
    let king_sq = pos.king_square(!us);
    let enemy_king = Some(Piece::new(PieceKind::King, !us));
    let kind = m.promotion().unwrap_or(mover.kind());
    let (from, to) = (m.from(), m.to());
    let own_slider = |p: Option<Piece>, line: Line| p.is_some_and(|p| p.color() == us && slides(p.kind(), line));

    let d1 = direction(to, king_sq);
    match line_of(d1) {
        line @ (Line::Orthogonal | Line::Diagonal) => {
            if slides(kind, line) {
                if next_piece(pos, to, d1) == enemy_king {
                    return true;
                }
            } else if kind == PieceKind::Pawn
                && line == Line::Diagonal
                && (d1 > 0) == us.is_white()
                && pos.piece_at(to.offset(d1)) == enemy_king
            {
                return true;
            }
        }
        Line::Knight => {
            if kind == PieceKind::Knight {
                return true;
            }
        }
        Line::None => {}
    }

    let d2 = direction(from, king_sq);
    let d2_line = line_of(d2);
    if matches!(d2_line, Line::Orthogonal | Line::Diagonal)
        && d2 != d1
        && next_piece(pos, from, d2) == enemy_king
        && own_slider(next_piece(pos, from, -d2), d2_line)
    {
        return true;
    }

    if m.is_promotion() && d1 != 0 && d1 == d2 && slides(kind, line_of(d1)) && next_piece(pos, from, d1) == enemy_king {
        return true;
    }

    match kind {
        PieceKind::King => {
            let forward = us.forward();
            if to.index() == from.index() + 2 {
                return next_piece(pos, from, -1) == enemy_king
                    || next_piece(pos, from.offset(1), forward) == enemy_king;
            }
            if to.index() + 2 == from.index() {
                return next_piece(pos, from, 1) == enemy_king
                    || next_piece(pos, from.offset(-1), forward) == enemy_king;
            }
        }
        PieceKind::Pawn if pos.piece_at(to).is_none() && to.file() != from.file() => {
            let captured = Square::from_coords(to.file(), from.rank());
            let d3 = direction(captured, king_sq);
            match d3 {
                7 | -7 | 9 | -9 => {
                    if next_piece(pos, captured, d3) == enemy_king
                        && own_slider(next_piece(pos, captured, -d3), Line::Diagonal)
                    {
                        return true;
                    }
                }
                1 | -1 => {
                    // Both pawns leave the rank; look past the pair.
                    let (near, far) = if d3 == 1 {
                        (captured.max(from), captured.min(from))
                    } else {
                        (captured.min(from), captured.max(from))
                    };
                    if next_piece(pos, near, d3) == enemy_king
                        && own_slider(next_piece(pos, far, -d3), Line::Orthogonal)
                    {
                        return true;
                    }
                }
                _ => {}
            }
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::gives_check;
    use crate::movegen::legal_moves;
    use crate::position::Position;
    use crate::tables::Tables;

    /// Compare against playing every legal move.
    fn agrees_with_make_move(fen: &str) {
        let mut pos = Position::from_fen(fen, Tables::shared().unwrap()).unwrap();
        for m in legal_moves(&mut pos).iter().copied() {
            let predicted = gives_check(&pos, m);
            let undo = pos.make_move(m);
            let actual = pos.in_check();
            pos.unmake_move(m, &undo);
            assert_eq!(predicted, actual, "{fen}: {m}");
        }
    }

    #[test]
    fn direct_and_discovered_checks() {
        agrees_with_make_move("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        agrees_with_make_move("8/8/3k4/8/8/3B4/3R4/3K4 w - - 0 1");
        agrees_with_make_move("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        agrees_with_make_move("5k2/8/8/8/8/8/8/4K2R w K - 0 1");
    }

    #[test]
    fn promotion_checks() {
        agrees_with_make_move("k7/4P3/8/8/8/8/8/4K3 w - - 0 1");
        agrees_with_make_move("4k3/2P5/8/8/8/8/8/4K3 w - - 0 1");
        // The promoted piece checks through the square it vacates.
        agrees_with_make_move("8/2P5/8/8/8/8/8/2k1K3 w - - 0 1");
    }

    #[test]
    fn en_passant_discovery() {
        agrees_with_make_move("8/8/8/k2pP2Q/8/8/8/7K w - d6 0 2");
        agrees_with_make_move("6k1/8/8/3pP3/8/1B6/8/4K3 w - d6 0 2");
    }
}
