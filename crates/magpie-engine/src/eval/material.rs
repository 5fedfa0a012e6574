//! Material balance and the trade bonus.

use magpie_core::{Color, Position};

use super::{BISHOP_VALUE, KNIGHT_VALUE, PAWN_VALUE, QUEEN_VALUE, ROOK_VALUE, interpolate};

/// White material minus Black material, kings excluded.
pub(super) fn material(pos: &Position) -> i32 {
    pos.material(Color::White) - pos.material(Color::Black)
}

/// When ahead, trade pieces; when behind, trade pawns.
pub(super) fn trade_bonus(pos: &Position) -> i32 {
    let w_mtrl = pos.material(Color::White);
    let b_mtrl = pos.material(Color::Black);
    let w_pawns = pos.pawn_material(Color::White);
    let b_pawns = pos.pawn_material(Color::Black);
    let delta = w_mtrl - b_mtrl;

    let (leader_pawns, trailer_mtrl) = if delta > 0 { (w_pawns, b_mtrl) } else { (b_pawns, w_mtrl) };
    let all_pieces = QUEEN_VALUE + 2 * ROOK_VALUE + 2 * BISHOP_VALUE + 2 * KNIGHT_VALUE;
    interpolate(leader_pawns, 0, -30 * delta / 100, 6 * PAWN_VALUE, 0)
        + interpolate(trailer_mtrl, 0, 30 * delta / 100, all_pieces, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::Tables;

    #[test]
    fn trading_down_helps_the_leader() {
        let tables = Tables::shared().unwrap();
        // White is a rook up in both; fewer black pieces means a bigger bonus.
        let busy = Position::from_fen("r3k3/pppppppp/8/8/8/8/PPPPPPPP/RR2K3 w - - 0 1", tables.clone()).unwrap();
        let bare = Position::from_fen("4k3/pppppppp/8/8/8/8/PPPPPPPP/R3K3 w - - 0 1", tables).unwrap();
        assert_eq!(material(&busy), ROOK_VALUE);
        assert_eq!(material(&bare), ROOK_VALUE);
        assert!(trade_bonus(&bare) > trade_bonus(&busy));
    }

    #[test]
    fn level_material_has_no_bonus() {
        let pos = Position::start(Tables::shared().unwrap());
        assert_eq!(trade_bonus(&pos), 0);
    }
}
