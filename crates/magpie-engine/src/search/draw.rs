//! Fifty-move and repetition draw rules.
//!
//! The hash history holds the Zobrist hash of every earlier position back to
//! the last irreversible move, oldest first. Entries from `first_new` on were
//! pushed by the search itself rather than played on the board.

use std::fmt;

use magpie_core::{Move, Position};

/// Return `true` if the fifty-move rule allows a draw claim.
pub fn can_claim_draw_50(pos: &Position) -> bool {
    pos.half_move_clock() >= 100
}

/// Return `true` if the current position counts as a repetition draw.
///
/// A position seen twice before on the board is a third repetition. Inside
/// the search a single earlier occurrence is enough, since the side to move
/// could repeat again.
pub fn can_claim_draw_rep(pos: &Position, history: &[u64], first_new: usize) -> bool {
    let hash = pos.zobrist_hash();
    let mut reps = 0;
    // Positions one, two and three plies back can never be identical.
    let Some(start) = history.len().checked_sub(4) else {
        return false;
    };
    for i in (0..=start).rev().step_by(2) {
        if history[i] == hash {
            reps += 1;
            if i >= first_new {
                reps += 1;
                break;
            }
        }
    }
    reps >= 2
}

/// A draw the side to move may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawClaim {
    FiftyMoves,
    Repetition,
    /// Claimable by announcing the move and then claiming.
    FiftyMovesAfter(Move),
    RepetitionAfter(Move),
}

impl fmt::Display for DrawClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawClaim::FiftyMoves => f.write_str("draw 50"),
            DrawClaim::Repetition => f.write_str("draw rep"),
            DrawClaim::FiftyMovesAfter(m) => write!(f, "draw 50 {m}"),
            DrawClaim::RepetitionAfter(m) => write!(f, "draw rep {m}"),
        }
    }
}

/// Check whether a draw can be claimed now, or after playing `mv`.
pub fn claim_draw(pos: &mut Position, history: &[u64], mv: Move) -> Option<DrawClaim> {
    if can_claim_draw_50(pos) {
        return Some(DrawClaim::FiftyMoves);
    }
    if can_claim_draw_rep(pos, history, history.len()) {
        return Some(DrawClaim::Repetition);
    }
    let mut after: Vec<u64> = history.to_vec();
    after.push(pos.zobrist_hash());
    let undo = pos.make_move(mv);
    let claim = if can_claim_draw_50(pos) {
        Some(DrawClaim::FiftyMovesAfter(mv))
    } else if can_claim_draw_rep(pos, &after, after.len()) {
        Some(DrawClaim::RepetitionAfter(mv))
    } else {
        None
    };
    pos.unmake_move(mv, &undo);
    claim
}
