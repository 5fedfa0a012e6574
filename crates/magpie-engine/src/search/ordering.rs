//! Move ordering: SEE bands, MVV-LVA, killers and history.
//!
//! Score bands written by [`score_move_list`]:
//! - winning captures and promotions: `2_000_000 * 100` and up
//! - equal captures: `1_000_000 * 100` and up
//! - losing captures: negative, below `-1_000_000 * 100 + ...`
//! - killers: 51..=54
//! - quiet moves: history score 0..=49

use magpie_core::{Move, MoveList, Position, Square};

use super::heuristics::{History, KillerTable};
use super::see::sign_see;

/// Score given to a hash move moved to the front of the list.
pub const HASH_MOVE_SCORE: i32 = 10_000;

fn value_on(pos: &Position, sq: Square) -> i32 {
    pos.piece_at(sq).map_or(0, |p| p.kind().value())
}

/// Score the moves from index `start` on for the main search.
pub fn score_move_list(
    pos: &mut Position,
    moves: &mut MoveList,
    start: usize,
    ply: usize,
    killers: &KillerTable,
    history: &mut History,
) {
    for m in &mut moves.as_mut_slice()[start..] {
        let capture = pos.piece_at(m.to()).is_some() || m.is_promotion();
        let mut score = 0;
        if capture {
            let victim = value_on(pos, m.to());
            let attacker = value_on(pos, m.from());
            score = victim / 10 * 1000 - attacker / 10;
            score += match sign_see(pos, *m) {
                s if s > 0 => 2_000_000,
                0 => 1_000_000,
                _ => -1_000_000,
            };
            score *= 100;
        }
        let ks = killers.killer_score(ply, *m);
        score += if ks > 0 { ks + 50 } else { history.hist_score(pos, *m) };
        m.score = score;
    }
}

/// Most valuable victim, least valuable attacker. Used in quiescence search
/// where the extra precision of SEE is not worth its cost.
pub fn score_move_list_mvv_lva(pos: &Position, moves: &mut MoveList) {
    for m in moves.as_mut_slice() {
        m.score = value_on(pos, m.to()) * 10_000 - value_on(pos, m.from());
    }
}

/// Swap the highest-scored move at or after `start` into `start`.
pub fn select_best(moves: &mut MoveList, start: usize) {
    let mut best = start;
    let mut best_score = moves[start].score;
    for i in start + 1..moves.len() {
        if moves[i].score > best_score {
            best = i;
            best_score = moves[i].score;
        }
    }
    if best != start {
        moves.swap(start, best);
    }
}

/// Move `hash_move` to the front if the list contains it. Returns `true`
/// on success.
pub fn select_hash_move(moves: &mut MoveList, hash_move: Move) -> bool {
    if hash_move.is_empty() {
        return false;
    }
    let Some(i) = moves.iter().position(|m| *m == hash_move) else {
        return false;
    };
    moves.swap(0, i);
    moves[0].score = HASH_MOVE_SCORE;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_core::{Tables, movegen};

    fn position(fen: &str) -> Position {
        Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
    }

    #[test]
    fn winning_capture_first_losing_capture_last() {
        // Pawn takes knight wins; queen takes defended pawn loses.
        let mut pos = position("4k3/2p5/3p4/4n3/3P4/Q7/8/4K3 w - - 0 1");
        let mut moves = movegen::legal_moves(&mut pos);
        score_move_list(&mut pos, &mut moves, 0, 0, &KillerTable::new(), &mut History::new());
        select_best(&mut moves, 0);
        assert_eq!(moves[0].to_uci(), "d4e5");
        let qxd6 = moves.iter().find(|m| m.to_uci() == "a3d6").copied().unwrap();
        assert!(qxd6.score < 0);
        assert!(moves.iter().all(|m| m.score >= qxd6.score));
    }

    #[test]
    fn killers_beat_history() {
        let mut pos = Position::start(Tables::shared().unwrap());
        let mut moves = movegen::legal_moves(&mut pos);
        let mut killers = KillerTable::new();
        let g1f3 = moves.iter().find(|m| m.to_uci() == "g1f3").copied().unwrap();
        killers.add_killer(2, g1f3);
        let mut history = History::new();
        let e2e4 = moves.iter().find(|m| m.to_uci() == "e2e4").copied().unwrap();
        history.add_success(&pos, e2e4, 5);
        score_move_list(&mut pos, &mut moves, 0, 2, &killers, &mut history);
        select_best(&mut moves, 0);
        assert_eq!(moves[0], g1f3);
        assert_eq!(moves[0].score, 54);
        select_best(&mut moves, 1);
        assert_eq!(moves[1], e2e4);
        assert_eq!(moves[1].score, 49);
    }

    #[test]
    fn mvv_lva_prefers_big_victims() {
        let pos = position("4k3/8/8/2q1r3/3P4/8/8/4K3 w - - 0 1");
        let mut moves = MoveList::new();
        movegen::pseudo_legal_captures(&pos, &mut moves);
        score_move_list_mvv_lva(&pos, &mut moves);
        select_best(&mut moves, 0);
        assert_eq!(moves[0].to_uci(), "d4c5");
    }

    #[test]
    fn hash_move_goes_first() {
        let mut pos = Position::start(Tables::shared().unwrap());
        let mut moves = movegen::legal_moves(&mut pos);
        let last = moves[moves.len() - 1];
        assert!(select_hash_move(&mut moves, last));
        assert_eq!(moves[0], last);
        assert_eq!(moves[0].score, HASH_MOVE_SCORE);
        assert!(!select_hash_move(&mut moves, Move::EMPTY));
    }
}
