//! Endgame evaluation checks on whole positions.

use magpie_core::{Color, PieceKind, Position, Tables};
use magpie_engine::{Bitbases, Evaluator};

const P_V: i32 = PieceKind::Pawn.value();
const R_V: i32 = PieceKind::Rook.value();
const Q_V: i32 = PieceKind::Queen.value();

fn position(fen: &str) -> Position {
    Position::from_fen(fen, Tables::shared().unwrap()).unwrap()
}

/// Evaluation from White's point of view.
fn eval_white(pos: &Position) -> i32 {
    let mut evaluator = Evaluator::new(Bitbases::builtin());
    let score = evaluator.eval_pos(pos);
    if pos.white_to_move() { score } else { -score }
}

#[test]
fn krkp_depends_on_side_to_move() {
    let win_score = R_V - P_V;
    let drawish = (P_V + R_V) / 20;
    let mut pos = position("6R1/8/8/8/5K2/2kp4/8/8 w - - 0 1");
    let white = eval_white(&pos);
    assert!(white > win_score, "white to move: {white}");

    pos.set_side_to_move(Color::Black);
    let black = eval_white(&pos);
    assert!(black < drawish, "black to move: {black}");
}

#[test]
fn kqkp_rook_pawn() {
    let win_score = Q_V - P_V - 200;
    let drawish = (P_V + Q_V) / 20;
    let cases = [
        ("8/8/1K6/8/8/Q7/p7/1k6 w - - 0 1", false),
        ("8/8/8/1K6/8/Q7/p7/1k6 w - - 0 1", true),
        ("3Q4/8/8/8/K7/8/1kp5/8 w - - 0 1", true),
        ("8/8/8/8/8/1Q6/p3K3/k7 b - - 0 1", false),
    ];
    for (fen, won) in cases {
        let score = eval_white(&position(fen));
        if won {
            assert!(score > win_score, "{fen}: {score}");
        } else {
            assert!(score < drawish, "{fen}: {score}");
        }
    }
}

#[test]
fn kqkp_bishop_pawn() {
    let win_score = Q_V - P_V - 200;
    let drawish = (P_V + Q_V) / 20;
    let far = eval_white(&position("3Q4/8/8/8/3K4/8/1kp5/8 w - - 0 1"));
    assert!(far < drawish, "king too far: {far}");
    let near = eval_white(&position("3Q4/8/8/8/8/4K3/1kp5/8 w - - 0 1"));
    assert!(near > win_score, "king close enough: {near}");
}

#[test]
fn kpk_uses_the_bitbase() {
    // The defending king reaches the queening square in time.
    let drawn = eval_white(&position("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1"));
    assert_eq!(drawn, 0);
    let won = eval_white(&position("8/8/8/8/3PK3/8/8/k7 w - - 0 1"));
    assert!(won > Q_V - 2 * P_V, "score {won}");
}

#[test]
fn evaluation_is_colour_symmetric() {
    let white = eval_white(&position("6R1/8/8/8/5K2/2kp4/8/8 w - - 0 1"));
    let black = eval_white(&position("8/8/2KP4/5k2/8/8/8/6r1 b - - 0 1"));
    assert_eq!(white, -black);
}
