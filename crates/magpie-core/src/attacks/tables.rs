//! Leaper attack sets and square geometry.

use crate::bitboard::Bitboard;

const fn leaper_table(deltas: &[(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut d = 0;
        while d < 8 {
            let f = file + deltas[d].0;
            let r = rank + deltas[d].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r as usize * 8 + f as usize);
            }
            d += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

pub(super) const fn knight_table() -> [Bitboard; 64] {
    leaper_table(&[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)])
}

pub(super) const fn king_table() -> [Bitboard; 64] {
    leaper_table(&[(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)])
}

/// Squares attacked by a pawn of each colour standing on each square.
pub(super) const fn pawn_tables() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let bb = Bitboard::new(1u64 << sq);
        table[0][sq] = bb.white_pawn_attacks();
        table[1][sq] = bb.black_pawn_attacks();
        sq += 1;
    }
    table
}

/// Squares on the pawn's own and adjacent files strictly ahead of it. An
/// enemy pawn on any of them stops the pawn from being passed.
pub(super) const fn pawn_blocker_tables() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let x = sq % 8;
        let y = sq / 8;
        let mut files = 1u64 << x;
        if x > 0 {
            files |= 1u64 << (x - 1);
        }
        if x < 7 {
            files |= 1u64 << (x + 1);
        }
        let column = files * 0x0101_0101_0101_0101;
        let above = if y < 7 { !0u64 << ((y + 1) * 8) } else { 0 };
        let below = if y > 0 { !0u64 >> ((8 - y) * 8) } else { 0 };
        table[0][sq] = Bitboard::new(column & above);
        table[1][sq] = Bitboard::new(column & below);
        sq += 1;
    }
    table
}

/// Open segments between every pair of aligned squares.
pub(super) fn between_table() -> Box<[[Bitboard; 64]; 64]> {
    let mut table = Box::new([[Bitboard::EMPTY; 64]; 64]);
    for sq1 in 0..64usize {
        for dx in -1i8..=1 {
            for dy in -1i8..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let mut x = (sq1 % 8) as i8;
                let mut y = (sq1 / 8) as i8;
                let mut seen = 0u64;
                loop {
                    x += dx;
                    y += dy;
                    if !(0..8).contains(&x) || !(0..8).contains(&y) {
                        break;
                    }
                    let sq2 = (y * 8 + x) as usize;
                    table[sq1][sq2] = Bitboard::new(seen);
                    seen |= 1u64 << sq2;
                }
            }
        }
    }
    table
}

/// Step between two squares indexed by `to + (to | 7) - from - (from | 7) +
/// 0x77`. Holds the queen step for aligned pairs, the knight offset for a
/// knight jump and 0 otherwise.
#[rustfmt::skip]
pub(super) const DIRECTION: [i8; 239] = [
        -9,   0,   0,   0,   0,   0,   0,  -8,   0,   0,   0,   0,   0,   0,  -7,
    0,   0,  -9,   0,   0,   0,   0,   0,  -8,   0,   0,   0,   0,   0,  -7,   0,
    0,   0,   0,  -9,   0,   0,   0,   0,  -8,   0,   0,   0,   0,  -7,   0,   0,
    0,   0,   0,   0,  -9,   0,   0,   0,  -8,   0,   0,   0,  -7,   0,   0,   0,
    0,   0,   0,   0,   0,  -9,   0,   0,  -8,   0,   0,  -7,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0,  -9, -17,  -8, -15,  -7,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0, -10,  -9,  -8,  -7,  -6,   0,   0,   0,   0,   0,
    0,  -1,  -1,  -1,  -1,  -1,  -1,  -1,   0,   1,   1,   1,   1,   1,   1,   1,
    0,   0,   0,   0,   0,   0,   6,   7,   8,   9,  10,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   0,   7,  15,   8,  17,   9,   0,   0,   0,   0,   0,
    0,   0,   0,   0,   0,   7,   0,   0,   8,   0,   0,   9,   0,   0,   0,   0,
    0,   0,   0,   0,   7,   0,   0,   0,   8,   0,   0,   0,   9,   0,   0,   0,
    0,   0,   0,   7,   0,   0,   0,   0,   8,   0,   0,   0,   0,   9,   0,   0,
    0,   0,   7,   0,   0,   0,   0,   0,   8,   0,   0,   0,   0,   0,   9,   0,
    0,   7,   0,   0,   0,   0,   0,   0,   8,   0,   0,   0,   0,   0,   0,   9,
];
