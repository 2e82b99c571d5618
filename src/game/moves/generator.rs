// src/game/moves/generator.rs

use super::{Flag, Move, MoveList};
use crate::game::board::movement::attacks_of;
use crate::game::board::{BitBoard, Position};
use crate::game::defs::{CastleSide, Color, Direction, PieceType, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenType {
    Quiet,
    Capture,
    PseudoLegal,
}

impl GenType {
    #[inline]
    const fn wants_quiets(self) -> bool {
        matches!(self, GenType::Quiet | GenType::PseudoLegal)
    }

    #[inline]
    const fn wants_captures(self) -> bool {
        matches!(self, GenType::Capture | GenType::PseudoLegal)
    }
}

/// Appends the side-to-move's pseudo-legal moves to `out`. Moves that
/// leave the own king in check are not filtered here; apply the move and
/// ask `is_check`.
pub fn generate_moves(pos: &Position, mode: GenType, out: &mut MoveList) -> usize {
    generate_moves_for(pos, pos.side_to_move(), mode, out)
}

pub fn generate_moves_for(pos: &Position, side: Color, mode: GenType, out: &mut MoveList) -> usize {
    let initial = out.len;
    generate_pawn_moves(pos, side, mode, out);
    generate_king_moves(pos, side, mode, out);
    generate_piece_moves(pos, side, PieceType::Knight, mode, out);
    generate_piece_moves(pos, side, PieceType::Bishop, mode, out);
    generate_piece_moves(pos, side, PieceType::Rook, mode, out);
    generate_piece_moves(pos, side, PieceType::Queen, mode, out);
    out.len - initial
}

#[inline]
fn origin(to: Square, dir: Direction) -> Square {
    Square((to.0 as i8 - dir.delta()) as u8)
}

fn generate_pawn_moves(pos: &Position, side: Color, mode: GenType, out: &mut MoveList) -> usize {
    let initial = out.len;

    let pawns = pos.pieces(side, PieceType::Pawn);

    let (forward, forward_east, forward_west) = match side {
        Color::White => (Direction::North, Direction::NorthEast, Direction::NorthWest),
        Color::Black => (Direction::South, Direction::SouthEast, Direction::SouthWest),
    };
    let rank3 = match side {
        Color::White => BitBoard::RANK_3,
        Color::Black => BitBoard::RANK_6,
    };
    let rank7 = match side {
        Color::White => BitBoard::RANK_7,
        Color::Black => BitBoard::RANK_2,
    };
    let rank7_pawns = pawns & rank7;
    let other_pawns = pawns & !rank7;

    let empty = pos.unoccupied();
    let enemy = pos.color_bb(!side);

    // single and double pushes
    if mode.wants_quiets() {
        let mut pushes = other_pawns.shift(forward) & empty;
        let mut double_pushes = (pushes & rank3).shift(forward) & empty;
        while let Some(to) = pushes.pop_lsb() {
            out.push(Move::pack(origin(to, forward), to, Flag::QUIET));
        }
        while let Some(to) = double_pushes.pop_lsb() {
            let from = Square((to.0 as i8 - 2 * forward.delta()) as u8);
            out.push(Move::pack(from, to, Flag::DOUBLE_PUSH));
        }
    }

    // captures, en passant and promotion captures
    if mode.wants_captures() {
        let mut caps_east = other_pawns.shift(forward_east) & enemy;
        let mut caps_west = other_pawns.shift(forward_west) & enemy;
        while let Some(to) = caps_east.pop_lsb() {
            out.push(Move::pack(origin(to, forward_east), to, Flag::CAPTURE));
        }
        while let Some(to) = caps_west.pop_lsb() {
            out.push(Move::pack(origin(to, forward_west), to, Flag::CAPTURE));
        }

        let mut promo_caps_east = rank7_pawns.shift(forward_east) & enemy;
        let mut promo_caps_west = rank7_pawns.shift(forward_west) & enemy;
        while let Some(to) = promo_caps_east.pop_lsb() {
            let from = origin(to, forward_east);
            out.push(Move::pack(from, to, Flag::PROMO_Q_CAPTURE));
            out.push(Move::pack(from, to, Flag::PROMO_R_CAPTURE));
            out.push(Move::pack(from, to, Flag::PROMO_B_CAPTURE));
            out.push(Move::pack(from, to, Flag::PROMO_N_CAPTURE));
        }
        while let Some(to) = promo_caps_west.pop_lsb() {
            let from = origin(to, forward_west);
            out.push(Move::pack(from, to, Flag::PROMO_Q_CAPTURE));
            out.push(Move::pack(from, to, Flag::PROMO_R_CAPTURE));
            out.push(Move::pack(from, to, Flag::PROMO_B_CAPTURE));
            out.push(Move::pack(from, to, Flag::PROMO_N_CAPTURE));
        }

        if let Some(ep_sq) = pos.ep_square() {
            let mut ep_pawns = crate::game::board::PieceMovement::pawn_attacks(
                !side,
                BitBoard::from_square(ep_sq),
            ) & pawns;
            while let Some(from) = ep_pawns.pop_lsb() {
                out.push(Move::pack(from, ep_sq, Flag::EP_CAPTURE));
            }
        }
    }

    // non-capture promotions count as tactical moves, not quiets
    if mode != GenType::Quiet {
        let mut promo_pushes = rank7_pawns.shift(forward) & empty;
        while let Some(to) = promo_pushes.pop_lsb() {
            let from = origin(to, forward);
            out.push(Move::pack(from, to, Flag::PROMO_Q));
            out.push(Move::pack(from, to, Flag::PROMO_R));
            out.push(Move::pack(from, to, Flag::PROMO_B));
            out.push(Move::pack(from, to, Flag::PROMO_N));
        }
    }

    out.len - initial
}

fn generate_king_moves(pos: &Position, side: Color, mode: GenType, out: &mut MoveList) -> usize {
    let initial = out.len;

    generate_piece_moves(pos, side, PieceType::King, mode, out);

    if mode.wants_quiets() {
        if pos.can_castle(side, CastleSide::King) {
            let king_sq = pos.king_castle_sq(side).expect("castle right implies king square");
            let rook_sq = pos
                .rook_castle_sq(side, CastleSide::King)
                .expect("castle right implies rook square");
            out.push(Move::pack(king_sq, rook_sq, Flag::CASTLE_KING));
        }
        if pos.can_castle(side, CastleSide::Queen) {
            let king_sq = pos.king_castle_sq(side).expect("castle right implies king square");
            let rook_sq = pos
                .rook_castle_sq(side, CastleSide::Queen)
                .expect("castle right implies rook square");
            out.push(Move::pack(king_sq, rook_sq, Flag::CASTLE_QUEEN));
        }
    }

    out.len - initial
}

fn generate_piece_moves(
    pos: &Position,
    side: Color,
    pt: PieceType,
    mode: GenType,
    out: &mut MoveList,
) -> usize {
    debug_assert_ne!(pt, PieceType::Pawn);
    let initial = out.len;

    let occupied = pos.occupied();
    let empty = pos.unoccupied();
    let enemy = pos.color_bb(!side);

    if mode.wants_quiets() {
        let mut pieces = pos.pieces(side, pt);
        while let Some(from) = pieces.pop_lsb() {
            let mut quiets = attacks_of(pt, from, occupied) & empty;
            while let Some(to) = quiets.pop_lsb() {
                out.push(Move::pack(from, to, Flag::QUIET));
            }
        }
    }

    if mode.wants_captures() {
        let mut pieces = pos.pieces(side, pt);
        while let Some(from) = pieces.pop_lsb() {
            let mut caps = attacks_of(pt, from, occupied) & enemy;
            while let Some(to) = caps.pop_lsb() {
                out.push(Move::pack(from, to, Flag::CAPTURE));
            }
        }
    }

    out.len - initial
}
