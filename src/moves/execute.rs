//! Make/unmake (spec.md §4.4). `make` mutates the board in place, pushes an
//! `Undo` record, and keeps the incremental Zobrist hash exact; `unmake`
//! pops that record and reverses precisely what `make` did. Neither toggles
//! `side_to_move` — the caller (the searcher, in practice) calls
//! `Board::change_side` on both sides of its recursive call so it controls
//! exactly when the position hash reflects the side flip.

use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::board::{Board, Color, Piece};
use crate::hash::zobrist::zobrist_keys;
use crate::moves::types::{Move, Undo};
use crate::square::Square;

/// Castling-rights bit cleared when a piece leaves or arrives on a rook's
/// home corner (spec.md §4.4's castling-rights update table, rows 2-3).
#[inline(always)]
fn rook_corner_mask(sq: Square) -> u8 {
    match sq.index() {
        0 => CASTLE_WQ,
        7 => CASTLE_WK,
        56 => CASTLE_BQ,
        63 => CASTLE_BK,
        _ => 0,
    }
}

/// The rook's `(from, to)` for the king destination of a castle move.
#[inline(always)]
fn rook_castle_squares(king_to: Square) -> (Square, Square) {
    match king_to.index() {
        6 => (Square::from_index(7), Square::from_index(5)),
        2 => (Square::from_index(0), Square::from_index(3)),
        62 => (Square::from_index(63), Square::from_index(61)),
        58 => (Square::from_index(56), Square::from_index(59)),
        other => unreachable!("castle move cannot land on square {other}"),
    }
}

#[inline(always)]
fn xor_castling_rights(board: &mut Board, old: u8, new: u8) {
    if old == new {
        return;
    }
    let keys = zobrist_keys();
    for (bit, key) in [
        (CASTLE_WK, keys.castling[0]),
        (CASTLE_WQ, keys.castling[1]),
        (CASTLE_BK, keys.castling[2]),
        (CASTLE_BQ, keys.castling[3]),
    ] {
        if (old & bit) != (new & bit) {
            board.zobrist ^= key;
        }
    }
}

/// Applies `mv` to `board`, pushing the `Undo` record needed to reverse it.
pub fn make(board: &mut Board, mv: Move) {
    let keys = zobrist_keys();
    let mover_color = board.side_to_move;
    let from = mv.from();
    let to = mv.to();
    let moved_piece = board
        .piece_type_at(from)
        .expect("make() called with a move whose `from` square is empty");

    let captured = if mv.is_en_passant() {
        let cap_sq = match mover_color {
            Color::White => Square::from_index(to.index() - 8),
            Color::Black => Square::from_index(to.index() + 8),
        };
        let cap_piece = board
            .piece_type_at(cap_sq)
            .expect("en passant flag set but no pawn behind the target square");
        Some((mover_color.opposite(), cap_piece, cap_sq))
    } else {
        board.piece_at(to).map(|(color, piece)| (color, piece, to))
    };

    let undo = Undo {
        mv,
        moved_piece,
        mover_color,
        captured,
        prev_castling_rights: board.castling_rights,
        prev_en_passant_target: board.en_passant_target,
        prev_halfmove_clock: board.halfmove_clock,
        prev_fullmove_number: board.fullmove_number,
    };

    if let Some(ep) = board.en_passant_target {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }
    board.en_passant_target = None;
    if mv.is_double_pawn_push() {
        let ep_sq = match mover_color {
            Color::White => Square::from_index(from.index() + 8),
            Color::Black => Square::from_index(from.index() - 8),
        };
        board.en_passant_target = Some(ep_sq);
        board.zobrist ^= keys.ep_file[ep_sq.file() as usize];
    }

    let old_rights = board.castling_rights;
    let mut new_rights = old_rights;
    if moved_piece == Piece::King {
        new_rights &= match mover_color {
            Color::White => !(CASTLE_WK | CASTLE_WQ),
            Color::Black => !(CASTLE_BK | CASTLE_BQ),
        };
    }
    new_rights &= !rook_corner_mask(from);
    if let Some((_, _, cap_sq)) = captured {
        new_rights &= !rook_corner_mask(cap_sq);
    }
    xor_castling_rights(board, old_rights, new_rights);
    board.castling_rights = new_rights;

    if mv.is_en_passant() {
        let (_, _, cap_sq) = captured.expect("en passant always captures");
        board.set_piece(cap_sq, None);
    }
    board.set_piece(from, None);
    let placed_piece = mv.promotion_piece().unwrap_or(moved_piece);
    board.set_piece(to, Some((mover_color, placed_piece)));

    if mv.is_castle() {
        let (rook_from, rook_to) = rook_castle_squares(to);
        board.set_piece(rook_from, None);
        board.set_piece(rook_to, Some((mover_color, Piece::Rook)));
    }

    if captured.is_some() || moved_piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }
    if mover_color == Color::Black {
        board.fullmove_number += 1;
    }

    board.undo_stack.push(undo);

    #[cfg(debug_assertions)]
    board.assert_zobrist_consistent();
}

/// Reverses the most recent `make`. Asserts (fatal per spec.md §7) if the
/// undo stack is empty.
pub fn unmake(board: &mut Board) {
    let undo = board
        .undo_stack
        .pop()
        .expect("unmake() called with an empty undo stack");
    let keys = zobrist_keys();
    let from = undo.mv.from();
    let to = undo.mv.to();

    if undo.mv.is_castle() {
        let (rook_from, rook_to) = rook_castle_squares(to);
        board.set_piece(rook_to, None);
        board.set_piece(rook_from, Some((undo.mover_color, Piece::Rook)));
    }

    board.set_piece(to, None);
    board.set_piece(from, Some((undo.mover_color, undo.moved_piece)));

    if let Some((color, piece, sq)) = undo.captured {
        board.set_piece(sq, Some((color, piece)));
    }

    xor_castling_rights(board, board.castling_rights, undo.prev_castling_rights);
    board.castling_rights = undo.prev_castling_rights;

    if let Some(ep) = board.en_passant_target {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }
    board.en_passant_target = undo.prev_en_passant_target;
    if let Some(ep) = board.en_passant_target {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }

    board.halfmove_clock = undo.prev_halfmove_clock;
    board.fullmove_number = undo.prev_fullmove_number;

    #[cfg(debug_assertions)]
    board.assert_zobrist_consistent();
}
