#[cfg(test)]
mod tests {
    use raptor::board::Board;
    use raptor::moves::movegen::generate_legal_moves;
    use raptor::search::{search, Limits, TranspositionTable, MATE_SCORE};
    use std::str::FromStr;

    #[test]
    fn depth_two_from_startpos_moves_a_white_piece_off_its_back_ranks() {
        let mut board = Board::from_str(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        )
        .unwrap();
        let mut tt = TranspositionTable::new(1);
        let result = search(&mut board, &mut tt, Limits::depth(2));
        let mv = result.best_move.expect("startpos always has a move");
        assert!(mv.from().rank() <= 1);
    }

    #[test]
    fn black_finds_mate_in_one_with_a_large_score() {
        let mut board = Board::from_str("8/8/8/8/4k3/8/4q3/4K3 b - - 0 1").unwrap();
        let mut tt = TranspositionTable::new(1);
        let result = search(&mut board, &mut tt, Limits::depth(1));
        assert_eq!(result.best_move.unwrap().to_uci(), "e2e1");
        assert!(result.score >= MATE_SCORE - 1000);
    }

    #[test]
    fn lone_kings_never_yield_the_null_move_sentinel() {
        let mut board = Board::from_str("k7/8/K7/8/8/8/8/8 w - - 0 1").unwrap();
        let mut tt = TranspositionTable::new(1);
        let result = search(&mut board, &mut tt, Limits::depth(1));
        assert!(result.best_move.is_some());
        assert!(!result.best_move.unwrap().is_null());
    }

    #[test]
    fn en_passant_is_excluded_when_it_would_expose_the_king_on_the_fifth_rank() {
        let board = Board::from_str("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1").unwrap();
        let moves = generate_legal_moves(&board);
        assert!(!moves.iter().any(|mv| mv.to_uci() == "b5c6"));
    }

    #[test]
    fn castling_through_an_attacked_square_is_illegal_on_both_sides() {
        let board = Board::from_str("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1").unwrap();
        let moves = generate_legal_moves(&board);
        assert!(!moves.iter().any(|mv| mv.to_uci() == "e1g1"));
        assert!(!moves.iter().any(|mv| mv.to_uci() == "e1c1"));
    }
}
