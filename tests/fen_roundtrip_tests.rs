#[cfg(test)]
mod tests {
    use raptor::board::Board;
    use raptor::moves::execute::{make, unmake};
    use raptor::moves::movegen::generate_legal_moves;
    use std::str::FromStr;

    const FENS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
    ];

    #[test]
    fn parse_then_render_then_parse_is_a_fixed_point() {
        for fen in FENS {
            let board = Board::from_str(fen).unwrap();
            let rendered = board.to_string();
            let reparsed = Board::from_str(&rendered).unwrap();
            assert_eq!(board, reparsed, "fen {fen} did not round-trip through render");
        }
    }

    #[test]
    fn make_then_unmake_restores_every_legal_move_for_every_fen() {
        for fen in FENS {
            let mut board = Board::from_str(fen).unwrap();
            let original = board.clone();
            for mv in generate_legal_moves(&board) {
                make(&mut board, mv);
                unmake(&mut board);
                assert_eq!(board, original, "fen {fen} move {mv:?} did not undo cleanly");
            }
        }
    }
}
