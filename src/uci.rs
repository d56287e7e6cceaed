//! UCI protocol driver (spec.md §6): a line-oriented loop over stdin/stdout
//! supporting the commands needed to drive the engine from a GUI — `uci`,
//! `isready`, `position`, `go`, `quit`. Time management beyond a fixed
//! search depth is out of scope, so `go`'s clock-related tokens are parsed
//! but only `depth`/`movetime` affect the search.

use crate::board::{fen::STARTPOS_FEN, Board};
use crate::moves::movegen::generate_legal_moves;
use crate::moves::types::Move;
use crate::search::{search, Limits, TranspositionTable};
use crate::square::Square;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument, warn};

const ENGINE_NAME: &str = "raptor";
const ENGINE_AUTHOR: &str = "raptor contributors";
const DEFAULT_DEPTH: u8 = 6;
const TT_SIZE_MB: usize = 64;

/// Parses a UCI long-algebraic token (`e2e4`, `e7e8q`) against the board's
/// legal moves, since the wire format carries no move-kind flag of its own.
fn resolve_uci_move(board: &Board, token: &str) -> Option<Move> {
    if token.len() < 4 {
        return None;
    }
    let from = Square::from_str(&token[0..2]).ok()?;
    let to = Square::from_str(&token[2..4]).ok()?;
    let promotion = match token.as_bytes().get(4) {
        Some(b'q') => Some(crate::board::Piece::Queen),
        Some(b'r') => Some(crate::board::Piece::Rook),
        Some(b'b') => Some(crate::board::Piece::Bishop),
        Some(b'n') => Some(crate::board::Piece::Knight),
        None => None,
        _ => return None,
    };
    generate_legal_moves(board)
        .into_iter()
        .find(|mv| mv.same_endpoints(from, to, promotion))
}

fn handle_position(board: &mut Board, args: &str) {
    let mut tokens = args.split_whitespace().peekable();
    let Some(first) = tokens.next() else {
        return;
    };

    let result = match first {
        "startpos" => Board::from_str(STARTPOS_FEN),
        "fen" => {
            let fen_tokens: Vec<&str> = tokens
                .by_ref()
                .take_while(|&t| t != "moves")
                .collect();
            Board::from_str(&fen_tokens.join(" "))
        }
        other => {
            warn!(token = other, "position: unrecognized subcommand");
            return;
        }
    };

    let mut new_board = match result {
        Ok(b) => b,
        Err(err) => {
            warn!(%err, "position: failed to parse board");
            return;
        }
    };

    if tokens.peek() == Some(&"moves") {
        tokens.next();
        for mv_token in tokens {
            match resolve_uci_move(&new_board, mv_token) {
                Some(mv) => {
                    crate::moves::execute::make(&mut new_board, mv);
                    new_board.change_side();
                }
                None => {
                    warn!(mv = mv_token, "position: illegal or unknown move, ignoring rest");
                    break;
                }
            }
        }
    }

    *board = new_board;
}

fn handle_go(board: &mut Board, tt: &mut TranspositionTable, args: &str) -> Option<Move> {
    let mut depth = DEFAULT_DEPTH;
    let mut move_time = None;

    let tokens: Vec<&str> = args.split_whitespace().collect();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                if let Some(value) = tokens.get(i + 1).and_then(|s| s.parse::<u8>().ok()) {
                    depth = value;
                    i += 1;
                }
            }
            "movetime" => {
                if let Some(ms) = tokens.get(i + 1).and_then(|s| s.parse::<u64>().ok()) {
                    move_time = Some(Duration::from_millis(ms));
                    i += 1;
                }
            }
            // Clock-relative tokens (wtime/btime/winc/binc/movestogo/infinite) are
            // accepted but ignored: no time management beyond a fixed depth.
            _ => {}
        }
        i += 1;
    }

    let limits = Limits { depth, move_time };
    let result = search(board, tt, limits);
    info!(
        depth = result.depth_reached,
        score = result.score,
        nodes = result.nodes,
        best_move = ?result.best_move,
        "go complete"
    );
    result.best_move
}

/// Runs the UCI command loop to completion, reading from `input` and
/// writing responses to `output`. Returns once `quit` is received or stdin
/// closes.
#[instrument(skip(input, output))]
pub fn run<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    let mut board = Board::from_str(STARTPOS_FEN).expect("startpos FEN must parse");
    let mut tt = TranspositionTable::new(TT_SIZE_MB);

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r),
            None => (line, ""),
        };

        match command {
            "uci" => {
                writeln!(output, "id name {ENGINE_NAME}")?;
                writeln!(output, "id author {ENGINE_AUTHOR}")?;
                writeln!(output, "uciok")?;
            }
            "isready" => {
                writeln!(output, "readyok")?;
            }
            "ucinewgame" => {
                board = Board::from_str(STARTPOS_FEN).expect("startpos FEN must parse");
                tt.clear();
            }
            "position" => handle_position(&mut board, rest),
            "go" => {
                if let Some(mv) = handle_go(&mut board, &mut tt, rest) {
                    writeln!(output, "bestmove {}", mv.to_uci())?;
                } else {
                    writeln!(output, "bestmove 0000")?;
                }
            }
            "quit" => return Ok(()),
            other => {
                warn!(command = other, "unrecognized UCI command, ignoring");
            }
        }
        output.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_commands(commands: &str) -> String {
        let mut out = Vec::new();
        run(Cursor::new(commands.as_bytes()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn uci_handshake_reports_name_and_uciok() {
        let out = run_commands("uci\nquit\n");
        assert!(out.contains("id name raptor"));
        assert!(out.trim_end().ends_with("uciok"));
    }

    #[test]
    fn isready_responds_readyok() {
        let out = run_commands("isready\nquit\n");
        assert!(out.contains("readyok"));
    }

    #[test]
    fn go_from_a_mating_position_reports_the_mating_move() {
        let out = run_commands(
            "position fen 8/8/8/8/4k3/8/4q3/4K3 b - - 0 1\ngo depth 1\nquit\n",
        );
        assert!(out.contains("bestmove e2e1"));
    }

    #[test]
    fn position_with_moves_applies_them_before_search() {
        let out = run_commands(
            "position startpos moves e2e4 e7e5\ngo depth 1\nquit\n",
        );
        assert!(out.contains("bestmove"));
    }
}
