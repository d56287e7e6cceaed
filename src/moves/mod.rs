pub mod execute;
pub mod movegen;
pub mod perft;
pub mod square_control;
pub mod types;

pub use movegen::{generate_captures, generate_legal_moves};
pub use types::{Move, Undo};
