pub mod context;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod tt;

pub use search::{search, Limits, SearchResult, MATE_SCORE};
pub use tt::TranspositionTable;
