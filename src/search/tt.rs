//! Zobrist-keyed transposition table (spec.md §4.7). Direct-mapped, a single
//! entry per index, depth-preferred replacement. Mate scores are stored
//! relative to the node they were found at (distance from the *root*) and
//! rebiased to the current ply on probe, so a mate score cached deep in one
//! search branch still reports the correct distance when reused from a
//! shallower one.

use crate::moves::types::Move;

/// Scores at or beyond this magnitude encode "mate in N plies" rather than a
/// material/positional evaluation.
pub const MATE_THRESHOLD: i32 = 30_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    /// The stored score is the true minimax value.
    Exact,
    /// Search failed high: the true value is at least this score.
    LowerBound,
    /// Search failed low: the true value is at most this score.
    UpperBound,
}

impl NodeType {
    fn to_bound(self) -> u8 {
        match self {
            NodeType::Exact => 0,
            NodeType::LowerBound => 1,
            NodeType::UpperBound => 2,
        }
    }

    fn from_bound(bound: u8) -> NodeType {
        match bound {
            0 => NodeType::Exact,
            1 => NodeType::LowerBound,
            _ => NodeType::UpperBound,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct TTEntry {
    key: u64,
    best_move: Option<Move>,
    score: i16,
    depth: u8,
    bound: u8,
    /// Generation counter of the search that wrote this entry (spec.md §4.7's
    /// entry data model). Lets `store` prefer replacing stale entries from a
    /// previous `search()` call over a same-generation deeper one.
    age: u8,
    /// Distinguishes a real entry from the zeroed vec default (spec.md §4.7:
    /// a table must not mistake an empty slot for a `key == 0` position).
    is_active: bool,
}

impl Default for TTEntry {
    fn default() -> Self {
        TTEntry {
            key: 0,
            best_move: None,
            score: 0,
            depth: 0,
            bound: 0,
            age: 0,
            is_active: false,
        }
    }
}

/// A lookup result from `TranspositionTable::probe`.
pub struct TTHit {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u8,
    pub node_type: NodeType,
}

pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    current_age: u8,
}

/// Biases a mate score found `ply` plies into the current search down to a
/// root-relative distance before it is stored, so two branches that both see
/// "mate in 3 from here" store the same value regardless of how deep each
/// branch is from the root.
fn score_to_tt(score: i32, ply: i32) -> i16 {
    let biased = if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    };
    biased.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Reverses `score_to_tt`: rebiases a stored mate score back to the distance
/// seen from the probing node.
fn score_from_tt(score: i16, ply: i32) -> i32 {
    let score = score as i32;
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

impl TranspositionTable {
    /// Builds a table sized to the largest power-of-two entry count that
    /// fits in `size_mb` megabytes.
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<TTEntry>();
        let num_entries = (size_mb * 1024 * 1024) / entry_size.max(1);

        let mut capacity = 1usize;
        while capacity * 2 <= num_entries {
            capacity *= 2;
        }
        capacity = capacity.max(1);

        Self {
            entries: vec![TTEntry::default(); capacity],
            current_age: 0,
        }
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = TTEntry::default();
        }
        self.current_age = 0;
    }

    /// Marks the start of a new `search()` call. Entries written under an
    /// older age are replaced on sight regardless of depth, since a deeper
    /// result from a finished search is still worth less than fresh data
    /// from the one in progress.
    pub fn new_search(&mut self) {
        self.current_age = self.current_age.wrapping_add(1);
    }

    fn index(&self, key: u64) -> usize {
        (key as usize) & (self.entries.len() - 1)
    }

    /// Stores a search result, replacing the resident entry unless it was
    /// searched to at least as great a depth in the current search
    /// generation (spec.md §4.7's depth-preferred replacement policy,
    /// refined to prefer the current age).
    pub fn store(
        &mut self,
        key: u64,
        best_move: Option<Move>,
        score: i32,
        depth: u8,
        node_type: NodeType,
        ply: i32,
    ) {
        let index = self.index(key);
        let entry = &mut self.entries[index];

        let stale = entry.age != self.current_age;
        if !entry.is_active || entry.key != key || stale || depth >= entry.depth {
            let best_move = best_move.or(if entry.key == key { entry.best_move } else { None });
            *entry = TTEntry {
                key,
                best_move,
                score: score_to_tt(score, ply),
                depth,
                bound: node_type.to_bound(),
                age: self.current_age,
                is_active: true,
            };
        }
    }

    /// Looks up `key`, rebiasing any stored mate score to `ply`.
    pub fn probe(&self, key: u64, ply: i32) -> Option<TTHit> {
        let index = self.index(key);
        let entry = &self.entries[index];
        if entry.is_active && entry.key == key {
            Some(TTHit {
                best_move: entry.best_move,
                score: score_from_tt(entry.score, ply),
                depth: entry.depth,
                node_type: NodeType::from_bound(entry.bound),
            })
        } else {
            None
        }
    }
}
