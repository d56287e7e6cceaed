//! Zobrist key table, generated once from a fixed seed so hashes are
//! reproducible across runs and tests without checking in a static table.

use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

pub struct ZobristKeys {
    /// `[color][piece][square]`, White=0/Black=1, Pawn..King=0..5.
    pub piece: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// Bit order K, Q, k, q — matching `castle_bits`.
    pub castling: [u64; 4],
    /// File a..h => 0..7.
    pub ep_file: [u64; 8],
}

/// Global keys, built once on first use.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys(ChaCha8Rng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_zobrist_keys(mut rng: ChaCha8Rng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut ChaCha8Rng) -> u64 {
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0u64; 4],
        ep_file: [0u64; 8],
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }

    for i in 0..4 {
        keys.castling[i] = non_zero(&mut rng);
    }

    for f in 0..8 {
        keys.ep_file[f] = non_zero(&mut rng);
    }

    keys.side_to_move = non_zero(&mut rng);

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_across_calls() {
        let a = generate_zobrist_keys(ChaCha8Rng::seed_from_u64(ZOBRIST_SEED));
        let b = generate_zobrist_keys(ChaCha8Rng::seed_from_u64(ZOBRIST_SEED));
        assert_eq!(a.piece, b.piece);
        assert_eq!(a.side_to_move, b.side_to_move);
        assert_eq!(a.castling, b.castling);
        assert_eq!(a.ep_file, b.ep_file);
    }

    #[test]
    fn no_key_is_zero() {
        let keys = generate_zobrist_keys(ChaCha8Rng::seed_from_u64(ZOBRIST_SEED));
        for c in 0..2 {
            for p in 0..6 {
                for sq in 0..64 {
                    assert_ne!(keys.piece[c][p][sq], 0);
                }
            }
        }
        assert_ne!(keys.side_to_move, 0);
        assert!(keys.castling.iter().all(|&k| k != 0));
        assert!(keys.ep_file.iter().all(|&k| k != 0));
    }
}
