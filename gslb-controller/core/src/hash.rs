use ahash::RandomState;
use std::hash::Hash;

// Fixed seeds so that checksums and shard assignments are stable for the lifetime of the process
// (and across processes built from the same source).
const SEEDS: (u64, u64, u64, u64) = (
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

fn state() -> RandomState {
    RandomState::with_seeds(SEEDS.0, SEEDS.1, SEEDS.2, SEEDS.3)
}

/// Computes a content fingerprint of a hashable value.
pub fn checksum<T: Hash>(value: &T) -> u64 {
    state().hash_one(value)
}

/// Maps a hostname onto one of `n` queue shards.
///
/// All keys for the same hostname land in the same shard, which is what gives the downstream
/// consumer its per-hostname FIFO ordering.
pub fn bucket(hostname: &str, n: usize) -> usize {
    assert!(n > 0, "at least one bucket is required");
    (state().hash_one(hostname) % n as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_is_stable() {
        for n in 1..16 {
            let b = bucket("svc1.example.com", n);
            assert!(b < n);
            assert_eq!(b, bucket("svc1.example.com", n));
        }
    }

    #[test]
    fn bucket_handles_empty_hostname() {
        assert!(bucket("", 4) < 4);
        assert_eq!(bucket("", 4), bucket("", 4));
    }

    #[test]
    fn checksum_tracks_content() {
        assert_eq!(checksum(&("a", 1)), checksum(&("a", 1)));
        assert_ne!(checksum(&("a", 1)), checksum(&("a", 2)));
    }
}
