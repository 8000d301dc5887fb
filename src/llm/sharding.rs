//! Deterministic credential sharding
//!
//! Several API keys can be configured for the text-generation service. Calls
//! are spread across them by hashing a `purpose:id` string, which keeps a
//! given agent on the same key for the whole session while distributing
//! different agents across keys.

use sha2::{Digest, Sha256};

/// Pick the shard index for `(purpose, id)` out of `shard_count` shards.
///
/// Returns 0 when `shard_count` is 0 or 1.
pub fn select_shard(purpose: &str, id: &str, shard_count: usize) -> usize {
    if shard_count <= 1 {
        return 0;
    }

    let digest = Sha256::digest(format!("{}:{}", purpose, id).as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);

    (u64::from_be_bytes(prefix) % shard_count as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_or_zero_shards() {
        assert_eq!(select_shard("search", "a", 0), 0);
        assert_eq!(select_shard("search", "a", 1), 0);
    }

    #[test]
    fn test_in_range_and_stable() {
        for id in ["Journal Scout", "Conference Scout", "Survey Scout", "Frontier Scout"] {
            let shard = select_shard("search-agent", id, 3);
            assert!(shard < 3);
            assert_eq!(shard, select_shard("search-agent", id, 3));
        }
    }

    #[test]
    fn test_spreads_across_shards() {
        let used: std::collections::HashSet<usize> = (0..64)
            .map(|i| select_shard("search-agent", &format!("agent-{}", i), 4))
            .collect();
        assert_eq!(used.len(), 4);
    }

    #[test]
    fn test_purpose_participates_in_hash() {
        let differs = (0..32).any(|i| {
            let id = format!("id-{}", i);
            select_shard("search", &id, 7) != select_shard("synthesis", &id, 7)
        });
        assert!(differs);
    }
}
