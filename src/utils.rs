//! Utility functions for Cuckoo filters

use crate::{CuckooError, Result};

/// Highest load factor accepted at the rounded bucket count before doubling it
pub const MAX_INITIAL_LOAD: f64 = 0.96;

/// Calculated Cuckoo filter parameters
#[derive(Debug, Clone)]
pub struct CuckooParameters {
    pub num_buckets: u32,
    pub bits_per_item: u32,
    pub expected_fpr: f64,
}

/// Number of buckets for `num_keys` items.
///
/// Rounds `num_keys / tags_per_bucket` up to a power of two so bucket indices can be
/// masked, then doubles once if the table would start more than 96% full.
pub fn num_buckets_for(num_keys: u32, tags_per_bucket: u32) -> Result<u32> {
    if tags_per_bucket == 0 {
        return Err(CuckooError::InvalidParameter(
            "Tags per bucket must be > 0".to_string(),
        ));
    }

    let mut num_buckets = (num_keys / tags_per_bucket)
        .max(1)
        .checked_next_power_of_two()
        .ok_or_else(|| too_many_keys(num_keys))?;

    let frac = num_keys as f64 / (num_buckets as f64 * tags_per_bucket as f64);
    if frac > MAX_INITIAL_LOAD {
        num_buckets = num_buckets
            .checked_mul(2)
            .ok_or_else(|| too_many_keys(num_keys))?;
    }
    Ok(num_buckets)
}

fn too_many_keys(num_keys: u32) -> CuckooError {
    CuckooError::InvalidParameter(format!("Too many keys for a 32-bit bucket index: {}", num_keys))
}

/// Upper bound on the false positive rate of a full filter.
///
/// A lookup compares one fingerprint against `2 * tags_per_bucket` slots, each matching
/// with probability `1 / 2^bits_per_item`.
pub fn expected_fpr(bits_per_item: u32, tags_per_bucket: u32) -> f64 {
    let slot_match = 0.5f64.powi(bits_per_item as i32);
    1.0 - (1.0 - slot_match).powi(2 * tags_per_bucket as i32)
}

/// Smallest fingerprint width whose full-filter false positive rate stays below
/// `desired_fpr`: `ceil(log2(2b / p))`.
pub fn min_bits_for_fpr(desired_fpr: f64, tags_per_bucket: u32) -> u32 {
    if desired_fpr <= 0.0 || desired_fpr >= 1.0 {
        return 32;
    }
    let bits = (2.0 * tags_per_bucket as f64 / desired_fpr).log2().ceil();
    bits.clamp(1.0, 32.0) as u32
}

/// Calculate Cuckoo filter parameters for given constraints
pub fn optimal_cuckoo_parameters(
    expected_elements: u32,
    desired_fpr: f64,
    tags_per_bucket: u32,
) -> Result<CuckooParameters> {
    let num_buckets = num_buckets_for(expected_elements, tags_per_bucket)?;
    let bits_per_item = min_bits_for_fpr(desired_fpr, tags_per_bucket);

    Ok(CuckooParameters {
        num_buckets,
        bits_per_item,
        expected_fpr: expected_fpr(bits_per_item, tags_per_bucket),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_buckets_rounds_to_power_of_two() {
        assert_eq!(num_buckets_for(10_000, 4).unwrap(), 4096);
        assert_eq!(num_buckets_for(100, 4).unwrap(), 32);
        assert_eq!(num_buckets_for(1, 4).unwrap(), 1);
        assert_eq!(num_buckets_for(3, 4).unwrap(), 1);
    }

    #[test]
    fn test_num_buckets_doubles_when_too_full() {
        // 4000 / 4 = 1000 -> 1024 buckets, 4000 / 4096 slots = 0.977 > 0.96
        assert_eq!(num_buckets_for(4000, 4).unwrap(), 2048);
        // 3900 / 4096 = 0.952 stays
        assert_eq!(num_buckets_for(3900, 4).unwrap(), 1024);
        // 128 keys would exactly fill 32 buckets
        assert_eq!(num_buckets_for(128, 4).unwrap(), 64);
        // 4 keys in a single 4-slot bucket is a full table
        assert_eq!(num_buckets_for(4, 4).unwrap(), 2);
    }

    #[test]
    fn test_num_buckets_errors() {
        assert!(num_buckets_for(100, 0).is_err());
        assert!(num_buckets_for(u32::MAX, 1).is_err());
    }

    #[test]
    fn test_expected_fpr() {
        let fpr = expected_fpr(16, 4);
        assert!(fpr > 0.0);
        assert!((fpr - 8.0 / 65536.0).abs() < 1e-6);
        assert!(expected_fpr(8, 4) > expected_fpr(12, 4));
    }

    #[test]
    fn test_optimal_cuckoo_parameters() {
        let params = optimal_cuckoo_parameters(1000, 0.001, 4).unwrap();

        assert_eq!(params.num_buckets, 512);
        assert_eq!(params.bits_per_item, 13);
        assert!(params.expected_fpr <= 0.001);
        assert_eq!(min_bits_for_fpr(0.0, 4), 32);
    }
}
