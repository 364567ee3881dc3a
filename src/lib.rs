//! # Ferric Cuckoo
//!
//! A compact Cuckoo filter for approximate set membership with deletion support.
//! Buckets live in a pluggable [`Table`]: either a plain fixed-width bit-packed array
//! or a semi-sorted array that compresses the low nibbles of every bucket with a
//! permutation code, saving about one bit per fingerprint.

pub mod config;
pub mod filter;
pub mod hash;
pub mod permutation;
pub mod table;
pub mod utils;

pub use config::{FilterConfig, TableKind};
pub use filter::{CuckooFilter, CuckooStats};
pub use hash::{Fnv1a, HashFunction, XxHash64};
pub use permutation::PermutationEncoding;
pub use table::{FixedWidthTable, Insertion, SemiSortedTable, Table};

// Python bindings
#[cfg(feature = "python")]
pub mod python_module;

/// Common error types for the library
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CuckooError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A victim is pending, so the filter cannot take more items.
    #[error("Filter is full: rebuild it with a larger capacity")]
    Full,
    /// The alternate bucket function stopped being its own inverse.
    #[error("Alternate index is not symmetric for bucket {index} and tag {tag:#x}")]
    AltIndexAsymmetry { index: u32, tag: u32 },
}

pub type Result<T> = std::result::Result<T, CuckooError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_cuckoo_filter() {
        let mut filter = CuckooFilter::with_capacity(1000).unwrap();

        filter.insert(b"42").unwrap();
        filter.insert(b"1337").unwrap();
        filter.insert(b"9999").unwrap();

        assert!(filter.contains(b"42").unwrap());
        assert!(filter.contains(b"1337").unwrap());
        assert!(filter.contains(b"9999").unwrap());
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_basic_semi_sorted_filter() {
        let config = FilterConfig::default()
            .with_num_keys(1000)
            .with_bits_per_item(13)
            .with_table(TableKind::SemiSorted);
        let mut filter = CuckooFilter::new(config).unwrap();

        filter.insert(b"42").unwrap();
        filter.insert(b"1337").unwrap();

        assert!(filter.contains(b"42").unwrap());
        assert!(filter.contains(b"1337").unwrap());
        assert!(filter.delete(b"42"));
        assert!(!filter.contains(b"42").unwrap());
    }

    #[test]
    fn test_error_messages() {
        let err = CuckooError::InvalidParameter("bits per item must be 1-32".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: bits per item must be 1-32");

        let err = CuckooError::AltIndexAsymmetry { index: 3, tag: 0x1f };
        assert!(err.to_string().contains("bucket 3"));
        assert!(err.to_string().contains("0x1f"));
    }
}
