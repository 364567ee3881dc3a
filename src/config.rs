//! Filter construction options

use crate::hash::{HashFunction, XxHash64};
use crate::table::{FixedWidthTable, SemiSortedTable, Table};
use crate::{CuckooError, Result};

pub const DEFAULT_NUM_KEYS: u32 = 10_000;
pub const DEFAULT_TAGS_PER_BUCKET: u32 = 4;
pub const DEFAULT_BITS_PER_ITEM: u32 = 16;
pub const DEFAULT_MAX_KICKS: usize = 500;

/// Bucket storage backend
pub enum TableKind {
    /// Uncompressed tags, see [`FixedWidthTable`]
    FixedWidth,
    /// Semi-sorted, permutation-encoded buckets, see [`SemiSortedTable`]
    SemiSorted,
    /// Caller-provided backend; the filter calls [`Table::init`] on it
    Custom(Box<dyn Table>),
}

impl TableKind {
    pub(crate) fn build(self) -> Box<dyn Table> {
        match self {
            TableKind::FixedWidth => Box::new(FixedWidthTable::new()),
            TableKind::SemiSorted => Box::new(SemiSortedTable::new()),
            TableKind::Custom(table) => table,
        }
    }
}

impl std::fmt::Debug for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TableKind::FixedWidth => write!(f, "FixedWidth"),
            TableKind::SemiSorted => write!(f, "SemiSorted"),
            TableKind::Custom(table) => write!(f, "Custom({})", table.name()),
        }
    }
}

/// Options for [`crate::CuckooFilter::new`]
///
/// ```
/// use ferric_cuckoo::{CuckooFilter, FilterConfig, TableKind};
///
/// let config = FilterConfig::default()
///     .with_num_keys(50_000)
///     .with_bits_per_item(13)
///     .with_table(TableKind::SemiSorted)
///     .with_seed(7);
/// let filter = CuckooFilter::new(config).unwrap();
/// assert_eq!(filter.bits_per_tag(), 13);
/// ```
pub struct FilterConfig {
    pub hash: Box<dyn HashFunction>,
    /// Relocation attempts before an item is parked as the victim
    pub max_kicks: usize,
    /// Expected number of items, used to size the table
    pub num_keys: u32,
    pub tags_per_bucket: u32,
    pub bits_per_item: u32,
    pub table: TableKind,
    /// Seed for eviction choices; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            hash: Box::new(XxHash64::default()),
            max_kicks: DEFAULT_MAX_KICKS,
            num_keys: DEFAULT_NUM_KEYS,
            tags_per_bucket: DEFAULT_TAGS_PER_BUCKET,
            bits_per_item: DEFAULT_BITS_PER_ITEM,
            table: TableKind::FixedWidth,
            seed: None,
        }
    }
}

impl FilterConfig {
    pub fn with_hash<H: HashFunction + 'static>(mut self, hash: H) -> Self {
        self.hash = Box::new(hash);
        self
    }

    pub fn with_max_kicks(mut self, max_kicks: usize) -> Self {
        self.max_kicks = max_kicks;
        self
    }

    pub fn with_num_keys(mut self, num_keys: u32) -> Self {
        self.num_keys = num_keys;
        self
    }

    pub fn with_tags_per_bucket(mut self, tags_per_bucket: u32) -> Self {
        self.tags_per_bucket = tags_per_bucket;
        self
    }

    pub fn with_bits_per_item(mut self, bits_per_item: u32) -> Self {
        self.bits_per_item = bits_per_item;
        self
    }

    pub fn with_table(mut self, table: TableKind) -> Self {
        self.table = table;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the options that do not depend on the backend.
    ///
    /// Backend-specific limits (supported widths, associativity) are checked by
    /// [`Table::init`].
    pub fn validate(&self) -> Result<()> {
        if self.num_keys == 0 {
            return Err(CuckooError::InvalidParameter(
                "Number of keys must be > 0".to_string(),
            ));
        }
        if self.tags_per_bucket == 0 {
            return Err(CuckooError::InvalidParameter(
                "Tags per bucket must be > 0".to_string(),
            ));
        }
        if self.bits_per_item == 0 || self.bits_per_item > 32 {
            return Err(CuckooError::InvalidParameter(format!(
                "Bits per item must be 1-32, got {}",
                self.bits_per_item
            )));
        }
        if self.max_kicks == 0 {
            return Err(CuckooError::InvalidParameter(
                "Max kicks must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FilterConfig")
            .field("hash", &self.hash.name())
            .field("max_kicks", &self.max_kicks)
            .field("num_keys", &self.num_keys)
            .field("tags_per_bucket", &self.tags_per_bucket)
            .field("bits_per_item", &self.bits_per_item)
            .field("table", &self.table)
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Fnv1a;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.max_kicks, 500);
        assert_eq!(config.num_keys, 10_000);
        assert_eq!(config.tags_per_bucket, 4);
        assert_eq!(config.bits_per_item, 16);
        assert!(matches!(config.table, TableKind::FixedWidth));
        assert_eq!(config.hash.name(), "xxhash64(seed=0)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = FilterConfig::default()
            .with_hash(Fnv1a::new())
            .with_max_kicks(64)
            .with_num_keys(128)
            .with_tags_per_bucket(2)
            .with_bits_per_item(8)
            .with_table(TableKind::SemiSorted)
            .with_seed(3);

        assert_eq!(config.hash.name(), "fnv1a");
        assert_eq!(config.max_kicks, 64);
        assert_eq!(config.num_keys, 128);
        assert_eq!(config.tags_per_bucket, 2);
        assert_eq!(config.bits_per_item, 8);
        assert_eq!(config.seed, Some(3));
        assert!(format!("{:?}", config).contains("SemiSorted"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(FilterConfig::default().with_num_keys(0).validate().is_err());
        assert!(FilterConfig::default().with_tags_per_bucket(0).validate().is_err());
        assert!(FilterConfig::default().with_bits_per_item(0).validate().is_err());
        assert!(FilterConfig::default().with_bits_per_item(33).validate().is_err());
        assert!(FilterConfig::default().with_max_kicks(0).validate().is_err());
    }

    #[test]
    fn test_custom_table_debug() {
        let kind = TableKind::Custom(Box::new(FixedWidthTable::new()));
        assert_eq!(format!("{:?}", kind), "Custom(fixed-width)");
    }
}
