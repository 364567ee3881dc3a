//! Cuckoo filter
//!
//! Each item maps to a primary bucket and a fingerprint. Its alternate bucket is derived
//! from the primary bucket and the fingerprint alone, so a fingerprint can be moved
//! between its two buckets without knowing the original item:
//!
//! ```text
//! i1 = hash_hi(x) & (n - 1)
//! i2 = (i1 ^ (tag * 0x5bd1e995)) & (n - 1)
//! ```
//!
//! When both buckets are full a random occupant is kicked to its own alternate bucket,
//! up to `max_kicks` times. A fingerprint still homeless after that is parked in a single
//! victim slot and the filter refuses further inserts until a delete makes room.

use crate::config::FilterConfig;
use crate::hash::HashFunction;
use crate::table::{tag_mask, Table};
use crate::utils;
use crate::{CuckooError, Result};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Multiplier for the alternate bucket, the MurmurHash2 mixing constant
const ALT_INDEX_MULTIPLIER: u32 = 0x5bd1_e995;

/// Fingerprint that could not be placed within the kick budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Victim {
    index: u32,
    tag: u32,
}

/// Alternate bucket of `tag` when it sits in bucket `index`.
///
/// XOR with a value that depends only on `tag` is its own inverse, and masking keeps the
/// result in range because `num_buckets` is a power of two.
#[inline]
pub fn alt_index(num_buckets: u32, index: u32, tag: u32) -> u32 {
    (index ^ tag.wrapping_mul(ALT_INDEX_MULTIPLIER)) & (num_buckets - 1)
}

/// A Cuckoo filter over byte-string items
pub struct CuckooFilter {
    hash: Box<dyn HashFunction>,
    table: Box<dyn Table>,
    rng: StdRng,
    max_kicks: usize,
    num_buckets: u32,
    tags_per_bucket: u32,
    bits_per_item: u32,
    tag_mask: u32,
    /// Fingerprints stored in the table, the victim excluded
    count: usize,
    victim: Option<Victim>,
}

impl CuckooFilter {
    /// Create a filter from `config`.
    ///
    /// Fails if an option is out of range or the backend does not support the requested
    /// `bits_per_item`/`tags_per_bucket` combination.
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;

        let FilterConfig {
            hash,
            max_kicks,
            num_keys,
            tags_per_bucket,
            bits_per_item,
            table,
            seed,
        } = config;

        let num_buckets = utils::num_buckets_for(num_keys, tags_per_bucket)?;
        let mut table = table.build();
        table.init(num_buckets, tags_per_bucket, bits_per_item)?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            "cuckoo filter: {} keys -> {} buckets x {} tags, {} bits/tag, {} table, {}",
            num_keys,
            num_buckets,
            tags_per_bucket,
            bits_per_item,
            table.name(),
            hash.name()
        );

        Ok(CuckooFilter {
            hash,
            table,
            rng,
            max_kicks,
            num_buckets,
            tags_per_bucket,
            bits_per_item,
            tag_mask: tag_mask(bits_per_item),
            count: 0,
            victim: None,
        })
    }

    /// Create a filter with default settings sized for `num_keys` items
    pub fn with_capacity(num_keys: u32) -> Result<Self> {
        Self::new(FilterConfig::default().with_num_keys(num_keys))
    }

    /// Add an item.
    ///
    /// Returns [`CuckooError::Full`] while a victim is pending. The insert that overflows
    /// the kick budget still succeeds: the last displaced fingerprint becomes the victim,
    /// so one item beyond the table's capacity is accepted before inserts start failing.
    pub fn insert(&mut self, item: &[u8]) -> Result<()> {
        if self.victim.is_some() {
            return Err(CuckooError::Full);
        }

        let (index, tag) = self.index_and_tag(item);
        self.place(index, tag);
        Ok(())
    }

    /// Check if an item might be in the filter.
    ///
    /// `Ok(false)` means the item was definitely never inserted (or has been deleted).
    pub fn contains(&self, item: &[u8]) -> Result<bool> {
        let (i1, tag) = self.index_and_tag(item);
        let i2 = self.alt_index(i1, tag);
        self.check_symmetry(i1, i2, tag)?;

        if self.victim_matches(i1, i2, tag) {
            return Ok(true);
        }
        Ok(self.table.find(i1, tag) || self.table.find(i2, tag))
    }

    /// Remove one occurrence of an item. Returns `false` if it was not found.
    ///
    /// Deleting only items that were inserted keeps the filter free of false negatives;
    /// deleting a false positive removes some other item's fingerprint.
    pub fn delete(&mut self, item: &[u8]) -> bool {
        let (i1, tag) = self.index_and_tag(item);
        let i2 = self.alt_index(i1, tag);

        if self.victim_matches(i1, i2, tag) {
            self.victim = None;
            return true;
        }

        if !self.table.delete(i1, tag) && !self.table.delete(i2, tag) {
            return false;
        }
        self.count -= 1;

        // A slot just opened up, give the victim another chance
        if let Some(victim) = self.victim.take() {
            trace!(
                "re-inserting victim tag {:#x} at bucket {}",
                victim.tag,
                victim.index
            );
            self.place(victim.index, victim.tag);
        }
        true
    }

    /// Fraction of table slots in use
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.table.size_in_tags() as f64
    }

    /// Table bits amortised over the stored items, `8 * slots / items`.
    ///
    /// Infinite for an empty filter.
    pub fn bits_per_item(&self) -> f64 {
        8.0 * self.table.size_in_tags() as f64 / self.count as f64
    }

    /// Number of items held, the pending victim included
    pub fn len(&self) -> usize {
        self.count + self.victim.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a victim is pending, in which case inserts fail
    pub fn is_full(&self) -> bool {
        self.victim.is_some()
    }

    /// Total slot capacity of the table
    pub fn capacity(&self) -> usize {
        self.table.size_in_tags()
    }

    pub fn num_buckets(&self) -> u32 {
        self.num_buckets
    }

    pub fn tags_per_bucket(&self) -> u32 {
        self.tags_per_bucket
    }

    /// Configured fingerprint width
    pub fn bits_per_tag(&self) -> u32 {
        self.bits_per_item
    }

    pub fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    /// Description of the bucket table
    pub fn table_info(&self) -> String {
        self.table.info()
    }

    /// Occupied slots per bucket
    pub fn bucket_loads(&self) -> Vec<usize> {
        (0..self.num_buckets)
            .map(|index| self.table.bucket_load(index))
            .collect()
    }

    /// Remove every item, keeping the allocation
    pub fn clear(&mut self) {
        self.table.clear();
        self.count = 0;
        self.victim = None;
        debug!("cuckoo filter cleared ({} buckets)", self.num_buckets);
    }

    /// Get statistics about the filter
    pub fn stats(&self) -> CuckooStats {
        CuckooStats {
            backend: self.table.name(),
            hash: self.hash.name(),
            num_buckets: self.num_buckets,
            tags_per_bucket: self.tags_per_bucket,
            bits_per_tag: self.bits_per_item,
            capacity: self.capacity(),
            elements: self.len(),
            load_factor: self.load_factor(),
            bits_per_item: self.bits_per_item(),
            has_victim: self.is_full(),
            expected_fpr: utils::expected_fpr(self.bits_per_item, self.tags_per_bucket),
        }
    }

    /// Run the kick loop starting at bucket `index`.
    ///
    /// Returns `false` if the budget ran out and a fingerprint was parked as the victim.
    fn place(&mut self, mut index: u32, mut tag: u32) -> bool {
        for kick in 0..self.max_kicks {
            match self.table.insert(index, tag, kick > 0, &mut self.rng).displaced() {
                None => {
                    self.count += 1;
                    return true;
                }
                Some(displaced) => {
                    tag = displaced;
                    index = self.alt_index(index, tag);
                }
            }
        }

        warn!(
            "no slot after {} kicks, parking tag {:#x} for bucket {} as victim (load {:.3})",
            self.max_kicks,
            tag,
            index,
            self.load_factor()
        );
        self.victim = Some(Victim { index, tag });
        false
    }

    fn index_and_tag(&self, item: &[u8]) -> (u32, u32) {
        let hash = self.hash.hash(item);
        let index = (hash >> 32) as u32 & (self.num_buckets - 1);
        let tag = match hash as u32 & self.tag_mask {
            0 => 1,
            tag => tag,
        };
        (index, tag)
    }

    #[inline]
    fn alt_index(&self, index: u32, tag: u32) -> u32 {
        alt_index(self.num_buckets, index, tag)
    }

    fn check_symmetry(&self, i1: u32, i2: u32, tag: u32) -> Result<()> {
        if self.alt_index(i2, tag) != i1 {
            return Err(CuckooError::AltIndexAsymmetry { index: i1, tag });
        }
        Ok(())
    }

    fn victim_matches(&self, i1: u32, i2: u32, tag: u32) -> bool {
        matches!(self.victim, Some(v) if v.tag == tag && (v.index == i1 || v.index == i2))
    }
}

impl std::fmt::Debug for CuckooFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CuckooFilter")
            .field("table", &self.table.name())
            .field("hash", &self.hash.name())
            .field("num_buckets", &self.num_buckets)
            .field("tags_per_bucket", &self.tags_per_bucket)
            .field("bits_per_item", &self.bits_per_item)
            .field("count", &self.count)
            .field("victim", &self.victim)
            .finish()
    }
}

/// Statistics about a Cuckoo filter
#[derive(Debug, Clone)]
pub struct CuckooStats {
    pub backend: &'static str,
    pub hash: String,
    pub num_buckets: u32,
    pub tags_per_bucket: u32,
    pub bits_per_tag: u32,
    pub capacity: usize,
    pub elements: usize,
    pub load_factor: f64,
    pub bits_per_item: f64,
    pub has_victim: bool,
    pub expected_fpr: f64,
}

impl std::fmt::Display for CuckooStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "CuckooFilter Stats:\n\
             - Table: {} ({} buckets × {} tags × {} bits)\n\
             - Hash: {}\n\
             - Elements: {}/{}\n\
             - Load factor: {:.3}\n\
             - Bits per item: {:.2}\n\
             - Victim pending: {}\n\
             - Expected FPR (full): {:.6}",
            self.backend,
            self.num_buckets,
            self.tags_per_bucket,
            self.bits_per_tag,
            self.hash,
            self.elements,
            self.capacity,
            self.load_factor,
            self.bits_per_item,
            self.has_victim,
            self.expected_fpr
        )
    }
}
