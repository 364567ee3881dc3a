//! Bucket storage backends
//!
//! The filter talks to its buckets only through [`Table`], so storage layouts can be
//! swapped without touching the cuckoo algorithm.

pub mod fixed;
pub mod semi_sorted;

pub use fixed::FixedWidthTable;
pub use semi_sorted::SemiSortedTable;

use crate::Result;
use rand::RngCore;

/// Outcome of [`Table::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The tag took an empty slot
    Stored,
    /// The bucket was full and eviction was not allowed; the tag is handed back untouched
    Rejected(u32),
    /// The tag replaced a random occupant, which is handed back for re-homing
    Evicted(u32),
}

impl Insertion {
    /// Tag the caller still has to place somewhere, if any
    pub fn displaced(self) -> Option<u32> {
        match self {
            Insertion::Stored => None,
            Insertion::Rejected(tag) | Insertion::Evicted(tag) => Some(tag),
        }
    }
}

/// Storage contract shared by all bucket tables.
///
/// Slots hold fingerprints; the value 0 marks an empty slot.
pub trait Table: Send {
    /// Allocate zeroed storage for `num_buckets` buckets
    fn init(&mut self, num_buckets: u32, tags_per_bucket: u32, bits_per_item: u32) -> Result<()>;

    /// Put `tag` in bucket `index`, evicting a random occupant when `kickout` is set
    fn insert(&mut self, index: u32, tag: u32, kickout: bool, rng: &mut dyn RngCore)
        -> Insertion;

    /// Remove one copy of `tag` from bucket `index`
    fn delete(&mut self, index: u32, tag: u32) -> bool;

    /// Whether bucket `index` holds `tag`
    fn find(&self, index: u32, tag: u32) -> bool;

    /// Total slot capacity
    fn size_in_tags(&self) -> usize;

    /// Number of occupied slots in bucket `index`
    fn bucket_load(&self, index: u32) -> usize;

    /// Zero every bucket, keeping the allocation
    fn clear(&mut self);

    /// Short identifier of the backend
    fn name(&self) -> &'static str;

    /// Human-readable description of the layout
    fn info(&self) -> String;
}

/// Mask selecting the low `bits` bits of a tag
#[inline]
pub(crate) fn tag_mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}
