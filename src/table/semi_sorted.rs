//! Semi-sorted bucket table
//!
//! Four tags per bucket. The tags of a bucket are kept sorted by their low nibble, so the
//! four low nibbles form a multiset that [`PermutationEncoding`] squeezes into 12 bits.
//! The remaining `bits_per_item - 4` "direct" bits of each tag are stored verbatim:
//!
//! ```text
//! bit 0            12             12+d          12+2d         12+3d        12+4d
//!     | codeword   | high(tag0)   | high(tag1)  | high(tag2)  | high(tag3)  |
//! ```
//!
//! Buckets are laid back to back, so buckets of 20 and 28 bits start on a nibble boundary
//! every other index. The byte array carries 7 bytes of tail padding so any bucket can be
//! loaded as one little-endian `u64` window.

use super::{tag_mask, Insertion, Table};
use crate::permutation::{PermutationEncoding, CODEWORD_MASK};
use crate::{CuckooError, Result};
use log::debug;
use rand::{Rng, RngCore};

/// Associativity of the semi-sorted layout
pub const TAGS_PER_BUCKET: u32 = 4;

/// Supported `(bits_per_item, bits_per_bucket)` pairs
pub const SUPPORTED_LAYOUTS: [(u32, u32); 7] = [
    (5, 16),
    (6, 20),
    (7, 24),
    (8, 28),
    (9, 32),
    (13, 48),
    (17, 64),
];

const WINDOW_PADDING: usize = 7;

/// Compressed bucket table using semi-sorting and permutation encoding
pub struct SemiSortedTable {
    num_buckets: u32,
    bits_per_item: u32,
    dir_bits_per_tag: u32,
    bits_per_bucket: u32,
    dir_bits_mask: u32,
    tag_mask: u32,
    buckets: Vec<u8>,
    perm: &'static PermutationEncoding,
}

impl SemiSortedTable {
    /// Create an empty table; storage is allocated by [`Table::init`]
    pub fn new() -> Self {
        SemiSortedTable {
            num_buckets: 0,
            bits_per_item: 0,
            dir_bits_per_tag: 0,
            bits_per_bucket: 0,
            dir_bits_mask: 0,
            tag_mask: 0,
            buckets: Vec::new(),
            perm: PermutationEncoding::shared(),
        }
    }

    /// Bytes used by the bucket array, padding included
    pub fn size_in_bytes(&self) -> usize {
        self.buckets.len()
    }

    /// Byte offset and bit shift of bucket `index`
    #[inline]
    fn locate(&self, index: u32) -> (usize, u32) {
        let bit = self.bits_per_bucket as u64 * index as u64;
        ((bit >> 3) as usize, (bit & 7) as u32)
    }

    #[inline]
    fn bucket_mask(&self) -> u64 {
        if self.bits_per_bucket >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits_per_bucket) - 1
        }
    }

    #[inline]
    fn load_window(&self, pos: usize) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.buckets[pos..pos + 8]);
        u64::from_le_bytes(word)
    }

    #[inline]
    fn store_window(&mut self, pos: usize, window: u64) {
        self.buckets[pos..pos + 8].copy_from_slice(&window.to_le_bytes());
    }

    /// Decode bucket `index` into its four tags, in stored (sorted) order
    fn read_tags(&self, index: u32) -> [u32; 4] {
        let (pos, shift) = self.locate(index);
        let bucket = (self.load_window(pos) >> shift) & self.bucket_mask();

        let low_bits = self.perm.decode(bucket as u16 & CODEWORD_MASK);
        let mut tags = [0u32; 4];
        for (j, tag) in tags.iter_mut().enumerate() {
            // High bits of tag j sit right after the codeword, already aligned at bit 4
            let high = (bucket >> (8 + j as u32 * self.dir_bits_per_tag)) as u32;
            *tag = (high & self.dir_bits_mask) | low_bits[j] as u32;
        }
        tags
    }

    /// Sort, encode and store four tags into bucket `index`
    fn write_tags(&mut self, index: u32, mut tags: [u32; 4]) {
        for tag in tags.iter_mut() {
            *tag &= self.tag_mask;
        }
        sort_tags(&mut tags);

        let low_bits = tags.map(|tag| (tag & 0x0f) as u8);
        let mut bucket = self.perm.encode(low_bits) as u64;
        for (j, &tag) in tags.iter().enumerate() {
            bucket |= ((tag & !0x0f) as u64) << (8 + j as u32 * self.dir_bits_per_tag);
        }

        let (pos, shift) = self.locate(index);
        let field = self.bucket_mask() << shift;
        let window = (self.load_window(pos) & !field) | (bucket << shift);
        self.store_window(pos, window);
    }
}

/// Five-comparator sorting network over the low nibbles
fn sort_tags(tags: &mut [u32; 4]) {
    fn sort_pair(tags: &mut [u32; 4], a: usize, b: usize) {
        if (tags[a] & 0x0f) > (tags[b] & 0x0f) {
            tags.swap(a, b);
        }
    }
    sort_pair(tags, 0, 2);
    sort_pair(tags, 1, 3);
    sort_pair(tags, 0, 1);
    sort_pair(tags, 2, 3);
    sort_pair(tags, 1, 2);
}

impl Default for SemiSortedTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SemiSortedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SemiSortedTable")
            .field("num_buckets", &self.num_buckets)
            .field("bits_per_item", &self.bits_per_item)
            .field("bits_per_bucket", &self.bits_per_bucket)
            .finish()
    }
}

impl Table for SemiSortedTable {
    fn init(&mut self, num_buckets: u32, tags_per_bucket: u32, bits_per_item: u32) -> Result<()> {
        if tags_per_bucket != TAGS_PER_BUCKET {
            return Err(CuckooError::InvalidParameter(format!(
                "Semi-sorted table needs {} tags per bucket, got {}",
                TAGS_PER_BUCKET, tags_per_bucket
            )));
        }
        let bits_per_bucket = SUPPORTED_LAYOUTS
            .iter()
            .find(|&&(bits, _)| bits == bits_per_item)
            .map(|&(_, bucket_bits)| bucket_bits)
            .ok_or_else(|| {
                CuckooError::InvalidParameter(format!(
                    "Semi-sorted table supports {:?} bits per item, got {}",
                    SUPPORTED_LAYOUTS.map(|(bits, _)| bits),
                    bits_per_item
                ))
            })?;

        self.num_buckets = num_buckets;
        self.bits_per_item = bits_per_item;
        self.dir_bits_per_tag = bits_per_item - 4;
        self.bits_per_bucket = bits_per_bucket;
        self.dir_bits_mask = ((1u32 << self.dir_bits_per_tag) - 1) << 4;
        self.tag_mask = tag_mask(bits_per_item);
        debug_assert_eq!(self.bits_per_bucket, (3 + self.dir_bits_per_tag) * 4);

        let data_bytes = ((bits_per_bucket as u64 * num_buckets as u64 + 7) >> 3) as usize;
        self.buckets = vec![0u8; data_bytes + WINDOW_PADDING];

        // The all-zero bucket must decode to four empty slots
        debug_assert_eq!(self.perm.decode(0), [0, 0, 0, 0]);

        debug!(
            "semi-sorted table: {} buckets x {} bits ({} bytes)",
            num_buckets,
            bits_per_bucket,
            self.buckets.len()
        );
        Ok(())
    }

    fn insert(
        &mut self,
        index: u32,
        tag: u32,
        kickout: bool,
        rng: &mut dyn RngCore,
    ) -> Insertion {
        let mut tags = self.read_tags(index);

        if let Some(slot) = tags.iter().position(|&t| t == 0) {
            tags[slot] = tag;
            self.write_tags(index, tags);
            return Insertion::Stored;
        }

        if !kickout {
            return Insertion::Rejected(tag);
        }

        let r = rng.gen_range(0..TAGS_PER_BUCKET as usize);
        let old = tags[r];
        tags[r] = tag;
        self.write_tags(index, tags);
        Insertion::Evicted(old)
    }

    fn delete(&mut self, index: u32, tag: u32) -> bool {
        let mut tags = self.read_tags(index);
        match tags.iter().position(|&t| t == tag) {
            Some(slot) => {
                tags[slot] = 0;
                self.write_tags(index, tags);
                true
            }
            None => false,
        }
    }

    fn find(&self, index: u32, tag: u32) -> bool {
        self.read_tags(index).contains(&tag)
    }

    fn size_in_tags(&self) -> usize {
        self.num_buckets as usize * TAGS_PER_BUCKET as usize
    }

    fn bucket_load(&self, index: u32) -> usize {
        self.read_tags(index).iter().filter(|&&t| t != 0).count()
    }

    fn clear(&mut self) {
        self.buckets.fill(0);
    }

    fn name(&self) -> &'static str {
        "semi-sorted"
    }

    fn info(&self) -> String {
        format!(
            "SemiSortedTable with tag size: {} bits\n\
             - 4 packed bits (3 bits after compression) and {} direct bits\n\
             - Associativity: {}\n\
             - Total # of rows: {}\n\
             - Total # slots: {}",
            self.bits_per_item,
            self.dir_bits_per_tag,
            TAGS_PER_BUCKET,
            self.num_buckets,
            self.size_in_tags()
        )
    }
}
