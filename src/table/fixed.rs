//! Fixed-width bucket table
//!
//! Every bucket is a byte span holding `tags_per_bucket` tags of `bits_per_item` bits,
//! packed little-endian with slot `j` at bits `[j * bits, (j + 1) * bits)`.

use super::{tag_mask, Insertion, Table};
use crate::{CuckooError, Result};
use log::debug;
use rand::{Rng, RngCore};

/// Tag widths the table knows how to pack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotWidth {
    Two,
    Four,
    Eight,
    Twelve,
    Sixteen,
    ThirtyTwo,
}

impl SlotWidth {
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            2 => Some(SlotWidth::Two),
            4 => Some(SlotWidth::Four),
            8 => Some(SlotWidth::Eight),
            12 => Some(SlotWidth::Twelve),
            16 => Some(SlotWidth::Sixteen),
            32 => Some(SlotWidth::ThirtyTwo),
            _ => None,
        }
    }
}

/// Supported `bits_per_item` values
pub const SUPPORTED_BITS: [u32; 6] = [2, 4, 8, 12, 16, 32];

/// Uncompressed bucket table
#[derive(Debug, Clone)]
pub struct FixedWidthTable {
    num_buckets: u32,
    tags_per_bucket: u32,
    bits_per_item: u32,
    bytes_per_bucket: usize,
    width: SlotWidth,
    tag_mask: u32,
    buckets: Vec<u8>,
}

impl FixedWidthTable {
    /// Create an empty table; storage is allocated by [`Table::init`]
    pub fn new() -> Self {
        FixedWidthTable {
            num_buckets: 0,
            tags_per_bucket: 0,
            bits_per_item: 0,
            bytes_per_bucket: 0,
            width: SlotWidth::Sixteen,
            tag_mask: 0,
            buckets: Vec::new(),
        }
    }

    /// Bytes used by the bucket array
    pub fn size_in_bytes(&self) -> usize {
        self.buckets.len()
    }

    fn span(&self, index: u32) -> &[u8] {
        let start = index as usize * self.bytes_per_bucket;
        &self.buckets[start..start + self.bytes_per_bucket]
    }

    fn span_mut(&mut self, index: u32) -> &mut [u8] {
        let start = index as usize * self.bytes_per_bucket;
        &mut self.buckets[start..start + self.bytes_per_bucket]
    }

    fn read_tag(&self, index: u32, slot: u32) -> u32 {
        let fp = self.span(index);
        let j = slot as usize;
        let tag = match self.width {
            SlotWidth::Two => (fp[j >> 2] >> ((j & 3) << 1)) as u32,
            SlotWidth::Four => (fp[j >> 1] >> ((j & 1) << 2)) as u32,
            SlotWidth::Eight => fp[j] as u32,
            SlotWidth::Twelve => {
                let pos = j + (j >> 1);
                (fp[pos] as u32 | (fp[pos + 1] as u32) << 8) >> ((j & 1) << 2)
            }
            SlotWidth::Sixteen => {
                let pos = j << 1;
                u16::from_le_bytes([fp[pos], fp[pos + 1]]) as u32
            }
            SlotWidth::ThirtyTwo => {
                let pos = j << 2;
                u32::from_le_bytes([fp[pos], fp[pos + 1], fp[pos + 2], fp[pos + 3]])
            }
        };
        tag & self.tag_mask
    }

    fn write_tag(&mut self, index: u32, slot: u32, tag: u32) {
        let tag = tag & self.tag_mask;
        let width = self.width;
        let fp = self.span_mut(index);
        let j = slot as usize;
        match width {
            SlotWidth::Two => {
                let shift = (j & 3) << 1;
                fp[j >> 2] &= !(0x03 << shift);
                fp[j >> 2] |= (tag as u8) << shift;
            }
            SlotWidth::Four => {
                let pos = j >> 1;
                if j & 1 == 0 {
                    fp[pos] &= 0xf0;
                    fp[pos] |= tag as u8;
                } else {
                    fp[pos] &= 0x0f;
                    fp[pos] |= (tag as u8) << 4;
                }
            }
            SlotWidth::Eight => fp[j] = tag as u8,
            SlotWidth::Twelve => {
                // Even slots start on a byte, odd slots on the upper nibble
                let pos = j + (j >> 1);
                if j & 1 == 0 {
                    fp[pos] = tag as u8;
                    fp[pos + 1] &= 0xf0;
                    fp[pos + 1] |= (tag >> 8) as u8;
                } else {
                    fp[pos] &= 0x0f;
                    fp[pos] |= (tag << 4) as u8;
                    fp[pos + 1] = (tag >> 4) as u8;
                }
            }
            SlotWidth::Sixteen => {
                let pos = j << 1;
                fp[pos..pos + 2].copy_from_slice(&(tag as u16).to_le_bytes());
            }
            SlotWidth::ThirtyTwo => {
                let pos = j << 2;
                fp[pos..pos + 4].copy_from_slice(&tag.to_le_bytes());
            }
        }
    }
}

impl Default for FixedWidthTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Table for FixedWidthTable {
    fn init(&mut self, num_buckets: u32, tags_per_bucket: u32, bits_per_item: u32) -> Result<()> {
        let width = SlotWidth::from_bits(bits_per_item).ok_or_else(|| {
            CuckooError::InvalidParameter(format!(
                "Fixed-width table supports {:?} bits per item, got {}",
                SUPPORTED_BITS, bits_per_item
            ))
        })?;
        if tags_per_bucket == 0 {
            return Err(CuckooError::InvalidParameter(
                "Tags per bucket must be > 0".to_string(),
            ));
        }

        // Bits per bucket must fit a u32 and the whole array must be allocatable
        let bytes_per_bucket = bits_per_item
            .checked_mul(tags_per_bucket)
            .map(|bits| (bits as usize + 7) >> 3);
        let total = bytes_per_bucket
            .and_then(|bytes| bytes.checked_mul(num_buckets as usize))
            .filter(|&total| total <= isize::MAX as usize);
        let (bytes_per_bucket, total) = match (bytes_per_bucket, total) {
            (Some(bytes), Some(total)) => (bytes, total),
            _ => {
                return Err(CuckooError::InvalidParameter(format!(
                    "Table too large: {} buckets x {} tags x {} bits",
                    num_buckets, tags_per_bucket, bits_per_item
                )))
            }
        };

        self.num_buckets = num_buckets;
        self.tags_per_bucket = tags_per_bucket;
        self.bits_per_item = bits_per_item;
        self.width = width;
        self.tag_mask = tag_mask(bits_per_item);
        self.bytes_per_bucket = bytes_per_bucket;
        self.buckets = vec![0u8; total];

        debug!(
            "fixed-width table: {} buckets x {} tags x {} bits ({} bytes)",
            num_buckets,
            tags_per_bucket,
            bits_per_item,
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
        for j in 0..self.tags_per_bucket {
            if self.read_tag(index, j) == 0 {
                self.write_tag(index, j, tag);
                return Insertion::Stored;
            }
        }

        if !kickout {
            return Insertion::Rejected(tag);
        }

        let r = rng.gen_range(0..self.tags_per_bucket);
        let old = self.read_tag(index, r);
        self.write_tag(index, r, tag);
        Insertion::Evicted(old)
    }

    fn delete(&mut self, index: u32, tag: u32) -> bool {
        for j in 0..self.tags_per_bucket {
            if self.read_tag(index, j) == tag {
                self.write_tag(index, j, 0);
                return true;
            }
        }
        false
    }

    fn find(&self, index: u32, tag: u32) -> bool {
        (0..self.tags_per_bucket).any(|j| self.read_tag(index, j) == tag)
    }

    fn size_in_tags(&self) -> usize {
        self.num_buckets as usize * self.tags_per_bucket as usize
    }

    fn bucket_load(&self, index: u32) -> usize {
        (0..self.tags_per_bucket)
            .filter(|&j| self.read_tag(index, j) != 0)
            .count()
    }

    fn clear(&mut self) {
        self.buckets.fill(0);
    }

    fn name(&self) -> &'static str {
        "fixed-width"
    }

    fn info(&self) -> String {
        format!(
            "FixedWidthTable with tag size: {} bits\n\
             - Associativity: {}\n\
             - Total # of rows: {}\n\
             - Total # slots: {}",
            self.bits_per_item,
            self.tags_per_bucket,
            self.num_buckets,
            self.size_in_tags()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(num_buckets: u32, tags_per_bucket: u32, bits: u32) -> FixedWidthTable {
        let mut t = FixedWidthTable::new();
        t.init(num_buckets, tags_per_bucket, bits).unwrap();
        t
    }

    #[test]
    fn test_rejects_unsupported_widths() {
        for bits in [0, 1, 3, 5, 7, 9, 13, 17, 24, 33] {
            let mut t = FixedWidthTable::new();
            assert!(t.init(16, 4, bits).is_err(), "width {} accepted", bits);
        }
        assert!(FixedWidthTable::new().init(16, 0, 8).is_err());
    }

    #[test]
    fn test_rejects_oversized_buckets() {
        // 32 bits x 2^28 tags does not fit a 32-bit bit count
        let err = FixedWidthTable::new().init(1, 1 << 28, 32).unwrap_err();
        assert!(matches!(err, CuckooError::InvalidParameter(_)));
        assert!(err.to_string().contains("too large"));
        assert!(FixedWidthTable::new().init(1, u32::MAX, 2).is_err());
    }

    #[test]
    fn test_bucket_span_sizes() {
        assert_eq!(table(10, 4, 2).size_in_bytes(), 10);
        assert_eq!(table(10, 4, 4).size_in_bytes(), 20);
        assert_eq!(table(10, 4, 12).size_in_bytes(), 60);
        assert_eq!(table(10, 4, 16).size_in_bytes(), 80);
        assert_eq!(table(10, 3, 12).size_in_bytes(), 50);
    }

    /// Writing every slot with a distinct value must not bleed into neighbours
    #[test]
    fn test_slots_are_independent() {
        for bits in SUPPORTED_BITS {
            let mut t = table(4, 4, bits);
            let mask = tag_mask(bits);
            let values: Vec<u32> = (0..4u32)
                .map(|j| (0x9e37_79b9u32.wrapping_mul(j + 1) & mask).max(1))
                .collect();

            for (j, &v) in values.iter().enumerate() {
                t.write_tag(2, j as u32, v);
            }
            for (j, &v) in values.iter().enumerate() {
                assert_eq!(t.read_tag(2, j as u32), v, "bits {} slot {}", bits, j);
            }
            // Neighbouring buckets stay empty
            assert_eq!(t.bucket_load(1), 0);
            assert_eq!(t.bucket_load(3), 0);

            // Clearing one slot leaves the rest intact
            t.write_tag(2, 1, 0);
            assert_eq!(t.read_tag(2, 0), values[0]);
            assert_eq!(t.read_tag(2, 1), 0);
            assert_eq!(t.read_tag(2, 2), values[2]);
            assert_eq!(t.read_tag(2, 3), values[3]);
        }
    }

    #[test]
    fn test_twelve_bit_layout() {
        let mut t = table(1, 4, 12);
        t.write_tag(0, 0, 0xabc);
        t.write_tag(0, 1, 0x123);
        assert_eq!(&t.buckets[0..3], &[0xbc, 0x3a, 0x12]);
    }

    #[test]
    fn test_two_bit_delete_clears_slot() {
        let mut t = table(2, 4, 2);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(t.insert(0, 3, false, &mut rng), Insertion::Stored);
        assert!(t.delete(0, 3));
        assert!(!t.find(0, 3));
        assert_eq!(t.insert(0, 1, false, &mut rng), Insertion::Stored);
        assert!(t.find(0, 1));
        assert!(!t.find(0, 3));
    }

    #[test]
    fn test_wide_buckets() {
        let mut t = table(4, 8, 16);
        let mut rng = StdRng::seed_from_u64(3);
        for tag in 1..=8 {
            assert_eq!(t.insert(3, tag, false, &mut rng), Insertion::Stored);
        }
        assert_eq!(t.bucket_load(3), 8);
        assert_eq!(t.insert(3, 9, false, &mut rng), Insertion::Rejected(9));
        assert_eq!(t.size_in_tags(), 32);
    }

    #[test]
    fn test_eviction_is_reproducible() {
        let run = |seed| {
            let mut t = table(1, 4, 8);
            let mut rng = StdRng::seed_from_u64(seed);
            for tag in 1..=4 {
                t.insert(0, tag, false, &mut rng);
            }
            (0..16)
                .map(|k| t.insert(0, 10 + k, true, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_info_mentions_layout() {
        let info = table(16, 4, 12).info();
        assert!(info.contains("12 bits"));
        assert!(info.contains("64"));
    }
}
