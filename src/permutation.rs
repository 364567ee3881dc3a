//! Permutation encoding of sorted nibble quadruples
//!
//! A bucket of four 4-bit values, once sorted, is one of C(19, 4) = 3876 multisets.
//! Numbering them lexicographically fits every bucket's low nibbles into a 12-bit
//! codeword instead of 16 bits.

use std::sync::OnceLock;

/// Number of non-decreasing 4-tuples over [0, 15]
pub const NUM_CODEWORDS: usize = 3876;

/// Codewords occupy the low 12 bits of a bucket
pub const CODEWORD_MASK: u16 = 0x0fff;

/// Lookup tables between sorted nibble tuples and their codewords
pub struct PermutationEncoding {
    /// codeword -> packed tuple
    dec_table: Box<[u16]>,
    /// packed tuple -> codeword, only sorted tuples are populated
    enc_table: Box<[u16]>,
}

impl PermutationEncoding {
    /// Build the tables. Prefer [`PermutationEncoding::shared`], the contents never vary.
    pub fn new() -> Self {
        let mut dec_table = vec![0u16; NUM_CODEWORDS].into_boxed_slice();
        let mut enc_table = vec![0u16; 1 << 16].into_boxed_slice();

        let mut idx: u16 = 0;
        for a in 0..16u8 {
            for b in a..16u8 {
                for c in b..16u8 {
                    for d in c..16u8 {
                        let packed = Self::pack([a, b, c, d]);
                        dec_table[idx as usize] = packed;
                        enc_table[packed as usize] = idx;
                        idx += 1;
                    }
                }
            }
        }
        debug_assert_eq!(idx as usize, NUM_CODEWORDS);

        PermutationEncoding {
            dec_table,
            enc_table,
        }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> &'static PermutationEncoding {
        static SHARED: OnceLock<PermutationEncoding> = OnceLock::new();
        SHARED.get_or_init(PermutationEncoding::new)
    }

    /// Encode four nibbles sorted in non-decreasing order.
    ///
    /// Unsorted input has no codeword; callers sort by low nibble first.
    #[inline]
    pub fn encode(&self, low_bits: [u8; 4]) -> u16 {
        debug_assert!(low_bits.windows(2).all(|w| w[0] <= w[1]));
        self.enc_table[Self::pack(low_bits) as usize]
    }

    /// Decode a codeword back into its sorted nibbles
    #[inline]
    pub fn decode(&self, codeword: u16) -> [u8; 4] {
        Self::unpack(self.dec_table[(codeword & CODEWORD_MASK) as usize])
    }

    /// Interleave four nibbles into 16 bits: nibbles 0 and 2 share the low byte,
    /// nibbles 1 and 3 the high byte.
    #[inline]
    pub fn pack(nibbles: [u8; 4]) -> u16 {
        let low = (nibbles[0] as u16 | (nibbles[1] as u16) << 8) & 0x0f0f;
        let high = ((nibbles[2] as u16 & 0x0f) | (nibbles[3] as u16 & 0x0f) << 8) << 4;
        low | high
    }

    #[inline]
    pub fn unpack(packed: u16) -> [u8; 4] {
        [
            (packed & 0x000f) as u8,
            ((packed >> 8) & 0x000f) as u8,
            ((packed >> 4) & 0x000f) as u8,
            ((packed >> 12) & 0x000f) as u8,
        ]
    }
}

impl Default for PermutationEncoding {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PermutationEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PermutationEncoding")
            .field("codewords", &self.dec_table.len())
            .finish()
    }
}
