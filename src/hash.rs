//! Hash functions for Cuckoo filters
//!
//! The filter only needs one 64-bit hash per item: the upper half picks the primary
//! bucket and the lower half becomes the fingerprint, so both halves must be well mixed.

use std::hash::Hasher;

use fnv::FnvHasher;

/// Trait for hash functions used by the filter
pub trait HashFunction: Send + Sync {
    /// Hash an item to 64 bits
    fn hash(&self, item: &[u8]) -> u64;

    /// Get a name/identifier for this hash function
    fn name(&self) -> String;
}

/// 64-bit xxHash with a fixed seed. This is the default hash function.
#[derive(Debug, Clone, Default)]
pub struct XxHash64 {
    seed: u64,
}

impl XxHash64 {
    pub fn with_seed(seed: u64) -> Self {
        XxHash64 { seed }
    }

    /// Create an xxHash with a random seed
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        XxHash64 { seed: rng.gen() }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl HashFunction for XxHash64 {
    fn hash(&self, item: &[u8]) -> u64 {
        let mut h = twox_hash::XxHash64::with_seed(self.seed);
        h.write(item);
        h.finish()
    }

    fn name(&self) -> String {
        format!("xxhash64(seed={})", self.seed())
    }
}

/// 64-bit FNV-1a.
///
/// Cheap, but its low bits only depend on the low bits of the input, so short keys
/// that differ in a single digit cluster into few buckets. Prefer [`XxHash64`] unless
/// keys are already well distributed.
#[derive(Debug, Clone, Default)]
pub struct Fnv1a {
    key: Option<u64>,
}

impl Fnv1a {
    pub fn new() -> Self {
        Fnv1a { key: None }
    }

    /// Start from `key` instead of the standard FNV offset basis
    pub fn with_key(key: u64) -> Self {
        Fnv1a { key: Some(key) }
    }
}

impl HashFunction for Fnv1a {
    fn hash(&self, item: &[u8]) -> u64 {
        let mut h = match self.key {
            Some(key) => FnvHasher::with_key(key),
            None => FnvHasher::default(),
        };
        h.write(item);
        h.finish()
    }

    fn name(&self) -> String {
        match self.key {
            Some(key) => format!("fnv1a(key={:#x})", key),
            None => "fnv1a".to_string(),
        }
    }
}
