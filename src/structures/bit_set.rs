//! Fixed-size bit storage
//!
//! The cuckoo table views a contiguous bit region through [`BitSet`].
//! The bit count is fixed when the storage is created.

const WORD_BITS: usize = 64;

/// Addressable bit region of a fixed size.
///
/// Indices outside `0..size()` are a caller bug and panic.
pub trait BitSet {
    /// Return the bit at `index`.
    fn get(&self, index: usize) -> bool;

    /// Set the bit at `index` to one.
    fn set(&mut self, index: usize);

    /// Set the bit at `index` to zero.
    fn clear(&mut self, index: usize);

    /// Number of addressable bits.
    fn size(&self) -> usize;
}

/// [`BitSet`] backed by a zero-initialized slice of 64-bit words.
#[derive(Clone, PartialEq, Eq)]
pub struct BuiltinBitSet {
    words: Box<[u64]>,
    num_bits: usize,
}

impl BuiltinBitSet {
    /// Create a bit set holding `num_bits` cleared bits.
    pub fn new(num_bits: usize) -> Self {
        let num_words = num_bits.div_ceil(WORD_BITS);
        Self { words: vec![0u64; num_words].into_boxed_slice(), num_bits }
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.num_bits,
            "bit index {} out of range for bit set of {} bits",
            index,
            self.num_bits
        );
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }
}

impl BitSet for BuiltinBitSet {
    #[inline]
    fn get(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word] & mask != 0
    }

    #[inline]
    fn set(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] |= mask;
    }

    #[inline]
    fn clear(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] &= !mask;
    }

    #[inline]
    fn size(&self) -> usize {
        self.num_bits
    }
}

impl std::fmt::Debug for BuiltinBitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinBitSet")
            .field("num_bits", &self.num_bits)
            .field("ones", &self.count_ones())
            .finish()
    }
}
