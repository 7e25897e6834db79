use rand::{Rng, RngCore};
use tracing::{debug, trace};

use super::{CuckooTable, KickoutOutcome, TagPosition, EMPTY_TAG};
use crate::core::config::TableConfig;
use crate::core::error::{Error, Result};
use crate::structures::bit_set::{BitSet, BuiltinBitSet};

/// Cuckoo table laid out over a single contiguous bit region.
///
/// Slot `s` of bucket `b` occupies bits
/// `[(b * tags_per_bucket + s) * bits_per_tag, .. + bits_per_tag)`,
/// least significant bit first.
#[derive(Debug, Clone)]
pub struct SingleCuckooTable<B: BitSet = BuiltinBitSet> {
    bits: B,
    num_buckets: usize,
    tags_per_bucket: usize,
    bits_per_tag: usize,
}

impl<B: BitSet> SingleCuckooTable<B> {
    /// View `bits` as a table of the given shape.
    ///
    /// The storage must hold exactly `num_buckets * tags_per_bucket * bits_per_tag` bits.
    pub fn new(bits: B, num_buckets: usize, tags_per_bucket: usize, bits_per_tag: usize) -> Result<Self> {
        let shape = TableConfig { num_buckets, tags_per_bucket, bits_per_tag };
        shape.validate()?;
        // validate() rejects overflowing shapes
        let expected = shape.total_bits().unwrap_or(usize::MAX);
        if bits.size() != expected {
            return Err(Error::TableSizeMismatch { expected, actual: bits.size() });
        }
        debug!(num_buckets, tags_per_bucket, bits_per_tag, "created cuckoo table");
        Ok(Self { bits, num_buckets, tags_per_bucket, bits_per_tag })
    }

    /// Borrow the backing storage.
    pub fn bits(&self) -> &B {
        &self.bits
    }

    /// Give back the backing storage.
    pub fn into_bits(self) -> B {
        self.bits
    }

    #[inline]
    fn tag_offset(&self, bucket_index: usize, slot_index: usize) -> usize {
        assert!(bucket_index < self.num_buckets, "bucket {} out of range", bucket_index);
        assert!(slot_index < self.tags_per_bucket, "slot {} out of range", slot_index);
        (bucket_index * self.tags_per_bucket + slot_index) * self.bits_per_tag
    }

    #[inline]
    fn first_slot_holding(&self, bucket_index: usize, tag: u32) -> Option<usize> {
        (0..self.tags_per_bucket).find(|&slot| self.read_tag(bucket_index, slot) == tag)
    }
}

impl SingleCuckooTable<BuiltinBitSet> {
    /// Allocate zeroed storage sized for `config` and build a table over it.
    pub fn from_config(config: &TableConfig) -> Result<Self> {
        config.validate()?;
        let total_bits = config.total_bits().unwrap_or(usize::MAX);
        Self::new(
            BuiltinBitSet::new(total_bits),
            config.num_buckets,
            config.tags_per_bucket,
            config.bits_per_tag,
        )
    }
}

impl<B: BitSet> CuckooTable for SingleCuckooTable<B> {
    fn read_tag(&self, bucket_index: usize, slot_index: usize) -> u32 {
        let start = self.tag_offset(bucket_index, slot_index);
        let mut tag = 0u32;
        for k in 0..self.bits_per_tag {
            if self.bits.get(start + k) {
                tag |= 1 << k;
            }
        }
        tag
    }

    fn write_tag(&mut self, bucket_index: usize, slot_index: usize, tag: u32) {
        let start = self.tag_offset(bucket_index, slot_index);
        for k in 0..self.bits_per_tag {
            if tag & (1 << k) != 0 {
                self.bits.set(start + k);
            } else {
                self.bits.clear(start + k);
            }
        }
    }

    fn find_tag_in_bucket_with_position(&self, bucket_index: usize, tag: u32) -> Option<TagPosition> {
        self.first_slot_holding(bucket_index, tag)
            .map(|slot| TagPosition::new(bucket_index, slot))
    }

    fn find_tag_in_buckets_with_position(
        &self,
        bucket_index1: usize,
        bucket_index2: usize,
        tag: u32,
    ) -> Option<TagPosition> {
        for slot in 0..self.tags_per_bucket {
            if self.read_tag(bucket_index1, slot) == tag {
                return Some(TagPosition::new(bucket_index1, slot));
            }
            if self.read_tag(bucket_index2, slot) == tag {
                return Some(TagPosition::new(bucket_index2, slot));
            }
        }
        None
    }

    fn delete_tag_from_bucket_with_position(&mut self, bucket_index: usize, tag: u32) -> Option<TagPosition> {
        let slot = self.first_slot_holding(bucket_index, tag)?;
        self.write_tag(bucket_index, slot, EMPTY_TAG);
        Some(TagPosition::new(bucket_index, slot))
    }

    fn insert_or_kickout_one_with_rng(
        &mut self,
        bucket_index: usize,
        tag: u32,
        rng: &mut dyn RngCore,
    ) -> KickoutOutcome {
        if let Some(position) = self.insert_with_position(bucket_index, tag) {
            return KickoutOutcome { position, evicted: EMPTY_TAG };
        }
        let victim = rng.random_range(0..self.tags_per_bucket);
        let evicted = self.read_tag(bucket_index, victim);
        self.write_tag(bucket_index, victim, tag);
        trace!(bucket_index, slot_index = victim, evicted, "kicked out tag");
        KickoutOutcome { position: TagPosition::new(bucket_index, victim), evicted }
    }

    fn insert_with_position(&mut self, bucket_index: usize, tag: u32) -> Option<TagPosition> {
        let slot = self.first_slot_holding(bucket_index, EMPTY_TAG)?;
        self.write_tag(bucket_index, slot, tag);
        Some(TagPosition::new(bucket_index, slot))
    }

    #[inline]
    fn tags_per_bucket(&self) -> usize {
        self.tags_per_bucket
    }

    #[inline]
    fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    #[inline]
    fn bits_per_tag(&self) -> usize {
        self.bits_per_tag
    }

    fn size_in_bytes(&self) -> usize {
        self.bits.size() >> 3
    }
}
