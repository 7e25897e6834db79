//! Bucketed, fixed-width tag storage for cuckoo filters.
//!
//! A table holds `num_buckets` buckets of `tags_per_bucket` slots, each slot
//! storing a `bits_per_tag`-bit tag. Tag `0` marks an empty slot, so callers
//! must never store a real fingerprint that encodes to zero.
//!
//! The table does no synchronization. Mutating methods take `&mut self`;
//! an owner that shares a table between threads must wrap it in a lock and
//! hold that lock across any read-then-write sequence on a bucket.

use rand::RngCore;

mod single_table;

pub use single_table::SingleCuckooTable;

/// Reserved tag value for an unoccupied slot.
pub const EMPTY_TAG: u32 = 0;

/// Location of a tag inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagPosition {
    bucket_index: usize,
    slot_index: usize,
}

impl TagPosition {
    /// Create a position for `slot_index` within `bucket_index`.
    pub fn new(bucket_index: usize, slot_index: usize) -> Self {
        Self { bucket_index, slot_index }
    }

    /// Bucket holding the tag.
    #[inline]
    pub fn bucket_index(&self) -> usize { self.bucket_index }

    /// Slot within the bucket.
    #[inline]
    pub fn slot_index(&self) -> usize { self.slot_index }
}

/// Result of [`CuckooTable::insert_or_kickout_one_with_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KickoutOutcome {
    /// Where the new tag was written.
    pub position: TagPosition,
    /// Tag displaced from `position`, or [`EMPTY_TAG`] if the slot was free.
    pub evicted: u32,
}

impl KickoutOutcome {
    /// The displaced tag, if the bucket was full.
    pub fn evicted(&self) -> Option<u32> {
        (self.evicted != EMPTY_TAG).then_some(self.evicted)
    }
}

/// Tag store addressed by bucket and slot.
///
/// Implementations supply the position-reporting scans; the boolean
/// variants are derived from them.
///
/// Bucket indices must be below `num_buckets()` and slot indices below
/// `tags_per_bucket()`; out-of-range indices panic.
pub trait CuckooTable {
    /// Decode the tag stored at `slot_index` of `bucket_index`.
    fn read_tag(&self, bucket_index: usize, slot_index: usize) -> u32;

    /// Store the low `bits_per_tag` bits of `tag`. Higher bits are discarded.
    fn write_tag(&mut self, bucket_index: usize, slot_index: usize, tag: u32);

    /// First slot in the bucket holding `tag`.
    fn find_tag_in_bucket_with_position(&self, bucket_index: usize, tag: u32) -> Option<TagPosition>;

    /// First match across two buckets, scanning slot `i` of `bucket_index1`
    /// then slot `i` of `bucket_index2` before moving to `i + 1`.
    fn find_tag_in_buckets_with_position(
        &self,
        bucket_index1: usize,
        bucket_index2: usize,
        tag: u32,
    ) -> Option<TagPosition>;

    /// Clear the first slot in the bucket holding `tag`.
    fn delete_tag_from_bucket_with_position(&mut self, bucket_index: usize, tag: u32) -> Option<TagPosition>;

    /// Put `tag` in the first empty slot, or overwrite a slot chosen uniformly
    /// by `rng` when the bucket is full and report the tag it held.
    fn insert_or_kickout_one_with_rng(
        &mut self,
        bucket_index: usize,
        tag: u32,
        rng: &mut dyn RngCore,
    ) -> KickoutOutcome;

    /// Put `tag` in the first empty slot. Leaves the bucket untouched when full.
    fn insert_with_position(&mut self, bucket_index: usize, tag: u32) -> Option<TagPosition>;

    /// Slots per bucket.
    fn tags_per_bucket(&self) -> usize;

    /// Number of buckets.
    fn num_buckets(&self) -> usize;

    /// Width of each tag in bits.
    fn bits_per_tag(&self) -> usize;

    /// Size of the backing bit storage in bytes.
    fn size_in_bytes(&self) -> usize;

    /// Total slots across all buckets.
    fn size_in_tags(&self) -> usize {
        self.num_buckets() * self.tags_per_bucket()
    }

    /// Whether any slot in the bucket holds `tag`.
    fn find_tag_in_bucket(&self, bucket_index: usize, tag: u32) -> bool {
        self.find_tag_in_bucket_with_position(bucket_index, tag).is_some()
    }

    /// Whether either bucket holds `tag`.
    fn find_tag_in_buckets(&self, bucket_index1: usize, bucket_index2: usize, tag: u32) -> bool {
        self.find_tag_in_buckets_with_position(bucket_index1, bucket_index2, tag).is_some()
    }

    /// Clear one occurrence of `tag` from the bucket.
    fn delete_tag_from_bucket(&mut self, bucket_index: usize, tag: u32) -> bool {
        self.delete_tag_from_bucket_with_position(bucket_index, tag).is_some()
    }

    /// [`insert_or_kickout_one_with_rng`](Self::insert_or_kickout_one_with_rng)
    /// using the thread-local generator.
    fn insert_or_kickout_one_with_position(&mut self, bucket_index: usize, tag: u32) -> KickoutOutcome {
        self.insert_or_kickout_one_with_rng(bucket_index, tag, &mut rand::rng())
    }

    /// Insert `tag`, returning the evicted tag or [`EMPTY_TAG`].
    fn insert_or_kickout_one(&mut self, bucket_index: usize, tag: u32) -> u32 {
        self.insert_or_kickout_one_with_position(bucket_index, tag).evicted
    }

    /// Insert `tag` into a free slot; `false` if the bucket is full.
    fn insert(&mut self, bucket_index: usize, tag: u32) -> bool {
        self.insert_with_position(bucket_index, tag).is_some()
    }
}

#[cfg(test)]
mod tests;
