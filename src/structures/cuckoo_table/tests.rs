use super::*;
use crate::core::config::TableConfig;
use crate::core::error::Error;
use crate::structures::bit_set::{BitSet, BuiltinBitSet};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn table(num_buckets: usize, tags_per_bucket: usize, bits_per_tag: usize) -> SingleCuckooTable {
    SingleCuckooTable::from_config(&TableConfig { num_buckets, tags_per_bucket, bits_per_tag }).unwrap()
}

fn bucket_tags(t: &impl CuckooTable, bucket: usize) -> Vec<u32> {
    (0..t.tags_per_bucket()).map(|s| t.read_tag(bucket, s)).collect()
}

#[test]
fn eight_bit_tags_two_buckets_walkthrough() {
    let mut t = table(2, 4, 8);
    assert_eq!(t.bits().size(), 64);

    assert_eq!(t.insert_with_position(0, 5), Some(TagPosition::new(0, 0)));
    assert_eq!(t.insert_with_position(0, 9), Some(TagPosition::new(0, 1)));
    assert_eq!(t.read_tag(0, 0), 5);
    assert_eq!(t.read_tag(0, 1), 9);
    assert_eq!(t.read_tag(0, 2), 0);

    assert_eq!(t.find_tag_in_bucket_with_position(0, 9), Some(TagPosition::new(0, 1)));
    assert!(t.delete_tag_from_bucket(0, 5));
    assert!(!t.find_tag_in_bucket(0, 5));
    assert!(t.find_tag_in_bucket(0, 9));
}

#[test]
fn fresh_table_is_empty() {
    let t = table(8, 4, 12);
    for b in 0..8 {
        assert_eq!(bucket_tags(&t, b), vec![0; 4]);
        for tag in [1u32, 7, 0xfff] {
            assert!(!t.find_tag_in_bucket(b, tag));
        }
    }
}

#[test]
fn tag_bits_are_lsb_first_at_slot_offset() {
    let mut t = table(2, 2, 4);
    t.write_tag(1, 0, 0b0001);
    // bucket 1 slot 0 starts at (1 * 2 + 0) * 4 = 8
    let bits = t.bits();
    assert!(bits.get(8));
    assert!(!bits.get(9) && !bits.get(10) && !bits.get(11));
    assert_eq!((0..16).filter(|&i| bits.get(i)).count(), 1);
}

#[test]
fn write_discards_bits_above_tag_width() {
    let mut t = table(1, 2, 4);
    t.write_tag(0, 0, 0xfa);
    assert_eq!(t.read_tag(0, 0), 0xa);
    assert_eq!(t.read_tag(0, 1), 0);
}

#[test]
fn overwrite_clears_previous_bits() {
    let mut t = table(1, 1, 8);
    t.write_tag(0, 0, 0xff);
    t.write_tag(0, 0, 0x10);
    assert_eq!(t.read_tag(0, 0), 0x10);
}

#[test]
fn full_width_tags() {
    let mut t = table(3, 2, 32);
    t.write_tag(2, 1, u32::MAX);
    t.write_tag(2, 0, 0x8000_0001);
    assert_eq!(t.read_tag(2, 1), u32::MAX);
    assert_eq!(t.read_tag(2, 0), 0x8000_0001);
    assert_eq!(t.read_tag(1, 1), 0);
}

#[test]
fn insert_fails_without_mutation_when_full() {
    let mut t = table(2, 2, 8);
    assert!(t.insert(1, 3));
    assert!(t.insert(1, 4));
    let before = t.bits().clone();
    assert!(!t.insert(1, 5));
    assert_eq!(t.insert_with_position(1, 5), None);
    assert_eq!(t.bits(), &before);
}

#[test]
fn insert_reuses_deleted_slot() {
    let mut t = table(1, 4, 8);
    for tag in 1..=4 {
        assert!(t.insert(0, tag));
    }
    assert_eq!(t.delete_tag_from_bucket_with_position(0, 2), Some(TagPosition::new(0, 1)));
    assert_eq!(t.insert_with_position(0, 42), Some(TagPosition::new(0, 1)));
    assert_eq!(bucket_tags(&t, 0), vec![1, 42, 3, 4]);
}

#[test]
fn delete_clears_only_first_duplicate() {
    let mut t = table(1, 4, 8);
    t.write_tag(0, 1, 7);
    t.write_tag(0, 3, 7);
    assert_eq!(t.delete_tag_from_bucket_with_position(0, 7), Some(TagPosition::new(0, 1)));
    assert_eq!(t.find_tag_in_bucket_with_position(0, 7), Some(TagPosition::new(0, 3)));
    assert!(t.delete_tag_from_bucket(0, 7));
    assert!(!t.delete_tag_from_bucket(0, 7));
}

#[test]
fn delete_miss_leaves_bucket_alone() {
    let mut t = table(2, 2, 8);
    t.insert(0, 1);
    assert_eq!(t.delete_tag_from_bucket_with_position(0, 99), None);
    assert_eq!(bucket_tags(&t, 0), vec![1, 0]);
}

#[test]
fn two_bucket_scan_finds_tag_only_in_second_bucket() {
    let mut t = table(4, 4, 8);
    t.write_tag(1, 0, 11);
    t.write_tag(3, 2, 77);
    assert!(t.find_tag_in_buckets(1, 3, 77));
    assert_eq!(t.find_tag_in_buckets_with_position(1, 3, 77), Some(TagPosition::new(3, 2)));
    assert_eq!(t.find_tag_in_buckets_with_position(1, 3, 78), None);
}

#[test]
fn two_bucket_scan_interleaves_slots() {
    let mut t = table(2, 4, 8);
    // bucket 1 slot 0 is visited before bucket 0 slot 2
    t.write_tag(0, 2, 5);
    t.write_tag(1, 0, 5);
    assert_eq!(t.find_tag_in_buckets_with_position(0, 1, 5), Some(TagPosition::new(1, 0)));

    // at the same slot index the first bucket wins
    t.write_tag(0, 0, 5);
    assert_eq!(t.find_tag_in_buckets_with_position(0, 1, 5), Some(TagPosition::new(0, 0)));
}

#[test]
fn kickout_uses_free_slot_first() {
    let mut t = table(2, 4, 8);
    t.write_tag(0, 0, 1);
    let outcome = t.insert_or_kickout_one_with_position(0, 2);
    assert_eq!(outcome, KickoutOutcome { position: TagPosition::new(0, 1), evicted: EMPTY_TAG });
    assert_eq!(outcome.evicted(), None);
    assert_eq!(t.insert_or_kickout_one(0, 3), EMPTY_TAG);
}

#[test]
fn kickout_on_full_bucket_swaps_one_resident() {
    let mut t = table(2, 4, 8);
    let old = [10u32, 20, 30, 40];
    for &tag in &old {
        assert!(t.insert(1, tag));
    }
    let mut rng = StdRng::seed_from_u64(7);
    let outcome = t.insert_or_kickout_one_with_rng(1, 99, &mut rng);
    let evicted = outcome.evicted().unwrap();

    assert_eq!(outcome.position.bucket_index(), 1);
    assert_eq!(old[outcome.position.slot_index()], evicted);
    assert_eq!(t.read_tag(1, outcome.position.slot_index()), 99);

    let mut expected: Vec<u32> = old.iter().copied().filter(|&x| x != evicted).collect();
    expected.push(99);
    expected.sort_unstable();
    let mut got = bucket_tags(&t, 1);
    got.sort_unstable();
    assert_eq!(got, expected);
    assert_eq!(bucket_tags(&t, 0), vec![0; 4]);
}

#[test]
fn seeded_kickouts_are_reproducible() {
    let run = |seed| {
        let mut t = table(1, 4, 16);
        let mut rng = StdRng::seed_from_u64(seed);
        (1..=64u32)
            .map(|tag| t.insert_or_kickout_one_with_rng(0, tag, &mut rng))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn kickout_victims_cover_every_slot() {
    let mut t = table(1, 4, 16);
    for tag in 1..=4 {
        t.insert(0, tag);
    }
    let mut rng = StdRng::seed_from_u64(1);
    let mut seen = [false; 4];
    for tag in 100..400u32 {
        seen[t.insert_or_kickout_one_with_rng(0, tag, &mut rng).position.slot_index()] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn shape_accessors() {
    let t = table(16, 4, 12);
    assert_eq!(t.num_buckets(), 16);
    assert_eq!(t.tags_per_bucket(), 4);
    assert_eq!(t.bits_per_tag(), 12);
    assert_eq!(t.size_in_tags(), 64);
    assert_eq!(t.size_in_bytes(), 16 * 4 * 12 / 8);
}

#[test]
fn size_mismatch_is_rejected() {
    let err = SingleCuckooTable::new(BuiltinBitSet::new(63), 2, 4, 8).unwrap_err();
    assert!(matches!(err, Error::TableSizeMismatch { expected: 64, actual: 63 }));

    let err = SingleCuckooTable::new(BuiltinBitSet::new(65), 2, 4, 8).unwrap_err();
    assert!(err.is_contract_violation());
}

#[test]
fn invalid_shapes_are_rejected() {
    assert!(matches!(SingleCuckooTable::new(BuiltinBitSet::new(0), 0, 4, 8), Err(Error::InvalidShape(_))));
    assert!(matches!(SingleCuckooTable::new(BuiltinBitSet::new(0), 2, 4, 0), Err(Error::InvalidShape(_))));
    assert!(matches!(SingleCuckooTable::new(BuiltinBitSet::new(264), 2, 4, 33), Err(Error::InvalidShape(_))));
}

#[test]
#[should_panic(expected = "slot 4 out of range")]
fn slot_past_bucket_end_panics() {
    let t = table(2, 4, 8);
    // would alias bucket 1 slot 0 without the bounds check
    t.read_tag(0, 4);
}

#[test]
#[should_panic(expected = "bucket 2 out of range")]
fn bucket_past_table_end_panics() {
    let mut t = table(2, 4, 8);
    t.write_tag(2, 0, 1);
}

#[test]
fn usable_as_trait_object() {
    let mut t: Box<dyn CuckooTable> = Box::new(table(4, 2, 8));
    assert!(t.insert(3, 8));
    assert!(t.find_tag_in_buckets(0, 3, 8));
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(t.insert_or_kickout_one_with_rng(3, 9, &mut rng).evicted(), None);
    assert!(t.insert_or_kickout_one_with_rng(3, 10, &mut rng).evicted().is_some());
}

#[test]
fn into_bits_returns_written_storage() {
    let mut t = table(1, 1, 8);
    t.write_tag(0, 0, 0b1010_0000);
    let bits = t.into_bits();
    assert_eq!(bits.count_ones(), 2);
    assert!(bits.get(5) && bits.get(7));
}

fn shape() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..16, 1usize..8, 1usize..=32)
}

proptest! {
    #[test]
    fn write_then_read_returns_masked_tag(
        (num_buckets, tags_per_bucket, bits_per_tag) in shape(),
        writes in prop::collection::vec((any::<usize>(), any::<usize>(), any::<u32>()), 1..32),
    ) {
        let mut t = table(num_buckets, tags_per_bucket, bits_per_tag);
        let mask = if bits_per_tag == 32 { u32::MAX } else { (1u32 << bits_per_tag) - 1 };
        let mut model = vec![0u32; num_buckets * tags_per_bucket];
        for (b, s, tag) in writes {
            let (b, s) = (b % num_buckets, s % tags_per_bucket);
            t.write_tag(b, s, tag);
            model[b * tags_per_bucket + s] = tag & mask;
            prop_assert_eq!(t.read_tag(b, s), tag & mask);
        }
        for b in 0..num_buckets {
            for s in 0..tags_per_bucket {
                prop_assert_eq!(t.read_tag(b, s), model[b * tags_per_bucket + s]);
            }
        }
    }

    #[test]
    fn kickout_conserves_bucket_size(
        tags_per_bucket in 1usize..8,
        residents in prop::collection::vec(1u32..=255, 8),
        new_tag in 1u32..=255,
        seed in any::<u64>(),
    ) {
        let mut t = table(2, tags_per_bucket, 8);
        let old: Vec<u32> = residents[..tags_per_bucket].to_vec();
        for &tag in &old {
            prop_assert!(t.insert(0, tag));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = t.insert_or_kickout_one_with_rng(0, new_tag, &mut rng);
        let evicted = outcome.evicted();
        prop_assert!(evicted.is_some());
        let evicted = evicted.unwrap();
        prop_assert_eq!(old[outcome.position.slot_index()], evicted);

        let mut expected = old.clone();
        let idx = expected.iter().position(|&x| x == evicted).unwrap();
        expected.remove(idx);
        expected.push(new_tag);
        expected.sort_unstable();
        let mut got = bucket_tags(&t, 0);
        got.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn insert_then_find_reports_same_slot(
        (num_buckets, tags_per_bucket, bits_per_tag) in shape(),
        bucket in any::<usize>(),
        tag in any::<u32>(),
    ) {
        let mut t = table(num_buckets, tags_per_bucket, bits_per_tag);
        let bucket = bucket % num_buckets;
        let tag = match tag & (u32::MAX >> (32 - bits_per_tag)) {
            0 => 1,
            masked => masked,
        };
        let pos = t.insert_with_position(bucket, tag).unwrap();
        prop_assert_eq!(t.find_tag_in_bucket_with_position(bucket, tag), Some(pos));
        prop_assert!(t.delete_tag_from_bucket(bucket, tag));
        prop_assert!(!t.find_tag_in_bucket(bucket, tag));
    }
}
