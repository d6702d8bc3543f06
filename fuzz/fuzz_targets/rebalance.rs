#![no_main]

use std::num::NonZeroU64;

use crate::arbitrary_ops::*;
use croaring::Bitmap;
use crowdmap::bitmap::ops;
use crowdmap::shard;
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

mod arbitrary_ops;

fuzz_target!(|input: FuzzInput| {
    let n = usize::from(input.shards % 16) + 1;

    let mut initial = Bitmap::new();
    for op in &input.initial {
        op.on_roaring(&mut initial);
    }
    let mut shards = vec![Bitmap::new(); n];
    shard::rebalance(&initial, &mut shards).unwrap();
    assert!(shard::is_partition(&initial, &shards));

    let mut desired = initial.clone();
    for op in &input.change {
        op.on_roaring(&mut desired);
    }
    let before = shards.clone();
    let churn = shard::rebalance(&desired, &mut shards).unwrap();
    assert!(shard::is_partition(&desired, &shards));
    assert_eq!(churn.added, ops::difference(&desired, &initial).cardinality());
    assert_eq!(churn.removed, ops::difference(&initial, &desired).cardinality());
    for (old, new) in before.iter().zip(&shards) {
        assert!(old.and(&desired).is_subset(new));
    }

    let max = NonZeroU64::new(u64::from(input.chunk) + 1).unwrap();
    let chunks = shard::split(&desired, max);
    assert!(chunks.iter().rev().skip(1).all(|c| c.cardinality() == max.get()));
    assert!(desired.iter().eq(chunks.iter().flat_map(Bitmap::iter)));
});

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    shards: u8,
    chunk: u16,
    initial: Vec<CrowdOperation>,
    change: Vec<CrowdOperation>,
}
