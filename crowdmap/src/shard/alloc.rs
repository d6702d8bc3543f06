use croaring::Bitmap;
use tracing::debug;

use crate::bitmap::ops;
use crate::{Error, Result};

/// Members moved by one [`rebalance`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Churn {
    /// Members placed into some shard
    pub added: u64,
    /// Members evicted from some shard
    pub removed: u64,
}

impl Churn {
    pub fn total(&self) -> u64 {
        self.added + self.removed
    }
}

/// Brings `shards` in line with `desired`.
///
/// `shards` must be pairwise disjoint on entry; on return they are still disjoint and their
/// union is `desired`. Members that stay in the crowd never move. Members that leave are
/// evicted from whichever shard held them, and newcomers are dealt out in ascending order to
/// shards below the average size `|desired| / shards.len()`. The last shard takes whatever
/// the quotas leave over, so it may end up somewhat larger than the rest.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::shard;
///
/// let mut shards = vec![Bitmap::new(), Bitmap::new()];
/// let desired: Bitmap = (0..10).collect();
///
/// let churn = shard::rebalance(&desired, &mut shards).unwrap();
/// assert_eq!(churn.added, 10);
/// assert_eq!(shards[0].to_vec(), [0, 1, 2, 3, 4]);
/// assert_eq!(shards[1].to_vec(), [5, 6, 7, 8, 9]);
/// assert!(shard::is_partition(&desired, &shards));
/// ```
pub fn rebalance(desired: &Bitmap, shards: &mut [Bitmap]) -> Result<Churn> {
    if shards.is_empty() {
        return Err(Error::NoShards);
    }

    let current = {
        let refs: Vec<&Bitmap> = shards.iter().collect();
        ops::union(&refs)
    };
    let added = ops::difference(desired, &current);
    let removed = ops::difference(&current, desired);

    let churn = Churn {
        added: added.cardinality(),
        removed: removed.cardinality(),
    };

    if !removed.is_empty() {
        for shard in shards.iter_mut() {
            ops::in_place_remove(shard, &removed);
        }
    }

    if !added.is_empty() {
        deal(desired.cardinality(), &added, shards);
    }

    debug!(
        shards = shards.len(),
        desired = desired.cardinality(),
        added = churn.added,
        removed = churn.removed,
        "rebalanced shards"
    );
    Ok(churn)
}

fn deal(desired: u64, added: &Bitmap, shards: &mut [Bitmap]) {
    let avg = desired as f64 / shards.len() as f64;
    let mut quotas: Vec<f64> = shards
        .iter()
        .map(|shard| avg - shard.cardinality() as f64)
        .collect();

    let last = shards.len() - 1;
    let mut op = 0;
    for member in added.iter() {
        while quotas[op] < 1.0 && op != last {
            op += 1;
        }

        shards[op].add(member);
        quotas[op] -= 1.0;
        if quotas[op] <= 0.0 {
            op = if op == last { 0 } else { op + 1 };
        }
    }
}

/// Returns true if `shards` are pairwise disjoint and together hold exactly `desired`
pub fn is_partition(desired: &Bitmap, shards: &[Bitmap]) -> bool {
    let total: u64 = shards.iter().map(Bitmap::cardinality).sum();
    if total != desired.cardinality() {
        return false;
    }

    let refs: Vec<&Bitmap> = shards.iter().collect();
    // equal sizes plus equal union rule out overlap
    ops::union(&refs) == *desired
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn no_shards() {
        assert!(matches!(
            rebalance(&Bitmap::of(&[1]), &mut []),
            Err(Error::NoShards)
        ));
    }

    #[test]
    fn single_shard_takes_everything() {
        let mut shards = vec![Bitmap::of(&[1, 2])];
        let desired = Bitmap::of(&[2, 3, 4]);
        let churn = rebalance(&desired, &mut shards).unwrap();

        assert_eq!(shards[0], desired);
        assert_eq!(churn, Churn { added: 2, removed: 1 });
    }

    #[test]
    fn untouched_when_already_balanced() {
        let mut shards = vec![Bitmap::of(&[1, 2]), Bitmap::of(&[3, 4])];
        let before = shards.clone();
        let churn = rebalance(&Bitmap::of(&[1, 2, 3, 4]), &mut shards).unwrap();

        assert_eq!(churn.total(), 0);
        assert_eq!(shards, before);
    }

    #[test]
    fn removal_hits_owning_shard_only() {
        let mut shards = vec![Bitmap::of(&[1, 2]), Bitmap::of(&[3, 4])];
        rebalance(&Bitmap::of(&[1, 3, 4]), &mut shards).unwrap();

        assert_eq!(shards[0].to_vec(), [1]);
        assert_eq!(shards[1].to_vec(), [3, 4]);
    }

    #[test]
    fn newcomers_fill_smaller_shards_first() {
        let mut shards = vec![Bitmap::of(&[0, 1, 2, 3]), Bitmap::new(), Bitmap::new()];
        let desired: Bitmap = (0..12).collect();
        rebalance(&desired, &mut shards).unwrap();

        // avg 4: shard 0 is full, shards 1 and 2 take four each
        assert_eq!(shards[0].to_vec(), [0, 1, 2, 3]);
        assert_eq!(shards[1].to_vec(), [4, 5, 6, 7]);
        assert_eq!(shards[2].to_vec(), [8, 9, 10, 11]);
    }

    #[test]
    fn overfull_shards_receive_nothing() {
        let mut shards = vec![(0..10).collect::<Bitmap>(), Bitmap::new()];
        let desired: Bitmap = (0..14).collect();
        rebalance(&desired, &mut shards).unwrap();

        // avg 7: shard 0 is over quota
        assert_eq!(shards[0].cardinality(), 10);
        assert_eq!(shards[1].to_vec(), [10, 11, 12, 13]);
    }

    #[test]
    fn fractional_quota_leftovers_sink_to_last() {
        let mut shards = vec![Bitmap::new(), Bitmap::new(), Bitmap::new()];
        let desired: Bitmap = (0..10).collect();
        rebalance(&desired, &mut shards).unwrap();

        let sizes: Vec<u64> = shards.iter().map(Bitmap::cardinality).collect();
        assert_eq!(sizes, [3, 3, 4]);
        assert!(is_partition(&desired, &shards));
    }

    #[test]
    fn evicted_shard_refills() {
        let mut shards = vec![
            (0..5).collect::<Bitmap>(),
            (5..10).collect::<Bitmap>(),
        ];
        // shard 1 loses all its members and is the only one under quota
        let desired: Bitmap = (0..5).chain(10..15).collect();
        let churn = rebalance(&desired, &mut shards).unwrap();

        assert_eq!(churn, Churn { added: 5, removed: 5 });
        assert_eq!(shards[0].to_vec(), [0, 1, 2, 3, 4]);
        assert_eq!(shards[1].to_vec(), [10, 11, 12, 13, 14]);
    }

    #[test]
    fn partition_check() {
        let desired = Bitmap::of(&[1, 2, 3]);
        assert!(is_partition(&desired, &[Bitmap::of(&[1]), Bitmap::of(&[2, 3])]));
        assert!(!is_partition(&desired, &[Bitmap::of(&[1, 2]), Bitmap::of(&[2, 3])]));
        assert!(!is_partition(&desired, &[Bitmap::of(&[1]), Bitmap::of(&[2])]));
        assert!(is_partition(&Bitmap::new(), &[Bitmap::new()]));
    }
}
