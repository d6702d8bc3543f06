#![no_main]

use crate::arbitrary_ops::*;
use crowdmap::bitmap;
use crowdmap::storage::{MemStorage, MemWriteBatch, Mutation};
use crowdmap::BitmapBatch;
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

mod arbitrary_ops;

fuzz_target!(|input: FuzzInput| {
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let mut storage = MemStorage::new();
        for (key, ops) in input.initial.iter().enumerate() {
            let mut crowd = croaring::Bitmap::new();
            for op in ops {
                op.on_roaring(&mut crowd);
            }
            storage.insert(vec![key as u8], bitmap::encode(&crowd));
        }

        let mut batch = BitmapBatch::new();
        for (key, op) in &input.ops {
            op.record(&mut batch, &[*key % 4]);
        }
        let keys = batch.len();

        let mut wb = MemWriteBatch::new();
        let stats = batch.commit(&storage, &mut wb).unwrap();
        assert!(batch.is_empty());
        assert_eq!(wb.len(), keys);
        assert_eq!(storage.reads(), stats.reads);
        assert_eq!(stats.writes + stats.deletes, keys);

        let mut seen = Vec::new();
        for mutation in &wb.mutations {
            assert!(!seen.contains(&mutation.key().to_vec()));
            seen.push(mutation.key().to_vec());
            if let Mutation::Set(_, data) = mutation {
                bitmap::decode(data).unwrap();
            }
        }
        outputs.push(wb);
    }
    assert_eq!(outputs[0], outputs[1]);
});

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    initial: Vec<Vec<CrowdOperation>>,
    ops: Vec<(u8, BatchOperation)>,
}
