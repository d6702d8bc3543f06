use croaring::Bitmap;
use crowdmap::{BitmapBatch, Op};
use libfuzzer_sys::arbitrary::{self, Arbitrary, Unstructured};
use std::ops::RangeInclusive;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Num(pub u32);

pub const MAX_NUM: u32 = 0x1_0000 * 4;

impl<'a> Arbitrary<'a> for Num {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self(u.int_in_range(0..=(MAX_NUM - 1))?))
    }
}

fn nums(items: &[Num]) -> Vec<u32> {
    items.iter().map(|n| n.0).collect()
}

#[derive(Arbitrary, Debug)]
pub enum BatchOperation {
    Add(Vec<Num>),
    AddStride { range: RangeInclusive<Num>, stride: u8 },
    Remove(Vec<Num>),
    Clear,
    Delete,
}

impl BatchOperation {
    pub fn record(&self, batch: &mut BitmapBatch, key: &[u8]) {
        match self {
            BatchOperation::Add(items) => {
                batch.record(key, Op::add(&nums(items))).unwrap();
            }
            BatchOperation::AddStride { range, stride } => {
                let values = [range.start().0, range.end().0];
                let result = batch.record(
                    key,
                    Op::Add {
                        values: &values,
                        stride: u32::from(*stride),
                    },
                );
                assert_eq!(result.is_err(), *stride > 0 && values[0] > values[1]);
            }
            BatchOperation::Remove(items) => {
                batch.record(key, Op::Remove(&nums(items))).unwrap();
            }
            BatchOperation::Clear => batch.record(key, Op::Clear).unwrap(),
            BatchOperation::Delete => batch.record(key, Op::Delete).unwrap(),
        }
    }
}

#[derive(Arbitrary, Debug)]
pub enum CrowdOperation {
    AddMany(Vec<Num>),
    AddRange(RangeInclusive<Num>),
    RemoveRange(RangeInclusive<Num>),
    // Probably turn it into a bitmap container
    MakeBitmap { key: u16 },
}

impl CrowdOperation {
    pub fn on_roaring(&self, b: &mut Bitmap) {
        match self {
            CrowdOperation::AddMany(items) => b.add_many(&nums(items)),
            CrowdOperation::AddRange(r) => b.add_range(r.start().0..=r.end().0),
            CrowdOperation::RemoveRange(r) => b.remove_range(r.start().0..=r.end().0),
            CrowdOperation::MakeBitmap { key } => {
                let start = u32::from(*key % 4) * 0x1_0000;
                let end = start + 9 * 1024;
                for i in (start..end).step_by(2) {
                    b.add(i);
                }
            }
        }
        b.remove_range(MAX_NUM..);
    }
}
