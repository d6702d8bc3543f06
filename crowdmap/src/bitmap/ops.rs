//! Set algebra over bitmaps.
//!
//! Every function returns a new bitmap and leaves its inputs alone, except
//! [`in_place_remove`], which exists to shrink long-lived shard bitmaps without copying them.
//!
//! The `*_values` forms take loosely typed [`Value`] operands, for expression pipelines that
//! only learn operand types at run time.

use croaring::Bitmap;

use crate::{Error, Result};

/// Union of all `bitmaps`; the empty bitmap when there are none.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::ops;
///
/// let a = Bitmap::of(&[1, 2]);
/// let b = Bitmap::of(&[2, 3]);
/// assert_eq!(ops::union(&[&a, &b]).to_vec(), [1, 2, 3]);
/// assert!(ops::union(&[]).is_empty());
/// ```
pub fn union(bitmaps: &[&Bitmap]) -> Bitmap {
    let mut value = Bitmap::new();
    for bitmap in bitmaps {
        value.or_inplace(bitmap);
    }
    value
}

/// Intersection of all `bitmaps`, folded left from the first.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::ops;
///
/// let a = Bitmap::of(&[1, 2, 3]);
/// let b = Bitmap::of(&[2, 3, 4]);
/// let c = Bitmap::of(&[3, 4, 5]);
/// assert_eq!(ops::intersect(&[&a, &b, &c]).to_vec(), [3]);
/// ```
pub fn intersect(bitmaps: &[&Bitmap]) -> Bitmap {
    fold_first(bitmaps, Bitmap::and_inplace)
}

/// Symmetric difference of all `bitmaps`, folded left from the first.
///
/// With more than two operands a member survives when it appears an odd number of times,
/// so this is not a way to subtract several sets from one.
pub fn symmetric_difference(bitmaps: &[&Bitmap]) -> Bitmap {
    fold_first(bitmaps, Bitmap::xor_inplace)
}

/// Members of `a` that are not in `b`.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::ops;
///
/// let a = Bitmap::of(&[1, 2, 3]);
/// let b = Bitmap::of(&[3, 4]);
/// assert_eq!(ops::difference(&a, &b).to_vec(), [1, 2]);
/// ```
pub fn difference(a: &Bitmap, b: &Bitmap) -> Bitmap {
    a.andnot(b)
}

/// Removes every member of `b` from `a`.
pub fn in_place_remove(a: &mut Bitmap, b: &Bitmap) {
    a.andnot_inplace(b);
}

fn fold_first(bitmaps: &[&Bitmap], op: fn(&mut Bitmap, &Bitmap)) -> Bitmap {
    match bitmaps.split_first() {
        Some((first, rest)) => {
            let mut value = (*first).clone();
            for bitmap in rest {
                op(&mut value, bitmap);
            }
            value
        }
        None => Bitmap::new(),
    }
}

/// A dynamically typed algebra operand
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bitmap(Bitmap),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bitmap(_) => "bitmap",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Bool(_) => "bool",
        }
    }

    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Value::Bitmap(bitmap) => Some(bitmap),
            _ => None,
        }
    }
}

impl From<Bitmap> for Value {
    fn from(bitmap: Bitmap) -> Self {
        Value::Bitmap(bitmap)
    }
}

fn bitmaps(values: &[Value]) -> Result<Vec<&Bitmap>> {
    values
        .iter()
        .enumerate()
        .map(|(position, value)| {
            value.as_bitmap().ok_or(Error::TypeMismatch {
                position,
                found: value.type_name(),
            })
        })
        .collect()
}

/// [`union`] over dynamically typed operands
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::ops::{self, Value};
/// use crowdmap::Error;
///
/// let values = [Value::from(Bitmap::of(&[1])), Value::from(Bitmap::of(&[2]))];
/// assert_eq!(ops::union_values(&values).unwrap().to_vec(), [1, 2]);
///
/// let bad = [Value::from(Bitmap::of(&[1])), Value::Int(2)];
/// assert!(matches!(
///     ops::union_values(&bad),
///     Err(Error::TypeMismatch { position: 1, found: "int" })
/// ));
/// ```
pub fn union_values(values: &[Value]) -> Result<Bitmap> {
    Ok(union(&bitmaps(values)?))
}

/// [`intersect`] over dynamically typed operands
pub fn intersect_values(values: &[Value]) -> Result<Bitmap> {
    Ok(intersect(&bitmaps(values)?))
}

/// [`symmetric_difference`] over dynamically typed operands
pub fn symmetric_difference_values(values: &[Value]) -> Result<Bitmap> {
    Ok(symmetric_difference(&bitmaps(values)?))
}

/// [`difference`] over dynamically typed operands.
///
/// The first operand minus the members common to every operand. With two operands this is
/// plain `a - b`; with more, a member of the first survives unless all the others hold it.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::ops::{self, Value};
///
/// let values = [
///     Value::from(Bitmap::of(&[1, 2, 3, 4])),
///     Value::from(Bitmap::of(&[2, 3])),
///     Value::from(Bitmap::of(&[3, 4])),
/// ];
/// assert_eq!(ops::difference_values(&values).unwrap().to_vec(), [1, 2, 4]);
/// ```
pub fn difference_values(values: &[Value]) -> Result<Bitmap> {
    let bitmaps = bitmaps(values)?;
    match bitmaps.first() {
        Some(first) => Ok(difference(first, &intersect(&bitmaps))),
        None => Ok(Bitmap::new()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inputs_untouched() {
        let a = Bitmap::of(&[1, 2, 3]);
        let b = Bitmap::of(&[3, 4]);

        let _ = union(&[&a, &b]);
        let _ = intersect(&[&a, &b]);
        let _ = symmetric_difference(&[&a, &b]);
        let _ = difference(&a, &b);

        assert_eq!(a.to_vec(), [1, 2, 3]);
        assert_eq!(b.to_vec(), [3, 4]);
    }

    #[test]
    fn no_operands() {
        assert!(union(&[]).is_empty());
        assert!(intersect(&[]).is_empty());
        assert!(symmetric_difference(&[]).is_empty());
        assert!(difference_values(&[]).unwrap().is_empty());
    }

    #[test]
    fn single_operand_is_a_copy() {
        let a = Bitmap::of(&[5, 6]);
        assert_eq!(intersect(&[&a]), a);
        assert_eq!(symmetric_difference(&[&a]), a);
    }

    #[test]
    fn difference_ignores_absent_members() {
        let a = Bitmap::of(&[1, 2]);
        let b = Bitmap::of(&[2, 99]);
        assert_eq!(difference(&a, &b).to_vec(), [1]);
        // xor would have inserted 99
        assert_eq!(symmetric_difference(&[&a, &b]).to_vec(), [1, 99]);
    }

    #[test]
    fn xor_chain_is_odd_parity() {
        let a = Bitmap::of(&[1, 2]);
        let b = Bitmap::of(&[2]);
        let c = Bitmap::of(&[2, 3]);
        assert_eq!(symmetric_difference(&[&a, &b, &c]).to_vec(), [1, 2, 3]);
    }

    #[test]
    fn in_place_remove_mutates() {
        let mut shard = Bitmap::of(&[1, 2, 3, 4]);
        in_place_remove(&mut shard, &Bitmap::of(&[2, 4, 8]));
        assert_eq!(shard.to_vec(), [1, 3]);
    }

    #[test]
    fn values_type_checked() {
        let values = vec![
            Value::from(Bitmap::of(&[1, 2, 3])),
            Value::from(Bitmap::of(&[2])),
            Value::Str("3".into()),
        ];
        for f in [
            union_values,
            intersect_values,
            symmetric_difference_values,
            difference_values,
        ] {
            match f(&values) {
                Err(Error::TypeMismatch { position, found }) => {
                    assert_eq!(position, 2);
                    assert_eq!(found, "string");
                }
                other => panic!("expected type mismatch, got {:?}", other),
            }
        }
    }

    #[test]
    fn values_delegate() {
        let values = vec![
            Value::from(Bitmap::of(&[1, 2, 3, 4])),
            Value::from(Bitmap::of(&[2])),
            Value::from(Bitmap::of(&[4, 5])),
        ];
        assert_eq!(union_values(&values).unwrap().to_vec(), [1, 2, 3, 4, 5]);
        assert!(intersect_values(&values).unwrap().is_empty());
        assert_eq!(
            symmetric_difference_values(&values).unwrap().to_vec(),
            [1, 3, 5]
        );
        // nothing is common to all three operands
        assert_eq!(difference_values(&values).unwrap().to_vec(), [1, 2, 3, 4]);
    }

    #[test]
    fn difference_values_removes_common_members() {
        let a = Bitmap::of(&[1, 2, 3, 4]);
        let b = Bitmap::of(&[2, 3]);
        let c = Bitmap::of(&[3, 4]);

        let pair = [Value::from(a.clone()), Value::from(b.clone())];
        assert_eq!(difference_values(&pair).unwrap(), difference(&a, &b));

        let three = [Value::from(a), Value::from(b), Value::from(c)];
        assert_eq!(difference_values(&three).unwrap().to_vec(), [1, 2, 4]);
    }
}
