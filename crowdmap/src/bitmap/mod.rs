//! Persistence and reuse helpers around [`croaring::Bitmap`].
//!
//! Bitmaps are stored in the portable roaring format, the same bytes the Go and Java
//! roaring libraries produce, so any replica (or any tool) can read them back.

use croaring::{Bitmap, Portable};

use crate::{Error, Result};

mod frame;
pub mod ops;
mod pool;

pub use self::frame::{decode_chunks, encode_chunks};
pub use self::pool::{Pool, Recycle};

/// Serializes a bitmap in portable format.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap;
///
/// let original = Bitmap::of(&[1, 2, 3, 1000]);
/// let bytes = bitmap::encode(&original);
/// assert_eq!(bitmap::decode(&bytes).unwrap(), original);
/// ```
pub fn encode(bitmap: &Bitmap) -> Vec<u8> {
    bitmap.serialize::<Portable>()
}

/// Serializes into `scratch`, replacing its contents, and returns the encoded bytes.
pub fn encode_into<'a>(bitmap: &Bitmap, scratch: &'a mut Vec<u8>) -> &'a [u8] {
    scratch.clear();
    bitmap.serialize_into_vec::<Portable>(scratch)
}

/// Parses a bitmap written by [`encode`].
///
/// An empty slice is an absent value and yields an empty bitmap.
pub fn decode(data: &[u8]) -> Result<Bitmap> {
    if data.is_empty() {
        return Ok(Bitmap::new());
    }

    Bitmap::try_deserialize::<Portable>(data).ok_or(Error::Decode {
        key: None,
        len: data.len(),
    })
}

/// Like [`decode`], but names the storage key in the error.
pub fn decode_at(key: &[u8], data: &[u8]) -> Result<Bitmap> {
    decode(data).map_err(|err| match err {
        Error::Decode { len, .. } => Error::Decode {
            key: Some(key.to_vec()),
            len,
        },
        other => other,
    })
}
