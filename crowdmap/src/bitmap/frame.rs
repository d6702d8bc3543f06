use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use croaring::Bitmap;

use crate::Result;

/// Frames a sequence of bitmaps (typically the output of [`split`][crate::shard::split])
/// into one buffer: a `u32` chunk count, then per chunk a `u32` byte length followed by
/// its portable encoding. All integers are little endian.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::{decode_chunks, encode_chunks};
///
/// let chunks = vec![Bitmap::of(&[1, 2]), Bitmap::of(&[9])];
/// let buffer = encode_chunks(&chunks).unwrap();
/// assert_eq!(decode_chunks(&buffer).unwrap(), chunks);
/// ```
pub fn encode_chunks(chunks: &[Bitmap]) -> Result<Vec<u8>> {
    let mut buffer = vec![];
    let mut scratch = vec![];
    buffer.write_u32::<LittleEndian>(chunks.len() as u32)?;

    for chunk in chunks {
        let data = super::encode_into(chunk, &mut scratch);
        buffer.write_u32::<LittleEndian>(data.len() as u32)?;
        buffer.extend_from_slice(data);
    }

    Ok(buffer)
}

/// Reverses [`encode_chunks`]
pub fn decode_chunks(buffer: &[u8]) -> Result<Vec<Bitmap>> {
    let mut cursor = Cursor::new(buffer);
    let count = cursor.read_u32::<LittleEndian>()?;

    let mut chunks = Vec::with_capacity(count.min(1024) as usize);
    let mut data = Vec::new();
    for _ in 0..count {
        let len = cursor.read_u32::<LittleEndian>()? as usize;
        let remaining = buffer.len() - cursor.position() as usize;
        if len > remaining {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        data.resize(len, 0);
        cursor.read_exact(&mut data)?;
        chunks.push(super::decode(&data)?);
    }

    Ok(chunks)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    #[test]
    fn lone_empty_chunk() {
        let buffer = encode_chunks(&[Bitmap::new()]).unwrap();
        let chunks = decode_chunks(&buffer).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
    }

    #[test]
    fn truncated_frame() {
        let buffer = encode_chunks(&[Bitmap::of(&[1, 2, 3])]).unwrap();
        let err = decode_chunks(&buffer[..buffer.len() - 1]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn oversized_length_prefix() {
        let mut buffer = vec![];
        buffer.write_u32::<LittleEndian>(1).unwrap();
        buffer.write_u32::<LittleEndian>(u32::MAX).unwrap();
        buffer.extend([0; 8]);
        assert!(matches!(decode_chunks(&buffer), Err(Error::Io(_))));
    }

    #[test]
    fn corrupt_chunk() {
        let mut buffer = vec![];
        buffer.write_u32::<LittleEndian>(1).unwrap();
        buffer.write_u32::<LittleEndian>(2).unwrap();
        buffer.extend([0xde, 0xad]);
        assert!(matches!(
            decode_chunks(&buffer),
            Err(Error::Decode { len: 2, .. })
        ));
    }
}
