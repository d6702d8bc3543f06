use std::num::NonZeroU64;

use croaring::Bitmap;

/// Cuts `bitmap` into chunks of at most `max_size` members, in ascending member order.
///
/// Every chunk but the last holds exactly `max_size` members. An empty bitmap yields a
/// single empty chunk.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU64;
/// use croaring::Bitmap;
/// use crowdmap::shard;
///
/// let bitmap: Bitmap = (0..5).collect();
/// let chunks = shard::split(&bitmap, NonZeroU64::new(2).unwrap());
///
/// let chunks: Vec<Vec<u32>> = chunks.iter().map(Bitmap::to_vec).collect();
/// assert_eq!(chunks, [vec![0, 1], vec![2, 3], vec![4]]);
/// ```
pub fn split(bitmap: &Bitmap, max_size: NonZeroU64) -> Vec<Bitmap> {
    let max_size = max_size.get();
    let mut chunks = vec![Bitmap::new()];
    let mut filled = 0u64;

    let mut buf = [0u32; 1024];
    let mut iter = bitmap.iter();
    loop {
        let n = iter.next_many(&mut buf);
        if n == 0 {
            break;
        }

        let mut values = &buf[..n];
        while !values.is_empty() {
            if filled == max_size {
                chunks.push(Bitmap::new());
                filled = 0;
            }

            let room = (max_size - filled).min(values.len() as u64) as usize;
            let last = chunks.len() - 1;
            chunks[last].add_many(&values[..room]);
            filled += room as u64;
            values = &values[room..];
        }
    }

    chunks
}
