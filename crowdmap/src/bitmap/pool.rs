use std::cell::Cell;
use std::marker::PhantomData;

use croaring::Bitmap;

/// A value that can be handed out again after being reset
pub trait Recycle {
    fn fresh() -> Self;

    /// Bring the value back to the state [`Recycle::fresh`] would return
    fn recycle(&mut self);
}

impl Recycle for Bitmap {
    fn fresh() -> Self {
        Bitmap::new()
    }

    fn recycle(&mut self) {
        self.clear();
    }
}

/// A free list of reusable values, owned by a single apply path.
///
/// The pool can move between threads but cannot be shared by them.
///
/// # Examples
///
/// ```
/// use croaring::Bitmap;
/// use crowdmap::bitmap::Pool;
///
/// let mut pool: Pool<Bitmap> = Pool::with_capacity(4);
/// let mut bitmap = pool.acquire();
/// bitmap.add(7);
/// pool.release(bitmap);
///
/// assert_eq!(pool.len(), 1);
/// assert!(pool.acquire().is_empty());
/// ```
pub struct Pool<T> {
    free: Vec<T>,
    capacity: usize,
    _unsync: PhantomData<Cell<()>>,
}

impl<T: Recycle> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Pool {
            free: Vec::new(),
            capacity,
            _unsync: PhantomData,
        }
    }

    /// Takes a value out of the pool, creating one if the pool is empty
    pub fn acquire(&mut self) -> T {
        self.free.pop().unwrap_or_else(T::fresh)
    }

    /// Resets `value` and keeps it for reuse, or drops it if the pool is full
    pub fn release(&mut self, mut value: T) {
        if self.free.len() < self.capacity {
            value.recycle();
            self.free.push(value);
        }
    }

    /// Number of idle values held
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.free.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn release_clears() {
        let mut pool: Pool<Bitmap> = Pool::with_capacity(2);
        pool.release(Bitmap::of(&[1, 2, 3]));
        let reused = pool.acquire();
        assert!(reused.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn full_pool_drops() {
        let mut pool: Pool<Bitmap> = Pool::with_capacity(1);
        pool.release(Bitmap::of(&[1]));
        pool.release(Bitmap::of(&[2]));
        assert_eq!(pool.len(), 1);

        let mut none: Pool<Bitmap> = Pool::with_capacity(0);
        none.release(Bitmap::of(&[1]));
        assert!(none.is_empty());
    }
}
