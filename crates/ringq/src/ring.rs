use crate::error::ConfigError;
use crate::invariants::{debug_assert_bounded_count, debug_assert_indices_consistent};

// =============================================================================
// STORAGE & INDEXING
// =============================================================================
//
// Slots are `Option<T>` so the buffer never holds uninitialized memory and
// popped slots release their value immediately. `head` is the next slot to
// read, `tail` the next slot to write, both kept in `[0, capacity)`.
// `len` disambiguates full from empty when `head == tail`.
//
// The ring has no internal locking. `AsyncMessageQueue` owns two instances and
// only touches them inside its critical section.
//
// =============================================================================

/// Fixed-capacity circular buffer.
///
/// `push` fails instead of overwriting when the buffer is full; callers decide
/// what to evict.
pub struct RingBuffer<T> {
    /// The slots. Size is fixed at construction (never grows/shrinks).
    buffer: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring with room for `capacity` items.
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || None);

        Ok(Self {
            buffer: buffer.into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the current number of items in the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the ring is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the ring is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    // ---------------------------------------------------------------------
    // PUSH / POP
    // ---------------------------------------------------------------------

    /// Appends an item at the tail.
    ///
    /// Returns `Err(item)` if the ring is full, handing the item back to the
    /// caller untouched.
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        self.buffer[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;

        debug_assert_bounded_count!(self.len, self.capacity());
        debug_assert_indices_consistent!(self.head, self.tail, self.len, self.capacity());

        Ok(())
    }

    /// Appends an item at the tail.
    ///
    /// Returns `false` if the ring is full; the item is dropped in that case.
    /// Use [`try_push`](Self::try_push) to get the item back.
    #[inline]
    pub fn push(&mut self, item: T) -> bool {
        self.try_push(item).is_ok()
    }

    /// Removes and returns the item at the head.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.buffer[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;

        debug_assert_indices_consistent!(self.head, self.tail, self.len, self.capacity());

        item
    }

    /// Returns a reference to the item at the head without removing it.
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            self.buffer[self.head].as_ref()
        }
    }

    /// Drops every stored item and resets the indices.
    ///
    /// Returns the number of items discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.len;
        for slot in self.buffer.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
        discarded
    }

    // ---------------------------------------------------------------------
    // SNAPSHOTS
    // ---------------------------------------------------------------------

    /// Iterates over stored items in logical order (head → tail).
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.buffer[(self.head + i) % capacity].as_ref())
    }

    /// Copies the stored items in logical order (head → tail).
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}
