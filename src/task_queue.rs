//! Fixed-capacity FIFO queue backed by a preallocated ring buffer.

use crate::error::SchedulerError;

/// A bounded FIFO over a boxed slice of slots.
///
/// `head` is the next slot to dequeue, `tail` the next slot to fill; both
/// advance modulo the capacity. The slot count never changes after
/// construction.
pub struct BoundedQueue<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> BoundedQueue<T> {
    /// Create an empty queue; negative or unallocatable capacities are rejected.
    pub fn new(capacity: i64) -> Result<Self, SchedulerError> {
        if capacity < 0 {
            return Err(SchedulerError::NegativeCapacity(capacity));
        }
        let too_large = || SchedulerError::CapacityTooLarge(capacity);
        let slot_count = usize::try_from(capacity).map_err(|_| too_large())?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(slot_count)
            .map_err(|_| too_large())?;
        slots.resize_with(slot_count, || None);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Append at the tail; hands the item back untouched if the queue is full.
    pub fn enqueue(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.len += 1;
        Ok(())
    }

    /// Remove the head, or return `None` without touching state when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        item
    }

    /// Mutable access to the head without removing it.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head].as_mut()
    }

    /// Move the head to the tail. Size is unchanged, so this works on a full queue.
    pub fn rotate(&mut self) {
        if self.is_empty() {
            return;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.slots[self.tail] = item;
        self.tail = (self.tail + 1) % self.slots.len();
    }

    /// Head-to-tail view of the queued items.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            offset: 0,
        }
    }
}

pub struct Iter<'a, T> {
    queue: &'a BoundedQueue<T>,
    offset: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.queue.len {
            return None;
        }
        let index = (self.queue.head + self.offset) % self.queue.slots.len();
        self.offset += 1;
        self.queue.slots[index].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.queue.len - self.offset;
        (left, Some(left))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a BoundedQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
