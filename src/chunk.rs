//! A bounded, in-memory batch of elements moving through the build phase.

use crate::codec::LessFn;

/// A fixed-capacity buffer of elements. The chunk builder fills it from the input sequence; a
/// sort worker sorts it in place; the run writer drains it to a run file.
pub(crate) struct Chunk<E> {
    items: Vec<E>,
    capacity: usize,
}

impl<E> Chunk<E> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity.min(4096)), capacity }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Appends `item`. Returns it back, unappended, if the chunk is already at capacity.
    pub(crate) fn push(&mut self, item: E) -> Result<(), E> {
        if self.is_full() {
            Err(item)
        } else {
            self.items.push(item);
            Ok(())
        }
    }

    pub(crate) fn sort(&mut self, less: &LessFn<E>) {
        self.items.sort_by(|a, b| {
            if less(a, b) {
                std::cmp::Ordering::Less
            } else if less(b, a) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
    }

    pub(crate) fn into_vec(self) -> Vec<E> {
        self.items
    }
}
