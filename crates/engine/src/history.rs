//! Bounded FIFO history.

use std::collections::VecDeque;

/// Append-only history with a hard cap; the oldest item is evicted first.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "history cap must be positive");
        Self { items: VecDeque::with_capacity(cap), cap }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.cap {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_is_evicted_past_cap() {
        let mut history = BoundedHistory::new(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.to_vec(), vec![2, 3, 4]);
        assert_eq!(history.latest(), Some(&4));
    }
}
