//! Turn-ordered queue.
//!
//! Keeps items sorted ascending by turn. Equal turns keep insertion order:
//! a new entry goes after every existing entry with the same turn, so the
//! position itself records arrival order among ties.
//!
//! # Complexity
//! - `insert`: O(log n) search + O(n) shift worst case, O(1) at either end
//! - `pop_min`: O(1)
//! - `iter`: lazy, O(1) per step, restartable via `Clone`

use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct QueueEntry<T> {
    turn: i64,
    item: T,
}

/// A stable, turn-ordered queue.
///
/// # Example
/// ```
/// use turnstile_dispatch::dispatching::TurnQueue;
///
/// let mut q = TurnQueue::new();
/// q.insert(10, "b");
/// q.insert(0, "a");
/// q.insert(10, "c");
/// let order: Vec<_> = q.iter().map(|(_, item)| *item).collect();
/// assert_eq!(order, vec!["a", "b", "c"]);
/// assert_eq!(q.pop_min(), Some((0, "a")));
/// ```
#[derive(Debug, Clone)]
pub struct TurnQueue<T> {
    entries: VecDeque<QueueEntry<T>>,
}

impl<T> TurnQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue has no items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts after all entries whose turn is `<= turn`.
    pub fn insert(&mut self, turn: i64, item: T) {
        let entry = QueueEntry { turn, item };

        // Fast paths for the common append and jump-the-line cases.
        let appends = self.entries.back().map_or(true, |last| last.turn <= turn);
        let jumps = self.entries.front().is_some_and(|first| turn < first.turn);
        if appends {
            self.entries.push_back(entry);
        } else if jumps {
            self.entries.push_front(entry);
        } else {
            let pos = self.entries.partition_point(|e| e.turn <= turn);
            self.entries.insert(pos, entry);
        }
    }

    /// Removes and returns the lowest-turn item, or `None` when empty.
    pub fn pop_min(&mut self) -> Option<(i64, T)> {
        self.entries.pop_front().map(|e| (e.turn, e.item))
    }

    /// Lowest-turn entry without removing it.
    pub fn peek_min(&self) -> Option<(i64, &T)> {
        self.entries.front().map(|e| (e.turn, &e.item))
    }

    /// Highest-turn entry (the queue tail).
    pub fn peek_tail(&self) -> Option<(i64, &T)> {
        self.entries.back().map(|e| (e.turn, &e.item))
    }

    /// Items in turn order, without mutating the queue.
    pub fn iter(&self) -> TurnIter<'_, T> {
        TurnIter {
            inner: self.entries.iter(),
        }
    }

    /// Adds `delta` to every queued turn.
    ///
    /// A uniform shift preserves both the order and the tie-break. Returns
    /// `false` and leaves the queue untouched if any turn would overflow.
    pub fn shift_all(&mut self, delta: i64) -> bool {
        if !self.shift_fits(0, delta) {
            return false;
        }
        for e in self.entries.iter_mut() {
            e.turn += delta;
        }
        true
    }

    /// Whether every entry after the first `skip` can move by `delta`
    /// without overflow. The queue is sorted, so only its ends matter.
    pub fn shift_fits(&self, skip: usize, delta: i64) -> bool {
        let first = self.entries.get(skip).map(|e| e.turn);
        let last = self.entries.back().map(|e| e.turn);
        match (first, last) {
            (Some(lo), Some(hi)) => {
                lo.checked_add(delta).is_some() && hi.checked_add(delta).is_some()
            }
            _ => true,
        }
    }
}

impl<T> Default for TurnQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy in-order iterator over `(turn, item)` pairs.
#[derive(Debug)]
pub struct TurnIter<'a, T> {
    inner: std::collections::vec_deque::Iter<'a, QueueEntry<T>>,
}

impl<T> Clone for TurnIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for TurnIter<'a, T> {
    type Item = (i64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (e.turn, &e.item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for TurnIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns<T>(q: &TurnQueue<T>) -> Vec<i64> {
        q.iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_orders_by_turn() {
        let mut q = TurnQueue::new();
        for (turn, item) in [(30, 'c'), (10, 'a'), (20, 'b'), (5, 'z'), (25, 'x')] {
            q.insert(turn, item);
        }
        assert_eq!(turns(&q), vec![5, 10, 20, 25, 30]);
    }

    #[test]
    fn test_equal_turns_keep_insertion_order() {
        let mut q = TurnQueue::new();
        q.insert(10, 1);
        q.insert(5, 0);
        q.insert(10, 2);
        q.insert(20, 4);
        q.insert(10, 3);

        let items: Vec<i32> = q.iter().map(|(_, i)| *i).collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_pop_min_and_empty() {
        let mut q = TurnQueue::new();
        assert_eq!(q.pop_min(), None);
        q.insert(7, "a");
        q.insert(3, "b");
        assert_eq!(q.pop_min(), Some((3, "b")));
        assert_eq!(q.pop_min(), Some((7, "a")));
        assert_eq!(q.pop_min(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_iter_is_restartable_and_non_mutating() {
        let mut q = TurnQueue::new();
        q.insert(1, "a");
        q.insert(2, "b");

        let it = q.iter();
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(q.len(), 2);
        assert_eq!(q.iter().len(), 2);
    }

    #[test]
    fn test_shift_all_preserves_order() {
        let mut q = TurnQueue::new();
        q.insert(0, 'a');
        q.insert(10, 'b');
        q.insert(10, 'c');
        assert!(q.shift_all(5));
        assert_eq!(turns(&q), vec![5, 15, 15]);
        let items: String = q.iter().map(|(_, c)| *c).collect();
        assert_eq!(items, "abc");
    }

    #[test]
    fn test_shift_all_refuses_overflow() {
        let mut q = TurnQueue::new();
        q.insert(0, 'a');
        q.insert(i64::MAX - 2, 'b');
        assert!(!q.shift_all(5));
        assert_eq!(turns(&q), vec![0, i64::MAX - 2]);

        assert!(q.shift_fits(0, 2));
        assert!(!q.shift_fits(1, 3));
        assert!(q.shift_fits(2, i64::MAX));
        assert!(q.shift_all(-5));
        assert_eq!(turns(&q), vec![-5, i64::MAX - 7]);
    }

    #[test]
    fn test_peek_tail_and_min() {
        let mut q = TurnQueue::new();
        assert!(q.peek_tail().is_none());
        q.insert(4, 'a');
        q.insert(9, 'b');
        q.insert(1, 'c');
        assert_eq!(q.peek_min(), Some((1, &'c')));
        assert_eq!(q.peek_tail(), Some((9, &'b')));
    }

    #[test]
    fn test_order_invariant_under_mixed_inserts() {
        let mut q = TurnQueue::new();
        let input = [7, 3, 3, 9, 0, 7, 3, 12, 0, 5];
        for (i, t) in input.iter().enumerate() {
            q.insert(*t, i);
        }
        let seen: Vec<(i64, usize)> = q.iter().map(|(t, i)| (t, *i)).collect();
        for pair in seen.windows(2) {
            let ((t0, i0), (t1, i1)) = (pair[0], pair[1]);
            assert!(t0 <= t1);
            if t0 == t1 {
                assert!(i0 < i1, "ties must stay in insertion order");
            }
        }
    }
}
