// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Binary min-heap of payloads ordered by a floating-point priority.
///
/// The queue does not deduplicate payloads - inserting the same payload twice
/// results in two independent entries. [crate::shortest_path] relies on
/// a visited set to discard stale entries instead.
#[derive(Debug, Clone)]
pub struct MinQueue<T> {
    heap: Vec<(T, f64)>,
}

impl<T> Default for MinQueue<T> {
    fn default() -> Self {
        Self { heap: Vec::new() }
    }
}

impl<T> MinQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds a new entry to the queue.
    pub fn insert(&mut self, payload: T, priority: f64) {
        self.heap.push((payload, priority));
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the entry with the lowest priority,
    /// or `None` if the queue is empty.
    pub fn extract_min(&mut self) -> Option<(T, f64)> {
        if self.heap.is_empty() {
            return None;
        }

        let min = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.heap[idx].1 < self.heap[parent].1 {
                self.heap.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;

            if left < self.heap.len() && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < self.heap.len() && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }

            if smallest == idx {
                break;
            }

            self.heap.swap(idx, smallest);
            idx = smallest;
        }
    }
}

impl<T: PartialEq> MinQueue<T> {
    /// Lowers the priority of the first entry (in heap order) with the given payload.
    ///
    /// This requires a linear scan over the queue. Nothing happens if no entry
    /// matches, or if `new_priority` is not strictly lower than the current one.
    /// Returns `true` if the priority was lowered.
    pub fn decrease_key(&mut self, payload: &T, new_priority: f64) -> bool {
        match self.heap.iter().position(|(p, _)| p == payload) {
            Some(idx) if new_priority < self.heap[idx].1 => {
                self.heap[idx].1 = new_priority;
                self.sift_up(idx);
                true
            }
            _ => false,
        }
    }
}
