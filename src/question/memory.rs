//! Recency memory keeping recently asked questions out of rotation.

use indexmap::IndexSet;

/// Default number of recently asked questions remembered.
pub const DEFAULT_CAPACITY: usize = 200;

/// Bounded FIFO of recently asked question texts.
///
/// Backed by an insertion-ordered set, so a text is stored at most once and the oldest entry
/// sits at index 0.
#[derive(Debug, Clone)]
pub struct RecencyMemory {
    capacity: usize,
    texts: IndexSet<String>,
}

impl Default for RecencyMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RecencyMemory {
    /// Create an empty memory holding at most `capacity` texts (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            texts: IndexSet::with_capacity(capacity + 1),
        }
    }

    /// Whether `text` was asked recently.
    pub fn seen(&self, text: &str) -> bool {
        self.texts.contains(text)
    }

    /// Remember `text`, evicting the oldest entry once capacity is exceeded.
    ///
    /// Recording a text that is already present keeps its original position.
    pub fn record(&mut self, text: impl Into<String>) {
        self.texts.insert(text.into());
        if self.texts.len() > self.capacity {
            self.texts.shift_remove_index(0);
        }
    }

    /// Number of remembered texts.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_recorded_texts() {
        let mut memory = RecencyMemory::new(3);
        assert!(!memory.seen("q1"));
        memory.record("q1");
        assert!(memory.seen("q1"));
        assert!(!memory.seen("q2"));
    }

    #[test]
    fn never_exceeds_capacity_and_evicts_oldest() {
        let mut memory = RecencyMemory::new(3);
        for i in 0..10 {
            memory.record(format!("q{i}"));
            assert!(memory.len() <= 3);
        }
        assert!(!memory.seen("q6"));
        assert!(memory.seen("q7"));
        assert!(memory.seen("q8"));
        assert!(memory.seen("q9"));
    }

    #[test]
    fn capacity_plus_one_evicts_exactly_the_first() {
        let mut memory = RecencyMemory::new(2);
        memory.record("first");
        memory.record("second");
        memory.record("third");
        assert!(!memory.seen("first"));
        assert!(memory.seen("second"));
        assert!(memory.seen("third"));
    }

    #[test]
    fn duplicate_record_does_not_grow() {
        let mut memory = RecencyMemory::new(2);
        memory.record("same");
        memory.record("same");
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut memory = RecencyMemory::new(0);
        memory.record("a");
        memory.record("b");
        assert_eq!(memory.capacity(), 1);
        assert!(memory.seen("b"));
        assert!(!memory.seen("a"));
    }
}
