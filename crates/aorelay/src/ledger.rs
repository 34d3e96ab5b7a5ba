//! Deduplication ledger for admitted requests

use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory set of request identifiers already accepted for processing
///
/// Admission is an atomic check-and-insert, so overlapping poll cycles
/// cannot hand the same request to two handlers. Entries are never
/// removed for the lifetime of the process: an identifier admitted once
/// stays retired even if its handler later fails, and the set grows
/// without bound.
#[derive(Debug, Default)]
pub struct Ledger {
    seen: Mutex<HashSet<String>>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as being handled.
    ///
    /// Returns true the first time it is called for an identifier and
    /// false on every later call, under any interleaving of callers.
    pub fn admit(&self, id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.insert(id.to_string())
    }

    /// Number of identifiers admitted so far
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True if nothing has been admitted yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_admit_is_true_exactly_once() {
        let ledger = Ledger::new();
        assert!(ledger.admit("a"));
        assert!(!ledger.admit("a"));
        assert!(!ledger.admit("a"));
        assert!(ledger.admit("b"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_concurrent_admission_single_winner() {
        let ledger = Arc::new(Ledger::new());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.admit("contested"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(ledger.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_first_occurrence_wins(ids in proptest::collection::vec("[a-z0-9]{1,8}", 0..64)) {
            let ledger = Ledger::new();
            let mut reference = std::collections::HashSet::new();

            for id in &ids {
                let expected = reference.insert(id.clone());
                prop_assert_eq!(ledger.admit(id), expected);
            }

            prop_assert_eq!(ledger.len(), reference.len());
        }
    }
}
