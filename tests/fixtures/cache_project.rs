//! In-memory caches.
//!
//! Usage:
//!     lru: Evicts the least recently used entry first.

use std::collections::HashMap;

impl Cache {
    /// Adds an entry.
    ///
    /// Args:
    ///     key: Entry key.
    ///     value: Entry value.
    #[document_me]
    pub fn add(&mut self, key: String, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    /// Looks an entry up.
    ///
    /// Args:
    ///     key: Entry key.
    ///
    /// Returns:
    ///     The stored value, if any.
    #[document_me]
    pub fn retrieve(&self, key: &str) -> Option<&Vec<u8>> {
        self.entries.get(key)
    }

    /// Removes every entry.
    #[document_me]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A bounded key-value cache.
///
/// Fields:
///     capacity: Maximum number of entries.
///     entries: Stored entries.
///     name: Optional label.
#[document_me]
pub struct Cache {
    capacity: usize,
    entries: HashMap<String, Vec<u8>>,
    name: Option<String>,
}

/// Storage that can be flushed.
#[document_me]
pub trait Flush: Store + Sized {
    /// Flushes pending writes.
    ///
    /// Raises:
    ///     FlushError: The backend rejected the write.
    #[document_me]
    fn flush(&mut self) -> Result<(), FlushError>;
}

/// Computes the Fibonacci sequence.
///
/// Args:
///     n (usize): Number of terms.
///
/// Returns:
///     The first `n` terms.
#[document_me]
pub fn fibonacci_sequence(n: usize) -> Vec<u64> {
    let mut terms = vec![0, 1];
    while terms.len() < n {
        let next = terms[terms.len() - 1] + terms[terms.len() - 2];
        terms.push(next);
    }
    terms.truncate(n);
    terms
}

/// Not collected.
pub fn helper() {}
