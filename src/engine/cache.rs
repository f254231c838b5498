//! Packrat memo table
//!
//! Results are keyed by `(position, atom)`. Both successes and plain
//! failures are remembered; fatal errors are never stored because they end
//! the parse anyway.

use super::value::Value;
use ahash::RandomState;
use hashbrown::HashMap;

/// A remembered outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoEntry {
    /// The atom matched, producing `value` and ending at `end`
    Matched {
        /// Parse value
        value: Value,
        /// Position after the match
        end: usize,
    },
    /// The atom did not match here
    Failed,
}

/// Memo table for one parse
#[derive(Debug, Default)]
pub struct MemoTable {
    entries: HashMap<(usize, usize), MemoEntry, RandomState>,
    hits: u64,
    misses: u64,
}

impl MemoTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table sized for an input and a spec
    pub fn for_input(input_len: usize, atom_count: usize) -> Self {
        let estimated = (input_len.saturating_mul(atom_count) / 16).clamp(64, 1 << 16);
        Self {
            entries: HashMap::with_capacity_and_hasher(estimated, RandomState::new()),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up the outcome of `atom` at `pos`
    #[inline]
    pub fn get(&mut self, pos: usize, atom: usize) -> Option<&MemoEntry> {
        let entry = self.entries.get(&(pos, atom));
        if entry.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        entry
    }

    /// Remember the outcome of `atom` at `pos`
    #[inline]
    pub fn insert(&mut self, pos: usize, atom: usize, entry: MemoEntry) {
        self.entries.insert((pos, atom), entry);
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Number of remembered outcomes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut table = MemoTable::for_input(100, 10);
        assert!(table.get(0, 1).is_none());

        table.insert(
            0,
            1,
            MemoEntry::Matched {
                value: Value::string("x"),
                end: 1,
            },
        );
        table.insert(1, 1, MemoEntry::Failed);

        assert_eq!(
            table.get(0, 1),
            Some(&MemoEntry::Matched {
                value: Value::string("x"),
                end: 1
            })
        );
        assert_eq!(table.get(1, 1), Some(&MemoEntry::Failed));
        assert_eq!(table.len(), 2);
        assert_eq!(table.stats(), (2, 1));
    }

    #[test]
    fn test_clear() {
        let mut table = MemoTable::new();
        table.insert(0, 0, MemoEntry::Failed);
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.stats(), (0, 0));
    }
}
