//! Consume-once handle arena.
//!
//! A [`HandleTable`] owns its elements and names each one with an opaque,
//! non-zero [`SchemaHandle`]. Handles are consumed by [`HandleTable::take`];
//! presenting the same handle again is a miss, never a stale hit.
//!
//! # Handle layout
//!
//! ```text
//! |------------ 64 bits total ------------|
//! |   session tag   |   sequence number   |
//! |     32 bits     |       32 bits       |
//! ```
//!
//! The session tag is drawn once per table from a process-wide counter, so a
//! handle issued by one table is unknown to every other table. Sequence
//! numbers start at 1, which keeps `0` free as the failure sentinel.

use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

/// Opaque identifier for an element owned by a [`HandleTable`].
pub type SchemaHandle = u64;

/// Sentinel meaning "no handle" or "the operation failed".
pub const NULL_HANDLE: SchemaHandle = 0;

const SEQUENCE_BITS: u32 = 32;

static NEXT_SESSION_TAG: AtomicU32 = AtomicU32::new(1);

fn next_session_tag() -> u32 {
    NEXT_SESSION_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Arena mapping live handles to owned elements.
///
/// Handles are never reused within a table: the sequence only moves forward,
/// even when elements are taken and re-inserted.
#[derive(Debug)]
pub struct HandleTable<T> {
    tag: u32,
    next_sequence: u32,
    entries: FxHashMap<SchemaHandle, T>,
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            tag: next_session_tag(),
            next_sequence: 1,
            entries: FxHashMap::default(),
        }
    }

    /// Take ownership of `element` and return a fresh, non-zero handle for it.
    ///
    /// # Panics
    ///
    /// Panics if the table has issued `u32::MAX` handles. Reaching that point
    /// is an internal invariant violation, not a caller error.
    pub fn insert(&mut self, element: T) -> SchemaHandle {
        let sequence = self.next_sequence;
        self.next_sequence = sequence
            .checked_add(1)
            .expect("schema handle sequence exhausted");
        let handle = ((self.tag as u64) << SEQUENCE_BITS) | sequence as u64;
        let previous = self.entries.insert(handle, element);
        debug_assert!(previous.is_none(), "handle {handle} issued twice");
        tracing::trace!(handle, live = self.entries.len(), "schema handle issued");
        handle
    }

    /// Remove and return the element named by `handle`.
    ///
    /// Returns `None` without touching the table when `handle` is
    /// [`NULL_HANDLE`], was never issued by this table, or was already taken.
    pub fn take(&mut self, handle: SchemaHandle) -> Option<T> {
        if handle == NULL_HANDLE {
            return None;
        }
        let element = self.entries.remove(&handle);
        if element.is_some() {
            tracing::trace!(handle, live = self.entries.len(), "schema handle consumed");
        }
        element
    }

    /// Borrow the element named by `handle` without consuming it.
    pub fn get(&self, handle: SchemaHandle) -> Option<&T> {
        self.entries.get(&handle)
    }

    pub fn contains(&self, handle: SchemaHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the live handles in no particular order.
    pub fn handles(&self) -> impl Iterator<Item = SchemaHandle> + '_ {
        self.entries.keys().copied()
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;
    use std::rc::Rc;

    #[test]
    fn handles_are_unique_and_non_zero() {
        let mut table = HandleTable::new();
        let mut seen = FxHashSet::default();
        for i in 0..1_000 {
            let handle = table.insert(i);
            assert_ne!(handle, NULL_HANDLE);
            assert!(seen.insert(handle), "handle {handle} issued twice");
        }
        assert_eq!(table.len(), 1_000);
    }

    #[test]
    fn take_consumes_exactly_once() {
        let mut table = HandleTable::new();
        let handle = table.insert("payload");
        assert_eq!(table.take(handle), Some("payload"));
        assert_eq!(table.take(handle), None);
        assert_eq!(table.take(handle), None);
        assert!(table.is_empty());
    }

    #[test]
    fn null_and_unknown_handles_do_not_mutate() {
        let mut table = HandleTable::new();
        let handle = table.insert(1u8);
        assert_eq!(table.take(NULL_HANDLE), None);
        assert_eq!(table.take(handle + 1), None);
        assert_eq!(table.take(u64::MAX), None);
        assert_eq!(table.len(), 1);
        assert!(table.contains(handle));
    }

    #[test]
    fn reinserted_element_gets_a_new_handle() {
        let mut table = HandleTable::new();
        let first = table.insert(5);
        let value = table.take(first).unwrap();
        let second = table.insert(value);
        assert_ne!(first, second);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&5));
    }

    #[test]
    fn handles_do_not_cross_tables() {
        let mut left = HandleTable::new();
        let mut right = HandleTable::new();
        let left_handle = left.insert('l');
        let right_handle = right.insert('r');
        assert_ne!(left_handle, right_handle);
        assert_eq!(right.take(left_handle), None);
        assert_eq!(left.take(right_handle), None);
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);
    }

    #[test]
    fn drop_releases_unconsumed_elements_once() {
        let payload = Rc::new(());
        {
            let mut table = HandleTable::new();
            for _ in 0..8 {
                table.insert(Rc::clone(&payload));
            }
            let handle = table.handles().next().unwrap();
            let taken = table.take(handle).unwrap();
            drop(taken);
            assert_eq!(Rc::strong_count(&payload), 8);
        }
        assert_eq!(Rc::strong_count(&payload), 1);
    }
}
