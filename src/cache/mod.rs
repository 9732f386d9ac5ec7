//! A thread-safe, bounded, LRU object cache keyed by canonical request
//! URI: host and path, with the port stripped, so that `http://h/p`
//! and `http://h:80/p` collide.
//!
//! Storage is an arena-indexed doubly-linked list (a slab of [`Entry`]
//! values addressed by `usize`) plus a `HashMap` from key to slab
//! index, guarded by a single [`RwLock`]. `lookup`'s recency bump is a
//! mutation and always takes the write side of the lock — never the
//! read side — so it can never race another reader's bump.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::consts::{MAX_CACHE_SIZE, MAX_OBJECT_SIZE};

#[derive(Debug)]
struct Entry {
    key: String,
    payload: Vec<u8>,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
struct Inner {
    slots: Vec<Option<Entry>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    total_size: usize,
}

impl Inner {
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = self.slots[idx].as_ref().expect("unlink of vacant slot");
            (entry.prev, entry.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let entry = self.slots[idx].as_mut().unwrap();
            entry.prev = None;
            entry.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.slots[old_head].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn alloc(&mut self, entry: Entry) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(entry);
            idx
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    /// Removes the entry at `idx` from the recency list, the key
    /// index, and the slab, and subtracts its size from `total_size`.
    fn evict(&mut self, idx: usize) {
        self.unlink(idx);
        let entry = self.slots[idx].take().expect("evict of vacant slot");
        self.index.remove(&entry.key);
        self.total_size -= entry.payload.len();
        self.free.push(idx);
    }

    fn evict_tail(&mut self) -> bool {
        match self.tail {
            Some(idx) => {
                self.evict(idx);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug)]
pub enum LookupOutcome {
    Hit { size: usize },
    Miss,
    BufferTooSmall,
}

#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Rejected,
}

/// Process-wide shared cache handle. Clone-and-share via `Arc<Cache>`
/// into every worker instead of reaching for global mutable storage.
#[derive(Debug, Default)]
pub struct Cache {
    inner: RwLock<Inner>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`. On a hit, copies the payload into `out` and
    /// moves the entry to the head of the recency list. `out` must be
    /// at least as large as the entry (callers pass a
    /// `MAX_OBJECT_SIZE`-sized buffer, which is always sufficient
    /// since entries can never exceed that size).
    pub fn lookup(&self, key: &str, out: &mut [u8]) -> LookupOutcome {
        let mut inner = self.inner.write().unwrap();
        let Some(&idx) = inner.index.get(key) else {
            return LookupOutcome::Miss;
        };
        let size = inner.slots[idx].as_ref().unwrap().payload.len();
        // A zero-length buffer can never hold a hit, even a zero-byte
        // one, so it must be checked before the general length
        // comparison (which would otherwise let 0 < 0 fall through).
        if out.is_empty() || out.len() < size {
            return LookupOutcome::BufferTooSmall;
        }
        out[..size].copy_from_slice(&inner.slots[idx].as_ref().unwrap().payload);
        inner.unlink(idx);
        inner.push_front(idx);
        LookupOutcome::Hit { size }
    }

    /// Inserts or replaces `key` with `payload`. Evicts LRU entries
    /// until the new payload fits within `MAX_CACHE_SIZE`.
    pub fn insert(&self, key: &str, payload: &[u8]) -> InsertOutcome {
        let size = payload.len();
        if size > MAX_OBJECT_SIZE {
            return InsertOutcome::Rejected;
        }

        let mut inner = self.inner.write().unwrap();

        if let Some(&idx) = inner.index.get(key) {
            inner.evict(idx);
        }

        while inner.total_size + size > MAX_CACHE_SIZE {
            if !inner.evict_tail() {
                break;
            }
        }

        let idx = inner.alloc(Entry {
            key: key.to_string(),
            payload: payload.to_vec(),
            prev: None,
            next: None,
        });
        inner.index.insert(key.to_string(), idx);
        inner.push_front(idx);
        inner.total_size += size;

        InsertOutcome::Inserted
    }

    /// Evicts every entry. Called once, at process teardown.
    pub fn shutdown(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.slots.clear();
        inner.free.clear();
        inner.index.clear();
        inner.head = None;
        inner.tail = None;
        inner.total_size = 0;
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_size(&self) -> usize {
        self.inner.read().unwrap().total_size
    }
}
