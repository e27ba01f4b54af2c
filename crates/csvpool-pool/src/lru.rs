//! Index-linked LRU map.
//!
//! Entries live in a slot vector and are chained into a doubly linked list by
//! slot index, least recently used at the head. A `HashMap` maps each key to
//! its slot, so lookup, touch, insert and pop-oldest are all O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct LruMap<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K, V> Default for LruMap<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }
}

impl<K: Hash + Eq + Clone, V> LruMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            index: HashMap::with_capacity(n),
            slots: Vec::with_capacity(n),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Look up without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|n| &n.value)
    }

    /// Look up and mark the entry most recently used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.unlink(idx);
        self.push_back(idx);
        self.slots[idx].as_mut().map(|n| &mut n.value)
    }

    /// Insert as most recently used. Returns the previous value for `key`.
    ///
    /// Never evicts; callers decide when to `pop_lru`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            self.unlink(idx);
            self.push_back(idx);
            return self.slots[idx]
                .as_mut()
                .map(|n| std::mem::replace(&mut n.value, value));
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.push_back(idx);
        None
    }

    /// Remove and return the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.head?;
        self.take_slot(idx)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            map: self,
            cursor: self.head,
        }
    }

    /// Values in slot order (not recency order).
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.slots.iter_mut().flatten().map(|n| &mut n.value)
    }

    /// Remove every entry, least recently used first.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(entry) = self.pop_lru() {
            out.push(entry);
        }
        self.slots.clear();
        self.free.clear();
        out
    }

    fn take_slot(&mut self, idx: usize) -> Option<(K, V)> {
        self.unlink(idx);
        let node = self.slots[idx].take()?;
        self.index.remove(&node.key);
        self.free.push(idx);
        Some((node.key, node.value))
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_mut() {
            Some(n) => (n.prev.take(), n.next.take()),
            None => return,
        };
        match prev {
            Some(p) => {
                if let Some(n) = self.slots[p].as_mut() {
                    n.next = next;
                }
            }
            None => {
                if self.head == Some(idx) {
                    self.head = next;
                }
            }
        }
        match next {
            Some(nx) => {
                if let Some(n) = self.slots[nx].as_mut() {
                    n.prev = prev;
                }
            }
            None => {
                if self.tail == Some(idx) {
                    self.tail = prev;
                }
            }
        }
    }

    fn push_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(n) = self.slots[idx].as_mut() {
            n.prev = old_tail;
            n.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(n) = self.slots[t].as_mut() {
                    n.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

pub struct Keys<'a, K, V> {
    map: &'a LruMap<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let node = self.map.slots[self.cursor?].as_ref()?;
        self.cursor = node.next;
        Some(&node.key)
    }
}
