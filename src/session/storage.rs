// src/session/storage.rs
//! Tab-scoped volatile key/value storage
//!
//! Modelled on browser `sessionStorage`: string keys, string values, gone
//! when the tab is. The cache only ever writes wrapped values here.

use std::collections::HashMap;

pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: String);

    fn remove_item(&mut self, key: &str);

    fn keys(&self) -> Vec<String>;

    fn clear(&mut self);
}

/// Process-memory storage; the default backing for native hosts and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    items: HashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_owned(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}
