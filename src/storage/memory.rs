//! In-memory bucket.
//!
//! Clones share the same map, so two stores over clones of one bucket
//! behave like two browser tabs on the same origin.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::Result;
use crate::storage::{BackendType, Bucket};

/// A bucket held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBucket {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Bucket for MemoryBucket {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        BackendType::Memory.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut bucket = MemoryBucket::new();
        assert_eq!(bucket.get_item("k").unwrap(), None);

        bucket.set_item("k", "v1").unwrap();
        bucket.set_item("k", "v2").unwrap();
        assert_eq!(bucket.get_item("k").unwrap().as_deref(), Some("v2"));

        bucket.remove_item("k").unwrap();
        bucket.remove_item("k").unwrap();
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_clones_share_items() {
        let mut tab_a = MemoryBucket::new();
        let tab_b = tab_a.clone();
        tab_a.set_item("k", "v").unwrap();
        assert_eq!(tab_b.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(tab_b.len(), 1);
    }
}
