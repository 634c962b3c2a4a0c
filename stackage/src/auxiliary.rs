//! Free-form per-instance storage.
//!
//! The core never interprets what is stored here. Clones of an [`Auxiliary`] share the
//! same map.
use std::{any::Any, collections::BTreeMap, sync::Arc};

use downcast_rs::{DowncastSync, impl_downcast};
use parking_lot::RwLock;

/// Any shareable value may be stored in an [`Auxiliary`] map.
pub trait AuxObject: DowncastSync {}
impl_downcast!(sync AuxObject);

impl<T: Any + Send + Sync> AuxObject for T {}

#[derive(Clone, Default)]
pub struct Auxiliary(Arc<RwLock<BTreeMap<String, Arc<dyn AuxObject>>>>);

impl Auxiliary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing (and returning) any previous entry.
    pub fn set<T: AuxObject>(&self, key: impl Into<String>, value: T) -> Option<Arc<dyn AuxObject>> {
        self.0.write().insert(key.into(), Arc::new(value))
    }

    /// Fetch the entry under `key` if it holds a `T`.
    pub fn get<T: AuxObject>(&self, key: &str) -> Option<Arc<T>> {
        let entry = self.0.read().get(key).cloned()?;
        entry.downcast_arc::<T>().ok()
    }

    pub fn unset(&self, key: &str) -> Option<Arc<dyn AuxObject>> {
        self.0.write().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }
}

impl std::fmt::Debug for Auxiliary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.read().keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access() {
        let aux = Auxiliary::new();
        assert!(aux.is_empty());
        aux.set("answer", 42u32);
        aux.set("name", String::from("stackage"));

        assert_eq!(aux.get::<u32>("answer").as_deref(), Some(&42));
        assert!(aux.get::<i64>("answer").is_none());
        assert_eq!(aux.keys(), vec!["answer".to_string(), "name".to_string()]);

        let shared = aux.clone();
        shared.unset("answer");
        assert!(!aux.contains("answer"));
        assert_eq!(aux.len(), 1);
    }
}
