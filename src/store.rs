//! Key-value data store consumed by templates via `{{ data "key" }}`.
//!
//! The pipeline only reads from the store during a render; writes happen
//! before the run starts (or from outside the core entirely). To make that
//! contract observable rather than implicit, renders see the store through
//! [`FrozenStore`], whose `set` always fails with
//! [`StoreError::MutationNotAllowed`].

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("data store writes are not allowed during a render")]
    MutationNotAllowed,
}

pub trait DataStore: Send + Sync {
    fn get(&self, dotted_key: &str) -> Option<&Value>;

    fn has(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    fn set(&mut self, dotted_key: &str, value: Value) -> Result<(), StoreError>;
}

/// Plain in-memory store, writable outside renders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for MemoryStore {
    fn get(&self, dotted_key: &str) -> Option<&Value> {
        self.entries.get(dotted_key)
    }

    fn set(&mut self, dotted_key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(dotted_key.to_string(), value);
        Ok(())
    }
}

/// Read-only view handed to renders. `set` fails unconditionally.
pub struct FrozenStore<'a> {
    inner: &'a dyn DataStore,
}

impl<'a> FrozenStore<'a> {
    pub fn new(inner: &'a dyn DataStore) -> Self {
        Self { inner }
    }

    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        self.inner.get(dotted_key)
    }

    pub fn has(&self, dotted_key: &str) -> bool {
        self.inner.has(dotted_key)
    }

    pub fn set(&self, _dotted_key: &str, _value: Value) -> Result<(), StoreError> {
        Err(StoreError::MutationNotAllowed)
    }
}
