//! In-Memory Backend
//!
//! Process-local reference backend for offline and development use.
//!
//! ## Storage
//! - `entries`: synthetic id → Parameter (BTreeMap, so listing is in id order)
//! - `index`: (namespace, name) → id
//! - `next_id`: monotonically increasing id counter
//!
//! ## Concurrency
//! All three live behind ONE mutex: id allocation in `create` and the
//! read-modify-write in `update` are atomic with respect to other callers.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::parameter::{qualified_name, NewParameter, Parameter, ParameterUpdate};
use crate::path;

use super::{group_by_namespace, Backend, BackendKind, NamespaceMap};

#[derive(Debug)]
struct Inner {
    entries: BTreeMap<u64, Parameter>,
    index: HashMap<(String, String), u64>,
    next_id: u64,
}

impl Inner {
    fn lookup(&self, namespace: &str, name: &str) -> Option<u64> {
        self.index
            .get(&(namespace.to_string(), name.to_string()))
            .copied()
    }
}

/// Process-local parameter backend
#[derive(Debug)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: BTreeMap::new(),
                index: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a backend preloaded with `(namespace, parameter)` pairs
    ///
    /// Each entry goes through `create`, so duplicates and invalid input are
    /// rejected the same way.
    pub fn with_parameters<I, S>(parameters: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, NewParameter)>,
        S: AsRef<str>,
    {
        let backend = Self::new();
        for (namespace, parameter) in parameters {
            backend.create(namespace.as_ref(), parameter)?;
        }
        Ok(backend)
    }

    /// Number of stored parameters
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    fn list(&self) -> Result<NamespaceMap> {
        let inner = self.inner.lock();
        Ok(group_by_namespace(inner.entries.values().cloned()))
    }

    fn list_namespace(&self, namespace: &str) -> Result<Vec<Parameter>> {
        path::validate_namespace(namespace)?;
        let inner = self.inner.lock();
        Ok(inner
            .entries
            .values()
            .filter(|p| p.namespace == namespace)
            .cloned()
            .collect())
    }

    fn create(&self, namespace: &str, parameter: NewParameter) -> Result<Parameter> {
        path::validate_namespace(namespace)?;
        parameter.validate()?;

        let mut inner = self.inner.lock();
        if inner.lookup(namespace, &parameter.name).is_some() {
            return Err(StoreError::AlreadyExists(qualified_name(
                namespace,
                &parameter.name,
            )));
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let created = Parameter {
            id,
            name: parameter.name,
            value: parameter.value,
            is_secure: parameter.is_secure,
            namespace: namespace.to_string(),
            version: 1,
        };

        inner
            .index
            .insert((created.namespace.clone(), created.name.clone()), id);
        inner.entries.insert(id, created.clone());

        tracing::debug!(
            namespace,
            name = %created.name,
            id,
            secure = created.is_secure,
            "Created parameter"
        );
        Ok(created)
    }

    fn update(&self, namespace: &str, name: &str, update: ParameterUpdate) -> Result<Parameter> {
        update.validate()?;

        let mut inner = self.inner.lock();
        let id = inner
            .lookup(namespace, name)
            .ok_or_else(|| StoreError::NotFound(qualified_name(namespace, name)))?;

        let current = inner
            .entries
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(qualified_name(namespace, name)))?;

        if let Some(expected) = update.expected_version {
            if expected != current.version {
                return Err(StoreError::VersionConflict {
                    key: qualified_name(namespace, name),
                    expected,
                    actual: current.version,
                });
            }
        }

        let updated = update.apply_to(current);
        inner.entries.insert(id, updated.clone());

        tracing::debug!(
            namespace,
            name,
            id,
            version = updated.version,
            secure = updated.is_secure,
            "Updated parameter"
        );
        Ok(updated)
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let id = inner
            .index
            .remove(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::NotFound(qualified_name(namespace, name)))?;
        inner.entries.remove(&id);

        tracing::debug!(namespace, name, id, "Deleted parameter");
        Ok(())
    }
}
