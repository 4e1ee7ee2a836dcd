//! Store Module
//!
//! The façade callers use: one uniform list/CRUD contract over whichever
//! backend was selected at construction.
//!
//! ## Responsibilities
//! - Build the backend from a typed `BackendConfig`, once
//! - Validate caller input before it reaches a backend
//! - Forward the Backend Interface operations unchanged
//! - Provide the create-namespace-with-seed-variable composite
//!
//! ## Namespaces
//! Namespaces are implicit: the first entry written creates one and deleting
//! the last entry removes it. Nothing about a namespace is stored on its own.

use parking_lot::Mutex;

use crate::backend::{Backend, BackendKind, InMemoryBackend, NamespaceMap, RemoteBackend};
use crate::config::BackendConfig;
use crate::error::{Result, StoreError};
use crate::parameter::{NewParameter, Parameter, ParameterUpdate};
use crate::path;
use crate::service::ServiceClient;

/// Build the backend described by `config`
///
/// The remote endpoint is resolved here; the first connection is made by the
/// first operation.
pub fn open_backend(config: &BackendConfig) -> Result<Box<dyn Backend>> {
    match config {
        BackendConfig::Local => Ok(Box::new(InMemoryBackend::new())),
        BackendConfig::Remote(remote) => {
            let client = ServiceClient::new(remote)?;
            Ok(Box::new(RemoteBackend::with_page_size(client, remote.page_size)))
        }
    }
}

/// Parameter store bound to one backend for its whole lifetime
pub struct ParameterStore {
    backend: Box<dyn Backend>,

    /// Serializes the check-then-create in `create_namespace_with_variable`
    namespace_lock: Mutex<()>,
}

impl ParameterStore {
    /// Open a store on the backend described by `config`
    pub fn open(config: &BackendConfig) -> Result<Self> {
        let store = Self::new(open_backend(config)?);
        tracing::info!(backend = %store.backend_kind(), "Parameter store opened");
        Ok(store)
    }

    /// Wrap an already-built backend
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            namespace_lock: Mutex::new(()),
        }
    }

    /// Wrap a concrete backend
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        Self::new(Box::new(backend))
    }

    /// Which backend this store is bound to
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Every parameter, grouped by namespace
    pub fn list_all(&self) -> Result<NamespaceMap> {
        self.backend.list()
    }

    /// Parameters of one namespace
    pub fn list_namespace(&self, namespace: &str) -> Result<Vec<Parameter>> {
        path::validate_namespace(namespace)?;
        self.backend.list_namespace(namespace)
    }

    /// Create a parameter at version 1
    pub fn create_variable(&self, namespace: &str, parameter: NewParameter) -> Result<Parameter> {
        path::validate_namespace(namespace)?;
        parameter.validate()?;
        self.backend.create(namespace, parameter)
    }

    /// Update an existing parameter, bumping its version by one
    pub fn update_variable(
        &self,
        namespace: &str,
        name: &str,
        update: ParameterUpdate,
    ) -> Result<Parameter> {
        path::validate_namespace(namespace)?;
        path::validate_name(name)?;
        update.validate()?;
        self.backend.update(namespace, name, update)
    }

    /// Delete a parameter
    pub fn delete_variable(&self, namespace: &str, name: &str) -> Result<()> {
        path::validate_namespace(namespace)?;
        path::validate_name(name)?;
        self.backend.delete(namespace, name)
    }

    /// Create the first parameter of a namespace that has no entries yet
    ///
    /// Fails with `AlreadyExists` when any entry already occupies `namespace`.
    /// The check and the create are serialized against other calls of this
    /// method on the same store.
    pub fn create_namespace_with_variable(
        &self,
        namespace: &str,
        parameter: NewParameter,
    ) -> Result<Parameter> {
        path::validate_namespace(namespace)?;
        parameter.validate()?;

        let _guard = self.namespace_lock.lock();

        let existing = self.backend.list_namespace(namespace)?;
        if !existing.is_empty() {
            return Err(StoreError::AlreadyExists(format!(
                "namespace '{}' ({} entries)",
                namespace,
                existing.len()
            )));
        }

        let created = self.backend.create(namespace, parameter)?;
        tracing::info!(namespace, name = %created.name, "Created namespace");
        Ok(created)
    }

    /// The bound backend
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }
}
