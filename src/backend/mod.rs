//! Backend Module
//!
//! The storage contract every parameter backend satisfies, plus its two
//! implementations.
//!
//! ## Variants
//! - `InMemoryBackend`: process-local map, strict create/update semantics
//! - `RemoteBackend`: paginated, path-keyed service behind `ParameterService`
//!
//! ## Backend-specific behavior
//! Both variants reject `create` on an existing key and bump `version` by
//! exactly one per update. They differ on `update` of a missing key when the
//! update is complete (value and security flag both given): the in-memory
//! backend returns `NotFound`, the remote backend upserts at version 1.

mod memory;
mod remote;

use std::collections::BTreeMap;
use std::fmt;

pub use memory::InMemoryBackend;
pub use remote::{RemoteBackend, DEFAULT_PAGE_SIZE};

use crate::error::Result;
use crate::parameter::{NewParameter, Parameter, ParameterUpdate};

/// Full snapshot: namespace → entries
pub type NamespaceMap = BTreeMap<String, Vec<Parameter>>;

/// Which backend variant is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    InMemory,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::InMemory => f.write_str("in-memory"),
            BackendKind::Remote => f.write_str("remote"),
        }
    }
}

/// Storage capability shared by all backends
///
/// All methods block until the operation completes, including any network
/// round trips.
pub trait Backend: Send + Sync {
    /// The variant behind this trait object
    fn kind(&self) -> BackendKind;

    /// Every parameter, grouped by namespace
    fn list(&self) -> Result<NamespaceMap>;

    /// Parameters of one namespace (empty when the namespace has no entries)
    fn list_namespace(&self, namespace: &str) -> Result<Vec<Parameter>> {
        Ok(self.list()?.remove(namespace).unwrap_or_default())
    }

    /// Create a parameter at version 1; `AlreadyExists` if the key is taken
    fn create(&self, namespace: &str, parameter: NewParameter) -> Result<Parameter>;

    /// Apply `update` to an existing parameter, bumping its version
    fn update(&self, namespace: &str, name: &str, update: ParameterUpdate) -> Result<Parameter>;

    /// Remove a parameter; `NotFound` if absent
    fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

/// Group parameters by namespace, keeping their relative order
pub(crate) fn group_by_namespace<I>(parameters: I) -> NamespaceMap
where
    I: IntoIterator<Item = Parameter>,
{
    let mut grouped = NamespaceMap::new();
    for parameter in parameters {
        grouped
            .entry(parameter.namespace.clone())
            .or_default()
            .push(parameter);
    }
    grouped
}
