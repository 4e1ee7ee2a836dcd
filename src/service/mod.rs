//! Service Module
//!
//! The contract of the hierarchical key-value service that the remote
//! backend talks to, and two implementations of it.
//!
//! ## Model
//! - Keys are full paths (`/ortelius/dev/PORT`)
//! - Every key carries a value, a value type and a native version
//! - Listing is by path prefix and paginated with an opaque token
//! - Writes are a single "put" primitive distinguished by an overwrite flag
//!
//! ## Implementations
//! - `PathStore`: in-process service state (served by `network::Server`)
//! - `ServiceClient`: TCP client for a running `paramstore-server`

mod client;
mod path_store;

use serde::{Deserialize, Serialize};

pub use client::ServiceClient;
pub use path_store::{PathStore, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

use crate::error::Result;
use crate::parameter::ParameterType;

/// One stored key as reported by the service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteParameter {
    /// Full path
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    pub version: u64,
}

impl std::fmt::Debug for RemoteParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = if self.parameter_type.is_secure() {
            crate::parameter::SECURE_MASK
        } else {
            &self.value
        };
        f.debug_struct("RemoteParameter")
            .field("name", &self.name)
            .field("value", &value)
            .field("parameter_type", &self.parameter_type)
            .field("version", &self.version)
            .finish()
    }
}

/// "List under path" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathQuery {
    /// `/` for everything, `/a/b` for keys under `a/b`
    pub path: String,

    /// Include all descendants instead of direct children only
    pub recursive: bool,

    /// Page size; the service applies its default and cap
    pub max_results: Option<u32>,

    /// Continuation token from the previous page
    pub next_token: Option<String>,
}

impl PathQuery {
    /// Recursive query for every key under `path`
    pub fn recursive(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
            max_results: None,
            next_token: None,
        }
    }

    /// Query for the direct children of `path`
    pub fn children(path: impl Into<String>) -> Self {
        Self {
            recursive: false,
            ..Self::recursive(path)
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_next_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

/// One page of a path query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterPage {
    pub parameters: Vec<RemoteParameter>,

    /// Present while more results remain
    pub next_token: Option<String>,
}

/// Write request
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutParameter {
    /// Full path
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,

    /// Replace an existing key; when false an existing key fails the write
    pub overwrite: bool,

    /// Compare-and-swap precondition on the stored version
    pub expected_version: Option<u64>,
}

impl std::fmt::Debug for PutParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PutParameter")
            .field("name", &self.name)
            .field("parameter_type", &self.parameter_type)
            .field("overwrite", &self.overwrite)
            .field("expected_version", &self.expected_version)
            .finish_non_exhaustive()
    }
}

/// Hierarchical key-value service bound to a target
pub trait ParameterService: Send + Sync {
    /// List keys under a path, one page at a time
    fn get_parameters_by_path(&self, query: &PathQuery) -> Result<ParameterPage>;

    /// Fetch a single key
    fn get_parameter(&self, name: &str) -> Result<Option<RemoteParameter>>;

    /// Write a key, returning its new version
    fn put_parameter(&self, request: &PutParameter) -> Result<u64>;

    /// Remove a key; `NotFound` if absent
    fn delete_parameter(&self, name: &str) -> Result<()>;
}

impl<S: ParameterService + ?Sized> ParameterService for std::sync::Arc<S> {
    fn get_parameters_by_path(&self, query: &PathQuery) -> Result<ParameterPage> {
        (**self).get_parameters_by_path(query)
    }

    fn get_parameter(&self, name: &str) -> Result<Option<RemoteParameter>> {
        (**self).get_parameter(name)
    }

    fn put_parameter(&self, request: &PutParameter) -> Result<u64> {
        (**self).put_parameter(request)
    }

    fn delete_parameter(&self, name: &str) -> Result<()> {
        (**self).delete_parameter(name)
    }
}
