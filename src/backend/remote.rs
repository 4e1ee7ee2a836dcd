//! Remote Backend
//!
//! Translates namespace-level operations into full-path operations against a
//! hierarchical key-value service.
//!
//! ## Listing
//! Pages are requested until the service stops returning a continuation
//! token. A failure on any page fails the whole listing: callers never see a
//! partial snapshot.
//!
//! ## Writes
//! The service has one `put` primitive. `create` sends it with
//! `overwrite = false` so an existing key fails loudly; `update` sends it
//! with `overwrite = true`. A complete update (value and security flag both
//! given) of a missing key therefore creates it at version 1.
//!
//! A partial update reads the stored entry, merges, and writes back with the
//! version it read as a precondition. A delete or another write landing in
//! between fails the update (`NotFound` or `VersionConflict`) instead of
//! resurrecting or clobbering the entry.

use crate::error::{Result, StoreError};
use crate::parameter::{qualified_name, NewParameter, Parameter, ParameterType, ParameterUpdate};
use crate::path;
use crate::service::{ParameterService, PathQuery, PutParameter, RemoteParameter};

use super::{group_by_namespace, Backend, BackendKind, NamespaceMap};

/// Page size requested from the service
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameter backend over a path-keyed service
#[derive(Debug)]
pub struct RemoteBackend<S> {
    service: S,
    page_size: u32,
}

impl<S: ParameterService> RemoteBackend<S> {
    /// Wrap a service handle that is already bound to its target
    pub fn new(service: S) -> Self {
        Self::with_page_size(service, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(service: S, page_size: u32) -> Self {
        Self {
            service,
            page_size: page_size.max(1),
        }
    }

    /// The underlying service handle
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Follow continuation tokens until the query is exhausted
    fn collect_pages(&self, query: PathQuery) -> Result<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let mut next_token = None;
        let mut pages = 0usize;

        loop {
            let request = query
                .clone()
                .with_max_results(self.page_size)
                .with_next_token(next_token.take());
            let page = self.service.get_parameters_by_path(&request)?;
            pages += 1;

            for remote in page.parameters {
                parameters.push(from_remote(remote)?);
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            path = %query.path,
            recursive = query.recursive,
            pages,
            count = parameters.len(),
            "Listed remote parameters"
        );
        Ok(parameters)
    }

    fn put(
        &self,
        full_path: String,
        value: String,
        is_secure: bool,
        overwrite: bool,
        expected_version: Option<u64>,
    ) -> Result<u64> {
        self.service.put_parameter(&PutParameter {
            name: full_path,
            value,
            parameter_type: ParameterType::from_secure(is_secure),
            overwrite,
            expected_version,
        })
    }
}

impl<S: ParameterService> Backend for RemoteBackend<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn list(&self) -> Result<NamespaceMap> {
        let parameters = self.collect_pages(PathQuery::recursive(path::SEPARATOR.to_string()))?;
        Ok(group_by_namespace(parameters))
    }

    fn list_namespace(&self, namespace: &str) -> Result<Vec<Parameter>> {
        let prefix = path::namespace_prefix(namespace)?;
        self.collect_pages(PathQuery::children(prefix))
    }

    fn create(&self, namespace: &str, parameter: NewParameter) -> Result<Parameter> {
        parameter.validate()?;
        let full_path = path::encode(namespace, &parameter.name)?;

        let version = self
            .put(full_path.clone(), parameter.value.clone(), parameter.is_secure, false, None)
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => {
                    StoreError::AlreadyExists(qualified_name(namespace, &parameter.name))
                }
                other => other,
            })?;

        tracing::debug!(
            namespace,
            name = %parameter.name,
            version,
            secure = parameter.is_secure,
            "Created remote parameter"
        );

        Ok(Parameter {
            id: path::path_id(&full_path),
            name: parameter.name,
            value: parameter.value,
            is_secure: parameter.is_secure,
            namespace: namespace.to_string(),
            version,
        })
    }

    fn update(&self, namespace: &str, name: &str, update: ParameterUpdate) -> Result<Parameter> {
        update.validate()?;
        let full_path = path::encode(namespace, name)?;

        let (value, is_secure, expected_version) = match (&update.value, update.is_secure) {
            (Some(value), Some(is_secure)) => (value.clone(), is_secure, update.expected_version),
            _ => {
                let current = self
                    .service
                    .get_parameter(&full_path)?
                    .ok_or_else(|| StoreError::NotFound(qualified_name(namespace, name)))?;
                let read_version = current.version;
                let merged = update.apply_to(&from_remote(current)?);
                // The merge is only valid against the version it read
                let expected = update.expected_version.unwrap_or(read_version);
                (merged.value, merged.is_secure, Some(expected))
            }
        };

        let version = self
            .put(full_path.clone(), value.clone(), is_secure, true, expected_version)
            .map_err(|e| match e {
                StoreError::NotFound(_) => StoreError::NotFound(qualified_name(namespace, name)),
                other => other,
            })?;

        tracing::debug!(namespace, name, version, secure = is_secure, "Updated remote parameter");

        Ok(Parameter {
            id: path::path_id(&full_path),
            name: name.to_string(),
            value,
            is_secure,
            namespace: namespace.to_string(),
            version,
        })
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let full_path = path::encode(namespace, name)?;
        self.service
            .delete_parameter(&full_path)
            .map_err(|e| match e {
                StoreError::NotFound(_) => StoreError::NotFound(qualified_name(namespace, name)),
                other => other,
            })?;

        tracing::debug!(namespace, name, "Deleted remote parameter");
        Ok(())
    }
}

/// Decode a service record into a namespaced parameter
fn from_remote(remote: RemoteParameter) -> Result<Parameter> {
    let decoded = path::decode(&remote.name)?;
    Ok(Parameter {
        id: path::path_id(&remote.name),
        name: decoded.name,
        value: remote.value,
        is_secure: remote.parameter_type.is_secure(),
        namespace: decoded.namespace,
        version: remote.version,
    })
}
