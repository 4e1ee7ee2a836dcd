//! Path Store
//!
//! In-process hierarchical key-value service with native versioning and
//! paginated path queries. This is the state a `paramstore-server` serves.
//!
//! ## Pagination
//! Results are sorted by key. A truncated page carries a continuation token:
//! the base64 encoding of the last key returned. The next page starts
//! strictly after that key.
//!
//! ## Versioning
//! - First write of a key: version 1
//! - Every overwrite: previous version + 1
//! - Delete forgets the key entirely; a later write starts at 1 again

use std::collections::BTreeMap;
use std::ops::Bound;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::parameter::ParameterType;
use crate::path;

use super::{ParameterPage, ParameterService, PathQuery, PutParameter, RemoteParameter};

/// Page size when the query does not specify one
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Largest page the store hands out by default
pub const MAX_RESULTS_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    parameter_type: ParameterType,
    version: u64,
}

/// Path-keyed parameter service state
#[derive(Debug)]
pub struct PathStore {
    /// Full path → stored value, kept sorted for prefix scans
    entries: RwLock<BTreeMap<String, StoredValue>>,

    default_max_results: u32,

    max_results_limit: u32,
}

impl PathStore {
    /// Create an empty store with the default page limits
    pub fn new() -> Self {
        Self::with_page_limits(DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT)
    }

    /// Create an empty store with custom page limits
    pub fn with_page_limits(default_max_results: u32, max_results_limit: u32) -> Self {
        let max_results_limit = max_results_limit.max(1);
        Self {
            entries: RwLock::new(BTreeMap::new()),
            default_max_results: default_max_results.clamp(1, max_results_limit),
            max_results_limit,
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn normalize_limit(&self, requested: Option<u32>) -> usize {
        requested
            .unwrap_or(self.default_max_results)
            .clamp(1, self.max_results_limit) as usize
    }
}

impl Default for PathStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterService for PathStore {
    fn get_parameters_by_path(&self, query: &PathQuery) -> Result<ParameterPage> {
        let prefix = query_prefix(&query.path)?;
        let start_after = query
            .next_token
            .as_deref()
            .map(decode_continuation_token)
            .transpose()?;
        let limit = self.normalize_limit(query.max_results);

        // Seek straight to the first candidate key; the scan ends at the
        // first key outside the prefix
        let lower = match start_after.as_deref() {
            Some(after) if after >= prefix.as_str() => Bound::Excluded(after),
            _ => Bound::Included(prefix.as_str()),
        };

        let entries = self.entries.read();
        let mut matching = entries
            .range::<str, _>((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| query.recursive || !key[prefix.len()..].contains(path::SEPARATOR));

        let parameters: Vec<RemoteParameter> = matching
            .by_ref()
            .take(limit)
            .map(|(key, stored)| to_remote(key, stored))
            .collect();

        let next_token = if matching.next().is_some() {
            parameters
                .last()
                .map(|last| encode_continuation_token(&last.name))
        } else {
            None
        };

        tracing::trace!(
            path = %query.path,
            recursive = query.recursive,
            returned = parameters.len(),
            truncated = next_token.is_some(),
            "Path query"
        );

        Ok(ParameterPage {
            parameters,
            next_token,
        })
    }

    fn get_parameter(&self, name: &str) -> Result<Option<RemoteParameter>> {
        path::validate_full_path(name)?;
        Ok(self
            .entries
            .read()
            .get(name)
            .map(|stored| to_remote(name, stored)))
    }

    fn put_parameter(&self, request: &PutParameter) -> Result<u64> {
        path::validate_full_path(&request.name)?;
        if request.value.is_empty() {
            return Err(StoreError::Validation(format!(
                "value is required for '{}'",
                request.name
            )));
        }

        let mut entries = self.entries.write();
        let version = match entries.get(&request.name) {
            Some(existing) => {
                if !request.overwrite {
                    return Err(StoreError::AlreadyExists(request.name.clone()));
                }
                check_expected_version(&request.name, request.expected_version, existing.version)?;
                existing.version + 1
            }
            None => {
                if request.expected_version.is_some() {
                    return Err(StoreError::NotFound(request.name.clone()));
                }
                1
            }
        };

        entries.insert(
            request.name.clone(),
            StoredValue {
                value: request.value.clone(),
                parameter_type: request.parameter_type,
                version,
            },
        );

        tracing::debug!(
            name = %request.name,
            version,
            secure = request.parameter_type.is_secure(),
            "Put parameter"
        );
        Ok(version)
    }

    fn delete_parameter(&self, name: &str) -> Result<()> {
        path::validate_full_path(name)?;
        match self.entries.write().remove(name) {
            Some(_) => {
                tracing::debug!(name, "Deleted parameter");
                Ok(())
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }
}

/// Prefix every matching key must start with
fn query_prefix(query_path: &str) -> Result<String> {
    if query_path == "/" {
        return Ok(query_path.to_string());
    }
    path::validate_full_path(query_path)?;
    Ok(format!("{}{}", query_path, path::SEPARATOR))
}

fn check_expected_version(name: &str, expected: Option<u64>, actual: u64) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(StoreError::VersionConflict {
            key: name.to_string(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

fn to_remote(key: &str, stored: &StoredValue) -> RemoteParameter {
    RemoteParameter {
        name: key.to_string(),
        value: stored.value.clone(),
        parameter_type: stored.parameter_type,
        version: stored.version,
    }
}

/// Encode a key as an opaque continuation token
fn encode_continuation_token(key: &str) -> String {
    STANDARD.encode(key)
}

/// Decode a continuation token back to the key it was issued after
fn decode_continuation_token(token: &str) -> Result<String> {
    STANDARD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| StoreError::Validation(format!("invalid continuation token '{}'", token)))
}
