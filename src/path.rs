//! Namespace Path Codec
//!
//! Maps between a full key path (`/ortelius/dev/PORT`) and its
//! `(namespace, name)` pair. Pure functions, no state.
//!
//! ## Rules
//! - A full path starts with `/`; the last segment is the name
//! - Everything between the leading `/` and the name is the namespace
//! - A root-level name (`/PORT`) has an empty namespace
//! - Namespaces have no leading/trailing `/` and no empty segments

use std::fmt;

use crate::error::{Result, StoreError};

/// Path separator
pub const SEPARATOR: char = '/';

/// A decoded full path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterPath {
    pub namespace: String,
    pub name: String,
}

impl ParameterPath {
    /// Build and validate a path from its parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let path = Self {
            namespace: namespace.into(),
            name: name.into(),
        };
        validate_namespace(&path.namespace)?;
        validate_name(&path.name)?;
        Ok(path)
    }

    /// Encode back to a full path
    pub fn to_full_path(&self) -> String {
        join(&self.namespace, &self.name)
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_full_path())
    }
}

/// Encode `(namespace, name)` as `/{namespace}/{name}`
///
/// An empty namespace encodes as `/{name}`.
pub fn encode(namespace: &str, name: &str) -> Result<String> {
    validate_namespace(namespace)?;
    validate_name(name)?;
    Ok(join(namespace, name))
}

/// Decode a full path into `(namespace, name)`
pub fn decode(full_path: &str) -> Result<ParameterPath> {
    let rest = full_path.strip_prefix(SEPARATOR).unwrap_or(full_path);
    if rest.is_empty() {
        return Err(StoreError::Validation(format!(
            "path '{}' has no name segment",
            full_path
        )));
    }

    let (namespace, name) = match rest.rfind(SEPARATOR) {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => ("", rest),
    };

    if name.is_empty() {
        return Err(StoreError::Validation(format!(
            "path '{}' ends with a separator",
            full_path
        )));
    }

    Ok(ParameterPath {
        namespace: namespace.to_string(),
        name: name.to_string(),
    })
}

/// The path to query for the direct children of `namespace`
///
/// `/` for the root namespace, `/{namespace}` otherwise.
pub fn namespace_prefix(namespace: &str) -> Result<String> {
    validate_namespace(namespace)?;
    if namespace.is_empty() {
        Ok(SEPARATOR.to_string())
    } else {
        Ok(format!("{}{}", SEPARATOR, namespace))
    }
}

/// Check a parameter name: non-empty and free of separators
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::Validation("name is required".to_string()));
    }
    if name.contains(SEPARATOR) {
        return Err(StoreError::Validation(format!(
            "name '{}' must not contain '{}'",
            name, SEPARATOR
        )));
    }
    Ok(())
}

/// Check a namespace: empty, or separator-joined non-empty segments
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Ok(());
    }
    if namespace.split(SEPARATOR).any(str::is_empty) {
        return Err(StoreError::Validation(format!(
            "namespace '{}' has an empty segment or a leading/trailing '{}'",
            namespace, SEPARATOR
        )));
    }
    Ok(())
}

/// Check a full path as stored by a path-keyed backend
pub fn validate_full_path(full_path: &str) -> Result<()> {
    if !full_path.starts_with(SEPARATOR) {
        return Err(StoreError::Validation(format!(
            "path '{}' must start with '{}'",
            full_path, SEPARATOR
        )));
    }
    if full_path[1..].split(SEPARATOR).any(str::is_empty) {
        return Err(StoreError::Validation(format!(
            "path '{}' has an empty segment",
            full_path
        )));
    }
    Ok(())
}

/// Stable 64-bit id for a full path (FNV-1a)
pub fn path_id(full_path: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    full_path.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("{}{}", SEPARATOR, name)
    } else {
        format!("{}{}{}{}", SEPARATOR, namespace, SEPARATOR, name)
    }
}
