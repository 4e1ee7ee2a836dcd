//! Parameter Model
//!
//! The entry record shared by every backend, plus the inputs used to create
//! and update entries.
//!
//! ## Invariants
//! - `name` is non-empty, contains no `/`, and is unique within its namespace
//! - `value` is non-empty
//! - `version` starts at 1 and grows by exactly 1 per successful update
//! - Secure values never appear in `Debug` output

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::path;

/// Mask printed in place of secure values
pub const SECURE_MASK: &str = "********";

/// Value type as understood by a path-keyed backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Plain text value
    String,

    /// Sensitive value (encrypted at rest by the backend, masked on display)
    SecureString,
}

impl ParameterType {
    /// Map the `is_secure` flag to a value type
    pub fn from_secure(is_secure: bool) -> Self {
        if is_secure {
            ParameterType::SecureString
        } else {
            ParameterType::String
        }
    }

    /// Whether this type carries a sensitive value
    pub fn is_secure(self) -> bool {
        matches!(self, ParameterType::SecureString)
    }
}

/// A single named, versioned value within a namespace
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Addressing id (backend-defined, see `Backend` implementations)
    pub id: u64,

    pub name: String,

    pub value: String,

    pub is_secure: bool,

    /// Slash-delimited namespace, empty for root-level entries
    pub namespace: String,

    pub version: u64,
}

impl Parameter {
    /// The value to show on screen: masked when secure
    pub fn display_value(&self) -> &str {
        if self.is_secure {
            SECURE_MASK
        } else {
            &self.value
        }
    }

    /// Value type tag for path-keyed backends
    pub fn parameter_type(&self) -> ParameterType {
        ParameterType::from_secure(self.is_secure)
    }

    /// `namespace/name`, used in error messages and logs
    pub fn key(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.display_value())
            .field("is_secure", &self.is_secure)
            .field("namespace", &self.namespace)
            .field("version", &self.version)
            .finish()
    }
}

/// Input for creating a parameter
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParameter {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub is_secure: bool,
}

impl NewParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>, is_secure: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_secure,
        }
    }

    /// Shorthand for a plain (non-secure) parameter
    pub fn plain(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, false)
    }

    /// Shorthand for a secure parameter
    pub fn secure(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, true)
    }

    /// Reject empty names, names containing `/`, and empty values
    pub fn validate(&self) -> Result<()> {
        path::validate_name(&self.name)?;
        if self.value.is_empty() {
            return Err(StoreError::Validation(format!(
                "value is required for '{}'",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for NewParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.is_secure { SECURE_MASK } else { &self.value };
        f.debug_struct("NewParameter")
            .field("name", &self.name)
            .field("value", &value)
            .field("is_secure", &self.is_secure)
            .finish()
    }
}

/// Partial update of an existing parameter
///
/// Fields left as `None` keep their stored value. `expected_version` turns
/// the update into a compare-and-swap: it fails with `VersionConflict` when
/// the stored version differs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterUpdate {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub is_secure: Option<bool>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl ParameterUpdate {
    /// Update only the value
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Update only the security flag
    pub fn secure_flag(is_secure: bool) -> Self {
        Self {
            is_secure: Some(is_secure),
            ..Self::default()
        }
    }

    /// Set the security flag on this update
    pub fn with_secure(mut self, is_secure: bool) -> Self {
        self.is_secure = Some(is_secure);
        self
    }

    /// Require the stored version to equal `version`
    pub fn expecting_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    /// True when both `value` and `is_secure` are supplied
    pub fn is_complete(&self) -> bool {
        self.value.is_some() && self.is_secure.is_some()
    }

    /// Reject updates that change nothing or carry an empty value
    pub fn validate(&self) -> Result<()> {
        if self.value.is_none() && self.is_secure.is_none() {
            return Err(StoreError::Validation(
                "update must supply a value or a security flag".to_string(),
            ));
        }
        if matches!(self.value.as_deref(), Some("")) {
            return Err(StoreError::Validation("value is required".to_string()));
        }
        Ok(())
    }

    /// Apply the supplied fields over `current`, bumping the version by one
    pub fn apply_to(&self, current: &Parameter) -> Parameter {
        Parameter {
            id: current.id,
            name: current.name.clone(),
            value: self.value.clone().unwrap_or_else(|| current.value.clone()),
            is_secure: self.is_secure.unwrap_or(current.is_secure),
            namespace: current.namespace.clone(),
            version: current.version + 1,
        }
    }
}

impl fmt::Debug for ParameterUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterUpdate")
            .field("value", &self.value.as_ref().map(|_| SECURE_MASK))
            .field("is_secure", &self.is_secure)
            .field("expected_version", &self.expected_version)
            .finish()
    }
}

/// `namespace/name`, or just `name` at the root
pub fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}
