//! Response definitions
//!
//! Represents responses to service clients, and the mapping between
//! response statuses and `StoreError`.

use serde::Serialize;

use crate::error::{Result, StoreError};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    AlreadyExists = 0x02,
    VersionConflict = 0x03,
    Invalid = 0x04,
    Error = 0x05,
    Malformed = 0x06,
}

impl Status {
    /// Parse a status byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::AlreadyExists),
            0x03 => Some(Status::VersionConflict),
            0x04 => Some(Status::Invalid),
            0x05 => Some(Status::Error),
            0x06 => Some(Status::Malformed),
            _ => None,
        }
    }
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (bincode result for OK, error detail otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an OK response carrying a bincode-encoded value
    pub fn ok_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(value)?)))
    }

    /// Create an error response with a message payload
    pub fn error(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Translate a store error into a response
    pub fn from_error(error: &StoreError) -> Self {
        match error {
            StoreError::NotFound(key) => Self::error(Status::NotFound, key),
            StoreError::AlreadyExists(key) => Self::error(Status::AlreadyExists, key),
            StoreError::VersionConflict {
                key,
                expected,
                actual,
            } => Self {
                status: Status::VersionConflict,
                // (key, expected, actual) tuples always serialize
                payload: bincode::serialize(&(key, expected, actual)).ok(),
            },
            StoreError::Validation(message) => Self::error(Status::Invalid, message),
            StoreError::Protocol(_) | StoreError::Serialization(_) => {
                Self::error(Status::Malformed, &error.to_string())
            }
            other => Self::error(Status::Error, &other.to_string()),
        }
    }

    /// Translate a non-OK response back into a store error
    ///
    /// Returns `None` for OK responses.
    pub fn to_error(&self) -> Option<StoreError> {
        let message = || {
            self.payload
                .as_deref()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .unwrap_or_default()
        };

        match self.status {
            Status::Ok => None,
            Status::NotFound => Some(StoreError::NotFound(message())),
            Status::AlreadyExists => Some(StoreError::AlreadyExists(message())),
            Status::VersionConflict => {
                let decoded = self
                    .payload
                    .as_deref()
                    .map(bincode::deserialize::<(String, u64, u64)>);
                Some(match decoded {
                    Some(Ok((key, expected, actual))) => StoreError::VersionConflict {
                        key,
                        expected,
                        actual,
                    },
                    _ => StoreError::Protocol("malformed version conflict payload".to_string()),
                })
            }
            Status::Invalid => Some(StoreError::Validation(message())),
            Status::Malformed => Some(StoreError::Protocol(message())),
            // The server is up but could not serve the request
            Status::Error => Some(StoreError::BackendUnavailable(message())),
        }
    }
}
