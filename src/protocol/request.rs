//! Request definitions
//!
//! Represents requests from service clients.

use crate::service::{PathQuery, PutParameter};

/// Request types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestType {
    GetParametersByPath = 0x01,
    GetParameter = 0x02,
    PutParameter = 0x03,
    DeleteParameter = 0x04,
    Ping = 0x05,
}

impl RequestType {
    /// Parse a request type byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(RequestType::GetParametersByPath),
            0x02 => Some(RequestType::GetParameter),
            0x03 => Some(RequestType::PutParameter),
            0x04 => Some(RequestType::DeleteParameter),
            0x05 => Some(RequestType::Ping),
            _ => None,
        }
    }
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// List keys under a path (one page)
    GetParametersByPath(PathQuery),

    /// Fetch one key by full path
    GetParameter { name: String },

    /// Write a key
    PutParameter(PutParameter),

    /// Delete a key by full path
    DeleteParameter { name: String },

    /// Ping (health check)
    Ping,
}

impl Request {
    /// Get the request type
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::GetParametersByPath(_) => RequestType::GetParametersByPath,
            Request::GetParameter { .. } => RequestType::GetParameter,
            Request::PutParameter(_) => RequestType::PutParameter,
            Request::DeleteParameter { .. } => RequestType::DeleteParameter,
            Request::Ping => RequestType::Ping,
        }
    }
}
