//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Request Type
//! - GET_BY_PATH: bincode(PathQuery)
//! - GET:         bincode(String)   full path
//! - PUT:         bincode(PutParameter)
//! - DELETE:      bincode(String)   full path
//! - PING:        empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use serde::de::DeserializeOwned;

use super::{Request, RequestType, Response, Status};
use crate::error::{Result, StoreError};

/// Header size: 1 byte kind/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: kind (1) + payload_len (4) + payload
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let payload = match request {
        Request::GetParametersByPath(query) => bincode::serialize(query)?,
        Request::GetParameter { name } => bincode::serialize(name)?,
        Request::PutParameter(put) => bincode::serialize(put)?,
        Request::DeleteParameter { name } => bincode::serialize(name)?,
        Request::Ping => Vec::new(),
    };

    Ok(frame(request.request_type() as u8, &payload))
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (kind, payload) = split_frame(bytes, "request")?;

    let request_type = RequestType::from_byte(kind).ok_or_else(|| {
        StoreError::Protocol(format!("Unknown request type: 0x{:02x}", kind))
    })?;

    match request_type {
        RequestType::GetParametersByPath => {
            Ok(Request::GetParametersByPath(decode_payload(payload, "GET_BY_PATH")?))
        }
        RequestType::GetParameter => Ok(Request::GetParameter {
            name: decode_payload(payload, "GET")?,
        }),
        RequestType::PutParameter => Ok(Request::PutParameter(decode_payload(payload, "PUT")?)),
        RequestType::DeleteParameter => Ok(Request::DeleteParameter {
            name: decode_payload(payload, "DELETE")?,
        }),
        RequestType::Ping => {
            if !payload.is_empty() {
                return Err(StoreError::Protocol(format!(
                    "PING request: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Request::Ping)
        }
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_byte(status_byte).ok_or_else(|| {
        StoreError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

/// Decode the bincode payload of an OK response
pub fn decode_ok_payload<T: DeserializeOwned>(response: &Response) -> Result<T> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    bincode::deserialize(payload)
        .map_err(|e| StoreError::Protocol(format!("Malformed response payload: {}", e)))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let message = read_frame(reader)?;
    decode_request(&message)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Framing
// =============================================================================

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(kind);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

fn payload_len(header: &[u8]) -> Result<usize> {
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

/// Split a complete message into its kind byte and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let len = payload_len(bytes)?;
    let total_len = HEADER_SIZE + len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

/// Read header + payload from a stream into one buffer
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let len = payload_len(&header)?;

    let mut message = Vec::with_capacity(HEADER_SIZE + len);
    message.extend_from_slice(&header);
    message.resize(HEADER_SIZE + len, 0);
    if len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

fn decode_payload<T: DeserializeOwned>(payload: &[u8], what: &str) -> Result<T> {
    bincode::deserialize(payload)
        .map_err(|e| StoreError::Protocol(format!("{} request: malformed payload: {}", what, e)))
}
