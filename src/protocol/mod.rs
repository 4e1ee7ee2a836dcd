//! Protocol Module
//!
//! Defines the wire protocol between `ServiceClient` and `paramstore-server`.
//!
//! ## Protocol Format (V1 - Framed Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │    Payload (bincode)        │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Requests
//! - 0x01: GET_BY_PATH - Payload: PathQuery
//! - 0x02: GET         - Payload: full path
//! - 0x03: PUT         - Payload: PutParameter
//! - 0x04: DELETE      - Payload: full path
//! - 0x05: PING        - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK               (bincode result)
//! - 0x01: NOT_FOUND        (message)
//! - 0x02: ALREADY_EXISTS   (message)
//! - 0x03: VERSION_CONFLICT (bincode (key, expected, actual))
//! - 0x04: INVALID          (message)
//! - 0x05: ERROR            (message)
//! - 0x06: MALFORMED        (message; the server closes the connection)

mod codec;
mod request;
mod response;

pub use codec::{
    decode_ok_payload, decode_request, decode_response, encode_request, encode_response,
    read_request, read_response, write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use request::{Request, RequestType};
pub use response::{Response, Status};
