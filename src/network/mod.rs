//! Network Module
//!
//! TCP server and client handling for the parameter service.
//!
//! ## Architecture
//! - Single acceptor loop (non-blocking, polls the shutdown flag)
//! - Worker thread pool fed through a bounded channel
//! - Requests served from a shared `PathStore`

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;
