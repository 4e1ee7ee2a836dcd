//! # paramstore
//!
//! A hierarchical, namespaced parameter store with:
//! - Slash-delimited namespaces (`team/env`) implied by their entries
//! - Per-entry versions that start at 1 and grow by one per update
//! - A secure flag that masks values in all diagnostic output
//! - Interchangeable in-memory and remote (path-keyed, paginated) backends
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ParameterStore (façade)                   │
//! │        list / create / update / delete / seed namespace      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Backend trait
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  InMemory   │          │   Remote    │──── path codec
//!   │  (Mutex)    │          │  Backend    │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ ParameterService
//!                       ┌───────────┴───────────┐
//!                       ▼                       ▼
//!               ┌─────────────┐   TCP   ┌─────────────┐
//!               │ServiceClient│────────▶│   Server    │
//!               └─────────────┘         │ (PathStore) │
//!                                       └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod parameter;
pub mod path;
pub mod backend;
pub mod service;
pub mod protocol;
pub mod network;
pub mod store;
pub mod demo;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use backend::{Backend, BackendKind, InMemoryBackend, NamespaceMap, RemoteBackend};
pub use config::{BackendConfig, Config, RemoteConfig};
pub use error::{Result, StoreError};
pub use parameter::{NewParameter, Parameter, ParameterType, ParameterUpdate};
pub use store::{open_backend, ParameterStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of paramstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
