//! Demo data
//!
//! A small fixed set of parameters for trying the store without a running
//! service. The server's `--seed-demo` flag and the CLI's offline mode both
//! load it.

use crate::backend::InMemoryBackend;
use crate::error::Result;
use crate::parameter::NewParameter;

/// `(namespace, name, value, secure)`
pub const DEMO_PARAMETERS: &[(&str, &str, &str, bool)] = &[
    ("ortelius/dev", "PORT", "3001", false),
    ("ortelius/dev", "AWS_S3_SECRET_ACCESS_KEY", "supersecret", true),
    ("ortelius/prod", "PORT", "3001", false),
    ("ortelius/prod", "AWS_S3_SECRET_ACCESS_KEY", "supersecret2", true),
];

/// The demo entries as `(namespace, parameter)` pairs
pub fn demo_parameters() -> impl Iterator<Item = (&'static str, NewParameter)> {
    DEMO_PARAMETERS
        .iter()
        .map(|&(namespace, name, value, secure)| (namespace, NewParameter::new(name, value, secure)))
}

/// An in-memory backend preloaded with the demo entries
pub fn demo_backend() -> Result<InMemoryBackend> {
    InMemoryBackend::with_parameters(demo_parameters())
}
