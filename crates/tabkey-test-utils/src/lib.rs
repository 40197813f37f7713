#![deny(unsafe_code)]

//! Shared test utilities for the tabkey workspace.
//!
//! Provides config builders, a scriptable host, temporary workspaces, and
//! tracing helpers so that individual crate tests stay concise.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! tabkey-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod host;
pub mod tracing_setup;
pub mod workspace;
