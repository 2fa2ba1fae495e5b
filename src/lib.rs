//! ExpoCLI kernel - a notebook kernel adapter for the ExpoCLI XML query tool.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod config;
pub mod error;
pub mod executor;
pub mod kernel;
pub mod kernelspec;
pub mod logging;
pub mod output;
pub mod session;
