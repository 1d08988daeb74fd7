//! Terraform provider publisher library.
//!
//! This crate publishes a built Terraform provider release to a private
//! Terraform registry. It is used by the `provider-publisher` binary and can
//! be driven programmatically with an injected [`http::HttpClient`] for
//! testing.
//!
//! # Modules
//!
//! - [`checksum`] - `SHA256SUMS` parsing and archive verification
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Release configuration resolved from the environment
//! - [`deploy`] - The end-to-end publishing pipeline
//! - [`digest`] - SHA-256 digest newtype
//! - [`error`] - Error types carrying URL and filename context
//! - [`http`] - Blocking HTTP transport abstraction
//! - [`platform`] - The OS and architecture release matrix
//! - [`registry`] - Version and platform registration
//! - [`release`] - Release asset download
//! - [`upload`] - Uploads to registry-issued URLs

pub mod checksum;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod digest;
pub mod error;
pub mod http;
pub mod platform;
pub mod registry;
pub mod release;
pub mod upload;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
