//! Error types for the provider publisher.
//!
//! Every failure is fatal: the first error aborts the run. Variants carry
//! the URL or filename involved so an operator can work out what was
//! already published before re-running.

use crate::checksum::ChecksumError;
use crate::config::ConfigError;
use crate::http::HttpError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing a release.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No response was received, or a body could not be transferred.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The checksum manifest is malformed, incomplete, or disagrees with a
    /// downloaded archive.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// The release host answered an asset request with a non-200 status.
    #[error("error pulling resource {url}: status {status}")]
    Download {
        /// The asset URL.
        url: String,
        /// The status received.
        status: u16,
    },

    /// The registry refused to create the provider version.
    #[error("error creating new version at {url}: status {status}: {body}")]
    VersionCreation {
        /// The registry endpoint.
        url: String,
        /// The status received.
        status: u16,
        /// The response body, as returned.
        body: String,
    },

    /// The registry refused to create a platform.
    #[error("error creating platform {platform} at {url}: status {status}: {body}")]
    PlatformCreation {
        /// The `os_arch` pair being registered.
        platform: String,
        /// The registry endpoint.
        url: String,
        /// The status received.
        status: u16,
        /// The response body, as returned.
        body: String,
    },

    /// An upload URL answered with something other than 200.
    #[error("could not upload file {file} to url {url}: status {status}")]
    Upload {
        /// The local file being uploaded.
        file: Utf8PathBuf,
        /// The upload URL.
        url: String,
        /// The status received.
        status: u16,
    },

    /// A registry success response lacked the expected fields.
    #[error("unexpected response from {url}: {reason}")]
    MalformedResponse {
        /// The registry endpoint.
        url: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// A request document could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// A local file could not be opened.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`PublishError`].
pub type Result<T> = std::result::Result<T, PublishError>;
