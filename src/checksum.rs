//! `SHA256SUMS` manifest parsing and archive verification.
//!
//! The manifest has one `"{digest}  {filename}"` line per release asset,
//! the two columns separated by exactly two spaces.

use crate::digest::{InvalidDigest, Sha256Digest, compute_sha256};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use thiserror::Error;

const COLUMN_SEPARATOR: &str = "  ";

/// Errors arising from the checksum manifest.
#[derive(Debug, Error)]
pub enum ChecksumError {
    /// The manifest or an archive could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file being read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line does not split into exactly a digest and a filename.
    #[error("malformed checksum line {line_number}: \"{line}\"")]
    MalformedLine {
        /// One-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },

    /// A line's digest column is not a SHA-256 hex digest.
    #[error("checksum line {line_number}: {source}")]
    InvalidDigest {
        /// One-based line number.
        line_number: usize,
        /// The validation failure.
        #[source]
        source: InvalidDigest,
    },

    /// The manifest has no entry for a file the release must contain.
    #[error("no checksum entry for {filename}")]
    MissingEntry {
        /// The filename that was looked up.
        filename: String,
    },

    /// A downloaded file's digest differs from its manifest entry.
    #[error("checksum mismatch for {filename}: manifest={expected}, actual={actual}")]
    Mismatch {
        /// The file that was verified.
        filename: String,
        /// Digest recorded in the manifest.
        expected: Sha256Digest,
        /// Digest of the local file.
        actual: Sha256Digest,
    },
}

/// Filename-to-digest mapping parsed from a `SHA256SUMS` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, Sha256Digest>,
}

impl ChecksumManifest {
    /// Parse manifest text.
    ///
    /// Blank and whitespace-only lines are skipped wherever they appear,
    /// including between entries. A later line for the same filename
    /// replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError::MalformedLine`] for a line without the
    /// double-space separator or with more than two columns, and
    /// [`ChecksumError::InvalidDigest`] for a digest that is not 64
    /// lowercase hex characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use provider_publisher::checksum::ChecksumManifest;
    ///
    /// let digest = "e".repeat(64);
    /// let text = format!("{digest}  provider_1.0.0_linux_amd64.zip\n");
    /// let manifest = ChecksumManifest::parse(&text).expect("valid manifest");
    /// assert_eq!(manifest.len(), 1);
    /// ```
    pub fn parse(text: &str) -> Result<Self, ChecksumError> {
        let mut entries = HashMap::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_number = index + 1;
            let (raw_digest, filename) =
                split_line(line).ok_or_else(|| ChecksumError::MalformedLine {
                    line_number,
                    line: line.to_owned(),
                })?;
            let digest = Sha256Digest::try_from(raw_digest)
                .map_err(|source| ChecksumError::InvalidDigest {
                    line_number,
                    source,
                })?;
            entries.insert(filename.to_owned(), digest);
        }
        Ok(Self { entries })
    }

    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError::Read`] if the file cannot be read, or any
    /// error [`Self::parse`] reports.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ChecksumError> {
        let text = std::fs::read_to_string(path).map_err(|source| ChecksumError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Look up the digest recorded for `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`ChecksumError::MissingEntry`] when the manifest does not
    /// list `filename`.
    pub fn digest_for(&self, filename: &str) -> Result<&Sha256Digest, ChecksumError> {
        self.entries
            .get(filename)
            .ok_or_else(|| ChecksumError::MissingEntry {
                filename: filename.to_owned(),
            })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest lists no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Check that the file at `path` hashes to `expected`.
///
/// # Errors
///
/// Returns [`ChecksumError::Read`] if the file cannot be hashed and
/// [`ChecksumError::Mismatch`] if the digests differ.
pub fn verify_file(path: &Utf8Path, expected: &Sha256Digest) -> Result<(), ChecksumError> {
    let actual = compute_sha256(path).map_err(|source| ChecksumError::Read {
        path: path.to_owned(),
        source,
    })?;
    if &actual != expected {
        return Err(ChecksumError::Mismatch {
            filename: path.file_name().unwrap_or(path.as_str()).to_owned(),
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let mut columns = line.split(COLUMN_SEPARATOR);
    let digest = columns.next()?;
    let filename = columns.next()?;
    if columns.next().is_some() || digest.is_empty() || filename.is_empty() {
        return None;
    }
    Some((digest, filename))
}
