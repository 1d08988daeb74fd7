//! Upload of local files to registry-issued upload URLs.

use crate::error::{PublishError, Result};
use crate::http::{HttpClient, STATUS_OK};
use camino::Utf8Path;
use log::{debug, info};
use std::fs::File;

/// A registry-issued upload URL paired with the file it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Release asset filename, relative to the working directory.
    pub filename: String,
    /// Pre-signed URL accepting the file's bytes.
    pub upload_url: String,
}

/// `PUT` the contents of `file` to `url`.
///
/// The file handle is closed before this returns, on success and on every
/// failure path. Only status 200 counts as success; upload URLs that answer
/// 201 or 204 are reported as failures.
///
/// # Errors
///
/// Returns [`PublishError::Io`] if the file cannot be opened,
/// [`PublishError::Http`] if no response arrives, and
/// [`PublishError::Upload`] for any status other than 200.
pub fn upload_asset(client: &dyn HttpClient, file: &Utf8Path, url: &str) -> Result<()> {
    info!("Uploading file: {file} to url: {url}");
    let response = {
        let mut handle = File::open(file).map_err(|source| PublishError::Io {
            path: file.to_owned(),
            source,
        })?;
        client.put_file(url, &mut handle)?
    };
    if !response.has_status(STATUS_OK) {
        debug!("Upload response body: {}", response.body);
        return Err(PublishError::Upload {
            file: file.to_owned(),
            url: url.to_owned(),
            status: response.status,
        });
    }
    Ok(())
}
