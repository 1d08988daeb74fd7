//! Download of built release assets from GitHub releases.
//!
//! The release is expected to carry the goreleaser manifest, the
//! `SHA256SUMS` file and its signature, and one zip archive per platform.

use crate::config::ReleaseConfig;
use crate::error::{PublishError, Result};
use crate::http::{HttpClient, STATUS_OK};
use crate::platform::Platform;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Filenames of every asset a release must carry, metadata first.
///
/// # Examples
///
/// ```
/// use provider_publisher::config::ReleaseConfig;
/// use provider_publisher::release::asset_names;
///
/// let config = ReleaseConfig::new("1.2.3", "token", "key");
/// let names = asset_names(&config);
/// assert_eq!(names.len(), 7);
/// assert_eq!(names[0], "terraform-provider-google_1.2.3_manifest.json");
/// ```
#[must_use]
pub fn asset_names(config: &ReleaseConfig) -> Vec<String> {
    let mut names = vec![
        config.manifest_file(),
        config.checksum_file(),
        config.checksum_signature_file(),
    ];
    names.extend(
        Platform::matrix()
            .into_iter()
            .map(|platform| config.archive_file(platform)),
    );
    names
}

/// Download every release asset into `work_dir`, one at a time.
///
/// Each file is saved under its release filename, overwriting any
/// existing copy. Returns the local paths in download order.
///
/// # Errors
///
/// Returns [`PublishError::Download`] naming the URL when the release host
/// answers with anything but 200, or [`PublishError::Http`] when the
/// request or the write fails.
pub fn download_all_assets(
    client: &dyn HttpClient,
    config: &ReleaseConfig,
    work_dir: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    let names = asset_names(config);
    let mut downloaded = Vec::with_capacity(names.len());
    for name in names {
        let url = config.release_asset_url(&name);
        let dest = work_dir.join(&name);
        info!("Downloading {name}");
        let status = client.fetch_to_file(&url, dest.as_std_path())?;
        if status != STATUS_OK {
            return Err(PublishError::Download { url, status });
        }
        downloaded.push(dest);
    }
    Ok(downloaded)
}
