//! The end-to-end publishing pipeline.
//!
//! Download → create the version if the registry lacks it → register and
//! upload every platform. Steps run strictly in sequence and nothing is
//! rolled back: after a failure the registry keeps whatever was created.

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::registry::Registry;
use crate::release::download_all_assets;
use crate::upload::UploadTarget;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// Local paths of the downloaded assets.
    pub downloaded: Vec<Utf8PathBuf>,
    /// Whether this run created the provider version.
    pub version_created: bool,
    /// The platform archives uploaded.
    pub platforms: Vec<UploadTarget>,
}

/// Publish the configured release, staging assets in `work_dir`.
///
/// # Errors
///
/// Returns the first error raised by any step.
pub fn do_full_deploy(
    client: &dyn HttpClient,
    config: &ReleaseConfig,
    work_dir: &Utf8Path,
) -> Result<DeployReport> {
    let downloaded = download_all_assets(client, config, work_dir)?;

    let registry = Registry::new(client, config, work_dir);
    let version_created = if registry.version_exists()? {
        info!("Provider version {} already exists", config.version);
        false
    } else {
        registry.create_version()?;
        true
    };

    let platforms = registry.create_all_platforms()?;
    Ok(DeployReport {
        downloaded,
        version_created,
        platforms,
    })
}
