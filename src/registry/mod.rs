//! Provider version and platform registration against the private registry.
//!
//! A [`Registry`] borrows the HTTP client, the release configuration, and
//! the directory holding the downloaded assets. Create calls expect status
//! 201; the upload links in the response are consumed immediately.

pub mod payload;

#[cfg(test)]
mod tests;

use crate::checksum::{ChecksumManifest, verify_file};
use crate::config::ReleaseConfig;
use crate::digest::Sha256Digest;
use crate::error::{PublishError, Result};
use crate::http::{HttpClient, HttpResponse, STATUS_CREATED, STATUS_OK};
use crate::platform::Platform;
use crate::upload::{UploadTarget, upload_asset};
use camino::Utf8Path;
use log::{debug, info};
use payload::{Created, Document, PlatformLinks, VersionLinks};
use serde::de::DeserializeOwned;

/// One platform archive ready to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRelease {
    /// The build target.
    pub platform: Platform,
    /// Archive filename.
    pub filename: String,
    /// Digest recorded in the checksum manifest.
    pub shasum: Sha256Digest,
}

/// Registry operations for one release.
pub struct Registry<'a> {
    client: &'a dyn HttpClient,
    config: &'a ReleaseConfig,
    work_dir: &'a Utf8Path,
}

impl<'a> Registry<'a> {
    /// Create a registry handle over downloaded assets in `work_dir`.
    #[must_use]
    pub fn new(
        client: &'a dyn HttpClient,
        config: &'a ReleaseConfig,
        work_dir: &'a Utf8Path,
    ) -> Self {
        Self {
            client,
            config,
            work_dir,
        }
    }

    /// Whether the registry already has this provider version.
    ///
    /// Only status 200 means the version exists. Every other status,
    /// including 404 and server errors, is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] if no response arrives.
    pub fn version_exists(&self) -> Result<bool> {
        let url = self.config.version_url();
        let response = self.client.get_authorized(&url, &self.config.token)?;
        debug!("Version lookup at {url} returned {}", response.status);
        Ok(response.has_status(STATUS_OK))
    }

    /// Register the provider version and upload its checksum file and
    /// signature.
    ///
    /// The registry rejects duplicates itself; call this only after
    /// [`Self::version_exists`] returned `false`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::VersionCreation`] for any status other than
    /// 201, [`PublishError::MalformedResponse`] when the upload links are
    /// missing, and any error [`upload_asset`] reports.
    pub fn create_version(&self) -> Result<()> {
        let url = self.config.versions_url();
        let body = serde_json::to_string(&Document::version(
            &self.config.version,
            &self.config.key_id,
        ))?;
        info!("Creating provider version {} at {url}", self.config.version);
        let response = self.client.post_json(&url, &self.config.token, &body)?;
        if !response.has_status(STATUS_CREATED) {
            return Err(PublishError::VersionCreation {
                url,
                status: response.status,
                body: response.body,
            });
        }
        let links = parse_links::<VersionLinks>(&url, &response)?;

        upload_asset(
            self.client,
            &self.work_dir.join(self.config.checksum_file()),
            &links.shasums_upload,
        )?;
        upload_asset(
            self.client,
            &self.work_dir.join(self.config.checksum_signature_file()),
            &links.shasums_sig_upload,
        )?;
        Ok(())
    }

    /// Read the downloaded `SHA256SUMS` file.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Checksum`] if the file cannot be read or a
    /// line is malformed.
    pub fn parse_checksum_manifest(&self) -> Result<ChecksumManifest> {
        let path = self.work_dir.join(self.config.checksum_file());
        Ok(ChecksumManifest::from_file(&path)?)
    }

    /// Register one platform and return where its archive must be uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::PlatformCreation`], including the response
    /// body, for any status other than 201, and
    /// [`PublishError::MalformedResponse`] when the upload link is missing.
    pub fn create_platform(
        &self,
        filename: &str,
        shasum: &Sha256Digest,
        platform: Platform,
    ) -> Result<UploadTarget> {
        let url = self.config.platforms_url();
        let body = serde_json::to_string(&Document::platform(
            platform.os,
            platform.arch,
            shasum.as_str(),
            filename,
        ))?;
        info!("Creating platform {platform} at {url}");
        let response = self.client.post_json(&url, &self.config.token, &body)?;
        if !response.has_status(STATUS_CREATED) {
            return Err(PublishError::PlatformCreation {
                platform: platform.to_string(),
                url,
                status: response.status,
                body: response.body,
            });
        }
        let links = parse_links::<PlatformLinks>(&url, &response)?;
        info!(
            "Created platform successfully! os: {}, arch: {}",
            platform.os, platform.arch
        );
        Ok(UploadTarget {
            filename: filename.to_owned(),
            upload_url: links.provider_binary_upload,
        })
    }

    /// Pair every platform in the matrix with its archive and manifest
    /// digest.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Checksum`] if the manifest cannot be read or
    /// lacks an entry for any archive.
    pub fn platform_releases(&self) -> Result<Vec<PlatformRelease>> {
        let manifest = self.parse_checksum_manifest()?;
        Platform::matrix()
            .into_iter()
            .map(|platform| -> Result<PlatformRelease> {
                let filename = self.config.archive_file(platform);
                let shasum = manifest.digest_for(&filename)?.clone();
                Ok(PlatformRelease {
                    platform,
                    filename,
                    shasum,
                })
            })
            .collect()
    }

    /// Register every platform, then upload every archive.
    ///
    /// All digests are looked up and checked against the downloaded
    /// archives before the first registration, so a missing manifest
    /// entry or a corrupt download leaves the registry untouched. Platforms
    /// registered before a later failure are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns the first lookup, verification, registration, or upload
    /// error encountered.
    pub fn create_all_platforms(&self) -> Result<Vec<UploadTarget>> {
        let releases = self.platform_releases()?;
        for release in &releases {
            verify_file(&self.work_dir.join(&release.filename), &release.shasum)?;
        }

        let targets = releases
            .iter()
            .map(|release| {
                self.create_platform(&release.filename, &release.shasum, release.platform)
            })
            .collect::<Result<Vec<_>>>()?;

        for target in &targets {
            upload_asset(
                self.client,
                &self.work_dir.join(&target.filename),
                &target.upload_url,
            )?;
        }
        Ok(targets)
    }
}

fn parse_links<L: DeserializeOwned>(url: &str, response: &HttpResponse) -> Result<L> {
    serde_json::from_str::<Created<L>>(&response.body)
        .map(|created| created.data.links)
        .map_err(|e| PublishError::MalformedResponse {
            url: url.to_owned(),
            reason: e.to_string(),
        })
}
