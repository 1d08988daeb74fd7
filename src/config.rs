//! Release configuration resolved once per run.
//!
//! The publisher targets exactly one provider in one organisation, so most
//! values are compile-time constants. Only the release version and the two
//! credentials come from the environment; [`ReleaseConfig::from_lookup`]
//! takes the lookup as a closure so tests can resolve configuration without
//! touching process state.

use crate::platform::Platform;
use log::info;
use std::fmt;
use thiserror::Error;

/// Environment variable holding the release version (the pushed tag).
pub const VERSION_VAR: &str = "REF_NAME";
/// Environment variable holding the registry API token.
pub const TOKEN_VAR: &str = "TF_ADMIN_TOKEN";
/// Environment variable holding the GPG key id the release was signed with.
pub const KEY_ID_VAR: &str = "GPG_KEY_ID";

const BASE_PROVIDER_FILE_NAME: &str = "terraform-provider-google";
const PROVIDER_NAME: &str = "google";
const ORG_NAME: &str = "candid-health";
const REGISTRY_NAME: &str = "private";
const BASE_API_URL: &str = "https://app.terraform.io/api/v2";
const GITHUB_REPO_URL: &str = "https://github.com/candid-health/terraform-provider-google";

/// Errors raised while resolving configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("could not find {name} in your environment; add it and run again")]
    MissingVariable {
        /// Name of the missing variable.
        name: &'static str,
    },

    /// The version variable held only a `v` prefix.
    #[error("REF_NAME value \"{value}\" does not contain a version")]
    InvalidVersion {
        /// The rejected value.
        value: String,
    },
}

/// Immutable settings for a single publishing run.
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Version being published, without a leading `v`.
    pub version: String,
    /// Provider name as registered (`google`).
    pub provider_name: String,
    /// Prefix of every release asset filename.
    pub base_file_name: String,
    /// Registry organisation.
    pub org_name: String,
    /// Registry namespace; matches the organisation for private providers.
    pub namespace: String,
    /// Registry kind (`private`).
    pub registry_name: String,
    /// Registry API root, without a trailing slash.
    pub base_api_url: String,
    /// Repository whose GitHub releases hold the built artefacts.
    pub github_repo_url: String,
    /// Bearer token for the registry API.
    pub token: String,
    /// GPG key id registered with the registry.
    pub key_id: String,
}

impl ReleaseConfig {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] naming the first required
    /// variable that is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration using the supplied variable lookup.
    ///
    /// Values are trimmed; blank values count as missing. A leading `v` on
    /// the version is dropped so tag names such as `v1.2.3` resolve to the
    /// bare version used in asset filenames.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] for unset or blank
    /// variables and [`ConfigError::InvalidVersion`] when the version is
    /// nothing but a prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use provider_publisher::config::ReleaseConfig;
    ///
    /// let config = ReleaseConfig::from_lookup(|name| match name {
    ///     "REF_NAME" => Some("v1.2.3".to_owned()),
    ///     _ => Some("secret".to_owned()),
    /// })
    /// .expect("all variables present");
    /// assert_eq!(config.version, "1.2.3");
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVariable { name })
        };

        let raw_version = require(VERSION_VAR)?;
        let version = normalise_version(&raw_version)?;
        let token = require(TOKEN_VAR)?;
        let key_id = require(KEY_ID_VAR)?;

        let config = Self::new(version, token, key_id);
        info!("Resolved release version {}", config.version);
        Ok(config)
    }

    /// Build a configuration for `version` with the built-in provider,
    /// organisation and endpoints.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        token: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            provider_name: PROVIDER_NAME.to_owned(),
            base_file_name: BASE_PROVIDER_FILE_NAME.to_owned(),
            org_name: ORG_NAME.to_owned(),
            namespace: ORG_NAME.to_owned(),
            registry_name: REGISTRY_NAME.to_owned(),
            base_api_url: BASE_API_URL.to_owned(),
            github_repo_url: GITHUB_REPO_URL.to_owned(),
            token: token.into(),
            key_id: key_id.into(),
        }
    }

    /// Filename of the goreleaser build manifest.
    #[must_use]
    pub fn manifest_file(&self) -> String {
        self.versioned_file("manifest.json")
    }

    /// Filename of the `SHA256SUMS` checksum manifest.
    #[must_use]
    pub fn checksum_file(&self) -> String {
        self.versioned_file("SHA256SUMS")
    }

    /// Filename of the detached GPG signature over the checksum manifest.
    #[must_use]
    pub fn checksum_signature_file(&self) -> String {
        self.versioned_file("SHA256SUMS.sig")
    }

    /// Filename of the provider archive built for `platform`.
    ///
    /// # Examples
    ///
    /// ```
    /// use provider_publisher::config::ReleaseConfig;
    /// use provider_publisher::platform::{Architecture, OperatingSystem, Platform};
    ///
    /// let config = ReleaseConfig::new("1.2.3", "token", "key");
    /// let platform = Platform::new(OperatingSystem::Darwin, Architecture::Amd64);
    /// assert_eq!(
    ///     config.archive_file(platform),
    ///     "terraform-provider-google_1.2.3_darwin_amd64.zip"
    /// );
    /// ```
    #[must_use]
    pub fn archive_file(&self, platform: Platform) -> String {
        self.versioned_file(&format!("{platform}.zip"))
    }

    /// Download URL of a release asset on GitHub.
    #[must_use]
    pub fn release_asset_url(&self, filename: &str) -> String {
        format!(
            "{}/releases/download/v{}/{filename}",
            self.github_repo_url, self.version
        )
    }

    /// Registry collection URL for this provider's versions.
    #[must_use]
    pub fn versions_url(&self) -> String {
        format!(
            "{}/organizations/{}/registry-providers/{}/{}/{}/versions",
            self.base_api_url,
            self.org_name,
            self.registry_name,
            self.namespace,
            self.provider_name
        )
    }

    /// Registry URL of the version being published.
    #[must_use]
    pub fn version_url(&self) -> String {
        format!("{}/{}", self.versions_url(), self.version)
    }

    /// Registry collection URL for the published version's platforms.
    #[must_use]
    pub fn platforms_url(&self) -> String {
        format!("{}/platforms", self.version_url())
    }

    fn versioned_file(&self, suffix: &str) -> String {
        format!("{}_{}_{suffix}", self.base_file_name, self.version)
    }
}

impl fmt::Debug for ReleaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseConfig")
            .field("version", &self.version)
            .field("provider_name", &self.provider_name)
            .field("base_file_name", &self.base_file_name)
            .field("org_name", &self.org_name)
            .field("namespace", &self.namespace)
            .field("registry_name", &self.registry_name)
            .field("base_api_url", &self.base_api_url)
            .field("github_repo_url", &self.github_repo_url)
            .field("token", &"<redacted>")
            .field("key_id", &self.key_id)
            .finish()
    }
}

fn normalise_version(raw: &str) -> Result<String, ConfigError> {
    let version = raw.strip_prefix('v').unwrap_or(raw);
    if version.is_empty() {
        return Err(ConfigError::InvalidVersion {
            value: raw.to_owned(),
        });
    }
    Ok(version.to_owned())
}
