//! JSON:API request and response documents for the private registry.
//!
//! Requests mirror the documented `registry-provider-versions` and
//! `registry-provider-version-platforms` create calls. Responses only
//! model the upload links the publisher consumes; every other field the
//! registry returns is ignored.

use crate::platform::{Architecture, OperatingSystem};
use serde::{Deserialize, Serialize};

/// Plugin protocol versions every published version advertises.
pub const PROTOCOLS: &[&str] = &["5.0"];

const VERSION_RESOURCE: &str = "registry-provider-versions";
const PLATFORM_RESOURCE: &str = "registry-provider-version-platforms";

/// Top-level JSON:API request document.
#[derive(Debug, Serialize)]
pub struct Document<A> {
    /// The resource being created.
    pub data: Resource<A>,
}

/// A typed resource with its attributes.
#[derive(Debug, Serialize)]
pub struct Resource<A> {
    /// JSON:API resource type.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Resource attributes.
    pub attributes: A,
}

/// Attributes of a provider version create request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VersionAttributes<'a> {
    /// Semantic version being registered.
    pub version: &'a str,
    /// GPG key id the checksum signature was made with.
    pub key_id: &'a str,
    /// Supported plugin protocol versions.
    pub protocols: &'a [&'a str],
}

/// Attributes of a provider platform create request.
#[derive(Debug, Serialize)]
pub struct PlatformAttributes<'a> {
    /// Target operating system.
    pub os: OperatingSystem,
    /// Target architecture.
    pub arch: Architecture,
    /// SHA-256 of the platform archive.
    pub shasum: &'a str,
    /// Archive filename.
    pub filename: &'a str,
}

impl<'a> Document<VersionAttributes<'a>> {
    /// Build the create-version request for `version` signed by `key_id`.
    #[must_use]
    pub const fn version(version: &'a str, key_id: &'a str) -> Self {
        Self {
            data: Resource {
                kind: VERSION_RESOURCE,
                attributes: VersionAttributes {
                    version,
                    key_id,
                    protocols: PROTOCOLS,
                },
            },
        }
    }
}

impl<'a> Document<PlatformAttributes<'a>> {
    /// Build the create-platform request.
    #[must_use]
    pub const fn platform(
        os: OperatingSystem,
        arch: Architecture,
        shasum: &'a str,
        filename: &'a str,
    ) -> Self {
        Self {
            data: Resource {
                kind: PLATFORM_RESOURCE,
                attributes: PlatformAttributes {
                    os,
                    arch,
                    shasum,
                    filename,
                },
            },
        }
    }
}

/// Response document of a successful create call.
#[derive(Debug, Deserialize)]
pub struct Created<L> {
    /// The created resource.
    pub data: CreatedResource<L>,
}

/// The created resource; only its links are read.
#[derive(Debug, Deserialize)]
pub struct CreatedResource<L> {
    /// Links issued for the resource.
    pub links: L,
}

/// Upload links issued for a new provider version.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VersionLinks {
    /// Upload URL for the `SHA256SUMS` file.
    pub shasums_upload: String,
    /// Upload URL for the `SHA256SUMS.sig` file.
    pub shasums_sig_upload: String,
}

/// Upload link issued for a new platform.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformLinks {
    /// Upload URL for the platform archive.
    pub provider_binary_upload: String,
}
