//! The fixed operating-system and architecture matrix a provider ships for.
//!
//! Every release publishes one archive per combination of
//! [`OperatingSystem`] and [`Architecture`]. The matrix is
//! closed: adding a platform means adding a variant here.

use serde::Serialize;
use std::fmt;

/// Operating systems the provider is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    /// macOS.
    Darwin,
    /// Linux.
    Linux,
}

impl OperatingSystem {
    /// All supported operating systems, in publishing order.
    pub const ALL: [Self; 2] = [Self::Darwin, Self::Linux];

    /// Return the registry and archive spelling of this OS.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures the provider is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// 64-bit ARM.
    Arm64,
    /// 64-bit x86.
    Amd64,
}

impl Architecture {
    /// All supported architectures, in publishing order.
    pub const ALL: [Self; 2] = [Self::Arm64, Self::Amd64];

    /// Return the registry and archive spelling of this architecture.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Amd64 => "amd64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One build target of a provider version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Target operating system.
    pub os: OperatingSystem,
    /// Target architecture.
    pub arch: Architecture,
}

impl Platform {
    /// Create a platform descriptor.
    #[must_use]
    pub const fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// Return every platform in the release matrix.
    ///
    /// The order is OS-major: `darwin/arm64`, `darwin/amd64`,
    /// `linux/arm64`, `linux/amd64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use provider_publisher::platform::Platform;
    ///
    /// let matrix = Platform::matrix();
    /// assert_eq!(matrix.len(), 4);
    /// assert_eq!(matrix[0].to_string(), "darwin_arm64");
    /// ```
    #[must_use]
    pub fn matrix() -> Vec<Self> {
        OperatingSystem::ALL
            .into_iter()
            .flat_map(|os| {
                Architecture::ALL
                    .into_iter()
                    .map(move |arch| Self::new(os, arch))
            })
            .collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}
