//! Shared test utilities: a recording HTTP stub and release fixtures.

use crate::config::ReleaseConfig;
use crate::http::{HttpClient, HttpError, HttpResponse, STATUS_CREATED, STATUS_OK};
use crate::platform::Platform;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Base of the upload URLs the stub registry issues.
pub const UPLOAD_BASE: &str = "https://archivist.example.test/v1/object";

/// Returns the lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Builds `SHA256SUMS` text for the given `(filename, contents)` pairs.
#[must_use]
pub fn checksum_text<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> String {
    files.into_iter().fold(String::new(), |mut text, (name, contents)| {
        text.push_str(&sha256_hex(contents));
        text.push_str("  ");
        text.push_str(name);
        text.push('\n');
        text
    })
}

/// Builds the full set of release assets for `config`, keyed by filename.
///
/// Every archive gets distinct contents, and the checksum file lists every
/// archive plus the build manifest.
#[must_use]
pub fn release_assets(config: &ReleaseConfig) -> BTreeMap<String, Vec<u8>> {
    let mut assets = BTreeMap::new();
    assets.insert(config.manifest_file(), br#"{"version":1}"#.to_vec());
    for platform in Platform::matrix() {
        let name = config.archive_file(platform);
        let contents = format!("zip for {platform}").into_bytes();
        assets.insert(name, contents);
    }
    let sums = checksum_text(
        assets
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.as_slice())),
    );
    assets.insert(config.checksum_file(), sums.into_bytes());
    assets.insert(
        config.checksum_signature_file(),
        b"-----BEGIN PGP SIGNATURE-----".to_vec(),
    );
    assets
}

/// A request observed by [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// An unauthenticated asset download.
    Fetch {
        /// Requested URL.
        url: String,
    },
    /// An authenticated lookup.
    Get {
        /// Requested URL.
        url: String,
        /// Bearer token sent.
        token: String,
    },
    /// An authenticated JSON:API create.
    Post {
        /// Requested URL.
        url: String,
        /// Request document text.
        body: String,
    },
    /// A file upload.
    Put {
        /// Upload URL.
        url: String,
        /// Uploaded bytes.
        contents: Vec<u8>,
    },
}

/// In-memory stand-in for the release host and the registry.
///
/// Assets are served by filename: a fetch succeeds when the URL ends with
/// `/{filename}` for a known asset and answers 404 otherwise. Create calls
/// answer with the configured status and, on 201, a response carrying
/// upload links under [`UPLOAD_BASE`].
#[derive(Debug)]
pub struct RecordingClient {
    /// Release assets served by filename.
    pub assets: BTreeMap<String, Vec<u8>>,
    /// Status returned for version lookups.
    pub lookup_status: u16,
    /// Status returned when creating the version.
    pub version_create_status: u16,
    /// Status returned when creating platforms.
    pub platform_create_status: u16,
    /// Status returned for uploads.
    pub upload_status: u16,
    calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingClient {
    /// Creates a stub serving `assets` where the version does not exist yet
    /// and every create and upload succeeds.
    #[must_use]
    pub const fn new(assets: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            assets,
            lookup_status: 404,
            version_create_status: STATUS_CREATED,
            platform_create_status: STATUS_CREATED,
            upload_status: STATUS_OK,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Returns every request seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Counts recorded downloads.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.count(|call| matches!(call, RecordedCall::Fetch { .. }))
    }

    /// Counts recorded lookups.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.count(|call| matches!(call, RecordedCall::Get { .. }))
    }

    /// Counts version creates.
    #[must_use]
    pub fn version_create_count(&self) -> usize {
        self.count(|call| {
            matches!(call, RecordedCall::Post { url, .. } if url.ends_with("/versions"))
        })
    }

    /// Counts platform creates.
    #[must_use]
    pub fn platform_create_count(&self) -> usize {
        self.count(|call| {
            matches!(call, RecordedCall::Post { url, .. } if url.ends_with("/platforms"))
        })
    }

    /// Counts uploads.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.count(|call| matches!(call, RecordedCall::Put { .. }))
    }

    /// Returns the URLs uploaded to, in order.
    #[must_use]
    pub fn upload_urls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Put { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&RecordedCall) -> bool) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.borrow_mut().push(call);
    }

    fn asset_for(&self, url: &str) -> Option<&Vec<u8>> {
        let filename = url.rsplit('/').next()?;
        self.assets.get(filename)
    }

    fn version_response(&self) -> HttpResponse {
        if self.version_create_status != STATUS_CREATED {
            return HttpResponse::new(
                self.version_create_status,
                r#"{"errors":["conflict"]}"#,
            );
        }
        let body = serde_json::json!({
            "data": {
                "type": "registry-provider-versions",
                "links": {
                    "shasums-upload": format!("{UPLOAD_BASE}/shasums"),
                    "shasums-sig-upload": format!("{UPLOAD_BASE}/shasums-sig"),
                }
            }
        });
        HttpResponse::new(STATUS_CREATED, body.to_string())
    }

    fn platform_response(&self, request: &str) -> HttpResponse {
        if self.platform_create_status != STATUS_CREATED {
            return HttpResponse::new(
                self.platform_create_status,
                r#"{"errors":["invalid"]}"#,
            );
        }
        let document: serde_json::Value = serde_json::from_str(request).unwrap_or_default();
        let filename = document
            .pointer("/data/attributes/filename")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        let body = serde_json::json!({
            "data": {
                "type": "registry-provider-version-platforms",
                "links": {
                    "provider-binary-upload": format!("{UPLOAD_BASE}/{filename}"),
                }
            }
        });
        HttpResponse::new(STATUS_CREATED, body.to_string())
    }
}

impl HttpClient for RecordingClient {
    fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u16, HttpError> {
        self.record(RecordedCall::Fetch {
            url: url.to_owned(),
        });
        let Some(contents) = self.asset_for(url) else {
            return Ok(404);
        };
        std::fs::write(dest, contents).map_err(|source| HttpError::Io {
            url: url.to_owned(),
            source,
        })?;
        Ok(STATUS_OK)
    }

    fn get_authorized(&self, url: &str, token: &str) -> Result<HttpResponse, HttpError> {
        self.record(RecordedCall::Get {
            url: url.to_owned(),
            token: token.to_owned(),
        });
        Ok(HttpResponse::new(self.lookup_status, "{}"))
    }

    fn post_json(&self, url: &str, _token: &str, body: &str) -> Result<HttpResponse, HttpError> {
        self.record(RecordedCall::Post {
            url: url.to_owned(),
            body: body.to_owned(),
        });
        if url.ends_with("/platforms") {
            Ok(self.platform_response(body))
        } else {
            Ok(self.version_response())
        }
    }

    fn put_file(&self, url: &str, file: &mut File) -> Result<HttpResponse, HttpError> {
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|source| HttpError::Io {
            url: url.to_owned(),
            source,
        })?;
        self.record(RecordedCall::Put {
            url: url.to_owned(),
            contents,
        });
        Ok(HttpResponse::new(self.upload_status, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ChecksumManifest;

    #[test]
    fn checksum_text_writes_one_double_spaced_line_per_file() {
        let text = checksum_text([("a.zip", b"a".as_slice()), ("b.zip", b"b".as_slice())]);

        assert_eq!(
            text,
            format!("{}  a.zip\n{}  b.zip\n", sha256_hex(b"a"), sha256_hex(b"b"))
        );
        let manifest = ChecksumManifest::parse(&text).expect("parseable manifest");
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn platform_create_links_upload_to_requested_filename() {
        let client = RecordingClient::new(BTreeMap::new());
        let request = serde_json::json!({
            "data": { "attributes": { "filename": "p_1.2.3_linux_amd64.zip" } }
        });

        let response = client
            .post_json("https://registry.test/platforms", "token", &request.to_string())
            .expect("stub response");

        assert_eq!(response.status, STATUS_CREATED);
        assert!(
            response
                .body
                .contains(&format!("{UPLOAD_BASE}/p_1.2.3_linux_amd64.zip"))
        );
        assert_eq!(client.platform_create_count(), 1);
    }

    #[test]
    fn platform_create_without_filename_still_answers() {
        let client = RecordingClient::new(BTreeMap::new());

        let response = client
            .post_json("https://registry.test/platforms", "token", "not json")
            .expect("stub response");

        assert_eq!(response.status, STATUS_CREATED);
        assert!(response.body.contains(&format!("{UPLOAD_BASE}/")));
    }
}
