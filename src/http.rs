//! Blocking HTTP transport for the release host and the registry.
//!
//! Provides a trait-based abstraction over the four request shapes the
//! publisher needs, so the pipeline can be exercised in tests without
//! network access. The production implementation uses `ureq` configured to
//! hand every status code back to the caller: deciding which statuses count
//! as success is the caller's job, and it always compares codes by value.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Status code for a successful fetch, lookup, or upload.
pub const STATUS_OK: u16 = 200;

/// Status code the registry answers a successful create with.
pub const STATUS_CREATED: u16 = 201;

/// Media type the registry's JSON:API endpoints expect.
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// A response with its status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Response body, decoded as UTF-8.
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the response carries exactly `expected` as its status.
    #[must_use]
    pub const fn has_status(&self, expected: u16) -> bool {
        self.status == expected
    }
}

/// Errors raised before a status code is available.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// Local I/O failed while streaming a request or response body.
    #[error("I/O error transferring {url}: {source}")]
    Io {
        /// The URL involved in the transfer.
        url: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// The HTTP operations the publisher performs.
///
/// Implementations return the response for every status code and only
/// fail when no response is available.
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient {
    /// Fetch `url` without authentication. When the status is
    /// [`STATUS_OK`] the body is written to `dest`, replacing any existing
    /// file; otherwise `dest` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be written.
    fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u16, HttpError>;

    /// Issue a `GET` with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn get_authorized(&self, url: &str, token: &str) -> Result<HttpResponse, HttpError>;

    /// Issue a `POST` of a JSON:API document with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn post_json(&self, url: &str, token: &str, body: &str) -> Result<HttpResponse, HttpError>;

    /// Issue an unauthenticated `PUT` whose body is the contents of `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the request fails.
    fn put_file(&self, url: &str, file: &mut File) -> Result<HttpResponse, HttpError>;
}

/// HTTP client backed by a `ureq` agent.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Build a client that reports non-2xx statuses as responses.
    #[must_use]
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u16, HttpError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| transport_error(url, &e))?;
        let status = response.status().as_u16();
        if status != STATUS_OK {
            return Ok(status);
        }
        let mut file = File::create(dest).map_err(|source| io_error(url, source))?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(|source| io_error(url, source))?;
        Ok(status)
    }

    fn get_authorized(&self, url: &str, token: &str) -> Result<HttpResponse, HttpError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", bearer(token))
            .call()
            .map_err(|e| transport_error(url, &e))?;
        read_response(url, response)
    }

    fn post_json(&self, url: &str, token: &str, body: &str) -> Result<HttpResponse, HttpError> {
        let response = self
            .agent
            .post(url)
            .header("Authorization", bearer(token))
            .header("Content-Type", JSON_API_CONTENT_TYPE)
            .send(body)
            .map_err(|e| transport_error(url, &e))?;
        read_response(url, response)
    }

    fn put_file(&self, url: &str, file: &mut File) -> Result<HttpResponse, HttpError> {
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|source| io_error(url, source))?;
        let response = self
            .agent
            .put(url)
            .header("Content-Type", "application/octet-stream")
            .send(&contents[..])
            .map_err(|e| transport_error(url, &e))?;
        read_response(url, response)
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Collect the status and body text of a response.
fn read_response(
    url: &str,
    response: ureq::http::Response<ureq::Body>,
) -> Result<HttpResponse, HttpError> {
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .read_to_string()
        .map_err(|e| transport_error(url, &e))?;
    Ok(HttpResponse { status, body })
}

/// Map a ureq error to an [`HttpError`].
fn transport_error(url: &str, err: &ureq::Error) -> HttpError {
    HttpError::Transport {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

fn io_error(url: &str, source: std::io::Error) -> HttpError {
    HttpError::Io {
        url: url.to_owned(),
        source,
    }
}
