//! Unit tests for provider version and platform registration.

use super::*;
use crate::checksum::ChecksumError;
use crate::http::{HttpError, MockHttpClient};
use crate::platform::{Architecture, OperatingSystem};
use crate::test_utils::{
    RecordedCall, RecordingClient, UPLOAD_BASE, checksum_text, release_assets,
};
use camino::Utf8PathBuf;
use rstest::rstest;

const VERSION: &str = "1.2.3";

fn config() -> ReleaseConfig {
    ReleaseConfig::new(VERSION, "admin-token", "34365D9472D7468F")
}

fn work_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    (temp, path)
}

/// Write every release asset for `config` into `dir`.
fn stage_assets(config: &ReleaseConfig, dir: &Utf8Path) {
    for (name, contents) in release_assets(config) {
        std::fs::write(dir.join(name), contents).expect("stage asset");
    }
}

fn version_created_body() -> String {
    serde_json::json!({
        "data": {
            "links": {
                "shasums-upload": "https://archivist.example.test/sums",
                "shasums-sig-upload": "https://archivist.example.test/sig"
            }
        }
    })
    .to_string()
}

#[rstest]
#[case::found(200, true)]
#[case::bad_request(400, false)]
#[case::not_found(404, false)]
#[case::server_error(500, false)]
#[case::created_is_not_found(201, false)]
fn version_exists_only_on_status_200(#[case] status: u16, #[case] exists: bool) {
    let config = config();
    let mut client = MockHttpClient::new();
    let expected_url = config.version_url();
    client
        .expect_get_authorized()
        .withf(move |url, token| url == expected_url && token == "admin-token")
        .times(1)
        .returning(move |_, _| Ok(HttpResponse::new(status, "")));

    let registry = Registry::new(&client, &config, Utf8Path::new("."));
    assert_eq!(registry.version_exists().expect("lookup"), exists);
}

#[test]
fn version_exists_propagates_transport_failure() {
    let config = config();
    let mut client = MockHttpClient::new();
    client.expect_get_authorized().returning(|url, _| {
        Err(HttpError::Transport {
            url: url.to_owned(),
            reason: "connection refused".to_owned(),
        })
    });

    let registry = Registry::new(&client, &config, Utf8Path::new("."));
    assert!(matches!(
        registry.version_exists(),
        Err(PublishError::Http(_))
    ));
}

#[test]
fn create_version_posts_document_then_uploads_sums_and_signature() {
    let (_temp, dir) = work_dir();
    let config = config();
    stage_assets(&config, &dir);

    let mut client = MockHttpClient::new();
    let mut seq = mockall::Sequence::new();
    let expected_url = config.versions_url();
    client
        .expect_post_json()
        .withf(move |url, token, body| {
            let document: serde_json::Value = serde_json::from_str(body).expect("JSON body");
            url == expected_url
                && token == "admin-token"
                && document["data"]["type"] == "registry-provider-versions"
                && document["data"]["attributes"]["version"] == VERSION
                && document["data"]["attributes"]["key-id"] == "34365D9472D7468F"
                && document["data"]["attributes"]["protocols"] == serde_json::json!(["5.0"])
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(HttpResponse::new(201, version_created_body())));
    client
        .expect_put_file()
        .withf(|url, _| url == "https://archivist.example.test/sums")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(HttpResponse::new(200, "")));
    client
        .expect_put_file()
        .withf(|url, _| url == "https://archivist.example.test/sig")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(HttpResponse::new(200, "")));

    let registry = Registry::new(&client, &config, &dir);
    registry.create_version().expect("version created");
}

#[rstest]
#[case::conflict(422)]
#[case::ok_is_not_created(200)]
#[case::unauthorised(401)]
fn create_version_requires_status_201(#[case] status: u16) {
    let config = config();
    let mut client = MockHttpClient::new();
    client
        .expect_post_json()
        .returning(move |_, _, _| Ok(HttpResponse::new(status, r#"{"errors":[]}"#)));

    let registry = Registry::new(&client, &config, Utf8Path::new("."));
    let err = registry.create_version().expect_err("creation rejected");
    assert!(
        matches!(&err, PublishError::VersionCreation { status: s, .. } if *s == status),
        "got {err:?}"
    );
}

#[test]
fn create_version_rejects_response_without_links() {
    let config = config();
    let mut client = MockHttpClient::new();
    client
        .expect_post_json()
        .returning(|_, _, _| Ok(HttpResponse::new(201, r#"{"data":{"links":{}}}"#)));

    let registry = Registry::new(&client, &config, Utf8Path::new("."));
    let err = registry.create_version().expect_err("malformed response");
    assert!(matches!(err, PublishError::MalformedResponse { .. }));
}

#[test]
fn create_platform_returns_upload_target() {
    let config = config();
    let digest = Sha256Digest::try_from("c".repeat(64)).expect("valid digest");
    let platform = Platform::new(OperatingSystem::Linux, Architecture::Amd64);
    let filename = config.archive_file(platform);

    let mut client = MockHttpClient::new();
    let expected_url = config.platforms_url();
    client
        .expect_post_json()
        .withf(move |url, _, body| {
            let document: serde_json::Value = serde_json::from_str(body).expect("JSON body");
            let attributes = &document["data"]["attributes"];
            url == expected_url
                && document["data"]["type"] == "registry-provider-version-platforms"
                && attributes["os"] == "linux"
                && attributes["arch"] == "amd64"
                && attributes["shasum"] == "c".repeat(64).as_str()
                && attributes["filename"] == "terraform-provider-google_1.2.3_linux_amd64.zip"
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(HttpResponse::new(
                201,
                r#"{"data":{"id":"provider-platform-1","links":{"provider-binary-upload":"https://archivist.example.test/bin"}}}"#,
            ))
        });

    let registry = Registry::new(&client, &config, Utf8Path::new("."));
    let target = registry
        .create_platform(&filename, &digest, platform)
        .expect("platform created");
    assert_eq!(
        target,
        UploadTarget {
            filename,
            upload_url: "https://archivist.example.test/bin".to_owned(),
        }
    );
}

#[test]
fn create_platform_error_includes_response_body() {
    let config = config();
    let digest = Sha256Digest::try_from("c".repeat(64)).expect("valid digest");
    let platform = Platform::new(OperatingSystem::Darwin, Architecture::Arm64);
    let mut client = MockHttpClient::new();
    client
        .expect_post_json()
        .returning(|_, _, _| Ok(HttpResponse::new(422, "platform already exists")));

    let registry = Registry::new(&client, &config, Utf8Path::new("."));
    let err = registry
        .create_platform("x.zip", &digest, platform)
        .expect_err("creation rejected");
    assert!(err.to_string().contains("platform already exists"));
    assert!(err.to_string().contains("darwin_arm64"));
}

#[test]
fn create_all_platforms_registers_all_four_before_uploading() {
    let (_temp, dir) = work_dir();
    let config = config();
    stage_assets(&config, &dir);
    let client = RecordingClient::new(release_assets(&config));

    let registry = Registry::new(&client, &config, &dir);
    let targets = registry.create_all_platforms().expect("platforms created");

    assert_eq!(client.platform_create_count(), 4);
    assert_eq!(client.upload_count(), 4);
    let expected: Vec<String> = Platform::matrix()
        .into_iter()
        .map(|platform| format!("{UPLOAD_BASE}/terraform-provider-google_1.2.3_{platform}.zip"))
        .collect();
    assert_eq!(client.upload_urls(), expected);
    assert_eq!(targets.len(), 4);

    let calls = client.calls();
    let first_put = calls
        .iter()
        .position(|call| matches!(call, RecordedCall::Put { .. }))
        .expect("upload recorded");
    assert_eq!(first_put, 4, "all registrations precede the first upload");
}

#[test]
fn uploaded_bytes_match_the_archives() {
    let (_temp, dir) = work_dir();
    let config = config();
    let assets = release_assets(&config);
    stage_assets(&config, &dir);
    let client = RecordingClient::new(assets.clone());

    Registry::new(&client, &config, &dir)
        .create_all_platforms()
        .expect("platforms created");

    for call in client.calls() {
        if let RecordedCall::Put { url, contents } = call {
            let filename = url.rsplit('/').next().expect("filename in URL");
            assert_eq!(Some(&contents), assets.get(filename));
        }
    }
}

#[test]
fn missing_manifest_entry_fails_before_any_registration() {
    let (_temp, dir) = work_dir();
    let config = config();
    let mut assets = release_assets(&config);
    let missing =
        config.archive_file(Platform::new(OperatingSystem::Linux, Architecture::Arm64));
    let sums = checksum_text(
        assets
            .iter()
            .filter(|(name, _)| name.ends_with(".zip") && **name != missing)
            .map(|(name, contents)| (name.as_str(), contents.as_slice())),
    );
    assets.insert(config.checksum_file(), sums.into_bytes());
    for (name, contents) in &assets {
        std::fs::write(dir.join(name), contents).expect("stage asset");
    }
    let client = RecordingClient::new(assets);

    let err = Registry::new(&client, &config, &dir)
        .create_all_platforms()
        .expect_err("lookup miss");

    assert!(
        matches!(
            &err,
            PublishError::Checksum(ChecksumError::MissingEntry { filename }) if *filename == missing
        ),
        "got {err:?}"
    );
    assert_eq!(client.platform_create_count(), 0);
    assert_eq!(client.upload_count(), 0);
}

#[test]
fn corrupt_archive_fails_before_any_registration() {
    let (_temp, dir) = work_dir();
    let config = config();
    stage_assets(&config, &dir);
    let tampered =
        config.archive_file(Platform::new(OperatingSystem::Darwin, Architecture::Amd64));
    std::fs::write(dir.join(&tampered), b"truncated").expect("tamper archive");
    let client = RecordingClient::new(release_assets(&config));

    let err = Registry::new(&client, &config, &dir)
        .create_all_platforms()
        .expect_err("checksum mismatch");

    assert!(matches!(
        err,
        PublishError::Checksum(ChecksumError::Mismatch { .. })
    ));
    assert_eq!(client.platform_create_count(), 0);
}

#[test]
fn platform_creation_failure_aborts_without_uploads() {
    let (_temp, dir) = work_dir();
    let config = config();
    stage_assets(&config, &dir);
    let mut client = RecordingClient::new(release_assets(&config));
    client.platform_create_status = 500;

    let err = Registry::new(&client, &config, &dir)
        .create_all_platforms()
        .expect_err("creation rejected");

    assert!(matches!(err, PublishError::PlatformCreation { status: 500, .. }));
    assert_eq!(client.platform_create_count(), 1);
    assert_eq!(client.upload_count(), 0);
}
