//! Resource fetcher: turns a path-or-URL reference into a local file.
//!
//! Local paths are validated in place without copying. Remote `http`/`https`
//! URLs are streamed into a temp directory owned by the returned
//! [`FetchedResource`]; dropping the resource removes the download. A byte
//! cap is enforced against the Content-Length header and again while
//! streaming, so a lying or absent header cannot blow the limit.

use std::path::{Path, PathBuf};

use {
    futures::StreamExt,
    tokio::io::AsyncWriteExt,
    tracing::{debug, info},
    url::Url,
    uuid::Uuid,
};

use limelight_config::FetchConfig;

pub mod error;
pub mod media;

pub use {
    error::{Error, Result},
    media::{MediaKind, extension_for_content_type},
};

/// A locally available resource, either a validated local path or a
/// downloaded temp file. The temp directory lives exactly as long as this
/// value.
#[derive(Debug)]
pub struct FetchedResource {
    path: PathBuf,
    kind: MediaKind,
    origin: String,
    downloaded: bool,
    _temp: Option<tempfile::TempDir>,
}

impl FetchedResource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// The reference this resource was fetched from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn is_downloaded(&self) -> bool {
        self.downloaded
    }

    /// File name for display, falling back to the origin reference.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or_else(|| self.origin.clone(), ToOwned::to_owned)
    }
}

/// True when the reference parses as an `http`/`https` URL.
pub fn is_url(reference: &str) -> bool {
    matches!(Url::parse(reference), Ok(u) if matches!(u.scheme(), "http" | "https"))
}

/// Resolve a path-or-URL reference to a local file.
pub async fn fetch(reference: &str, config: &FetchConfig) -> Result<FetchedResource> {
    if reference.is_empty() {
        return Err(Error::failed(reference, "empty reference"));
    }
    if is_url(reference) {
        download(reference, config).await
    } else {
        local(reference)
    }
}

fn local(reference: &str) -> Result<FetchedResource> {
    let path = PathBuf::from(reference);
    if !path.is_file() {
        return Err(Error::NotFound(reference.to_owned()));
    }
    // Readability check; permissions problems surface here, not at use time.
    std::fs::File::open(&path)?;
    Ok(FetchedResource {
        kind: MediaKind::from_path(&path),
        path,
        origin: reference.to_owned(),
        downloaded: false,
        _temp: None,
    })
}

async fn download(reference: &str, config: &FetchConfig) -> Result<FetchedResource> {
    info!(url = %reference, "downloading resource");

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| Error::failed(reference, e.to_string()))?;

    let response = client
        .get(reference)
        .send()
        .await
        .map_err(|e| Error::failed(reference, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::failed(reference, format!("HTTP {status}")));
    }

    if let Some(length) = response.content_length() {
        if length > config.max_bytes {
            return Err(Error::TooLarge {
                actual: length,
                limit: config.max_bytes,
            });
        }
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let temp = tempfile::tempdir()?;
    let file_name = file_name_for(reference, content_type.as_deref());
    let path = temp.path().join(&file_name);

    let mut file = tokio::fs::File::create(&path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::failed(reference, e.to_string()))?;
        written += chunk.len() as u64;
        if written > config.max_bytes {
            return Err(Error::TooLarge {
                actual: written,
                limit: config.max_bytes,
            });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    debug!(url = %reference, bytes = written, file = %file_name, "download complete");

    // Content-Type wins over the URL extension when both are present.
    let kind = content_type
        .as_deref()
        .and_then(extension_for_content_type)
        .map(MediaKind::from_extension)
        .unwrap_or_else(|| MediaKind::from_path(&path));

    Ok(FetchedResource {
        path,
        kind,
        origin: reference.to_owned(),
        downloaded: true,
        _temp: Some(temp),
    })
}

/// Pick a file name for a download: the URL path's file name when it carries
/// an extension, otherwise a generated name with an extension inferred from
/// the Content-Type.
fn file_name_for(reference: &str, content_type: Option<&str>) -> String {
    let url_name = Url::parse(reference).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut s| s.next_back())
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned)
    });

    if let Some(name) = &url_name {
        if name.contains('.') {
            return name.clone();
        }
    }

    let ext = content_type.and_then(extension_for_content_type).unwrap_or("bin");
    match url_name {
        Some(name) => format!("{name}.{ext}"),
        None => format!("download-{}.{ext}", Uuid::new_v4()),
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FetchConfig {
        FetchConfig {
            max_bytes: 1024,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com/a.jpg"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("/tmp/a.jpg"));
        assert!(!is_url("C:\\slides\\deck.pptx"));
        assert!(!is_url("ftp://example.com/a.jpg"));
    }

    #[tokio::test]
    async fn local_file_is_not_copied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"fake png").unwrap();

        let resource = fetch(path.to_str().unwrap(), &test_config()).await.unwrap();
        assert_eq!(resource.path(), path);
        assert_eq!(resource.kind(), MediaKind::Image);
        assert!(!resource.is_downloaded());
    }

    #[tokio::test]
    async fn missing_local_file_fails() {
        let err = fetch("/nonexistent/file.jpg", &test_config()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn content_type_beats_missing_extension() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/photo")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(vec![0xFFu8; 64])
            .create_async()
            .await;

        let url = format!("{}/photo", server.url());
        let resource = fetch(&url, &test_config()).await.unwrap();
        mock.assert_async().await;

        assert_eq!(resource.kind(), MediaKind::Image);
        assert!(resource.is_downloaded());
        assert!(resource.display_name().ends_with(".jpg"));
        assert_eq!(std::fs::read(resource.path()).unwrap().len(), 64);
    }

    #[tokio::test]
    async fn url_extension_used_without_content_type() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/deck.pptx")
            .with_status(200)
            .with_body(b"not really a deck")
            .create_async()
            .await;

        let url = format!("{}/deck.pptx", server.url());
        let resource = fetch(&url, &test_config()).await.unwrap();
        assert_eq!(resource.kind(), MediaKind::Presentation);
        assert_eq!(resource.display_name(), "deck.pptx");
    }

    #[tokio::test]
    async fn http_error_is_reported_with_the_reference() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/gone", server.url());
        let err = fetch(&url, &test_config()).await.unwrap_err();
        match err {
            Error::Failed { reference, message } => {
                assert_eq!(reference, url);
                assert!(message.contains("404"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn byte_cap_is_enforced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/huge.bin")
            .with_status(200)
            .with_body(vec![0u8; 4096])
            .create_async()
            .await;

        let url = format!("{}/huge.bin", server.url());
        let err = fetch(&url, &test_config()).await.unwrap_err();
        assert!(matches!(err, Error::TooLarge { limit: 1024, .. }));
    }

    #[tokio::test]
    async fn dropping_the_resource_removes_the_download() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tune.mp3")
            .with_status(200)
            .with_body(b"mp3 bytes")
            .create_async()
            .await;

        let url = format!("{}/tune.mp3", server.url());
        let resource = fetch(&url, &test_config()).await.unwrap();
        let path = resource.path().to_path_buf();
        assert!(path.exists());
        drop(resource);
        assert!(!path.exists());
    }

    #[test]
    fn generated_names_get_an_extension() {
        assert_eq!(
            file_name_for("https://example.com/assets/photo", Some("image/png")),
            "photo.png"
        );
        assert_eq!(
            file_name_for("https://example.com/a/b.jpeg", None),
            "b.jpeg"
        );
        assert!(
            file_name_for("https://example.com/", Some("audio/mpeg")).ends_with(".mp3")
        );
    }
}
