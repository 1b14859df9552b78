//! Tests for scheme dispatch and the non-HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use wombat_net::{
    ChromeHandler, DataUrl, Dispatcher, DispatcherConfig, Download, DownloadError, NULL_MIME,
    SchemeHandler, file_url_to_path,
};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(&DispatcherConfig::default()).unwrap()
}

fn echo(url: &str) -> Result<Download, DownloadError> {
    Ok(Download::new(url.as_bytes(), "text/plain"))
}

// ========== data: ==========

#[tokio::test]
async fn test_data_url_keeps_commas_in_payload() {
    let download = dispatcher().download("data:,hello,void").await.unwrap();
    assert_eq!(download.data, b"hello,void");
    assert_eq!(download.mime, "application/octet-stream");
}

#[tokio::test]
async fn test_data_url_empty_payload() {
    let download = dispatcher().download("data:,").await.unwrap();
    assert!(download.data.is_empty());
    assert_eq!(download.mime, "application/octet-stream");
}

#[tokio::test]
async fn test_data_url_percent_escapes() {
    let download = dispatcher()
        .download("data:text/css,a%7Bcolor:red%7D")
        .await
        .unwrap();
    assert_eq!(download.data, b"a{color:red}");
    assert_eq!(download.mime, "text/css");
}

#[tokio::test]
async fn test_data_url_fragment_is_payload() {
    let download = dispatcher().download("data:text/plain,a#b").await.unwrap();
    assert_eq!(download.data, b"a#b");
}

#[tokio::test]
async fn test_data_url_base64() {
    let download = dispatcher()
        .download("data:text/plain;base64,aGVsbG8=")
        .await
        .unwrap();
    assert_eq!(download.data, b"hello");
    assert_eq!(download.mime, "text/plain");
}

#[test]
fn test_data_url_charset() {
    let url = DataUrl::parse("data:text/plain;charset=iso-8859-1,caf%E9").unwrap();
    assert_eq!(url.charset.as_deref(), Some("iso-8859-1"));
    assert!(!url.base64);
    assert_eq!(url.decode().unwrap(), vec![b'c', b'a', b'f', 0xE9]);
}

#[test]
fn test_latin1_data_url_keeps_escaped_octets() {
    let escaped = DataUrl::parse("data:text/plain;charset=latin1,%E9%C3%A9").unwrap();
    assert_eq!(escaped.decode().unwrap(), vec![0xE9, 0xC3, 0xA9]);

    let literal = DataUrl::parse("data:text/plain;charset=Latin1,caf\u{e9}\u{2014}").unwrap();
    assert_eq!(literal.decode().unwrap(), vec![b'c', b'a', b'f', 0xE9, b'?']);
}

#[tokio::test]
async fn test_bad_data_urls() {
    let result = dispatcher().download("data:text/plain").await;
    assert!(matches!(result, Err(DownloadError::BadDataUrl(_))));

    let result = dispatcher().download("data:;base64,@@@").await;
    assert!(matches!(result, Err(DownloadError::BadDataUrl(_))));
}

// ========== file: ==========

#[test]
fn test_file_url_forms() {
    assert_eq!(
        file_url_to_path("file:///etc/hosts").unwrap().to_str(),
        Some("/etc/hosts")
    );
    assert_eq!(
        file_url_to_path("file://localhost/etc/hosts").unwrap().to_str(),
        Some("/etc/hosts")
    );
    assert_eq!(
        file_url_to_path("file:/etc/hosts").unwrap().to_str(),
        Some("/etc/hosts")
    );
    assert_eq!(
        file_url_to_path("file://./docs/a%20b.svg").unwrap().to_str(),
        Some("docs/a b.svg")
    );
    assert!(matches!(
        file_url_to_path("file://example.com/etc/hosts"),
        Err(DownloadError::NonLocalFile(_))
    ));
}

#[tokio::test]
async fn test_file_download() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.css");
    std::fs::write(&path, "p { color: red }").unwrap();

    let url = format!("file://{}#section", path.display());
    let download = dispatcher().download(&url).await.unwrap();
    assert_eq!(download.data, b"p { color: red }");
    assert_eq!(download.mime, "text/css");
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("file://{}/missing.svg", dir.path().display());
    let result = dispatcher().download(&url).await;
    assert!(matches!(result, Err(DownloadError::Io { .. })));
}

// ========== chrome: ==========

#[tokio::test]
async fn test_builtin_html_stylesheet() {
    let download = dispatcher().download("chrome://html.css").await.unwrap();
    assert_eq!(download.mime, "text/css");
    let text = String::from_utf8(download.data).unwrap();
    assert!(text.contains("display: none"));
}

#[tokio::test]
async fn test_chrome_dir_overrides_builtin() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("html.css"), "html { color: green }").unwrap();
    std::fs::write(dir.path().join("icon.svg"), "<svg/>").unwrap();

    let handler = ChromeHandler::new(Some(dir.path().to_owned()));
    let download = handler.download("chrome://html.css").await.unwrap();
    assert_eq!(download.data, b"html { color: green }");

    let download = handler.download("chrome://icon.svg").await.unwrap();
    assert_eq!(download.mime, "image/svg+xml");
}

#[tokio::test]
async fn test_chrome_rejects_unknown_and_escaping_paths() {
    let result = dispatcher().download("chrome://missing.css").await;
    assert!(matches!(result, Err(DownloadError::BadResourceUrl(_))));

    let result = dispatcher().download("chrome://../secret.css").await;
    assert!(matches!(result, Err(DownloadError::BadResourceUrl(_))));
}

// ========== cid: and resource: ==========

#[tokio::test]
async fn test_cid_without_source_is_null() {
    let download = dispatcher().download("cid:part1@example.org").await.unwrap();
    assert!(download.data.is_empty());
    assert_eq!(download.mime, NULL_MIME);
}

#[tokio::test]
async fn test_cid_with_source() {
    let dispatcher = dispatcher().with_cid_source(Arc::new(echo));
    let download = dispatcher.download("cid:part1@example.org").await.unwrap();
    assert_eq!(download.data, b"cid:part1@example.org");
    assert_eq!(download.mime, "text/plain");
}

#[tokio::test]
async fn test_resource_without_source_fails() {
    let result = dispatcher().download("resource:logo").await;
    assert!(matches!(result, Err(DownloadError::BadResourceUrl(_))));
}

#[tokio::test]
async fn test_resource_with_source() {
    let dispatcher = dispatcher().with_resource_source(Arc::new(echo));
    let download = dispatcher.download("resource:logo").await.unwrap();
    assert_eq!(download.data, b"resource:logo");
}

// ========== dispatch ==========

struct Gopher;

impl SchemeHandler for Gopher {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("gopher:")
    }

    fn download<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        future::ready(Ok(Download::new("gopher", "text/plain"))).boxed()
    }
}

#[tokio::test]
async fn test_unknown_scheme() {
    let result = dispatcher().download("gopher://example.org/").await;
    assert!(matches!(result, Err(DownloadError::UnsupportedScheme(_))));
}

#[tokio::test]
async fn test_custom_handler() {
    let dispatcher = dispatcher().with_handler(Arc::new(Gopher));
    let download = dispatcher.download("gopher://example.org/").await.unwrap();
    assert_eq!(download.data, b"gopher");
}

#[test]
fn test_transient_errors() {
    let network = DownloadError::Network {
        url: "http://h/".into(),
        message: "connection reset".into(),
    };
    assert!(network.is_transient());
    assert!(DownloadError::Resolve("h".into()).is_transient());
    assert!(
        DownloadError::Http {
            url: "http://h/".into(),
            status: 503
        }
        .is_transient()
    );
    assert!(
        !DownloadError::Http {
            url: "http://h/".into(),
            status: 404
        }
        .is_transient()
    );
    assert!(!DownloadError::BadDataUrl("data:".into()).is_transient());
}

// ========== configuration ==========

#[test]
fn test_config_from_json() {
    let config: DispatcherConfig = serde_json::from_str(
        r#"{
            "chrome_dir": "/opt/wombat/chrome",
            "http_cache": { "dir": "/var/cache/wombat", "fresh_time": 60 },
            "max_connections": 4,
            "read_timeout": 2.5
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.chrome_dir.as_deref().and_then(|dir| dir.to_str()),
        Some("/opt/wombat/chrome")
    );
    assert_eq!(config.http_cache.fresh_time, Duration::from_secs(60));
    assert_eq!(
        config.http_cache.max_time,
        Duration::from_secs(7 * 24 * 60 * 60)
    );
    assert_eq!(config.max_connections, Some(4));
    assert_eq!(config.read_timeout, Duration::from_millis(2500));
    assert_eq!(config.connect_timeout, Duration::from_millis(1500));
}

#[test]
fn test_default_config_has_no_cache() {
    let config = DispatcherConfig::default();
    assert!(config.http_cache.dir.is_none());
    assert!(config.chrome_dir.is_none());
}
