use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use page_mirror::{
    AssetError, FetchError, Fetcher, FileManager, HttpFetcher, MirrorError, MirrorOptions,
    PageMirror, Stage,
};
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves fixed bodies for known URLs and 404s everything else.
struct FixtureFetcher {
    bodies: HashMap<&'static str, &'static [u8]>,
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.bodies
            .get(url.as_str())
            .map(|body| body.to_vec())
            .ok_or_else(|| FetchError::http_status(url.as_str(), 404))
    }
}

fn options(output_dir: &Path) -> MirrorOptions {
    MirrorOptions {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    }
}

async fn mount(server: &MockServer, at: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

const BLOG_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Blog</title>
<link rel="stylesheet" href="/blog/assets/style.css">
<script src="https://cdn.other.com/lib.js"></script>
</head>
<body>
<p>Read more in the <a href="/blog">blog</a></p>
</body>
</html>"#;

#[tokio::test]
async fn test_mirror_blog_page_end_to_end() {
    let temp_dir = tempdir().unwrap();
    let fetcher = Arc::new(FixtureFetcher {
        bodies: HashMap::from([
            ("http://example.com/blog/about", BLOG_PAGE.as_bytes()),
            ("http://example.com/blog/assets/style.css", b"body { color: red; }".as_slice()),
        ]),
    });
    let mirror = PageMirror::with_collaborators(
        fetcher,
        Arc::new(FileManager::new()),
        options(temp_dir.path()),
    );

    let result = mirror.mirror("http://example.com/blog/about").await.unwrap();

    assert_eq!(
        result.html_path,
        temp_dir.path().join("example-com-blog-about.html")
    );
    assert!(result.is_complete());

    let html = fs::read_to_string(&result.html_path).unwrap();
    assert_eq!(
        html,
        BLOG_PAGE.replace(
            r#"href="/blog/assets/style.css""#,
            r#"href="example-com-blog-about_files/example-com-blog-about-assets-style.css""#
        )
    );

    let css = temp_dir
        .path()
        .join("example-com-blog-about_files")
        .join("example-com-blog-about-assets-style.css");
    assert_eq!(fs::read(css).unwrap(), b"body { color: red; }");
}

#[tokio::test]
async fn test_remirror_is_byte_identical() {
    let temp_dir = tempdir().unwrap();
    let fetcher: Arc<dyn Fetcher> = Arc::new(FixtureFetcher {
        bodies: HashMap::from([
            ("http://example.com/blog/about", BLOG_PAGE.as_bytes()),
            ("http://example.com/blog/assets/style.css", b"css".as_slice()),
        ]),
    });
    let mirror = PageMirror::with_collaborators(
        fetcher,
        Arc::new(FileManager::new()),
        options(temp_dir.path()),
    );

    let first = mirror.mirror("http://example.com/blog/about").await.unwrap();
    let first_html = fs::read(&first.html_path).unwrap();
    let second = mirror.mirror("http://example.com/blog/about").await.unwrap();
    let second_html = fs::read(&second.html_path).unwrap();

    assert_eq!(first.html_path, second.html_path);
    assert_eq!(first_html, second_html);
}

#[tokio::test]
async fn test_colliding_asset_names_get_distinct_files() {
    let temp_dir = tempdir().unwrap();
    let page = r#"<html><head>
        <link rel="stylesheet" href="assets/style.css">
        <link rel="stylesheet" href="/assets/style.css">
        </head><body></body></html>"#;
    let fetcher = Arc::new(FixtureFetcher {
        bodies: HashMap::from([
            ("http://example.com/blog/about", page.as_bytes()),
            ("http://example.com/blog/assets/style.css", b"blog".as_slice()),
            ("http://example.com/assets/style.css", b"root".as_slice()),
        ]),
    });
    let mirror = PageMirror::with_collaborators(
        fetcher,
        Arc::new(FileManager::new()),
        options(temp_dir.path()),
    );

    let result = mirror.mirror("http://example.com/blog/about").await.unwrap();
    assert!(result.is_complete());
    assert_eq!(result.assets.len(), 2);
    assert_ne!(result.assets[0].destination, result.assets[1].destination);

    let html = fs::read_to_string(&result.html_path).unwrap();
    for outcome in &result.assets {
        let expected = if outcome.url.path() == "/blog/assets/style.css" {
            b"blog".as_slice()
        } else {
            b"root".as_slice()
        };
        assert_eq!(fs::read(&outcome.destination).unwrap(), expected);

        let file_name = outcome.destination.file_name().unwrap().to_str().unwrap();
        let reference = format!(r#"href="example-com-blog-about_files/{file_name}""#);
        assert_eq!(html.matches(&reference).count(), 1, "{reference} in {html}");
    }
}

#[tokio::test]
async fn test_mirror_over_http_with_broken_asset() {
    let server = MockServer::start().await;
    let page = r#"<html><head><link rel="stylesheet" href="/blog/assets/style.css"></head>
        <body><img src="/blog/missing.png"><img src="photo.jpg"></body></html>"#;
    mount(&server, "/blog/about", page.as_bytes()).await;
    mount(&server, "/blog/assets/style.css", b"p {}").await;
    mount(&server, "/blog/photo.jpg", &[0xff, 0xd8, 0xff, 0x00]).await;

    let temp_dir = tempdir().unwrap();
    let mirror = PageMirror::new(options(temp_dir.path())).unwrap();
    let page_url = format!("{}/blog/about", server.uri());

    let result = mirror.mirror(&page_url).await.unwrap();

    assert_eq!(
        result.html_path,
        temp_dir.path().join("127-0-0-1-blog-about.html")
    );
    assert_eq!(result.assets.len(), 3);

    let failed: Vec<_> = result.failed_assets().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].url.path(), "/blog/missing.png");
    assert!(matches!(
        failed[0].result,
        Err(AssetError::Fetch(FetchError::HttpStatus { status: 404, .. }))
    ));

    let html = fs::read_to_string(&result.html_path).unwrap();
    assert!(html.contains("127-0-0-1-blog-about_files/127-0-0-1-blog-about-missing.png"));
    assert!(html.contains("127-0-0-1-blog-about_files/127-0-0-1-blog-about-photo.jpg"));

    let photo = result.assets_dir.join("127-0-0-1-blog-about-photo.jpg");
    assert_eq!(fs::read(photo).unwrap(), vec![0xff, 0xd8, 0xff, 0x00]);
    assert!(!result.assets_dir.join("127-0-0-1-blog-about-missing.png").exists());
}

#[tokio::test]
async fn test_unparseable_reference_is_reported_as_warning() {
    let temp_dir = tempdir().unwrap();
    let page = r#"<img src="http://[::1/x.png"><img src="/ok.png">"#;
    let fetcher = Arc::new(FixtureFetcher {
        bodies: HashMap::from([
            ("http://example.com/", page.as_bytes()),
            ("http://example.com/ok.png", b"png".as_slice()),
        ]),
    });
    let mirror = PageMirror::with_collaborators(
        fetcher,
        Arc::new(FileManager::new()),
        options(temp_dir.path()),
    );

    let result = mirror.mirror("http://example.com/").await.unwrap();

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].raw, "http://[::1/x.png");
    assert!(!result.is_complete());
    assert_eq!(result.assets.len(), 1);
    assert!(result.assets[0].is_success());

    let html = fs::read_to_string(&result.html_path).unwrap();
    assert_eq!(
        html,
        r#"<img src="http://[::1/x.png"><img src="example-com_files/example-com-ok.png">"#
    );
}

#[tokio::test]
async fn test_page_not_found_is_fatal() {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    let mirror = PageMirror::new(options(temp_dir.path())).unwrap();

    let err = mirror
        .mirror(&format!("{}/nowhere", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::FetchPage);
    assert!(matches!(
        err,
        MirrorError::FetchPage(FetchError::HttpStatus { status: 404, .. })
    ));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_millis(200), "test-agent").unwrap();
    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
    drop(server);

    let fetcher = HttpFetcher::new(Duration::from_secs(5), "test-agent").unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_html_write_failure_is_fatal() {
    let temp_dir = tempdir().unwrap();
    // A directory where the HTML file should go makes the write fail.
    fs::create_dir(temp_dir.path().join("example-com.html")).unwrap();

    let fetcher = Arc::new(FixtureFetcher {
        bodies: HashMap::from([("http://example.com/", b"<p>hello</p>".as_slice())]),
    });
    let mirror = PageMirror::with_collaborators(
        fetcher,
        Arc::new(FileManager::new()),
        options(temp_dir.path()),
    );

    let err = mirror.mirror("http://example.com/").await.unwrap_err();
    assert_eq!(err.stage(), Stage::WriteHtml);
}
