use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::config::Config;
use crate::error::{AppError, Result};

pub const NO_TITLE: &str = "No title found";
pub const NO_SUMMARY: &str = "No summary found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub title: String,
    pub summary: String,
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| AppError::Config(format!("invalid user_agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// One GET, no retries. Any failure aborts the save that asked for it.
    pub async fn fetch(&self, url: &str) -> Result<PageInfo> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Failed to fetch {}: {}", url, status);
            return Err(AppError::Fetch(format!("HTTP {status}")));
        }

        let html = response.text().await?;
        tracing::debug!("Fetched {} bytes from {}", html.len(), url);

        extract_page_info(&html)
    }
}

/// Pull the `<title>` text and the meta description out of a page.
/// A description tag without a `content` attribute is a parse failure.
pub fn extract_page_info(html: &str) -> Result<PageInfo> {
    let document = Html::parse_document(html);

    let title = selector("title")
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let description = selector(r#"meta[name="description"]"#)
        .and_then(|sel| document.select(&sel).next());

    let summary = match description {
        Some(el) => el
            .value()
            .attr("content")
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Fetch("description meta tag has no content attribute".to_string())
            })?,
        None => NO_SUMMARY.to_string(),
    };

    Ok(PageInfo { title, summary })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn test_config(timeout_secs: u64) -> Config {
        Config {
            db_path: String::new(),
            user_agent: "bookmarker-test/1.0".to_string(),
            request_timeout_secs: timeout_secs,
            default_sort: Default::default(),
        }
    }

    /// Serves exactly one request with the given status line and body,
    /// handing the raw request text back through the join handle.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/page", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (url, handle)
    }

    #[test]
    fn missing_title_and_description_use_fallbacks() {
        let info = extract_page_info("<html><head></head><body><p>hi</p></body></html>").unwrap();
        assert_eq!(
            info,
            PageInfo {
                title: "No title found".to_string(),
                summary: "No summary found".to_string(),
            }
        );
    }

    #[test]
    fn title_and_description_are_extracted() {
        let info = extract_page_info(
            r#"<html><head>
                <title>  Rust Book </title>
                <meta name="keywords" content="rust">
                <meta name="description" content="Learn Rust.">
            </head></html>"#,
        )
        .unwrap();
        assert_eq!(info.title, "Rust Book");
        assert_eq!(info.summary, "Learn Rust.");
    }

    #[test]
    fn empty_title_falls_back() {
        let info = extract_page_info("<html><head><title>   </title></head></html>").unwrap();
        assert_eq!(info.title, NO_TITLE);
        assert_eq!(info.summary, NO_SUMMARY);
    }

    #[test]
    fn description_without_content_is_a_fetch_error() {
        let err = extract_page_info(
            r#"<html><head><title> A  </title><meta name="description"></head></html>"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Fetch(ref msg) if msg.contains("content")));
    }

    #[test]
    fn first_title_wins() {
        let info = extract_page_info(
            "<html><head><title>First</title></head><body><svg><title>Icon</title></svg></body></html>",
        )
        .unwrap();
        assert_eq!(info.title, "First");
    }

    #[tokio::test]
    async fn fetch_sends_user_agent_and_extracts() {
        let (url, server) = serve_once(
            "200 OK",
            r#"<html><head><title>Served</title><meta name="description" content="From the wire"></head></html>"#,
        );
        let fetcher = PageFetcher::new(&test_config(5)).unwrap();

        let info = fetcher.fetch(&url).await.unwrap();
        let request = server.join().unwrap();

        assert_eq!(info.title, "Served");
        assert_eq!(info.summary, "From the wire");
        assert!(request.to_lowercase().contains("user-agent: bookmarker-test/1.0"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let (url, server) = serve_once("404 Not Found", "gone");
        let fetcher = PageFetcher::new(&test_config(5)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, AppError::Fetch(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn refused_connection_is_a_fetch_error() {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let fetcher = PageFetcher::new(&test_config(5)).unwrap();

        let err = fetcher.fetch(&format!("http://127.0.0.1:{port}/")).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out_as_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        });
        let fetcher = PageFetcher::new(&test_config(1)).unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, AppError::Fetch(_)));
    }

    #[tokio::test]
    async fn malformed_url_is_a_fetch_error() {
        let fetcher = PageFetcher::new(&test_config(5)).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
