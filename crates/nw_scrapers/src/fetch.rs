use std::time::Duration;

use async_trait::async_trait;
use nw_core::{Error, Fetcher, Result};
use reqwest::Client;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.102 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Single-attempt GET with a browser-like user agent and a hard timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// One canned response per connection; yields the raw requests received.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                let response = format!(
                    "HTTP/1.1 {} Test\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            requests
        });
        (base, handle)
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (base, server) = serve(vec![(503, "busy"), (200, "<html>listing</html>")]).await;
        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let url = format!("{}/category/canada", base);

        match fetcher.fetch(&url).await {
            Err(Error::HttpStatus { url: failed, status }) => {
                assert_eq!(status, 503);
                assert_eq!(failed, url);
            }
            other => panic!("expected an HTTP status error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "<html>listing</html>");

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /category/canada HTTP/1.1"));
        for request in &requests {
            let request = request.to_lowercase();
            assert!(request.contains("user-agent: mozilla/5.0"), "{}", request);
            assert!(request.contains("chrome/85.0.4183.102"));
        }
    }

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(HttpFetcher::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let fetcher = HttpFetcher::new(FetchConfig {
            timeout: Duration::from_secs(2),
            ..FetchConfig::default()
        })
        .unwrap();
        assert!(fetcher.fetch("http://127.0.0.1:9/").await.is_err());
    }
}
