use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use nw_core::{Article, ArticleSink, Error, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;
use url::Url;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_JWT_FILE: &str = "jwt.txt";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const REQUEST_TIMEOUT_SECS: u64 = 10;

pub const ENV_SPREADSHEET_ID: &str = "SPREADSHEET_ID";
pub const ENV_SHEET_NAME: &str = "SPREADSHEET_SHEET_NAME";
pub const ENV_CELL_RANGE: &str = "SPREADSHEET_CELL_RANGE";
pub const ENV_ACCESS_TOKEN: &str = "SHEETS_ACCESS_TOKEN";
pub const ENV_JWT_FILE: &str = "SHEETS_JWT_FILE";

/// How the bearer token for the append call is obtained.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Used as-is.
    AccessToken(String),
    /// Signed JWT exchanged at the OAuth token endpoint before appending.
    JwtAssertion(String),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::AccessToken(_) => write!(f, "AccessToken(<redacted>)"),
            TokenSource::JwtAssertion(_) => write!(f, "JwtAssertion(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub cell_range: String,
    pub token: TokenSource,
    pub api_base: String,
    pub token_uri: String,
    pub timeout: Duration,
}

impl SheetsConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves every setting up front, including reading the JWT file, so a
    /// misconfiguration fails before any request is made.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let spreadsheet_id = get(ENV_SPREADSHEET_ID);
        let sheet_name = get(ENV_SHEET_NAME);
        let cell_range = get(ENV_CELL_RANGE);

        let (Some(spreadsheet_id), Some(sheet_name), Some(cell_range)) =
            (spreadsheet_id, sheet_name, cell_range)
        else {
            return Err(Error::Config(format!(
                "missing one or more required env variables: {}, {}, {}",
                ENV_SHEET_NAME, ENV_CELL_RANGE, ENV_SPREADSHEET_ID
            )));
        };

        let token = match get(ENV_ACCESS_TOKEN) {
            Some(token) => TokenSource::AccessToken(token),
            None => {
                let path = get(ENV_JWT_FILE).unwrap_or_else(|| DEFAULT_JWT_FILE.to_string());
                TokenSource::JwtAssertion(read_jwt(Path::new(&path))?)
            }
        };

        Ok(Self {
            spreadsheet_id,
            sheet_name,
            cell_range,
            token,
            api_base: SHEETS_API_BASE.to_string(),
            token_uri: TOKEN_URI.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn append_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be a base URL", self.api_base)))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}!{}:append", self.sheet_name, self.cell_range));
        url.query_pairs_mut().append_pair("valueInputOption", "USER_ENTERED");
        Ok(url)
    }
}

fn read_jwt(path: &Path) -> Result<String> {
    let jwt = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read JWT from {}: {}", path.display(), e)))?;
    let jwt = jwt.trim();
    if jwt.is_empty() {
        return Err(Error::Config(format!("JWT file {} is empty", path.display())));
    }
    Ok(jwt.to_string())
}

/// Spreadsheet rows: two blank columns, then link, then title. Articles
/// without a link are left out.
pub fn rows(articles: &[Article]) -> Vec<Vec<String>> {
    articles
        .iter()
        .filter(|a| !a.link.is_empty())
        .map(|a| vec![String::new(), String::new(), a.link.clone(), a.title.clone()])
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

pub struct SheetsSink {
    client: Client,
    config: SheetsConfig,
}

impl SheetsSink {
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn access_token(&self) -> Result<String> {
        let assertion = match &self.config.token {
            TokenSource::AccessToken(token) => return Ok(token.clone()),
            TokenSource::JwtAssertion(jwt) => jwt,
        };

        info!("🔑 Exchanging JWT for an access token");
        let response = self
            .client
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Sink(format!("failed to obtain access token: {}", body)));
        }
        response
            .json::<TokenResponse>()
            .await?
            .access_token
            .ok_or_else(|| Error::Sink("access token not found in the response".to_string()))
    }
}

#[async_trait]
impl ArticleSink for SheetsSink {
    fn name(&self) -> &str {
        "google sheets"
    }

    async fn write_articles(&self, articles: &[Article]) -> Result<()> {
        let values = rows(articles);
        if values.is_empty() {
            info!("No articles found to append");
            return Ok(());
        }

        let url = self.config.append_url()?;
        let token = self.access_token().await?;

        info!("📤 Appending {} rows to Google Sheets", values.len());
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "values": values }))
            .send()
            .await?;
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Sink(format!("error appending data to Google Sheets: {}", body)));
        }

        info!("✨ Appended {} rows to Google Sheets", values.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn base_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_SPREADSHEET_ID, "sheet-123"),
            (ENV_SHEET_NAME, "Deal Flow"),
            (ENV_CELL_RANGE, "A:D"),
        ]
    }

    fn article(title: &str, link: &str) -> Article {
        let day = NaiveDate::from_ymd_opt(2025, 4, 14).unwrap();
        Article::new(title, link, day.and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_config_with_access_token() {
        let mut vars = base_vars();
        vars.push((ENV_ACCESS_TOKEN, "ya29.token"));
        let config = SheetsConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.spreadsheet_id, "sheet-123");
        assert_eq!(config.token, TokenSource::AccessToken("ya29.token".to_string()));
        assert!(!format!("{:?}", config).contains("ya29"));
    }

    #[test]
    fn test_config_reads_jwt_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  header.payload.signature  ").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let mut vars: Vec<(&str, &str)> = base_vars();
        vars.push((ENV_JWT_FILE, path.as_str()));
        let config = SheetsConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.token,
            TokenSource::JwtAssertion("header.payload.signature".to_string())
        );
    }

    #[test]
    fn test_config_missing_settings() {
        let vars = vec![(ENV_SPREADSHEET_ID, "sheet-123"), (ENV_ACCESS_TOKEN, "t")];
        assert!(matches!(
            SheetsConfig::from_lookup(lookup(&vars)),
            Err(Error::Config(_))
        ));

        let mut vars = base_vars();
        vars.push((ENV_JWT_FILE, "/nonexistent/jwt.txt"));
        assert!(matches!(
            SheetsConfig::from_lookup(lookup(&vars)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_append_url() {
        let mut vars = base_vars();
        vars.push((ENV_ACCESS_TOKEN, "t"));
        let config = SheetsConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.append_url().unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/\
             Deal%20Flow!A:D:append?valueInputOption=USER_ENTERED"
        );
    }

    #[test]
    fn test_rows() {
        let articles = vec![
            article("Acme raises", "https://betakit.com/acme/"),
            article("", ""),
            article("Beta", "https://www.finsmes.com/beta.html"),
        ];
        assert_eq!(
            rows(&articles),
            vec![
                vec!["", "", "https://betakit.com/acme/", "Acme raises"],
                vec!["", "", "https://www.finsmes.com/beta.html", "Beta"],
            ]
        );
    }

    #[tokio::test]
    async fn test_nothing_to_append_skips_the_request() {
        let mut vars = base_vars();
        vars.push((ENV_ACCESS_TOKEN, "t"));
        let mut config = SheetsConfig::from_lookup(lookup(&vars)).unwrap();
        config.api_base = "http://127.0.0.1:9/v4/spreadsheets".to_string();
        let sink = SheetsSink::new(config).unwrap();
        assert!(sink.write_articles(&[article("No link", "")]).await.is_ok());
    }

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

    /// Answers each connection with the next canned response and returns the
    /// raw requests once every response has been served.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut socket).await);
                let response = format!(
                    "HTTP/1.1 {} Test\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{}",
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

    fn local_config(base: &str, token: TokenSource) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: "sheet-123".to_string(),
            sheet_name: "Deal Flow".to_string(),
            cell_range: "A:D".to_string(),
            token,
            api_base: format!("{}/v4/spreadsheets", base),
            token_uri: format!("{}/token", base),
            timeout: Duration::from_secs(5),
        }
    }

    fn jwt() -> TokenSource {
        TokenSource::JwtAssertion("header.payload.signature".to_string())
    }

    fn body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_jwt_exchange_then_append() {
        let (base, server) =
            serve(vec![(200, r#"{"access_token":"ya29.fresh"}"#), (200, "{}")]).await;
        let sink = SheetsSink::new(local_config(&base, jwt())).unwrap();

        let articles = vec![article("Acme raises", "https://betakit.com/acme/"), article("x", "")];
        sink.write_articles(&articles).await.unwrap();

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);

        let exchange = &requests[0];
        assert!(exchange.starts_with("POST /token HTTP/1.1"));
        assert!(exchange
            .to_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
        assert!(exchange
            .contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
        assert!(exchange.contains("assertion=header.payload.signature"));

        let append = &requests[1];
        assert!(append.starts_with(
            "POST /v4/spreadsheets/sheet-123/values/Deal%20Flow!A:D:append\
             ?valueInputOption=USER_ENTERED HTTP/1.1"
        ));
        assert!(append.to_lowercase().contains("authorization: bearer ya29.fresh"));
        assert_eq!(
            body(append),
            serde_json::json!({ "values": [["", "", "https://betakit.com/acme/", "Acme raises"]] })
        );
    }

    #[tokio::test]
    async fn test_rejected_token_exchange_is_a_sink_error() {
        let (base, server) = serve(vec![(400, r#"{"error":"invalid_grant"}"#)]).await;
        let sink = SheetsSink::new(local_config(&base, jwt())).unwrap();

        let result = sink.write_articles(&[article("Acme", "https://betakit.com/acme/")]).await;
        assert!(matches!(result, Err(Error::Sink(msg)) if msg.contains("invalid_grant")));
        assert_eq!(server.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_token_response_without_access_token() {
        let (base, server) = serve(vec![(200, r#"{"token_type":"Bearer"}"#)]).await;
        let sink = SheetsSink::new(local_config(&base, jwt())).unwrap();

        let result = sink.write_articles(&[article("Acme", "https://betakit.com/acme/")]).await;
        assert!(matches!(result, Err(Error::Sink(_))));
        assert_eq!(server.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_append_is_a_sink_error() {
        let (base, server) = serve(vec![(403, r#"{"error":"PERMISSION_DENIED"}"#)]).await;
        let token = TokenSource::AccessToken("ya29.static".to_string());
        let sink = SheetsSink::new(local_config(&base, token)).unwrap();

        let result = sink.write_articles(&[article("Acme", "https://betakit.com/acme/")]).await;
        assert!(matches!(result, Err(Error::Sink(msg)) if msg.contains("PERMISSION_DENIED")));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /v4/spreadsheets/"));
        assert!(requests[0].to_lowercase().contains("authorization: bearer ya29.static"));
    }
}
