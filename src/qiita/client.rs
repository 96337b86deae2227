// src/qiita/client.rs
// =============================================================================
// Builds and sends authenticated requests against the Qiita API.
//
// What this file does:
// - Validates the base URL once, when the client is created
// - Joins relative paths onto the base path ("/api/v2" + "/tags")
// - Attaches `Content-Type: application/json` and `Authorization: Bearer ...`
// - Sends a request / reads a body while watching a CancellationToken
//
// Building a request has no side effects; only `send` and `json` touch the
// network.
// =============================================================================

use crate::config::Config;
use crate::error::{Error, Result};
use log::debug;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::tags::TagQuery;

const USER_AGENT: &str = concat!("qiita-tag-export/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper around a reqwest client that knows the API root and token.
pub struct QiitaClient {
    http: Client,
    base_url: Url,
    // Marked sensitive so reqwest never prints it
    auth: HeaderValue,
}

impl QiitaClient {
    // Creates a client from the run configuration
    //
    // Fails with Error::Configuration if:
    //   - the base URL is not an absolute http(s) URL
    //   - the token is empty or not a valid header value
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let auth = bearer_header(&config.token)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Base URL with `path` appended to its path, e.g.
    //   https://qiita.com/api/v2 + /tags -> https://qiita.com/api/v2/tags
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            self.base_url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&collapse_slashes(&joined));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    // Builds (but does not send) a GET request for `path` with `query` encoded
    // into the query string
    pub fn get<Q>(&self, path: &str, query: &Q) -> Result<Request>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        self.http
            .get(url.clone())
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.auth.clone())
            .build()
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Request for one page of `GET /tags`.
    pub fn tags_request(&self, query: &TagQuery) -> Result<Request> {
        self.get("/tags", &query.to_pairs()[..])
    }

    // Sends a request unless (or until) the token is cancelled
    pub async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response> {
        let url = request.url().to_string();
        if cancel.is_cancelled() {
            return Err(Error::Cancelled { url });
        }

        debug!("GET {}", url);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.http.execute(request) => Some(result),
        };

        match outcome {
            None => Err(Error::Cancelled { url }),
            Some(Ok(response)) => Ok(response),
            Some(Err(source)) => Err(Error::Transport { url, source }),
        }
    }

    // Reads the whole body and decodes it as JSON
    //
    // A failure while reading is a transport error; a body that reads fine
    // but isn't the expected JSON is a decode error.
    pub async fn json<T>(&self, response: Response, cancel: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = response.url().to_string();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = response.bytes() => Some(result),
        };

        let body = match outcome {
            None => return Err(Error::Cancelled { url }),
            Some(Ok(body)) => body,
            Some(Err(source)) => return Err(Error::Transport { url, source }),
        };

        serde_json::from_slice(&body).map_err(|source| Error::Decode { url, source })
    }
}

// Accepts only absolute http(s) URLs with a host
fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("failed to parse url {}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Configuration(format!(
            "unsupported scheme '{}' in url {}",
            url.scheme(),
            raw
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::Configuration(format!("url has no host: {}", raw)));
    }

    Ok(url)
}

fn bearer_header(token: &str) -> Result<HeaderValue> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Configuration("access token is empty".to_string()));
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        Error::Configuration("access token contains characters not allowed in a header".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

// "/api//v2///tags" -> "/api/v2/tags"
fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qiita::Sort;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str) -> QiitaClient {
        let mut config = Config::new("test-token");
        config.base_url = base_url.to_string();
        QiitaClient::new(&config).unwrap()
    }

    #[test]
    fn test_tags_request_shape() {
        let client = client_for("https://qiita.com/api/v2");
        let request = client
            .tags_request(&TagQuery::new(1, 100, Sort::Count))
            .unwrap();

        assert_eq!(request.method(), &reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://qiita.com/api/v2/tags?page=1&per_page=100&sort=count"
        );
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let auth = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(auth, "Bearer test-token");
        assert!(auth.is_sensitive());
    }

    #[test]
    fn test_endpoint_has_no_duplicate_separators() {
        let client = client_for("https://qiita.com/api/v2/");
        assert_eq!(
            client.endpoint("/tags").as_str(),
            "https://qiita.com/api/v2/tags"
        );
        assert_eq!(
            client.endpoint("tags").as_str(),
            "https://qiita.com/api/v2/tags"
        );
        assert_eq!(
            client.endpoint("//tags//").as_str(),
            "https://qiita.com/api/v2/tags/"
        );

        let root = client_for("http://localhost:8080");
        assert_eq!(root.endpoint("/tags").as_str(), "http://localhost:8080/tags");
    }

    #[test]
    fn test_invalid_base_url() {
        for raw in ["not a url", "/api/v2", "mailto:someone@example.com", "ftp://example.com/api"] {
            let mut config = Config::new("test-token");
            config.base_url = raw.to_string();
            let result = QiitaClient::new(&config);
            assert!(
                matches!(result, Err(Error::Configuration(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_invalid_token() {
        for token in ["", "   ", "line\nbreak"] {
            let result = QiitaClient::new(&Config::new(token));
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
    }

    #[tokio::test]
    async fn test_send_attaches_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/tags"))
            .and(query_param("page", "3"))
            .and(query_param("per_page", "20"))
            .and(query_param("sort", "name"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&format!("{}/api/v2", mock_server.uri()));
        let request = client
            .tags_request(&TagQuery::new(3, 20, Sort::Name))
            .unwrap();
        let cancel = CancellationToken::new();

        let response = client.send(request, &cancel).await.unwrap();
        assert_eq!(response.status(), 200);

        let tags: Vec<crate::qiita::Tag> = client.json(response, &cancel).await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_send_after_cancel_does_not_hit_server() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = client
            .tags_request(&TagQuery::new(1, 100, Sort::Count))
            .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client.send(request, &cancel).await;
        assert!(matches!(result, Err(Error::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_json_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server.uri());
        let request = client
            .tags_request(&TagQuery::new(1, 100, Sort::Count))
            .unwrap();
        let cancel = CancellationToken::new();

        let response = client.send(request, &cancel).await.unwrap();
        let result: Result<Vec<crate::qiita::Tag>> = client.json(response, &cancel).await;
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[tokio::test]
    async fn test_cancel_while_reading_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Sends the headers and the first byte of the body, then stalls
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n[",
                )
                .await
                .unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        });

        let client = client_for(&format!("http://{}", addr));
        let request = client
            .tags_request(&TagQuery::new(1, 100, Sort::Count))
            .unwrap();
        let cancel = CancellationToken::new();

        let response = client.send(request, &cancel).await.unwrap();
        assert_eq!(response.status(), 200);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result: Result<Vec<crate::qiita::Tag>> = client.json(response, &cancel).await;
        assert!(matches!(result, Err(Error::Cancelled { .. })));
    }
}
