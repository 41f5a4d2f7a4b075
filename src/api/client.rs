//! HTTP transport for the dashboard API. The client owns the bearer token for
//! the current session and attaches it to every request; it never persists the
//! token and never touches session state. Bodies are parsed as JSON regardless
//! of the status code so error payloads can be normalized into [`ErrorBody`].

use super::errors::{ApiError, ErrorBody};
use crate::APP_USER_AGENT;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    sync::{PoisonError, RwLock},
    time::Duration,
};
use tracing::{debug, info_span, Instrument};
use url::Url;

/// JSON client bound to one API base URL.
#[derive(Debug)]
pub struct HttpClient {
    base_url: String,
    http: Client,
    token: RwLock<Option<SecretString>>,
}

impl HttpClient {
    /// Builds a client for an absolute `http`/`https` base URL.
    ///
    /// `timeout` is applied to every request when set; otherwise the transport
    /// defaults apply.
    ///
    /// # Errors
    /// Returns `Config` if the base URL is not absolute http(s) or the underlying
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ApiError::Config(format!("Invalid API base URL {base_url}: {err}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "Unsupported API base URL scheme: {}",
                parsed.scheme()
            )));
        }

        let mut builder = Client::builder().user_agent(APP_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            http,
            token: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replaces the bearer token used for subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token);
    }

    pub fn clear_token(&self) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }

    /// Sends a request and decodes the JSON response into `T`.
    ///
    /// # Errors
    /// - `Transport`/`Timeout` when no response was received.
    /// - `Http` for any status outside 200-299, carrying the normalized body.
    /// - `Malformed` for a success status whose body is not JSON or not a `T`.
    /// - `Serialization` when `body` cannot be encoded.
    pub async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        extra_headers: &[(String, String)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;

        let (status, value) = self.send_raw(method, path, payload, extra_headers).await?;

        serde_json::from_value::<T>(value.clone()).map_err(|err| ApiError::Malformed {
            status,
            body: ErrorBody::unexpected_shape(value, &err),
        })
    }

    /// GET `path` and decode the response.
    ///
    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::GET, path, None, &[]).await
    }

    /// GET `path` and return the status with the undecoded JSON body, for
    /// callers that inspect the shape themselves.
    ///
    /// # Errors
    /// See [`HttpClient::send`]; shape errors are left to the caller.
    pub async fn get_value(&self, path: &str) -> Result<(u16, Value), ApiError> {
        self.send_raw(Method::GET, path, None, &[]).await
    }

    /// POST a JSON body to `path` and decode the response.
    ///
    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body), &[]).await
    }

    /// POST without a body.
    ///
    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::POST, path, None, &[]).await
    }

    /// PUT a JSON body to `path` and decode the response.
    ///
    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, Some(body), &[]).await
    }

    /// DELETE `path` and decode the response.
    ///
    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::DELETE, path, None, &[]).await
    }

    async fn send_raw(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        extra_headers: &[(String, String)],
    ) -> Result<(u16, Value), ApiError> {
        let url = build_url_with_base(&self.base_url, path);
        let headers = self.headers(extra_headers)?;

        debug!("{} {}", method, url);

        let span = info_span!("api.request", http.method = %method, url = %url);

        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_request_error)?;
        let parsed = parse_body(&text);

        if !status.is_success() {
            let body = parsed.map_or_else(|| ErrorBody::malformed(&text), ErrorBody::from_json);
            debug!("{} responded {}: {}", url, status, body.message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parsed.map(|value| (status.as_u16(), value)).ok_or_else(|| ApiError::Malformed {
            status: status.as_u16(),
            body: ErrorBody::malformed(&text),
        })
    }

    fn headers(&self, extra_headers: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        {
            let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(token) = guard.as_ref().filter(|t| !t.expose_secret().is_empty()) {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|_| ApiError::Config("Token contains invalid characters.".to_string()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        for (name, value) in extra_headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ApiError::Config(format!("Invalid header name {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| ApiError::Config(format!("Invalid header value: {err}")))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Empty bodies read as `null`; `None` means the body was not JSON.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return Some(Value::Null);
    }
    serde_json::from_str(text).ok()
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        ApiError::Transport(format!("Unable to reach the server: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> Result<HttpClient, ApiError> {
        HttpClient::new(&format!("{}/api", server.uri()), None)
    }

    #[test]
    fn build_url_joins_with_single_slash() {
        assert_eq!(
            build_url_with_base("http://localhost:8080/api/", "/users"),
            "http://localhost:8080/api/users"
        );
        assert_eq!(
            build_url_with_base("http://localhost:8080/api", "users?limit=1"),
            "http://localhost:8080/api/users?limit=1"
        );
        assert_eq!(build_url_with_base("", "/health"), "/health");
    }

    #[test]
    fn parse_body_treats_empty_as_null() {
        assert_eq!(parse_body(""), Some(Value::Null));
        assert_eq!(parse_body("  \n"), Some(Value::Null));
        assert_eq!(parse_body("{\"a\":1}"), Some(json!({"a": 1})));
        assert_eq!(parse_body("<html>oops</html>"), None);
    }

    #[test]
    fn new_rejects_relative_and_unsupported_urls() {
        assert!(matches!(
            HttpClient::new("/api", None),
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            HttpClient::new("ftp://example.com/api", None),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn token_lifecycle() -> Result<(), ApiError> {
        let client = HttpClient::new("http://localhost:8080/api", None)?;
        assert!(!client.has_token());
        client.set_token(SecretString::from("T1".to_string()));
        assert!(client.has_token());
        client.set_token(SecretString::from(String::new()));
        assert!(!client.has_token());
        client.set_token(SecretString::from("T2".to_string()));
        client.clear_token();
        assert!(!client.has_token());
        Ok(())
    }

    #[tokio::test]
    async fn send_attaches_json_and_bearer_headers() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/echo"))
            .and(header("Content-Type", "application/json"))
            .and(header("Authorization", "Bearer T1"))
            .and(header("X-Request-Id", "abc"))
            .and(body_json(json!({"hello": "world"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": 1})))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client.set_token(SecretString::from("T1".to_string()));

        let value: Value = client
            .send(
                Method::POST,
                "/echo",
                Some(&json!({"hello": "world"})),
                &[("X-Request-Id".to_string(), "abc".to_string())],
            )
            .await?;
        assert_eq!(value, json!({"data": 1}));
        Ok(())
    }

    #[tokio::test]
    async fn send_omits_authorization_without_token() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "UP"})))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let _: Value = client.get("/health").await?;

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert!(requests
            .first()
            .is_some_and(|request| !request.headers.contains_key("authorization")));
        Ok(())
    }

    #[tokio::test]
    async fn send_normalizes_application_errors() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "user not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let err = client.get::<Value>("/users/9").await.err();

        match err {
            Some(ApiError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body.message, "user not found");
                assert_eq!(body.raw, json!({"message": "user not found"}));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn send_substitutes_fallback_for_non_json_error_body() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let err = client.get::<Value>("/users").await.err();

        match err {
            Some(ApiError::Http { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, ErrorBody::malformed("<html>Bad Gateway</html>"));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn send_fails_on_malformed_success_body() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/count"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let err = client.get::<Value>("/users/count").await.err();

        assert!(matches!(err, Some(ApiError::Malformed { status: 200, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn send_fails_on_unexpected_shape() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "many"})))
            .mount(&server)
            .await;

        #[derive(Debug, serde::Deserialize)]
        struct Count {
            #[allow(dead_code)]
            data: u64,
        }

        let client = client_for(&server)?;
        let err = client.get::<Count>("/users/count").await.err();

        match err {
            Some(ApiError::Malformed { status, body }) => {
                assert_eq!(status, 200);
                assert!(body.message.starts_with("Failed to decode response"));
            }
            other => panic!("expected Malformed error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn send_accepts_empty_success_body() -> Result<(), ApiError> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/users/5"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let value: Value = client.delete("/users/5").await?;
        assert_eq!(value, Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn send_reports_transport_failure() -> Result<(), ApiError> {
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr().map(|addr| addr.port()).unwrap_or(9),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };

        let client = HttpClient::new(&format!("http://127.0.0.1:{port}/api"), None)?;
        let err = client.get::<Value>("/health").await.err();

        assert!(matches!(err, Some(ApiError::Transport(_))));
        assert_eq!(err.and_then(|e| e.status()), None);
        Ok(())
    }
}
