use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{v5_base_url, Config};
use crate::error::{HtbError, Result};

const USER_AGENT: &str = concat!("htbcli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V4,
    V5,
}

/// One HTTP call against the API, built fresh for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Appended after `path`, each percent-encoded as one segment.
    pub segments: Vec<String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub requires_auth: bool,
    pub version: ApiVersion,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: BTreeMap::new(),
            body: None,
            requires_auth: true,
            version: ApiVersion::V4,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// User-typed text such as a slug. `/`, `?` and `#` stay inside it.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn v5(mut self) -> Self {
        self.version = ApiVersion::V5;
        self
    }

    /// Fetch without the bearer token, e.g. a pre-signed download link.
    pub fn anonymous(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    fn is_absolute(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub raw: String,
    pub body: Value,
}

impl ApiResponse {
    fn from_raw(status: u16, raw: String) -> Self {
        let body = if raw.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&raw).unwrap_or_else(|_| Value::String(raw.clone()))
        };
        Self { status, raw, body }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.body)?)
    }

    /// Status line plus the body exactly as the server sent it.
    pub fn raw_exchange(&self) -> String {
        format!("HTTP {}\n{}", self.status, self.raw)
    }

    /// Server-provided `message` (or `error`) text, if any.
    pub fn message(&self) -> Option<String> {
        server_message(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub status: u16,
    pub bytes: Vec<u8>,
}

pub fn server_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}

pub struct HtbClient {
    base_url: String,
    v5_base_url: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl HtbClient {
    pub fn new(base_url: &str, token: &str, timeout_secs: f64) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(timeout_secs).map_err(|_| {
            HtbError::InvalidConfig(format!("timeout out of range: {timeout_secs}s"))
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            v5_base_url: v5_base_url(&base_url),
            base_url,
            token: token.to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, &config.api_token, config.timeout_seconds)
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let raw = if request.is_absolute() {
            request.path.clone()
        } else {
            let base = match request.version {
                ApiVersion::V4 => &self.base_url,
                ApiVersion::V5 => &self.v5_base_url,
            };
            format!("{base}{}", request.path)
        };
        let mut url = Url::parse(&raw)
            .map_err(|e| HtbError::InvalidConfig(format!("invalid API URL {raw:?}: {e}")))?;
        if !request.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| HtbError::InvalidConfig(format!("cannot append to {raw:?}")))?
                .extend(&request.segments);
        }
        Ok(url)
    }

    fn send(&self, request: &ApiRequest) -> Result<reqwest::blocking::Response> {
        if request.requires_auth && self.token.trim().is_empty() {
            return Err(HtbError::MissingToken);
        }

        let url = self.url_for(request)?;
        log::debug!("{} {url}", request.method);

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .header("Accept", "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.requires_auth {
            builder = builder.bearer_auth(&self.token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // Sent once. Writes such as flag submission must never be replayed.
        let resp = builder.send()?;
        log::debug!("{} {url} -> {}", request.method, resp.status());
        Ok(resp)
    }

    pub fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let resp = self.send(request)?;
        let status = resp.status();
        let raw = resp.text()?;
        let response = ApiResponse::from_raw(status.as_u16(), raw);
        if status.is_success() {
            Ok(response)
        } else {
            Err(HtbError::Http {
                status: response.status,
                message: response.message(),
                body: response.raw,
            })
        }
    }

    pub fn download(&self, request: &ApiRequest) -> Result<Download> {
        let resp = self.send(request)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text()?;
            let message = server_message(&ApiResponse::from_raw(status.as_u16(), body.clone()).body);
            return Err(HtbError::Http {
                status: status.as_u16(),
                message,
                body,
            });
        }
        let bytes = resp.bytes()?.to_vec();
        Ok(Download {
            status: status.as_u16(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> HtbClient {
        HtbClient::new(&server.url(), "tok", 5.0).unwrap()
    }

    #[test]
    fn execute_attaches_bearer_and_parses_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/user/info")
            .match_header("Authorization", "Bearer tok")
            .with_header("content-type", "application/json")
            .with_body(r#"{"info":{"id":7,"name":"neo"}}"#)
            .create();

        let resp = client_for(&server)
            .execute(&ApiRequest::get("/user/info"))
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["info"]["name"], "neo");
        mock.assert();
    }

    #[test]
    fn execute_sends_query_and_json_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/vm/spawn")
            .match_query(Matcher::UrlEncoded("tag".into(), "x".into()))
            .match_body(Matcher::Json(json!({"machine_id": 5})))
            .with_body(r#"{"message":"ok"}"#)
            .create();

        let request = ApiRequest::post("/vm/spawn")
            .param("tag", "x")
            .json(json!({"machine_id": 5}));
        client_for(&server).execute(&request).unwrap();
        mock.assert();
    }

    #[test]
    fn http_error_preserves_server_message() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/machine/own")
            .with_status(400)
            .with_body(r#"{"message":"Invalid flag."}"#)
            .expect(1)
            .create();

        let err = client_for(&server)
            .execute(&ApiRequest::post("/machine/own"))
            .unwrap_err();
        match err {
            HtbError::Http {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Invalid flag."));
                assert_eq!(body, r#"{"message":"Invalid flag."}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert();
    }

    #[test]
    fn server_error_is_not_retried() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/vm/reset")
            .with_status(500)
            .with_body("oops")
            .expect(1)
            .create();

        let err = client_for(&server)
            .execute(&ApiRequest::post("/vm/reset"))
            .unwrap_err();
        assert!(matches!(err, HtbError::Http { status: 500, message: None, .. }));
        mock.assert();
    }

    #[test]
    fn empty_token_fails_before_any_call() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let client = HtbClient::new(&server.url(), "", 5.0).unwrap();
        let err = client.execute(&ApiRequest::get("/user/info")).unwrap_err();
        assert!(matches!(err, HtbError::MissingToken));
        mock.assert();
    }

    #[test]
    fn connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HtbClient::new(&format!("http://{addr}"), "tok", 2.0).unwrap();
        let err = client.execute(&ApiRequest::get("/user/info")).unwrap_err();
        assert!(matches!(err, HtbError::Network(_)));
    }

    #[test]
    fn base_url_trailing_slash_stripped() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/machine/active").with_body("{}").create();

        let client = HtbClient::new(&format!("{}/", server.url()), "tok", 5.0).unwrap();
        client.execute(&ApiRequest::get("/machine/active")).unwrap();
        mock.assert();
    }

    #[test]
    fn v5_requests_use_derived_base() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v5/machine/own")
            .with_body(r#"{"message":"ok"}"#)
            .create();

        let client = HtbClient::new(&format!("{}/api/v4", server.url()), "tok", 5.0).unwrap();
        client
            .execute(&ApiRequest::post("/machine/own").v5())
            .unwrap();
        mock.assert();
    }

    #[test]
    fn anonymous_absolute_url_skips_auth() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/files/archive.zip")
            .match_header("Authorization", Matcher::Missing)
            .with_body("PK\x03\x04")
            .create();

        let client = HtbClient::new("https://unused.invalid/api/v4", "tok", 5.0).unwrap();
        let url = format!("{}/files/archive.zip", server.url());
        let download = client
            .download(&ApiRequest::get(url).anonymous())
            .unwrap();
        assert_eq!(download.bytes, b"PK\x03\x04");
        mock.assert();
    }

    #[test]
    fn segments_are_percent_encoded() {
        let mut server = mockito::Server::new();
        let wrong = server
            .mock("GET", "/machine/profile/what")
            .match_query(Matcher::Any)
            .expect(0)
            .create();
        let right = server
            .mock("GET", "/machine/profile/what%3Fx%2Fy%23z")
            .with_body("{}")
            .create();

        let request = ApiRequest::get("/machine/profile").segment("what?x/y#z");
        client_for(&server).execute(&request).unwrap();
        right.assert();
        wrong.assert();
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let client = HtbClient::new("not a url", "tok", 5.0).unwrap();
        let err = client.execute(&ApiRequest::get("/user/info")).unwrap_err();
        assert!(matches!(err, HtbError::InvalidConfig(_)));
    }

    #[test]
    fn out_of_range_timeout_is_config_error() {
        for secs in [1e300, f64::INFINITY, -1.0] {
            let result = HtbClient::new("http://127.0.0.1:1", "tok", secs);
            assert!(matches!(result, Err(HtbError::InvalidConfig(_))), "{secs}");
        }
    }

    #[test]
    fn non_json_body_kept_as_text() {
        let resp = ApiResponse::from_raw(200, "plain text".into());
        assert_eq!(resp.body, Value::String("plain text".into()));
        assert_eq!(resp.raw_exchange(), "HTTP 200\nplain text");
    }

    #[test]
    fn server_message_falls_back_to_error_field() {
        assert_eq!(
            server_message(&json!({"error": "Machine already owned"})).as_deref(),
            Some("Machine already owned")
        );
        assert!(server_message(&json!({"message": 3})).is_none());
    }
}
