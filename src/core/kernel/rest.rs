use crate::core::config::ConfigError;
use crate::core::errors::ExchangeError;
use crate::core::kernel::request::{Request, RequestOption, SecurityLevel};
use crate::core::kernel::signer::Signer;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Proxy, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};

/// Header carrying the API key on authenticated endpoints.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// REST client trait for making HTTP requests
///
/// Implementations take ownership of the request, so every call needs a
/// freshly built [`Request`].
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Authenticate, send and classify one request
    async fn call(
        &self,
        request: Request,
        options: &[RequestOption],
    ) -> Result<RawResponse, ExchangeError>;
}

/// Successful response: status below 400, body not yet decoded
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Header value as text, `None` when absent or not valid ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ExchangeError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// Fully authenticated call, ready to be sent.
///
/// Rebuilt for every dispatch because the timestamp changes.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Receive window applied when a request does not carry its own
    pub recv_window: i64,
    /// Initial clock correction in milliseconds
    pub time_offset: i64,
    pub proxy_url: Option<String>,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "papix/0.1".to_string(),
            recv_window: 0,
            time_offset: 0,
            proxy_url: None,
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_recv_window(mut self, recv_window: i64) -> Self {
        self.recv_window = recv_window;
        self
    }

    pub fn with_time_offset(mut self, time_offset: i64) -> Self {
        self.time_offset = time_offset;
        self
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent);

        if let Some(proxy_url) = &self.config.proxy_url {
            let proxy = Proxy::all(proxy_url.as_str()).map_err(|e| {
                ConfigError::InvalidConfiguration(format!("invalid proxy URL: {}", e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(ReqwestRest {
            client,
            time_offset: Arc::new(AtomicI64::new(self.config.time_offset)),
            config: self.config,
            signer: self.signer,
        })
    }
}

/// Implementation of `RestClient` using reqwest
///
/// Cheap to clone; clones share the connection pool and the clock offset.
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    time_offset: Arc<AtomicI64>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .field("time_offset", &self.time_offset())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Milliseconds subtracted from the local clock for `timestamp`
    pub fn time_offset(&self) -> i64 {
        self.time_offset.load(Ordering::Relaxed)
    }

    /// Correct for drift against the exchange clock (`local - server`)
    pub fn set_time_offset(&self, offset_ms: i64) {
        self.time_offset.store(offset_ms, Ordering::Relaxed);
    }

    fn timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp_millis() - self.time_offset()
    }

    /// Turn a request into the exact method, URL, headers and body to send.
    pub fn prepare(
        &self,
        mut request: Request,
        options: &[RequestOption],
    ) -> Result<SignedEnvelope, ExchangeError> {
        for option in options {
            option.apply(&mut request);
        }
        request.validate()?;

        let recv_window = if request.recv_window() > 0 {
            request.recv_window()
        } else {
            self.config.recv_window
        };
        if recv_window > 0 {
            request.set_param("recvWindow", recv_window);
        }

        let security = request.security();
        if security == SecurityLevel::Signed {
            let timestamp = self.timestamp();
            request.set_param("timestamp", timestamp);
        }

        let mut query_string = encode_params(request.query())?;
        let body = encode_params(request.form())?;

        let mut headers = request.headers().clone();
        if !body.is_empty() {
            headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());
        }

        if security.requires_api_key() {
            let signer = self.signer.as_ref().ok_or_else(|| {
                ExchangeError::AuthError(format!(
                    "{} requires credentials but no signer is configured",
                    request.endpoint()
                ))
            })?;
            headers.insert(API_KEY_HEADER.to_string(), signer.api_key().to_string());

            if security == SecurityLevel::Signed {
                let signature = signer.sign(&query_string, &body)?;
                if !query_string.is_empty() {
                    query_string.push('&');
                }
                query_string.push_str("signature=");
                query_string.push_str(&signature);
            }
        }

        let mut url = format!("{}{}", self.config.base_url, request.endpoint());
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        Ok(SignedEnvelope {
            method: request.method().clone(),
            url,
            headers,
            body,
        })
    }

    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<RawResponse, ExchangeError> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        trace!("Response body: {}", String::from_utf8_lossy(&body));

        if status >= 400 {
            return Err(parse_error_response(status, &body));
        }
        Ok(RawResponse::new(status, headers, body))
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, request, options), fields(exchange = %self.config.exchange_name, method = %request.method(), endpoint = %request.endpoint()))]
    async fn call(
        &self,
        request: Request,
        options: &[RequestOption],
    ) -> Result<RawResponse, ExchangeError> {
        let envelope = self.prepare(request, options)?;
        trace!(url = %envelope.url, body = %envelope.body, "sending request");

        let mut builder = self.client.request(envelope.method, &envelope.url);
        for (name, value) in &envelope.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !envelope.body.is_empty() {
            builder = builder.body(envelope.body);
        }

        let response = builder.send().await?;
        self.handle_response(response).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    code: i64,
    msg: String,
}

/// Classify a rejected response body.
///
/// A body that is not `{"code","msg"}` still yields an API error, carrying the
/// HTTP status as code and the raw body as message.
pub fn parse_error_response(status: u16, body: &[u8]) -> ExchangeError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error) => ExchangeError::ApiError {
            code: error.code,
            message: error.msg,
        },
        Err(e) => {
            debug!(status, error = %e, "Failed to parse error response body");
            ExchangeError::ApiError {
                code: i64::from(status),
                message: String::from_utf8_lossy(body).into_owned(),
            }
        }
    }
}

fn encode_params(params: &BTreeMap<String, String>) -> Result<String, ExchangeError> {
    serde_urlencoded::to_string(params).map_err(|e| {
        ExchangeError::InvalidParameters(format!("Failed to encode parameters: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::signer::HmacSigner;

    #[test]
    fn test_proxy_url_is_validated_at_build() {
        let config = RestClientConfig::new("https://papi.test".to_string(), "test".to_string())
            .with_proxy(Some("ftp://proxy.test:21".to_string()));
        let err = RestClientBuilder::new(config).build().unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::ConfigError(ConfigError::InvalidConfiguration(_))
        ));

        let config = RestClientConfig::new("https://papi.test".to_string(), "test".to_string())
            .with_proxy(Some("http://127.0.0.1:3128".to_string()));
        assert!(RestClientBuilder::new(config).build().is_ok());
    }

    fn client(signer: bool) -> ReqwestRest {
        let mut builder = RestClientBuilder::new(RestClientConfig::new(
            "https://papi.test".to_string(),
            "test".to_string(),
        ));
        if signer {
            builder = builder.with_signer(Arc::new(HmacSigner::new(
                "key".to_string(),
                "secret".to_string(),
            )));
        }
        builder.build().unwrap()
    }

    fn query_of(url: &str) -> Vec<(String, String)> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn test_signed_request_carries_timestamp_and_trailing_signature() {
        let rest = client(true);
        let mut request = Request::post("/papi/v1/um/order", SecurityLevel::Signed);
        request.set_param("symbol", "BTCUSDT");
        request.set_form_param("quantity", "1");

        let envelope = rest.prepare(request, &[]).unwrap();
        let query = query_of(&envelope.url);

        assert!(query.iter().any(|(k, _)| k == "timestamp"));
        assert_eq!(query.last().map(|(k, _)| k.as_str()), Some("signature"));
        assert_eq!(envelope.body, "quantity=1");
        assert!(!envelope.body.contains("signature"));
        assert_eq!(
            envelope.headers.get("Content-Type").map(String::as_str),
            Some(FORM_CONTENT_TYPE)
        );
        assert_eq!(envelope.headers.get(API_KEY_HEADER).map(String::as_str), Some("key"));

        let (_, full_query) = envelope.url.split_once('?').unwrap();
        let (unsigned, signature) = full_query.rsplit_once("&signature=").unwrap();
        let expected = HmacSigner::new("key".to_string(), "secret".to_string())
            .sign(unsigned, &envelope.body)
            .unwrap();
        assert_eq!(signature, expected);
    }

    #[test]
    fn test_recv_window_only_when_positive() {
        let rest = client(true);
        let request = Request::get("/papi/v1/account", SecurityLevel::Signed);
        let envelope = rest.prepare(request, &[]).unwrap();
        assert!(!envelope.url.contains("recvWindow"));

        let request = Request::get("/papi/v1/account", SecurityLevel::Signed);
        let envelope = rest
            .prepare(request, &[RequestOption::recv_window(-5)])
            .unwrap();
        assert!(!envelope.url.contains("recvWindow"));

        let request = Request::get("/papi/v1/account", SecurityLevel::Signed);
        let envelope = rest
            .prepare(request, &[RequestOption::recv_window(5000)])
            .unwrap();
        let query = query_of(&envelope.url);
        assert!(query.contains(&("recvWindow".to_string(), "5000".to_string())));
    }

    #[test]
    fn test_time_offset_shifts_timestamp() {
        let rest = client(true);
        rest.set_time_offset(3_600_000);
        let before = chrono::Utc::now().timestamp_millis();

        let envelope = rest
            .prepare(Request::get("/papi/v1/account", SecurityLevel::Signed), &[])
            .unwrap();
        let timestamp: i64 = query_of(&envelope.url)
            .into_iter()
            .find(|(k, _)| k == "timestamp")
            .map(|(_, v)| v.parse().unwrap())
            .unwrap();

        assert!(timestamp <= before - 3_600_000 + 1_000);
        assert!(timestamp >= before - 3_600_000 - 1_000);
    }

    #[test]
    fn test_api_key_security_sends_header_without_signature() {
        let rest = client(true);
        let envelope = rest
            .prepare(Request::post("/papi/v1/listenKey", SecurityLevel::ApiKey), &[])
            .unwrap();

        assert_eq!(envelope.url, "https://papi.test/papi/v1/listenKey");
        assert_eq!(envelope.headers.get(API_KEY_HEADER).map(String::as_str), Some("key"));
        assert!(envelope.body.is_empty());
        assert!(!envelope.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_public_request_has_no_credentials() {
        let rest = client(false);
        let mut request = Request::get("/papi/v1/ping", SecurityLevel::None);
        request.set_param("b", "2").set_param("a", "1");

        let envelope = rest.prepare(request, &[]).unwrap();
        assert_eq!(envelope.url, "https://papi.test/papi/v1/ping?a=1&b=2");
        assert!(envelope.headers.is_empty());
    }

    #[test]
    fn test_signed_request_without_signer_fails() {
        let rest = client(false);
        let err = rest
            .prepare(Request::get("/papi/v1/account", SecurityLevel::Signed), &[])
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthError(_)));
    }

    #[test]
    fn test_options_run_before_validation() {
        let rest = client(true);
        let mut request = Request::post("/papi/v1/um/order", SecurityLevel::Signed);
        request.set_form_param("symbol", "BTCUSDT");
        let collide = RequestOption::new(|r| {
            r.set_param("symbol", "ETHUSDT");
        });

        assert!(matches!(
            rest.prepare(request, &[collide]),
            Err(ExchangeError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_parse_error_response_variants() {
        let err = parse_error_response(
            400,
            br#"{"code":-1021,"msg":"Timestamp outside recvWindow"}"#,
        );
        assert!(matches!(
            err,
            ExchangeError::ApiError { code: -1021, ref message } if message == "Timestamp outside recvWindow"
        ));

        let err = parse_error_response(502, b"<html>Bad Gateway</html>");
        assert!(matches!(
            err,
            ExchangeError::ApiError { code: 502, ref message } if message.contains("Bad Gateway")
        ));
    }

    #[test]
    fn test_raw_response_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-mbx-order-count-10s", "3".parse().unwrap());
        let response = RawResponse::new(200, headers, b"{\"listenKey\":\"abc\"}".to_vec());

        assert_eq!(response.header("X-Mbx-Order-Count-10s"), Some("3"));
        assert!(!response.is_empty());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["listenKey"], "abc");

        assert!(RawResponse::new(200, HeaderMap::new(), Vec::new()).is_empty());
    }
}
