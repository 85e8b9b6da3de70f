use crate::core::errors::ExchangeError;
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Parameter mapping; ordered so the encoded form is reproducible for signing.
pub type Params = BTreeMap<String, String>;

/// Authentication required by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// Public endpoint, no credentials attached
    #[default]
    None,
    /// API key header only
    ApiKey,
    /// API key header plus `timestamp` and HMAC `signature` query parameters
    Signed,
}

impl SecurityLevel {
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::ApiKey | Self::Signed)
    }
}

/// Neutral description of a single REST call.
///
/// A request is consumed by dispatch, so each call starts from a fresh value.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    endpoint: String,
    security: SecurityLevel,
    query: Params,
    form: Params,
    headers: BTreeMap<String, String>,
    recv_window: i64,
}

impl Request {
    pub fn new(method: Method, endpoint: impl Into<String>, security: SecurityLevel) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            security,
            query: Params::new(),
            form: Params::new(),
            headers: BTreeMap::new(),
            recv_window: 0,
        }
    }

    pub fn get(endpoint: impl Into<String>, security: SecurityLevel) -> Self {
        Self::new(Method::GET, endpoint, security)
    }

    pub fn post(endpoint: impl Into<String>, security: SecurityLevel) -> Self {
        Self::new(Method::POST, endpoint, security)
    }

    pub fn put(endpoint: impl Into<String>, security: SecurityLevel) -> Self {
        Self::new(Method::PUT, endpoint, security)
    }

    pub fn delete(endpoint: impl Into<String>, security: SecurityLevel) -> Self {
        Self::new(Method::DELETE, endpoint, security)
    }

    /// Set a query parameter, replacing any previous value for `key`
    pub fn set_param(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    pub fn set_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in params {
            self.set_param(key, value);
        }
        self
    }

    /// Set a form body parameter, replacing any previous value for `key`
    pub fn set_form_param(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.form.insert(key.into(), value.to_string());
        self
    }

    pub fn set_form_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in params {
            self.set_form_param(key, value);
        }
        self
    }

    /// Insert a form parameter only when a value is present
    pub fn set_optional_form_param<V: ToString>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set_form_param(key, value);
        }
        self
    }

    /// Insert a query parameter only when a value is present
    pub fn set_optional_param<V: ToString>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set_param(key, value);
        }
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn set_recv_window(&mut self, recv_window: i64) -> &mut Self {
        self.recv_window = recv_window;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    pub fn query(&self) -> &Params {
        &self.query
    }

    pub fn form(&self) -> &Params {
        &self.form
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn recv_window(&self) -> i64 {
        self.recv_window
    }

    /// Check the request can be dispatched
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.endpoint.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "endpoint must not be empty".to_string(),
            ));
        }
        if !self.endpoint.starts_with('/') {
            return Err(ExchangeError::InvalidParameters(format!(
                "endpoint must start with '/': {}",
                self.endpoint
            )));
        }
        if self
            .endpoint
            .chars()
            .any(|c| c == '?' || c == '#' || c.is_whitespace())
        {
            return Err(ExchangeError::InvalidParameters(format!(
                "endpoint must be a bare path: {}",
                self.endpoint
            )));
        }
        if let Some(key) = self.query.keys().find(|key| self.form.contains_key(*key)) {
            return Err(ExchangeError::InvalidParameters(format!(
                "parameter '{}' set in both query and form body",
                key
            )));
        }
        Ok(())
    }
}

/// Late mutation applied to a request right before it is validated and signed.
///
/// Used for cross-cutting concerns such as custom headers or a per-call receive
/// window without touching the service that built the request.
#[derive(Clone)]
pub struct RequestOption(Arc<dyn Fn(&mut Request) + Send + Sync>);

impl RequestOption {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        Self(Arc::new(apply))
    }

    /// Override the receive window for one call
    pub fn recv_window(recv_window: i64) -> Self {
        Self::new(move |request| {
            request.set_recv_window(recv_window);
        })
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        Self::new(move |request| {
            request.set_header(name.clone(), value.clone());
        })
    }

    pub fn apply(&self, request: &mut Request) {
        (self.0)(request);
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOption").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut request = Request::get("/papi/v1/balance", SecurityLevel::Signed);
        request.set_param("asset", "BTC").set_param("asset", "USDT");
        request.set_form_param("symbol", "BTCUSDT");
        request.set_form_param("symbol", "ETHUSDT");

        assert_eq!(request.query().get("asset").map(String::as_str), Some("USDT"));
        assert_eq!(request.form().get("symbol").map(String::as_str), Some("ETHUSDT"));
        assert_eq!(request.query().len(), 1);
    }

    #[test]
    fn test_optional_params_only_insert_present_values() {
        let mut request = Request::post("/papi/v1/um/order", SecurityLevel::Signed);
        request
            .set_optional_form_param("price", Some("100.5"))
            .set_optional_form_param("reduceOnly", None::<bool>)
            .set_optional_param("orderId", Some(42_u64));

        assert_eq!(request.form().get("price").map(String::as_str), Some("100.5"));
        assert!(!request.form().contains_key("reduceOnly"));
        assert_eq!(request.query().get("orderId").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_validate_rejects_malformed_endpoints() {
        for endpoint in ["", "papi/v1/account", "/papi/v1/account?x=1", "/papi v1"] {
            let request = Request::get(endpoint, SecurityLevel::None);
            assert!(
                matches!(request.validate(), Err(ExchangeError::InvalidParameters(_))),
                "endpoint {:?} should be rejected",
                endpoint
            );
        }
        assert!(Request::get("/papi/v1/account", SecurityLevel::Signed)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_query_form_collision() {
        let mut request = Request::post("/papi/v1/um/order", SecurityLevel::Signed);
        request.set_param("symbol", "BTCUSDT");
        request.set_form_param("symbol", "BTCUSDT");

        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("symbol"));
    }

    #[test]
    fn test_request_options_mutate_request() {
        let mut request = Request::get("/papi/v1/account", SecurityLevel::Signed);
        let options = [
            RequestOption::recv_window(7000),
            RequestOption::header("X-Trace", "abc"),
            RequestOption::new(|r| {
                r.set_param("asset", "BNB");
            }),
        ];
        for option in &options {
            option.apply(&mut request);
        }

        assert_eq!(request.recv_window(), 7000);
        assert_eq!(request.headers().get("X-Trace").map(String::as_str), Some("abc"));
        assert_eq!(request.query().get("asset").map(String::as_str), Some("BNB"));
    }

    #[test]
    fn test_security_level_api_key_requirement() {
        assert!(!SecurityLevel::None.requires_api_key());
        assert!(SecurityLevel::ApiKey.requires_api_key());
        assert!(SecurityLevel::Signed.requires_api_key());
    }
}
