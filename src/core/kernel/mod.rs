//! Transport kernel shared by every service in the crate
//!
//! The kernel knows nothing about individual endpoints. It provides:
//!
//! ## Request model
//! - `Request`: method, path, query/form parameters, headers, security level
//! - `RequestOption`: per-call mutation applied before validation and signing
//!
//! ## Transport
//! - `RestClient`: sign, send and classify one request
//! - `WsSession` / `WsHandle`: one streaming connection with keepalive
//!
//! ## Authentication
//! - `Signer` / `HmacSigner`: HMAC-SHA256 over `query_string + form_string`
//!
//! ## Message handling
//! - `WsCodec`: frame to typed message decoding
//!
//! # Signed call
//! ```rust,no_run
//! use papix::core::kernel::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), papix::ExchangeError> {
//! let rest = RestClientBuilder::new(RestClientConfig::new(
//!     "https://papi.binance.com".to_string(),
//!     "binance_portfolio".to_string(),
//! ))
//! .with_signer(Arc::new(HmacSigner::new("key".to_string(), "secret".to_string())))
//! .build()?;
//!
//! let mut request = Request::get("/papi/v1/balance", SecurityLevel::Signed);
//! request.set_param("asset", "USDT");
//! let response = rest.call(request, &[RequestOption::recv_window(5000)]).await?;
//! let balances: serde_json::Value = response.json()?;
//! # let _ = balances;
//! # Ok(())
//! # }
//! ```
pub mod codec;
pub mod request;
pub mod rest;
pub mod signer;
pub mod ws;

// Re-export key types for convenience
pub use codec::WsCodec;
pub use request::{Params, Request, RequestOption, SecurityLevel};
pub use rest::{
    RawResponse, ReqwestRest, RestClient, RestClientBuilder, RestClientConfig, SignedEnvelope,
};
pub use signer::{Credentials, HmacSigner, Signer};
pub use ws::{WsConfig, WsHandle, WsSession};
