//! Async client for the Binance Portfolio Margin API.
//!
//! Signed REST calls go through [`core::kernel::ReqwestRest`]; the user data
//! stream is served by [`core::kernel::WsSession`] with the portfolio codec.

pub mod core;
pub mod portfolio;

pub use core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    traits::{AccountInfo, OrderPlacer, PortfolioApi, UserDataSource},
};
pub use portfolio::types::*;
pub use portfolio::{
    build_connector, CancelOrderRequest, CmOrderRequest, PortfolioConnector, UmOrderRequest,
    UserDataPayload, WsUserDataEvent,
};
