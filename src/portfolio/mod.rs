use crate::core::config::ExchangeConfig;

// Core modules - one responsibility per file
pub mod codec; // impl WsCodec for the user data stream
pub mod requests; // order builders -> Request
pub mod rest; // thin typed wrapper around RestClient
pub mod types; // serde structs <- raw JSON

pub mod builder;
pub mod connector;

pub use builder::build_connector;
pub use codec::{decode_user_data_event, UserDataCodec, UserDataPayload, WsUserDataEvent};
pub use connector::PortfolioConnector;
pub use requests::{CancelOrderRequest, CmOrderRequest, UmOrderRequest};
pub use rest::PortfolioRestClient;
pub use types::*;

/// Name used in tracing spans
pub const EXCHANGE_NAME: &str = "binance_portfolio";

pub const REST_MAINNET_URL: &str = "https://papi.binance.com";
pub const REST_TESTNET_URL: &str = "https://papi-mm.binance.com";
pub const WS_MAINNET_URL: &str = "wss://fstream.binance.com/pm/ws";
pub const WS_TESTNET_URL: &str = "wss://fstream-mm.binance.com/pm/ws";

/// REST base URL for account queries: explicit override first, then testnet/mainnet
pub fn rest_base_url(config: &ExchangeConfig) -> String {
    select_rest_url(config, config.testnet)
}

/// REST base URL for orders and listen keys, which follow `order_testnet()`
pub fn order_rest_base_url(config: &ExchangeConfig) -> String {
    select_rest_url(config, config.order_testnet())
}

/// User data WebSocket base URL. The stream belongs to the order environment.
pub fn ws_base_url(config: &ExchangeConfig) -> String {
    match &config.ws_base_url {
        Some(url) => url.clone(),
        None if config.order_testnet() => WS_TESTNET_URL.to_string(),
        None => WS_MAINNET_URL.to_string(),
    }
}

fn select_rest_url(config: &ExchangeConfig, testnet: bool) -> String {
    match &config.base_url {
        Some(url) => url.clone(),
        None if testnet => REST_TESTNET_URL.to_string(),
        None => REST_MAINNET_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_selection() {
        let config = ExchangeConfig::new("k".to_string(), "s".to_string());
        assert_eq!(rest_base_url(&config), REST_MAINNET_URL);
        assert_eq!(ws_base_url(&config), WS_MAINNET_URL);

        let config = config.testnet(true);
        assert_eq!(rest_base_url(&config), REST_TESTNET_URL);
        assert_eq!(ws_base_url(&config), WS_TESTNET_URL);

        let config = config
            .base_url("http://127.0.0.1:9000".to_string())
            .ws_base_url("ws://127.0.0.1:9001/pm/ws".to_string());
        assert_eq!(rest_base_url(&config), "http://127.0.0.1:9000");
        assert_eq!(ws_base_url(&config), "ws://127.0.0.1:9001/pm/ws");
    }

    #[test]
    fn test_order_environment_selects_order_urls() {
        let config = ExchangeConfig::new("k".to_string(), "s".to_string()).testnet_order(true);
        assert_eq!(rest_base_url(&config), REST_MAINNET_URL);
        assert_eq!(order_rest_base_url(&config), REST_TESTNET_URL);
        assert_eq!(ws_base_url(&config), WS_TESTNET_URL);

        let config = config.testnet(true).testnet_order(false);
        assert_eq!(rest_base_url(&config), REST_TESTNET_URL);
        assert_eq!(order_rest_base_url(&config), REST_MAINNET_URL);
        assert_eq!(ws_base_url(&config), WS_MAINNET_URL);
    }
}
