use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HmacSigner, ReqwestRest, RestClientBuilder, RestClientConfig};
use crate::portfolio::{
    connector::PortfolioConnector, order_rest_base_url, rest_base_url, EXCHANGE_NAME,
};
use std::sync::Arc;
use tracing::debug;

/// Build a reqwest-backed transport for account queries.
///
/// Without credentials only public endpoints can be called; authenticated
/// calls fail with an authentication error before anything is sent.
pub fn build_rest(config: &ExchangeConfig) -> Result<ReqwestRest, ExchangeError> {
    build_rest_for(config, rest_base_url(config))
}

/// Build the transport used for orders and listen keys
pub fn build_order_rest(config: &ExchangeConfig) -> Result<ReqwestRest, ExchangeError> {
    build_rest_for(config, order_rest_base_url(config))
}

fn build_rest_for(config: &ExchangeConfig, base_url: String) -> Result<ReqwestRest, ExchangeError> {
    let rest_config = RestClientConfig::new(base_url, EXCHANGE_NAME.to_string())
        .with_timeout(config.timeout_seconds)
        .with_recv_window(config.recv_window)
        .with_time_offset(config.time_offset)
        .with_proxy(config.proxy_url.clone());

    let mut rest_builder = RestClientBuilder::new(rest_config);

    // Add authentication if credentials are provided
    if config.has_credentials() {
        let signer = Arc::new(HmacSigner::new(
            config.api_key().to_string(),
            config.secret_key().to_string(),
        ));
        rest_builder = rest_builder.with_signer(signer);
    } else {
        debug!("No credentials configured, building public-only client");
    }

    rest_builder.build()
}

/// Create a Binance Portfolio Margin connector
pub fn build_connector(
    config: ExchangeConfig,
) -> Result<PortfolioConnector<ReqwestRest>, ExchangeError> {
    let rest = build_rest(&config)?;
    let order_rest = build_order_rest(&config)?;
    Ok(PortfolioConnector::new(rest, order_rest, &config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::UserDataSource;

    #[test]
    fn test_build_connector_uses_config_urls() {
        let config = ExchangeConfig::new("k".to_string(), "s".to_string())
            .testnet(true)
            .recv_window(5000)
            .time_offset(42);
        let rest = build_rest(&config).unwrap();

        assert_eq!(rest.config().base_url, "https://papi-mm.binance.com");
        assert_eq!(rest.config().recv_window, 5000);
        assert_eq!(rest.time_offset(), 42);

        let connector = build_connector(config).unwrap();
        assert_eq!(
            connector.user_data_url("abc"),
            "wss://fstream-mm.binance.com/pm/ws/abc"
        );
    }

    #[test]
    fn test_order_transport_uses_order_environment() {
        let config = ExchangeConfig::new("k".to_string(), "s".to_string()).testnet_order(true);

        assert_eq!(
            build_rest(&config).unwrap().config().base_url,
            "https://papi.binance.com"
        );
        assert_eq!(
            build_order_rest(&config).unwrap().config().base_url,
            "https://papi-mm.binance.com"
        );
        let connector = build_connector(config).unwrap();
        assert_eq!(
            connector.user_data_url("abc"),
            "wss://fstream-mm.binance.com/pm/ws/abc"
        );
    }

    #[test]
    fn test_bad_proxy_url_is_a_config_error() {
        let config = ExchangeConfig::new("k".to_string(), "s".to_string())
            .proxy_url("ftp://proxy.test:21".to_string());

        let err = build_connector(config).err().unwrap();
        assert!(matches!(err, ExchangeError::ConfigError(_)));
    }
}
