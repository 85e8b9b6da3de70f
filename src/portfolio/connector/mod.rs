use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, WsConfig, WsHandle};
use crate::core::traits::{AccountInfo, OrderPlacer, UserDataSource};
use crate::portfolio::codec::WsUserDataEvent;
use crate::portfolio::requests::{CancelOrderRequest, CmOrderRequest, UmOrderRequest};
use crate::portfolio::types::{
    Account, ApiAck, Balance, BusinessUnit, CmAccount, CmCancelOrderResponse, CmOrderResponse,
    LeverageChange, UmAccount, UmCancelOrderResponse, UmOrderResponse,
};
use crate::portfolio::{rest::PortfolioRestClient, ws_base_url};
use async_trait::async_trait;
use std::time::Duration;

pub mod account;
pub mod trading;
pub mod user_stream;

pub use account::AccountService;
pub use trading::TradingService;
pub use user_stream::UserStreamService;

/// Binance Portfolio Margin connector that composes all sub-trait implementations
pub struct PortfolioConnector<R: RestClient> {
    pub account: AccountService<R>,
    pub trading: TradingService<R>,
    pub user_stream: UserStreamService<R>,
    rest: PortfolioRestClient<R>,
}

impl<R: RestClient + Clone> PortfolioConnector<R> {
    /// `rest` serves account queries; `order_rest` serves orders and listen
    /// keys, which may point at a different environment.
    pub fn new(rest: R, order_rest: R, config: &ExchangeConfig) -> Self {
        let ws_config = WsConfig::default().with_keepalive(
            config.keepalive,
            Duration::from_secs(config.keepalive_interval_secs),
        );

        Self {
            account: AccountService::new(&rest),
            trading: TradingService::new(&order_rest),
            user_stream: UserStreamService::new(&order_rest, ws_base_url(config), ws_config),
            rest: PortfolioRestClient::new(rest),
        }
    }

    /// Replace the WebSocket settings used by `serve_user_data`
    pub fn with_ws_config(mut self, ws_config: WsConfig) -> Self {
        self.user_stream.set_ws_config(ws_config);
        self
    }

    /// Typed REST client, for calls that need per-call `RequestOption`s
    pub fn rest(&self) -> &PortfolioRestClient<R> {
        &self.rest
    }
}

// Implement traits for the connector by delegating to sub-components

#[async_trait]
impl<R: RestClient> AccountInfo for PortfolioConnector<R> {
    async fn get_account(&self) -> Result<Account, ExchangeError> {
        self.account.get_account().await
    }

    async fn get_balances(&self, asset: Option<&str>) -> Result<Vec<Balance>, ExchangeError> {
        self.account.get_balances(asset).await
    }

    async fn get_um_account(&self) -> Result<UmAccount, ExchangeError> {
        self.account.get_um_account().await
    }

    async fn get_cm_account(&self) -> Result<CmAccount, ExchangeError> {
        self.account.get_cm_account().await
    }

    async fn change_leverage(
        &self,
        unit: BusinessUnit,
        symbol: &str,
        leverage: u32,
    ) -> Result<LeverageChange, ExchangeError> {
        self.account.change_leverage(unit, symbol, leverage).await
    }

    async fn change_position_mode(
        &self,
        unit: BusinessUnit,
        dual_side_position: bool,
    ) -> Result<ApiAck, ExchangeError> {
        self.account
            .change_position_mode(unit, dual_side_position)
            .await
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for PortfolioConnector<R> {
    async fn place_um_order(
        &self,
        order: &UmOrderRequest,
    ) -> Result<UmOrderResponse, ExchangeError> {
        self.trading.place_um_order(order).await
    }

    async fn place_cm_order(
        &self,
        order: &CmOrderRequest,
    ) -> Result<CmOrderResponse, ExchangeError> {
        self.trading.place_cm_order(order).await
    }

    async fn cancel_um_order(
        &self,
        cancel: &CancelOrderRequest,
    ) -> Result<UmCancelOrderResponse, ExchangeError> {
        self.trading.cancel_um_order(cancel).await
    }

    async fn cancel_cm_order(
        &self,
        cancel: &CancelOrderRequest,
    ) -> Result<CmCancelOrderResponse, ExchangeError> {
        self.trading.cancel_cm_order(cancel).await
    }

    async fn cancel_all_open_orders(
        &self,
        unit: BusinessUnit,
        symbol: &str,
    ) -> Result<(), ExchangeError> {
        self.trading.cancel_all_open_orders(unit, symbol).await
    }
}

#[async_trait]
impl<R: RestClient> UserDataSource for PortfolioConnector<R> {
    async fn start_user_stream(&self) -> Result<String, ExchangeError> {
        self.user_stream.start_user_stream().await
    }

    async fn keepalive_user_stream(&self) -> Result<(), ExchangeError> {
        self.user_stream.keepalive_user_stream().await
    }

    async fn close_user_stream(&self) -> Result<(), ExchangeError> {
        self.user_stream.close_user_stream().await
    }

    fn user_data_url(&self, listen_key: &str) -> String {
        self.user_stream.user_data_url(listen_key)
    }

    async fn serve_user_data<H, E>(
        &self,
        listen_key: &str,
        handler: H,
        err_handler: E,
    ) -> Result<WsHandle, ExchangeError>
    where
        H: FnMut(WsUserDataEvent) -> Result<(), ExchangeError> + Send + 'static,
        E: FnMut(ExchangeError) + Send + 'static,
    {
        self.user_stream
            .serve_user_data(listen_key, handler, err_handler)
            .await
    }
}
