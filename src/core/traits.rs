use crate::core::{errors::ExchangeError, kernel::WsHandle};
use crate::portfolio::{
    codec::WsUserDataEvent,
    requests::{CancelOrderRequest, CmOrderRequest, UmOrderRequest},
    types::{
        Account, ApiAck, Balance, BusinessUnit, CmAccount, CmCancelOrderResponse,
        CmOrderResponse, LeverageChange, UmAccount, UmCancelOrderResponse, UmOrderResponse,
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait AccountInfo: Send + Sync {
    /// Unified portfolio margin account summary
    async fn get_account(&self) -> Result<Account, ExchangeError>;

    /// Balances per asset; `asset` narrows the result to a single entry
    async fn get_balances(&self, asset: Option<&str>) -> Result<Vec<Balance>, ExchangeError>;

    async fn get_um_account(&self) -> Result<UmAccount, ExchangeError>;

    async fn get_cm_account(&self) -> Result<CmAccount, ExchangeError>;

    async fn change_leverage(
        &self,
        unit: BusinessUnit,
        symbol: &str,
        leverage: u32,
    ) -> Result<LeverageChange, ExchangeError>;

    /// `true` selects hedge mode, `false` one-way mode
    async fn change_position_mode(
        &self,
        unit: BusinessUnit,
        dual_side_position: bool,
    ) -> Result<ApiAck, ExchangeError>;
}

#[async_trait]
pub trait OrderPlacer: Send + Sync {
    async fn place_um_order(&self, order: &UmOrderRequest)
        -> Result<UmOrderResponse, ExchangeError>;

    async fn place_cm_order(&self, order: &CmOrderRequest)
        -> Result<CmOrderResponse, ExchangeError>;

    async fn cancel_um_order(
        &self,
        cancel: &CancelOrderRequest,
    ) -> Result<UmCancelOrderResponse, ExchangeError>;

    async fn cancel_cm_order(
        &self,
        cancel: &CancelOrderRequest,
    ) -> Result<CmCancelOrderResponse, ExchangeError>;

    async fn cancel_all_open_orders(
        &self,
        unit: BusinessUnit,
        symbol: &str,
    ) -> Result<(), ExchangeError>;
}

#[async_trait]
pub trait UserDataSource: Send + Sync {
    /// Create a listen key for the user data stream
    async fn start_user_stream(&self) -> Result<String, ExchangeError>;

    async fn keepalive_user_stream(&self) -> Result<(), ExchangeError>;

    async fn close_user_stream(&self) -> Result<(), ExchangeError>;

    /// WebSocket endpoint for a listen key
    fn user_data_url(&self, listen_key: &str) -> String;

    /// Connect to the user data stream of `listen_key`.
    ///
    /// Events reach `handler` in arrival order. Decode and handler failures go
    /// to `err_handler` without ending the session.
    async fn serve_user_data<H, E>(
        &self,
        listen_key: &str,
        handler: H,
        err_handler: E,
    ) -> Result<WsHandle, ExchangeError>
    where
        H: FnMut(WsUserDataEvent) -> Result<(), ExchangeError> + Send + 'static,
        E: FnMut(ExchangeError) + Send + 'static;
}

// Composite trait for callers that need the whole surface
pub trait PortfolioApi: AccountInfo + OrderPlacer + UserDataSource {}

impl<T: AccountInfo + OrderPlacer + UserDataSource> PortfolioApi for T {}
