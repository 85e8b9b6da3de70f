use crate::core::{errors::ExchangeError, kernel::RestClient, traits::OrderPlacer};
use crate::portfolio::requests::{CancelOrderRequest, CmOrderRequest, UmOrderRequest};
use crate::portfolio::rest::PortfolioRestClient;
use crate::portfolio::types::{
    BusinessUnit, CmCancelOrderResponse, CmOrderResponse, UmCancelOrderResponse, UmOrderResponse,
};
use async_trait::async_trait;
use tracing::instrument;

/// Order placement and cancellation on both futures books
pub struct TradingService<R: RestClient> {
    rest: PortfolioRestClient<R>,
}

impl<R: RestClient> TradingService<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self {
            rest: PortfolioRestClient::new(rest.clone()),
        }
    }
}

#[async_trait]
impl<R: RestClient> OrderPlacer for TradingService<R> {
    async fn place_um_order(
        &self,
        order: &UmOrderRequest,
    ) -> Result<UmOrderResponse, ExchangeError> {
        self.rest.place_um_order(order, &[]).await
    }

    async fn place_cm_order(
        &self,
        order: &CmOrderRequest,
    ) -> Result<CmOrderResponse, ExchangeError> {
        self.rest.place_cm_order(order, &[]).await
    }

    async fn cancel_um_order(
        &self,
        cancel: &CancelOrderRequest,
    ) -> Result<UmCancelOrderResponse, ExchangeError> {
        self.rest.cancel_um_order(cancel, &[]).await
    }

    async fn cancel_cm_order(
        &self,
        cancel: &CancelOrderRequest,
    ) -> Result<CmCancelOrderResponse, ExchangeError> {
        self.rest.cancel_cm_order(cancel, &[]).await
    }

    #[instrument(skip(self), fields(exchange = "binance_portfolio", unit = %unit))]
    async fn cancel_all_open_orders(
        &self,
        unit: BusinessUnit,
        symbol: &str,
    ) -> Result<(), ExchangeError> {
        match unit {
            BusinessUnit::Um => self.rest.cancel_all_um_open_orders(symbol, &[]).await,
            BusinessUnit::Cm => self.rest.cancel_all_cm_open_orders(symbol, &[]).await,
        }
    }
}
