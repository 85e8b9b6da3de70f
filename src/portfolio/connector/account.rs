use crate::core::{errors::ExchangeError, kernel::RestClient, traits::AccountInfo};
use crate::portfolio::rest::PortfolioRestClient;
use crate::portfolio::types::{
    Account, ApiAck, Balance, BusinessUnit, CmAccount, LeverageChange, UmAccount,
};
use async_trait::async_trait;
use tracing::instrument;

/// Account and position configuration for Binance Portfolio Margin
pub struct AccountService<R: RestClient> {
    rest: PortfolioRestClient<R>,
}

impl<R: RestClient> AccountService<R> {
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
impl<R: RestClient> AccountInfo for AccountService<R> {
    async fn get_account(&self) -> Result<Account, ExchangeError> {
        self.rest.get_account(&[]).await
    }

    async fn get_balances(&self, asset: Option<&str>) -> Result<Vec<Balance>, ExchangeError> {
        self.rest.get_balance(asset, &[]).await
    }

    async fn get_um_account(&self) -> Result<UmAccount, ExchangeError> {
        self.rest.get_um_account(&[]).await
    }

    async fn get_cm_account(&self) -> Result<CmAccount, ExchangeError> {
        self.rest.get_cm_account(&[]).await
    }

    #[instrument(skip(self), fields(exchange = "binance_portfolio", unit = %unit))]
    async fn change_leverage(
        &self,
        unit: BusinessUnit,
        symbol: &str,
        leverage: u32,
    ) -> Result<LeverageChange, ExchangeError> {
        if leverage == 0 {
            return Err(ExchangeError::InvalidParameters(format!(
                "leverage for {} must be at least 1",
                symbol
            )));
        }
        match unit {
            BusinessUnit::Um => self.rest.change_um_leverage(symbol, leverage, &[]).await,
            BusinessUnit::Cm => self.rest.change_cm_leverage(symbol, leverage, &[]).await,
        }
    }

    async fn change_position_mode(
        &self,
        unit: BusinessUnit,
        dual_side_position: bool,
    ) -> Result<ApiAck, ExchangeError> {
        match unit {
            BusinessUnit::Um => {
                self.rest
                    .change_um_position_mode(dual_side_position, &[])
                    .await
            }
            BusinessUnit::Cm => {
                self.rest
                    .change_cm_position_mode(dual_side_position, &[])
                    .await
            }
        }
    }
}
