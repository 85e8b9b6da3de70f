use crate::core::errors::ExchangeError;
use crate::core::kernel::{RawResponse, Request, RequestOption, RestClient, SecurityLevel};
use crate::portfolio::requests::{
    CancelOrderRequest, CmOrderRequest, UmOrderRequest, CM_ORDER_ENDPOINT, UM_ORDER_ENDPOINT,
};
use crate::portfolio::types::{
    Account, ApiAck, Balance, CmAccount, CmCancelOrderResponse, CmOrderResponse, LeverageChange,
    ListenKey, OrderRateLimit, UmAccount, UmCancelOrderResponse, UmOrderResponse,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

const ORDER_COUNT_10S_HEADER: &str = "X-Mbx-Order-Count-10s";
const ORDER_COUNT_1M_HEADER: &str = "X-Mbx-Order-Count-1m";
const LISTEN_KEY_ENDPOINT: &str = "/papi/v1/listenKey";

/// Which futures book an endpoint addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Book {
    Um,
    Cm,
}

/// REST API operations for Binance Portfolio Margin
///
/// Every method takes per-call [`RequestOption`]s, applied before signing.
pub struct PortfolioRestClient<R: RestClient> {
    rest: R,
}

impl<R: RestClient> PortfolioRestClient<R> {
    pub fn new(rest: R) -> Self {
        Self { rest }
    }

    /// Underlying transport
    pub fn transport(&self) -> &R {
        &self.rest
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        request: Request,
        options: &[RequestOption],
    ) -> Result<T, ExchangeError> {
        self.rest.call(request, options).await?.json()
    }

    /// Unified account summary
    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn get_account(&self, options: &[RequestOption]) -> Result<Account, ExchangeError> {
        let request = Request::get("/papi/v1/account", SecurityLevel::Signed);
        self.call_json(request, options).await
    }

    /// Balances for every asset, or only `asset`
    #[instrument(skip(self, options), fields(exchange = "binance_portfolio", asset = ?asset))]
    pub async fn get_balance(
        &self,
        asset: Option<&str>,
        options: &[RequestOption],
    ) -> Result<Vec<Balance>, ExchangeError> {
        let mut request = Request::get("/papi/v1/balance", SecurityLevel::Signed);
        request.set_optional_param("asset", asset);
        let balances: OneOrMany<Balance> = self.call_json(request, options).await?;
        Ok(balances.into_vec())
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn get_um_account(&self, options: &[RequestOption]) -> Result<UmAccount, ExchangeError> {
        let request = Request::get("/papi/v1/um/account", SecurityLevel::Signed);
        self.call_json(request, options).await
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn get_cm_account(&self, options: &[RequestOption]) -> Result<CmAccount, ExchangeError> {
        let request = Request::get("/papi/v1/cm/account", SecurityLevel::Signed);
        self.call_json(request, options).await
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio", symbol = %symbol))]
    pub async fn change_um_leverage(
        &self,
        symbol: &str,
        leverage: u32,
        options: &[RequestOption],
    ) -> Result<LeverageChange, ExchangeError> {
        self.call_json(leverage_request(Book::Um, symbol, leverage), options)
            .await
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio", symbol = %symbol))]
    pub async fn change_cm_leverage(
        &self,
        symbol: &str,
        leverage: u32,
        options: &[RequestOption],
    ) -> Result<LeverageChange, ExchangeError> {
        self.call_json(leverage_request(Book::Cm, symbol, leverage), options)
            .await
    }

    /// Switch between hedge mode (`true`) and one-way mode
    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn change_um_position_mode(
        &self,
        dual_side_position: bool,
        options: &[RequestOption],
    ) -> Result<ApiAck, ExchangeError> {
        self.call_json(position_mode_request(Book::Um, dual_side_position), options)
            .await
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn change_cm_position_mode(
        &self,
        dual_side_position: bool,
        options: &[RequestOption],
    ) -> Result<ApiAck, ExchangeError> {
        self.call_json(position_mode_request(Book::Cm, dual_side_position), options)
            .await
    }

    #[instrument(skip(self, order, options), fields(exchange = "binance_portfolio", symbol = %order.symbol, side = %order.side))]
    pub async fn place_um_order(
        &self,
        order: &UmOrderRequest,
        options: &[RequestOption],
    ) -> Result<UmOrderResponse, ExchangeError> {
        let response = self.rest.call(order.to_request(), options).await?;
        let mut placed: UmOrderResponse = response.json()?;
        placed.rate_limit = order_rate_limit(&response);
        Ok(placed)
    }

    #[instrument(skip(self, order, options), fields(exchange = "binance_portfolio", symbol = %order.symbol, side = %order.side))]
    pub async fn place_cm_order(
        &self,
        order: &CmOrderRequest,
        options: &[RequestOption],
    ) -> Result<CmOrderResponse, ExchangeError> {
        let response = self.rest.call(order.to_request(), options).await?;
        let mut placed: CmOrderResponse = response.json()?;
        placed.rate_limit = order_rate_limit(&response);
        Ok(placed)
    }

    #[instrument(skip(self, cancel, options), fields(exchange = "binance_portfolio", symbol = %cancel.symbol))]
    pub async fn cancel_um_order(
        &self,
        cancel: &CancelOrderRequest,
        options: &[RequestOption],
    ) -> Result<UmCancelOrderResponse, ExchangeError> {
        self.call_json(cancel.to_request(UM_ORDER_ENDPOINT)?, options)
            .await
    }

    #[instrument(skip(self, cancel, options), fields(exchange = "binance_portfolio", symbol = %cancel.symbol))]
    pub async fn cancel_cm_order(
        &self,
        cancel: &CancelOrderRequest,
        options: &[RequestOption],
    ) -> Result<CmCancelOrderResponse, ExchangeError> {
        self.call_json(cancel.to_request(CM_ORDER_ENDPOINT)?, options)
            .await
    }

    /// Cancel every open UM order on `symbol`. The response body is ignored.
    #[instrument(skip(self, options), fields(exchange = "binance_portfolio", symbol = %symbol))]
    pub async fn cancel_all_um_open_orders(
        &self,
        symbol: &str,
        options: &[RequestOption],
    ) -> Result<(), ExchangeError> {
        self.rest
            .call(cancel_all_request(Book::Um, symbol), options)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio", symbol = %symbol))]
    pub async fn cancel_all_cm_open_orders(
        &self,
        symbol: &str,
        options: &[RequestOption],
    ) -> Result<(), ExchangeError> {
        self.rest
            .call(cancel_all_request(Book::Cm, symbol), options)
            .await?;
        Ok(())
    }

    /// Open a user data stream and return its listen key
    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn start_user_stream(&self, options: &[RequestOption]) -> Result<String, ExchangeError> {
        let request = Request::post(LISTEN_KEY_ENDPOINT, SecurityLevel::ApiKey);
        let key: ListenKey = self.call_json(request, options).await?;
        Ok(key.listen_key)
    }

    /// Extend the listen key validity by another 60 minutes
    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn keepalive_user_stream(&self, options: &[RequestOption]) -> Result<(), ExchangeError> {
        let request = Request::put(LISTEN_KEY_ENDPOINT, SecurityLevel::ApiKey);
        self.rest.call(request, options).await?;
        Ok(())
    }

    #[instrument(skip(self, options), fields(exchange = "binance_portfolio"))]
    pub async fn close_user_stream(&self, options: &[RequestOption]) -> Result<(), ExchangeError> {
        let request = Request::delete(LISTEN_KEY_ENDPOINT, SecurityLevel::ApiKey);
        self.rest.call(request, options).await?;
        Ok(())
    }
}

/// `/papi/v1/balance` returns an array, or a bare object when filtered by asset.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

fn order_rate_limit(response: &RawResponse) -> OrderRateLimit {
    OrderRateLimit {
        order_count_10s: response.header(ORDER_COUNT_10S_HEADER).map(str::to_string),
        order_count_1m: response.header(ORDER_COUNT_1M_HEADER).map(str::to_string),
    }
}

fn book_endpoint(book: Book, suffix: &str) -> String {
    match book {
        Book::Um => format!("/papi/v1/um/{}", suffix),
        Book::Cm => format!("/papi/v1/cm/{}", suffix),
    }
}

fn leverage_request(book: Book, symbol: &str, leverage: u32) -> Request {
    let mut request = Request::post(book_endpoint(book, "leverage"), SecurityLevel::Signed);
    request
        .set_form_param("symbol", symbol)
        .set_form_param("leverage", leverage);
    request
}

fn position_mode_request(book: Book, dual_side_position: bool) -> Request {
    let mut request = Request::post(
        book_endpoint(book, "positionSide/dual"),
        SecurityLevel::Signed,
    );
    request.set_form_param("dualSidePosition", dual_side_position);
    request
}

fn cancel_all_request(book: Book, symbol: &str) -> Request {
    let mut request = Request::delete(book_endpoint(book, "allOpenOrders"), SecurityLevel::Signed);
    request.set_form_param("symbol", symbol);
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_endpoints() {
        let request = leverage_request(Book::Cm, "BTCUSD_PERP", 20);
        assert_eq!(request.endpoint(), "/papi/v1/cm/leverage");
        assert_eq!(request.form().get("leverage").map(String::as_str), Some("20"));

        let request = position_mode_request(Book::Um, true);
        assert_eq!(request.endpoint(), "/papi/v1/um/positionSide/dual");
        assert_eq!(
            request.form().get("dualSidePosition").map(String::as_str),
            Some("true")
        );

        let request = cancel_all_request(Book::Um, "BTCUSDT");
        assert_eq!(request.method(), reqwest::Method::DELETE);
        assert_eq!(request.endpoint(), "/papi/v1/um/allOpenOrders");
    }

    #[test]
    fn test_balance_accepts_object_or_array() {
        let many: OneOrMany<Balance> =
            serde_json::from_str(r#"[{"asset":"BTC"},{"asset":"USDT"}]"#).unwrap();
        assert_eq!(many.into_vec().len(), 2);

        let one: OneOrMany<Balance> = serde_json::from_str(r#"{"asset":"USDT"}"#).unwrap();
        let balances = one.into_vec();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "USDT");
    }
}
