use crate::core::errors::ExchangeError;
use crate::core::kernel::{Request, SecurityLevel};
use crate::portfolio::types::{
    NewOrderRespType, OrderType, PositionSide, SelfTradePreventionMode, SideType, TimeInForce,
};

pub const UM_ORDER_ENDPOINT: &str = "/papi/v1/um/order";
pub const CM_ORDER_ENDPOINT: &str = "/papi/v1/cm/order";

/// New USDⓈ-M futures order
#[derive(Debug, Clone, PartialEq)]
pub struct UmOrderRequest {
    pub symbol: String,
    pub side: SideType,
    pub order_type: OrderType,
    pub quantity: String,
    pub new_order_resp_type: NewOrderRespType,
    pub position_side: Option<PositionSide>,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: Option<bool>,
    pub price: Option<String>,
    pub new_client_order_id: Option<String>,
    pub price_match: Option<String>,
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    pub good_till_date: Option<i64>,
}

impl UmOrderRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: SideType,
        order_type: OrderType,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            quantity: quantity.into(),
            new_order_resp_type: NewOrderRespType::default(),
            position_side: None,
            time_in_force: None,
            reduce_only: None,
            price: None,
            new_client_order_id: None,
            price_match: None,
            self_trade_prevention_mode: None,
            good_till_date: None,
        }
    }

    pub fn with_response_type(mut self, response_type: NewOrderRespType) -> Self {
        self.new_order_resp_type = response_type;
        self
    }

    pub fn with_position_side(mut self, position_side: PositionSide) -> Self {
        self.position_side = Some(position_side);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = Some(reduce_only);
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(client_order_id.into());
        self
    }

    /// `OPPONENT`, `QUEUE` and friends; passed through unchanged
    pub fn with_price_match(mut self, price_match: impl Into<String>) -> Self {
        self.price_match = Some(price_match.into());
        self
    }

    pub fn with_self_trade_prevention(mut self, mode: SelfTradePreventionMode) -> Self {
        self.self_trade_prevention_mode = Some(mode);
        self
    }

    pub fn with_good_till_date(mut self, good_till_date: i64) -> Self {
        self.good_till_date = Some(good_till_date);
        self
    }

    pub fn to_request(&self) -> Request {
        let mut request = Request::post(UM_ORDER_ENDPOINT, SecurityLevel::Signed);
        request
            .set_form_param("symbol", &self.symbol)
            .set_form_param("side", self.side)
            .set_form_param("type", &self.order_type)
            .set_form_param("quantity", &self.quantity)
            .set_form_param("newOrderRespType", self.new_order_resp_type)
            .set_optional_form_param("positionSide", self.position_side)
            .set_optional_form_param("timeInForce", self.time_in_force.as_ref())
            .set_optional_form_param("reduceOnly", self.reduce_only)
            .set_optional_form_param("price", self.price.as_deref())
            .set_optional_form_param("newClientOrderId", self.new_client_order_id.as_deref())
            .set_optional_form_param("priceMatch", self.price_match.as_deref())
            .set_optional_form_param("selfTradePreventionMode", self.self_trade_prevention_mode)
            .set_optional_form_param("goodTillDate", self.good_till_date);
        request
    }
}

/// New coin-margined futures order
#[derive(Debug, Clone, PartialEq)]
pub struct CmOrderRequest {
    pub symbol: String,
    pub side: SideType,
    pub order_type: OrderType,
    pub quantity: String,
    pub new_order_resp_type: NewOrderRespType,
    pub position_side: Option<PositionSide>,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: Option<bool>,
    pub price: Option<String>,
    pub new_client_order_id: Option<String>,
}

impl CmOrderRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: SideType,
        order_type: OrderType,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            quantity: quantity.into(),
            new_order_resp_type: NewOrderRespType::default(),
            position_side: None,
            time_in_force: None,
            reduce_only: None,
            price: None,
            new_client_order_id: None,
        }
    }

    pub fn with_response_type(mut self, response_type: NewOrderRespType) -> Self {
        self.new_order_resp_type = response_type;
        self
    }

    pub fn with_position_side(mut self, position_side: PositionSide) -> Self {
        self.position_side = Some(position_side);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = Some(reduce_only);
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(client_order_id.into());
        self
    }

    pub fn to_request(&self) -> Request {
        let mut request = Request::post(CM_ORDER_ENDPOINT, SecurityLevel::Signed);
        request
            .set_form_param("symbol", &self.symbol)
            .set_form_param("side", self.side)
            .set_form_param("type", &self.order_type)
            .set_form_param("quantity", &self.quantity)
            .set_form_param("newOrderRespType", self.new_order_resp_type)
            .set_optional_form_param("positionSide", self.position_side)
            .set_optional_form_param("timeInForce", self.time_in_force.as_ref())
            .set_optional_form_param("reduceOnly", self.reduce_only)
            .set_optional_form_param("price", self.price.as_deref())
            .set_optional_form_param("newClientOrderId", self.new_client_order_id.as_deref());
        request
    }
}

/// Cancel one order by exchange id and/or client id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderRequest {
    pub symbol: String,
    pub order_id: Option<i64>,
    pub orig_client_order_id: Option<String>,
}

impl CancelOrderRequest {
    pub fn by_order_id(symbol: impl Into<String>, order_id: i64) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: Some(order_id),
            orig_client_order_id: None,
        }
    }

    pub fn by_client_order_id(symbol: impl Into<String>, client_order_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: None,
            orig_client_order_id: Some(client_order_id.into()),
        }
    }

    pub fn with_order_id(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.orig_client_order_id = Some(client_order_id.into());
        self
    }

    pub fn to_request(&self, endpoint: &str) -> Result<Request, ExchangeError> {
        if self.order_id.is_none() && self.orig_client_order_id.is_none() {
            return Err(ExchangeError::InvalidParameters(format!(
                "cancelling an order on {} needs orderId or origClientOrderId",
                self.symbol
            )));
        }

        let mut request = Request::delete(endpoint, SecurityLevel::Signed);
        request
            .set_form_param("symbol", &self.symbol)
            .set_optional_form_param("orderId", self.order_id)
            .set_optional_form_param("origClientOrderId", self.orig_client_order_id.as_deref());
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(request: &Request) -> Vec<(&str, &str)> {
        request
            .form()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_um_order_only_sends_set_fields() {
        let request = UmOrderRequest::new("BTCUSDT", SideType::Buy, OrderType::Limit, "0.01")
            .with_price("25000")
            .with_time_in_force(TimeInForce::Gtc)
            .with_self_trade_prevention(SelfTradePreventionMode::ExpireMaker)
            .to_request();

        assert_eq!(request.endpoint(), UM_ORDER_ENDPOINT);
        assert_eq!(request.security(), SecurityLevel::Signed);
        assert!(request.query().is_empty());
        assert_eq!(
            form(&request),
            vec![
                ("newOrderRespType", "ACK"),
                ("price", "25000"),
                ("quantity", "0.01"),
                ("selfTradePreventionMode", "EXPIRE_MAKER"),
                ("side", "BUY"),
                ("symbol", "BTCUSDT"),
                ("timeInForce", "GTC"),
                ("type", "LIMIT"),
            ]
        );
    }

    #[test]
    fn test_um_order_optional_flags() {
        let request = UmOrderRequest::new("ETHUSDT", SideType::Sell, OrderType::Market, "1")
            .with_reduce_only(false)
            .with_position_side(PositionSide::Short)
            .with_good_till_date(1_693_207_680_000)
            .with_response_type(NewOrderRespType::Result)
            .to_request();

        let form = request.form();
        assert_eq!(form.get("reduceOnly").map(String::as_str), Some("false"));
        assert_eq!(form.get("positionSide").map(String::as_str), Some("SHORT"));
        assert_eq!(form.get("goodTillDate").map(String::as_str), Some("1693207680000"));
        assert_eq!(form.get("newOrderRespType").map(String::as_str), Some("RESULT"));
        assert!(!form.contains_key("price"));
    }

    #[test]
    fn test_cm_order_uses_cm_endpoint() {
        let request = CmOrderRequest::new("BTCUSD_PERP", SideType::Buy, OrderType::Market, "1")
            .with_client_order_id("my-order")
            .to_request();

        assert_eq!(request.endpoint(), CM_ORDER_ENDPOINT);
        assert_eq!(
            request.form().get("newClientOrderId").map(String::as_str),
            Some("my-order")
        );
        assert!(!request.form().contains_key("priceMatch"));
    }

    #[test]
    fn test_cancel_requires_an_identifier() {
        let request = CancelOrderRequest {
            symbol: "BTCUSDT".to_string(),
            order_id: None,
            orig_client_order_id: None,
        };
        assert!(matches!(
            request.to_request(UM_ORDER_ENDPOINT),
            Err(ExchangeError::InvalidParameters(_))
        ));

        let request = CancelOrderRequest::by_order_id("BTCUSD_PERP", 42)
            .to_request(CM_ORDER_ENDPOINT)
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::DELETE);
        assert_eq!(request.endpoint(), "/papi/v1/cm/order");
        assert_eq!(request.form().get("orderId").map(String::as_str), Some("42"));
        assert!(!request.form().contains_key("origClientOrderId"));
    }
}
