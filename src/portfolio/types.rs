use serde::{Deserialize, Serialize};
use std::fmt;

// Amounts and prices stay exchange-formatted strings throughout; nothing in
// this crate does arithmetic on them.

macro_rules! wire_str {
    ($ty:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Enums the exchange extends over time. Unknown wire values land in `Other`
// and serialize back unchanged.
macro_rules! open_wire_str {
    ($ty:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(other) => other,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                match value {
                    $ty::Other(other) => other,
                    known => known.as_str().to_string(),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SideType {
    Buy,
    Sell,
}

wire_str!(SideType { Buy => "BUY", Sell => "SELL" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Both,
    Long,
    Short,
}

wire_str!(PositionSide { Both => "BOTH", Long => "LONG", Short => "SHORT" });

/// Order type. Forced liquidations and ADL orders use types that cannot be
/// placed by clients, and anything unknown is kept in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopMarket,
    TakeProfit,
    TakeProfitMarket,
    TrailingStopMarket,
    Liquidation,
    Other(String),
}

open_wire_str!(OrderType {
    Limit => "LIMIT",
    Market => "MARKET",
    Stop => "STOP",
    StopMarket => "STOP_MARKET",
    TakeProfit => "TAKE_PROFIT",
    TakeProfitMarket => "TAKE_PROFIT_MARKET",
    TrailingStopMarket => "TRAILING_STOP_MARKET",
    Liquidation => "LIQUIDATION",
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeInForce {
    /// Good till cancel
    Gtc,
    /// Immediate or cancel
    Ioc,
    /// Fill or kill
    Fok,
    /// Good till crossing (post only)
    Gtx,
    /// Good till date, see `goodTillDate`
    Gtd,
    /// Close-position TP/SL orders
    GteGtc,
    Other(String),
}

open_wire_str!(TimeInForce {
    Gtc => "GTC",
    Ioc => "IOC",
    Fok => "FOK",
    Gtx => "GTX",
    Gtd => "GTD",
    GteGtc => "GTE_GTC",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewOrderRespType {
    #[default]
    Ack,
    Result,
}

wire_str!(NewOrderRespType { Ack => "ACK", Result => "RESULT" });

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderExecutionType {
    New,
    PartialFill,
    Fill,
    Canceled,
    Calculated,
    Expired,
    Trade,
    Amendment,
    Other(String),
}

open_wire_str!(OrderExecutionType {
    New => "NEW",
    PartialFill => "PARTIAL_FILL",
    Fill => "FILL",
    Canceled => "CANCELED",
    Calculated => "CALCULATED",
    Expired => "EXPIRED",
    Trade => "TRADE",
    Amendment => "AMENDMENT",
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    NewInsurance,
    NewAdl,
    ExpiredInMatch,
    Other(String),
}

open_wire_str!(OrderStatus {
    New => "NEW",
    PartiallyFilled => "PARTIALLY_FILLED",
    Filled => "FILLED",
    Canceled => "CANCELED",
    Rejected => "REJECTED",
    Expired => "EXPIRED",
    NewInsurance => "NEW_INSURANCE",
    NewAdl => "NEW_ADL",
    ExpiredInMatch => "EXPIRED_IN_MATCH",
});

/// Futures book a user-data event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessUnit {
    /// USDⓈ-margined futures
    #[serde(rename = "UM")]
    Um,
    /// Coin-margined futures
    #[serde(rename = "CM")]
    Cm,
}

wire_str!(BusinessUnit { Um => "UM", Cm => "CM" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserDataEventType {
    AccountUpdate,
    OrderTradeUpdate,
    OutboundAccountPosition,
    BalanceUpdate,
    ListenKeyExpired,
}

wire_str!(UserDataEventType {
    AccountUpdate => "ACCOUNT_UPDATE",
    OrderTradeUpdate => "ORDER_TRADE_UPDATE",
    OutboundAccountPosition => "outboundAccountPosition",
    BalanceUpdate => "balanceUpdate",
    ListenKeyExpired => "listenKeyExpired",
});

impl UserDataEventType {
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "ACCOUNT_UPDATE" => Some(Self::AccountUpdate),
            "ORDER_TRADE_UPDATE" => Some(Self::OrderTradeUpdate),
            "outboundAccountPosition" => Some(Self::OutboundAccountPosition),
            "balanceUpdate" => Some(Self::BalanceUpdate),
            "listenKeyExpired" => Some(Self::ListenKeyExpired),
            _ => None,
        }
    }
}

/// Why an `ACCOUNT_UPDATE` was pushed. The exchange adds reasons over time,
/// so unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserDataEventReason {
    Deposit,
    Withdraw,
    Order,
    FundingFee,
    WithdrawReject,
    Adjustment,
    InsuranceClear,
    AdminDeposit,
    AdminWithdraw,
    MarginTransfer,
    MarginTypeChange,
    AssetTransfer,
    OptionsPremiumFee,
    OptionsSettleProfit,
    Other(String),
}

open_wire_str!(UserDataEventReason {
    Deposit => "DEPOSIT",
    Withdraw => "WITHDRAW",
    Order => "ORDER",
    FundingFee => "FUNDING_FEE",
    WithdrawReject => "WITHDRAW_REJECT",
    Adjustment => "ADJUSTMENT",
    InsuranceClear => "INSURANCE_CLEAR",
    AdminDeposit => "ADMIN_DEPOSIT",
    AdminWithdraw => "ADMIN_WITHDRAW",
    MarginTransfer => "MARGIN_TRANSFER",
    MarginTypeChange => "MARGIN_TYPE_CHANGE",
    AssetTransfer => "ASSET_TRANSFER",
    OptionsPremiumFee => "OPTIONS_PREMIUM_FEE",
    OptionsSettleProfit => "OPTIONS_SETTLE_PROFIT",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingType {
    MarkPrice,
    ContractPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarginType {
    Isolated,
    Crossed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelfTradePreventionMode {
    None,
    ExpireTaker,
    ExpireMaker,
    ExpireBoth,
}

wire_str!(SelfTradePreventionMode {
    None => "NONE",
    ExpireTaker => "EXPIRE_TAKER",
    ExpireMaker => "EXPIRE_MAKER",
    ExpireBoth => "EXPIRE_BOTH",
});

// ---------------------------------------------------------------------------
// REST responses
// ---------------------------------------------------------------------------

/// Unified account summary, `GET /papi/v1/account`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    #[serde(rename = "uniMMR")]
    pub uni_mmr: String,
    pub account_equity: String,
    pub actual_equity: String,
    pub account_initial_margin: String,
    pub account_maint_margin: String,
    /// `NORMAL`, `MARGIN_CALL`, `SUPPLY_MARGIN`, `REDUCE_ONLY`,
    /// `ACTIVE_LIQUIDATION`, `FORCE_LIQUIDATION` or `BANKRUPTED`
    pub account_status: String,
    pub virtual_max_withdraw_amount: String,
    pub total_available_balance: String,
    pub total_margin_open_loss: String,
    pub update_time: i64,
}

/// Per-asset balance across margin and futures books, `GET /papi/v1/balance`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Balance {
    pub asset: String,
    pub total_wallet_balance: String,
    pub cross_margin_asset: String,
    pub cross_margin_borrowed: String,
    pub cross_margin_free: String,
    pub cross_margin_interest: String,
    pub cross_margin_locked: String,
    pub um_wallet_balance: String,
    #[serde(rename = "umUnrealizedPNL")]
    pub um_unrealized_pnl: String,
    pub cm_wallet_balance: String,
    #[serde(rename = "cmUnrealizedPNL")]
    pub cm_unrealized_pnl: String,
    pub update_time: i64,
    pub negative_balance: String,
}

/// Asset line of a UM or CM futures account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FuturesAsset {
    pub asset: String,
    pub cross_wallet_balance: String,
    pub cross_un_pnl: String,
    pub maint_margin: String,
    pub initial_margin: String,
    pub position_initial_margin: String,
    pub open_order_initial_margin: String,
    pub update_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UmAccountPosition {
    pub symbol: String,
    pub initial_margin: String,
    pub maint_margin: String,
    pub unrealized_profit: String,
    pub position_initial_margin: String,
    pub open_order_initial_margin: String,
    pub leverage: String,
    pub entry_price: String,
    pub max_notional: String,
    pub bid_notional: String,
    pub ask_notional: String,
    pub position_side: Option<PositionSide>,
    pub position_amt: String,
    pub update_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmAccountPosition {
    pub symbol: String,
    pub position_amt: String,
    pub initial_margin: String,
    pub maint_margin: String,
    pub unrealized_profit: String,
    pub position_initial_margin: String,
    pub open_order_initial_margin: String,
    pub leverage: String,
    pub position_side: Option<PositionSide>,
    pub entry_price: String,
    pub max_qty: String,
    pub update_time: i64,
}

/// `GET /papi/v1/um/account`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UmAccount {
    pub assets: Vec<FuturesAsset>,
    pub positions: Vec<UmAccountPosition>,
}

/// `GET /papi/v1/cm/account`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmAccount {
    pub assets: Vec<FuturesAsset>,
    pub positions: Vec<CmAccountPosition>,
}

/// Leverage after a change; UM reports a notional cap, CM a quantity cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageChange {
    pub symbol: String,
    pub leverage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_notional_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<String>,
}

/// Plain `{"code","msg"}` acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    pub code: i64,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenKey {
    #[serde(rename = "listenKey")]
    pub listen_key: String,
}

/// Order counters reported in response headers of order placement calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRateLimit {
    #[serde(rename = "rateLimitOrder10s", skip_serializing_if = "Option::is_none")]
    pub order_count_10s: Option<String>,
    #[serde(rename = "rateLimitOrder1m", skip_serializing_if = "Option::is_none")]
    pub order_count_1m: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UmOrderResponse {
    pub client_order_id: String,
    #[serde(rename = "cumQty", default)]
    pub cum_quantity: String,
    #[serde(default)]
    pub cum_quote: String,
    #[serde(rename = "executedQty", default)]
    pub executed_quantity: String,
    pub order_id: i64,
    #[serde(default)]
    pub avg_price: String,
    #[serde(rename = "origQty", default)]
    pub orig_quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub reduce_only: bool,
    pub side: SideType,
    pub position_side: PositionSide,
    pub status: OrderStatus,
    pub symbol: String,
    pub time_in_force: TimeInForce,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    #[serde(default)]
    pub good_till_date: i64,
    #[serde(default)]
    pub price_match: String,
    #[serde(default)]
    pub update_time: i64,
    #[serde(flatten)]
    pub rate_limit: OrderRateLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmOrderResponse {
    pub client_order_id: String,
    #[serde(rename = "cumQty", default)]
    pub cum_quantity: String,
    #[serde(default)]
    pub cum_base: String,
    #[serde(rename = "executedQty", default)]
    pub executed_quantity: String,
    pub order_id: i64,
    #[serde(default)]
    pub avg_price: String,
    #[serde(rename = "origQty", default)]
    pub orig_quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub reduce_only: bool,
    pub side: SideType,
    pub position_side: PositionSide,
    pub status: OrderStatus,
    pub symbol: String,
    #[serde(default)]
    pub pair: String,
    pub time_in_force: TimeInForce,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub update_time: i64,
    #[serde(flatten)]
    pub rate_limit: OrderRateLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UmCancelOrderResponse {
    #[serde(default)]
    pub avg_price: String,
    pub client_order_id: String,
    #[serde(rename = "cumQty", default)]
    pub cum_quantity: String,
    #[serde(default)]
    pub cum_quote: String,
    #[serde(rename = "executedQty", default)]
    pub executed_quantity: String,
    pub order_id: i64,
    #[serde(rename = "origQty", default)]
    pub orig_quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub reduce_only: bool,
    pub side: SideType,
    pub position_side: PositionSide,
    pub status: OrderStatus,
    pub symbol: String,
    pub time_in_force: TimeInForce,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default)]
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    #[serde(default)]
    pub good_till_date: i64,
    #[serde(default)]
    pub price_match: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmCancelOrderResponse {
    #[serde(default)]
    pub avg_price: String,
    pub client_order_id: String,
    #[serde(rename = "cumQty", default)]
    pub cum_quantity: String,
    #[serde(default)]
    pub cum_base: String,
    #[serde(rename = "executedQty", default)]
    pub executed_quantity: String,
    pub order_id: i64,
    #[serde(rename = "origQty", default)]
    pub orig_quantity: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub reduce_only: bool,
    pub side: SideType,
    pub position_side: PositionSide,
    pub status: OrderStatus,
    pub symbol: String,
    #[serde(default)]
    pub pair: String,
    pub time_in_force: TimeInForce,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub update_time: i64,
}

// ---------------------------------------------------------------------------
// User data stream payloads
// ---------------------------------------------------------------------------

/// Nested `"a"` object of `ACCOUNT_UPDATE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsAccountUpdate {
    #[serde(rename = "m")]
    pub reason: UserDataEventReason,
    #[serde(rename = "B", default)]
    pub balances: Vec<WsBalance>,
    #[serde(rename = "P", default)]
    pub positions: Vec<WsPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WsBalance {
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "wb")]
    pub wallet_balance: String,
    #[serde(rename = "cw")]
    pub cross_wallet_balance: String,
    #[serde(rename = "bc", default)]
    pub balance_change: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsPosition {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "pa")]
    pub amount: String,
    #[serde(rename = "ep")]
    pub entry_price: String,
    #[serde(rename = "cr", default)]
    pub accumulated_realized: String,
    #[serde(rename = "up")]
    pub unrealized_pnl: String,
    #[serde(rename = "ps")]
    pub side: PositionSide,
}

/// Nested `"o"` object of `ORDER_TRADE_UPDATE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsOrderTradeUpdate {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "c")]
    pub client_order_id: String,
    #[serde(rename = "S")]
    pub side: SideType,
    #[serde(rename = "o")]
    pub order_type: OrderType,
    #[serde(rename = "f")]
    pub time_in_force: TimeInForce,
    #[serde(rename = "q")]
    pub original_qty: String,
    #[serde(rename = "p")]
    pub original_price: String,
    #[serde(rename = "ap", default)]
    pub average_price: String,
    /// Ignore for `TRAILING_STOP_MARKET` orders
    #[serde(rename = "sp", default)]
    pub stop_price: String,
    #[serde(rename = "x")]
    pub execution_type: OrderExecutionType,
    #[serde(rename = "X")]
    pub status: OrderStatus,
    #[serde(rename = "i")]
    pub order_id: i64,
    #[serde(rename = "l", default)]
    pub last_filled_qty: String,
    #[serde(rename = "z", default)]
    pub accumulated_filled_qty: String,
    #[serde(rename = "L", default)]
    pub last_filled_price: String,
    /// Only pushed when a commission was charged
    #[serde(rename = "N", default)]
    pub commission_asset: Option<String>,
    #[serde(rename = "n", default)]
    pub commission: Option<String>,
    #[serde(rename = "T", default)]
    pub trade_time: i64,
    #[serde(rename = "t", default)]
    pub trade_id: i64,
    #[serde(rename = "b", default)]
    pub bids_notional: String,
    #[serde(rename = "a", default)]
    pub asks_notional: String,
    #[serde(rename = "m", default)]
    pub is_maker: bool,
    #[serde(rename = "R", default)]
    pub is_reduce_only: bool,
    #[serde(rename = "ps")]
    pub position_side: PositionSide,
    #[serde(rename = "rp", default)]
    pub realized_pnl: String,
    /// Conditional orders only
    #[serde(rename = "st", default)]
    pub strategy_type: Option<String>,
    #[serde(rename = "si", default)]
    pub strategy_id: Option<i64>,
    #[serde(rename = "V", default)]
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    /// Auto-cancel time of a GTD order
    #[serde(rename = "gtd", default)]
    pub good_till_date: i64,
}

/// Margin account snapshot carried by `outboundAccountPosition`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsOutboundAccountPosition {
    #[serde(rename = "E", default)]
    pub time: i64,
    #[serde(rename = "u", default)]
    pub last_update_time: i64,
    #[serde(rename = "U", default)]
    pub update_id: i64,
    #[serde(rename = "B", default)]
    pub balances: Vec<WsBalanceSimple>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WsBalanceSimple {
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "f")]
    pub free: String,
    #[serde(rename = "l")]
    pub locked: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(OrderType::TrailingStopMarket.as_str(), "TRAILING_STOP_MARKET");
        assert_eq!(
            serde_json::to_string(&OrderType::TakeProfitMarket).unwrap(),
            "\"TAKE_PROFIT_MARKET\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"NEW_ADL\"").unwrap(),
            OrderStatus::NewAdl
        );
        assert_eq!(
            serde_json::from_str::<BusinessUnit>("\"CM\"").unwrap(),
            BusinessUnit::Cm
        );
        assert_eq!(UserDataEventType::OutboundAccountPosition.to_string(), "outboundAccountPosition");
    }

    #[test]
    fn test_event_type_lookup_is_exact() {
        assert_eq!(
            UserDataEventType::from_wire("outboundAccountPosition"),
            Some(UserDataEventType::OutboundAccountPosition)
        );
        assert_eq!(UserDataEventType::from_wire("outboundAccountPosition "), None);
        assert_eq!(UserDataEventType::from_wire("MARGIN_CALL"), None);
    }

    #[test]
    fn test_unknown_reason_is_preserved() {
        let reason: UserDataEventReason = serde_json::from_str("\"COIN_SWAP_DEPOSIT\"").unwrap();
        assert_eq!(reason, UserDataEventReason::Other("COIN_SWAP_DEPOSIT".to_string()));
        assert_eq!(serde_json::to_string(&reason).unwrap(), "\"COIN_SWAP_DEPOSIT\"");

        let reason: UserDataEventReason = serde_json::from_str("\"FUNDING_FEE\"").unwrap();
        assert_eq!(reason, UserDataEventReason::FundingFee);
    }

    #[test]
    fn test_order_enums_keep_unlisted_values() {
        let tif: TimeInForce = serde_json::from_str("\"GTE_GTC\"").unwrap();
        assert_eq!(tif, TimeInForce::GteGtc);

        let order_type: OrderType = serde_json::from_str("\"LIQUIDATION\"").unwrap();
        assert_eq!(order_type, OrderType::Liquidation);

        let order_type: OrderType = serde_json::from_str("\"ADL\"").unwrap();
        assert_eq!(order_type, OrderType::Other("ADL".to_string()));
        assert_eq!(serde_json::to_string(&order_type).unwrap(), "\"ADL\"");

        let status: OrderStatus = serde_json::from_str("\"PENDING_NEW\"").unwrap();
        assert_eq!(status.to_string(), "PENDING_NEW");
        assert_eq!(OrderStatus::PartiallyFilled.to_string(), "PARTIALLY_FILLED");
        assert_eq!(OrderExecutionType::Calculated.to_string(), "CALCULATED");
    }

    #[test]
    fn test_close_position_order_response() {
        let json = r#"{
            "clientOrderId":"tpsl","orderId":1917641,"side":"SELL","positionSide":"BOTH",
            "status":"NEW","symbol":"BTCUSDT","timeInForce":"GTE_GTC","type":"TAKE_PROFIT_MARKET",
            "updateTime":1566818724722
        }"#;
        let order: UmOrderResponse = serde_json::from_str(json).unwrap();

        assert_eq!(order.time_in_force, TimeInForce::GteGtc);
        assert_eq!(order.order_type, OrderType::TakeProfitMarket);
    }

    #[test]
    fn test_balance_tolerates_missing_fields() {
        let json = r#"[{"asset":"USDT","totalWalletBalance":"122607.35137903","umUnrealizedPNL":"23.72469206","cmUnrealizedPNL":"","updateTime":1617939110373}]"#;
        let balances: Vec<Balance> = serde_json::from_str(json).unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "USDT");
        assert_eq!(balances[0].um_unrealized_pnl, "23.72469206");
        assert_eq!(balances[0].cross_margin_free, "");
        assert_eq!(balances[0].update_time, 1_617_939_110_373);
    }

    #[test]
    fn test_account_uses_exchange_field_names() {
        let json = r#"{"uniMMR":"5167.92171923","accountEquity":"73.47428058","accountStatus":"NORMAL","updateTime":1657707212154}"#;
        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(account.uni_mmr, "5167.92171923");
        assert_eq!(account.account_status, "NORMAL");
    }

    #[test]
    fn test_um_order_response() {
        let json = r#"{
            "clientOrderId":"testOrder","cumQty":"0","cumQuote":"0","executedQty":"0",
            "orderId":22542179,"avgPrice":"0.00000","origQty":"10","price":"0",
            "reduceOnly":false,"side":"BUY","positionSide":"SHORT","status":"NEW",
            "symbol":"BTCUSDT","timeInForce":"GTD","type":"MARKET",
            "selfTradePreventionMode":"NONE","goodTillDate":1693207680000,
            "updateTime":1566818724722,"priceMatch":"NONE"
        }"#;
        let order: UmOrderResponse = serde_json::from_str(json).unwrap();

        assert_eq!(order.order_id, 22_542_179);
        assert_eq!(order.time_in_force, TimeInForce::Gtd);
        assert_eq!(order.position_side, PositionSide::Short);
        assert_eq!(
            order.self_trade_prevention_mode,
            Some(SelfTradePreventionMode::None)
        );
        assert_eq!(order.rate_limit, OrderRateLimit::default());
    }

    #[test]
    fn test_leverage_change_um_and_cm_shapes() {
        let um: LeverageChange = serde_json::from_str(
            r#"{"leverage":21,"maxNotionalValue":"1000000","symbol":"BTCUSDT"}"#,
        )
        .unwrap();
        assert_eq!(um.max_notional_value.as_deref(), Some("1000000"));
        assert!(um.max_qty.is_none());

        let cm: LeverageChange =
            serde_json::from_str(r#"{"leverage":21,"maxQty":"1000","symbol":"BTCUSD_200925"}"#)
                .unwrap();
        assert_eq!(cm.max_qty.as_deref(), Some("1000"));
    }
}
