use crate::core::errors::ExchangeError;
use crate::core::kernel::WsCodec;
use crate::portfolio::types::{
    BusinessUnit, UserDataEventType, WsAccountUpdate, WsOrderTradeUpdate,
    WsOutboundAccountPosition,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

/// One decoded frame of the user data stream
#[derive(Debug, Clone, PartialEq)]
pub struct WsUserDataEvent {
    /// Event time `E`
    pub event_time: i64,
    /// Transaction time `T`, absent on some event kinds
    pub transaction_time: Option<i64>,
    /// Business unit `fs`
    pub business_unit: Option<BusinessUnit>,
    pub payload: UserDataPayload,
}

impl WsUserDataEvent {
    pub fn event_type(&self) -> UserDataEventType {
        self.payload.event_type()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserDataPayload {
    AccountUpdate(WsAccountUpdate),
    OrderTradeUpdate(WsOrderTradeUpdate),
    OutboundAccountPosition(WsOutboundAccountPosition),
    BalanceUpdate,
    ListenKeyExpired,
}

impl UserDataPayload {
    pub fn event_type(&self) -> UserDataEventType {
        match self {
            Self::AccountUpdate(_) => UserDataEventType::AccountUpdate,
            Self::OrderTradeUpdate(_) => UserDataEventType::OrderTradeUpdate,
            Self::OutboundAccountPosition(_) => UserDataEventType::OutboundAccountPosition,
            Self::BalanceUpdate => UserDataEventType::BalanceUpdate,
            Self::ListenKeyExpired => UserDataEventType::ListenKeyExpired,
        }
    }
}

/// Decode one user data frame, dispatching on the `e` discriminator.
pub fn decode_user_data_event(raw: &[u8]) -> Result<WsUserDataEvent, ExchangeError> {
    let mut value: Value = serde_json::from_slice(raw)?;

    let name = value.get("e").and_then(Value::as_str).unwrap_or_default();
    let event_type = UserDataEventType::from_wire(name)
        .ok_or_else(|| ExchangeError::UnrecognizedEvent(name.to_string()))?;

    let event_time = value.get("E").and_then(Value::as_i64).unwrap_or_default();
    let transaction_time = value.get("T").and_then(Value::as_i64);
    let business_unit = value
        .get("fs")
        .and_then(|fs| serde_json::from_value(fs.clone()).ok());

    let payload = match event_type {
        UserDataEventType::OutboundAccountPosition => {
            UserDataPayload::OutboundAccountPosition(serde_json::from_value(value)?)
        }
        UserDataEventType::BalanceUpdate => UserDataPayload::BalanceUpdate,
        UserDataEventType::ListenKeyExpired => UserDataPayload::ListenKeyExpired,
        UserDataEventType::AccountUpdate => {
            UserDataPayload::AccountUpdate(take_nested(&mut value, "a")?)
        }
        UserDataEventType::OrderTradeUpdate => {
            UserDataPayload::OrderTradeUpdate(take_nested(&mut value, "o")?)
        }
    };

    Ok(WsUserDataEvent {
        event_time,
        transaction_time,
        business_unit,
        payload,
    })
}

fn take_nested<T: DeserializeOwned>(value: &mut Value, key: &str) -> Result<T, ExchangeError> {
    let nested = value.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    Ok(serde_json::from_value(nested)?)
}

/// Codec for the portfolio margin user data stream
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDataCodec;

impl WsCodec for UserDataCodec {
    type Message = WsUserDataEvent;

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        match message {
            Message::Text(text) => decode_user_data_event(text.as_bytes()).map(Some),
            Message::Binary(bytes) => decode_user_data_event(&bytes).map(Some),
            _ => Ok(None),
        }
    }
}
