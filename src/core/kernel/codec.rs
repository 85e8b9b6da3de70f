use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for turning raw WebSocket frames into typed messages
///
/// Control frames (ping, pong, close) never reach the codec; they are handled
/// by the session.
pub trait WsCodec: Send + Sync + 'static {
    /// The type representing parsed messages from this stream
    type Message: Send + 'static;

    /// Decode a raw WebSocket message into a typed message
    ///
    /// # Returns
    /// - `Ok(Some(message))` - Successfully decoded message
    /// - `Ok(None)` - Message was ignored by codec
    /// - `Err(error)` - Failed to decode message
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError>;
}
