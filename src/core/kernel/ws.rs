use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::WsCodec;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info_span, instrument, warn, Instrument};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket session configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Send pings and drop the connection when the peer stops answering
    pub keepalive: bool,
    pub keepalive_interval: Duration,
    pub connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            keepalive: true,
            keepalive_interval: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConfig {
    pub fn with_keepalive(mut self, enabled: bool, interval: Duration) -> Self {
        self.keepalive = enabled;
        self.keepalive_interval = interval;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Tungstenite-based streaming session for one endpoint.
///
/// There is no reconnection: once the connection fails or closes the session
/// signals done and the caller decides whether to serve again.
pub struct WsSession<C: WsCodec> {
    url: String,
    exchange_name: String,
    codec: C,
    config: WsConfig,
}

impl<C: WsCodec> WsSession<C> {
    pub fn new(url: impl Into<String>, exchange_name: impl Into<String>, codec: C) -> Self {
        Self {
            url: url.into(),
            exchange_name: exchange_name.into(),
            codec,
            config: WsConfig::default(),
        }
    }

    /// Set custom WebSocket configuration
    pub fn with_config(mut self, config: WsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect and start delivering decoded messages.
    ///
    /// Returns once the connection is established. `handler` sees messages in
    /// arrival order; decode failures and handler failures go to
    /// `err_handler` and the session keeps running. A connection failure ends
    /// the session and is reported to `err_handler` unless stop was requested.
    #[instrument(skip(self, handler, err_handler), fields(exchange = %self.exchange_name, url = %self.url))]
    pub async fn serve<H, E>(self, handler: H, err_handler: E) -> Result<WsHandle, ExchangeError>
    where
        H: FnMut(C::Message) -> Result<(), ExchangeError> + Send + 'static,
        E: FnMut(ExchangeError) + Send + 'static,
    {
        let (stream, _) = tokio::time::timeout(self.config.connect_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| {
                ExchangeError::WebSocketError(format!("Connection to {} timed out", self.url))
            })?
            .map_err(|e| ExchangeError::WebSocketError(format!("WebSocket connection failed: {}", e)))?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        let handle = WsHandle {
            stop_tx: Arc::new(stop_tx),
            done_rx,
        };

        let span = info_span!("ws_session", exchange = %self.exchange_name);
        tokio::spawn(
            run_session(
                stream,
                self.codec,
                self.config,
                stop_rx,
                done_tx,
                handler,
                err_handler,
            )
            .instrument(span),
        );

        Ok(handle)
    }
}

/// Control handle for a running session.
///
/// Dropping every handle does not stop the session.
#[derive(Debug, Clone)]
pub struct WsHandle {
    stop_tx: Arc<watch::Sender<bool>>,
    done_rx: watch::Receiver<bool>,
}

impl WsHandle {
    /// Ask the session to close. Safe to call repeatedly or after it ended.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Wait until the session has fully shut down
    pub async fn done(&self) {
        let mut done_rx = self.done_rx.clone();
        let _ = done_rx.wait_for(|done| *done).await;
    }

    pub fn is_done(&self) -> bool {
        *self.done_rx.borrow()
    }
}

async fn run_session<C, H, E>(
    stream: WsStream,
    codec: C,
    config: WsConfig,
    stop_rx: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
    mut handler: H,
    mut err_handler: E,
) where
    C: WsCodec,
    H: FnMut(C::Message) -> Result<(), ExchangeError> + Send,
    E: FnMut(ExchangeError) + Send,
{
    let (writer, reader) = stream.split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let activity = Activity::new();

    let outcome = tokio::select! {
        result = send_loop(writer, outbound_rx, &config, stop_rx.clone(), &activity) => result,
        result = receive_loop(reader, &codec, outbound_tx, &activity, &mut handler, &mut err_handler) => result,
    };

    let stopped = *stop_rx.borrow();
    match outcome {
        Err(e) if !stopped => {
            error!(error = %e, "WebSocket session ended");
            err_handler(e);
        }
        Err(e) => debug!(error = %e, "WebSocket session ended after stop"),
        Ok(()) => debug!("WebSocket session stopped"),
    }

    done_tx.send_replace(true);
}

/// Time of the last inbound frame, in milliseconds since the session started
struct Activity {
    started: Instant,
    last_seen_ms: AtomicU64,
}

impl Activity {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn touch(&self) {
        self.last_seen_ms.store(self.now_ms(), Ordering::Release);
    }

    fn silent_for(&self) -> Duration {
        let last = self.last_seen_ms.load(Ordering::Acquire);
        Duration::from_millis(self.now_ms().saturating_sub(last))
    }
}

// Sole owner of the write half. Pings once per keepalive tick (the first one
// interval after connecting), forwards
// queued frames, and sends Close once stop is requested.
async fn send_loop(
    mut writer: SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    config: &WsConfig,
    mut stop_rx: watch::Receiver<bool>,
    activity: &Activity,
) -> Result<(), ExchangeError> {
    let period = config.keepalive_interval;
    let mut keepalive = config
        .keepalive
        .then(|| tokio::time::interval_at(Instant::now() + period, period));

    loop {
        tokio::select! {
            () = wait_for_stop(&mut stop_rx) => {
                if let Err(e) = writer.send(Message::Close(None)).await {
                    debug!(error = %e, "Failed to send close frame");
                }
                return Ok(());
            }
            Some(message) = outbound.recv() => {
                writer.send(message).await.map_err(write_error)?;
            }
            () = next_tick(&mut keepalive) => {
                let silent_for = activity.silent_for();
                if silent_for > period * 2 {
                    return Err(ExchangeError::WebSocketError(format!(
                        "No response from peer for {} ms",
                        silent_for.as_millis()
                    )));
                }
                writer.send(Message::Ping(Vec::new())).await.map_err(write_error)?;
            }
        }
    }
}

async fn receive_loop<C, H, E>(
    mut reader: SplitStream<WsStream>,
    codec: &C,
    outbound: mpsc::UnboundedSender<Message>,
    activity: &Activity,
    handler: &mut H,
    err_handler: &mut E,
) -> Result<(), ExchangeError>
where
    C: WsCodec,
    H: FnMut(C::Message) -> Result<(), ExchangeError> + Send,
    E: FnMut(ExchangeError) + Send,
{
    while let Some(frame) = reader.next().await {
        let message = frame
            .map_err(|e| ExchangeError::WebSocketError(format!("WebSocket read failed: {}", e)))?;
        activity.touch();

        match message {
            Message::Ping(payload) => {
                if outbound.send(Message::Pong(payload)).is_err() {
                    warn!("Dropped pong reply, writer has shut down");
                }
            }
            Message::Pong(_) => {}
            Message::Close(frame) => {
                return Err(ExchangeError::WebSocketError(format!(
                    "Connection closed by peer: {:?}",
                    frame
                )));
            }
            message => match codec.decode_message(message) {
                Ok(Some(decoded)) => {
                    if let Err(e) = handler(decoded) {
                        err_handler(e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to decode message");
                    err_handler(e);
                }
            },
        }
    }

    Err(ExchangeError::WebSocketError(
        "Connection closed".to_string(),
    ))
}

async fn wait_for_stop(stop_rx: &mut watch::Receiver<bool>) {
    let requested = stop_rx.wait_for(|stop| *stop).await.is_ok();
    if !requested {
        // every handle is gone; nobody can ask for a stop any more
        std::future::pending::<()>().await;
    }
}

async fn next_tick(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn write_error(e: tokio_tungstenite::tungstenite::Error) -> ExchangeError {
    ExchangeError::WebSocketError(format!("Failed to send WebSocket message: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WsConfig::default();
        assert!(config.keepalive);
        assert_eq!(config.keepalive_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builders() {
        let config = WsConfig::default()
            .with_keepalive(false, Duration::from_millis(250))
            .with_connect_timeout(Duration::from_secs(1));
        assert!(!config.keepalive);
        assert_eq!(config.keepalive_interval, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_handle_stop_is_idempotent_and_done_fires_once() {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        let handle = WsHandle {
            stop_tx: Arc::new(stop_tx),
            done_rx,
        };

        handle.stop();
        handle.stop();
        assert!(*stop_rx.borrow_and_update());
        assert!(!handle.is_done());

        done_tx.send_replace(true);
        handle.done().await;
        handle.clone().done().await;
        assert!(handle.is_done());
        handle.stop();
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        struct Null;
        impl WsCodec for Null {
            type Message = ();
            fn decode_message(&self, _: Message) -> Result<Option<()>, ExchangeError> {
                Ok(None)
            }
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let session = WsSession::new(format!("ws://{}/ws/none", addr), "test", Null);
        let result = session.serve(|()| Ok(()), |_| {}).await;
        assert!(matches!(result, Err(ExchangeError::WebSocketError(_))));
    }
}
