use crate::core::{
    errors::ExchangeError,
    kernel::{RestClient, WsConfig, WsHandle, WsSession},
    traits::UserDataSource,
};
use crate::portfolio::codec::{UserDataCodec, WsUserDataEvent};
use crate::portfolio::rest::PortfolioRestClient;
use crate::portfolio::EXCHANGE_NAME;
use async_trait::async_trait;
use tracing::{info, instrument};

/// Listen key lifecycle and the user data WebSocket
pub struct UserStreamService<R: RestClient> {
    rest: PortfolioRestClient<R>,
    ws_base_url: String,
    ws_config: WsConfig,
}

impl<R: RestClient> UserStreamService<R> {
    pub fn new(rest: &R, ws_base_url: String, ws_config: WsConfig) -> Self
    where
        R: Clone,
    {
        Self {
            rest: PortfolioRestClient::new(rest.clone()),
            ws_base_url,
            ws_config,
        }
    }

    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    pub fn set_ws_config(&mut self, ws_config: WsConfig) {
        self.ws_config = ws_config;
    }
}

#[async_trait]
impl<R: RestClient> UserDataSource for UserStreamService<R> {
    async fn start_user_stream(&self) -> Result<String, ExchangeError> {
        self.rest.start_user_stream(&[]).await
    }

    async fn keepalive_user_stream(&self) -> Result<(), ExchangeError> {
        self.rest.keepalive_user_stream(&[]).await
    }

    async fn close_user_stream(&self) -> Result<(), ExchangeError> {
        self.rest.close_user_stream(&[]).await
    }

    fn user_data_url(&self, listen_key: &str) -> String {
        format!("{}/{}", self.ws_base_url.trim_end_matches('/'), listen_key)
    }

    #[instrument(skip(self, listen_key, handler, err_handler), fields(exchange = EXCHANGE_NAME))]
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
        if listen_key.is_empty() {
            return Err(ExchangeError::InvalidParameters(
                "listen key must not be empty".to_string(),
            ));
        }

        let session = WsSession::new(self.user_data_url(listen_key), EXCHANGE_NAME, UserDataCodec)
            .with_config(self.ws_config.clone());
        let handle = session.serve(handler, err_handler).await?;
        info!(keepalive = self.ws_config.keepalive, "User data stream connected");
        Ok(handle)
    }
}
