use papix::core::traits::{AccountInfo, UserDataSource};
use papix::{build_connector, ExchangeConfig, UserDataPayload};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // PAPI_API_KEY / PAPI_SECRET_KEY, optionally from .env
    let config = ExchangeConfig::from_env_file("PAPI")?;
    let connector = build_connector(config)?;

    match connector.get_balances(None).await {
        Ok(balances) => {
            for balance in balances.iter().filter(|b| b.total_wallet_balance != "0") {
                info!(
                    asset = %balance.asset,
                    wallet = %balance.total_wallet_balance,
                    "Balance"
                );
            }
        }
        Err(e) => warn!("Error fetching balances: {}", e),
    }

    let listen_key = connector.start_user_stream().await?;
    let handle = connector
        .serve_user_data(
            &listen_key,
            |event| {
                match &event.payload {
                    UserDataPayload::OrderTradeUpdate(order) => info!(
                        symbol = %order.symbol,
                        status = %order.status,
                        business_unit = ?event.business_unit,
                        "Order update"
                    ),
                    UserDataPayload::ListenKeyExpired => warn!("Listen key expired"),
                    other => info!(event = ?other, "User data event"),
                }
                Ok(())
            },
            |err| error!("User data stream error: {}", err),
        )
        .await?;

    info!("Streaming user data, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    handle.stop();
    handle.done().await;
    connector.close_user_stream().await?;

    Ok(())
}
