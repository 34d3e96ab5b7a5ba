//! Aorelay Agent Binary
//!
//! The relay daemon that answers process-mailbox requests with local
//! inference.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use aorelay::{Relay, RelayConfig};
use aorelay_llm::{OllamaClient, OllamaConfig};
use aorelay_mailbox::{GatewayMailbox, MailboxConfig, WalletIdentity};

fn env_secs(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{} must be an integer number of seconds", name))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Aorelay agent");

    let process_id =
        std::env::var("AORELAY_PROCESS_ID").context("AORELAY_PROCESS_ID is not set")?;
    let wallet_path = std::env::var("AORELAY_WALLET").context("AORELAY_WALLET is not set")?;

    // Without the signing identity the agent cannot submit anything,
    // so a load failure is fatal before the loop starts.
    let identity = Arc::new(
        WalletIdentity::load(&wallet_path)
            .with_context(|| format!("Failed to load wallet from {}", wallet_path))?,
    );

    let mut mailbox_config = MailboxConfig {
        process_id,
        ..MailboxConfig::default()
    };
    if let Ok(url) = std::env::var("AORELAY_CU_URL") {
        mailbox_config.cu_url = url;
    }
    if let Ok(url) = std::env::var("AORELAY_MU_URL") {
        mailbox_config.mu_url = url;
    }

    let mailbox =
        GatewayMailbox::new(mailbox_config, identity).context("Failed to create mailbox client")?;

    let mut ollama_config = OllamaConfig::from_env();
    if let Some(timeout) = env_secs("AORELAY_INFERENCE_TIMEOUT_SECS")? {
        ollama_config.timeout = timeout;
    }
    let inference =
        OllamaClient::new(ollama_config).context("Failed to create inference client")?;

    let mut relay_config = RelayConfig::default();
    if let Some(interval) = env_secs("AORELAY_POLL_INTERVAL_SECS")? {
        relay_config.poll_interval = interval;
    }

    let mut relay = Relay::new(mailbox, inference, relay_config);
    let shutdown = relay
        .shutdown_sender()
        .context("Shutdown sender already taken")?;

    // Ctrl-c stops the poll loop; in-flight handlers are left to finish
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-c received, shutting down");
            let _ = shutdown.send(());
        }
    });

    if let Err(e) = relay.run().await {
        error!("Relay error: {}", e);
        std::process::exit(1);
    }

    info!("Agent shutting down");
    Ok(())
}
