//! Mailbox abstraction and gateway implementation

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use aorelay_proto::{DryrunQuery, DryrunReply, PendingRequest, ResponsePayload, Tag};

use crate::error::TransportError;
use crate::wallet::WalletIdentity;

/// Capability interface to the remote process mailbox
///
/// Pure I/O boundary: no retry, backoff or circuit breaking here.
/// Callers decide what a failure means.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Read the requests currently awaiting a response
    async fn fetch_pending(&self) -> Result<Vec<PendingRequest>, TransportError>;

    /// Submit a completion to the mailbox as a signed write
    async fn submit_response(&self, response: &ResponsePayload) -> Result<(), TransportError>;
}

/// Gateway endpoints and addressing
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    /// Address of the mailbox process
    pub process_id: String,
    /// Compute-unit endpoint serving dry-run queries
    pub cu_url: String,
    /// Messenger-unit endpoint accepting signed writes
    pub mu_url: String,
    /// Hard cap on a single gateway call
    pub request_timeout: Duration,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            process_id: String::new(),
            cu_url: "https://cu.ao-testnet.xyz".to_string(),
            mu_url: "https://mu.ao-testnet.xyz".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP mailbox client speaking to an AO-style gateway pair
///
/// Reads go to the compute unit as unsigned dry-run queries; writes go
/// to the messenger unit signed by the wallet identity.
pub struct GatewayMailbox {
    client: Client,
    config: MailboxConfig,
    identity: Arc<WalletIdentity>,
}

impl GatewayMailbox {
    /// Create a gateway client for the configured process
    pub fn new(
        config: MailboxConfig,
        identity: Arc<WalletIdentity>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            client,
            config,
            identity,
        })
    }

    fn dryrun_url(&self) -> String {
        format!(
            "{}/dry-run?process-id={}",
            self.config.cu_url.trim_end_matches('/'),
            self.config.process_id
        )
    }

    fn message_url(&self) -> String {
        format!("{}/message", self.config.mu_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Mailbox for GatewayMailbox {
    async fn fetch_pending(&self) -> Result<Vec<PendingRequest>, TransportError> {
        let query = DryrunQuery::fetch_pending(&self.config.process_id);

        let response = self
            .client
            .post(self.dryrun_url())
            .json(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { code, message });
        }

        let reply: DryrunReply = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        let pending = reply.pending_requests()?;
        debug!(count = pending.len(), "Fetched pending requests");
        Ok(pending)
    }

    async fn submit_response(&self, response: &ResponsePayload) -> Result<(), TransportError> {
        let data = response.to_json()?;
        let envelope = self
            .identity
            .seal(&self.config.process_id, vec![Tag::response()], data);

        let reply = self
            .client
            .post(self.message_url())
            .json(&envelope)
            .send()
            .await?;

        if !reply.status().is_success() {
            let code = reply.status().as_u16();
            let message = reply.text().await.unwrap_or_default();
            return Err(TransportError::Status { code, message });
        }

        debug!(msg_id = %response.msg_id, "Submitted response");
        Ok(())
    }
}
