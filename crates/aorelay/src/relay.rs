//! Poll loop and request handling

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, error, info, warn};

use aorelay_llm::InferenceClient;
use aorelay_mailbox::Mailbox;
use aorelay_proto::{PendingRequest, ResponsePayload};

use crate::error::RelayError;
use crate::ledger::Ledger;
use crate::Result;

/// Relay loop configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Period between fetch-and-dispatch cycles
    pub poll_interval: Duration,
    /// Cap on concurrently running request handlers
    pub max_in_flight: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_in_flight: 32,
        }
    }
}

/// Periodic poller dispatching mailbox requests to an inference client
///
/// Each tick starts one fetch-and-dispatch cycle. Cycles are
/// fire-and-forget with respect to the timer: a slow fetch or slow
/// handlers never delay the next tick, so a cycle may overlap handlers
/// spawned by earlier cycles. The ledger is what keeps overlapping
/// cycles from handling the same request twice.
pub struct Relay<M, I> {
    mailbox: Arc<M>,
    inference: Arc<I>,
    ledger: Arc<Ledger>,
    limiter: Arc<Semaphore>,
    config: RelayConfig,
    shutdown_rx: Option<oneshot::Receiver<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl<M, I> Relay<M, I>
where
    M: Mailbox + 'static,
    I: InferenceClient + 'static,
{
    /// Create a relay over the given mailbox and inference client
    pub fn new(mailbox: M, inference: I, config: RelayConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        Self {
            mailbox: Arc::new(mailbox),
            inference: Arc::new(inference),
            ledger: Arc::new(Ledger::new()),
            limiter: Arc::new(Semaphore::new(config.max_in_flight)),
            config,
            shutdown_rx: Some(shutdown_rx),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get shutdown sender for stopping the loop
    ///
    /// Dropping the sender without sending also stops the loop. In-flight
    /// handlers are not cancelled either way; they run to completion.
    pub fn shutdown_sender(&mut self) -> Option<oneshot::Sender<()>> {
        self.shutdown_tx.take()
    }

    /// Ledger of admitted request identifiers
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run the poll loop until shutdown is signalled
    pub async fn run(&mut self) -> Result<()> {
        info!(interval = ?self.config.poll_interval, "Starting relay loop");

        let mut shutdown_rx = self
            .shutdown_rx
            .take()
            .ok_or_else(|| RelayError::State("shutdown receiver already taken".to_string()))?;

        let mut ticker = tokio::time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Received shutdown signal, stopping relay loop");
                    break;
                }

                _ = ticker.tick() => {
                    let mailbox = Arc::clone(&self.mailbox);
                    let inference = Arc::clone(&self.inference);
                    let ledger = Arc::clone(&self.ledger);
                    let limiter = Arc::clone(&self.limiter);

                    tokio::spawn(async move {
                        poll_cycle(mailbox, inference, ledger, limiter).await;
                    });
                }
            }
        }

        info!("Relay loop stopped");
        Ok(())
    }
}

/// One fetch-and-dispatch cycle.
///
/// A fetch failure is logged and swallowed; the next tick gets a fresh
/// attempt. Requests already in the ledger are dropped here, before any
/// handler is spawned.
async fn poll_cycle<M, I>(
    mailbox: Arc<M>,
    inference: Arc<I>,
    ledger: Arc<Ledger>,
    limiter: Arc<Semaphore>,
) where
    M: Mailbox + 'static,
    I: InferenceClient + 'static,
{
    debug!("Running fetch-and-dispatch cycle");

    let pending = match mailbox.fetch_pending().await {
        Ok(pending) => pending,
        Err(e) => {
            warn!("Fetch failed, skipping cycle: {}", e);
            return;
        }
    };

    if pending.is_empty() {
        debug!("No pending requests");
        return;
    }

    for request in pending {
        if !ledger.admit(&request.msg_id) {
            debug!(msg_id = %request.msg_id, "Request already admitted, dropping");
            continue;
        }

        let mailbox = Arc::clone(&mailbox);
        let inference = Arc::clone(&inference);
        let limiter = Arc::clone(&limiter);

        tokio::spawn(async move {
            // The permit is taken inside the task so a full limiter
            // queues handlers without ever stalling the poll loop.
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };
            handle_request(&*mailbox, &*inference, request).await;
        });
    }
}

/// Handle one admitted request: at most one inference call and at most
/// one submission. Neither step is retried; a failure at either step
/// drops the request for good, its identifier stays in the ledger.
async fn handle_request<M, I>(mailbox: &M, inference: &I, request: PendingRequest)
where
    M: Mailbox,
    I: InferenceClient,
{
    info!(msg_id = %request.msg_id, "Handling request");

    let completion = match inference.infer(&request.content).await {
        Ok(completion) => completion,
        Err(e) => {
            error!(msg_id = %request.msg_id, "Inference failed, dropping request: {}", e);
            return;
        }
    };

    let response = ResponsePayload::new(completion, request.msg_id);

    match mailbox.submit_response(&response).await {
        Ok(()) => info!(msg_id = %response.msg_id, "Response submitted"),
        Err(e) => {
            error!(msg_id = %response.msg_id, "Failed to submit response: {}", e);
        }
    }
}
