//! End-to-end relay flow against scripted collaborators

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aorelay::{Relay, RelayConfig};
use aorelay_llm::{InferenceClient, InferenceError};
use aorelay_mailbox::{Mailbox, TransportError};
use aorelay_proto::{PendingRequest, ResponsePayload};

/// Cloneable mailbox handle over shared scripted state, so the test can
/// keep inspecting it after the relay takes ownership of its clone.
#[derive(Default, Clone)]
struct SharedMailbox {
    batches: Arc<Mutex<VecDeque<Result<Vec<PendingRequest>, TransportError>>>>,
    submitted: Arc<Mutex<Vec<ResponsePayload>>>,
}

impl SharedMailbox {
    fn push_batch(&self, requests: &[(&str, &str)]) {
        let batch = requests
            .iter()
            .map(|(id, content)| PendingRequest {
                msg_id: id.to_string(),
                content: content.to_string(),
            })
            .collect();
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    fn push_fetch_error(&self) {
        self.batches
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Http("gateway unreachable".to_string())));
    }

    fn submitted(&self) -> Vec<ResponsePayload> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailbox for SharedMailbox {
    async fn fetch_pending(&self) -> Result<Vec<PendingRequest>, TransportError> {
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_response(&self, response: &ResponsePayload) -> Result<(), TransportError> {
        self.submitted.lock().unwrap().push(response.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
struct SharedInference {
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl InferenceClient for SharedInference {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        Ok(format!("answer to {}", prompt))
    }
}

fn relay_under_test(
    mailbox: &SharedMailbox,
    inference: &SharedInference,
) -> Relay<SharedMailbox, SharedInference> {
    Relay::new(
        mailbox.clone(),
        inference.clone(),
        RelayConfig {
            poll_interval: Duration::from_secs(5),
            ..RelayConfig::default()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn relay_answers_each_request_exactly_once() {
    let mailbox = SharedMailbox::default();
    let inference = SharedInference::default();

    // Cycle 1: two fresh requests. Cycle 2: transient gateway outage.
    // Cycle 3: one duplicate and one new request. Then an empty queue.
    mailbox.push_batch(&[("x", "first"), ("y", "second")]);
    mailbox.push_fetch_error();
    mailbox.push_batch(&[("x", "first"), ("z", "third")]);

    let mut relay = relay_under_test(&mailbox, &inference);
    let shutdown = relay.shutdown_sender().unwrap();
    let task = tokio::spawn(async move { relay.run().await });

    // Four poll periods of virtual time cover all scripted cycles
    tokio::time::sleep(Duration::from_secs(21)).await;

    shutdown.send(()).unwrap();
    task.await.unwrap().unwrap();

    let mut calls = inference.calls.lock().unwrap().clone();
    calls.sort();
    assert_eq!(calls, vec!["first", "second", "third"]);

    let submitted = mailbox.submitted();
    assert_eq!(submitted.len(), 3);
    for (id, content) in [
        ("x", "answer to first"),
        ("y", "answer to second"),
        ("z", "answer to third"),
    ] {
        assert!(
            submitted.iter().any(|r| r.msg_id == id && r.content == content),
            "missing submission for {}",
            id
        );
    }
}

#[tokio::test(start_paused = true)]
async fn relay_idles_on_an_empty_queue() {
    let mailbox = SharedMailbox::default();
    let inference = SharedInference::default();

    let mut relay = relay_under_test(&mailbox, &inference);
    let shutdown = relay.shutdown_sender().unwrap();
    let task = tokio::spawn(async move { relay.run().await });

    tokio::time::sleep(Duration::from_secs(16)).await;

    shutdown.send(()).unwrap();
    task.await.unwrap().unwrap();

    assert!(inference.calls.lock().unwrap().is_empty());
    assert!(mailbox.submitted().is_empty());
}
