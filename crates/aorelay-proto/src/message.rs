//! Mailbox message types and payload parsing

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Action tag value for reading the pending-request queue
pub const ACTION_FETCH_PENDING: &str = "FetchPending";

/// Action tag value for submitting a completion
pub const ACTION_RESPONSE: &str = "Response";

/// Name/value tag attached to every mailbox interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Tag value
    pub value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `Action` tag selecting the pending-request query
    pub fn fetch_pending() -> Self {
        Self::new("Action", ACTION_FETCH_PENDING)
    }

    /// `Action` tag marking an outgoing completion
    pub fn response() -> Self {
        Self::new("Action", ACTION_RESPONSE)
    }
}

/// A request enqueued by an external actor, awaiting a completion
///
/// Produced by the remote mailbox and read-only on this side. The
/// identifier is minted by the mailbox and is unique and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Mailbox-assigned request identifier
    #[serde(rename = "msgId")]
    pub msg_id: String,
    /// Prompt text supplied by the requester
    pub content: String,
}

/// A completion correlated back to its originating request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// Completion text
    pub content: String,
    /// Identifier of the request this completion answers
    #[serde(rename = "msgId")]
    pub msg_id: String,
}

impl ResponsePayload {
    /// Create a completion payload for the given request identifier
    pub fn new(content: impl Into<String>, msg_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            msg_id: msg_id.into(),
        }
    }

    /// Serialize the payload for the mailbox `data` field
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Unsigned read-only query evaluated against the mailbox process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryrunQuery {
    /// Address of the mailbox process
    pub process: String,
    /// Tags describing the interaction
    pub tags: Vec<Tag>,
    /// Query payload, empty for pending-request reads
    pub data: String,
}

impl DryrunQuery {
    /// Build the pending-request query for a process
    pub fn fetch_pending(process: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            tags: vec![Tag::fetch_pending()],
            data: String::new(),
        }
    }
}

/// A single message record inside a dry-run reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxMessage {
    /// Opaque payload; for pending-request queries this is itself a
    /// JSON-encoded array of [`PendingRequest`] records
    #[serde(rename = "Data")]
    pub data: String,
}

/// Reply envelope of a mailbox dry-run query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryrunReply {
    /// Messages emitted by the process handler for this query
    #[serde(rename = "Messages", default)]
    pub messages: Vec<MailboxMessage>,
}

impl DryrunReply {
    /// Decode the pending-request batch carried in the first message.
    ///
    /// A reply without any messages is an empty queue, not an error.
    pub fn pending_requests(&self) -> Result<Vec<PendingRequest>, ProtocolError> {
        match self.messages.first() {
            Some(message) => Ok(serde_json::from_str(&message.data)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Signed write submitted to the mailbox
///
/// The wire format is owned by the remote system; this side only
/// guarantees that `signature` covers `process`, `tags` and `data`
/// under the key identified by `owner`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Address of the mailbox process
    pub process: String,
    /// Public key of the submitting identity, base64
    pub owner: String,
    /// Tags describing the interaction
    pub tags: Vec<Tag>,
    /// JSON-encoded payload
    pub data: String,
    /// Detached signature over the envelope, base64
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        let fetch = Tag::fetch_pending();
        assert_eq!(fetch.name, "Action");
        assert_eq!(fetch.value, "FetchPending");

        let response = Tag::response();
        assert_eq!(response.name, "Action");
        assert_eq!(response.value, "Response");
    }

    #[test]
    fn test_pending_request_wire_names() {
        let request: PendingRequest =
            serde_json::from_str(r#"{"msgId":"abc","content":"hi"}"#).unwrap();
        assert_eq!(request.msg_id, "abc");
        assert_eq!(request.content, "hi");
    }

    #[test]
    fn test_response_payload_json() {
        let payload = ResponsePayload::new("hello there", "abc");
        let json = payload.to_json().unwrap();
        assert!(json.contains(r#""msgId":"abc""#));
        assert!(json.contains(r#""content":"hello there""#));
    }

    #[test]
    fn test_pending_batch_decoding() {
        let reply: DryrunReply = serde_json::from_str(
            r#"{"Messages":[{"Data":"[{\"msgId\":\"a\",\"content\":\"hi\"},{\"msgId\":\"b\",\"content\":\"yo\"}]"}]}"#,
        )
        .unwrap();

        let requests = reply.pending_requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].msg_id, "a");
        assert_eq!(requests[1].content, "yo");
    }

    #[test]
    fn test_empty_queue_decodes_to_empty_batch() {
        let reply: DryrunReply =
            serde_json::from_str(r#"{"Messages":[{"Data":"[]"}]}"#).unwrap();
        assert!(reply.pending_requests().unwrap().is_empty());

        // A reply with no messages at all also means an empty queue
        let reply: DryrunReply = serde_json::from_str(r#"{"Messages":[]}"#).unwrap();
        assert!(reply.pending_requests().unwrap().is_empty());

        let reply: DryrunReply = serde_json::from_str("{}").unwrap();
        assert!(reply.pending_requests().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_batch_is_an_error() {
        let reply: DryrunReply =
            serde_json::from_str(r#"{"Messages":[{"Data":"not json"}]}"#).unwrap();
        assert!(reply.pending_requests().is_err());
    }
}
