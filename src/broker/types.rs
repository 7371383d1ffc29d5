use anyhow::Result;
use serde::{Deserialize, Serialize};

/// In-flight message envelope carried by the durable queue.
///
/// This structure is serialized to JSON and held by the queue between the
/// ingestion path and the persistence worker. It is identity-less: the store
/// assigns an id only when the worker commits the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageEnvelope {
    /// Sender identifier
    pub sender_id: String,

    /// Receiver identifier
    pub receiver_id: String,

    /// Opaque message text
    pub content: String,
}

impl MessageEnvelope {
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            content: content.into(),
        }
    }

    /// Validate envelope structure
    pub fn validate(&self) -> Result<()> {
        if self.sender_id.is_empty() {
            anyhow::bail!("sender_id is required");
        }
        if self.receiver_id.is_empty() {
            anyhow::bail!("receiver_id is required");
        }
        if self.content.is_empty() {
            anyhow::bail!("content is required");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_format() {
        let envelope = MessageEnvelope::new("u1", "u2", "hi");
        let json = serde_json::to_string(&envelope).unwrap();

        assert!(json.contains(r#""sender_id":"u1""#));
        assert!(json.contains(r#""receiver_id":"u2""#));
        assert!(json.contains(r#""content":"hi""#));

        let decoded: MessageEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_envelope_validation() {
        let valid = MessageEnvelope::new("u1", "u2", "hi");
        assert!(valid.validate().is_ok());

        let mut invalid = valid.clone();
        invalid.sender_id = String::new();
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.receiver_id = String::new();
        assert!(invalid.validate().is_err());

        let mut invalid = valid;
        invalid.content = String::new();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_malformed_payload_fails_decode() {
        let result = serde_json::from_slice::<MessageEnvelope>(b"not json at all");
        assert!(result.is_err());
    }
}
