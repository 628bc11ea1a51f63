//! Message envelopes and their transport form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::signing::{self, MessageSigner, SignatureSpec};

/// Message attribute naming the lifecycle step that sent the message.
pub const LIFECYCLE_ATTRIBUTE: &str = "X-LifeCycle-Event";

/// The resource operation that produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// The resource was created.
    Create,
    /// The resource's message body changed.
    Update,
    /// The resource was destroyed.
    Delete,
}

impl LifecycleEvent {
    /// Attribute value for this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message to send, as described by resource configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope {
    /// Message body.
    pub body: String,
    /// Queue URL or topic ARN.
    pub target: String,
    /// Delivery delay in seconds (queues only).
    pub delay_seconds: Option<i32>,
    /// Present when the body should be signed.
    pub signature: Option<SignatureSpec>,
}

impl MessageEnvelope {
    /// An unsigned envelope with no delay.
    pub fn new(body: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            target: target.into(),
            delay_seconds: None,
            signature: None,
        }
    }

    /// Set the delivery delay.
    pub fn with_delay_seconds(mut self, delay: Option<i32>) -> Self {
        self.delay_seconds = delay;
        self
    }

    /// Sign the body with the given spec.
    pub fn with_signature(mut self, spec: Option<SignatureSpec>) -> Self {
        self.signature = spec;
        self
    }

    /// Build the transport request for `event`.
    ///
    /// Signs first when a signature spec is present. A signing failure
    /// returns before any attribute map exists, so nothing partial can be
    /// sent.
    pub async fn seal(
        self,
        signer: &dyn MessageSigner,
        event: LifecycleEvent,
    ) -> Result<OutboundMessage, ProviderError> {
        let mut attributes = BTreeMap::new();

        if let Some(spec) = &self.signature {
            let signature = signing::sign(signer, &self.body, spec).await?;
            attributes.insert(spec.attribute_name.clone(), signature);
        }

        attributes.insert(LIFECYCLE_ATTRIBUTE.to_string(), event.as_str().to_string());

        Ok(OutboundMessage {
            body: self.body,
            target: self.target,
            delay_seconds: self.delay_seconds,
            attributes,
        })
    }
}

/// A fully-built send request: body plus string attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Message body.
    pub body: String,
    /// Queue URL or topic ARN.
    pub target: String,
    /// Delivery delay in seconds (queues only).
    pub delay_seconds: Option<i32>,
    /// String message attributes, keyed by name.
    pub attributes: BTreeMap<String, String>,
}

impl OutboundMessage {
    /// The lifecycle marker attribute value.
    pub fn lifecycle_event(&self) -> Option<&str> {
        self.attributes.get(LIFECYCLE_ATTRIBUTE).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::DEFAULT_SIGNATURE_ATTRIBUTE;
    use crate::testing::{FailingSigner, StaticSigner};

    const QUEUE: &str = "https://sqs.us-east-2.amazonaws.com/123456789012/TestQueue";

    #[tokio::test]
    async fn test_unsigned_message_carries_only_lifecycle_marker() {
        let signer = StaticSigner::default();
        let message = MessageEnvelope::new("test message 1", QUEUE)
            .seal(&signer, LifecycleEvent::Create)
            .await
            .unwrap();

        assert_eq!(message.body, "test message 1");
        assert_eq!(message.target, QUEUE);
        assert_eq!(message.attributes.len(), 1);
        assert_eq!(message.lifecycle_event(), Some("create"));
        assert!(signer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signed_message_has_signature_attribute() {
        let signer = StaticSigner::new(vec![1, 2, 3]);
        let message = MessageEnvelope::new("test message 1", QUEUE)
            .with_delay_seconds(Some(10))
            .with_signature(Some(SignatureSpec::new("alias/events")))
            .seal(&signer, LifecycleEvent::Update)
            .await
            .unwrap();

        assert_eq!(message.delay_seconds, Some(10));
        assert_eq!(message.lifecycle_event(), Some("update"));
        assert_eq!(message.attributes[DEFAULT_SIGNATURE_ATTRIBUTE], "AQID");
        assert_eq!(signer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_signature_attribute_name() {
        let signer = StaticSigner::new(vec![1, 2, 3]);
        let spec = SignatureSpec::new("alias/events").with_attribute_name("X-Body-Signature");
        let message = MessageEnvelope::new("body", QUEUE)
            .with_signature(Some(spec))
            .seal(&signer, LifecycleEvent::Delete)
            .await
            .unwrap();

        assert!(message.attributes.contains_key("X-Body-Signature"));
        assert!(!message.attributes.contains_key(DEFAULT_SIGNATURE_ATTRIBUTE));
        assert_eq!(message.lifecycle_event(), Some("delete"));
    }

    #[tokio::test]
    async fn test_signing_failure_yields_no_message() {
        let signer = FailingSigner::new("KMSInvalidStateException");
        let result = MessageEnvelope::new("body", QUEUE)
            .with_signature(Some(SignatureSpec::new("alias/disabled")))
            .seal(&signer, LifecycleEvent::Create)
            .await;

        assert!(matches!(result, Err(ProviderError::Signing(_))));
    }

    #[test]
    fn test_lifecycle_event_names() {
        assert_eq!(LifecycleEvent::Create.to_string(), "create");
        assert_eq!(LifecycleEvent::Update.to_string(), "update");
        assert_eq!(LifecycleEvent::Delete.to_string(), "delete");
        assert_eq!(
            serde_json::to_value(LifecycleEvent::Delete).unwrap(),
            serde_json::json!("delete")
        );
    }
}
