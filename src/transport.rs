//! Queue and topic transports.
//!
//! Each transport makes exactly one send call per message. Errors are mapped
//! to [`ProviderError::Transport`] with the SDK's full error context and are
//! never retried here.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::digest::ContentFingerprint;
use crate::error::ProviderError;
use crate::message::OutboundMessage;

/// Data type used for every message attribute.
const STRING_DATA_TYPE: &str = "String";

/// Acknowledgement of a delivered message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Service-assigned message id.
    pub message_id: Option<String>,
    /// Digest of the body as computed by the service, when it reports one.
    pub body_fingerprint: Option<ContentFingerprint>,
}

/// Something that can deliver an [`OutboundMessage`].
///
/// Implementations must be safe to call concurrently from independent
/// lifecycle invocations.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Short service name used in logs.
    fn name(&self) -> &'static str;

    /// Send the message once.
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, ProviderError>;
}

/// Sends to an SQS queue with `SendMessage`.
#[derive(Debug, Clone)]
pub struct SqsTransport {
    client: aws_sdk_sqs::Client,
}

impl SqsTransport {
    /// Wrap an SQS client.
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageTransport for SqsTransport {
    fn name(&self) -> &'static str {
        "sqs"
    }

    #[instrument(skip(self, message), fields(queue_url = %message.target), name = "sqs.send_message")]
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, ProviderError> {
        use aws_sdk_sqs::types::MessageAttributeValue;

        let mut attributes = HashMap::with_capacity(message.attributes.len());
        for (name, value) in &message.attributes {
            let attr = MessageAttributeValue::builder()
                .data_type(STRING_DATA_TYPE)
                .string_value(value)
                .build()
                .map_err(|e| ProviderError::Transport(format!("invalid attribute {}: {}", name, e)))?;
            attributes.insert(name.clone(), attr);
        }

        let output = self
            .client
            .send_message()
            .queue_url(&message.target)
            .message_body(&message.body)
            .set_delay_seconds(message.delay_seconds)
            .set_message_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| {
                ProviderError::Transport(
                    aws_sdk_sqs::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        info!(message_id = ?output.message_id(), "Message sent to SQS queue");
        Ok(Delivery {
            message_id: output.message_id().map(str::to_string),
            body_fingerprint: output
                .md5_of_message_body()
                .map(ContentFingerprint::from_reported),
        })
    }
}

/// Publishes to an SNS topic with `Publish`.
#[derive(Debug, Clone)]
pub struct SnsTransport {
    client: aws_sdk_sns::Client,
}

impl SnsTransport {
    /// Wrap an SNS client.
    pub fn new(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageTransport for SnsTransport {
    fn name(&self) -> &'static str {
        "sns"
    }

    #[instrument(skip(self, message), fields(topic_arn = %message.target), name = "sns.publish")]
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, ProviderError> {
        use aws_sdk_sns::types::MessageAttributeValue;

        let mut attributes = HashMap::with_capacity(message.attributes.len());
        for (name, value) in &message.attributes {
            let attr = MessageAttributeValue::builder()
                .data_type(STRING_DATA_TYPE)
                .string_value(value)
                .build()
                .map_err(|e| ProviderError::Transport(format!("invalid attribute {}: {}", name, e)))?;
            attributes.insert(name.clone(), attr);
        }

        let output = self
            .client
            .publish()
            .topic_arn(&message.target)
            .message(&message.body)
            .set_message_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| {
                ProviderError::Transport(
                    aws_sdk_sns::error::DisplayErrorContext(&e).to_string(),
                )
            })?;

        info!(message_id = ?output.message_id(), "Message published to SNS topic");
        Ok(Delivery {
            message_id: output.message_id().map(str::to_string),
            body_fingerprint: None,
        })
    }
}
