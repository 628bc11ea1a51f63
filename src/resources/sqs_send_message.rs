//! The `eventpush_aws_sqs_send_message` resource.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{message_schema, MessageFields, MessageModel};
use crate::schema::{Attribute, Schema, Validator};
use crate::validation::as_int32;

/// Longest delivery delay SQS accepts, in seconds.
pub const MAX_DELAY_SECONDS: i64 = 900;

/// `eventpush_aws_sqs_send_message`: sends to a queue on create, on update
/// when the body changes, and on delete unless `create_only` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqsSendMessage {
    /// URL of the destination queue.
    pub queue_url: String,
    /// Delivery delay.
    #[serde(default, deserialize_with = "optional_int32")]
    pub delay_seconds: Option<i32>,
    /// Shared message state.
    #[serde(flatten)]
    pub fields: MessageFields,
}

/// Hosts may encode whole numbers as `30.0`.
fn optional_int32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_int32(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected int32, got {}", value))),
    }
}

impl SqsSendMessage {
    /// State for sending `body` to `queue_url`.
    pub fn new(queue_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            delay_seconds: None,
            fields: MessageFields::new(body),
        }
    }
}

impl MessageModel for SqsSendMessage {
    const TYPE_NAME: &'static str = "eventpush_aws_sqs_send_message";

    fn schema() -> Schema {
        message_schema("Sends a message to an SQS queue for resource lifecycle events.")
            .with_attribute(
                "queue_url",
                Attribute::required_string()
                    .with_description("The URL of the Amazon SQS queue to which a message is sent."),
            )
            .with_attribute(
                "delay_seconds",
                Attribute::optional_int32()
                    .with_description("The length of time, in seconds, for which to delay a specific message.")
                    .with_validator(Validator::between(0, MAX_DELAY_SECONDS)),
            )
    }

    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }

    fn target(&self) -> &str {
        &self.queue_url
    }

    fn delay_seconds(&self) -> Option<i32> {
        self.delay_seconds
    }
}
