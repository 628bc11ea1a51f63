//! The `eventpush_aws_sns_publish_message` resource.

use serde::{Deserialize, Serialize};

use super::{message_schema, MessageFields, MessageModel};
use crate::schema::{Attribute, Schema};

/// `eventpush_aws_sns_publish_message`: publishes to a topic on create, on
/// update when the body changes, and on delete unless `create_only` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsPublishMessage {
    /// ARN of the destination topic.
    pub topic_arn: String,
    /// Shared message state.
    #[serde(flatten)]
    pub fields: MessageFields,
}

impl SnsPublishMessage {
    /// State for publishing `body` to `topic_arn`.
    pub fn new(topic_arn: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            fields: MessageFields::new(body),
        }
    }
}

impl MessageModel for SnsPublishMessage {
    const TYPE_NAME: &'static str = "eventpush_aws_sns_publish_message";

    fn schema() -> Schema {
        message_schema("Publishes a message to an SNS topic for resource lifecycle events.")
            .with_attribute(
                "topic_arn",
                Attribute::required_string()
                    .with_description("The ARN of the topic you want to publish to."),
            )
    }

    fn fields(&self) -> &MessageFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut MessageFields {
        &mut self.fields
    }

    fn target(&self) -> &str {
        &self.topic_arn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    const TOPIC: &str = "arn:aws:sns:us-east-2:123456789012:TestTopic";

    #[test]
    fn test_envelope_has_no_delay() {
        let envelope = SnsPublishMessage::new(TOPIC, "hello").envelope().unwrap();
        assert_eq!(envelope.target, TOPIC);
        assert_eq!(envelope.delay_seconds, None);
    }

    #[test]
    fn test_signature_block_reaches_envelope() {
        let state: SnsPublishMessage = serde_json::from_value(json!({
            "topic_arn": TOPIC,
            "message_body": "hello",
            "kms_signature": [{"kms_key_id": "alias/events", "message_attribute": "X-Sig"}],
        }))
        .unwrap();

        let spec = state.envelope().unwrap().signature.unwrap();
        assert_eq!(spec.key_id, "alias/events");
        assert_eq!(spec.attribute_name, "X-Sig");
    }

    #[test]
    fn test_schema_validates_signature_block() {
        let schema = SnsPublishMessage::schema();

        let ok = json!({
            "topic_arn": TOPIC,
            "message_body": "m",
            "kms_signature": [{"kms_key_id": "k", "algorithm": "rsassa_pkcs1_v1_5_sha_256"}],
        });
        assert!(validate(&schema, &ok).is_empty());

        let bad_algorithm = json!({
            "topic_arn": TOPIC,
            "message_body": "m",
            "kms_signature": [{"kms_key_id": "k", "algorithm": "ECDSA_SHA_256"}],
        });
        let diagnostics = validate(&schema, &bad_algorithm);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute,
            Some("kms_signature.0.algorithm".to_string())
        );

        let two_blocks = json!({
            "topic_arn": TOPIC,
            "message_body": "m",
            "kms_signature": [{"kms_key_id": "a"}, {"kms_key_id": "b"}],
        });
        assert_eq!(validate(&schema, &two_blocks).len(), 1);
    }

    #[test]
    fn test_schema_has_no_delay_attribute() {
        let schema = SnsPublishMessage::schema();
        assert!(schema.attribute("delay_seconds").is_none());
        assert!(schema.attribute("topic_arn").is_some());
    }
}
