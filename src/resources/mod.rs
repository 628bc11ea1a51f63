//! Message resources and their lifecycle handlers.
//!
//! Both resources share one state shape ([`MessageFields`]) and one set of
//! handlers ([`MessageLifecycle`]); they differ only in where the message
//! goes and which transport carries it.

mod sns_publish_message;
mod sqs_send_message;

pub use sns_publish_message::SnsPublishMessage;
pub use sqs_send_message::SqsSendMessage;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::digest::{fingerprint, same_content, ContentFingerprint};
use crate::error::ProviderError;
use crate::message::{LifecycleEvent, MessageEnvelope, LIFECYCLE_ATTRIBUTE};
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, PlanModifier, Schema, Validator};
use crate::signing::{MessageSigner, SignatureSpec, SigningAlgorithm};
use crate::transport::MessageTransport;
use crate::types::{AttributeChange, PlanResult};

/// The provider's type name; every resource type starts with it.
pub const PROVIDER_TYPE_NAME: &str = "eventpush";

const MESSAGE_BODY: &str = "message_body";
const CREATE_ONLY: &str = "create_only";
const MD5_OF_MESSAGE_BODY: &str = "md5_of_message_body";
const MESSAGE_ID: &str = "message_id";
const KMS_SIGNATURE: &str = "kms_signature";

/// One `kms_signature` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    /// KMS key id, alias or ARN.
    pub kms_key_id: String,
    /// Attribute name for the signature; defaults to `X-KMS-Signature`.
    #[serde(default)]
    pub message_attribute: Option<String>,
    /// Signing algorithm; defaults to `RSASSA_PKCS1_V1_5_SHA_256`.
    #[serde(default)]
    pub algorithm: Option<String>,
}

impl SignatureBlock {
    /// Resolve defaults into a [`SignatureSpec`].
    pub fn to_spec(&self) -> Result<SignatureSpec, ProviderError> {
        let mut spec = SignatureSpec::new(&self.kms_key_id);
        if let Some(name) = &self.message_attribute {
            spec = spec.with_attribute_name(name);
        }
        if let Some(algorithm) = &self.algorithm {
            spec = spec.with_algorithm(algorithm.parse()?);
        }
        Ok(spec)
    }
}

/// State shared by both message resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFields {
    /// The message to send.
    pub message_body: String,
    /// Suppresses the delete-time send and forces replacement on body change.
    #[serde(default)]
    pub create_only: Option<bool>,
    /// Generated on create and kept for the life of the resource.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Id the transport assigned to the last message sent.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Fingerprint of the body last recorded.
    #[serde(default)]
    pub md5_of_message_body: Option<ContentFingerprint>,
    /// At most one signing block.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub kms_signature: Vec<SignatureBlock>,
}

impl MessageFields {
    /// Plain fields for `body` with nothing computed yet.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            message_body: body.into(),
            create_only: None,
            event_id: None,
            message_id: None,
            md5_of_message_body: None,
            kms_signature: Vec::new(),
        }
    }

    /// Whether the delete-time send is suppressed.
    pub fn is_create_only(&self) -> bool {
        self.create_only.unwrap_or(false)
    }

    /// The signing spec, if a `kms_signature` block is present.
    pub fn signature_spec(&self) -> Result<Option<SignatureSpec>, ProviderError> {
        match self.kms_signature.as_slice() {
            [] => Ok(None),
            [block] => block.to_spec().map(Some),
            blocks => Err(ProviderError::Validation(format!(
                "kms_signature allows at most 1 block, got {}",
                blocks.len()
            ))),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A resource whose lifecycle sends messages.
pub trait MessageModel: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Full resource type name.
    const TYPE_NAME: &'static str;

    /// The resource schema.
    fn schema() -> Schema;

    /// The shared message state.
    fn fields(&self) -> &MessageFields;

    /// Mutable access to the shared message state.
    fn fields_mut(&mut self) -> &mut MessageFields;

    /// Queue URL or topic ARN.
    fn target(&self) -> &str;

    /// Delivery delay; only queues support one.
    fn delay_seconds(&self) -> Option<i32> {
        None
    }

    /// Describe the message this state would send.
    fn envelope(&self) -> Result<MessageEnvelope, ProviderError> {
        let fields = self.fields();
        Ok(MessageEnvelope::new(&fields.message_body, self.target())
            .with_delay_seconds(self.delay_seconds())
            .with_signature(fields.signature_spec()?))
    }
}

/// Schema attributes and blocks common to both resources.
pub(crate) fn message_schema(description: &str) -> Schema {
    let algorithms = SigningAlgorithm::ALL.map(|a| a.as_str());

    Schema::v0()
        .with_description(description)
        .with_attribute(
            CREATE_ONLY,
            Attribute::optional_bool()
                .with_description("When enabled, forces resource to be replaced on update."),
        )
        .with_attribute(
            "event_id",
            Attribute::computed_string()
                .with_description("Generated ID for resource tracking.")
                .with_plan_modifier(PlanModifier::UseStateForUnknown),
        )
        .with_attribute(
            MESSAGE_ID,
            Attribute::computed_string()
                .with_description("The ID the service assigned to the last message sent."),
        )
        .with_attribute(
            MD5_OF_MESSAGE_BODY,
            Attribute::computed_string().with_description("The MD5 of the message body."),
        )
        .with_attribute(
            MESSAGE_BODY,
            Attribute::required_string()
                .with_description("The message to send.")
                .with_plan_modifier(PlanModifier::RequiresReplaceIf {
                    flag: CREATE_ONLY.to_string(),
                }),
        )
        .with_block(
            KMS_SIGNATURE,
            NestedBlock::list(
                Block::new()
                    .with_description("Signs the message body with an AWS KMS key.")
                    .with_attribute(
                        "kms_key_id",
                        Attribute::required_string().with_description("The ID of the AWS KMS key."),
                    )
                    .with_attribute(
                        "message_attribute",
                        Attribute::optional_string()
                            .with_description("Message attribute name to add signature value."),
                    )
                    .with_attribute(
                        "algorithm",
                        Attribute::optional_string()
                            .with_description("The KMS signature algorithm.")
                            .with_validator(Validator::one_of_case_insensitive(algorithms)),
                    ),
            )
            .with_max_items(1),
        )
}

/// Warnings for settings the schema accepts but that lose data on send.
///
/// The lifecycle marker is written after the signature, so a signature
/// attribute with the marker's name never reaches the receiver.
pub(crate) fn config_warnings(config: &Value) -> Vec<Diagnostic> {
    let Some(blocks) = config.get(KMS_SIGNATURE).and_then(Value::as_array) else {
        return Vec::new();
    };
    blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| {
            block.get("message_attribute").and_then(Value::as_str) == Some(LIFECYCLE_ATTRIBUTE)
        })
        .map(|(i, _)| {
            Diagnostic::warning(format!(
                "Signature attribute '{}' is overwritten by the lifecycle marker",
                LIFECYCLE_ATTRIBUTE
            ))
            .with_detail("Choose a different message_attribute to deliver the signature.")
            .with_attribute(format!("{}.{}.message_attribute", KMS_SIGNATURE, i))
        })
        .collect()
}

/// Lifecycle handlers for one transport.
///
/// Each call makes at most one signing request and one send. A failure
/// returns before any state is produced, leaving the host's prior state in
/// place.
pub struct MessageLifecycle<'a> {
    transport: &'a dyn MessageTransport,
    signer: &'a dyn MessageSigner,
}

impl<'a> MessageLifecycle<'a> {
    /// Handlers sending through `transport`, signing with `signer`.
    pub fn new(transport: &'a dyn MessageTransport, signer: &'a dyn MessageSigner) -> Self {
        Self { transport, signer }
    }

    async fn send<M: MessageModel>(
        &self,
        state: &mut M,
        event: LifecycleEvent,
    ) -> Result<(), ProviderError> {
        let message = state.envelope()?.seal(self.signer, event).await?;
        info!(
            resource_type = M::TYPE_NAME,
            transport = self.transport.name(),
            event = %event,
            attributes = message.attributes.len(),
            "Sending message"
        );
        let delivery = self.transport.send(&message).await?;

        let fields = state.fields_mut();
        fields.md5_of_message_body = Some(
            delivery
                .body_fingerprint
                .unwrap_or_else(|| fingerprint(&fields.message_body)),
        );
        fields.message_id = delivery.message_id;
        Ok(())
    }

    /// Send the `create` message and record identifiers.
    #[instrument(skip_all, fields(resource_type = M::TYPE_NAME), name = "resource.create")]
    pub async fn create<M: MessageModel>(&self, planned: M) -> Result<M, ProviderError> {
        let mut state = planned;
        self.send(&mut state, LifecycleEvent::Create).await?;
        state.fields_mut().event_id = Some(uuid::Uuid::new_v4().to_string());
        Ok(state)
    }

    /// Messages cannot be looked up after delivery, so state is returned as-is.
    pub async fn read<M: MessageModel>(&self, state: M) -> Result<M, ProviderError> {
        Ok(state)
    }

    /// Resend only when the body's fingerprint changed.
    #[instrument(skip_all, fields(resource_type = M::TYPE_NAME), name = "resource.update")]
    pub async fn update<M: MessageModel>(&self, prior: M, planned: M) -> Result<M, ProviderError> {
        let mut state = planned;
        let prior = prior.fields();

        let planned_fp = fingerprint(&state.fields().message_body);
        if planned_fp != fingerprint(&prior.message_body) {
            self.send(&mut state, LifecycleEvent::Update).await?;
        } else {
            debug!("Message body unchanged, skipping send");
            let fields = state.fields_mut();
            fields.md5_of_message_body = Some(planned_fp);
            if fields.message_id.is_none() {
                fields.message_id = prior.message_id.clone();
            }
        }

        let fields = state.fields_mut();
        if fields.event_id.is_none() {
            fields.event_id = prior.event_id.clone();
        }
        Ok(state)
    }

    /// Send the `delete` message unless the resource is create-only.
    #[instrument(skip_all, fields(resource_type = M::TYPE_NAME), name = "resource.delete")]
    pub async fn delete<M: MessageModel>(&self, state: M) -> Result<(), ProviderError> {
        if state.fields().is_create_only() {
            debug!("create_only is set, skipping delete message");
            return Ok(());
        }
        let mut state = state;
        self.send(&mut state, LifecycleEvent::Delete).await
    }
}

/// Plan a message resource.
///
/// Computed attributes start out unknown (`null`). `UseStateForUnknown`
/// attributes keep their prior value, and the digest and message id are kept
/// while the body fingerprint is unchanged. Replacement is required when an
/// attribute with `RequiresReplaceIf` changes and its flag is `true` in prior
/// state.
pub fn plan(
    schema: &Schema,
    prior_state: Option<Value>,
    proposed_state: Value,
) -> Result<PlanResult, ProviderError> {
    let prior = match prior_state {
        Some(prior) if !prior.is_null() => prior,
        _ => {
            let planned = with_unknown_computed(schema, proposed_state)?;
            let changes = AttributeChange::diff(&Value::Null, &planned);
            return Ok(PlanResult::with_changes(planned, changes, false));
        }
    };

    if proposed_state.is_null() {
        let changes = AttributeChange::diff(&prior, &Value::Null);
        return Ok(PlanResult::with_changes(Value::Null, changes, false));
    }

    let mut planned = with_unknown_computed(schema, proposed_state)?;
    let body_unchanged = match (
        prior.get(MESSAGE_BODY).and_then(Value::as_str),
        planned.get(MESSAGE_BODY).and_then(Value::as_str),
    ) {
        (Some(a), Some(b)) => same_content(a, b),
        _ => false,
    };

    if let Some(obj) = planned.as_object_mut() {
        for (name, attr) in &schema.block.attributes {
            let keep = attr.uses_state_for_unknown()
                || (body_unchanged && (name == MD5_OF_MESSAGE_BODY || name == MESSAGE_ID));
            if keep && is_computed_only(attr) {
                obj.insert(name.clone(), prior.get(name).cloned().unwrap_or(Value::Null));
            }
        }
    }

    let requires_replace = schema.block.attributes.iter().any(|(name, attr)| {
        let Some(flag) = attr.replace_flag() else {
            return false;
        };
        let changed = prior.get(name) != planned.get(name);
        changed && prior.get(flag).and_then(Value::as_bool).unwrap_or(false)
    });

    let changes = AttributeChange::diff(&prior, &planned);
    if changes.is_empty() {
        return Ok(PlanResult::no_change(planned));
    }
    Ok(PlanResult::with_changes(planned, changes, requires_replace))
}

fn is_computed_only(attr: &Attribute) -> bool {
    attr.flags.computed && !attr.flags.optional && !attr.flags.required
}

fn with_unknown_computed(schema: &Schema, proposed: Value) -> Result<Value, ProviderError> {
    let Value::Object(mut obj) = proposed else {
        return Err(ProviderError::Validation(
            "proposed state must be an object".to_string(),
        ));
    };
    for (name, attr) in &schema.block.attributes {
        if is_computed_only(attr) {
            obj.insert(name.clone(), Value::Null);
        }
    }
    Ok(Value::Object(obj))
}
