//! The EventPush provider: schema, configuration and resource dispatch.

use std::sync::Arc;

use aws_config::SdkConfig;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources::{
    self, MessageLifecycle, MessageModel, SnsPublishMessage, SqsSendMessage, PROVIDER_TYPE_NAME,
};
use crate::schema::{Diagnostic, ProviderSchema, Schema};
use crate::service::ProviderService;
use crate::signing::{KmsSigner, MessageSigner};
use crate::transport::{MessageTransport, SnsTransport, SqsTransport};
use crate::types::{PlanResult, ProviderMetadata};
use crate::validation::validate;

/// The clients a configured provider sends and signs with.
#[derive(Clone)]
pub struct Backends {
    /// Carries `eventpush_aws_sqs_send_message` messages.
    pub sqs: Arc<dyn MessageTransport>,
    /// Carries `eventpush_aws_sns_publish_message` messages.
    pub sns: Arc<dyn MessageTransport>,
    /// Signs bodies for `kms_signature` blocks.
    pub signer: Arc<dyn MessageSigner>,
}

impl Backends {
    /// SQS, SNS and KMS clients sharing one SDK configuration.
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self {
            sqs: Arc::new(SqsTransport::new(aws_sdk_sqs::Client::new(config))),
            sns: Arc::new(SnsTransport::new(aws_sdk_sns::Client::new(config))),
            signer: Arc::new(KmsSigner::new(aws_sdk_kms::Client::new(config))),
        }
    }

    fn lifecycle(&self, kind: ResourceKind) -> MessageLifecycle<'_> {
        let transport = match kind {
            ResourceKind::SqsSendMessage => self.sqs.as_ref(),
            ResourceKind::SnsPublishMessage => self.sns.as_ref(),
        };
        MessageLifecycle::new(transport, self.signer.as_ref())
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("sqs", &self.sqs.name())
            .field("sns", &self.sns.name())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceKind {
    SqsSendMessage,
    SnsPublishMessage,
}

impl ResourceKind {
    fn from_type_name(resource_type: &str) -> Result<Self, ProviderError> {
        if resource_type == SqsSendMessage::TYPE_NAME {
            Ok(Self::SqsSendMessage)
        } else if resource_type == SnsPublishMessage::TYPE_NAME {
            Ok(Self::SnsPublishMessage)
        } else {
            Err(ProviderError::UnknownResource(resource_type.to_string()))
        }
    }

    /// Summary under which a failed send is reported.
    fn send_failure_summary(self) -> &'static str {
        match self {
            Self::SqsSendMessage => "Error sending message to SQS queue.",
            Self::SnsPublishMessage => "Error sending message to SNS topic.",
        }
    }

    fn schema(self) -> Schema {
        match self {
            Self::SqsSendMessage => SqsSendMessage::schema(),
            Self::SnsPublishMessage => SnsPublishMessage::schema(),
        }
    }
}

/// Provider for the `eventpush_aws_*` message resources.
#[derive(Debug)]
pub struct EventPushProvider {
    version: String,
    backends: RwLock<Option<Backends>>,
}

impl EventPushProvider {
    /// An unconfigured provider reporting `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            backends: RwLock::new(None),
        }
    }

    /// A provider that is already configured with `backends`.
    pub fn with_backends(version: impl Into<String>, backends: Backends) -> Self {
        Self {
            version: version.into(),
            backends: RwLock::new(Some(backends)),
        }
    }

    /// Whether `configure` has completed.
    pub async fn is_configured(&self) -> bool {
        self.backends.read().await.is_some()
    }

    async fn backends(&self) -> Result<Backends, ProviderError> {
        self.backends.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "provider is not configured; call configure first".to_string(),
            )
        })
    }

    fn config_diagnostics(config: Value) -> Vec<Diagnostic> {
        let mut diagnostics = validate(&ProviderConfig::schema(), &config);
        if diagnostics.is_empty() {
            match ProviderConfig::from_value(config) {
                Ok(parsed) => diagnostics.extend(parsed.diagnostics()),
                Err(e) => diagnostics.push(e.into()),
            }
        }
        diagnostics
    }
}

async fn create_as<M: MessageModel>(
    lifecycle: MessageLifecycle<'_>,
    planned_state: Value,
) -> Result<Value, ProviderError> {
    let planned: M = serde_json::from_value(planned_state)?;
    Ok(serde_json::to_value(lifecycle.create(planned).await?)?)
}

async fn read_as<M: MessageModel>(
    lifecycle: MessageLifecycle<'_>,
    current_state: Value,
) -> Result<Value, ProviderError> {
    let current: M = serde_json::from_value(current_state)?;
    Ok(serde_json::to_value(lifecycle.read(current).await?)?)
}

async fn update_as<M: MessageModel>(
    lifecycle: MessageLifecycle<'_>,
    prior_state: Value,
    planned_state: Value,
) -> Result<Value, ProviderError> {
    let prior: M = serde_json::from_value(prior_state)?;
    let planned: M = serde_json::from_value(planned_state)?;
    Ok(serde_json::to_value(lifecycle.update(prior, planned).await?)?)
}

async fn delete_as<M: MessageModel>(
    lifecycle: MessageLifecycle<'_>,
    current_state: Value,
) -> Result<(), ProviderError> {
    let current: M = serde_json::from_value(current_state)?;
    lifecycle.delete(current).await
}

#[async_trait::async_trait]
impl ProviderService for EventPushProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(ProviderConfig::schema())
            .with_resource(SqsSendMessage::TYPE_NAME, SqsSendMessage::schema())
            .with_resource(SnsPublishMessage::TYPE_NAME, SnsPublishMessage::schema())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
            resources: vec![
                SnsPublishMessage::TYPE_NAME.to_string(),
                SqsSendMessage::TYPE_NAME.to_string(),
            ],
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(Self::config_diagnostics(config))
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = Self::config_diagnostics(config.clone());
        if diagnostics.iter().any(Diagnostic::is_error) {
            warn!(diagnostics = diagnostics.len(), "Provider configuration rejected");
            return Ok(diagnostics);
        }

        let config = ProviderConfig::from_value(config)?;
        let sdk_config = config.load_sdk_config().await;
        info!(
            region = ?sdk_config.region().map(ToString::to_string),
            "Configured AWS clients"
        );
        *self.backends.write().await = Some(Backends::from_sdk_config(&sdk_config));
        Ok(diagnostics)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let mut diagnostics = validate(&kind.schema(), &config);
        diagnostics.extend(resources::config_warnings(&config));
        Ok(diagnostics)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        resources::plan(&kind.schema(), prior_state, proposed_state)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let backends = self.backends().await?;
        let lifecycle = backends.lifecycle(kind);
        let result = match kind {
            ResourceKind::SqsSendMessage => create_as::<SqsSendMessage>(lifecycle, planned_state).await,
            ResourceKind::SnsPublishMessage => {
                create_as::<SnsPublishMessage>(lifecycle, planned_state).await
            }
        };
        result.map_err(|e| e.while_sending(kind.send_failure_summary()))
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let backends = self.backends().await?;
        let lifecycle = backends.lifecycle(kind);
        match kind {
            ResourceKind::SqsSendMessage => read_as::<SqsSendMessage>(lifecycle, current_state).await,
            ResourceKind::SnsPublishMessage => {
                read_as::<SnsPublishMessage>(lifecycle, current_state).await
            }
        }
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let backends = self.backends().await?;
        let lifecycle = backends.lifecycle(kind);
        let result = match kind {
            ResourceKind::SqsSendMessage => {
                update_as::<SqsSendMessage>(lifecycle, prior_state, planned_state).await
            }
            ResourceKind::SnsPublishMessage => {
                update_as::<SnsPublishMessage>(lifecycle, prior_state, planned_state).await
            }
        };
        result.map_err(|e| e.while_sending(kind.send_failure_summary()))
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let kind = ResourceKind::from_type_name(resource_type)?;
        let backends = self.backends().await?;
        let lifecycle = backends.lifecycle(kind);
        let result = match kind {
            ResourceKind::SqsSendMessage => delete_as::<SqsSendMessage>(lifecycle, current_state).await,
            ResourceKind::SnsPublishMessage => {
                delete_as::<SnsPublishMessage>(lifecycle, current_state).await
            }
        };
        result.map_err(|e| e.while_sending(kind.send_failure_summary()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::fingerprint;
    use crate::message::LIFECYCLE_ATTRIBUTE;
    use crate::signing::DEFAULT_SIGNATURE_ATTRIBUTE;
    use crate::testing::{
        assert_error_at, assert_has_errors, assert_no_errors, assert_plan_creates,
        assert_plan_no_changes, assert_plan_replaces, assert_plan_updates_in_place, FailingSigner,
        ProviderTester, RecordingTransport, StaticSigner, TestError,
    };
    use serde_json::json;

    const SQS: &str = "eventpush_aws_sqs_send_message";
    const SNS: &str = "eventpush_aws_sns_publish_message";
    const QUEUE: &str = "https://sqs.us-east-2.amazonaws.com/123456789012/TestQueue";
    const TOPIC: &str = "arn:aws:sns:us-east-2:123456789012:TestTopic";

    struct Fixture {
        tester: ProviderTester<EventPushProvider>,
        sqs: Arc<RecordingTransport>,
        sns: Arc<RecordingTransport>,
        signer: Arc<StaticSigner>,
    }

    fn fixture() -> Fixture {
        let sqs = Arc::new(RecordingTransport::sqs());
        let sns = Arc::new(RecordingTransport::sns());
        let signer = Arc::new(StaticSigner::new(vec![0xde, 0xad, 0xbe, 0xef]));
        let backends = Backends {
            sqs: sqs.clone(),
            sns: sns.clone(),
            signer: signer.clone(),
        };
        Fixture {
            tester: ProviderTester::new(EventPushProvider::with_backends("0.1.0", backends)),
            sqs,
            sns,
            signer,
        }
    }

    fn queue_config(body: &str) -> Value {
        json!({"queue_url": QUEUE, "message_body": body})
    }

    #[test]
    fn test_schema_lists_both_resources() {
        let provider = EventPushProvider::new("0.1.0");
        let schema = provider.schema();
        assert!(schema.resources.contains_key(SQS));
        assert!(schema.resources.contains_key(SNS));
        assert!(schema.provider.block.blocks.contains_key("aws"));

        let metadata = provider.metadata();
        assert_eq!(metadata.type_name, "eventpush");
        assert_eq!(metadata.version, "0.1.0");
        assert_eq!(metadata.resources, vec![SNS.to_string(), SQS.to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let f = fixture();
        let err = f
            .tester
            .plan_create("eventpush_http_post", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = f
            .tester
            .create("eventpush_http_post", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_handlers_require_configuration() {
        let tester = ProviderTester::new(EventPushProvider::new("0.1.0"));
        let err = tester.create(SQS, queue_config("m")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        let err = tester.delete(SNS, json!({"topic_arn": TOPIC, "message_body": "m"})).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        // Planning needs no clients.
        assert!(tester.plan_create(SQS, queue_config("m")).await.is_ok());
    }

    #[tokio::test]
    async fn test_provider_config_validation() {
        let provider = EventPushProvider::new("0.1.0");

        let diagnostics = provider
            .validate_provider_config(json!({"aws": {"region": "us-east-2"}}))
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
        assert_no_errors(&provider.validate_provider_config(Value::Null).await.unwrap());

        let diagnostics = provider
            .validate_provider_config(json!({"aws": {"region": ""}}))
            .await
            .unwrap();
        assert_has_errors(&diagnostics);

        let diagnostics = provider
            .validate_provider_config(json!({"aws": {"region": 5}}))
            .await
            .unwrap();
        assert_has_errors(&diagnostics);
    }

    #[tokio::test]
    async fn test_configure() {
        let tester = ProviderTester::new(EventPushProvider::new("0.1.0"));

        assert!(tester.configure(json!({"aws": {"region": ""}})).await.is_err());
        assert!(!tester.provider().is_configured().await);

        tester
            .configure(json!({"aws": {"region": "us-east-2"}}))
            .await
            .unwrap();
        assert!(tester.provider().is_configured().await);
    }

    #[tokio::test]
    async fn test_validate_resource_config() {
        let f = fixture();
        f.tester
            .validate_resource_config(SQS, json!({"queue_url": QUEUE, "message_body": "m", "delay_seconds": 900}))
            .await
            .unwrap();

        assert!(f
            .tester
            .validate_resource_config(SQS, json!({"queue_url": QUEUE, "message_body": "m", "delay_seconds": 1000}))
            .await
            .is_err());
        assert!(f
            .tester
            .validate_resource_config(SNS, json!({"message_body": "m"}))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_validate_resource_config_warns_on_marker_attribute() {
        let f = fixture();
        let mut config = queue_config("m");
        config["kms_signature"] = json!([{"kms_key_id": "k", "message_attribute": LIFECYCLE_ATTRIBUTE}]);

        let diagnostics = f
            .tester
            .provider()
            .validate_resource_config(SQS, config)
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("kms_signature.0.message_attribute")
        );
    }

    #[tokio::test]
    async fn test_create_sends_lifecycle_marker_only() {
        let f = fixture();
        let state = f
            .tester
            .lifecycle_create(SQS, queue_config("test message 1"))
            .await
            .unwrap();

        let sent = f.sqs.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "test message 1");
        assert_eq!(sent[0].target, QUEUE);
        assert_eq!(sent[0].attributes.len(), 1);
        assert_eq!(sent[0].attributes[LIFECYCLE_ATTRIBUTE], "create");
        assert!(f.sns.sent().is_empty());
        assert!(f.signer.calls().is_empty());

        assert_eq!(
            state["md5_of_message_body"],
            fingerprint("test message 1").into_string()
        );
        assert!(state["event_id"].is_string());
        assert_eq!(state["message_id"], "sqs-message-1");
    }

    #[tokio::test]
    async fn test_update_resends_only_on_body_change() {
        let f = fixture();
        let created = f
            .tester
            .lifecycle_create(SQS, queue_config("test message 1"))
            .await
            .unwrap();

        let plan = f
            .tester
            .plan_update(SQS, created.clone(), queue_config("test message 1"))
            .await
            .unwrap();
        assert_plan_no_changes(&plan);

        let unchanged = f
            .tester
            .lifecycle_update(SQS, created.clone(), queue_config("test message 1"))
            .await
            .unwrap();
        assert_eq!(f.sqs.sent().len(), 1);
        assert_eq!(unchanged["md5_of_message_body"], created["md5_of_message_body"]);
        assert_eq!(unchanged["event_id"], created["event_id"]);

        let changed = f
            .tester
            .lifecycle_update(SQS, created.clone(), queue_config("test message 2"))
            .await
            .unwrap();
        let sent = f.sqs.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].lifecycle_event(), Some("update"));
        assert_eq!(
            changed["md5_of_message_body"],
            fingerprint("test message 2").into_string()
        );
        assert_eq!(changed["event_id"], created["event_id"]);
    }

    #[tokio::test]
    async fn test_plan_replaces_create_only_on_body_change() {
        let f = fixture();
        let mut config = queue_config("test message 1");
        config["create_only"] = json!(true);

        let plan = f.tester.plan_create(SQS, config.clone()).await.unwrap();
        assert_plan_creates(&plan);
        let created = f.tester.create(SQS, plan.planned_state).await.unwrap();

        let mut changed = queue_config("test message 2");
        changed["create_only"] = json!(true);
        let plan = f.tester.plan_update(SQS, created.clone(), changed).await.unwrap();
        assert_plan_replaces(&plan);

        let plan = f
            .tester
            .plan_update(SQS, created, queue_config("test message 1"))
            .await
            .unwrap();
        assert_plan_updates_in_place(&plan);
    }

    #[tokio::test]
    async fn test_delete_respects_create_only() {
        let f = fixture();
        let mut config = json!({"topic_arn": TOPIC, "message_body": "bye", "create_only": true});
        let state = f.tester.lifecycle_create(SNS, config.clone()).await.unwrap();
        f.tester.lifecycle_delete(SNS, state).await.unwrap();
        assert_eq!(f.sns.sent().len(), 1);

        config["create_only"] = json!(false);
        let state = f.tester.lifecycle_create(SNS, config).await.unwrap();
        f.tester.lifecycle_delete(SNS, state).await.unwrap();
        let sent = f.sns.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].lifecycle_event(), Some("delete"));
    }

    #[tokio::test]
    async fn test_sns_state_uses_local_fingerprint() {
        let f = fixture();
        let state = f
            .tester
            .lifecycle_create(SNS, json!({"topic_arn": TOPIC, "message_body": "hello"}))
            .await
            .unwrap();
        assert_eq!(state["md5_of_message_body"], fingerprint("hello").into_string());
        assert_eq!(state["message_id"], "sns-message-1");
    }

    #[tokio::test]
    async fn test_signed_publish() {
        let f = fixture();
        f.tester
            .lifecycle_create(
                SNS,
                json!({
                    "topic_arn": TOPIC,
                    "message_body": "signed",
                    "kms_signature": [{"kms_key_id": "alias/events"}],
                }),
            )
            .await
            .unwrap();

        let sent = f.sns.sent();
        assert_eq!(sent[0].attributes[DEFAULT_SIGNATURE_ATTRIBUTE], "3q2+7w==");
        assert_eq!(sent[0].lifecycle_event(), Some("create"));
        assert_eq!(f.signer.calls()[0].key_id, "alias/events");
    }

    #[tokio::test]
    async fn test_signing_failure_sends_nothing() {
        let sqs = Arc::new(RecordingTransport::sqs());
        let backends = Backends {
            sqs: sqs.clone(),
            sns: Arc::new(RecordingTransport::sns()),
            signer: Arc::new(FailingSigner::new("DisabledException: key is disabled")),
        };
        let tester = ProviderTester::new(EventPushProvider::with_backends("0.1.0", backends));

        let mut config = queue_config("signed");
        config["kms_signature"] = json!([{"kms_key_id": "alias/disabled"}]);
        let err = tester.lifecycle_create(SQS, config).await.unwrap_err();

        assert!(matches!(err.cause(), ProviderError::Signing(_)));
        assert!(sqs.sent().is_empty());

        let diagnostic: Diagnostic = err.into();
        assert_eq!(diagnostic.summary, "Error sending message to SQS queue.");
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some("DisabledException: key is disabled")
        );
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_error() {
        let backends = Backends {
            sqs: Arc::new(RecordingTransport::failing("sqs", "AWS.SimpleQueueService.NonExistentQueue")),
            sns: Arc::new(RecordingTransport::sns()),
            signer: Arc::new(StaticSigner::default()),
        };
        let tester = ProviderTester::new(EventPushProvider::with_backends("0.1.0", backends));

        let err = tester
            .lifecycle_create(SQS, queue_config("m"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), ProviderError::Transport(_)));
        let diagnostic: Diagnostic = err.into();
        assert_eq!(diagnostic.summary, "Error sending message to SQS queue.");
        assert!(diagnostic
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("NonExistentQueue")));
    }

    #[tokio::test]
    async fn test_sns_destroy_failure_uses_topic_summary() {
        let backends = Backends {
            sqs: Arc::new(RecordingTransport::sqs()),
            sns: Arc::new(RecordingTransport::failing("sns", "NotFound: Topic does not exist")),
            signer: Arc::new(StaticSigner::default()),
        };
        let provider = EventPushProvider::with_backends("0.1.0", backends);

        let state = json!({"topic_arn": TOPIC, "message_body": "m", "event_id": "e-1"});
        let err = provider.delete(SNS, state).await.unwrap_err();
        let diagnostic: Diagnostic = err.into();
        assert_eq!(diagnostic.summary, "Error sending message to SNS topic.");
        assert_eq!(
            diagnostic.detail.as_deref(),
            Some("NotFound: Topic does not exist")
        );
    }

    #[tokio::test]
    async fn test_whole_float_delay_is_sent() {
        let f = fixture();
        let config = json!({"queue_url": QUEUE, "message_body": "m", "delay_seconds": 30.0});
        f.tester
            .validate_resource_config(SQS, config.clone())
            .await
            .unwrap();

        let state = f.tester.lifecycle_create(SQS, config).await.unwrap();
        assert_eq!(f.sqs.sent()[0].delay_seconds, Some(30));
        assert_eq!(state["delay_seconds"], 30);

        let too_long = json!({"queue_url": QUEUE, "message_body": "m", "delay_seconds": 1000.0});
        match f.tester.validate_resource_config(SQS, too_long).await {
            Err(TestError::Diagnostics(diags)) => assert_error_at(&diags, "delay_seconds"),
            other => panic!("expected delay_seconds diagnostic, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_returns_state_unchanged() {
        let f = fixture();
        let state = f
            .tester
            .lifecycle_create(SQS, queue_config("m"))
            .await
            .unwrap();
        let read = f.tester.read(SQS, state.clone()).await.unwrap();
        assert_eq!(read, state);
        assert_eq!(f.sqs.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_crud_lifecycle() {
        let f = fixture();
        let state = f
            .tester
            .lifecycle_crud(SQS, queue_config("one"), queue_config("two"))
            .await
            .unwrap();

        assert_eq!(state["message_body"], "two");
        let events: Vec<_> = f
            .sqs
            .sent()
            .iter()
            .map(|m| m.lifecycle_event().unwrap_or_default().to_string())
            .collect();
        assert_eq!(events, vec!["create", "update", "delete"]);
    }
}
