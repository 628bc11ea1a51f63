//! Testing utilities for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the host would,
//! and the fakes stand in for the AWS clients so lifecycle behavior can be
//! checked without network access.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eventpush_provider::provider::{Backends, EventPushProvider};
//! use eventpush_provider::testing::{ProviderTester, RecordingTransport, StaticSigner};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_sends_once() {
//!     let sqs = Arc::new(RecordingTransport::sqs());
//!     let backends = Backends {
//!         sqs: sqs.clone(),
//!         sns: Arc::new(RecordingTransport::sns()),
//!         signer: Arc::new(StaticSigner::default()),
//!     };
//!     let tester = ProviderTester::new(EventPushProvider::with_backends("0.1.0", backends));
//!
//!     tester
//!         .lifecycle_create("eventpush_aws_sqs_send_message", json!({
//!             "queue_url": "https://sqs.us-east-2.amazonaws.com/123456789012/TestQueue",
//!             "message_body": "hello",
//!         }))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(sqs.sent().len(), 1);
//! }
//! ```

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::digest::ContentFingerprint;
use crate::error::ProviderError;
use crate::message::OutboundMessage;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::service::ProviderService;
use crate::signing::{MessageSigner, SigningAlgorithm};
use crate::transport::{Delivery, MessageTransport};
use crate::types::PlanResult;

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Validate provider configuration.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    ///
    /// Returns `Err` with the error diagnostics if there are any.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(
        &self,
        resource_type: &str,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider.plan(resource_type, None, proposed_state).await
    }

    /// Plan a resource update.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), proposed_state)
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: plan → create → read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self.plan_create(resource_type, config).await?;
        let created_state = self
            .create(resource_type, plan_result.planned_state)
            .await?;
        self.read(resource_type, created_state).await
    }

    /// Run a full update lifecycle: plan → update → read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        proposed_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self
            .plan_update(resource_type, prior_state.clone(), proposed_state)
            .await?;
        let updated_state = self
            .update(resource_type, prior_state, plan_result.planned_state)
            .await?;
        self.read(resource_type, updated_state).await
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }

    /// Run create → update → delete, returning the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created_state = self.lifecycle_create(resource_type, initial_config).await?;
        let updated_state = self
            .lifecycle_update(resource_type, created_state, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated_state.clone())
            .await?;
        Ok(updated_state)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan creates without replacement.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.changes.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected plan to change attribute '{}'. Changed attributes: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that an error diagnostic is reported at `attribute`.
///
/// # Panics
///
/// Panics if no error diagnostic names the attribute.
pub fn assert_error_at(diagnostics: &[Diagnostic], attribute: &str) {
    let found = diagnostics.iter().any(|d| {
        matches!(d.severity, DiagnosticSeverity::Error) && d.attribute.as_deref() == Some(attribute)
    });
    assert!(
        found,
        "Expected an error at '{}', got errors at: {:?}",
        attribute,
        diagnostics
            .iter()
            .filter_map(|d| d.attribute.as_deref())
            .collect::<Vec<_>>()
    );
}

// =========================================================================
// Fakes
// =========================================================================

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory [`MessageTransport`] that records every message it is given.
#[derive(Debug)]
pub struct RecordingTransport {
    name: &'static str,
    reports_digest: bool,
    failure: Option<String>,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingTransport {
    fn new(name: &'static str, reports_digest: bool) -> Self {
        Self {
            name,
            reports_digest,
            failure: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a queue: reports the body digest on delivery.
    pub fn sqs() -> Self {
        Self::new("sqs", true)
    }

    /// Behaves like a topic: reports only a message id.
    pub fn sns() -> Self {
        Self::new("sns", false)
    }

    /// Rejects every send with a transport error carrying `message`.
    pub fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(name, false)
        }
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, ProviderError> {
        if let Some(failure) = &self.failure {
            return Err(ProviderError::Transport(failure.clone()));
        }

        let mut sent = lock(&self.sent);
        sent.push(message.clone());
        Ok(Delivery {
            message_id: Some(format!("{}-message-{}", self.name, sent.len())),
            body_fingerprint: self
                .reports_digest
                .then(|| ContentFingerprint::of(&message.body)),
        })
    }
}

/// One request seen by a [`StaticSigner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignCall {
    /// Key the caller asked for.
    pub key_id: String,
    /// Digest that was signed.
    pub digest: [u8; 32],
    /// Algorithm requested.
    pub algorithm: SigningAlgorithm,
}

/// [`MessageSigner`] that answers every request with the same bytes.
#[derive(Debug, Default)]
pub struct StaticSigner {
    signature: Vec<u8>,
    calls: Mutex<Vec<SignCall>>,
}

impl StaticSigner {
    /// Return `signature` for every request.
    pub fn new(signature: Vec<u8>) -> Self {
        Self {
            signature,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<SignCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl MessageSigner for StaticSigner {
    async fn sign_digest(
        &self,
        key_id: &str,
        digest: &[u8; 32],
        algorithm: SigningAlgorithm,
    ) -> Result<Vec<u8>, ProviderError> {
        lock(&self.calls).push(SignCall {
            key_id: key_id.to_string(),
            digest: *digest,
            algorithm,
        });
        Ok(self.signature.clone())
    }
}

/// [`MessageSigner`] that rejects every request.
#[derive(Debug)]
pub struct FailingSigner {
    message: String,
}

impl FailingSigner {
    /// Fail with a signing error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl MessageSigner for FailingSigner {
    async fn sign_digest(
        &self,
        _key_id: &str,
        _digest: &[u8; 32],
        _algorithm: SigningAlgorithm,
    ) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::Signing(self.message.clone()))
    }
}
