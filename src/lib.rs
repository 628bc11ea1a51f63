//! EventPush Provider
//!
//! An infrastructure provider whose resources exist only to emit lifecycle
//! messages. Creating, updating or destroying a resource sends a message to
//! an AWS SQS queue or SNS topic, tagged with the
//! [`X-LifeCycle-Event`](message::LIFECYCLE_ATTRIBUTE) attribute and
//! optionally signed with an AWS KMS key.
//!
//! # Resources
//!
//! - `eventpush_aws_sqs_send_message`: sends to `queue_url`, with an optional
//!   `delay_seconds` (0 to 900)
//! - `eventpush_aws_sns_publish_message`: publishes to `topic_arn`
//!
//! Both take a `message_body`, an optional `create_only` flag and at most one
//! `kms_signature` block, and record `event_id`, `message_id` and
//! `md5_of_message_body` in state. An update resends only when the body's
//! MD5 fingerprint changed. A `create_only` resource sends nothing on
//! destroy and is replaced when its body changes.
//!
//! # Quick Start
//!
//! ```ignore
//! use eventpush_provider::{EventPushProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     eventpush_provider::init_logging();
//!
//!     let provider = EventPushProvider::new(env!("CARGO_PKG_VERSION"));
//!     provider.configure(json!({"aws": {"region": "us-east-2"}})).await?;
//!
//!     let plan = provider
//!         .plan(
//!             "eventpush_aws_sqs_send_message",
//!             None,
//!             json!({
//!                 "queue_url": "https://sqs.us-east-2.amazonaws.com/123456789012/TestQueue",
//!                 "message_body": "deployed",
//!             }),
//!         )
//!         .await?;
//!     let state = provider
//!         .create("eventpush_aws_sqs_send_message", plan.planned_state)
//!         .await?;
//!     println!("{}", state["event_id"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod message;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod service;
pub mod signing;
pub mod testing;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use config::ProviderConfig;
pub use digest::{fingerprint, same_content, ContentFingerprint};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use message::{LifecycleEvent, MessageEnvelope, OutboundMessage, LIFECYCLE_ATTRIBUTE};
pub use provider::{Backends, EventPushProvider};
pub use resources::{SnsPublishMessage, SqsSendMessage};
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use signing::{KmsSigner, MessageSigner, SignatureSpec, SigningAlgorithm};
pub use transport::{Delivery, MessageTransport, SnsTransport, SqsTransport};
pub use types::{AttributeChange, PlanResult, ProviderMetadata};
pub use validation::validate;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
