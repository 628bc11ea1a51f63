//! Provider configuration.
//!
//! ```hcl
//! provider "eventpush" {
//!   aws {
//!     region = "us-east-2"
//!   }
//! }
//! ```
//!
//! Everything is optional. Without a region the ambient AWS configuration
//! chain (environment, profile, instance metadata) decides.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};

/// The provider's configuration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Settings for the AWS clients.
    #[serde(default)]
    pub aws: Option<AwsConfig>,
}

/// The `aws` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AwsConfig {
    /// Region override.
    #[serde(default)]
    pub region: Option<String>,
}

impl ProviderConfig {
    /// The provider configuration schema.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description(
                "The Event Push provider contains resources used to send messages to various services.",
            )
            .with_block(
                "aws",
                NestedBlock::single(Block::new().with_attribute(
                    "region",
                    Attribute::optional_string()
                        .with_description("The region where AWS operations will take place."),
                )),
            )
    }

    /// Parse the host-supplied configuration. `null` means no configuration.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| ProviderError::Configuration(format!("invalid provider configuration: {}", e)))
    }

    /// The configured region override, if any.
    pub fn region(&self) -> Option<&str> {
        self.aws.as_ref()?.region.as_deref()
    }

    /// Checks beyond what the schema can express.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.region() {
            Some(region) if region.trim().is_empty() => vec![Diagnostic::error(
                "Invalid value for attribute 'aws.region'",
            )
            .with_detail("The region must not be empty; omit it to use the default configuration")
            .with_attribute("aws.region")],
            _ => Vec::new(),
        }
    }

    /// Load the shared AWS SDK configuration, applying the region override.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = self.region().filter(|r| !r.trim().is_empty()) {
            loader = loader.region(Region::new(region.to_string()));
        }
        loader.load().await
    }
}
