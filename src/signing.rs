//! KMS message signing.
//!
//! The body is hashed locally with SHA-256 and only the digest is sent to the
//! signing service, flagged as pre-digested. The returned signature is base64
//! encoded so it can travel as a string message attribute.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::{MessageType, SigningAlgorithmSpec};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use crate::error::ProviderError;

/// Message attribute that carries the signature unless configured otherwise.
pub const DEFAULT_SIGNATURE_ATTRIBUTE: &str = "X-KMS-Signature";

/// Signing algorithms accepted in a `kms_signature` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SigningAlgorithm {
    /// RSA PKCS#1 v1.5 over a SHA-256 digest.
    #[default]
    RsassaPkcs1V15Sha256,
}

impl SigningAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [SigningAlgorithm; 1] = [SigningAlgorithm::RsassaPkcs1V15Sha256];

    /// The KMS name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsassaPkcs1V15Sha256 => "RSASSA_PKCS1_V1_5_SHA_256",
        }
    }

    fn to_kms(self) -> SigningAlgorithmSpec {
        match self {
            Self::RsassaPkcs1V15Sha256 => SigningAlgorithmSpec::RsassaPkcs1V15Sha256,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = ProviderError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ProviderError::Validation(format!("unsupported signing algorithm: {}", s))
            })
    }
}

/// What to sign with and where to put the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSpec {
    /// KMS key id, alias or ARN.
    pub key_id: String,
    /// Message attribute that receives the signature.
    pub attribute_name: String,
    /// Signing algorithm.
    pub algorithm: SigningAlgorithm,
}

impl SignatureSpec {
    /// A spec with the default attribute name and algorithm.
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            attribute_name: DEFAULT_SIGNATURE_ATTRIBUTE.to_string(),
            algorithm: SigningAlgorithm::default(),
        }
    }

    /// Override the attribute name.
    pub fn with_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.attribute_name = name.into();
        self
    }

    /// Override the algorithm.
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// A service that produces detached signatures over SHA-256 digests.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Sign a pre-computed digest, returning the raw signature bytes.
    async fn sign_digest(
        &self,
        key_id: &str,
        digest: &[u8; 32],
        algorithm: SigningAlgorithm,
    ) -> Result<Vec<u8>, ProviderError>;
}

/// SHA-256 of the message body.
pub fn body_digest(body: &str) -> [u8; 32] {
    Sha256::digest(body.as_bytes()).into()
}

/// Sign `body` per `spec`, returning the base64-encoded signature.
///
/// Errors from the signer are returned as-is and never retried.
pub async fn sign(
    signer: &dyn MessageSigner,
    body: &str,
    spec: &SignatureSpec,
) -> Result<String, ProviderError> {
    let digest = body_digest(body);
    let signature = signer
        .sign_digest(&spec.key_id, &digest, spec.algorithm)
        .await?;
    Ok(STANDARD.encode(signature))
}

/// [`MessageSigner`] backed by AWS KMS `Sign`.
#[derive(Debug, Clone)]
pub struct KmsSigner {
    client: aws_sdk_kms::Client,
}

impl KmsSigner {
    /// Wrap a KMS client.
    pub fn new(client: aws_sdk_kms::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageSigner for KmsSigner {
    #[instrument(skip(self, digest), name = "kms.sign")]
    async fn sign_digest(
        &self,
        key_id: &str,
        digest: &[u8; 32],
        algorithm: SigningAlgorithm,
    ) -> Result<Vec<u8>, ProviderError> {
        let output = self
            .client
            .sign()
            .key_id(key_id)
            .message(Blob::new(digest.to_vec()))
            .message_type(MessageType::Digest)
            .signing_algorithm(algorithm.to_kms())
            .send()
            .await
            .map_err(|e| ProviderError::Signing(DisplayErrorContext(&e).to_string()))?;

        let signature = output
            .signature
            .ok_or_else(|| ProviderError::Signing("no signature in KMS response".to_string()))?;
        debug!(key_id, "KMS signature received");
        Ok(signature.into_inner())
    }
}
