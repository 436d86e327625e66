//! Error types for certificate management

use std::io;
use thiserror::Error;

/// Errors from certificate storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to serialize/deserialize the metadata document
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored certificate could not be parsed
    #[error("Failed to parse certificate: {0}")]
    CertificateParse(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Errors from building challenge certificates
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// Key authorization input did not have the `token.thumbprint` form
    #[error("Malformed key authorization: {0}")]
    MalformedKeyAuthorization(String),

    /// Challenge certificate generation failed
    #[error("Failed to generate challenge certificate: {0}")]
    CertificateGeneration(String),
}

impl From<rcgen::Error> for ChallengeError {
    fn from(e: rcgen::Error) -> Self {
        ChallengeError::CertificateGeneration(e.to_string())
    }
}

/// Errors reported by a [`CertificateAuthorityClient`] implementation
///
/// The wire protocol lives outside this crate; implementations map their
/// failures (including cancellation) into these variants and this crate
/// propagates them without masking.
///
/// [`CertificateAuthorityClient`]: crate::lifecycle::CertificateAuthorityClient
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// Account creation or lookup failed
    #[error("Authority account error: {0}")]
    Account(String),

    /// Certificate order failed
    #[error("Certificate order failed: {0}")]
    Order(String),

    /// Revocation request failed
    #[error("Revocation request failed: {0}")]
    Revocation(String),

    /// Any other protocol-level failure
    #[error("Authority protocol error: {0}")]
    Protocol(String),
}

/// Errors from certificate lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Revocation was requested for a domain with no stored material
    #[error("No certificate and key for '{domain}'")]
    NoCertificate { domain: String },

    /// No domains were given for an issuance operation
    #[error("No domains requested for issuance")]
    NoDomains,

    /// Account context is missing or invalid
    #[error("Account configuration error: {0}")]
    Account(String),

    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The certificate authority reported a failure
    #[error("Certificate authority error: {0}")]
    Authority(#[from] AuthorityError),

    /// The authority confirmed revocation but the local certificate file
    /// could not be deleted. Local storage is now stale relative to the
    /// authority; the caller must reconcile storage, not retry the
    /// revocation.
    #[error("Certificate for '{domain}' revoked, but unable to delete certificate file: {source}")]
    RevokedButNotDeleted {
        domain: String,
        #[source]
        source: StorageError,
    },
}
