//! Pluggable DNS providers for DNS-01 challenges
//!
//! Defines the capability DNS provider plugins implement and the
//! registry they are wired into at configuration time. Solving the
//! challenge (record creation, propagation polling, cleanup) is the
//! plugins' concern; this module owns only the registration contract
//! and the record-shape helpers they share.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Result type for DNS operations
pub type DnsResult<T> = Result<T, DnsProviderError>;

/// Errors that can occur during DNS provider operations
#[derive(Debug, Error)]
pub enum DnsProviderError {
    /// Authentication failed with the DNS provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone not found for the domain
    #[error("Zone not found for domain '{domain}'")]
    ZoneNotFound { domain: String },

    /// Record creation failed
    #[error("Failed to create TXT record for '{record_name}': {message}")]
    RecordCreation {
        record_name: String,
        message: String,
    },

    /// Record deletion failed
    #[error("Failed to delete TXT record '{record_id}': {message}")]
    RecordDeletion { record_id: String, message: String },

    /// Credential loading or validation failed
    #[error("Failed to load credentials: {0}")]
    Credentials(String),

    /// No constructor registered under the requested name
    #[error("Unknown DNS provider '{0}'")]
    UnknownProvider(String),
}

/// Capability to solve DNS-01 challenges for a set of zones
///
/// Implementations must be thread-safe and support concurrent
/// operations.
#[async_trait]
pub trait DnsProvider: Send + Sync + Debug {
    /// Provider name (e.g., "cloudflare")
    fn name(&self) -> &'static str;

    /// Create a TXT record for a DNS-01 challenge
    ///
    /// Returns the record ID for later cleanup. Challenge records
    /// should use a short TTL ([`CHALLENGE_TTL`]).
    async fn create_txt_record(
        &self,
        domain: &str,
        record_name: &str,
        record_value: &str,
    ) -> DnsResult<String>;

    /// Delete a TXT record after challenge validation
    ///
    /// Called during cleanup even if validation failed; deleting an
    /// absent record should not error.
    async fn delete_txt_record(&self, domain: &str, record_id: &str) -> DnsResult<()>;
}

/// Factory producing a DNS provider from credential arguments
pub type DnsProviderConstructor = fn(credentials: &[String]) -> DnsResult<Arc<dyn DnsProvider>>;

/// Registry of DNS provider factories, keyed by provider name
///
/// Owned, injectable state rather than a process global, so tests can
/// instantiate isolated registries. Registration is configuration-time
/// wiring, not a runtime hot path; there is no removal operation, and
/// the last registration for a name wins.
#[derive(Debug, Default)]
pub struct DnsProviderRegistry {
    constructors: RwLock<HashMap<String, DnsProviderConstructor>>,
}

impl DnsProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` under `name`, replacing any previous
    /// registration for that name
    pub fn register(&self, name: &str, constructor: DnsProviderConstructor) {
        debug!(provider = %name, "Registered DNS provider");
        self.constructors
            .write()
            .insert(name.to_string(), constructor);
    }

    /// Look up the constructor registered under `name`
    pub fn constructor(&self, name: &str) -> Option<DnsProviderConstructor> {
        self.constructors.read().get(name).copied()
    }

    /// Construct a provider by registered name
    pub fn create(
        &self,
        name: &str,
        credentials: &[String],
    ) -> DnsResult<Arc<dyn DnsProvider>> {
        let constructor = self
            .constructor(name)
            .ok_or_else(|| DnsProviderError::UnknownProvider(name.to_string()))?;
        constructor(credentials)
    }

    /// Names of all registered providers
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// ACME challenge record name prefix
pub const ACME_CHALLENGE_RECORD: &str = "_acme-challenge";

/// Recommended TTL for challenge records (seconds)
pub const CHALLENGE_TTL: u32 = 60;

/// Strip a leading wildcard label
///
/// Challenge records for `*.example.com` are placed on the base domain.
pub fn normalize_domain(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Build the full ACME challenge record name
///
/// For `example.com`, returns `_acme-challenge.example.com`.
pub fn challenge_record_fqdn(domain: &str) -> String {
    format!("{}.{}", ACME_CHALLENGE_RECORD, normalize_domain(domain))
}

/// Compute the DNS-01 record value from a key authorization
///
/// The value is the base64url-encoded (unpadded) SHA-256 digest of the
/// key authorization.
pub fn dns01_record_value(key_authorization: &str) -> String {
    let digest = Sha256::digest(key_authorization.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
