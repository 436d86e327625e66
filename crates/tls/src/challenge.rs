//! In-memory TLS-ALPN-01 challenge certificates
//!
//! While the authority validates control of a domain, it opens a TLS
//! handshake with the challenge domain as SNI and the `acme-tls/1`
//! ALPN protocol. The solver stores a short-lived challenge certificate
//! here; the handshake layer consults the cache before its production
//! certificates and presents the challenge certificate for the
//! duration of the validation window.
//!
//! # Thread Safety
//!
//! Uses `DashMap` for lock-free concurrent access: handshake threads
//! read while the solver inserts and removes entries.

use std::sync::Arc;

use dashmap::DashMap;
use rcgen::{CertificateParams, CustomExtension, KeyPair};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::error::ChallengeError;

/// ALPN protocol name the validating authority negotiates during a
/// TLS-ALPN-01 handshake.
pub const ACME_TLS_ALPN_PROTOCOL: &[u8] = b"acme-tls/1";

/// A transient certificate proving control of a set of names.
///
/// Lifetime is bounded by the challenge window: entries are removed
/// unconditionally on cleanup, whether validation succeeded or failed.
#[derive(Debug, Clone)]
pub struct CachedChallengeCertificate {
    /// DER-encoded challenge certificate
    pub certificate_der: Vec<u8>,
    /// DER-encoded private key (PKCS#8)
    pub private_key_der: Vec<u8>,
    /// Names the certificate covers
    pub names: Vec<String>,
}

/// Map of domain name to pending challenge certificate
///
/// Owned, injectable state rather than a process global: tests create
/// isolated instances, and production wiring hands one shared handle to
/// the solver and one to the handshake layer.
#[derive(Debug, Default)]
pub struct ChallengeCache {
    entries: Arc<DashMap<String, Arc<CachedChallengeCertificate>>>,
}

impl ChallengeCache {
    /// Create a new, empty challenge cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the pending challenge certificate for a domain
    ///
    /// Called by the handshake layer when an incoming SNI may belong to
    /// an in-flight challenge.
    pub fn get(&self, domain: &str) -> Option<Arc<CachedChallengeCertificate>> {
        let result = self.entries.get(domain).map(|entry| Arc::clone(entry.value()));
        if result.is_some() {
            trace!(domain = %domain, "Challenge certificate found in cache");
        }
        result
    }

    /// Insert a challenge certificate keyed by domain
    pub fn insert(&self, domain: &str, certificate: CachedChallengeCertificate) {
        self.entries.insert(domain.to_string(), Arc::new(certificate));
    }

    /// Remove a domain's challenge certificate
    ///
    /// Removing an absent key is a no-op.
    pub fn remove(&self, domain: &str) {
        if self.entries.remove(domain).is_some() {
            debug!(domain = %domain, "Removed challenge certificate from cache");
        }
    }

    /// Number of pending challenge certificates
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Clear all pending challenge certificates
    ///
    /// Called during shutdown or reset.
    pub fn clear(&self) {
        let count = self.entries.len();
        self.entries.clear();
        if count > 0 {
            debug!(cleared = count, "Cleared all pending challenge certificates");
        }
    }
}

impl Clone for ChallengeCache {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

/// Solves TLS-ALPN-01 challenges using an existing listener and the
/// in-memory challenge cache.
///
/// The authority client drives `present`/`clean_up` around each
/// challenge round; the handshake layer serves whatever `present` put
/// in the cache.
#[derive(Debug, Clone)]
pub struct TlsAlpnSolver {
    cache: ChallengeCache,
}

impl TlsAlpnSolver {
    /// Create a solver populating the given cache
    pub fn new(cache: ChallengeCache) -> Self {
        Self { cache }
    }

    /// The cache this solver populates
    pub fn cache(&self) -> &ChallengeCache {
        &self.cache
    }

    /// Build the challenge certificate for `domain` and add it to the
    /// cache.
    ///
    /// # Errors
    ///
    /// Fails if the key authorization is malformed or certificate
    /// generation fails. The authority client decides whether to retry
    /// the challenge.
    pub fn present(
        &self,
        domain: &str,
        token: &str,
        key_authorization: &str,
    ) -> Result<(), ChallengeError> {
        let certificate = build_challenge_certificate(domain, key_authorization)?;
        debug!(domain = %domain, token = %token, "Caching TLS-ALPN-01 challenge certificate");
        self.cache.insert(domain, certificate);
        Ok(())
    }

    /// Remove the domain's challenge certificate from the cache.
    ///
    /// Called after every challenge round, validated or not. Never
    /// fails; removing an absent entry is a no-op, so the cache cannot
    /// leak an entry through an error path.
    pub fn clean_up(
        &self,
        domain: &str,
        _token: &str,
        _key_authorization: &str,
    ) -> Result<(), ChallengeError> {
        self.cache.remove(domain);
        Ok(())
    }
}

/// Build a self-signed TLS-ALPN-01 challenge certificate for `domain`.
///
/// The certificate carries the `acmeIdentifier` extension holding the
/// SHA-256 digest of the key authorization, which is what the authority
/// verifies after the handshake.
fn build_challenge_certificate(
    domain: &str,
    key_authorization: &str,
) -> Result<CachedChallengeCertificate, ChallengeError> {
    // key authorization is "<token>.<account key thumbprint>"
    let well_formed = matches!(
        key_authorization.split_once('.'),
        Some((token, thumbprint)) if !token.is_empty() && !thumbprint.is_empty()
    );
    if !well_formed {
        return Err(ChallengeError::MalformedKeyAuthorization(
            "expected '<token>.<thumbprint>' form".to_string(),
        ));
    }

    let digest = Sha256::digest(key_authorization.as_bytes());

    let key_pair = KeyPair::generate()?;
    let mut params = CertificateParams::new(vec![domain.to_string()])?;
    params
        .custom_extensions
        .push(CustomExtension::new_acme_identifier(digest.as_slice()));
    let certificate = params.self_signed(&key_pair)?;

    Ok(CachedChallengeCertificate {
        certificate_der: certificate.der().to_vec(),
        private_key_der: key_pair.serialize_der(),
        names: vec![domain.to_string()],
    })
}
