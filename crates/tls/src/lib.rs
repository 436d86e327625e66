//! Automatic TLS certificate management for the Rampart host server
//!
//! Decides, per hostname/listener pair, whether automated certificate
//! management applies; holds short-lived challenge certificates in
//! memory so a concurrent handshake can present them to the validating
//! authority; and defines the durable on-disk layout for issued
//! certificate material.
//!
//! # Architecture
//!
//! - [`eligibility`] - pure predicates gating the managed TLS flow
//! - [`ChallengeCache`] / [`TlsAlpnSolver`] - in-memory TLS-ALPN-01
//!   challenge certificates for in-flight validations
//! - [`CertificateStore`] - durable per-domain persistence of
//!   certificate, key, and metadata
//! - [`CertificateManager`] - save-after-issuance and revocation
//!   against a [`CertificateAuthorityClient`]
//! - [`DnsProviderRegistry`] - registration table for pluggable DNS-01
//!   providers
//!
//! # Challenge Flow
//!
//! When the authority validates control of a domain:
//!
//! 1. The authority client receives a challenge token and key
//!    authorization for the domain
//! 2. [`TlsAlpnSolver::present`] builds the challenge certificate and
//!    caches it under the domain name
//! 3. The authority connects to the TLS listener with the domain as SNI
//!    and the `acme-tls/1` ALPN protocol
//! 4. The handshake layer consults the [`ChallengeCache`] before its
//!    production certificates and presents the challenge certificate
//! 5. [`TlsAlpnSolver::clean_up`] removes the entry once the round
//!    completes, validated or not
//! 6. On success, the issued [`CertificateResource`] is persisted via
//!    [`CertificateStore::save_certificate_resource`]
//!
//! The ACME protocol client, the TLS handshake server, and
//! configuration loading are external collaborators; this crate defines
//! the contracts they implement or consume.

pub mod challenge;
pub mod dns;
pub mod eligibility;
pub mod error;
pub mod lifecycle;
pub mod storage;

pub use challenge::{
    CachedChallengeCertificate, ChallengeCache, TlsAlpnSolver, ACME_TLS_ALPN_PROTOCOL,
};
pub use dns::{
    DnsProvider, DnsProviderConstructor, DnsProviderError, DnsProviderRegistry, DnsResult,
};
pub use eligibility::{
    host_qualifies, qualifies_for_managed_tls, ConfigHolder, TlsOptions, EMAIL_DISABLED,
};
pub use error::{AuthorityError, ChallengeError, LifecycleError, StorageError};
pub use lifecycle::{AccountConfig, CertificateAuthorityClient, CertificateManager};
pub use storage::{certificate_expiry, CertificateResource, CertificateStore};
