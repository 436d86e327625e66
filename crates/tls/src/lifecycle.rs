//! Certificate lifecycle orchestration
//!
//! Save-after-issuance, revocation, and existing-material lookup. The
//! ACME wire protocol itself lives behind [`CertificateAuthorityClient`];
//! this module sequences its results against the [`CertificateStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AuthorityError, LifecycleError};
use crate::storage::{CertificateResource, CertificateStore};

/// Let's Encrypt production directory URL
pub const LETSENCRYPT_PRODUCTION: &str = "https://acme-v02.api.letsencrypt.org/directory";
/// Let's Encrypt staging directory URL
pub const LETSENCRYPT_STAGING: &str = "https://acme-staging-v02.api.letsencrypt.org/directory";

/// Client for an ACME certificate authority
///
/// Implementations negotiate challenges, poll authorizations, and drive
/// issuance and revocation requests; this crate only consumes the
/// results. Failures and cancellations from the client propagate to the
/// caller unmasked.
#[async_trait]
pub trait CertificateAuthorityClient: Send + Sync {
    /// Obtain (issue or renew) a certificate covering `domains`
    async fn obtain_certificate(
        &self,
        domains: &[String],
    ) -> Result<CertificateResource, AuthorityError>;

    /// Revoke a previously issued certificate, given its stored bytes
    async fn revoke_certificate(&self, certificate: &[u8]) -> Result<(), AuthorityError>;
}

/// Account context binding lifecycle operations to an authority account
///
/// There is no ambient default account: every [`CertificateManager`]
/// carries its own explicit context, and construction fails without a
/// contact email.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Contact email registered with the authority
    pub email: String,
    /// ACME directory endpoint
    pub directory_url: String,
    /// Whether the subscriber agreement has been accepted
    pub terms_agreed: bool,
}

impl AccountConfig {
    /// Account context for the Let's Encrypt production endpoint
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            directory_url: LETSENCRYPT_PRODUCTION.to_string(),
            terms_agreed: false,
        }
    }

    /// Use a different ACME directory endpoint
    pub fn with_directory_url(mut self, url: impl Into<String>) -> Self {
        self.directory_url = url.into();
        self
    }

    /// Record acceptance of the subscriber agreement
    pub fn agree_to_terms(mut self) -> Self {
        self.terms_agreed = true;
        self
    }
}

/// Orchestrates issuance persistence and revocation for managed domains
pub struct CertificateManager {
    /// Durable certificate storage
    store: Arc<CertificateStore>,
    /// External authority client bound to `account`
    authority: Arc<dyn CertificateAuthorityClient>,
    /// Account context for authority operations
    account: AccountConfig,
}

impl CertificateManager {
    /// Create a manager for the given store, authority client, and
    /// account context
    ///
    /// # Errors
    ///
    /// Fails if the account has no contact email; lifecycle operations
    /// never fall back to an implicit account.
    pub fn new(
        store: Arc<CertificateStore>,
        authority: Arc<dyn CertificateAuthorityClient>,
        account: AccountConfig,
    ) -> Result<Self, LifecycleError> {
        if account.email.trim().is_empty() {
            return Err(LifecycleError::Account(
                "an authority account email is required".to_string(),
            ));
        }

        Ok(Self {
            store,
            authority,
            account,
        })
    }

    /// The underlying certificate store
    pub fn store(&self) -> &CertificateStore {
        &self.store
    }

    /// The account context this manager operates under
    pub fn account(&self) -> &AccountConfig {
        &self.account
    }

    /// Returns true if certificate and key material is already stored
    /// for the domain
    pub fn has_existing_certificate_and_key(&self, domain: &str) -> bool {
        self.store.has_existing_certificate_and_key(domain)
    }

    /// Obtain a certificate covering `domains` and persist it
    pub async fn obtain_and_store(
        &self,
        domains: &[String],
    ) -> Result<CertificateResource, LifecycleError> {
        if domains.is_empty() {
            return Err(LifecycleError::NoDomains);
        }

        let resource = self.authority.obtain_certificate(domains).await?;
        self.store.save_certificate_resource(&resource)?;

        info!(
            domain = %resource.domain,
            email = %self.account.email,
            "Obtained and stored certificate"
        );
        Ok(resource)
    }

    /// Obtain a certificate only when none is stored or the stored one
    /// falls within the renewal window
    ///
    /// Call during startup or from a renewal scheduler to avoid
    /// duplicate issuance.
    pub async fn ensure_certificate(
        &self,
        domains: &[String],
        renew_before_days: u32,
    ) -> Result<(), LifecycleError> {
        let primary = domains.first().ok_or(LifecycleError::NoDomains)?;

        if self.store.needs_renewal(primary, renew_before_days)? {
            info!(domain = %primary, "Certificate issuance required");
            self.obtain_and_store(domains).await?;
        } else {
            debug!(domain = %primary, "Stored certificate is still valid");
        }

        Ok(())
    }

    /// Revoke the certificate stored for `domain`
    ///
    /// On success the certificate file is deleted; the key and metadata
    /// files remain. If the authority confirms the revocation but the
    /// local delete then fails, this returns
    /// [`LifecycleError::RevokedButNotDeleted`]: local storage is stale
    /// relative to authority state, and the caller must reconcile
    /// storage rather than retry the revocation.
    pub async fn revoke(&self, domain: &str) -> Result<(), LifecycleError> {
        if !self.store.has_existing_certificate_and_key(domain) {
            return Err(LifecycleError::NoCertificate {
                domain: domain.to_string(),
            });
        }

        let certificate = self.store.read_certificate_bytes(domain)?;
        self.authority.revoke_certificate(&certificate).await?;
        info!(domain = %domain, "Certificate revoked with authority");

        if let Err(source) = self.store.delete_certificate_file(domain) {
            return Err(LifecycleError::RevokedButNotDeleted {
                domain: domain.to_string(),
                source,
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for CertificateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateManager")
            .field("store", &self.store)
            .field("account", &self.account)
            .finish()
    }
}
