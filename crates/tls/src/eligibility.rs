//! Eligibility rules for automated certificate management
//!
//! Pure predicates deciding whether a hostname/listener pair should
//! enter the managed TLS flow. Ineligibility is not an error; callers
//! simply skip automated issuance for that entry.

use std::net::IpAddr;

/// Hostname that is never eligible for automated issuance.
pub const LOOPBACK_HOST: &str = "localhost";

/// Contact email value that force-disables managed TLS for a listener.
pub const EMAIL_DISABLED: &str = "off";

/// Well-known plaintext HTTP port; a binding here cannot carry TLS.
const PLAINTEXT_HTTP_PORT: u16 = 80;

/// Per-listener TLS options
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// User supplied their own certificate and key
    pub manual: bool,
    /// Issue certificates lazily, at handshake time, for hostnames
    /// learned from the incoming SNI
    pub on_demand: bool,
    /// A self-signed certificate has already been generated for this
    /// listener
    pub self_signed: bool,
    /// Contact email for the issuing authority; [`EMAIL_DISABLED`]
    /// turns managed TLS off entirely
    pub contact_email: String,
    /// Set once eligibility is confirmed and issuance begins.
    ///
    /// Treat as authoritative from then on: setting up the listener may
    /// change fields consulted by [`qualifies_for_managed_tls`], so
    /// re-running the check later can return `false` for a config that
    /// originally qualified.
    pub managed: bool,
}

/// Capability set required to evaluate a serving entity for managed TLS.
///
/// Production listeners and test doubles both implement this, so the
/// eligibility logic stays testable without a full serving stack.
pub trait ConfigHolder {
    /// The TLS options for this serving entity
    fn tls_options(&self) -> &TlsOptions;
    /// The hostname this entity serves
    fn host(&self) -> &str;
    /// The port this entity is bound to
    fn port(&self) -> u16;
}

/// Returns true if the hostname alone appears eligible for an
/// automatically managed certificate.
///
/// The loopback hostname, empty hostnames, wildcards, and IP address
/// literals are not eligible because the issuing authority cannot
/// validate those names.
pub fn host_qualifies(hostname: &str) -> bool {
    hostname != LOOPBACK_HOST
        && !hostname.trim().is_empty()
        && !hostname.contains('*')
        && hostname.parse::<IpAddr>().is_err()
}

/// Returns true if the holder qualifies for managed TLS.
///
/// This does NOT check whether a certificate and key already exist for
/// the config. If it returns true, the caller may set
/// [`TlsOptions::managed`] and must consult that flag from then on
/// instead of re-deriving eligibility.
///
/// Pure predicate: no mutation, no side effects.
pub fn qualifies_for_managed_tls(holder: Option<&dyn ConfigHolder>) -> bool {
    let Some(holder) = holder else {
        return false;
    };
    let options = holder.tls_options();

    // user might provide their own cert and key, but manual configs may
    // still opt into on-demand issuance
    (!options.manual || options.on_demand)

        // if self-signed, one has already been generated to use
        && !options.self_signed

        // managed TLS requires a TLS-capable binding
        && holder.port() != PLAINTEXT_HTTP_PORT

        // user can force-disable managed TLS per listener
        && options.contact_email != EMAIL_DISABLED

        // certificates cannot be issued for some hostname forms, but
        // on-demand tolerates an empty hostname at startup since the
        // real name arrives with the handshake SNI
        && (host_qualifies(holder.host()) || options.on_demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct TestHolder {
        options: TlsOptions,
        host: String,
        port: u16,
    }

    impl TestHolder {
        fn new(host: &str, port: u16) -> Self {
            Self {
                options: TlsOptions {
                    contact_email: "admin@example.com".to_string(),
                    ..TlsOptions::default()
                },
                host: host.to_string(),
                port,
            }
        }
    }

    impl ConfigHolder for TestHolder {
        fn tls_options(&self) -> &TlsOptions {
            &self.options
        }

        fn host(&self) -> &str {
            &self.host
        }

        fn port(&self) -> u16 {
            self.port
        }
    }

    #[test]
    fn test_host_qualifies() {
        assert!(host_qualifies("example.com"));
        assert!(host_qualifies("sub.example.com"));

        assert!(!host_qualifies("localhost"));
        assert!(!host_qualifies(""));
        assert!(!host_qualifies("   "));
        assert!(!host_qualifies("\t\n"));
        assert!(!host_qualifies("*.example.com"));
        assert!(!host_qualifies("ex*mple.com"));
        assert!(!host_qualifies("192.168.1.1"));
        assert!(!host_qualifies("::1"));
        assert!(!host_qualifies("2001:db8::1"));
    }

    #[test]
    fn test_absent_holder_never_qualifies() {
        assert!(!qualifies_for_managed_tls(None));
    }

    #[test]
    fn test_plain_config_qualifies() {
        let holder = TestHolder::new("example.com", 443);
        assert!(qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_manual_without_on_demand_disqualifies() {
        let mut holder = TestHolder::new("example.com", 443);
        holder.options.manual = true;
        assert!(!qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_manual_with_on_demand_qualifies() {
        let mut holder = TestHolder::new("example.com", 443);
        holder.options.manual = true;
        holder.options.on_demand = true;
        assert!(qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_self_signed_disqualifies() {
        let mut holder = TestHolder::new("example.com", 443);
        holder.options.self_signed = true;
        assert!(!qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_plaintext_port_disqualifies() {
        let mut holder = TestHolder::new("example.com", 80);
        holder.options.on_demand = true;
        assert!(!qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_disabled_email_disqualifies() {
        let mut holder = TestHolder::new("example.com", 443);
        holder.options.contact_email = EMAIL_DISABLED.to_string();
        assert!(!qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_on_demand_tolerates_empty_host() {
        let mut holder = TestHolder::new("", 443);
        holder.options.on_demand = true;
        assert!(qualifies_for_managed_tls(Some(&holder)));

        holder.options.on_demand = false;
        assert!(!qualifies_for_managed_tls(Some(&holder)));
    }

    #[test]
    fn test_unqualified_host_without_on_demand_disqualifies() {
        let holder = TestHolder::new("localhost", 443);
        assert!(!qualifies_for_managed_tls(Some(&holder)));
    }

    proptest! {
        #[test]
        fn prop_wildcard_hostnames_never_qualify(s in ".*\\*.*") {
            prop_assert!(!host_qualifies(&s));
        }

        #[test]
        fn prop_whitespace_only_never_qualifies(s in "[ \t\r\n]*") {
            prop_assert!(!host_qualifies(&s));
        }

        #[test]
        fn prop_ipv4_literals_never_qualify(a: u8, b: u8, c: u8, d: u8) {
            let host = format!("{}.{}.{}.{}", a, b, c, d);
            prop_assert!(!host_qualifies(&host));
        }
    }
}
