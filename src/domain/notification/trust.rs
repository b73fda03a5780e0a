//! Trust configuration and source-address filtering.

use std::collections::BTreeSet;

use secrecy::SecretString;

/// Processor push address (production).
pub const PRODUCTION_PUSH_IP: &str = "220.130.127.125";

/// Processor push address (sandbox).
pub const SANDBOX_PUSH_IP: &str = "218.32.37.148";

/// Read-only verification configuration supplied at construction.
#[derive(Clone)]
pub struct TrustContext {
    /// This integration's application identifier (`FacServiceId`).
    service_id: String,

    /// Shared signing secret (`FacKey`).
    signing_secret: Option<SecretString>,

    /// Allowlisted Notify source addresses.
    source_filter: SourceTrustFilter,
}

impl TrustContext {
    /// Creates a trust context.
    pub fn new<I, S>(
        service_id: impl Into<String>,
        signing_secret: Option<SecretString>,
        trusted_sources: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service_id: service_id.into(),
            signing_secret,
            source_filter: SourceTrustFilter::new(trusted_sources),
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn signing_secret(&self) -> Option<&SecretString> {
        self.signing_secret.as_ref()
    }

    pub fn source_filter(&self) -> &SourceTrustFilter {
        &self.source_filter
    }
}

impl std::fmt::Debug for TrustContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustContext")
            .field("service_id", &self.service_id)
            .field("signing_secret", &self.signing_secret.as_ref().map(|_| "[REDACTED]"))
            .field("source_filter", &self.source_filter)
            .finish()
    }
}

/// Exact-match allowlist of Notify source addresses.
///
/// No wildcard or CIDR matching: an address is trusted only if it equals an
/// allowlisted entry character for character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTrustFilter {
    allowed: BTreeSet<String>,
}

impl SourceTrustFilter {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: addresses.into_iter().map(Into::into).collect(),
        }
    }

    /// Processor production and sandbox push addresses.
    pub fn processor_defaults() -> Self {
        Self::new([PRODUCTION_PUSH_IP, SANDBOX_PUSH_IP])
    }

    pub fn is_trusted_source(&self, ip: &str) -> bool {
        self.allowed.contains(ip)
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
