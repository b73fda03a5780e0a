//! Payment processor configuration (MyCard)

use std::net::IpAddr;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::mycard::MyCardTransportConfig;
use crate::domain::notification::{TrustContext, PRODUCTION_PUSH_IP, SANDBOX_PUSH_IP};

/// Payment processor configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessorConfig {
    /// Application identifier assigned by the processor (FacServiceId)
    pub fac_service_id: String,

    /// Shared signing key (FacKey)
    pub fac_key: String,

    /// Allowlisted Notify source addresses (comma-separated)
    pub trusted_ips: Option<String>,

    /// Use the sandbox API host
    #[serde(default)]
    pub sandbox: bool,

    /// Override for the API host
    pub api_base_url: Option<String>,

    /// Processor API request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ProcessorConfig {
    /// Allowlisted addresses, falling back to the processor's push addresses
    pub fn trusted_ips_list(&self) -> Vec<String> {
        match &self.trusted_ips {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => vec![PRODUCTION_PUSH_IP.to_string(), SANDBOX_PUSH_IP.to_string()],
        }
    }

    /// Build the verification trust context
    pub fn trust_context(&self) -> TrustContext {
        let secret = Some(self.fac_key.clone())
            .filter(|key| !key.is_empty())
            .map(SecretString::new);
        TrustContext::new(self.fac_service_id.clone(), secret, self.trusted_ips_list())
    }

    /// Build the HTTP transport configuration
    pub fn transport_config(&self) -> MyCardTransportConfig {
        let base = if self.sandbox {
            MyCardTransportConfig::sandbox()
        } else {
            MyCardTransportConfig::production()
        };
        let base = match &self.api_base_url {
            Some(url) => base.with_base_url(url.clone()),
            None => base,
        };
        base.with_timeout(Duration::from_secs(self.request_timeout_secs))
    }

    /// Validate processor configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fac_service_id.is_empty() {
            return Err(ValidationError::MissingRequired("PROCESSOR__FAC_SERVICE_ID"));
        }
        if self.fac_key.is_empty() {
            return Err(ValidationError::MissingRequired("PROCESSOR__FAC_KEY"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        let ips = self.trusted_ips_list();
        if ips.is_empty() {
            return Err(ValidationError::EmptyTrustedIps);
        }
        // Matching stays exact-string; this only catches typos.
        if let Some(bad) = ips.iter().find(|ip| ip.parse::<IpAddr>().is_err()) {
            return Err(ValidationError::InvalidTrustedIp(bad.clone()));
        }

        if let Some(url) = &self.api_base_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidApiBaseUrl(url.clone()));
            }
        }

        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    30
}
