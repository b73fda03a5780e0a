//! Rejection reasons for inbound payment notifications.
//!
//! Every failed verification ends in exactly one `NotificationError`. The
//! display text of each variant is the reason string reported to callers,
//! with HTTP status mapping for the inbound adapter.

use axum::http::StatusCode;
use thiserror::Error;

/// Reasons a notification is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// Recomputed Return hash does not match the supplied `Hash` field.
    #[error("Sign Error")]
    SignatureMismatch,

    /// Notify push arrived from an address outside the allowlist.
    #[error("IP Is Not Allowed")]
    UntrustedSource,

    /// The `DATA` field is not valid JSON.
    #[error("Invalid DATA payload: {0}")]
    MalformedData(String),

    /// A required processor field is absent or empty.
    #[error("Missing MyCard {0}")]
    MissingField(&'static str),

    /// `FacServiceId` does not belong to this integration.
    #[error("Factory Service Id Not Matched")]
    ServiceIdMismatch,

    /// The processor reported a failure; the message is echoed verbatim.
    #[error("{0}")]
    ProcessorRejected(String),

    /// Verification cannot run with the supplied configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NotificationError {
    /// Human-readable rejection reason.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Rejections are final; a caller retries by resubmitting the payload.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Maps the rejection to the status returned to the notifying party.
    pub fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            NotificationError::UntrustedSource => StatusCode::FORBIDDEN,
            NotificationError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NotificationError::MalformedData(_)
            | NotificationError::MissingField(_)
            | NotificationError::ServiceIdMismatch
            | NotificationError::ProcessorRejected(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable code for error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            NotificationError::SignatureMismatch => "SIGNATURE_MISMATCH",
            NotificationError::UntrustedSource => "UNTRUSTED_SOURCE",
            NotificationError::MalformedData(_) => "MALFORMED_DATA",
            NotificationError::MissingField(_) => "MISSING_FIELD",
            NotificationError::ServiceIdMismatch => "SERVICE_ID_MISMATCH",
            NotificationError::ProcessorRejected(_) => "PROCESSOR_REJECTED",
            NotificationError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Reason Text Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_mismatch_reason() {
        assert_eq!(NotificationError::SignatureMismatch.reason(), "Sign Error");
    }

    #[test]
    fn untrusted_source_reason() {
        assert_eq!(NotificationError::UntrustedSource.reason(), "IP Is Not Allowed");
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = NotificationError::MissingField("FacServiceId");
        assert_eq!(err.reason(), "Missing MyCard FacServiceId");
    }

    #[test]
    fn service_id_mismatch_reason() {
        assert_eq!(
            NotificationError::ServiceIdMismatch.reason(),
            "Factory Service Id Not Matched"
        );
    }

    #[test]
    fn processor_message_is_echoed_verbatim() {
        let err = NotificationError::ProcessorRejected("交易失敗".to_string());
        assert_eq!(err.reason(), "交易失敗");
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_mismatch_returns_unauthorized() {
        assert_eq!(
            NotificationError::SignatureMismatch.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn untrusted_source_returns_forbidden() {
        assert_eq!(
            NotificationError::UntrustedSource.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn configuration_returns_internal_error() {
        let err = NotificationError::Configuration("missing signing secret".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn field_problems_return_bad_request() {
        assert_eq!(
            NotificationError::MissingField("ReturnMsg").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NotificationError::MalformedData("eof".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn no_rejection_is_retryable() {
        assert!(!NotificationError::SignatureMismatch.is_retryable());
        assert!(!NotificationError::ProcessorRejected("busy".to_string()).is_retryable());
    }
}
