//! Notification channel dispatch and verification.
//!
//! A payload moves through a fixed sequence of stages:
//!
//! ```text
//! Start -> ChannelSelected -> TrustVerified -> FieldsValidated -> ResultExtracted
//!                  \______________\_________________\________-> Rejected
//! ```
//!
//! The channel is decided once, up front: a non-empty `DATA` field selects the
//! Notify channel, anything else the Return channel. Each channel has its own
//! extractor; both produce a `CanonicalResult` or a single rejection.

use serde_json::{Map, Value};

use super::codes::{code_equals, PAY_RESULT_SUCCESS, RETURN_CODE_OK};
use super::errors::NotificationError;
use super::payload::InboundPayload;
use super::result::{CanonicalResult, Channel};
use super::signature::{SignatureComputer, SignaturePurpose};
use super::trust::TrustContext;

/// Field carrying the Return channel's hash.
const HASH_FIELD: &str = "Hash";

/// Verification stage reached by a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    Start,
    ChannelSelected,
    TrustVerified,
    FieldsValidated,
    ResultExtracted,
}

impl VerificationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStage::Start => "start",
            VerificationStage::ChannelSelected => "channel_selected",
            VerificationStage::TrustVerified => "trust_verified",
            VerificationStage::FieldsValidated => "fields_validated",
            VerificationStage::ResultExtracted => "result_extracted",
        }
    }
}

/// A rejection together with the last stage the payload reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub stage: VerificationStage,
    pub error: NotificationError,
}

impl Rejection {
    fn at(stage: VerificationStage) -> impl Fn(NotificationError) -> Rejection {
        move |error| Rejection { stage, error }
    }
}

/// Classifies and verifies inbound notifications.
///
/// Holds only read-only configuration; every call is independent.
#[derive(Debug, Clone)]
pub struct NotificationParser {
    context: TrustContext,
    signer: SignatureComputer,
}

impl NotificationParser {
    pub fn new(context: TrustContext) -> Self {
        let signer = SignatureComputer::from_context(&context);
        Self { context, signer }
    }

    /// Decides which channel a payload belongs to.
    pub fn select_channel(payload: &InboundPayload) -> Channel {
        if payload.notify_data().is_some() {
            Channel::Notify
        } else {
            Channel::Return
        }
    }

    /// Verifies a payload into exactly one canonical result.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as a `NotificationError`; no partial
    /// result is ever produced.
    pub fn parse(&self, payload: &InboundPayload) -> Result<CanonicalResult, NotificationError> {
        self.parse_with_stage(payload).map_err(|rejection| rejection.error)
    }

    /// Like [`parse`](Self::parse), but reports the stage a rejection happened at.
    pub fn parse_with_stage(&self, payload: &InboundPayload) -> Result<CanonicalResult, Rejection> {
        let channel = Self::select_channel(payload);
        tracing::debug!(channel = %channel, client_ip = payload.client_ip(), "Notification channel selected");

        let outcome = match channel {
            Channel::Return => extract_return(&self.signer, payload),
            Channel::Notify => extract_notify(&self.context, payload),
        };

        match &outcome {
            Ok(result) => tracing::info!(
                channel = %channel,
                transaction_id = %result.transaction_id,
                code = %result.code,
                "Notification verified"
            ),
            Err(rejection) => tracing::warn!(
                channel = %channel,
                stage = rejection.stage.as_str(),
                reason = %rejection.error,
                client_ip = payload.client_ip(),
                "Notification rejected"
            ),
        }

        outcome
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Return channel
// ════════════════════════════════════════════════════════════════════════════════

fn extract_return(
    signer: &SignatureComputer,
    payload: &InboundPayload,
) -> Result<CanonicalResult, Rejection> {
    verify_return_codes(payload).map_err(Rejection::at(VerificationStage::ChannelSelected))?;
    verify_return_signature(signer, payload)
        .map_err(Rejection::at(VerificationStage::ChannelSelected))?;

    let transaction_id = Some(payload.get_or_empty("FacTradeSeq"))
        .filter(|seq| !seq.is_empty())
        .ok_or(NotificationError::MissingField("FacTradeSeq"))
        .map_err(Rejection::at(VerificationStage::TrustVerified))?;

    let raw_payload: Map<String, Value> = payload
        .fields()
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    Ok(CanonicalResult {
        code: payload.get_or_empty("ReturnCode").to_string(),
        message: payload.get_or_empty("ReturnMsg").to_string(),
        transaction_id: transaction_id.to_string(),
        channel: Channel::Return,
        raw_payload: Value::Object(raw_payload),
    })
}

/// `ReturnCode == 1` only means the processor received the request;
/// `PayResult == 3` is what says the payment went through. Both are required.
fn verify_return_codes(payload: &InboundPayload) -> Result<(), NotificationError> {
    let processor_message =
        || NotificationError::ProcessorRejected(payload.get_or_empty("ReturnMsg").to_string());

    if !code_equals(payload.get_or_empty("ReturnCode"), RETURN_CODE_OK) {
        return Err(processor_message());
    }
    if !code_equals(payload.get_or_empty("PayResult"), PAY_RESULT_SUCCESS) {
        return Err(processor_message());
    }
    Ok(())
}

fn verify_return_signature(
    signer: &SignatureComputer,
    payload: &InboundPayload,
) -> Result<(), NotificationError> {
    let supplied = payload.get_or_empty(HASH_FIELD);
    if signer.verify(payload.fields(), SignaturePurpose::ReturnHash, supplied)? {
        Ok(())
    } else {
        Err(NotificationError::SignatureMismatch)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Notify channel
// ════════════════════════════════════════════════════════════════════════════════

fn extract_notify(
    context: &TrustContext,
    payload: &InboundPayload,
) -> Result<CanonicalResult, Rejection> {
    if !context.source_filter().is_trusted_source(payload.client_ip()) {
        return Err(Rejection::at(VerificationStage::ChannelSelected)(
            NotificationError::UntrustedSource,
        ));
    }

    let document = parse_notify_document(payload.notify_data().unwrap_or_default())
        .map_err(Rejection::at(VerificationStage::TrustVerified))?;
    validate_notify_fields(context, &document)
        .map_err(Rejection::at(VerificationStage::TrustVerified))?;

    // Batched pushes list several trade sequences; only the last one is
    // reported. Callers rely on one transaction per result.
    let transaction_id = last_trade_sequence(document.get("FacTradeSeq"))
        .ok_or(NotificationError::MissingField("FacTradeSeq"))
        .map_err(Rejection::at(VerificationStage::FieldsValidated))?;

    Ok(CanonicalResult {
        code: document.get("ReturnCode").map(value_text).unwrap_or_default(),
        message: document.get("ReturnMsg").map(value_text).unwrap_or_default(),
        transaction_id,
        channel: Channel::Notify,
        raw_payload: Value::Object(document),
    })
}

fn parse_notify_document(data: &str) -> Result<Map<String, Value>, NotificationError> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(NotificationError::MalformedData(
            "expected a JSON object".to_string(),
        )),
        Err(e) => Err(NotificationError::MalformedData(e.to_string())),
    }
}

fn validate_notify_fields(
    context: &TrustContext,
    document: &Map<String, Value>,
) -> Result<(), NotificationError> {
    for field in ["ReturnCode", "ReturnMsg", "FacServiceId"] {
        if document.get(field).map_or(true, is_blank) {
            return Err(NotificationError::MissingField(field));
        }
    }

    let service_id = document.get("FacServiceId").map(value_text).unwrap_or_default();
    if service_id != context.service_id() {
        return Err(NotificationError::ServiceIdMismatch);
    }

    let return_code = document.get("ReturnCode").map(value_text).unwrap_or_default();
    if !code_equals(&return_code, RETURN_CODE_OK) {
        let message = document.get("ReturnMsg").map(value_text).unwrap_or_default();
        return Err(NotificationError::ProcessorRejected(message));
    }

    Ok(())
}

/// The last listed sequence, or the single value. Only null and `""` count
/// as missing here; `"0"` is a valid sequence.
fn last_trade_sequence(value: Option<&Value>) -> Option<String> {
    let selected = match value? {
        Value::Array(items) => items.last()?,
        single => single,
    };
    Some(value_text(selected)).filter(|seq| !seq.is_empty())
}

// ════════════════════════════════════════════════════════════════════════════════
// Field helpers
// ════════════════════════════════════════════════════════════════════════════════

/// Null, `""`, `"0"`, `0`, `false` and empty containers count as missing.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
