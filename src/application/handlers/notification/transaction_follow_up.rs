//! TransactionFollowUp - processor calls that follow a verified notification.
//!
//! Holds the parameter set of the current trade and an optional `AuthCode`
//! token, and issues authorization, trade query and confirm calls through the
//! `ProcessorTransport` port. Calls are sequential and never retried here.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::notification::{
    code_equals, NotificationError, SignatureComputer, SignaturePurpose, PAY_RESULT_SUCCESS,
    RETURN_CODE_OK,
};
use crate::ports::{
    ProcessorOperation, ProcessorRequest, ProcessorResponse, ProcessorTransport, TransportError,
};

/// Processor token correlating calls to one trade (`AuthCode`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionRef(String);

impl TransactionRef {
    /// Returns `None` for an empty token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Channel the authorized trade will be paid through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradeType {
    /// In-app SDK flow.
    Sdk,
    /// Browser flow.
    #[default]
    Web,
}

impl TradeType {
    fn as_param(&self) -> &'static str {
        match self {
            TradeType::Sdk => "1",
            TradeType::Web => "2",
        }
    }
}

/// Request for a new trade authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Merchant trade sequence.
    pub fac_trade_seq: String,
    pub trade_type: TradeType,
    pub customer_id: String,
    pub product_name: String,
    /// Decimal amount as text, e.g. `"150"`.
    pub amount: String,
    pub currency: String,
    pub sandbox: bool,
}

/// Processor answer to an authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub auth_code: TransactionRef,
    pub trade_seq: Option<String>,
    /// Payment page for browser trades.
    pub transaction_url: Option<String>,
}

/// Trade status returned by a trade query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    pub return_code: String,
    pub return_msg: String,
    pub pay_result: String,
    pub fac_trade_seq: String,
    pub payment_type: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub mycard_trade_no: Option<String>,
    pub mycard_type: Option<String>,
    pub promo_code: Option<String>,
    pub serial_id: Option<String>,
}

impl TransactionStatus {
    fn from_response(response: &ProcessorResponse) -> Self {
        Self {
            return_code: response.text("ReturnCode").unwrap_or_default(),
            return_msg: response.text("ReturnMsg").unwrap_or_default(),
            pay_result: response.text("PayResult").unwrap_or_default(),
            fac_trade_seq: response.text("FacTradeSeq").unwrap_or_default(),
            payment_type: response.text("PaymentType"),
            amount: response.text("Amount"),
            currency: response.text("Currency"),
            mycard_trade_no: response.text("MyCardTradeNo"),
            mycard_type: response.text("MyCardType"),
            promo_code: response.text("PromoCode"),
            serial_id: response.text("SerialId"),
        }
    }

    /// `PayResult == 3`.
    pub fn is_paid(&self) -> bool {
        code_equals(&self.pay_result, PAY_RESULT_SUCCESS)
    }
}

/// Processor answer to a confirm call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationOutcome {
    pub return_code: String,
    pub return_msg: String,
    pub fac_trade_seq: Option<String>,
    pub trade_seq: Option<String>,
    pub serial_id: Option<String>,
}

impl ConfirmationOutcome {
    fn from_response(response: &ProcessorResponse) -> Self {
        Self {
            return_code: response.text("ReturnCode").unwrap_or_default(),
            return_msg: response.text("ReturnMsg").unwrap_or_default(),
            fac_trade_seq: response.text("FacTradeSeq"),
            trade_seq: response.text("TradeSeq"),
            serial_id: response.text("SerialId"),
        }
    }
}

/// Result of `confirm_transaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// No token is held, nothing was sent. Not an error.
    NotApplicable,

    /// The processor confirmed the trade.
    Confirmed(ConfirmationOutcome),
}

impl ConfirmOutcome {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, ConfirmOutcome::NotApplicable)
    }
}

/// Errors from follow-up calls.
#[derive(Debug, Clone, Error)]
pub enum FollowUpError {
    /// The processor answered with a failure `ReturnCode`.
    #[error("Processor rejected {operation}: {message} (code {code})")]
    Rejected {
        operation: ProcessorOperation,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A required response field is missing.
    #[error("Invalid processor response: {0}")]
    InvalidResponse(String),

    /// Outbound request could not be signed.
    #[error("Signing failed: {0}")]
    Signing(#[from] NotificationError),
}

impl FollowUpError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FollowUpError::Transport(e) if e.retryable)
    }
}

/// Issues processor calls for one trade.
pub struct TransactionFollowUp {
    transport: Arc<dyn ProcessorTransport>,
    signer: SignatureComputer,
    parameters: BTreeMap<String, String>,
    token: Option<TransactionRef>,
    last_response: Option<ProcessorResponse>,
}

impl TransactionFollowUp {
    pub fn new(
        transport: Arc<dyn ProcessorTransport>,
        signer: SignatureComputer,
        service_id: impl Into<String>,
    ) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("FacServiceId".to_string(), service_id.into());

        Self {
            transport,
            signer,
            parameters,
            token: None,
            last_response: None,
        }
    }

    /// Adds or replaces a parameter forwarded with every call.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn set_token(&mut self, token: Option<TransactionRef>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&TransactionRef> {
        self.token.as_ref()
    }

    /// Raw body of the most recent call, if any.
    pub fn last_response(&self) -> Option<&ProcessorResponse> {
        self.last_response.as_ref()
    }

    /// Requests an `AuthCode` for a new trade and holds it as the current token.
    pub async fn authorize(
        &mut self,
        request: AuthorizationRequest,
    ) -> Result<Authorization, FollowUpError> {
        self.last_response = None;

        let mut params = self.parameters.clone();
        params.insert("FacTradeSeq".to_string(), request.fac_trade_seq);
        params.insert("TradeType".to_string(), request.trade_type.as_param().to_string());
        params.insert("CustomerId".to_string(), request.customer_id);
        params.insert("ProductName".to_string(), request.product_name);
        params.insert("Amount".to_string(), request.amount);
        params.insert("Currency".to_string(), request.currency);
        params.insert(
            "SandBoxMode".to_string(),
            if request.sandbox { "true" } else { "false" }.to_string(),
        );
        let hash = self
            .signer
            .compute_signature(&params, SignaturePurpose::AuthRequest)?;
        params.insert("Hash".to_string(), hash);

        let response = self.call(ProcessorOperation::Authorize, params).await?;

        let auth_code = response
            .text("AuthCode")
            .and_then(TransactionRef::new)
            .ok_or_else(|| FollowUpError::InvalidResponse("missing AuthCode".to_string()))?;
        self.token = Some(auth_code.clone());

        Ok(Authorization {
            auth_code,
            trade_seq: response.text("TradeSeq"),
            transaction_url: response.text("TransactionUrl"),
        })
    }

    /// Queries the trade identified by `token`.
    ///
    /// Always issues the call; any previously held response is dropped first.
    pub async fn fetch_transaction(
        &mut self,
        token: TransactionRef,
    ) -> Result<TransactionStatus, FollowUpError> {
        self.last_response = None;
        self.token = Some(token.clone());

        let mut params = self.parameters.clone();
        params.insert("AuthCode".to_string(), token.to_string());

        let response = self.call(ProcessorOperation::TradeQuery, params).await?;
        Ok(TransactionStatus::from_response(&response))
    }

    /// Confirms (captures) the trade for the held token.
    ///
    /// Without a token this returns `ConfirmOutcome::NotApplicable` and sends
    /// nothing. A second confirm of the same trade fails at the processor and
    /// is reported, not retried.
    pub async fn confirm_transaction(&mut self) -> Result<ConfirmOutcome, FollowUpError> {
        self.last_response = None;

        let Some(token) = self.token.clone() else {
            tracing::debug!("No AuthCode held, skipping payment confirm");
            return Ok(ConfirmOutcome::NotApplicable);
        };

        let mut params = self.parameters.clone();
        params.insert("AuthCode".to_string(), token.to_string());

        let response = self.call(ProcessorOperation::PaymentConfirm, params).await?;
        Ok(ConfirmOutcome::Confirmed(ConfirmationOutcome::from_response(
            &response,
        )))
    }

    async fn call(
        &mut self,
        operation: ProcessorOperation,
        parameters: BTreeMap<String, String>,
    ) -> Result<ProcessorResponse, FollowUpError> {
        tracing::info!(operation = %operation, "Calling payment processor");

        let response = self
            .transport
            .send(ProcessorRequest::new(operation, parameters))
            .await
            .map_err(|e| {
                tracing::error!(operation = %operation, error = %e, "Processor call failed");
                FollowUpError::Transport(e)
            })?;
        self.last_response = Some(response.clone());

        let code = response.text("ReturnCode").unwrap_or_default();
        if !code_equals(&code, RETURN_CODE_OK) {
            let message = response.text("ReturnMsg").unwrap_or_default();
            tracing::warn!(
                operation = %operation,
                return_code = %code,
                return_msg = %message,
                "Processor rejected call"
            );
            return Err(FollowUpError::Rejected {
                operation,
                code,
                message,
            });
        }

        Ok(response)
    }
}
