//! Command handlers.

pub mod notification;

pub use notification::{
    Authorization, AuthorizationRequest, ConfirmOutcome, ConfirmationOutcome, FollowUpError,
    TradeType, TransactionFollowUp, TransactionRef, TransactionStatus, VerifyNotificationCommand,
    VerifyNotificationHandler,
};
