//! Notification handlers.

mod transaction_follow_up;
mod verify_notification;

pub use transaction_follow_up::{
    Authorization, AuthorizationRequest, ConfirmOutcome, ConfirmationOutcome, FollowUpError,
    TradeType, TransactionFollowUp, TransactionRef, TransactionStatus,
};
pub use verify_notification::{VerifyNotificationCommand, VerifyNotificationHandler};
