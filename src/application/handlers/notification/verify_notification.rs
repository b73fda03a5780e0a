//! VerifyNotificationHandler - Command handler for inbound payment notifications.

use std::sync::Arc;

use crate::domain::notification::{
    CanonicalResult, InboundPayload, NotificationError, NotificationParser,
};

/// Command to verify an inbound notification.
#[derive(Debug, Clone)]
pub struct VerifyNotificationCommand {
    pub payload: InboundPayload,
}

/// Handler for verifying Return and Notify messages.
///
/// Each call is independent; the handler holds only the shared parser.
#[derive(Clone)]
pub struct VerifyNotificationHandler {
    parser: Arc<NotificationParser>,
}

impl VerifyNotificationHandler {
    pub fn new(parser: Arc<NotificationParser>) -> Self {
        Self { parser }
    }

    pub fn handle(
        &self,
        cmd: VerifyNotificationCommand,
    ) -> Result<CanonicalResult, NotificationError> {
        self.parser.parse(&cmd.payload)
    }
}
