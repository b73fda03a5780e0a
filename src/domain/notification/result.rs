//! Canonical result of a verified notification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel a notification arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Synchronous browser redirect back to the merchant.
    Return,

    /// Asynchronous server-to-server push from the processor.
    Notify,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Return => "return",
            Channel::Notify => "notify",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification that passed trust and field verification.
///
/// Only constructed by the parser after every check has succeeded;
/// `code` and `message` are the processor's own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    /// Processor `ReturnCode`.
    pub code: String,

    /// Processor `ReturnMsg`.
    pub message: String,

    /// Vendor trade sequence (`FacTradeSeq`), never empty.
    #[serde(rename = "transactionId")]
    pub transaction_id: String,

    #[serde(rename = "type")]
    pub channel: Channel,

    /// Merged Return fields, or the parsed Notify document.
    #[serde(rename = "notifyData")]
    pub raw_payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_canonical_shape() {
        let result = CanonicalResult {
            code: "1".to_string(),
            message: "OK".to_string(),
            transaction_id: "T2".to_string(),
            channel: Channel::Notify,
            raw_payload: json!({"ReturnCode": 1}),
        };

        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({
                "code": "1",
                "message": "OK",
                "transactionId": "T2",
                "type": "notify",
                "notifyData": {"ReturnCode": 1}
            })
        );
    }

    #[test]
    fn channel_displays_lowercase() {
        assert_eq!(Channel::Return.to_string(), "return");
        assert_eq!(Channel::Notify.to_string(), "notify");
    }
}
