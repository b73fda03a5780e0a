//! Notification verification engine.
//!
//! Authenticates the two inbound notification channels and reduces them to
//! a single `CanonicalResult`:
//!
//! - **Return**: browser redirect, authenticated by the `ReturnHash` signature
//! - **Notify**: server push, authenticated by source address allowlist

mod codes;
mod errors;
mod parser;
mod payload;
mod result;
mod signature;
mod trust;

pub use codes::{code_equals, PAY_RESULT_SUCCESS, RETURN_CODE_OK};
pub use errors::NotificationError;
pub use parser::{NotificationParser, Rejection, VerificationStage};
pub use payload::{InboundPayload, DATA_FIELD};
pub use result::{CanonicalResult, Channel};
pub use signature::{SignatureComputer, SignaturePurpose};
pub use trust::{SourceTrustFilter, TrustContext, PRODUCTION_PUSH_IP, SANDBOX_PUSH_IP};
