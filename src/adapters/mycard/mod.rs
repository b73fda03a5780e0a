//! MyCard processor adapter.
//!
//! Implements the `ProcessorTransport` port for the MyCard billing API:
//! - Trade authorization (`AuthGlobal`)
//! - Trade status query (`TradeQuery`)
//! - Payment confirmation (`PaymentConfirm`)
//!
//! # Configuration
//!
//! The API host is chosen by `MYCARD_NOTIFY__PROCESSOR__SANDBOX` or overridden
//! with `MYCARD_NOTIFY__PROCESSOR__API_BASE_URL`.

mod http_transport;
mod mock_transport;

pub use http_transport::{
    MyCardHttpTransport, MyCardTransportConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL,
};
pub use mock_transport::MockProcessorTransport;
