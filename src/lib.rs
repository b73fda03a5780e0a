//! MyCard Notify - payment notification verification
//!
//! This crate authenticates and normalizes MyCard payment-outcome
//! notifications (browser Return and server-to-server Notify) and drives the
//! follow-up calls (trade query, payment confirm) against the processor.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
