//! Domain layer - notification verification with no I/O.

pub mod notification;
