//! Outbound adapters implementing the driven ports.

pub mod cache;
pub mod mailer;
pub mod persistence;
