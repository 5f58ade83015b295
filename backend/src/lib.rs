//! Social backend library modules.
//!
//! Hexagonal layout: `domain` holds the core and its ports, `inbound` the
//! HTTP adapter, `outbound` the PostgreSQL, cache, and mail adapters.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use domain::TraceId;
pub use middleware::{Admission, Trace};
