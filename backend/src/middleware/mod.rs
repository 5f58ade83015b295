//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit in front of every handler:
//! correlation identifiers and per-client admission control.

pub mod admission;
pub mod trace;

pub use admission::Admission;
pub use trace::Trace;
