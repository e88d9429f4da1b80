//! HTTP middleware shared across the service.

pub mod trace;

pub use trace::{Trace, TraceId};
