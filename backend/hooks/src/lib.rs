//! `herald-hooks` — ordered async interception chains.
//!
//! The dispatch pipeline exposes three interception points (before call
//! parsing, after call parsing, after resolution). Each is an
//! `InterceptorChain` over that stage's value: interceptors run in
//! registration order, may transform the value, and the first one to halt
//! stops the stage. Cross-cutting policies (rate limiting, normalization,
//! auditing) plug in here without touching the resolver.

pub mod chain;
pub mod types;

pub use chain::InterceptorChain;
pub use types::{halt, HaltReason, InterceptOutcome, Interceptor};
