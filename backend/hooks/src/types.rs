/// Interceptor trait and outcomes.
///
/// Interceptors observe or transform a value flowing through one dispatch
/// stage. They run sequentially in registration order; the first to halt
/// stops the chain and the dispatch stage it guards.
use async_trait::async_trait;

/// Why a chain stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltReason {
    /// Name of the interceptor that halted the chain.
    pub interceptor: String,
    /// Human-readable reason, surfaced to the embedder.
    pub reason: String,
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "halted by {}: {}", self.interceptor, self.reason)
    }
}

/// The outcome of one interceptor, or of a whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptOutcome<T> {
    /// Pass the (possibly transformed) value onward.
    Continue(T),
    /// Stop processing; the dispatch stage reports the reason.
    Halt(HaltReason),
}

impl<T> InterceptOutcome<T> {
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }
}

/// An interceptor over one dispatch stage's value.
#[async_trait]
pub trait Interceptor<T: Send + 'static>: Send + Sync {
    /// Human-readable name for logging and halt reports.
    fn name(&self) -> &str;

    /// Observe or transform the staged value.
    async fn intercept(&self, value: T) -> InterceptOutcome<T>;
}

/// Convenience: halt with this interceptor's name attached.
pub fn halt<T>(interceptor: &str, reason: impl Into<String>) -> InterceptOutcome<T> {
    InterceptOutcome::Halt(HaltReason {
        interceptor: interceptor.to_string(),
        reason: reason.into(),
    })
}
