/// The interceptor chain.
///
/// A chain holds the interceptors registered for one dispatch stage and
/// folds them left-to-right: each interceptor receives the previous
/// `Continue` value, and the first `Halt` short-circuits the rest.
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{InterceptOutcome, Interceptor};

/// Ordered, thread-safe chain of interceptors for one stage.
pub struct InterceptorChain<T: Send + 'static> {
    stage: &'static str,
    interceptors: Arc<RwLock<Vec<Arc<dyn Interceptor<T>>>>>,
}

impl<T: Send + 'static> Clone for InterceptorChain<T> {
    fn clone(&self) -> Self {
        Self { stage: self.stage, interceptors: Arc::clone(&self.interceptors) }
    }
}

impl<T: Send + 'static> InterceptorChain<T> {
    pub fn new(stage: &'static str) -> Self {
        Self { stage, interceptors: Arc::new(RwLock::new(Vec::new())) }
    }

    /// The dispatch stage this chain guards (for logging).
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Append an interceptor; chains run in registration order.
    pub async fn register(&self, interceptor: Arc<dyn Interceptor<T>>) {
        self.interceptors.write().await.push(interceptor);
    }

    /// Run the chain over a value.
    ///
    /// The registration lock is released before any interceptor runs, so
    /// interceptors may suspend freely and re-register without deadlock.
    pub async fn run(&self, value: T) -> InterceptOutcome<T> {
        let chain: Vec<_> = self.interceptors.read().await.clone();
        let mut current = value;
        for interceptor in chain {
            debug!("[Intercept] {} running {}", self.stage, interceptor.name());
            match interceptor.intercept(current).await {
                InterceptOutcome::Continue(next) => current = next,
                halted @ InterceptOutcome::Halt(_) => {
                    debug!("[Intercept] {} halted by {}", self.stage, interceptor.name());
                    return halted;
                }
            }
        }
        InterceptOutcome::Continue(current)
    }
}
