// Generic async remote-call wrapper: lifecycle state, bounded manual retry,
// uniform error normalization

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ErrorEnvelope, RemoteCallResult};

pub const DEFAULT_MAX_RETRIES: u32 = 3;

// Observable lifecycle of a wrapped remote call. After any execute() settles,
// exactly one of data/error is populated and is_loading is false.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorState<T> {
    pub data: Option<T>,
    pub error: Option<ErrorEnvelope>,
    pub is_loading: bool,
    pub is_retrying: bool,
    pub retry_count: u32,
}

impl<T> Default for ExecutorState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_retrying: false,
            retry_count: 0,
        }
    }
}

type RemoteCall<A, T> =
    Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, ErrorEnvelope>> + Send + Sync>;

// Wraps one asynchronous remote function and tracks its lifecycle. Failures
// never escape as panics or Err values; every outcome terminates in a
// RemoteCallResult so UI code can use a uniform check-error pattern.
//
// Concurrent execute() calls on the same instance are not deduplicated:
// whichever resolves last determines the final state (last-resolve-wins).
// Callers needing strict ordering serialize calls themselves, e.g. by
// disabling the triggering control while is_loading is true.
pub struct ApiExecutor<A, T> {
    call: RemoteCall<A, T>,
    state: Mutex<ExecutorState<T>>,
    last_args: Mutex<Option<A>>,
    max_retries: u32,
}

impl<A, T> ApiExecutor<A, T>
where
    A: Clone + Send + 'static,
    T: Clone + Send + 'static,
{
    pub fn new<F, Fut>(call: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ErrorEnvelope>> + Send + 'static,
    {
        Self::with_max_retries(call, DEFAULT_MAX_RETRIES)
    }

    pub fn with_max_retries<F, Fut>(call: F, max_retries: u32) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ErrorEnvelope>> + Send + 'static,
    {
        Self {
            call: Arc::new(move |args| call(args).boxed()),
            state: Mutex::new(ExecutorState::default()),
            last_args: Mutex::new(None),
            max_retries,
        }
    }

    // Runs the wrapped call once. Panics inside the call are caught and
    // normalized to a status-500 envelope; retry_count is never touched here.
    pub async fn execute(&self, args: A) -> RemoteCallResult<T> {
        {
            let mut state = self.state.lock();
            state.is_loading = true;
            state.error = None;
        }
        *self.last_args.lock() = Some(args.clone());

        let outcome = AssertUnwindSafe((self.call)(args)).catch_unwind().await;

        // is_loading must clear on every path, including the panic path,
        // to avoid a stuck loading state.
        let mut state = self.state.lock();
        state.is_loading = false;
        match outcome {
            Ok(Ok(data)) => {
                state.error = None;
                state.data = Some(data.clone());
                RemoteCallResult::Data(data)
            }
            Ok(Err(envelope)) => {
                warn!(
                    status_code = envelope.status_code,
                    message = %envelope.message,
                    "remote call failed"
                );
                state.error = Some(envelope.clone());
                RemoteCallResult::Error(envelope)
            }
            Err(panic) => {
                let envelope = ErrorEnvelope::internal(panic_message(panic));
                warn!(message = %envelope.message, "remote call panicked");
                state.error = Some(envelope.clone());
                RemoteCallResult::Error(envelope)
            }
        }
    }

    // Replays the last execute() with the same arguments, up to max_retries
    // times. No-op once the cap is reached or when nothing has run yet.
    pub async fn retry(&self) {
        let args = {
            let state = self.state.lock();
            if state.retry_count >= self.max_retries {
                debug!(retry_count = state.retry_count, "retry cap reached, skipping");
                return;
            }
            drop(state);
            match self.last_args.lock().clone() {
                Some(args) => args,
                None => return,
            }
        };

        {
            let mut state = self.state.lock();
            state.is_retrying = true;
            state.retry_count += 1;
        }
        let _ = self.execute(args).await;
        self.state.lock().is_retrying = false;
    }

    // Back to the initial state; also forgets the stored argument tuple so a
    // subsequent retry() without execute() stays a no-op.
    pub fn reset(&self) {
        *self.state.lock() = ExecutorState::default();
        *self.last_args.lock() = None;
    }

    pub fn state(&self) -> ExecutorState<T> {
        self.state.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Remote call failed unexpectedly".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_executor(
        fail: bool,
    ) -> (ApiExecutor<(), u32>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let executor = ApiExecutor::new(move |()| {
            let calls = Arc::clone(&calls_clone);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(ErrorEnvelope::new(503, "Service temporarily unavailable"))
                } else {
                    Ok(42)
                }
            }
        });
        (executor, calls)
    }

    #[tokio::test]
    async fn success_populates_data_and_clears_loading() {
        let (executor, _) = counting_executor(false);
        let result = executor.execute(()).await;

        assert_eq!(result.into_data(), Some(42));
        let state = executor.state();
        assert_eq!(state.data, Some(42));
        assert!(state.error.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.retry_count, 0);
    }

    #[tokio::test]
    async fn failure_populates_error_and_leaves_data_unchanged() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let executor = ApiExecutor::new(move |()| {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(7)
                } else {
                    Err(ErrorEnvelope::new(500, "Internal Server Error"))
                }
            }
        });

        executor.execute(()).await;
        let result = executor.execute(()).await;

        assert!(result.is_error());
        let state = executor.state();
        // Prior data survives a later failure; only the error slot changes.
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error.unwrap().status_code, 500);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn execute_clears_prior_error_on_next_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);
        let executor = ApiExecutor::new(move |()| {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ErrorEnvelope::new(503, "Service temporarily unavailable"))
                } else {
                    Ok(42)
                }
            }
        });

        executor.execute(()).await;
        assert!(executor.state().error.is_some());

        executor.execute(()).await;
        let state = executor.state();
        assert!(state.error.is_none());
        assert_eq!(state.data, Some(42));
    }

    #[tokio::test]
    async fn panic_in_wrapped_call_normalizes_to_internal_error() {
        // Scenario: the wrapped call blows up with a client-side exception.
        let executor: ApiExecutor<(), u32> = ApiExecutor::new(|()| async {
            panic!("fetch failed");
        });

        let result = executor.execute(()).await;
        let envelope = result.error().cloned().unwrap();
        assert_eq!(envelope.status_code, 500);
        assert!(envelope.message.contains("fetch failed"));

        let state = executor.state();
        assert!(!state.is_loading);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn retry_replays_last_arguments() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let executor = ApiExecutor::new(move |id: String| {
            let seen = Arc::clone(&seen_clone);
            async move {
                seen.lock().push(id.clone());
                Ok(id)
            }
        });

        executor.execute("booking-1".to_string()).await;
        executor.retry().await;

        assert_eq!(
            *seen.lock(),
            vec!["booking-1".to_string(), "booking-1".to_string()]
        );
        let state = executor.state();
        assert_eq!(state.retry_count, 1);
        assert!(!state.is_retrying);
    }

    #[tokio::test]
    async fn retry_is_capped_at_max_retries() {
        let (executor, calls) = counting_executor(true);
        executor.execute(()).await;

        for _ in 0..4 {
            executor.retry().await;
        }

        // One initial call plus three retries; the fourth retry is a no-op.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(executor.state().retry_count, DEFAULT_MAX_RETRIES);
    }

    #[tokio::test]
    async fn retry_without_prior_execute_is_a_noop() {
        let (executor, calls) = counting_executor(false);
        executor.retry().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(executor.state().retry_count, 0);
    }

    #[tokio::test]
    async fn execute_never_touches_retry_count() {
        let (executor, _) = counting_executor(true);
        executor.execute(()).await;
        executor.execute(()).await;
        assert_eq!(executor.state().retry_count, 0);
    }

    #[tokio::test]
    async fn reset_restores_initial_state() {
        let (executor, calls) = counting_executor(true);
        executor.execute(()).await;
        executor.retry().await;
        executor.reset();

        assert_eq!(executor.state(), ExecutorState::default());

        // The stored argument tuple is gone too, so retry stays silent.
        let before = calls.load(Ordering::SeqCst);
        executor.retry().await;
        assert_eq!(calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn custom_retry_cap_is_honored() {
        let (executor, calls) = {
            let calls = Arc::new(AtomicUsize::new(0));
            let calls_clone = Arc::clone(&calls);
            let executor = ApiExecutor::with_max_retries(
                move |()| {
                    let calls = Arc::clone(&calls_clone);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<u32, _>(ErrorEnvelope::new(500, "Internal Server Error"))
                    }
                },
                1,
            );
            (executor, calls)
        };

        executor.execute(()).await;
        executor.retry().await;
        executor.retry().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(executor.state().retry_count, 1);
    }
}
