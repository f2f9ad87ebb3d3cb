//! Interval-paced retry for calls that fail while remote state propagates.
//!
//! Used for container domain creation, where the API rejects the request
//! until the customer's DNS record becomes resolvable.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until};

/// Invokes `call` every `interval` while it fails with an error recognized
/// by `is_transient`; success or any other error returns immediately.
///
/// Once `timeout` elapses, one final attempt is made regardless of error
/// class and its result is returned as-is. Total latency is therefore
/// bounded by `timeout` plus one call duration, and a transient failure
/// occurring past the deadline is surfaced instead of retried — the
/// deadline overrun is deliberate and bounded, not an open-ended loop.
///
/// # Errors
///
/// Propagates the first non-transient error, or whatever the final
/// post-deadline attempt returns.
pub async fn retry_while_transient<T, E, F, Fut>(
    interval: Duration,
    timeout: Duration,
    is_transient: impl Fn(&E) -> bool,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        tokio::select! {
            biased;
            () = sleep_until(deadline) => return call().await,
            () = sleep(interval) => match call().await {
                Err(err) if is_transient(&err) => {
                    tracing::debug!("transient failure, retrying after interval");
                }
                other => return other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    const INTERVAL: Duration = Duration::from_millis(1);
    const TIMEOUT: Duration = Duration::from_millis(20);

    #[derive(Clone, Debug, Eq, PartialEq)]
    enum CallError {
        Transient,
        Fatal,
    }

    fn is_transient(err: &CallError) -> bool {
        matches!(err, CallError::Transient)
    }

    async fn run(
        script: Vec<Result<&'static str, CallError>>,
        exhausted: Result<&'static str, CallError>,
    ) -> (Result<&'static str, CallError>, u32, Duration) {
        let queue = RefCell::new(VecDeque::from(script));
        let attempts = RefCell::new(0_u32);
        let started = Instant::now();
        let result = retry_while_transient(INTERVAL, TIMEOUT, is_transient, || {
            *attempts.borrow_mut() += 1;
            let next = queue.borrow_mut().pop_front();
            let fallback = exhausted.clone();
            async move { next.unwrap_or(fallback) }
        })
        .await;
        let count = *attempts.borrow();
        (result, count, started.elapsed())
    }

    #[tokio::test]
    async fn success_returns_immediately() {
        let (result, attempts, _) = run(vec![Ok("created")], Ok("created")).await;
        assert_eq!(result, Ok("created"));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let (result, attempts, _) = run(vec![Err(CallError::Fatal)], Ok("created")).await;
        assert_eq!(result, Err(CallError::Fatal));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let (result, attempts, _) = run(
            vec![
                Err(CallError::Transient),
                Err(CallError::Transient),
                Ok("created"),
            ],
            Ok("created"),
        )
        .await;
        assert_eq!(result, Ok("created"));
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn always_transient_attempts_past_the_deadline() {
        let (result, attempts, elapsed) =
            run(Vec::new(), Err(CallError::Transient)).await;
        assert_eq!(result, Err(CallError::Transient));
        assert!(attempts >= 2, "expected several attempts, saw {attempts}");
        assert!(
            elapsed >= TIMEOUT,
            "final attempt should land past the deadline, elapsed {elapsed:?}"
        );
    }
}
