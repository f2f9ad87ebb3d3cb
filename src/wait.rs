//! Generic poll-until-converged waiter shared by every resource.
//!
//! Create, update, and delete all block until the remote resource reaches a
//! terminal status. The loop here replaces the per-resource copies of that
//! logic with a single utility parameterized by a fetch function and a
//! status classifier: fixed interval, overall deadline, no backoff, no
//! jitter.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};

use crate::api::ApiError;

/// Interval between convergence polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Classification of a fetched resource's lifecycle status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusClass {
    /// Still converging; keep polling.
    Pending,
    /// Reached the ready status.
    Ready,
    /// Settled in an error status. The waiter still returns the resource
    /// so callers can surface the API's error message.
    Errored,
}

/// Pacing for a single wait: fixed poll interval and overall deadline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WaitOptions {
    /// Delay between consecutive fetches.
    pub interval: Duration,
    /// Overall budget before the wait gives up.
    pub timeout: Duration,
}

impl WaitOptions {
    /// Standard pacing for the given timeout.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }
}

/// Per-operation wait budgets, consumed from the engine's timeout
/// configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeouts {
    /// Budget for create convergence.
    pub create: Duration,
    /// Budget for read convergence.
    pub read: Duration,
    /// Budget for update convergence.
    pub update: Duration,
    /// Budget for delete convergence.
    pub delete: Duration,
}

impl Timeouts {
    /// Applies the same budget to every operation.
    #[must_use]
    pub const fn uniform(timeout: Duration) -> Self {
        Self {
            create: timeout,
            read: timeout,
            update: timeout,
            delete: timeout,
        }
    }
}

/// Errors raised while waiting for convergence.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum WaitError {
    /// The resource is absent (or disappeared mid-wait). Callers treat
    /// this as "clear local state", not as a failure.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource kind being waited on.
        resource: &'static str,
        /// Provider identifier of the resource.
        id: String,
    },
    /// The deadline elapsed before a terminal status was observed.
    #[error("timeout waiting for {resource} {id} to converge")]
    Timeout {
        /// Resource kind being waited on.
        resource: &'static str,
        /// Provider identifier of the resource.
        id: String,
    },
    /// The fetch itself failed for a reason other than not-found.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Polls `fetch` until `classify` reports a terminal status or the deadline
/// elapses, returning the last fetched resource on [`StatusClass::Ready`]
/// or [`StatusClass::Errored`].
///
/// A not-found answer from `fetch` returns immediately with the
/// distinguished [`WaitError::NotFound`] so callers can clear local state
/// without treating it as a failure.
///
/// # Errors
///
/// Returns [`WaitError::NotFound`] when the resource is absent,
/// [`WaitError::Timeout`] once `options.timeout` elapses without a terminal
/// status, and [`WaitError::Api`] for any other fetch failure.
pub async fn wait_for_converged<R, F, Fut>(
    options: WaitOptions,
    resource: &'static str,
    id: &str,
    mut fetch: F,
    classify: impl Fn(&R) -> StatusClass,
) -> Result<R, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, ApiError>>,
{
    let deadline = Instant::now() + options.timeout;
    tracing::debug!(
        resource,
        id,
        timeout_secs = options.timeout.as_secs(),
        "waiting for convergence"
    );

    loop {
        match fetch().await {
            Ok(fetched) => match classify(&fetched) {
                StatusClass::Ready | StatusClass::Errored => return Ok(fetched),
                StatusClass::Pending => {}
            },
            Err(err) if err.is_not_found() => {
                return Err(WaitError::NotFound {
                    resource,
                    id: id.to_owned(),
                });
            }
            Err(err) => return Err(err.into()),
        }

        if Instant::now() >= deadline {
            return Err(WaitError::Timeout {
                resource,
                id: id.to_owned(),
            });
        }

        sleep(options.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::api::ResponseError;

    fn not_found() -> ApiError {
        ApiError::Response(ResponseError {
            status: 404,
            message: String::from("resource is not found"),
            ..ResponseError::default()
        })
    }

    fn options() -> WaitOptions {
        WaitOptions {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(50),
        }
    }

    fn classify(status: &&'static str) -> StatusClass {
        match *status {
            "ready" => StatusClass::Ready,
            "error" => StatusClass::Errored,
            _ => StatusClass::Pending,
        }
    }

    async fn run(
        responses: Vec<Result<&'static str, ApiError>>,
    ) -> (Result<&'static str, WaitError>, u32) {
        let queue = RefCell::new(VecDeque::from(responses));
        let polls = RefCell::new(0_u32);
        let result = wait_for_converged(
            options(),
            "container",
            "id",
            || {
                *polls.borrow_mut() += 1;
                let next = queue.borrow_mut().pop_front();
                async move { next.unwrap_or(Ok("pending")) }
            },
            classify,
        )
        .await;
        let count = *polls.borrow();
        (result, count)
    }

    #[tokio::test]
    async fn immediate_not_found_is_not_a_timeout() {
        let (result, polls) = run(vec![Err(not_found())]).await;
        assert!(
            matches!(result, Err(WaitError::NotFound { resource: "container", .. })),
            "unexpected outcome: {result:?}"
        );
        assert_eq!(polls, 1);
    }

    #[tokio::test]
    async fn ready_after_n_polls_returns_after_exactly_n() {
        let (result, polls) = run(vec![Ok("pending"), Ok("pending"), Ok("ready")]).await;
        assert_eq!(result.unwrap_or("missing"), "ready");
        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn errored_status_returns_the_resource() {
        let (result, polls) = run(vec![Ok("pending"), Ok("error")]).await;
        assert_eq!(result.unwrap_or("missing"), "error");
        assert_eq!(polls, 2);
    }

    #[tokio::test]
    async fn exhausting_the_deadline_times_out() {
        let queue = RefCell::new(VecDeque::<Result<&'static str, ApiError>>::new());
        let result = wait_for_converged(
            WaitOptions {
                interval: Duration::from_millis(1),
                timeout: Duration::from_millis(5),
            },
            "container",
            "id",
            || {
                let next = queue.borrow_mut().pop_front();
                async move { next.unwrap_or(Ok("pending")) }
            },
            classify,
        )
        .await;
        assert!(matches!(result, Err(WaitError::Timeout { .. })));
    }

    #[tokio::test]
    async fn non_not_found_errors_surface_verbatim() {
        let (result, polls) = run(vec![Err(ApiError::Transport(String::from("boom")))]).await;
        assert!(matches!(result, Err(WaitError::Api(_))));
        assert_eq!(polls, 1);
    }
}
