//! Deadline race for AI interpretation calls.
//!
//! The call runs as its own task. Whichever finishes first among the task,
//! the deadline, and the caller's cancellation token decides the result; a
//! losing task is aborted so its HTTP request is dropped instead of leaking.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How a raced call ended.
#[derive(Debug)]
pub(crate) enum RaceResult<T> {
    /// The call finished before the deadline.
    Completed(T),
    /// The deadline fired first. The task has been aborted.
    TimedOut,
    /// The caller cancelled. The task has been aborted.
    Cancelled,
    /// The task ended without a value (panic).
    Aborted(String),
}

/// Run `call` on its own task and wait for it, the deadline, or `cancel`.
pub(crate) async fn race_deadline<T, F>(
    call: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> RaceResult<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let mut task = tokio::spawn(call);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            task.abort();
            RaceResult::Cancelled
        }
        joined = &mut task => match joined {
            Ok(value) => RaceResult::Completed(value),
            Err(join_err) => RaceResult::Aborted(join_err.to_string()),
        },
        _ = tokio::time::sleep(deadline) => {
            task.abort();
            RaceResult::TimedOut
        }
    }
}
