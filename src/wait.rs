//! Polling of long-running operations.
//!
//! A kick-off call returns before the resource is ready. The waiter polls the
//! resource until a caller-supplied classifier reports a terminal state, with a
//! capped exponential back-off between polls.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{error::CliError, print::Printer};

/// Classification of one polled resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitState {
    /// Not finished yet, keep polling.
    Pending,
    /// Finished successfully.
    Done,
    /// Finished unsuccessfully, with the reason reported by the API.
    Failed(String),
}

/// Poll cadence and optional deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Waiter {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Option<Duration>,
}

impl Default for Waiter {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            timeout: None,
        }
    }
}

impl Waiter {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Poll until `classify` reports a terminal state.
    ///
    /// `operation` names the wait in errors ("wait for DNS zone creation"),
    /// `message` is shown next to the spinner. Returns the last polled value.
    pub async fn wait<T, P, Fut, C>(
        &self,
        printer: &Printer,
        cancel: &CancellationToken,
        operation: &str,
        message: &str,
        mut poll: P,
        classify: C,
    ) -> Result<T, CliError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CliError>>,
        C: Fn(&T) -> WaitState,
    {
        let spinner = printer.spinner(message);
        let started = Instant::now();
        let mut delay = self.initial_delay;
        let mut attempt = 0u32;

        let outcome = loop {
            attempt += 1;
            let polled = tokio::select! {
                _ = cancel.cancelled() => break Err(CliError::Cancelled),
                polled = poll() => polled,
            };
            let value = match polled {
                Ok(value) => value,
                Err(e) => break Err(e),
            };
            match classify(&value) {
                WaitState::Done => {
                    debug!("{operation}: done after {attempt} poll(s)");
                    break Ok(value);
                }
                WaitState::Failed(reason) => {
                    break Err(CliError::OperationFailed {
                        operation: operation.to_string(),
                        reason,
                    })
                }
                WaitState::Pending => {
                    trace!("{operation}: pending after poll {attempt}");
                    spinner.set_message(&progress_message(message, attempt));
                }
            }

            if let Some(timeout) = self.timeout {
                let elapsed = started.elapsed();
                if elapsed + delay > timeout {
                    break Err(CliError::WaitTimeout {
                        operation: operation.to_string(),
                        elapsed,
                    });
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break Err(CliError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(self.max_delay);
        };

        spinner.stop();
        outcome
    }
}

/// Spinner text once `polls` polls found the resource still pending.
fn progress_message(message: &str, polls: u32) -> String {
    format!("{message} (poll {polls})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::testing::printer;
    use std::cell::Cell;

    fn fast() -> Waiter {
        Waiter {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn polls_until_done() {
        let (p, _, stderr) = printer("");
        let calls = Cell::new(0);
        let result = fast()
            .wait(
                &p,
                &CancellationToken::new(),
                "wait for zone",
                "Creating zone",
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move { Ok::<_, CliError>(n) }
                },
                |n| if *n < 3 { WaitState::Pending } else { WaitState::Done },
            )
            .await
            .unwrap();
        assert_eq!(result, 3);
        assert_eq!(calls.get(), 3);
        assert_eq!(stderr.contents(), "");
    }

    #[tokio::test]
    async fn failed_state_is_an_error() {
        let (p, _, _) = printer("");
        let err = fast()
            .wait(
                &p,
                &CancellationToken::new(),
                "wait for zone creation",
                "Creating zone",
                || async { Ok::<_, CliError>("CREATE_FAILED") },
                |state| WaitState::Failed(format!("zone state {state}")),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "wait for zone creation: zone state CREATE_FAILED");
    }

    #[tokio::test]
    async fn poll_errors_stop_the_wait() {
        let (p, _, _) = printer("");
        let err = fast()
            .wait(
                &p,
                &CancellationToken::new(),
                "wait",
                "Waiting",
                || async { Err::<u8, _>(CliError::AuthenticationFailed) },
                |_| WaitState::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn cancellation_returns_promptly() {
        let (p, _, _) = printer("");
        let cancel = CancellationToken::new();
        let waiter = Waiter {
            initial_delay: Duration::from_secs(3600),
            max_delay: Duration::from_secs(3600),
            timeout: None,
        };
        let trigger = cancel.clone();
        let err = waiter
            .wait(
                &p,
                &cancel,
                "wait",
                "Waiting",
                move || {
                    trigger.cancel();
                    async { Ok::<_, CliError>(()) }
                },
                |_| WaitState::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Cancelled));
    }

    #[tokio::test]
    async fn deadline_stops_the_wait() {
        let (p, _, _) = printer("");
        let waiter = Waiter {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(5),
            timeout: Some(Duration::from_millis(1)),
        };
        let err = waiter
            .wait(
                &p,
                &CancellationToken::new(),
                "wait for instance creation",
                "Creating instance",
                || async { Ok::<_, CliError>(()) },
                |_| WaitState::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::WaitTimeout { .. }));
    }

    #[test]
    fn progress_message_counts_polls() {
        assert_eq!(progress_message("Creating zone", 3), "Creating zone (poll 3)");
    }
}
