//! Steps of the command pipeline shared by every leaf.
//!
//! A leaf parses its input, configures its client, optionally looks up a
//! label for the prompt, builds its request, confirms, executes, waits and
//! renders. The helpers here implement the steps that behave the same for all
//! leaves.

use std::future::Future;

use tracing::debug;

use crate::{
    context::ExecutionContext,
    error::CliError,
    sdk::ApiError,
    wait::WaitState,
};

/// Ask for confirmation unless `--assume-yes` is set.
pub fn confirm(ctx: &mut ExecutionContext, prompt: &str) -> Result<(), CliError> {
    if ctx.globals.assume_yes {
        debug!("Skipping confirmation: {}", prompt);
        return Ok(());
    }
    ctx.printer.prompt_for_confirmation(prompt)
}

/// Resolve a display label for a resource. Failures are logged at debug and
/// the raw id is used instead.
pub async fn label_or_id<F>(ctx: &mut ExecutionContext, what: &str, id: &str, lookup: F) -> String
where
    F: Future<Output = Result<String, ApiError>>,
{
    match ctx.call(what, lookup).await {
        Ok(label) if !label.is_empty() => label,
        Ok(_) => id.to_string(),
        Err(e) => {
            ctx.printer.debug(e);
            id.to_string()
        }
    }
}

/// Poll until the operation completes, unless `--async` is set.
///
/// Returns the final polled value, or `None` in async mode.
pub async fn wait_unless_async<T, P, Fut, C>(
    ctx: &ExecutionContext,
    operation: &str,
    message: &str,
    poll: P,
    classify: C,
) -> Result<Option<T>, CliError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
    C: Fn(&T) -> WaitState,
{
    if ctx.globals.is_async {
        debug!("Not waiting for {}: async mode", operation);
        return Ok(None);
    }
    ctx.waiter
        .wait(
            &ctx.printer,
            &ctx.cancellation,
            operation,
            message,
            poll,
            classify,
        )
        .await
        .map(Some)
}

/// The verb of a status message: `done` normally, `triggered` in async mode.
pub fn operation_state<'a>(ctx: &ExecutionContext, done: &'a str, triggered: &'a str) -> &'a str {
    if ctx.globals.is_async {
        triggered
    } else {
        done
    }
}

/// Keep the first `limit` items.
pub fn truncate<T>(items: &mut Vec<T>, limit: Option<i64>) {
    if let Some(limit) = limit {
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}
