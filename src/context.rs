//! Per-invocation execution context.
//!
//! The context bundles everything a command needs besides its own flags: the
//! printer, the loaded configuration, the resolved global options, a factory
//! for service clients, the cancellation token, a clock and the wait policy.

use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::{
    configuration::Configuration,
    error::CliError,
    globalflags::GlobalOptions,
    print::Printer,
    sdk::{ApiError, ClientFactory},
    wait::Waiter,
};

/// Execution context containing the resources shared by every command.
pub struct ExecutionContext {
    pub printer: Printer,
    pub configuration: Configuration,
    /// Where `config set` and `config unset` persist the configuration.
    /// `None` means the default location.
    pub configuration_path: Option<PathBuf>,
    pub globals: GlobalOptions,
    pub clients: Box<dyn ClientFactory>,
    pub cancellation: CancellationToken,
    pub clock: fn() -> DateTime<Utc>,
    pub waiter: Waiter,
}

impl ExecutionContext {
    pub fn new(
        printer: Printer,
        configuration: Configuration,
        clients: Box<dyn ClientFactory>,
    ) -> Self {
        let waiter = Waiter::default().with_timeout(configuration.wait_timeout());
        Self {
            printer,
            configuration,
            configuration_path: None,
            globals: GlobalOptions::default(),
            clients,
            cancellation: CancellationToken::new(),
            clock: Utc::now,
            waiter,
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_configuration_path(mut self, path: PathBuf) -> Self {
        self.configuration_path = Some(path);
        self
    }

    /// Path of the configuration file for this invocation.
    pub fn configuration_path(&self) -> Result<PathBuf, CliError> {
        match &self.configuration_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Configuration::get_default_configuration_file_path()?),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Run one SDK call, racing the cancellation token. Failures are wrapped
    /// with `what` as context.
    pub async fn call<T, F>(&self, what: &str, call: F) -> Result<T, CliError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            _ = self.cancellation.cancelled() => Err(CliError::Cancelled),
            result = call => result.map_err(CliError::upstream(what)),
        }
    }
}
