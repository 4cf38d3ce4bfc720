use std::time::Duration;

use thiserror::Error;

use crate::{
    configuration::ConfigurationError, exit_codes::ExitCode, format::FormattingError,
    sdk::ApiError,
};

pub const BINARY_NAME: &str = "nimbus";

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// A project-scoped command ran without a project ID
    #[error("the project ID is not currently set")]
    MissingProjectId,

    /// A flag value failed type or range validation
    #[error("the provided flag --{flag} with value \"{value}\" is invalid: {reason}")]
    InvalidFlag {
        flag: String,
        value: String,
        reason: String,
    },

    /// One or more required flags were not provided
    #[error("required flag(s) {} not set", quote_all(.flags))]
    MissingRequiredFlags { flags: Vec<String> },

    /// Two flags from an exclusive group were both set
    #[error("flags --{first} and --{second} are mutually exclusive")]
    MutuallyExclusiveFlags { first: String, second: String },

    /// Only part of a required-together group was set
    #[error("flags {} must be set together", dashed_all(.flags))]
    RequiredTogether { flags: Vec<String> },

    /// A positional argument failed its validator
    #[error("the provided argument \"{arg}\" is invalid: {reason}")]
    InvalidArgument { arg: String, reason: String },

    /// Unknown subcommand or argument, missing argument, wrong arity
    #[error("{message}")]
    Usage { message: String, command: String },

    /// An update command was invoked without any updatable field
    #[error("please specify at least one field to update")]
    EmptyUpdate,

    /// Neither a plan ID nor a plan name and version were provided
    #[error("the instance plan was not correctly provided")]
    InvalidPlanInput { service: String },

    /// The plan selection does not match any offering
    #[error("{details}")]
    InvalidPlanSelection { service: String, details: String },

    /// The user declined the confirmation prompt
    #[error("operation aborted")]
    Aborted,

    /// The user never gave a valid answer to the confirmation prompt
    #[error("max number of confirmation attempts ({attempts}) reached")]
    ConfirmationFailed { attempts: usize },

    /// Credentials were missing or rejected
    #[error("you are not authenticated")]
    AuthenticationFailed,

    /// An SDK call failed
    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: ApiError,
    },

    /// A long-running operation reached a failed state
    #[error("{operation}: {reason}")]
    OperationFailed { operation: String, reason: String },

    /// A long-running operation did not finish within the configured deadline
    #[error("{operation}: timed out after {}s", .elapsed.as_secs())]
    WaitTimeout {
        operation: String,
        elapsed: Duration,
    },

    /// The invocation was interrupted
    #[error("operation cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Formatting(#[from] FormattingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn quote_all(flags: &[String]) -> String {
    flags
        .iter()
        .map(|flag| format!("\"{flag}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn dashed_all(flags: &[String]) -> String {
    flags
        .iter()
        .map(|flag| format!("--{flag}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CliError {
    /// Build an `InvalidFlag` error.
    pub fn invalid_flag(
        flag: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CliError::InvalidFlag {
            flag: flag.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns a closure that wraps an SDK error with what was being attempted.
    pub fn upstream(context: impl Into<String>) -> impl FnOnce(ApiError) -> CliError {
        let context = context.into();
        move |source| match source {
            ApiError::Unauthorized { .. } => CliError::AuthenticationFailed,
            source => CliError::Upstream { context, source },
        }
    }

    /// Remediation hint shown at debug verbosity, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            CliError::MissingProjectId => Some(format!(
                "It can be set on the command level by re-running your command with the --project-id flag.\n\n\
                 You can configure it for all commands by running:\n\n  \
                 $ {BINARY_NAME} config set --project-id xxx\n\n\
                 or you can also set it through the environment variable [NIMBUS_PROJECT_ID]"
            )),
            CliError::InvalidFlag { .. }
            | CliError::MissingRequiredFlags { .. }
            | CliError::InvalidArgument { .. }
            | CliError::EmptyUpdate => Some(
                "Get details on the available flags by re-running your command with the --help flag."
                    .to_string(),
            ),
            CliError::MutuallyExclusiveFlags { first, second } => Some(format!(
                "Provide either --{first} or --{second}, not both."
            )),
            CliError::RequiredTogether { flags } => Some(format!(
                "Provide all of {} or none of them.",
                dashed_all(flags)
            )),
            CliError::Usage { command, .. } => {
                Some(format!("For usage help, run:\n  $ {command} --help"))
            }
            CliError::InvalidPlanInput { service } => Some(format!(
                "Either provide the plan ID:\n  --plan-id <PLAN ID>\n\n\
                 or provide plan name and version:\n  --plan-name <PLAN NAME> --version <VERSION>\n\n\
                 For more details on the available plans, run:\n  $ {BINARY_NAME} {service} plans"
            )),
            CliError::InvalidPlanSelection { service, .. } => Some(format!(
                "For more details on the available plans, run:\n  $ {BINARY_NAME} {service} plans"
            )),
            CliError::AuthenticationFailed => Some(
                "Provide an access token through the NIMBUS_ACCESS_TOKEN environment variable \
                 or the access_token key of the configuration file."
                    .to_string(),
            ),
            CliError::Configuration(_) => Some(format!(
                "Inspect the current settings with:\n  $ {BINARY_NAME} config list"
            )),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::MissingProjectId
            | CliError::InvalidFlag { .. }
            | CliError::MissingRequiredFlags { .. }
            | CliError::MutuallyExclusiveFlags { .. }
            | CliError::RequiredTogether { .. }
            | CliError::InvalidArgument { .. }
            | CliError::Usage { .. }
            | CliError::EmptyUpdate
            | CliError::InvalidPlanInput { .. }
            | CliError::InvalidPlanSelection { .. } => ExitCode::UsageError,
            CliError::Aborted | CliError::ConfirmationFailed { .. } => ExitCode::Aborted,
            CliError::AuthenticationFailed => ExitCode::AuthError,
            CliError::Upstream { source, .. } => match source {
                ApiError::Transport(_) => ExitCode::NetworkError,
                ApiError::Unauthorized { .. } => ExitCode::AuthError,
                _ => ExitCode::ApiError,
            },
            CliError::OperationFailed { .. } | CliError::WaitTimeout { .. } => {
                ExitCode::OperationFailed
            }
            CliError::Cancelled => ExitCode::Cancelled,
            CliError::Configuration(_) => ExitCode::ConfigError,
            CliError::Formatting(_) => ExitCode::DataError,
            CliError::Io(_) => ExitCode::IoError,
        }
    }
}
