//! Process exit codes for the `nimbus` binary.
//!
//! Codes follow the BSD sysexits.h conventions where one fits:
//! - 0: Success
//! - 64-78: Standard exit codes from sysexits.h
//! - 100+: Application-specific codes
//! - 130: Interrupted by the user (128 + SIGINT)

/// Exit codes for nimbus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed successfully
    Success = exitcode::OK,

    /// Command line usage error: unknown command, bad flag or argument
    UsageError = exitcode::USAGE,

    /// Data format error: output could not be rendered
    DataError = exitcode::DATAERR,

    /// Internal software error
    SoftwareError = exitcode::SOFTWARE,

    /// System I/O error
    IoError = exitcode::IOERR,

    /// Configuration error
    ConfigError = exitcode::CONFIG,

    /// Authentication error: missing or rejected credentials
    AuthError = 100,

    /// Network error: connection or transport issues
    NetworkError = 101,

    /// API error: the remote API returned an error
    ApiError = 102,

    /// The user declined a confirmation prompt
    Aborted = 103,

    /// A long-running operation ended in a failed state or timed out
    OperationFailed = 104,

    /// Interrupted by the user
    Cancelled = 130,
}

impl ExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::SoftwareError => "Internal software error",
            ExitCode::IoError => "Input/output error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::AuthError => "Authentication error",
            ExitCode::NetworkError => "Network communication error",
            ExitCode::ApiError => "Remote API error",
            ExitCode::Aborted => "Aborted by user",
            ExitCode::OperationFailed => "Operation failed",
            ExitCode::Cancelled => "Interrupted",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysexits_values_are_preserved() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::UsageError.code(), 64);
        assert_eq!(ExitCode::ConfigError.code(), 78);
        assert_eq!(i32::from(ExitCode::Cancelled), 130);
    }
}
