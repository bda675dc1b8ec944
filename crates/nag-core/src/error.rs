//! Fatal configuration errors and machine-readable error codes.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems that stop a run before it starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file found at {}", .searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" or "))]
    NotFound { searched: Vec<PathBuf> },
    #[error("config section [repositories] is empty: nothing to poll")]
    NoRepositories,
    #[error("config section [recipients] is empty: nobody to report to")]
    NoRecipients,
}

/// Machine-readable error codes surfaced in JSON error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigMissing,
    ConfigParseError,
    ConfigIncomplete,
    UnknownRecipient,
    FetchFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigMissing => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ConfigIncomplete => "E1003",
            Self::UnknownRecipient => "E2001",
            Self::FetchFailed => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigMissing => "Config file not found",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigIncomplete => "Config file incomplete",
            Self::UnknownRecipient => "Recipient not configured",
            Self::FetchFailed => "Platform fetch failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing => Some("Create nag.toml or pass --config <path>."),
            Self::ConfigParseError => Some("Fix syntax in the config file and retry."),
            Self::ConfigIncomplete => {
                Some("Fill in [repositories] and [recipients] before running.")
            }
            Self::UnknownRecipient => Some("Use an identity listed under [recipients]."),
            Self::FetchFailed => Some("Check network access and the configured token."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
