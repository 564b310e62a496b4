use movie_index_shared::{ErrorEnvelope, ErrorKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    InvalidInput = 2,
    Io = 3,
    Internal = 1,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exit code for a failed command.
    ///
    /// Config-file read failures are I/O; other expected errors are user input.
    #[must_use]
    pub fn for_envelope(error: &ErrorEnvelope) -> Self {
        if error.code.namespace() == "config" && error.code.code().starts_with("config_file_") {
            return Self::Io;
        }
        match error.kind {
            ErrorKind::Expected if !error.is_cancelled() => Self::InvalidInput,
            ErrorKind::Expected | ErrorKind::Invariant | ErrorKind::Unexpected => Self::Internal,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    InvalidInput(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) => ExitCode::Internal,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(formatter, "invalid input: {message}"),
            Self::Io(error) => write!(formatter, "io error: {error}"),
            Self::Serialization(error) => write!(formatter, "serialization error: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_index_shared::{ErrorClass, ErrorCode};

    #[test]
    fn envelopes_map_to_exit_codes() {
        let missing = ErrorEnvelope::expected(
            ErrorCode::new("config", "config_file_not_found"),
            "failed to read config file",
        );
        assert_eq!(ExitCode::for_envelope(&missing), ExitCode::Io);

        let invalid = ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_dimensions"),
            "dimensions out of range",
        );
        assert_eq!(ExitCode::for_envelope(&invalid), ExitCode::InvalidInput);

        let connection = ErrorEnvelope::unexpected(
            ErrorCode::new("mongodb", "connection"),
            "server selection timed out",
            ErrorClass::Retriable,
        );
        assert_eq!(ExitCode::for_envelope(&connection), ExitCode::Internal);

        let cancelled = ErrorEnvelope::cancelled("interrupted");
        assert_eq!(ExitCode::for_envelope(&cancelled), ExitCode::Internal);
    }
}
