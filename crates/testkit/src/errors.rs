//! Error envelope fixtures shaped like the ones index stores return.

use movie_index_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// Codes the provisioning tests assert against.
pub fn common_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::cancelled(),
        ErrorCode::invalid_input(),
        ErrorCode::new("mongodb", "command_failed"),
        ErrorCode::new("mongodb", "connection"),
    ]
}

/// A server-side command rejection, e.g. an unsupported vector definition.
pub fn command_failed_error(server_code: i32, code_name: &str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("mongodb", "command_failed"),
        format!("command failed: {code_name}"),
    )
    .with_metadata("serverCode", server_code.to_string())
    .with_metadata("codeName", code_name)
}

/// A retriable connectivity failure.
pub fn connection_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("mongodb", "connection"),
        "server selection timed out",
        ErrorClass::Retriable,
    )
}

/// A cancellation error fixture.
pub fn cancelled_error() -> ErrorEnvelope {
    ErrorEnvelope::cancelled("cancelled")
}
