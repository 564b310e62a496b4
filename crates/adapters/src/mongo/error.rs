//! MongoDB driver error mapping helpers.

use movie_index_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use mongodb::error::{Error, ErrorKind};

/// Operation label and namespace attached to mapped errors.
#[derive(Debug, Clone, Copy)]
pub struct MongoErrorContext<'a> {
    /// Operation label for tracing failures.
    pub operation: &'static str,
    /// `database.collection` the request targeted.
    pub namespace: &'a str,
}

/// Maps a driver error into the shared envelope format.
///
/// Server command rejections are expected and non-retriable; transport and
/// server-selection failures are retriable.
pub fn map_driver_error(error: &Error, ctx: MongoErrorContext<'_>) -> ErrorEnvelope {
    let envelope = match error.kind.as_ref() {
        ErrorKind::Command(command) => {
            command_failed(command.code, &command.code_name, &command.message)
        },
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => ErrorEnvelope::unexpected(
            connection_code(),
            format!("MongoDB connection failed: {error}"),
            ErrorClass::Retriable,
        ),
        ErrorKind::InvalidArgument { message, .. } => ErrorEnvelope::expected(
            ErrorCode::new("mongodb", "invalid_argument"),
            message.clone(),
        ),
        ErrorKind::Authentication { message, .. } => ErrorEnvelope::expected(
            ErrorCode::new("mongodb", "authentication"),
            format!("MongoDB authentication failed: {message}"),
        ),
        _ => ErrorEnvelope::unexpected(
            ErrorCode::new("mongodb", "driver"),
            format!("MongoDB driver error: {error}"),
            ErrorClass::NonRetriable,
        ),
    };

    envelope
        .with_metadata("provider", "mongodb")
        .with_metadata("operation", ctx.operation)
        .with_metadata("namespace", ctx.namespace)
}

/// Envelope for a server-side command rejection.
pub fn command_failed(server_code: i32, code_name: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("mongodb", "command_failed"),
        format!("command failed: {code_name}: {message}"),
    )
    .with_metadata("serverCode", server_code.to_string())
    .with_metadata("codeName", code_name)
}

fn connection_code() -> ErrorCode {
    ErrorCode::new("mongodb", "connection")
}
