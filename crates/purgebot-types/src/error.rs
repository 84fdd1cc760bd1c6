use thiserror::Error;

/// Reasons a max-age duration could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMaxAgeError {
    #[error("expected at most one duration argument, got {count}")]
    TooManyTokens { count: usize },

    #[error("duration is missing an amount")]
    EmptyAmount,

    #[error("'{0}' is not a whole number")]
    InvalidAmount(String),

    #[error("unknown duration unit '{0}' (expected d, h or m)")]
    UnknownUnit(char),

    #[error("duration must be positive, got {0}")]
    NotPositive(i64),

    #[error("duration '{0}' is too large")]
    Overflow(String),
}

/// Errors from registry operations (used by trait definitions in purgebot-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors returned by the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("channel not found")]
    NotFound,

    #[error("missing permissions: {0}")]
    Forbidden(String),

    #[error("platform rejected the bot credentials")]
    Unauthorized,

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response {status}: {body}")]
    Unexpected { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Failures surfaced to whoever issued a register/unregister/info command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unrecognized time format: {0}")]
    UnrecognizedFormat(#[from] ParseMaxAgeError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl CommandError {
    /// Reply text for the user who ran the command.
    ///
    /// Storage details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            CommandError::UnrecognizedFormat(_) => {
                "can't recognise that time format, please enter it in days, hours, or minutes \
                 with for example `5d`, `12h`, or `10m`"
            }
            CommandError::Storage(_) => "sorry, something went wrong, please try again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseMaxAgeError::UnknownUnit('x');
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_command_error_user_messages() {
        let parse: CommandError = ParseMaxAgeError::EmptyAmount.into();
        assert!(parse.user_message().contains("`5d`"));

        let storage: CommandError = RepositoryError::Connection.into();
        assert!(storage.user_message().contains("try again"));
        assert!(!storage.user_message().contains("database"));
    }

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::Unexpected {
            status: 500,
            body: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected response 500: oops");
    }
}
