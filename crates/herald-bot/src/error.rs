//! Application-wide error types using thiserror.

use herald_common::FrameworkError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Framework error, including configuration problems.
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_errors_pass_through() {
        let error: BotError = FrameworkError::config("bot.token must be set").into();

        assert!(matches!(error, BotError::Framework(_)));
        assert_eq!(error.to_string(), "Configuration error: bot.token must be set");
    }
}
