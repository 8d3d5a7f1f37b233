use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set. Check `.env.example` for
    /// the variables the bot expects.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable is set but could not be parsed.
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Why an invocation was rejected before, or failed during, handler
/// execution. Every variant is recovered into a reply at the dispatch
/// boundary; none of them escape it.
#[derive(Error, Debug)]
pub enum CommandError {
    /// No command is registered under this name. Only the text-prefix
    /// surface can produce this.
    #[error("unknown command `{0}`")]
    Unknown(String),

    /// A required argument was not supplied.
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    /// An argument was supplied but does not have the expected shape.
    #[error("argument `{name}` must be {expected}")]
    InvalidArgument {
        name: &'static str,
        expected: String,
    },

    /// The caller is neither an administrator nor the allowlisted user.
    #[error("caller lacks the privilege this command requires")]
    Denied,

    /// The Discord API rejected a call made by the handler. Detail is
    /// logged for operators and never shown to the caller.
    #[error(transparent)]
    Platform(#[from] serenity::Error),
}
