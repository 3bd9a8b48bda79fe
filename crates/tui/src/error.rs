use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
}

/// Failure to establish the remote-store connection.
///
/// Surfaced inline on the credentials prompt; never retried automatically.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Connection failed: invalid endpoint URL or service key.")]
    InvalidCredentials,
    #[error("{0}")]
    Unreachable(String),
}

/// Authentication failure. A missing user, a wrong password, more than one
/// matching row and a lookup error all collapse into the same variant so the
/// caller cannot enumerate users.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password.")]
    InvalidCredentials,
}

/// Read/write failure against the entries collection. Frequently a
/// server-side permission (RLS) misconfiguration, which is why the recovery
/// path treats it as a configuration problem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
