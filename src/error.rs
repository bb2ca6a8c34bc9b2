use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Domain-level authentication failures.
///
/// These are always recovered into a structured outcome by the caller and
/// never propagate as faults. `InvalidCredentials` deliberately covers both
/// "no such account" and "wrong password" so callers cannot distinguish
/// the two cases.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("User with this email already exists.")]
    DuplicateEmail,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid token or email.")]
    InvalidTokenOrEmail,

    #[error("Invalid or expired token.")]
    InvalidOrExpiredToken,

    #[error("Failed to send reset password email.")]
    DeliveryFailure,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// Whether this error is a recoverable domain outcome (mapped to a 4xx
    /// response upstream) as opposed to an internal fault.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Auth(
                AuthError::DuplicateEmail
                    | AuthError::InvalidCredentials
                    | AuthError::InvalidTokenOrEmail
                    | AuthError::InvalidOrExpiredToken
            )
        )
    }

    /// The HTTP status class the (external) routing layer should map this
    /// error to.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Auth(AuthError::DeliveryFailure) => 500,
            Error::Auth(_) | Error::Validation(_) => 400,
            Error::Session(_) => 401,
            Error::Storage(_) => 500,
        }
    }

    /// A message safe to return to the caller. Internal errors are collapsed
    /// to a generic message so storage detail never crosses the boundary;
    /// the delivery-failure message is intentionally distinct (see DESIGN.md).
    pub fn public_message(&self) -> String {
        match self {
            Error::Auth(e) => e.to_string(),
            Error::Validation(e) => e.to_string(),
            Error::Session(SessionError::Expired) => "Session expired".to_string(),
            Error::Session(SessionError::InvalidToken(_)) => "Invalid session token".to_string(),
            Error::Storage(_) => "Internal server error".to_string(),
        }
    }
}
