use model::entities::connection_request::ConnectionStatus;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::warn;

/// Error types for account, credential and connection operations
#[derive(Error, Debug)]
pub enum AccountError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The store's unique index rejected the email
    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    /// Unknown email or wrong password. Deliberately carries no detail.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Lookup of a record by id failed
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Secrets must be non-empty
    #[error("Password must not be empty")]
    EmptySecret,

    /// Failure inside the hashing primitive
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("An account cannot send a connection request to itself")]
    SelfConnection,

    #[error("Users {0} and {1} are already connected")]
    AlreadyConnected(i32, i32),

    #[error("A pending connection request from user {from} to user {to} already exists")]
    DuplicateRequest { from: i32, to: i32 },

    #[error("Connection request {id} is already {status:?}")]
    RequestAlreadyResolved { id: i32, status: ConnectionStatus },

    #[error("User {responder} is not the target of connection request {id}")]
    NotRequestTarget { id: i32, responder: i32 },
}

impl AccountError {
    /// Map an insert/update failure, turning unique-index violations on the
    /// email column into [`AccountError::DuplicateEmail`].
    pub(crate) fn from_write(err: DbErr, email: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!(%detail, "Unique constraint violated for email");
                AccountError::DuplicateEmail(email.to_string())
            }
            _ => AccountError::Database(err),
        }
    }
}

/// Type alias for Result with AccountError
pub type Result<T> = std::result::Result<T, AccountError>;
