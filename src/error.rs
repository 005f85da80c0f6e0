use thiserror::Error;

/// Everything the shop services can fail with. All of these are recoverable:
/// controllers turn them into form errors or inline snippets, never a crash.
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("account already exists")]
    DuplicateAccount {
        username_taken: bool,
        email_taken: bool,
    },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("not enough stock available")]
    InsufficientStock,

    #[error("another request changed this record, please try again")]
    PersistenceConflict,

    #[error("{0}")]
    Validation(String),

    #[error("db error: {0}")]
    Db(String),
}

impl From<mongodb::error::Error> for ShopError {
    fn from(e: mongodb::error::Error) -> Self {
        // Mongo reports unique-index violations as E11000 duplicate key.
        // That means a concurrent writer won the race between our
        // pre-insert check and the insert itself.
        let msg = e.to_string();
        if msg.contains("E11000") {
            ShopError::PersistenceConflict
        } else {
            ShopError::Db(msg)
        }
    }
}
