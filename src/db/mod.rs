use crate::error::Error;

pub mod author;
pub mod chapter;
pub mod cover;
pub mod error;
pub mod group;
pub mod list;
pub mod manga;
pub mod recommendation;
pub mod relation;
pub mod report;
pub mod tag;
pub mod user;

pub type PostgresTransaction = sqlx::Transaction<'static, sqlx::Postgres>;

/// Parse a stored choice column into its enum. A value the enum does not
/// know means the row predates the code reading it.
pub(crate) fn parse_stored<T>(value: String) -> Result<T, Error>
where
    T: TryFrom<String, Error = String>,
{
    value
        .try_into()
        .map_err(|error: String| Error::Other(anyhow::anyhow!(error)))
}

/// A broken foreign key on insert means the request referenced a record
/// that is not there (anymore).
pub(crate) fn map_fk_violation(error: sqlx::Error) -> Error {
    match &error {
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some("23503") => {
            Error::Conflict("Referenced record does not exist".to_string())
        }
        _ => Error::Database(error::DatabaseError::DatabaseError(error)),
    }
}
