pub mod pagination;
pub mod queries;
pub mod sanitize;
pub mod validation;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

pub use pagination::{Page, Pagination};
pub use queries::categories::Category;
pub use queries::questions::{
    AnswerOption, NewOption, NewQuestion, Question, QuestionRecord, QuestionUpdate,
};

/// Failures surfaced by the store layer. Absence of a record is not an
/// error; lookups return `Option` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub async fn establish_connection(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(format!("sqlite:{}", path).as_str())?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePoolOptions::new().connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
