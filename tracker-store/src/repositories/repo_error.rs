use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No ids left to assign in {0}")]
    IdsExhausted(&'static str),
    #[error("Invalid row in {table}: {message}")]
    InvalidRow { table: &'static str, message: String },
}
