mod entity_repo;
mod memory;
mod postgres;
mod repo_error;
mod sql;

pub use entity_repo::*;
pub use memory::*;
pub use postgres::*;
pub use repo_error::RepositoryError;
