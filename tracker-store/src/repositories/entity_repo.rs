use async_trait::async_trait;
use tracker_model::Mapped;

use super::repo_error::RepositoryError;

/// Load/save port for a mapped entity.
///
/// Loaded entities carry their foreign keys but never a cached parent.
/// Saving writes scalar and foreign-key columns only; cached parents are not
/// written through the child.
#[async_trait]
pub trait EntityRepository<E>: Send + Sync
where
    E: Mapped + Send + Sync + 'static,
{
    /// Load a row by id.
    async fn load(&self, id: E::Id) -> Result<Option<E>, RepositoryError>;

    /// Load a row by id, failing with `NotFound` when it does not exist.
    async fn get(&self, id: E::Id) -> Result<E, RepositoryError> {
        self.load(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{} {}", E::TABLE.name, id)))
    }

    /// Insert or update a row.
    ///
    /// An entity with a `NONE` id is inserted and the store assigns its id;
    /// otherwise the row with that id is inserted or overwritten. Returns the
    /// id of the stored row.
    async fn save(&self, entity: &E) -> Result<E::Id, RepositoryError>;

    /// Delete a row. Returns whether a row was removed.
    async fn delete(&self, id: E::Id) -> Result<bool, RepositoryError>;

    /// All rows, ordered by id.
    async fn list(&self) -> Result<Vec<E>, RepositoryError>;
}
