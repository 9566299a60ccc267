//! In-memory store for tests and local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracker_model::{
    Entity, EntityId, Mapped, Project, ProjectId, ProjectTask, ProjectTaskId, TimeRecord,
    TimeRecordId, User, UserId,
};

use super::{entity_repo::EntityRepository, repo_error::RepositoryError};

#[derive(Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    tasks: HashMap<ProjectTaskId, ProjectTask>,
    users: HashMap<UserId, User>,
    records: HashMap<TimeRecordId, TimeRecord>,
}

/// Store backed by in-memory HashMaps, one per table.
///
/// Rows are stored detached, so loads behave like a database load: keys are
/// populated and cached references are absent. Foreign keys are not checked.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all tables.
    pub async fn len(&self) -> usize {
        let tables = self.tables.read().await;
        tables.projects.len() + tables.tasks.len() + tables.users.len() + tables.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

macro_rules! memory_repository {
    ($entity:ty, $field:ident) => {
        #[async_trait]
        impl EntityRepository<$entity> for MemoryStore {
            async fn load(
                &self,
                id: <$entity as Entity>::Id,
            ) -> Result<Option<$entity>, RepositoryError> {
                let row = self.tables.read().await.$field.get(&id).cloned();
                tracing::debug!(
                    table = <$entity as Mapped>::TABLE.name,
                    %id,
                    found = row.is_some(),
                    "loaded row"
                );
                Ok(row)
            }

            async fn save(
                &self,
                entity: &$entity,
            ) -> Result<<$entity as Entity>::Id, RepositoryError> {
                let mut tables = self.tables.write().await;
                let rows = &mut tables.$field;

                let mut row = entity.detached();
                if row.id().is_none() {
                    let next = rows
                        .keys()
                        .map(|id| id.as_i64())
                        .max()
                        .unwrap_or(0)
                        .checked_add(1)
                        .ok_or(RepositoryError::IdsExhausted(<$entity as Mapped>::TABLE.name))?;
                    row.set_id(<<$entity as Entity>::Id as EntityId>::from_i64(next));
                }

                let id = row.id();
                rows.insert(id, row);
                tracing::debug!(table = <$entity as Mapped>::TABLE.name, %id, "saved row");
                Ok(id)
            }

            async fn delete(&self, id: <$entity as Entity>::Id) -> Result<bool, RepositoryError> {
                let removed = self.tables.write().await.$field.remove(&id);
                Ok(removed.is_some())
            }

            async fn list(&self) -> Result<Vec<$entity>, RepositoryError> {
                let mut rows: Vec<$entity> =
                    self.tables.read().await.$field.values().cloned().collect();
                rows.sort_by_key(|row| row.id());
                Ok(rows)
            }
        }
    };
}

memory_repository!(Project, projects);
memory_repository!(ProjectTask, tasks);
memory_repository!(User, users);
memory_repository!(TimeRecord, records);
