//! PostgreSQL implementation of [`EntityRepository`].

use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, PgPool, Postgres, Row,
};
use time::OffsetDateTime;
use tracker_model::{
    Entity, EntityId, Mapped, Project, ProjectId, ProjectTask, ProjectTaskId, TaskRecordStatus,
    TimeRecord, TimeRecordId, User, UserId,
};

use super::{entity_repo::EntityRepository, repo_error::RepositoryError, sql};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Row conversion for an entity stored in PostgreSQL.
pub trait PgMapped: Mapped + Send + Sync + Unpin + 'static {
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    fn from_row(row: Self::Row) -> Result<Self, RepositoryError>;

    /// Bind `Table::columns` in declaration order.
    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;
}

/// `NONE` foreign keys are stored as NULL.
fn nullable_key<I: EntityId>(id: I) -> Option<i64> {
    (!id.is_none()).then(|| id.as_i64())
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Apply the schema migrations bundled with this crate.
pub async fn migrate(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[async_trait]
impl<E: PgMapped> EntityRepository<E> for PgStore {
    async fn load(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let statement = sql::select_by_id(&E::TABLE);
        let row = sqlx::query_as::<_, E::Row>(&statement)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(table = E::TABLE.name, %id, found = row.is_some(), "loaded row");
        row.map(E::from_row).transpose()
    }

    async fn save(&self, entity: &E) -> Result<E::Id, RepositoryError> {
        let id = entity.id();
        let row = if id.is_none() {
            let statement = sql::insert(&E::TABLE);
            entity
                .bind_columns(sqlx::query(&statement))
                .fetch_one(&self.pool)
                .await?
        } else {
            let statement = sql::upsert(&E::TABLE);
            let row = entity
                .bind_columns(sqlx::query(&statement).bind(id.as_i64()))
                .fetch_one(&self.pool)
                .await?;
            sqlx::query(&sql::sync_sequence(&E::TABLE))
                .execute(&self.pool)
                .await?;
            row
        };

        let saved = <E::Id as EntityId>::from_i64(row.try_get::<i64, _>(0)?);
        tracing::debug!(table = E::TABLE.name, id = %saved, "saved row");
        Ok(saved)
    }

    async fn delete(&self, id: E::Id) -> Result<bool, RepositoryError> {
        let statement = sql::delete(&E::TABLE);
        let query_result = sqlx::query(&statement)
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(query_result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<E>, RepositoryError> {
        let statement = sql::select_all(&E::TABLE);
        let rows = sqlx::query_as::<_, E::Row>(&statement)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(E::from_row).collect()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatabaseProject {
    pub id: i64,
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
}

impl PgMapped for Project {
    type Row = DatabaseProject;

    fn from_row(row: DatabaseProject) -> Result<Self, RepositoryError> {
        let mut project = Project::new(row.name).with_id(ProjectId::new(row.id));
        project.version = row.version;
        project.description = row.description;
        Ok(project)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.version)
            .bind(self.name.clone())
            .bind(self.description.clone())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatabaseProjectTask {
    pub id: i64,
    pub version: i32,
    pub project_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

impl PgMapped for ProjectTask {
    type Row = DatabaseProjectTask;

    fn from_row(row: DatabaseProjectTask) -> Result<Self, RepositoryError> {
        let mut task = ProjectTask::new(row.name)
            .with_id(ProjectTaskId::new(row.id))
            .with_project_id(ProjectId::new(row.project_id.unwrap_or_default()));
        task.version = row.version;
        task.description = row.description;
        Ok(task)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.version)
            .bind(nullable_key(self.project_id()))
            .bind(self.name.clone())
            .bind(self.description.clone())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatabaseUser {
    pub id: i64,
    pub version: i32,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl PgMapped for User {
    type Row = DatabaseUser;

    fn from_row(row: DatabaseUser) -> Result<Self, RepositoryError> {
        let mut user = User::new(row.username)
            .with_id(UserId::new(row.id))
            .with_display_name(row.display_name)
            .with_roles(row.roles);
        user.version = row.version;
        user.email = row.email;
        Ok(user)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.version)
            .bind(self.username.clone())
            .bind(self.display_name.clone())
            .bind(self.email.clone())
            .bind(self.roles.clone())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatabaseTimeRecord {
    pub id: i64,
    pub version: i32,
    pub user_id: Option<i64>,
    pub task_id: Option<i64>,
    pub start_time: Option<OffsetDateTime>,
    pub finish_time: Option<OffsetDateTime>,
    pub note: String,
    pub cost: f64,
    pub status: String,
}

impl PgMapped for TimeRecord {
    type Row = DatabaseTimeRecord;

    fn from_row(row: DatabaseTimeRecord) -> Result<Self, RepositoryError> {
        let status: TaskRecordStatus =
            row.status
                .parse()
                .map_err(|_| RepositoryError::InvalidRow {
                    table: Self::TABLE.name,
                    message: format!("unknown status '{}' for record {}", row.status, row.id),
                })?;

        let mut record = TimeRecord::new()
            .with_id(TimeRecordId::new(row.id))
            .with_user_id(UserId::new(row.user_id.unwrap_or_default()))
            .with_task_id(ProjectTaskId::new(row.task_id.unwrap_or_default()))
            .with_note(row.note)
            .with_status(status);
        record.version = row.version;
        record.cost = row.cost;
        record.set_start(row.start_time);
        record.set_finish(row.finish_time);
        Ok(record)
    }

    fn bind_columns<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.version)
            .bind(nullable_key(self.user_id()))
            .bind(nullable_key(self.task_id()))
            .bind(self.start())
            .bind(self.finish())
            .bind(self.note.clone())
            .bind(self.cost)
            .bind(self.status.to_string())
    }
}
