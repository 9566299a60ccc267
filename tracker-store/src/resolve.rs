//! Replace placeholder references with rows loaded from a repository.
//!
//! A loaded entity only carries foreign keys. These helpers perform the
//! separate lookups needed to install real parents through the entities'
//! `set_*` methods. A key pointing at a missing row is left untouched.

use tracker_model::{Entity, Project, ProjectTask, TimeRecord, User};

use crate::{EntityRepository, RepositoryError};

/// Which references of a time record were replaced by loaded rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub user: bool,
    pub task: bool,
    pub project: bool,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.user && self.task && self.project
    }
}

/// Load the task's project and cache it on the task.
///
/// Returns `false` when the task has no project or the project row is gone.
pub async fn resolve_task_project<R>(
    repo: &R,
    task: &mut ProjectTask,
) -> Result<bool, RepositoryError>
where
    R: EntityRepository<Project> + ?Sized,
{
    let project_id = task.project_id();
    if project_id.is_none() {
        return Ok(false);
    }

    match repo.load(project_id).await? {
        Some(project) => {
            task.set_project(Some(project));
            Ok(true)
        }
        None => {
            tracing::warn!(%project_id, task_id = %task.id(), "task references a missing project");
            Ok(false)
        }
    }
}

/// Load the record's user, its task, and the task's project.
pub async fn resolve_time_record<R>(
    repo: &R,
    record: &mut TimeRecord,
) -> Result<Resolution, RepositoryError>
where
    R: EntityRepository<User> + EntityRepository<ProjectTask> + EntityRepository<Project> + ?Sized,
{
    let mut resolution = Resolution::default();

    let user_id = record.user_id();
    if !user_id.is_none() {
        match EntityRepository::<User>::load(repo, user_id).await? {
            Some(user) => {
                record.set_user(Some(user));
                resolution.user = true;
            }
            None => {
                tracing::warn!(%user_id, record_id = %record.id(), "record references a missing user");
            }
        }
    }

    let task_id = record.task_id();
    if !task_id.is_none() {
        match EntityRepository::<ProjectTask>::load(repo, task_id).await? {
            Some(mut task) => {
                resolution.project = resolve_task_project(repo, &mut task).await?;
                record.set_task(Some(task));
                resolution.task = true;
            }
            None => {
                tracing::warn!(%task_id, record_id = %record.id(), "record references a missing task");
            }
        }
    }

    Ok(resolution)
}

/// Fill a project's task keys from the tasks that reference it.
pub async fn load_project_tasks<R>(repo: &R, project: &mut Project) -> Result<usize, RepositoryError>
where
    R: EntityRepository<ProjectTask> + ?Sized,
{
    let project_id = project.id();
    let tasks = repo.list().await?;

    project.clear_tasks();
    project.add_tasks(
        tasks
            .iter()
            .filter(|task| task.project_id() == project_id)
            .map(|task| task.id()),
    );

    Ok(project.task_ids().count())
}
