use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Entity, Mapped, ProjectId, ProjectTaskId, Table};

/// Join key between a project and one of its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTaskKey {
    pub project_id: ProjectId,
    pub task_id: ProjectTaskId,
}

impl ProjectTaskKey {
    pub fn new(project_id: ProjectId, task_id: ProjectTaskId) -> Self {
        Self {
            project_id,
            task_id,
        }
    }
}

/// A project in the time tracking system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: ProjectId,
    /// Version used to resolve conflicts with the remote server.
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip)]
    tasks: BTreeMap<ProjectTaskId, ProjectTaskKey>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<ProjectId>) -> Self {
        self.set_id(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A project is empty until it has both an id and a name.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() || self.name.is_empty()
    }

    pub fn task_ids(&self) -> impl Iterator<Item = ProjectTaskId> + '_ {
        self.tasks.keys().copied()
    }

    pub fn task_keys(&self) -> impl Iterator<Item = &ProjectTaskKey> {
        self.tasks.values()
    }

    pub fn add_task(&mut self, task_id: ProjectTaskId) {
        self.tasks
            .insert(task_id, ProjectTaskKey::new(self.id, task_id));
    }

    pub fn add_tasks(&mut self, task_ids: impl IntoIterator<Item = ProjectTaskId>) {
        for task_id in task_ids {
            self.add_task(task_id);
        }
    }

    /// Add a key, claiming it for this project if it has no project yet.
    pub fn add_key(&mut self, mut key: ProjectTaskKey) {
        if key.project_id.is_none() {
            key.project_id = self.id;
        }
        self.tasks.insert(key.task_id, key);
    }

    pub fn clear_tasks(&mut self) {
        self.tasks.clear();
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> ProjectId {
        self.id
    }

    fn set_id(&mut self, id: ProjectId) {
        self.id = id;
        for key in self.tasks.values_mut() {
            key.project_id = id;
        }
    }
}

impl Mapped for Project {
    const TABLE: Table = Table {
        name: "project",
        primary_key: "id",
        columns: &["version", "name", "description"],
        foreign_keys: &[],
    };

    fn detached(&self) -> Self {
        Self {
            tasks: BTreeMap::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
