use serde::{Deserialize, Serialize};

use crate::{Entity, ForeignKey, Mapped, Project, ProjectId, ProjectTaskId, Reference, Table};

/// A task that belongs to a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTask {
    id: ProjectTaskId,
    pub version: i32,
    #[serde(rename = "projectId")]
    project: Reference<Project>,
    pub name: String,
    pub description: Option<String>,
}

impl ProjectTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<ProjectTaskId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the project key without caching a project, the way a row load does.
    pub fn with_project_id(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.project = Reference::from_key(project_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn project_id(&self) -> ProjectId {
        self.project.key()
    }

    /// Set the project key and propagate it into the cached project,
    /// creating a placeholder if none is cached.
    pub fn set_project_id(&mut self, project_id: ProjectId) {
        self.project.set_key(project_id);
    }

    /// The cached project, or a placeholder carrying only `project_id`.
    ///
    /// No I/O happens here; load the project through the store to get its
    /// real fields.
    pub fn project(&mut self) -> &Project {
        self.project.get_or_placeholder()
    }

    /// The cached project, if any.
    pub fn project_ref(&self) -> Option<&Project> {
        self.project.get()
    }

    pub fn set_project(&mut self, project: Option<Project>) {
        self.project.set(project);
    }

    pub fn project_reference(&self) -> &Reference<Project> {
        &self.project
    }

    pub fn project_reference_mut(&mut self) -> &mut Reference<Project> {
        &mut self.project
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() || self.name.is_empty()
    }
}

impl Entity for ProjectTask {
    type Id = ProjectTaskId;

    fn id(&self) -> ProjectTaskId {
        self.id
    }

    fn set_id(&mut self, id: ProjectTaskId) {
        self.id = id;
    }
}

impl Mapped for ProjectTask {
    const TABLE: Table = Table {
        name: "project_task",
        primary_key: "id",
        columns: &["version", "project_id", "name", "description"],
        foreign_keys: &[ForeignKey {
            column: "project_id",
            parent_table: "project",
            parent_column: "id",
        }],
    };

    fn detached(&self) -> Self {
        Self {
            project: self.project.detached(),
            ..self.clone()
        }
    }
}
