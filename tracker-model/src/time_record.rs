use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{macros::time, Duration, OffsetDateTime};

use crate::{
    Entity, ForeignKey, Mapped, Project, ProjectTask, ProjectTaskId, Reference, Table,
    TimeRecordId, User, UserId,
};

/// Lifecycle status of a time record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TaskRecordStatus {
    /// Being composed, not submitted.
    Draft,
    /// The record currently being edited.
    Current,
    #[default]
    Inserted,
    Modified,
    Deleted,
}

/// Some work done by a user on a project task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    id: TimeRecordId,
    pub version: i32,
    #[serde(rename = "userId")]
    user: Reference<User>,
    #[serde(rename = "taskId")]
    task: Reference<ProjectTask>,
    #[serde(with = "time::serde::rfc3339::option")]
    start: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    finish: Option<OffsetDateTime>,
    pub note: String,
    pub cost: f64,
    pub status: TaskRecordStatus,
}

/// Timestamps are kept at whole-second granularity.
fn truncate_to_seconds(value: OffsetDateTime) -> OffsetDateTime {
    value - Duration::nanoseconds(i64::from(value.nanosecond()))
}

impl TimeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<TimeRecordId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the user key without caching a user.
    pub fn with_user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user = Reference::from_key(user_id.into());
        self
    }

    /// Set the task key without caching a task.
    pub fn with_task_id(mut self, task_id: impl Into<ProjectTaskId>) -> Self {
        self.task = Reference::from_key(task_id.into());
        self
    }

    pub fn with_times(mut self, start: OffsetDateTime, finish: OffsetDateTime) -> Self {
        self.set_start(Some(start));
        self.set_finish(Some(finish));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_status(mut self, status: TaskRecordStatus) -> Self {
        self.status = status;
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user.key()
    }

    pub fn set_user_id(&mut self, user_id: UserId) {
        self.user.set_key(user_id);
    }

    /// The cached user, or a placeholder carrying only `user_id`.
    pub fn user(&mut self) -> &User {
        self.user.get_or_placeholder()
    }

    pub fn user_ref(&self) -> Option<&User> {
        self.user.get()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user.set(user);
    }

    pub fn user_reference(&self) -> &Reference<User> {
        &self.user
    }

    pub fn task_id(&self) -> ProjectTaskId {
        self.task.key()
    }

    pub fn set_task_id(&mut self, task_id: ProjectTaskId) {
        self.task.set_key(task_id);
    }

    /// The cached task, or a placeholder carrying only `task_id`.
    pub fn task(&mut self) -> &ProjectTask {
        self.task.get_or_placeholder()
    }

    pub fn task_ref(&self) -> Option<&ProjectTask> {
        self.task.get()
    }

    pub fn set_task(&mut self, task: Option<ProjectTask>) {
        self.task.set(task);
    }

    pub fn task_reference(&self) -> &Reference<ProjectTask> {
        &self.task
    }

    pub fn task_reference_mut(&mut self) -> &mut Reference<ProjectTask> {
        &mut self.task
    }

    /// The project of the task. Always read through the task, never stored.
    ///
    /// Placeholders are synthesized for the task and its project as needed.
    pub fn project(&mut self) -> &Project {
        self.task.placeholder_mut().project()
    }

    /// The project of the cached task, if both are cached.
    pub fn project_ref(&self) -> Option<&Project> {
        self.task.get().and_then(ProjectTask::project_ref)
    }

    pub fn start(&self) -> Option<OffsetDateTime> {
        self.start
    }

    pub fn set_start(&mut self, start: Option<OffsetDateTime>) {
        self.start = start.map(truncate_to_seconds);
    }

    pub fn finish(&self) -> Option<OffsetDateTime> {
        self.finish
    }

    pub fn set_finish(&mut self, finish: Option<OffsetDateTime>) {
        self.finish = finish.map(truncate_to_seconds);
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.start, self.finish) {
            (Some(start), Some(finish)) => Some(finish - start),
            _ => None,
        }
    }

    /// A record is empty without a task, a start time, or when its cached
    /// task has no project.
    pub fn is_empty(&self) -> bool {
        self.task_id().is_none()
            || self.start.is_none()
            || self.task.get().is_some_and(|task| task.project_id().is_none())
    }

    /// Split into one record per calendar day, in the start time's offset.
    ///
    /// Returns nothing for empty records, records without a finish time and
    /// records shorter than a minute.
    pub fn split_by_day(&self) -> Vec<TimeRecord> {
        if self.is_empty() {
            return Vec::new();
        }
        let (Some(start), Some(finish)) = (self.start, self.finish) else {
            return Vec::new();
        };
        if finish - start < Duration::MINUTE {
            return Vec::new();
        }

        let offset = start.offset();
        let finish = finish.to_offset(offset);
        if start.date() == finish.date() {
            return vec![self.clone()];
        }

        let mut parts = Vec::new();
        let mut day_start = start;
        while day_start.date() < finish.date() {
            let date = day_start.date();
            let day_end = date.with_time(time!(23:59:59)).assume_offset(offset);
            parts.push(self.clone().with_times(day_start, day_end));

            let Some(next) = date.next_day() else {
                return parts;
            };
            day_start = next.midnight().assume_offset(offset);
        }
        parts.push(self.clone().with_times(day_start, finish));
        parts
    }
}

impl Entity for TimeRecord {
    type Id = TimeRecordId;

    fn id(&self) -> TimeRecordId {
        self.id
    }

    fn set_id(&mut self, id: TimeRecordId) {
        self.id = id;
    }
}

impl Mapped for TimeRecord {
    const TABLE: Table = Table {
        name: "time_record",
        primary_key: "id",
        columns: &[
            "version",
            "user_id",
            "task_id",
            "start_time",
            "finish_time",
            "note",
            "cost",
            "status",
        ],
        foreign_keys: &[
            ForeignKey {
                column: "user_id",
                parent_table: "users",
                parent_column: "id",
            },
            ForeignKey {
                column: "task_id",
                parent_table: "project_task",
                parent_column: "id",
            },
        ],
    };

    fn detached(&self) -> Self {
        Self {
            user: self.user.detached(),
            task: self.task.detached(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProjectId, ReferenceState};
    use time::macros::datetime;

    fn task_in_project(task_id: i64, project_id: i64, project_name: &str) -> ProjectTask {
        let mut task = ProjectTask::new(format!("task {task_id}")).with_id(ProjectTaskId::new(task_id));
        task.set_project(Some(
            Project::new(project_name).with_id(ProjectId::new(project_id)),
        ));
        task
    }

    #[test]
    fn new_record_is_inserted() {
        assert_eq!(TimeRecord::new().status, TaskRecordStatus::Inserted);
    }

    #[test]
    fn status_parses_from_text() {
        assert_eq!(
            "MODIFIED".parse::<TaskRecordStatus>().unwrap(),
            TaskRecordStatus::Modified
        );
        assert_eq!(TaskRecordStatus::Deleted.to_string(), "deleted");
        assert!("archived".parse::<TaskRecordStatus>().is_err());
    }

    #[test]
    fn user_and_task_ids_follow_references() {
        let mut record = TimeRecord::new();
        record.set_user(Some(User::new("moshe").with_id(UserId::new(4))));
        record.set_task(Some(task_in_project(8, 2, "Payroll")));

        assert_eq!(record.user_id(), UserId::new(4));
        assert_eq!(record.task_id(), ProjectTaskId::new(8));

        record.set_user(None);
        assert!(record.user_id().is_none());
    }

    #[test]
    fn set_user_id_creates_keyed_placeholder() {
        let mut record = TimeRecord::new();
        record.set_user_id(UserId::new(12));

        assert_eq!(record.user_reference().state(), ReferenceState::Placeholder);
        let user = record.user();
        assert_eq!(user.id(), UserId::new(12));
        assert!(user.username.is_empty());
    }

    #[test]
    fn project_is_read_through_task() {
        let mut record = TimeRecord::new();
        record.set_task(Some(task_in_project(8, 2, "Payroll")));

        assert_eq!(record.project().id(), ProjectId::new(2));
        assert_eq!(record.project_ref().map(|p| p.name.as_str()), Some("Payroll"));

        record.set_task(Some(task_in_project(9, 3, "Billing")));

        assert_eq!(record.project().id(), ProjectId::new(3));
        assert_eq!(record.project().name, "Billing");
        let through_task = record.task().project_ref().cloned();
        assert_eq!(record.project_ref().cloned(), through_task);
    }

    #[test]
    fn project_follows_nested_project_id_change() {
        let mut record = TimeRecord::new();
        record.set_task(Some(task_in_project(8, 2, "Payroll")));

        record
            .task_reference_mut()
            .edit()
            .set_project_id(ProjectId::new(5));

        assert_eq!(record.project().id(), ProjectId::new(5));
        assert_eq!(record.task_id(), ProjectTaskId::new(8));
    }

    #[test]
    fn project_on_fresh_record_is_placeholder_chain() {
        let mut record = TimeRecord::new();

        assert!(record.project().id().is_none());
        assert!(record.task_reference().is_placeholder());
    }

    #[test]
    fn times_are_truncated_to_seconds() {
        let mut record = TimeRecord::new();
        record.set_start(Some(datetime!(2024-03-01 09:15:30.750 UTC)));

        assert_eq!(record.start(), Some(datetime!(2024-03-01 09:15:30 UTC)));
    }

    #[test]
    fn empty_without_task_or_start() {
        let start = datetime!(2024-03-01 09:00 UTC);
        let finish = datetime!(2024-03-01 10:00 UTC);

        assert!(TimeRecord::new().with_times(start, finish).is_empty());
        assert!(TimeRecord::new().with_task_id(ProjectTaskId::new(1)).is_empty());
        assert!(!TimeRecord::new()
            .with_task_id(ProjectTaskId::new(1))
            .with_times(start, finish)
            .is_empty());
    }

    #[test]
    fn keyed_record_with_unnamed_parents_is_not_empty() {
        let mut record = TimeRecord::new().with_times(
            datetime!(2024-03-01 09:00 UTC),
            datetime!(2024-03-01 10:00 UTC),
        );
        record.set_task(Some(task_in_project(8, 2, "")));
        record.task_reference_mut().edit().name.clear();

        assert!(record.project().name.is_empty());
        assert!(!record.is_empty());
    }

    #[test]
    fn cached_task_without_project_is_empty() {
        let mut record = TimeRecord::new().with_times(
            datetime!(2024-03-01 09:00 UTC),
            datetime!(2024-03-01 10:00 UTC),
        );
        record.set_task(Some(ProjectTask::new("Code review").with_id(ProjectTaskId::new(8))));

        assert!(record.is_empty());
    }

    #[test]
    fn split_same_day_returns_record() {
        let record = TimeRecord::new()
            .with_task_id(ProjectTaskId::new(1))
            .with_times(
                datetime!(2024-03-01 09:00 UTC),
                datetime!(2024-03-01 17:00 UTC),
            );

        assert_eq!(record.split_by_day(), vec![record.clone()]);
    }

    #[test]
    fn split_skips_short_and_open_records() {
        let short = TimeRecord::new()
            .with_task_id(ProjectTaskId::new(1))
            .with_times(
                datetime!(2024-03-01 09:00:00 UTC),
                datetime!(2024-03-01 09:00:59 UTC),
            );
        assert!(short.split_by_day().is_empty());

        let mut open = TimeRecord::new().with_task_id(ProjectTaskId::new(1));
        open.set_start(Some(datetime!(2024-03-01 09:00 UTC)));
        assert!(open.split_by_day().is_empty());
    }

    #[test]
    fn split_across_days() {
        let record = TimeRecord::new()
            .with_id(TimeRecordId::new(3))
            .with_task_id(ProjectTaskId::new(1))
            .with_note("migration")
            .with_times(
                datetime!(2024-03-01 22:00 UTC),
                datetime!(2024-03-04 02:30 UTC),
            );

        let parts = record.split_by_day();

        let spans: Vec<_> = parts
            .iter()
            .map(|part| (part.start().unwrap(), part.finish().unwrap()))
            .collect();
        assert_eq!(
            spans,
            vec![
                (datetime!(2024-03-01 22:00 UTC), datetime!(2024-03-01 23:59:59 UTC)),
                (datetime!(2024-03-02 00:00 UTC), datetime!(2024-03-02 23:59:59 UTC)),
                (datetime!(2024-03-03 00:00 UTC), datetime!(2024-03-03 23:59:59 UTC)),
                (datetime!(2024-03-04 00:00 UTC), datetime!(2024-03-04 02:30 UTC)),
            ]
        );
        assert!(parts
            .iter()
            .all(|part| part.id() == TimeRecordId::new(3) && part.note == "migration"));
    }

    #[test]
    fn detached_keeps_keys_only() {
        let mut record = TimeRecord::new();
        record.set_user(Some(User::new("moshe").with_id(UserId::new(4))));
        record.set_task(Some(task_in_project(8, 2, "Payroll")));

        let detached = record.detached();

        assert_eq!(detached.user_id(), UserId::new(4));
        assert_eq!(detached.task_id(), ProjectTaskId::new(8));
        assert!(detached.user_ref().is_none());
        assert!(detached.task_ref().is_none());
        assert!(detached.project_ref().is_none());
    }
}
