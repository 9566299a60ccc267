//! PostgreSQL store tests. Run with `DATABASE_URL` set and `--ignored`.

use sqlx::PgPool;
use tracker_model::{Entity, Project, ProjectId, ProjectTask, ProjectTaskId, ReferenceState};
use tracker_store::{EntityRepository, PgStore};

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn generated_ids_skip_past_explicit_ids(pool: PgPool) {
    let store = PgStore::new(pool);

    let seeded = store
        .save(&Project::new("Seeded").with_id(ProjectId::new(1)))
        .await
        .unwrap();
    let fresh = store.save(&Project::new("Fresh")).await.unwrap();

    assert_eq!(seeded, ProjectId::new(1));
    assert_eq!(fresh, ProjectId::new(2));

    let projects = EntityRepository::<Project>::list(&store).await.unwrap();
    let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Seeded", "Fresh"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn explicit_id_above_sequence_is_not_reused(pool: PgPool) {
    let store = PgStore::new(pool);

    store
        .save(&Project::new("Imported").with_id(ProjectId::new(40)))
        .await
        .unwrap();
    let fresh = store.save(&Project::new("Fresh")).await.unwrap();

    assert_eq!(fresh, ProjectId::new(41));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn task_round_trips_project_key_only(pool: PgPool) {
    let store = PgStore::new(pool);
    let project_id = store.save(&Project::new("Payroll")).await.unwrap();

    let mut task = ProjectTask::new("Code review").with_id(ProjectTaskId::new(7));
    task.set_project(Some(Project::new("Payroll").with_id(project_id)));
    store.save(&task).await.unwrap();

    let loaded = EntityRepository::<ProjectTask>::get(&store, ProjectTaskId::new(7))
        .await
        .unwrap();

    assert_eq!(loaded.id(), ProjectTaskId::new(7));
    assert_eq!(loaded.project_id(), project_id);
    assert_eq!(loaded.project_reference().state(), ReferenceState::Absent);
}
