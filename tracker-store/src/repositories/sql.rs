//! SQL statements built from a [`Table`] mapping.
//!
//! Bind order is always the primary key (when present) followed by
//! `Table::columns` in declaration order.

use tracker_model::Table;

fn placeholders(range: std::ops::RangeInclusive<usize>) -> String {
    range
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_list(table: &Table) -> String {
    table.all_columns().collect::<Vec<_>>().join(", ")
}

pub(crate) fn select_all(table: &Table) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        column_list(table),
        table.name,
        table.primary_key
    )
}

pub(crate) fn select_by_id(table: &Table) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        column_list(table),
        table.name,
        table.primary_key
    )
}

/// Insert without a primary key, letting the database assign it.
pub(crate) fn insert(table: &Table) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.name,
        table.columns.join(", "),
        placeholders(1..=table.columns.len()),
        table.primary_key
    )
}

/// Insert with an explicit primary key, overwriting an existing row.
pub(crate) fn upsert(table: &Table) -> String {
    let updates = table
        .columns
        .iter()
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING {}",
        table.name,
        column_list(table),
        placeholders(1..=table.columns.len() + 1),
        table.primary_key,
        updates,
        table.primary_key
    )
}

/// Move the primary key sequence past the largest stored id, so rows saved
/// with explicit ids are never handed out again by [`insert`].
pub(crate) fn sync_sequence(table: &Table) -> String {
    format!(
        "SELECT setval(pg_get_serial_sequence('{name}', '{pk}'), \
         GREATEST((SELECT MAX({pk}) FROM {name}), 1))",
        name = table.name,
        pk = table.primary_key
    )
}

pub(crate) fn delete(table: &Table) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        table.name, table.primary_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_model::{Mapped, Project, ProjectTask};

    #[test]
    fn select_statements_list_every_column() {
        assert_eq!(
            select_by_id(&Project::TABLE),
            "SELECT id, version, name, description FROM project WHERE id = $1"
        );
        assert_eq!(
            select_all(&ProjectTask::TABLE),
            "SELECT id, version, project_id, name, description FROM project_task ORDER BY id"
        );
    }

    #[test]
    fn insert_leaves_out_primary_key() {
        assert_eq!(
            insert(&Project::TABLE),
            "INSERT INTO project (version, name, description) VALUES ($1, $2, $3) RETURNING id"
        );
    }

    #[test]
    fn upsert_updates_every_non_key_column() {
        assert_eq!(
            upsert(&ProjectTask::TABLE),
            "INSERT INTO project_task (id, version, project_id, name, description) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO UPDATE SET \
             version = EXCLUDED.version, project_id = EXCLUDED.project_id, \
             name = EXCLUDED.name, description = EXCLUDED.description RETURNING id"
        );
    }

    #[test]
    fn sync_sequence_targets_primary_key() {
        assert_eq!(
            sync_sequence(&Project::TABLE),
            "SELECT setval(pg_get_serial_sequence('project', 'id'), \
             GREATEST((SELECT MAX(id) FROM project), 1))"
        );
    }

    #[test]
    fn delete_by_primary_key() {
        assert_eq!(delete(&Project::TABLE), "DELETE FROM project WHERE id = $1");
    }
}
