use std::iter;

use crate::Entity;

/// A foreign-key column and the parent column it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
}

/// Declarative mapping from an entity's persisted fields to table columns.
///
/// `columns` lists every persisted column except the primary key, in the
/// order the store binds them. Cached references never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
}

impl Table {
    /// Primary key followed by the remaining columns.
    pub fn all_columns(&self) -> impl Iterator<Item = &'static str> {
        let columns: &'static [&'static str] = self.columns;
        iter::once(self.primary_key).chain(columns.iter().copied())
    }

    pub fn foreign_key(&self, column: &str) -> Option<&'static ForeignKey> {
        let foreign_keys: &'static [ForeignKey] = self.foreign_keys;
        foreign_keys.iter().find(|fk| fk.column == column)
    }
}

/// An entity with a table mapping.
pub trait Mapped: Entity + Clone {
    const TABLE: Table;

    /// The persisted projection of this entity: scalar and foreign-key fields
    /// only, with every cached reference and transient field dropped.
    fn detached(&self) -> Self;
}
