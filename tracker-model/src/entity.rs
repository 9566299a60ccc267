use std::fmt;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};

/// Identifier of a stored entity.
///
/// Every identifier has a `NONE` value (zero) meaning "not persisted yet".
pub trait EntityId:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const NONE: Self;

    fn from_i64(id: i64) -> Self;

    fn as_i64(&self) -> i64;

    fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// An in-memory record corresponding to a row in the store.
pub trait Entity {
    type Id: EntityId;

    fn id(&self) -> Self::Id;

    /// Overwrite the identifier. Entities that carry keys derived from their
    /// own id (a project's task keys) re-key them here.
    fn set_id(&mut self, id: Self::Id);
}
