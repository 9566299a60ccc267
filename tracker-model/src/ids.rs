use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EntityId;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const NONE: Self = Self(0);

            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }

            pub fn is_none(&self) -> bool {
                self.0 == 0
            }
        }

        impl EntityId for $name {
            const NONE: Self = Self(0);

            fn from_i64(id: i64) -> Self {
                Self(id)
            }

            fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// A project identifier (database BIGSERIAL).
    ProjectId
);

entity_id!(
    /// A project task identifier.
    ProjectTaskId
);

entity_id!(
    /// A user identifier.
    UserId
);

entity_id!(
    /// A time record identifier.
    TimeRecordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_the_none_sentinel() {
        assert!(ProjectId::default().is_none());
        assert_eq!(ProjectId::NONE, ProjectId::new(0));
        assert!(!UserId::new(7).is_none());
        assert_eq!(<TimeRecordId as EntityId>::from_i64(9).as_i64(), 9);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&ProjectTaskId::new(42)).unwrap();
        assert_eq!(json, "42");

        let id: UserId = serde_json::from_str("17").unwrap();
        assert_eq!(id, UserId::new(17));
    }
}
