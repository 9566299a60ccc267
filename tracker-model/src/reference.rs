//! Foreign-key references that keep a stored key and a cached parent in sync.
//!
//! A [`Reference`] owns the scalar key persisted with the child row and,
//! optionally, the parent object that key points at. The key is what gets
//! saved; the cached parent is never persisted through the child.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Entity, EntityId};

/// What a [`Reference`] currently holds besides its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceState {
    /// Only the key is known. This is the state right after a load.
    Absent,
    /// A locally synthesized stand-in whose only populated field is its id.
    Placeholder,
    /// An object handed in through [`Reference::set`], typically loaded.
    Resolved,
}

#[derive(Debug, Clone, PartialEq)]
struct Cached<P> {
    value: P,
    placeholder: bool,
}

impl<P: Entity + Default> Cached<P> {
    fn placeholder(key: P::Id) -> Self {
        tracing::trace!(%key, "synthesizing placeholder reference");
        let mut value = P::default();
        value.set_id(key);
        Self {
            value,
            placeholder: true,
        }
    }
}

/// A foreign key together with the optionally cached parent it refers to.
///
/// Whenever a parent is cached, `key() == parent.id()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference<P: Entity> {
    key: P::Id,
    cached: Option<Cached<P>>,
}

impl<P: Entity> Default for Reference<P> {
    fn default() -> Self {
        Self {
            key: P::Id::NONE,
            cached: None,
        }
    }
}

impl<P: Entity> Reference<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reference that knows its key but has nothing cached.
    pub fn from_key(key: P::Id) -> Self {
        Self { key, cached: None }
    }

    /// The stored foreign key, whether or not a parent is cached.
    pub fn key(&self) -> P::Id {
        self.key
    }

    /// The cached parent, if any. Never synthesizes a placeholder.
    pub fn get(&self) -> Option<&P> {
        self.cached.as_ref().map(|cached| &cached.value)
    }

    pub fn state(&self) -> ReferenceState {
        match &self.cached {
            None => ReferenceState::Absent,
            Some(cached) if cached.placeholder => ReferenceState::Placeholder,
            Some(_) => ReferenceState::Resolved,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.state() == ReferenceState::Placeholder
    }

    pub fn is_resolved(&self) -> bool {
        self.state() == ReferenceState::Resolved
    }

    /// Replace the cached parent and overwrite the key with its id.
    ///
    /// `None` clears the cache and resets the key to `NONE`. A parent whose
    /// own id is `NONE` (not saved yet) is still cached, and the key becomes
    /// `NONE` as well.
    pub fn set(&mut self, parent: Option<P>) {
        match parent {
            Some(value) => {
                self.key = value.id();
                self.cached = Some(Cached {
                    value,
                    placeholder: false,
                });
            }
            None => {
                self.key = P::Id::NONE;
                self.cached = None;
            }
        }
    }

    /// Remove the cached parent and keep the key.
    pub fn take(&mut self) -> Option<P> {
        self.cached.take().map(|cached| cached.value)
    }

    /// A copy carrying only the key, as it would come back from the store.
    pub fn detached(&self) -> Self {
        Self::from_key(self.key)
    }
}

impl<P: Entity + Default> Reference<P> {
    /// The cached parent, creating an empty placeholder with the current key
    /// when nothing is cached.
    ///
    /// This never loads anything. A placeholder only carries its id; use
    /// [`Reference::is_resolved`] before trusting any other field.
    pub fn get_or_placeholder(&mut self) -> &P {
        self.placeholder_mut()
    }

    /// Overwrite the key and write it into the cached parent's id.
    ///
    /// With nothing cached, a placeholder carrying `key` is created. Whatever
    /// is cached is re-keyed in place and keeps its other fields and state.
    pub fn set_key(&mut self, key: P::Id) {
        self.key = key;
        match &mut self.cached {
            Some(cached) => cached.value.set_id(key),
            None => self.cached = Some(Cached::placeholder(key)),
        }
    }

    /// Mutable access to the cached parent, synthesizing a placeholder if
    /// needed. The key is re-read from the parent's id when the guard drops.
    ///
    /// Taking mutable access through the guard marks a placeholder as
    /// resolved, since its fields are now supplied by the caller.
    pub fn edit(&mut self) -> ReferenceMut<'_, P> {
        let key = self.key;
        let cached = self
            .cached
            .get_or_insert_with(|| Cached::placeholder(key));
        ReferenceMut {
            key: &mut self.key,
            cached,
            touched: false,
        }
    }

    /// Unsynchronized mutable access for nested lazy accessors that never
    /// change the parent's id.
    pub(crate) fn placeholder_mut(&mut self) -> &mut P {
        let key = self.key;
        &mut self
            .cached
            .get_or_insert_with(|| Cached::placeholder(key))
            .value
    }
}

/// Guard returned by [`Reference::edit`].
pub struct ReferenceMut<'a, P: Entity> {
    key: &'a mut P::Id,
    cached: &'a mut Cached<P>,
    touched: bool,
}

impl<P: Entity> Deref for ReferenceMut<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.cached.value
    }
}

impl<P: Entity> DerefMut for ReferenceMut<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.touched = true;
        &mut self.cached.value
    }
}

impl<P: Entity> Drop for ReferenceMut<'_, P> {
    fn drop(&mut self) {
        *self.key = self.cached.value.id();
        if self.touched {
            self.cached.placeholder = false;
        }
    }
}

// Only the key is part of the serialized form; cached parents are transient.
impl<P: Entity> Serialize for Reference<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.key.serialize(serializer)
    }
}

impl<'de, P: Entity> Deserialize<'de> for Reference<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        P::Id::deserialize(deserializer).map(Self::from_key)
    }
}
