use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Append-only storage handing out typed indices.
///
/// Entries are never removed, so an [`Id`] stays valid for the lifetime of the
/// arena that issued it.
pub struct Arena<T> {
    items: Vec<T>,
}

pub struct Id<T> {
    _marker: PhantomData<T>,
    pub index: usize,
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.index)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}
impl<T> Eq for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Id<T> {
    pub const fn new(index: usize) -> Self {
        Self {
            _marker: PhantomData,
            index,
        }
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { items: vec![] }
    }

    pub fn alloc(&mut self, item: T) -> Id<T> {
        let id = Id::new(self.items.len());
        self.items.push(item);
        id
    }

    /// Looks up an entry. Ids from a different arena may be out of range.
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.index)
    }

    pub fn iter_with_ids(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (Id::new(i), item))
    }

    /// First entry matching `predicate`, with its id.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<(Id<T>, &T)> {
        self.iter_with_ids().find(|(_, item)| predicate(*item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
