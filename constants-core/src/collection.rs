use serde::{Serialize, Serializer};
use std::fmt;

use crate::library::LibraryError;
use crate::stash::{Discipline, Entry, Found, Stash, StashError};

/// Result of applying a slot rule to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<V> {
    /// Append the value at the current end of the collection.
    Append(V),
    /// Place the value at an explicit slot.
    At(V, usize),
    /// Leave the value out of the collection.
    Excluded,
}

/// Derives the slot of a value.
pub type SlotRule<V> = Box<dyn Fn(&V) -> Result<Slot<V>, LibraryError> + Send + Sync>;

/// Per-collection configuration. Unfilled slots always read as absent, so
/// only the stash discipline is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionOptions {
    pub discipline: Discipline,
}

impl CollectionOptions {
    pub fn unique(mut self) -> Self {
        self.discipline = Discipline::Unique;
        self
    }
}

/// A named, sparse, integer-slotted sequence over library values.
///
/// Unfilled slots read as absent. Values directed at the same slot are grouped.
pub struct Collection<V> {
    name: String,
    slots: Vec<Option<Entry<V>>>,
    options: CollectionOptions,
    rule: SlotRule<V>,
}

impl<V: PartialEq> Collection<V> {
    pub fn new(name: impl Into<String>, options: CollectionOptions, rule: SlotRule<V>) -> Self {
        Collection {
            name: name.into(),
            slots: Vec::new(),
            options,
            rule,
        }
    }

    /// Runs every value through the slot rule and stashes the results.
    ///
    /// Stops at the first failure; slots filled before it remain.
    pub fn stash_all<'a, I>(&mut self, values: I) -> Result<&mut Self, LibraryError>
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        for value in values {
            let (slot, payload) = match (self.rule)(value)? {
                Slot::Excluded => continue,
                Slot::Append(payload) => (self.slots.len(), payload),
                Slot::At(payload, slot) => (slot, payload),
            };

            log::trace!("collection {}: stashing at {}", self.name, slot);
            if let Err(source) = self.stash(slot, payload).map(|_| ()) {
                return Err(LibraryError::Stash {
                    target: self.name.clone(),
                    source,
                });
            }
        }

        Ok(self)
    }
}

impl<V> Collection<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contents of a slot; out-of-range slots are absent.
    pub fn get(&self, slot: usize) -> Option<Found<'_, V>> {
        self.entry(slot).map(Entry::as_found)
    }

    pub fn entry(&self, slot: usize) -> Option<&Entry<V>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Iterates over every slot up to the highest filled one, gaps included.
    pub fn iter(&self) -> impl Iterator<Item = Option<Found<'_, V>>> {
        self.slots.iter().map(|slot| slot.as_ref().map(Entry::as_found))
    }

    /// Iterates over the stored values in slot order, flattening groups.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().flatten().flat_map(Entry::iter)
    }

    /// Length including trailing padding up to the highest filled slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Empties the collection; the rule is kept.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn options(&self) -> &CollectionOptions {
        &self.options
    }
}

impl<V> Stash<usize, V> for Collection<V> {
    fn admit(&self, slot: &usize) -> Result<(), StashError> {
        self.slots.admit(slot)
    }

    fn discipline(&self) -> Discipline {
        self.options.discipline
    }

    fn stashed_mut(&mut self, slot: &usize) -> Option<&mut Entry<V>> {
        self.slots.stashed_mut(slot)
    }

    fn store(&mut self, slot: usize, entry: Entry<V>) {
        self.slots.store(slot, entry);
    }
}

impl<V: fmt::Debug> fmt::Debug for Collection<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("slots", &self.slots)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<V: Serialize> Serialize for Collection<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.slots)
    }
}

/// Specification of a collection, registered with
/// [`ConstantLibrary::register_collection`](crate::ConstantLibrary::register_collection).
pub struct CollectionSpec<V> {
    name: String,
    options: CollectionOptions,
    rule: Option<SlotRule<V>>,
}

impl<V> CollectionSpec<V> {
    pub fn new(name: impl Into<String>) -> Self {
        CollectionSpec {
            name: name.into(),
            options: CollectionOptions::default(),
            rule: None,
        }
    }

    pub fn options(mut self, options: CollectionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn unique(mut self) -> Self {
        self.options = self.options.unique();
        self
    }

    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&V) -> Slot<V> + Send + Sync + 'static,
        V: 'static,
    {
        let rule: SlotRule<V> = Box::new(move |value: &V| Ok(rule(value)));
        self.rule = Some(rule);
        self
    }

    pub fn try_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&V) -> Result<Slot<V>, LibraryError> + Send + Sync + 'static,
    {
        let rule: SlotRule<V> = Box::new(rule);
        self.rule = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(self) -> Result<Collection<V>, LibraryError>
    where
        V: PartialEq,
    {
        let rule = self
            .rule
            .ok_or_else(|| LibraryError::MissingRule { name: self.name.clone() })?;
        Ok(Collection::new(self.name, self.options, rule))
    }
}
