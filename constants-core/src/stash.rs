use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::Hash;

/// Error type for stash operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StashError {
    #[error("the nil value of a stash cannot be stashed")]
    NilValue,
    #[error("key {key} is already occupied")]
    Conflict { key: String },
    #[error("slot {slot} is out of range")]
    SlotOutOfRange { slot: usize },
}

/// Largest slot an array-like stash will pad up to.
pub const MAX_SLOT: usize = 1 << 24;

/// How a stash treats a second value arriving at an occupied key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Discipline {
    /// Collisions are collected into an ordered group.
    #[default]
    Group,
    /// Collisions are rejected with [`StashError::Conflict`].
    Unique,
}

/// The contents of one key or slot of a stash.
///
/// The first value stored at a key is kept as a singleton; every later value
/// converts the entry into a group holding all values in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<V> {
    Single(V),
    Group(Vec<V>),
}

impl<V> Entry<V> {
    /// Appends a value, promoting a singleton to a group.
    pub fn push(&mut self, value: V) {
        *self = match std::mem::replace(self, Entry::Group(Vec::new())) {
            Entry::Single(first) => Entry::Group(vec![first, value]),
            Entry::Group(mut group) => {
                group.push(value);
                Entry::Group(group)
            }
        };
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Entry::Group(_))
    }

    /// Number of values held by the entry.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Always false: an entry holds at least one value.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the values as a slice; a singleton is a slice of one.
    pub fn as_slice(&self) -> &[V] {
        match self {
            Entry::Single(value) => std::slice::from_ref(value),
            Entry::Group(group) => group,
        }
    }

    /// The first stashed value.
    pub fn first(&self) -> Option<&V> {
        self.as_slice().first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.as_slice().iter()
    }

    /// Borrows the entry as a lookup result.
    pub fn as_found(&self) -> Found<'_, V> {
        match self {
            Entry::Single(value) => Found::One(value),
            Entry::Group(group) => Found::Group(group),
        }
    }

    /// Flattens the entry into its values.
    pub fn into_vec(self) -> Vec<V> {
        match self {
            Entry::Single(value) => vec![value],
            Entry::Group(group) => group,
        }
    }
}

impl<V: Serialize> Serialize for Entry<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Entry::Single(value) => value.serialize(serializer),
            Entry::Group(group) => serializer.collect_seq(group),
        }
    }
}

/// A borrowed lookup result: a single value or a group of values.
#[derive(Debug, PartialEq)]
pub enum Found<'a, V> {
    One(&'a V),
    Group(&'a [V]),
}

impl<'a, V> Found<'a, V> {
    /// Returns the value when the result is not a group.
    pub fn one(&self) -> Option<&'a V> {
        match self {
            Found::One(value) => Some(*value),
            Found::Group(_) => None,
        }
    }

    pub fn as_slice(&self) -> &'a [V] {
        match self {
            Found::One(value) => std::slice::from_ref(*value),
            Found::Group(group) => *group,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Found::Group(_))
    }
}

impl<V> Clone for Found<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Found<'_, V> {}

/// Store-or-group semantics over a keyed container.
///
/// Implementors only provide raw access to their entries; [`Stash::stash`]
/// applies the grouping rule. A key whose entry is absent reads as the
/// container's nil value, which therefore can never be stashed itself.
pub trait Stash<K, V> {
    /// The value standing for "nothing stored here". `None` means absence.
    fn nil_value(&self) -> Option<&V> {
        None
    }

    fn discipline(&self) -> Discipline {
        Discipline::Group
    }

    /// Checks that `key` can be stored at all. Keys are accepted by default.
    fn admit(&self, _key: &K) -> Result<(), StashError> {
        Ok(())
    }

    /// Returns the occupied entry at `key`, if any.
    fn stashed_mut(&mut self, key: &K) -> Option<&mut Entry<V>>;

    /// Writes an entry at `key`, replacing whatever was there.
    fn store(&mut self, key: K, entry: Entry<V>);

    /// Stores `value` at `key`.
    ///
    /// An empty key receives the value directly. An occupied key collects the
    /// existing value and `value` into a group (or fails under
    /// [`Discipline::Unique`]).
    fn stash(&mut self, key: K, value: V) -> Result<&mut Self, StashError>
    where
        Self: Sized,
        K: fmt::Debug,
        V: PartialEq,
    {
        self.admit(&key)?;
        if self.nil_value().is_some_and(|nil| *nil == value) {
            return Err(StashError::NilValue);
        }

        let discipline = self.discipline();
        match self.stashed_mut(&key) {
            None => self.store(key, Entry::Single(value)),
            Some(_) if discipline == Discipline::Unique => {
                return Err(StashError::Conflict {
                    key: format!("{key:?}"),
                });
            }
            Some(entry) => entry.push(value),
        }

        Ok(self)
    }
}

impl<K: Hash + Eq, V> Stash<K, V> for IndexMap<K, Entry<V>> {
    fn stashed_mut(&mut self, key: &K) -> Option<&mut Entry<V>> {
        self.get_mut(key)
    }

    fn store(&mut self, key: K, entry: Entry<V>) {
        self.insert(key, entry);
    }
}

/// Array-like stashes are padded with empty slots up to the highest key,
/// which may not exceed [`MAX_SLOT`].
impl<V> Stash<usize, V> for Vec<Option<Entry<V>>> {
    fn admit(&self, slot: &usize) -> Result<(), StashError> {
        if *slot > MAX_SLOT {
            return Err(StashError::SlotOutOfRange { slot: *slot });
        }
        Ok(())
    }

    fn stashed_mut(&mut self, slot: &usize) -> Option<&mut Entry<V>> {
        self.get_mut(*slot).and_then(Option::as_mut)
    }

    fn store(&mut self, slot: usize, entry: Entry<V>) {
        if slot >= self.len() {
            self.resize_with(slot + 1, || None);
        }
        self[slot] = Some(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stash_stores_new_values_at_key() {
        let mut map: IndexMap<&str, Entry<&str>> = IndexMap::new();
        map.stash("key", "one").unwrap();

        assert_eq!(map.get("key"), Some(&Entry::Single("one")));
    }

    #[test]
    fn stash_groups_additional_values_in_order() {
        let mut map: IndexMap<&str, Entry<&str>> = IndexMap::new();
        map.stash("key", "one").unwrap();
        map.stash("key", "two").unwrap();
        map.stash("key", "three").unwrap();

        let entry = map.get("key").unwrap();
        assert!(entry.is_group());
        assert_eq!(entry.as_slice(), &["one", "two", "three"]);
    }

    #[test]
    fn stash_treats_sequence_payloads_as_plain_values() {
        let mut map: IndexMap<&str, Entry<Vec<&str>>> = IndexMap::new();
        map.stash("key", vec!["one"]).unwrap();
        assert_eq!(map.get("key"), Some(&Entry::Single(vec!["one"])));

        map.stash("key", vec!["two"]).unwrap();
        map.stash("key", vec!["three"]).unwrap();
        assert_eq!(
            map.get("key"),
            Some(&Entry::Group(vec![vec!["one"], vec!["two"], vec!["three"]]))
        );
    }

    #[test]
    fn stash_repeated_value_is_not_idempotent() {
        let mut map: IndexMap<u8, Entry<u8>> = IndexMap::new();
        map.stash(1, 7).unwrap().stash(1, 7).unwrap();

        assert_eq!(map.get(&1), Some(&Entry::Group(vec![7, 7])));
    }

    #[test]
    fn vec_stash_pads_with_empty_slots() {
        let mut slots: Vec<Option<Entry<char>>> = Vec::new();
        slots.stash(3, 'a').unwrap();
        slots.stash(1, 'b').unwrap();
        slots.stash(3, 'c').unwrap();

        assert_eq!(
            slots,
            vec![
                None,
                Some(Entry::Single('b')),
                None,
                Some(Entry::Group(vec!['a', 'c'])),
            ]
        );
    }

    #[test]
    fn vec_stash_rejects_slots_past_the_limit() {
        let mut slots: Vec<Option<Entry<char>>> = Vec::new();

        assert_eq!(
            slots.stash(usize::MAX, 'a').err(),
            Some(StashError::SlotOutOfRange { slot: usize::MAX })
        );
        assert_eq!(
            slots.stash(MAX_SLOT + 1, 'a').err(),
            Some(StashError::SlotOutOfRange { slot: MAX_SLOT + 1 })
        );
        assert!(slots.is_empty());
    }

    struct NilStash {
        entries: IndexMap<u8, Entry<&'static str>>,
        nil: &'static str,
        discipline: Discipline,
    }

    impl Stash<u8, &'static str> for NilStash {
        fn nil_value(&self) -> Option<&&'static str> {
            Some(&self.nil)
        }

        fn discipline(&self) -> Discipline {
            self.discipline
        }

        fn stashed_mut(&mut self, key: &u8) -> Option<&mut Entry<&'static str>> {
            self.entries.get_mut(key)
        }

        fn store(&mut self, key: u8, entry: Entry<&'static str>) {
            self.entries.insert(key, entry);
        }
    }

    #[test]
    fn stash_rejects_the_nil_value() {
        let mut stash = NilStash {
            entries: IndexMap::new(),
            nil: "nil",
            discipline: Discipline::Group,
        };

        assert_eq!(stash.stash(1, "nil").err(), Some(StashError::NilValue));
        assert!(stash.entries.is_empty());
    }

    #[test]
    fn unique_discipline_rejects_collisions() {
        let mut stash = NilStash {
            entries: IndexMap::new(),
            nil: "nil",
            discipline: Discipline::Unique,
        };

        stash.stash(1, "one").unwrap();
        let err = stash.stash(1, "uno").err().unwrap();

        assert_eq!(err, StashError::Conflict { key: "1".into() });
        assert_eq!(stash.entries.get(&1), Some(&Entry::Single("one")));
    }

    #[test]
    fn found_views() {
        let single = Entry::Single(1);
        let group = Entry::Group(vec![1, 2]);

        assert_eq!(single.as_found().one(), Some(&1));
        assert_eq!(group.as_found().one(), None);
        assert_eq!(group.as_found().as_slice(), &[1, 2]);
        assert_eq!(single.len(), 1);
        assert_eq!(group.len(), 2);
        assert!(!single.is_empty());
        assert!(!group.is_empty());
        assert_eq!(group.into_vec(), vec![1, 2]);
    }
}
