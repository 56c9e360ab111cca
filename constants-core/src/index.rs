use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use crate::library::LibraryError;
use crate::stash::{Discipline, Entry, Found, Stash};

/// Result of applying a key rule to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey<K, V> {
    /// Index the value itself under the key.
    Keyed(K),
    /// Index a replacement value under the key.
    Replaced(K, V),
    /// Leave the value out of the index.
    Excluded,
}

/// Derives the index key of a value.
pub type KeyRule<K, V> = Box<dyn Fn(&V) -> Result<IndexKey<K, V>, LibraryError> + Send + Sync>;

/// Configuration of a single index.
#[derive(Debug, Clone)]
pub struct IndexOptions<K, V> {
    /// A key that excludes the value when a rule yields it via [`IndexKey::Keyed`].
    pub exclusion: Option<K>,
    /// Returned for unknown keys; may not be stored.
    pub nil_value: Option<V>,
    pub discipline: Discipline,
}

impl<K, V> Default for IndexOptions<K, V> {
    fn default() -> Self {
        IndexOptions {
            exclusion: None,
            nil_value: None,
            discipline: Discipline::Group,
        }
    }
}

impl<K, V> IndexOptions<K, V> {
    pub fn excluding(mut self, key: K) -> Self {
        self.exclusion = Some(key);
        self
    }

    pub fn nil_value(mut self, value: V) -> Self {
        self.nil_value = Some(value);
        self
    }

    pub fn unique(mut self) -> Self {
        self.discipline = Discipline::Unique;
        self
    }
}

/// A named key → value-or-group mapping over library values.
///
/// Keys keep the order in which they were first stashed.
pub struct Index<K, V> {
    name: String,
    entries: IndexMap<K, Entry<V>>,
    options: IndexOptions<K, V>,
    rule: KeyRule<K, V>,
}

impl<K, V> Index<K, V>
where
    K: Hash + Eq + fmt::Debug,
    V: Clone + PartialEq,
{
    /// Creates an empty index.
    pub fn new(name: impl Into<String>, options: IndexOptions<K, V>, rule: KeyRule<K, V>) -> Self {
        Index {
            name: name.into(),
            entries: IndexMap::new(),
            options,
            rule,
        }
    }

    /// Runs every value through the key rule and stashes the results.
    ///
    /// Stops at the first failure; entries stashed before it remain.
    pub fn stash_all<'a, I>(&mut self, values: I) -> Result<&mut Self, LibraryError>
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        for value in values {
            let (key, payload) = match (self.rule)(value)? {
                IndexKey::Excluded => continue,
                IndexKey::Keyed(key) if self.options.exclusion.as_ref() == Some(&key) => continue,
                IndexKey::Keyed(key) => (key, value.clone()),
                IndexKey::Replaced(key, replacement) => (key, replacement),
            };

            log::trace!("index {}: stashing at {:?}", self.name, key);
            if let Err(source) = self.stash(key, payload).map(|_| ()) {
                return Err(LibraryError::Stash {
                    target: self.name.clone(),
                    source,
                });
            }
        }

        Ok(self)
    }
}

impl<K, V> Index<K, V>
where
    K: Hash + Eq,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a key, falling back to the nil value for unknown keys.
    pub fn get<Q>(&self, key: &Q) -> Option<Found<'_, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entry(key)
            .map(Entry::as_found)
            .or_else(|| self.options.nil_value.as_ref().map(Found::One))
    }

    /// Returns the stored entry, without nil-value fallback.
    pub fn entry<Q>(&self, key: &Q) -> Option<&Entry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// True only for keys that were actually stashed.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Entry<V>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the index; the rule and options are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn exclusion(&self) -> Option<&K> {
        self.options.exclusion.as_ref()
    }

    pub fn nil_value(&self) -> Option<&V> {
        self.options.nil_value.as_ref()
    }

    pub fn options(&self) -> &IndexOptions<K, V> {
        &self.options
    }
}

impl<K: Hash + Eq, V> Stash<K, V> for Index<K, V> {
    fn nil_value(&self) -> Option<&V> {
        self.options.nil_value.as_ref()
    }

    fn discipline(&self) -> Discipline {
        self.options.discipline
    }

    fn stashed_mut(&mut self, key: &K) -> Option<&mut Entry<V>> {
        self.entries.get_mut(key)
    }

    fn store(&mut self, key: K, entry: Entry<V>) {
        self.entries.insert(key, entry);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Index<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Index<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(&self.entries)
    }
}

/// Specification of an index, registered with
/// [`ConstantLibrary::register_index`](crate::ConstantLibrary::register_index).
pub struct IndexSpec<K, V> {
    name: String,
    options: IndexOptions<K, V>,
    rule: Option<KeyRule<K, V>>,
}

impl<K, V> IndexSpec<K, V> {
    pub fn new(name: impl Into<String>) -> Self {
        IndexSpec {
            name: name.into(),
            options: IndexOptions::default(),
            rule: None,
        }
    }

    pub fn options(mut self, options: IndexOptions<K, V>) -> Self {
        self.options = options;
        self
    }

    pub fn excluding(mut self, key: K) -> Self {
        self.options.exclusion = Some(key);
        self
    }

    pub fn nil_value(mut self, value: V) -> Self {
        self.options.nil_value = Some(value);
        self
    }

    pub fn unique(mut self) -> Self {
        self.options.discipline = Discipline::Unique;
        self
    }

    /// Sets an infallible key rule.
    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&V) -> IndexKey<K, V> + Send + Sync + 'static,
        K: 'static,
        V: 'static,
    {
        let rule: KeyRule<K, V> = Box::new(move |value: &V| Ok(rule(value)));
        self.rule = Some(rule);
        self
    }

    /// Sets a key rule that may fail, e.g. on a missing attribute.
    pub fn try_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&V) -> Result<IndexKey<K, V>, LibraryError> + Send + Sync + 'static,
    {
        let rule: KeyRule<K, V> = Box::new(rule);
        self.rule = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(self) -> Result<Index<K, V>, LibraryError>
    where
        K: Hash + Eq + fmt::Debug,
        V: Clone + PartialEq,
    {
        let rule = self
            .rule
            .ok_or_else(|| LibraryError::MissingRule { name: self.name.clone() })?;
        Ok(Index::new(self.name, self.options, rule))
    }
}
