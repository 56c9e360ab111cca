use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use crate::collection::{Collection, CollectionSpec, Slot};
use crate::declare::Declarations;
use crate::index::{Index, IndexKey, IndexOptions, IndexSpec};
use crate::stash::{Entry, Found, StashError};
use crate::token::{Attributes, Token};

/// Error type for library operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LibraryError {
    #[error("no rule given for {name}")]
    MissingRule { name: String },
    #[error("cannot stash into {target}: {source}")]
    Stash {
        target: String,
        #[source]
        source: StashError,
    },
    #[error("value has no attribute `{attribute}`")]
    MissingAttribute { attribute: String },
    #[error("attribute `{attribute}` is not a collection slot: {value}")]
    NotASlot { attribute: String, value: Token },
}

/// An ordered, deduplicated set of values with named indexes and collections.
///
/// Indexes and collections are kept in step with the values: registering one
/// builds it from the current values, and [`add`](Self::add) feeds only the
/// newly added values through every registered rule.
///
/// ```
/// use constants_core::{ConstantLibrary, Found, IndexKey};
///
/// let mut lib = ConstantLibrary::<String, String>::from_values(["one".to_string(), "two".to_string()]);
/// lib.register_index_with("upcase", |v: &String| IndexKey::Keyed(v.to_uppercase())).unwrap();
///
/// assert_eq!(lib.lookup("ONE"), Some(Found::One(&"one".to_string())));
/// assert_eq!(lib.lookup("two"), Some(Found::One(&"two".to_string())));
/// assert_eq!(lib.lookup("three"), None);
/// ```
pub struct ConstantLibrary<V, K = Token> {
    values: Vec<V>,
    indexes: IndexMap<String, Index<K, V>>,
    collections: IndexMap<String, Collection<V>>,
}

impl<V, K> ConstantLibrary<V, K> {
    /// Creates an empty library.
    pub fn new() -> Self {
        ConstantLibrary {
            values: Vec::new(),
            indexes: IndexMap::new(),
            collections: IndexMap::new(),
        }
    }

    /// The values, in insertion order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index(&self, name: &str) -> Option<&Index<K, V>> {
        self.indexes.get(name)
    }

    /// Indexes in registration order.
    pub fn indexes(&self) -> &IndexMap<String, Index<K, V>> {
        &self.indexes
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection<V>> {
        self.collections.get(name)
    }

    /// Collections in registration order.
    pub fn collections(&self) -> &IndexMap<String, Collection<V>> {
        &self.collections
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

impl<V, K> ConstantLibrary<V, K>
where
    V: Clone + PartialEq + fmt::Debug,
    K: Hash + Eq + fmt::Debug,
{
    /// Creates a library from initial values, keeping the first of any duplicates.
    pub fn from_values(values: impl IntoIterator<Item = V>) -> Self {
        let mut library = Self::new();
        for value in values {
            if !library.values.contains(&value) {
                library.values.push(value);
            }
        }
        library
    }

    pub fn contains(&self, value: &V) -> bool {
        self.values.contains(value)
    }

    /// Registers an index and builds it from the current values.
    ///
    /// An existing index of the same name is replaced in place, keeping its
    /// position in the lookup order. If the build fails the index stays
    /// registered with the entries stashed before the failure.
    pub fn register_index(&mut self, spec: IndexSpec<K, V>) -> Result<&Index<K, V>, LibraryError> {
        let index = spec.build()?;
        log::debug!("registering index {}", index.name());

        let (position, _) = self.indexes.insert_full(index.name().to_owned(), index);
        let index = &mut self.indexes[position];
        if let Err(err) = index.stash_all(&self.values).map(|_| ()) {
            log::warn!("building index {} failed: {}", index.name(), err);
            return Err(err);
        }

        Ok(&self.indexes[position])
    }

    /// Registers an index with an infallible key rule.
    pub fn register_index_with<F>(&mut self, name: &str, rule: F) -> Result<&Index<K, V>, LibraryError>
    where
        F: Fn(&V) -> IndexKey<K, V> + Send + Sync + 'static,
        K: 'static,
        V: 'static,
    {
        self.register_index(IndexSpec::new(name).rule(rule))
    }

    /// Registers an index keyed by a typed accessor.
    pub fn register_index_by<F>(&mut self, name: &str, accessor: F) -> Result<&Index<K, V>, LibraryError>
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
        K: 'static,
        V: 'static,
    {
        self.register_index(IndexSpec::new(name).rule(move |value: &V| IndexKey::Keyed(accessor(value))))
    }

    /// Registers a collection and builds it from the current values.
    pub fn register_collection(&mut self, spec: CollectionSpec<V>) -> Result<&Collection<V>, LibraryError> {
        let collection = spec.build()?;
        log::debug!("registering collection {}", collection.name());

        let (position, _) = self
            .collections
            .insert_full(collection.name().to_owned(), collection);
        let collection = &mut self.collections[position];
        if let Err(err) = collection.stash_all(&self.values).map(|_| ()) {
            log::warn!("building collection {} failed: {}", collection.name(), err);
            return Err(err);
        }

        Ok(&self.collections[position])
    }

    /// Registers a collection with an infallible slot rule.
    pub fn register_collection_with<F>(&mut self, name: &str, rule: F) -> Result<&Collection<V>, LibraryError>
    where
        F: Fn(&V) -> Slot<V> + Send + Sync + 'static,
        V: 'static,
    {
        self.register_collection(CollectionSpec::new(name).rule(rule))
    }

    /// Registers a collection slotted by a typed accessor; `None` excludes the value.
    pub fn register_collection_by<F>(&mut self, name: &str, accessor: F) -> Result<&Collection<V>, LibraryError>
    where
        F: Fn(&V) -> Option<usize> + Send + Sync + 'static,
        V: 'static,
    {
        self.register_collection(CollectionSpec::new(name).rule(move |value: &V| match accessor(value) {
            Some(slot) => Slot::At(value.clone(), slot),
            None => Slot::Excluded,
        }))
    }

    /// Searches every index in registration order for `key`.
    ///
    /// Only keys that were actually stashed match; nil values of individual
    /// indexes are not consulted.
    pub fn find<Q>(&self, key: &Q) -> Option<Found<'_, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.indexes
            .values()
            .find_map(|index| index.entry(key))
            .map(Entry::as_found)
    }

    /// Like [`find`](Self::find), then falls back to a value equal to `key`.
    pub fn lookup<Q>(&self, key: &Q) -> Option<Found<'_, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq<Q>,
    {
        self.find(key)
            .or_else(|| self.values.iter().find(|value| *value == key).map(Found::One))
    }

    /// Removes every value and empties every index and collection.
    ///
    /// With `complete` the index and collection registrations are dropped as
    /// well; otherwise a later [`add`](Self::add) repopulates them.
    pub fn clear(&mut self, complete: bool) {
        log::debug!("clearing library (complete: {complete})");
        self.values.clear();

        if complete {
            self.indexes.clear();
            self.collections.clear();
        } else {
            self.indexes.values_mut().for_each(Index::clear);
            self.collections.values_mut().for_each(Collection::clear);
        }
    }

    /// Adds values not already present and feeds them to every index and
    /// collection. Returns the values actually added.
    ///
    /// Every index and collection is updated even if one of them fails; the
    /// first failure is returned.
    pub fn add(&mut self, values: impl IntoIterator<Item = V>) -> Result<Vec<V>, LibraryError> {
        let start = self.values.len();
        for value in values {
            if !self.values.contains(&value) {
                self.values.push(value);
            }
        }

        let added = &self.values[start..];
        log::debug!("adding {} values", added.len());

        let mut first_err = None;
        for index in self.indexes.values_mut() {
            if let Err(err) = index.stash_all(added).map(|_| ()) {
                log::warn!("updating index {} failed: {}", index.name(), err);
                first_err.get_or_insert(err);
            }
        }
        for collection in self.collections.values_mut() {
            if let Err(err) = collection.stash_all(added).map(|_| ()) {
                log::warn!("updating collection {} failed: {}", collection.name(), err);
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(added.to_vec()),
        }
    }

    /// Adds every declared value accepted by the source's own kind filter.
    pub fn add_declared<D>(&mut self, source: &D) -> Result<Vec<V>, LibraryError>
    where
        D: Declarations<V> + ?Sized,
    {
        self.add_declared_if(source, |value| source.is_kind(value))
    }

    /// Adds every declared value accepted by `predicate`.
    pub fn add_declared_if<D, P>(&mut self, source: &D, predicate: P) -> Result<Vec<V>, LibraryError>
    where
        D: Declarations<V> + ?Sized,
        P: Fn(&V) -> bool,
    {
        let declared: Vec<V> = source
            .names()
            .filter_map(|name| source.resolve(name))
            .filter(|value| predicate(value))
            .collect();
        self.add(declared)
    }

    /// Rebuilds the library from a declaration source, keeping registrations.
    pub fn reset<D>(&mut self, source: &D) -> Result<Vec<V>, LibraryError>
    where
        D: Declarations<V> + ?Sized,
    {
        self.clear(false);
        self.add_declared(source)
    }
}

impl<V, K> ConstantLibrary<V, K>
where
    V: Attributes + Clone + PartialEq + fmt::Debug + 'static,
    K: From<Token> + Hash + Eq + fmt::Debug + 'static,
{
    /// Registers an index keyed by the named attribute of each value.
    ///
    /// Values whose attribute is [`Token::Null`] are left out. A value lacking
    /// the attribute fails the build with [`LibraryError::MissingAttribute`].
    pub fn register_index_by_attribute(
        &mut self,
        attribute: &str,
        options: IndexOptions<K, V>,
    ) -> Result<&Index<K, V>, LibraryError> {
        let name = attribute.to_owned();
        let spec = IndexSpec::new(attribute)
            .options(options)
            .try_rule(move |value: &V| match read_attribute(value, &name)? {
                Token::Null => Ok(IndexKey::Excluded),
                token => Ok(IndexKey::Keyed(K::from(token))),
            });
        self.register_index(spec)
    }
}

impl<V, K> ConstantLibrary<V, K>
where
    V: Attributes + Clone + PartialEq + fmt::Debug + 'static,
    K: Hash + Eq + fmt::Debug + 'static,
{
    /// Registers a collection slotted by the named attribute of each value.
    ///
    /// The attribute must be a non-negative integer; [`Token::Null`] leaves
    /// the value out.
    pub fn register_collection_by_attribute(&mut self, attribute: &str) -> Result<&Collection<V>, LibraryError> {
        let name = attribute.to_owned();
        let spec = CollectionSpec::new(attribute).try_rule(move |value: &V| {
            match read_attribute(value, &name)? {
                Token::Null => Ok(Slot::Excluded),
                token => match token.as_slot() {
                    Some(slot) => Ok(Slot::At(value.clone(), slot)),
                    None => Err(LibraryError::NotASlot {
                        attribute: name.clone(),
                        value: token,
                    }),
                },
            }
        });
        self.register_collection(spec)
    }
}

fn read_attribute<V: Attributes>(value: &V, attribute: &str) -> Result<Token, LibraryError> {
    value
        .attribute(attribute)
        .ok_or_else(|| LibraryError::MissingAttribute {
            attribute: attribute.to_owned(),
        })
}

impl<V, K> Default for ConstantLibrary<V, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, K: fmt::Debug> fmt::Debug for ConstantLibrary<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantLibrary")
            .field("values", &self.values)
            .field("indexes", &self.indexes)
            .field("collections", &self.collections)
            .finish()
    }
}
