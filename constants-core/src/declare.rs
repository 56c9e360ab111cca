use std::fmt;

use crate::collection::Collection;
use crate::index::Index;
use crate::library::ConstantLibrary;
use crate::stash::Found;
use crate::token::Token;

/// A source of named, declared values.
///
/// Domain modules list their predefined values explicitly, typically as a
/// slice of `(name, value)` pairs, and feed them to
/// [`ConstantLibrary::add_declared`].
pub trait Declarations<V> {
    /// The declared names, in declaration order.
    fn names(&self) -> impl Iterator<Item = &str>;

    /// Resolves a declared name to its value.
    fn resolve(&self, name: &str) -> Option<V>;

    /// Default filter for [`ConstantLibrary::add_declared`].
    fn is_kind(&self, _value: &V) -> bool {
        true
    }
}

impl<V: Clone> Declarations<V> for [(&'static str, V)] {
    fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| *name)
    }

    fn resolve(&self, name: &str) -> Option<V> {
        self.iter()
            .find(|(declared, _)| *declared == name)
            .map(|(_, value)| value.clone())
    }
}

impl<V: Clone, const N: usize> Declarations<V> for [(&'static str, V); N] {
    fn names(&self) -> impl Iterator<Item = &str> {
        self.as_slice().names()
    }

    fn resolve(&self, name: &str) -> Option<V> {
        self.as_slice().resolve(name)
    }
}

impl<V: Clone> Declarations<V> for Vec<(&'static str, V)> {
    fn names(&self) -> impl Iterator<Item = &str> {
        self.as_slice().names()
    }

    fn resolve(&self, name: &str) -> Option<V> {
        self.as_slice().resolve(name)
    }
}

/// A value type that owns a process-wide library of its predefined values.
///
/// Implementors keep the library in a `LazyLock` built once on first use and
/// never replaced; the provided methods are read-only views onto it.
pub trait ConstantTable: Clone + PartialEq + fmt::Debug + Sized + 'static {
    fn library() -> &'static ConstantLibrary<Self, Token>;

    /// Searches the table's indexes in registration order.
    fn lookup(key: impl Into<Token>) -> Option<Found<'static, Self>> {
        Self::library().find(&key.into())
    }

    /// Like [`lookup`](Self::lookup), for keys that resolve to one value.
    fn get(key: impl Into<Token>) -> Option<&'static Self> {
        Self::lookup(key).and_then(|found| found.one())
    }

    fn index(name: &str) -> Option<&'static Index<Token, Self>> {
        Self::library().index(name)
    }

    fn collection(name: &str) -> Option<&'static Collection<Self>> {
        Self::library().collection(name)
    }

    fn all() -> &'static [Self] {
        Self::library().values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECLARED: [(&str, &str); 3] = [("RED", "red"), ("GREEN", "green"), ("BLUE", "blue")];

    #[test]
    fn slice_declarations_resolve_by_name() {
        let source: &[(&str, &str)] = &DECLARED;
        assert_eq!(source.names().collect::<Vec<_>>(), vec!["RED", "GREEN", "BLUE"]);
        assert_eq!(source.resolve("GREEN"), Some("green"));
        assert_eq!(source.resolve("GREY"), None);
    }

    struct Shades;

    impl Declarations<String> for Shades {
        fn names(&self) -> impl Iterator<Item = &str> {
            ["LIGHT", "DARK", "COUNT"].into_iter()
        }

        fn resolve(&self, name: &str) -> Option<String> {
            match name {
                "LIGHT" => Some("light".into()),
                "DARK" => Some("dark".into()),
                "COUNT" => Some("2".into()),
                _ => None,
            }
        }

        fn is_kind(&self, value: &String) -> bool {
            value.chars().all(char::is_alphabetic)
        }
    }

    #[test]
    fn add_declared_applies_kind_filter() {
        let mut lib: ConstantLibrary<String, String> = ConstantLibrary::new();
        let added = lib.add_declared(&Shades).unwrap();
        assert_eq!(added, vec!["light".to_string(), "dark".to_string()]);
    }

    #[test]
    fn add_declared_if_overrides_kind_filter() {
        let mut lib: ConstantLibrary<String, String> = ConstantLibrary::new();
        let added = lib.add_declared_if(&Shades, |v| v.len() == 1).unwrap();
        assert_eq!(added, vec!["2".to_string()]);
    }

    #[test]
    fn reset_rebuilds_from_declarations() {
        let mut lib: ConstantLibrary<&str, usize> = ConstantLibrary::from_values(["yellow"]);
        lib.register_index_by("length", |v: &&'static str| v.len()).unwrap();

        lib.reset(&DECLARED).unwrap();

        assert_eq!(lib.values(), &["red", "green", "blue"]);
        assert!(!lib.index("length").unwrap().contains_key(&6));
        assert_eq!(lib.find(&5), Some(Found::One(&"green")));
    }
}
