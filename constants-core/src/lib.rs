//! Indexed libraries of predefined, immutable values.
//!
//! Core concepts:
//! - **Stash**: store-or-group writes; the first value at a key is kept as is,
//!   later values at the same key turn the entry into an ordered group
//! - **Index**: key → value-or-group mapping derived from the values by a key rule
//! - **Collection**: sparse, integer-slotted sequence derived by a slot rule
//! - **ConstantLibrary**: the deduplicated values plus their named indexes and
//!   collections, kept in step as values are added
//!
//! # Example
//!
//! ```
//! use constants_core::{ConstantLibrary, Found, IndexKey, Slot};
//!
//! let mut lib: ConstantLibrary<&str, usize> = ConstantLibrary::from_values(["red", "blue", "grey"]);
//! lib.register_index_with("length", |v| IndexKey::Keyed(v.len())).unwrap();
//! lib.register_collection_with("ordered", |v| Slot::Append(*v)).unwrap();
//!
//! assert_eq!(lib.find(&3), Some(Found::One(&"red")));
//! assert_eq!(lib.find(&4), Some(Found::Group(&["blue", "grey"][..])));
//!
//! lib.add(["green"]).unwrap();
//! assert_eq!(lib.find(&5), Some(Found::One(&"green")));
//! assert_eq!(lib.collection("ordered").unwrap().len(), 4);
//! ```

mod collection;
mod declare;
mod index;
mod library;
mod stash;
mod token;

pub use collection::{Collection, CollectionOptions, CollectionSpec, Slot, SlotRule};
pub use declare::{ConstantTable, Declarations};
pub use index::{Index, IndexKey, IndexOptions, IndexSpec, KeyRule};
pub use library::{ConstantLibrary, LibraryError};
pub use stash::{Discipline, Entry, Found, MAX_SLOT, Stash, StashError};
pub use token::{Attributes, ToToken, Token};

#[cfg(feature = "derive")]
pub use constants_derive::Attributes;
