//! Predefined physical data built on `constants-core` libraries.
//!
//! - [`Particle`]: standard-model particles, indexed by name and collected by family
//! - [`PhysicalConstant`]: CODATA recommended values, indexed by name
//! - [`Element`]: light elements with isotope masses and abundances, indexed by
//!   symbol, name and atomic number
//!
//! Each table is a [`ConstantTable`](constants_core::ConstantTable) built once
//! on first use.
//!
//! ```
//! use constants_core::ConstantTable;
//! use constants_library::{Element, Particle};
//!
//! assert_eq!(Element::get("Carbon").unwrap().atomic_number, 6);
//! assert_eq!(Particle::get("Anti-Muon").unwrap().charge, 1.0);
//! ```

mod element;
mod error;
mod measurement;
pub mod nist;
mod particle;
mod physical;

pub use element::Element;
pub use error::ParseError;
pub use measurement::Measurement;
pub use particle::{Family, Particle};
pub use physical::PhysicalConstant;

use constants_core::LibraryError;

/// Unwraps a step of a static table build. The declared data is fixed, so a
/// failure here is a bug in the table itself.
fn built<T>(table: &str, result: Result<T, LibraryError>) -> T {
    result.unwrap_or_else(|err| panic!("building {table} table: {err}"))
}
