use serde::Serialize;
use std::sync::LazyLock;

use constants_core::{Attributes, ConstantLibrary, ConstantTable, IndexOptions, Token};

use crate::error::ParseError;
use crate::measurement::Measurement;

/// A chemical element with its stable isotopes.
///
/// `isotopes`, `masses` and `abundances` are parallel: entry `i` of each
/// describes the same isotope. Masses are in unified atomic mass units and
/// abundances in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Attributes)]
pub struct Element {
    pub symbol: &'static str,
    pub name: &'static str,
    pub atomic_number: u32,
    pub isotopes: Vec<u32>,
    #[attributes(skip)]
    pub masses: Vec<Measurement>,
    #[attributes(skip)]
    pub abundances: Vec<Measurement>,
}

impl Element {
    pub fn new(symbol: &'static str, name: &'static str, atomic_number: u32) -> Self {
        Element {
            symbol,
            name,
            atomic_number,
            isotopes: Vec::new(),
            masses: Vec::new(),
            abundances: Vec::new(),
        }
    }

    pub fn with_isotope(mut self, mass_number: u32, mass: Measurement, abundance: Measurement) -> Self {
        self.isotopes.push(mass_number);
        self.masses.push(mass);
        self.abundances.push(abundance);
        self
    }

    /// Builds an element from NIST isotope notation,
    /// `<mass number>:<mass>:<abundance>` entries joined by `;`.
    ///
    /// ```
    /// use constants_library::Element;
    ///
    /// let c = Element::parse("C", "Carbon", 6, "12:12.0000000(0):98.93(8);13:13.0033548378(10):1.07(8)").unwrap();
    /// assert_eq!(c.isotopes, vec![12, 13]);
    /// assert_eq!(c.mass(Some(13)), Some(13.0033548378));
    /// ```
    pub fn parse(
        symbol: &'static str,
        name: &'static str,
        atomic_number: u32,
        isotopes: &str,
    ) -> Result<Self, ParseError> {
        let mut element = Element::new(symbol, name, atomic_number);

        for entry in isotopes.split(';').map(str::trim).filter(|entry| !entry.is_empty()) {
            let invalid = || ParseError::Measurement {
                input: entry.to_owned(),
            };
            let mut fields = entry.split(':');
            let (Some(number), Some(mass), Some(abundance)) = (fields.next(), fields.next(), fields.next()) else {
                return Err(invalid());
            };

            let number = number.trim().parse().map_err(|_| invalid())?;
            let mass = Measurement::parse(mass)?;
            let abundance = Measurement::parse(abundance)?;
            element = element.with_isotope(
                number,
                Measurement::new(mass.value, mass.uncertainty, "u"),
                Measurement::new(abundance.value, abundance.uncertainty, "%"),
            );
        }

        Ok(element)
    }

    pub fn has_isotope(&self, mass_number: u32) -> bool {
        self.isotopes.contains(&mass_number)
    }

    pub fn index_isotope(&self, mass_number: u32) -> Option<usize> {
        self.isotopes.iter().position(|&isotope| isotope == mass_number)
    }

    /// Position of the most abundant isotope; the first wins a tie.
    pub fn index_max_abundance(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, abundance) in self.abundances.iter().enumerate() {
            if best.is_none_or(|(_, max)| abundance.value > max) {
                best = Some((i, abundance.value));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Mass of the given isotope, or of the most abundant one.
    pub fn mass(&self, isotope: Option<u32>) -> Option<f64> {
        self.isotope_slot(isotope)
            .and_then(|i| self.masses.get(i))
            .map(|m| m.value)
    }

    /// Abundance in percent of the given isotope, or of the most abundant one.
    pub fn abundance(&self, isotope: Option<u32>) -> Option<f64> {
        self.isotope_slot(isotope)
            .and_then(|i| self.abundances.get(i))
            .map(|a| a.value)
    }

    fn isotope_slot(&self, isotope: Option<u32>) -> Option<usize> {
        match isotope {
            Some(mass_number) => self.index_isotope(mass_number),
            None => self.index_max_abundance(),
        }
    }

    pub fn declared() -> Vec<(&'static str, Element)> {
        let isotope = |element: Element, number, mass: f64, mass_uncertainty: f64, abundance: f64, abundance_uncertainty: f64| {
            element.with_isotope(
                number,
                Measurement::new(mass, Some(mass_uncertainty), "u"),
                Measurement::new(abundance, Some(abundance_uncertainty), "%"),
            )
        };

        let hydrogen = Element::new("H", "Hydrogen", 1);
        let hydrogen = isotope(hydrogen, 1, 1.00782503207, 10e-11, 99.9885, 70e-4);
        let hydrogen = isotope(hydrogen, 2, 2.0141017778, 4e-10, 0.0115, 70e-4);

        let helium = Element::new("He", "Helium", 2);
        let helium = isotope(helium, 3, 3.0160293191, 26e-10, 0.000134, 3e-6);
        let helium = isotope(helium, 4, 4.00260325415, 6e-11, 99.999866, 3e-6);

        let carbon = Element::new("C", "Carbon", 6);
        let carbon = isotope(carbon, 12, 12.0, 0.0, 98.93, 8e-2);
        let carbon = isotope(carbon, 13, 13.0033548378, 10e-10, 1.07, 8e-2);

        let nitrogen = Element::new("N", "Nitrogen", 7);
        let nitrogen = isotope(nitrogen, 14, 14.0030740048, 6e-10, 99.636, 20e-3);
        let nitrogen = isotope(nitrogen, 15, 15.0001088982, 7e-10, 0.364, 20e-3);

        let oxygen = Element::new("O", "Oxygen", 8);
        let oxygen = isotope(oxygen, 16, 15.99491461956, 16e-11, 99.757, 16e-3);
        let oxygen = isotope(oxygen, 17, 16.99913170, 12e-8, 0.038, 1e-3);
        let oxygen = isotope(oxygen, 18, 17.9991610, 7e-7, 0.205, 14e-3);

        vec![
            ("H", hydrogen),
            ("He", helium),
            ("C", carbon),
            ("N", nitrogen),
            ("O", oxygen),
        ]
    }
}

static LIBRARY: LazyLock<ConstantLibrary<Element>> = LazyLock::new(|| {
    let mut library = ConstantLibrary::new();
    for attribute in ["symbol", "name", "atomic_number"] {
        crate::built(
            "element",
            library.register_index_by_attribute(attribute, IndexOptions::default().unique()),
        );
    }
    crate::built("element", library.register_collection_by_attribute("atomic_number"));
    crate::built("element", library.add_declared(&Element::declared()));
    library
});

impl ConstantTable for Element {
    fn library() -> &'static ConstantLibrary<Self, Token> {
        &LIBRARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> &'static Element {
        Element::get("C").unwrap()
    }

    #[test]
    fn carbon_isotopes() {
        let c = carbon();

        assert_eq!(c.symbol, "C");
        assert_eq!(c.name, "Carbon");
        assert_eq!(c.atomic_number, 6);
        assert_eq!(c.isotopes, vec![12, 13]);
        assert_eq!(
            c.masses.iter().map(Measurement::to_pair).collect::<Vec<_>>(),
            vec![(12.0, Some(0.0)), (13.0033548378, Some(10e-10))]
        );
        assert_eq!(
            c.abundances.iter().map(Measurement::to_pair).collect::<Vec<_>>(),
            vec![(98.93, Some(0.08)), (1.07, Some(0.08))]
        );
        assert_eq!(c.index_max_abundance(), Some(0));
    }

    #[test]
    fn lookup_by_symbol_name_and_number() {
        let c = carbon();

        assert_eq!(Element::get("Carbon"), Some(c));
        assert_eq!(Element::get(6), Some(c));
        assert_eq!(Element::get("Q"), None);
        assert_eq!(Element::get("madeupium"), None);
        assert_eq!(Element::get(102), None);
    }

    #[test]
    fn collected_by_atomic_number() {
        let numbers = Element::collection("atomic_number").unwrap();

        assert_eq!(numbers.len(), 9);
        assert_eq!(numbers.get(6).and_then(|found| found.one()), Some(carbon()));
        assert_eq!(numbers.get(3), None);
        assert_eq!(numbers.values().map(|e| e.symbol).collect::<Vec<_>>(), vec!["H", "He", "C", "N", "O"]);
    }

    #[test]
    fn isotopes() {
        let c = carbon();

        assert!(c.has_isotope(12));
        assert!(c.has_isotope(13));
        assert!(!c.has_isotope(8));

        assert_eq!(c.index_isotope(12), Some(0));
        assert_eq!(c.index_isotope(13), Some(1));
        assert_eq!(c.index_isotope(8), None);
    }

    #[test]
    fn mass_and_abundance() {
        let c = carbon();

        assert_eq!(c.mass(None), Some(12.0));
        assert_eq!(c.mass(Some(12)), Some(12.0));
        assert_eq!(c.mass(Some(13)), Some(13.0033548378));
        assert_eq!(c.mass(Some(8)), None);

        assert_eq!(c.abundance(None), Some(98.93));
        assert_eq!(c.abundance(Some(13)), Some(1.07));
        assert_eq!(c.abundance(Some(8)), None);
    }

    #[test]
    fn most_abundant_isotope_need_not_be_first() {
        let he = Element::get("He").unwrap();
        assert_eq!(he.index_max_abundance(), Some(1));
        assert_eq!(he.mass(None), Some(4.00260325415));
    }

    #[test]
    fn isotopes_without_measurements_have_no_mass() {
        let mut element = Element::new("X", "Unknownium", 0).with_isotope(
            1,
            Measurement::exact(1.0, "u"),
            Measurement::exact(100.0, "%"),
        );
        element.isotopes.push(2);

        assert!(element.has_isotope(2));
        assert_eq!(element.mass(Some(2)), None);
        assert_eq!(element.abundance(Some(2)), None);
        assert_eq!(element.mass(None), Some(1.0));

        element.abundances.clear();
        assert_eq!(element.index_max_abundance(), None);
        assert_eq!(element.mass(Some(1)), Some(1.0));
        assert_eq!(element.abundance(Some(1)), None);
    }

    // Proteome Commons atom reference (NIST derived): symbol+isotope, mass, abundance fraction.
    #[test]
    fn masses_agree_with_proteome_commons() {
        let reference = [
            ("H", None, 1.0078250321, 0.999885),
            ("H", Some(2), 2.014101778, 1.15e-4),
            ("O", None, 15.9949146221, 0.99757),
            ("O", Some(17), 16.9991315, 3.8e-4),
            ("O", Some(18), 17.9991604, 0.00205),
            ("N", Some(14), 14.0030740052, 0.99632),
            ("N", Some(15), 15.0001088984, 0.00368),
            ("C", Some(12), 12.0, 0.9893),
            ("C", Some(13), 13.0033548378, 0.0107),
        ];

        for (symbol, isotope, mass, abundance) in reference {
            let element = Element::get(symbol).unwrap();
            let actual_mass = element.mass(isotope).unwrap();
            let actual_abundance = element.abundance(isotope).unwrap();

            assert!((actual_mass - mass).abs() < 1e-6, "{symbol} {isotope:?}: {actual_mass}");
            assert!(
                (actual_abundance - abundance * 100.0).abs() < 0.01,
                "{symbol} {isotope:?}: {actual_abundance}"
            );
        }
    }

    #[test]
    fn parse_rejects_incomplete_isotopes() {
        let err = Element::parse("X", "Unknown", 0, "1:1.0").unwrap_err();
        assert_eq!(err, ParseError::Measurement { input: "1:1.0".into() });
    }

    #[test]
    fn parse_matches_declared_carbon() {
        let parsed = Element::parse("C", "Carbon", 6, "12:12.0(0):98.93(8); 13:13.0033548378(10):1.07(8)").unwrap();
        assert_eq!(&parsed, carbon());
    }

    #[test]
    fn isotopes_attribute_is_a_sequence() {
        assert_eq!(
            carbon().attribute("isotopes"),
            Some(Token::Seq(vec![Token::Int(12), Token::Int(13)]))
        );
        assert_eq!(carbon().attribute("masses"), None);
    }
}
