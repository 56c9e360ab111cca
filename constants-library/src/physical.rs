use serde::Serialize;
use std::sync::LazyLock;

use constants_core::{Attributes, ConstantLibrary, ConstantTable, IndexOptions, Token};

use crate::measurement::Measurement;

/// A named physical constant.
#[derive(Debug, Clone, PartialEq, Serialize, Attributes)]
pub struct PhysicalConstant {
    pub name: String,
    #[attributes(rename = "value")]
    pub measurement: Measurement,
}

impl PhysicalConstant {
    pub fn new(name: impl Into<String>, measurement: Measurement) -> Self {
        PhysicalConstant {
            name: name.into(),
            measurement,
        }
    }

    pub fn value(&self) -> f64 {
        self.measurement.value
    }

    pub fn uncertainty(&self) -> Option<f64> {
        self.measurement.uncertainty
    }

    pub fn unit(&self) -> Option<&str> {
        self.measurement.unit.as_deref()
    }

    /// CODATA 2006 recommended values.
    pub fn declared() -> Vec<(&'static str, PhysicalConstant)> {
        let constant = |name: &str, value: f64, uncertainty: f64, unit: &str| {
            PhysicalConstant::new(name, Measurement::new(value, Some(uncertainty), unit))
        };

        vec![
            (
                "ELEMENTARY_CHARGE",
                constant("elementary charge", 1.602176487e-19, 0.000000040e-19, "C"),
            ),
            (
                "PLANCK",
                constant("Planck constant", 6.62606896e-34, 0.00000033e-34, "J s"),
            ),
            (
                "RYDBERG",
                constant("Rydberg constant", 10973731.568527, 0.000073, "m^-1"),
            ),
            (
                "SPEED_OF_LIGHT_IN_VACUUM",
                constant("speed of light in vacuum", 299792458.0, 0.0, "m s^-1"),
            ),
            (
                "AVOGADRO",
                constant("Avogadro constant", 6.02214179e23, 0.00000030e23, "mol^-1"),
            ),
            (
                "BOLTZMANN",
                constant("Boltzmann constant", 1.3806504e-23, 0.0000024e-23, "J K^-1"),
            ),
            (
                "ELECTRON_MASS",
                constant("electron mass", 9.10938215e-31, 0.00000045e-31, "kg"),
            ),
            (
                "NEWTONIAN_CONSTANT_OF_GRAVITATION",
                constant(
                    "Newtonian constant of gravitation",
                    6.67428e-11,
                    0.00067e-11,
                    "m^3 kg^-1 s^-2",
                ),
            ),
            (
                "FINE_STRUCTURE",
                constant("fine-structure constant", 7.2973525376e-3, 0.0000000050e-3, ""),
            ),
        ]
    }
}

static LIBRARY: LazyLock<ConstantLibrary<PhysicalConstant>> = LazyLock::new(|| {
    let mut library = ConstantLibrary::new();
    crate::built(
        "physical constant",
        library.register_index_by_attribute("name", IndexOptions::default()),
    );
    crate::built("physical constant", library.add_declared(&PhysicalConstant::declared()));
    library
});

impl ConstantTable for PhysicalConstant {
    fn library() -> &'static ConstantLibrary<Self, Token> {
        &LIBRARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_of_light() {
        let c = PhysicalConstant::get("speed of light in vacuum").unwrap();

        assert_eq!(c.name, "speed of light in vacuum");
        assert_eq!(c.value(), 299792458.0);
        assert_eq!(c.uncertainty(), Some(0.0));
        assert_eq!(c.unit(), Some("m s^-1"));
    }

    #[test]
    fn lookup_is_none_for_undefined_constants() {
        assert!(PhysicalConstant::lookup("made up blah in a blah").is_none());
    }

    #[test]
    fn every_declared_constant_is_indexed_by_name() {
        let index = PhysicalConstant::index("name").unwrap();
        assert_eq!(index.len(), PhysicalConstant::declared().len());
        assert_eq!(PhysicalConstant::all().len(), index.len());
    }

    #[test]
    fn attributes_expose_value() {
        let e = PhysicalConstant::get("elementary charge").unwrap();
        assert_eq!(e.attribute("value"), Some(Token::Float(1.602176487e-19)));
        assert_eq!(e.attribute("measurement"), None);
    }

    #[test]
    fn dimensionless_constants_have_no_unit() {
        assert_eq!(PhysicalConstant::get("fine-structure constant").unwrap().unit(), None);
    }
}
