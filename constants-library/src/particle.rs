use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use constants_core::{Attributes, ConstantLibrary, ConstantTable, IndexOptions, ToToken, Token};

use crate::measurement::Measurement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    Fermion,
    Boson,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Fermion => "Fermion",
            Family::Boson => "Boson",
        }
    }

    /// Slot in the `family` collection.
    pub fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToToken for Family {
    fn to_token(&self) -> Token {
        Token::from(self.as_str())
    }
}

/// A fundamental particle of the standard model.
#[derive(Debug, Clone, PartialEq, Serialize, Attributes)]
pub struct Particle {
    pub name: &'static str,
    pub family: Option<Family>,
    pub group: Option<&'static str>,
    pub generation: Option<u8>,
    pub mass: Measurement,
    pub charge: f64,
    pub spin: f64,
}

impl Particle {
    pub fn new(
        name: &'static str,
        family: Option<Family>,
        group: Option<&'static str>,
        generation: Option<u8>,
        mass: Measurement,
        charge: f64,
        spin: f64,
    ) -> Self {
        Particle {
            name,
            family,
            group,
            generation,
            mass,
            charge,
            spin,
        }
    }

    /// A copy of this particle under another name; antiparticles carry the
    /// opposite charge.
    pub fn as_named(&self, name: &'static str, antiparticle: bool) -> Self {
        Particle {
            name,
            charge: if antiparticle { -self.charge } else { self.charge },
            ..self.clone()
        }
    }

    pub fn mass_uncertainty(&self) -> Option<f64> {
        self.mass.uncertainty
    }

    pub fn declared() -> Vec<(&'static str, Particle)> {
        use Family::{Boson, Fermion};

        let quark = |name, generation, mass: f64, unit: &str, charge| {
            Particle::new(
                name,
                Some(Fermion),
                Some("Quark"),
                Some(generation),
                Measurement::estimate(mass, unit),
                charge,
                0.5,
            )
        };
        let lepton = |name, generation, mass: Measurement, charge| {
            Particle::new(name, Some(Fermion), Some("Lepton"), generation, mass, charge, 0.5)
        };
        let gauge = |name, mass: f64, charge, spin| {
            let mass = if mass == 0.0 {
                Measurement::exact(0.0, "")
            } else {
                Measurement::estimate(mass, "GeV/c^2")
            };
            Particle::new(name, Some(Boson), Some("Gauge boson"), None, mass, charge, spin)
        };

        let electron = lepton("Electron", Some(1), Measurement::new(5.485799094e-4, Some(23e-13), "Da"), -1.0);
        let muon = lepton("Muon", Some(2), Measurement::new(105.658369, Some(9e-6), "MeV/c^2"), -1.0);
        let tau = lepton("Tau", Some(3), Measurement::estimate(1776.99, "MeV/c^2"), -1.0);
        let neutrino = lepton("Neutrino", None, Measurement::estimate(0.0, "eV/c^2"), 0.0);
        let w_plus = gauge("W Boson +", 80.398, 1.0, 1.0);

        vec![
            ("UP", quark("Up", 1, 4.0, "MeV/c^2", 2.0 / 3.0)),
            ("DOWN", quark("Down", 1, 8.0, "MeV/c^2", -1.0 / 3.0)),
            ("STRANGE", quark("Strange", 2, 130.0, "MeV/c^2", -1.0 / 3.0)),
            ("CHARM", quark("Charm", 2, 1.5, "GeV/c^2", 2.0 / 3.0)),
            ("BOTTOM", quark("Bottom", 3, 5.0, "GeV/c^2", -1.0 / 3.0)),
            ("TOP", quark("Top", 3, 170.9, "GeV/c^2", 2.0 / 3.0)),
            ("POSITRON", electron.as_named("Positron", true)),
            ("ELECTRON", electron),
            ("ANTIMUON", muon.as_named("Anti-Muon", true)),
            ("MUON", muon),
            ("ANTITAU", tau.as_named("Anti-Tau", true)),
            ("TAU", tau),
            ("ANTINEUTRINO", neutrino.as_named("Anti-Neutrino", false)),
            ("MUON_NEUTRINO", neutrino.as_named("Muon Neutrino", false)),
            ("ANTIMUON_NEUTRINO", neutrino.as_named("Muon Anti-Neutrino", false)),
            ("TAU_NEUTRINO", neutrino.as_named("Tau Neutrino", false)),
            ("ANTITAU_NEUTRINO", neutrino.as_named("Tau Anti-Neutrino", false)),
            ("NEUTRINO", neutrino),
            ("PHOTON", gauge("Photon", 0.0, 0.0, 1.0)),
            ("W_BOSON_MINUS", w_plus.as_named("W Boson -", true)),
            ("W_BOSON_PLUS", w_plus),
            ("Z_BOSON", gauge("Z Boson", 91.1876, 0.0, 1.0)),
            ("GLUON", gauge("Gluon", 0.0, 0.0, 1.0)),
            (
                "GRAVITON",
                Particle::new("Graviton", None, None, None, Measurement::exact(0.0, ""), 0.0, 2.0),
            ),
            (
                "HIGGS_BOSON",
                Particle::new(
                    "Higgs Boson",
                    None,
                    None,
                    None,
                    Measurement::estimate(112.0, "GeV/c^2"),
                    0.0,
                    0.0,
                ),
            ),
        ]
    }
}

static LIBRARY: LazyLock<ConstantLibrary<Particle>> = LazyLock::new(|| {
    let mut library = ConstantLibrary::new();
    crate::built(
        "particle",
        library.register_index_by_attribute("name", IndexOptions::default()),
    );
    crate::built(
        "particle",
        library.register_collection_by("family", |particle: &Particle| particle.family.map(Family::slot)),
    );
    crate::built("particle", library.add_declared(&Particle::declared()));
    library
});

impl ConstantTable for Particle {
    fn library() -> &'static ConstantLibrary<Self, Token> {
        &LIBRARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants_core::Found;

    #[test]
    fn charm() {
        let c = Particle::get("Charm").unwrap();

        assert_eq!(c.name, "Charm");
        assert_eq!(c.family, Some(Family::Fermion));
        assert_eq!(c.group, Some("Quark"));
        assert_eq!(c.generation, Some(2));
        assert_eq!(c.charge, 2.0 / 3.0);
        assert_eq!(c.spin, 0.5);
        assert_eq!(c.mass.unit.as_deref(), Some("GeV/c^2"));
    }

    #[test]
    fn antiparticles_flip_charge_only() {
        let tau = Particle::get("Tau").unwrap();
        let antitau = Particle::get("Anti-Tau").unwrap();

        assert_eq!(antitau.charge, 1.0);
        assert_eq!(antitau.charge, -tau.charge);
        assert_eq!(antitau.family, tau.family);
        assert_eq!(antitau.group, tau.group);
        assert_eq!(antitau.generation, Some(3));
        assert_eq!(antitau.mass, tau.mass);
    }

    #[test]
    fn lookup_is_none_for_undefined_particles() {
        assert!(Particle::lookup("Blop").is_none());
    }

    #[test]
    fn families_are_collected() {
        let families = Particle::collection("family").unwrap();

        let bosons = families.get(Family::Boson.slot()).unwrap();
        let names: Vec<_> = bosons.as_slice().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Photon", "W Boson -", "W Boson +", "Z Boson", "Gluon"]);

        assert!(matches!(families.get(Family::Fermion.slot()), Some(Found::Group(group)) if group.len() == 18));
        assert!(families.values().all(|p| p.name != "Graviton"));
    }

    #[test]
    fn attributes_read_fields() {
        let muon = Particle::get("Muon").unwrap();
        assert_eq!(muon.attribute("family"), Some(Token::from("Fermion")));
        assert_eq!(muon.attribute("generation"), Some(Token::Int(2)));
        assert_eq!(muon.attribute("mass"), Some(Token::Float(105.658369)));

        let higgs = Particle::get("Higgs Boson").unwrap();
        assert_eq!(higgs.attribute("family"), Some(Token::Null));
    }

    #[test]
    fn mass_uncertainty_follows_the_measurement() {
        assert_eq!(Particle::get("Muon").unwrap().mass_uncertainty(), Some(9e-6));
        assert_eq!(Particle::get("Top").unwrap().mass_uncertainty(), None);
    }
}
