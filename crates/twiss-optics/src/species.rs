use serde::{Deserialize, Serialize};
use twiss_core::errors::TwissError;

/// A particle species with its PDG Monte Carlo id and rest mass in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Species {
    /// Canonical name.
    pub name: &'static str,
    /// Alternative names accepted on lookup.
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    /// PDG Monte Carlo particle id.
    pub pdg_id: i32,
    /// Rest mass in GeV.
    pub rest_mass: f64,
}

const ELECTRON_MASS: f64 = 0.000_510_998_950;
const MUON_MASS: f64 = 0.105_658_375_5;
const PION_MASS: f64 = 0.139_570_39;
const KAON_MASS: f64 = 0.493_677;
const PROTON_MASS: f64 = 0.938_272_088_16;

/// Species known to the mass lookup.
pub const SPECIES: &[Species] = &[
    Species {
        name: "e-",
        aliases: &["electron"],
        pdg_id: 11,
        rest_mass: ELECTRON_MASS,
    },
    Species {
        name: "e+",
        aliases: &["positron"],
        pdg_id: -11,
        rest_mass: ELECTRON_MASS,
    },
    Species {
        name: "mu-",
        aliases: &["muon"],
        pdg_id: 13,
        rest_mass: MUON_MASS,
    },
    Species {
        name: "mu+",
        aliases: &["antimuon"],
        pdg_id: -13,
        rest_mass: MUON_MASS,
    },
    Species {
        name: "gamma",
        aliases: &["photon"],
        pdg_id: 22,
        rest_mass: 0.0,
    },
    Species {
        name: "pi0",
        aliases: &[],
        pdg_id: 111,
        rest_mass: 0.134_976_8,
    },
    Species {
        name: "pi+",
        aliases: &[],
        pdg_id: 211,
        rest_mass: PION_MASS,
    },
    Species {
        name: "pi-",
        aliases: &[],
        pdg_id: -211,
        rest_mass: PION_MASS,
    },
    Species {
        name: "kaon+",
        aliases: &["k+"],
        pdg_id: 321,
        rest_mass: KAON_MASS,
    },
    Species {
        name: "kaon-",
        aliases: &["k-"],
        pdg_id: -321,
        rest_mass: KAON_MASS,
    },
    Species {
        name: "proton",
        aliases: &["p"],
        pdg_id: 2212,
        rest_mass: PROTON_MASS,
    },
    Species {
        name: "anti_proton",
        aliases: &["antiproton", "pbar"],
        pdg_id: -2212,
        rest_mass: PROTON_MASS,
    },
    Species {
        name: "neutron",
        aliases: &["n"],
        pdg_id: 2112,
        rest_mass: 0.939_565_420_52,
    },
    Species {
        name: "deuteron",
        aliases: &[],
        pdg_id: 1_000_010_020,
        rest_mass: 1.875_612_942_57,
    },
];

fn species_error(code: &str, message: &str) -> TwissError {
    TwissError::species(code, message).with_hint("run `twiss-sim species` for the supported list")
}

/// Looks a species up by name or alias, ignoring ASCII case.
pub fn by_name(name: &str) -> Result<&'static Species, TwissError> {
    let wanted = name.trim();
    SPECIES
        .iter()
        .find(|species| {
            species.name.eq_ignore_ascii_case(wanted)
                || species
                    .aliases
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(wanted))
        })
        .ok_or_else(|| {
            species_error("unknown-species-name", "no rest mass for species")
                .with_context("species", wanted)
        })
}

/// Looks a species up by PDG id.
pub fn by_pdg_id(pdg_id: i32) -> Result<&'static Species, TwissError> {
    SPECIES
        .iter()
        .find(|species| species.pdg_id == pdg_id)
        .ok_or_else(|| {
            species_error("unknown-species-id", "no rest mass for PDG id")
                .with_context("pdg_id", pdg_id.to_string())
        })
}

/// Species reference as written in configuration: a PDG id or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeciesId {
    /// PDG Monte Carlo id.
    Pdg(i32),
    /// Species name or alias.
    Name(String),
}

impl SpeciesId {
    /// Resolves the reference against the species table.
    pub fn resolve(&self) -> Result<&'static Species, TwissError> {
        match self {
            SpeciesId::Pdg(id) => by_pdg_id(*id),
            SpeciesId::Name(name) => by_name(name),
        }
    }
}
