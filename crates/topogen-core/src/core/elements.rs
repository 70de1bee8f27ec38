use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub atomic_number: u8,
    /// Van der Waals radius in Angstroms.
    pub vdw_radius: f64,
}

const fn el(atomic_number: u8, vdw_radius: f64) -> ElementData {
    ElementData {
        atomic_number,
        vdw_radius,
    }
}

// Bondi radii, extended with Alvarez/Mantina values where Bondi gives none.
static ELEMENTS: Map<&'static str, ElementData> = phf_map! {
    "H" => el(1, 1.20), "He" => el(2, 1.40),
    "Li" => el(3, 1.82), "Be" => el(4, 1.53), "B" => el(5, 1.92), "C" => el(6, 1.70),
    "N" => el(7, 1.55), "O" => el(8, 1.52), "F" => el(9, 1.47), "Ne" => el(10, 1.54),
    "Na" => el(11, 2.27), "Mg" => el(12, 1.73), "Al" => el(13, 1.84), "Si" => el(14, 2.10),
    "P" => el(15, 1.80), "S" => el(16, 1.80), "Cl" => el(17, 1.75), "Ar" => el(18, 1.88),
    "K" => el(19, 2.75), "Ca" => el(20, 2.31), "Mn" => el(25, 2.05), "Fe" => el(26, 2.04),
    "Co" => el(27, 2.00), "Ni" => el(28, 1.63), "Cu" => el(29, 1.40), "Zn" => el(30, 1.39),
    "Ga" => el(31, 1.87), "Ge" => el(32, 2.11), "As" => el(33, 1.85), "Se" => el(34, 1.90),
    "Br" => el(35, 1.85), "Kr" => el(36, 2.02),
    "Rb" => el(37, 3.03), "Sr" => el(38, 2.49), "Pd" => el(46, 1.63), "Ag" => el(47, 1.72),
    "Cd" => el(48, 1.58), "In" => el(49, 1.93), "Sn" => el(50, 2.17), "Sb" => el(51, 2.06),
    "Te" => el(52, 2.06), "I" => el(53, 1.98), "Xe" => el(54, 2.16),
    "Cs" => el(55, 3.43), "Ba" => el(56, 2.68), "Pt" => el(78, 1.75), "Au" => el(79, 1.66),
    "Hg" => el(80, 1.55), "Tl" => el(81, 1.96), "Pb" => el(82, 2.02), "Bi" => el(83, 2.07),
    "U" => el(92, 1.86),
};

/// Normalizes an element symbol to its conventional capitalization ("CL" -> "Cl").
pub fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Looks up built-in data for an element symbol, ignoring case.
pub fn element(symbol: &str) -> Option<&'static ElementData> {
    ELEMENTS.get(normalize_symbol(symbol).as_str())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RadiusOverrides {
    radii: HashMap<String, f64>,
}

/// Van der Waals radii used for bond inference.
///
/// Starts from the built-in periodic table; individual symbols can be
/// overridden from a TOML file with a single `[radii]` table. The table is
/// immutable once built and can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct RadiusTable {
    overrides: HashMap<String, f64>,
}

impl RadiusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<String, f64>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(symbol, radius)| (normalize_symbol(&symbol), radius))
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, RadiusTableError> {
        let content = std::fs::read_to_string(path).map_err(|e| RadiusTableError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let parsed: RadiusOverrides =
            toml::from_str(&content).map_err(|e| RadiusTableError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        Ok(Self::with_overrides(parsed.radii))
    }

    pub fn vdw_radius(&self, symbol: &str) -> Option<f64> {
        let key = normalize_symbol(symbol);
        self.overrides
            .get(&key)
            .copied()
            .or_else(|| ELEMENTS.get(key.as_str()).map(|e| e.vdw_radius))
    }
}

#[derive(Debug, Error)]
pub enum RadiusTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
