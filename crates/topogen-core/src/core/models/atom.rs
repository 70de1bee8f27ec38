use nalgebra::Point3;

/// Represents an atom read from a structure file.
///
/// The graph engine only ever sees the atom's 1-based position in its
/// [`Molecule`](super::molecule::Molecule); everything else here is carried
/// for bond inference (element, position) and for topology writers (names,
/// residue information, force-field columns).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number from the source file (e.g., PDB columns 7-11).
    pub serial: usize,
    /// The atom name (e.g., "CA", "C1", "H12").
    pub name: String,
    /// The name of the residue this atom belongs to.
    pub residue_name: String,
    /// The residue sequence number.
    pub residue_number: isize,
    /// The chemical element symbol (e.g., "C", "Cl").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The force-field atom type, if the source file provides one.
    pub force_field_type: Option<String>,
    /// The partial atomic charge in elementary charge units, if provided.
    pub partial_charge: Option<f64>,
}

impl Atom {
    /// Creates a new `Atom` with no residue or force-field information.
    ///
    /// # Arguments
    ///
    /// * `serial` - The serial number of the atom.
    /// * `name` - The name of the atom.
    /// * `element` - The chemical element symbol.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(serial: usize, name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            residue_name: String::new(),
            residue_number: 0,
            element: element.to_string(),
            position,
            force_field_type: None,
            partial_charge: None,
        }
    }
}

/// Guesses an element symbol from an atom name when no element column exists.
///
/// Mirrors the common PDB convention of taking the first alphabetic character
/// of the name. Returns `None` for names without any letters.
pub fn element_from_atom_name(name: &str) -> Option<String> {
    name.trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
}
