use super::atom::Atom;
use super::topology::AtomIndex;
use crate::core::utils::geometry::minimum_image;
use nalgebra::Vector3;

/// An orthorhombic simulation box used for minimum-image displacements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    /// Box edge lengths along x, y and z in Angstroms.
    pub lengths: Vector3<f64>,
    /// Which axes are periodic.
    pub periodic: [bool; 3],
}

impl PeriodicBox {
    /// Creates a box that is periodic along all three axes.
    pub fn new(lengths: Vector3<f64>) -> Self {
        Self {
            lengths,
            periodic: [true; 3],
        }
    }
}

/// A single molecule as delivered by a structure reader.
///
/// Atoms are stored in file order; the atom at vector position `p` has the
/// 1-based index `p + 1`. Bonds are pairs of such indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<(AtomIndex, AtomIndex)>,
    pub periodic_box: Option<PeriodicBox>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Retrieves an atom by its 1-based index.
    pub fn atom(&self, index: AtomIndex) -> Option<&Atom> {
        index.checked_sub(1).and_then(|i| self.atoms.get(i))
    }

    /// Returns `true` if the source file supplied explicit connectivity.
    pub fn has_connectivity(&self) -> bool {
        !self.bonds.is_empty()
    }

    /// Returns `true` if every atom carries a force-field type.
    pub fn has_force_field_columns(&self) -> bool {
        !self.atoms.is_empty() && self.atoms.iter().all(|a| a.force_field_type.is_some())
    }

    /// Returns the displacement vector from atom `i` to atom `j`.
    ///
    /// When a periodic box is attached the displacement is wrapped to its
    /// minimum image. Returns `None` if either index is out of range.
    pub fn displacement(&self, i: AtomIndex, j: AtomIndex) -> Option<Vector3<f64>> {
        let a = self.atom(i)?;
        let b = self.atom(j)?;
        let delta = b.position - a.position;
        Some(match &self.periodic_box {
            Some(pbc) => minimum_image(&delta, &pbc.lengths, pbc.periodic),
            None => delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn two_atom_molecule() -> Molecule {
        let mut molecule = Molecule::new();
        molecule
            .atoms
            .push(Atom::new(1, "C1", "C", Point3::new(0.5, 0.0, 0.0)));
        molecule
            .atoms
            .push(Atom::new(2, "C2", "C", Point3::new(9.5, 0.0, 0.0)));
        molecule
    }

    #[test]
    fn atom_lookup_is_one_based() {
        let molecule = two_atom_molecule();
        assert_eq!(molecule.atom(1).unwrap().name, "C1");
        assert_eq!(molecule.atom(2).unwrap().name, "C2");
        assert!(molecule.atom(0).is_none());
        assert!(molecule.atom(3).is_none());
    }

    #[test]
    fn displacement_without_box_is_plain_difference() {
        let molecule = two_atom_molecule();
        let d = molecule.displacement(1, 2).unwrap();
        assert!((d.x - 9.0).abs() < 1e-12);
    }

    #[test]
    fn displacement_with_box_uses_minimum_image() {
        let mut molecule = two_atom_molecule();
        molecule.periodic_box = Some(PeriodicBox::new(Vector3::new(10.0, 10.0, 10.0)));
        let d = molecule.displacement(1, 2).unwrap();
        assert!((d.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn displacement_returns_none_for_unknown_atom() {
        let molecule = two_atom_molecule();
        assert!(molecule.displacement(1, 5).is_none());
    }

    #[test]
    fn force_field_columns_require_every_atom() {
        let mut molecule = two_atom_molecule();
        assert!(!molecule.has_force_field_columns());
        molecule.atoms[0].force_field_type = Some("C_3".into());
        assert!(!molecule.has_force_field_columns());
        molecule.atoms[1].force_field_type = Some("C_3".into());
        assert!(molecule.has_force_field_columns());
    }

    #[test]
    fn has_connectivity_reflects_bond_list() {
        let mut molecule = two_atom_molecule();
        assert!(!molecule.has_connectivity());
        molecule.bonds.push((1, 2));
        assert!(molecule.has_connectivity());
    }
}
