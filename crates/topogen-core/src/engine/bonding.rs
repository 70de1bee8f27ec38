use super::error::GraphError;
use crate::core::elements::RadiusTable;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::Bond;
use itertools::Itertools;
use std::collections::BTreeSet;
use tracing::debug;

/// Infers covalent bonds from interatomic distances.
///
/// Atoms `i` and `j` are bonded when their (minimum-image) distance is below
/// `factor * (r_i + r_j)`, with `r` the van der Waals radius of the element.
/// Every pair is tested; the comparison is done on squared distances.
///
/// # Errors
///
/// Returns [`GraphError::UnknownElement`] for the first atom whose element
/// has no radius in `radii`.
pub fn infer_bonds(
    molecule: &Molecule,
    radii: &RadiusTable,
    factor: f64,
) -> Result<BTreeSet<Bond>, GraphError> {
    let atom_radii = molecule
        .atoms
        .iter()
        .enumerate()
        .map(|(position, atom)| {
            radii
                .vdw_radius(&atom.element)
                .ok_or_else(|| GraphError::UnknownElement {
                    atom: position + 1,
                    symbol: atom.element.clone(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let bonds: BTreeSet<Bond> = (1..=molecule.atom_count())
        .tuple_combinations()
        .filter_map(|(i, j)| {
            let delta = molecule.displacement(i, j)?;
            let cutoff = factor * (atom_radii[i - 1] + atom_radii[j - 1]);
            (delta.norm_squared() < cutoff * cutoff).then(|| Bond::new([i, j]))
        })
        .collect();

    debug!(
        atoms = molecule.atom_count(),
        bonds = bonds.len(),
        "Inferred bonds from interatomic distances."
    );
    Ok(bonds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::molecule::PeriodicBox;
    use nalgebra::{Point3, Vector3};

    fn molecule(atoms: &[(&str, [f64; 3])]) -> Molecule {
        let mut molecule = Molecule::new();
        for (k, (element, [x, y, z])) in atoms.iter().enumerate() {
            let name = format!("{}{}", element, k + 1);
            molecule
                .atoms
                .push(Atom::new(k + 1, &name, element, Point3::new(*x, *y, *z)));
        }
        molecule
    }

    fn pairs(bonds: &BTreeSet<Bond>) -> Vec<(usize, usize)> {
        bonds.iter().map(|b| (b.first(), b.last())).collect()
    }

    #[test]
    fn ethane_bonds_are_inferred() {
        let ethane = molecule(&[
            ("C", [0.000, 0.000, 0.000]),
            ("C", [1.540, 0.000, 0.000]),
            ("H", [-0.363, 1.027, 0.000]),
            ("H", [-0.363, -0.513, 0.889]),
            ("H", [-0.363, -0.513, -0.889]),
            ("H", [1.903, -1.027, 0.000]),
            ("H", [1.903, 0.513, 0.889]),
            ("H", [1.903, 0.513, -0.889]),
        ]);
        let bonds = infer_bonds(&ethane, &RadiusTable::new(), 0.6).unwrap();
        assert_eq!(
            pairs(&bonds),
            vec![(1, 2), (1, 3), (1, 4), (1, 5), (2, 6), (2, 7), (2, 8)]
        );
    }

    #[test]
    fn distant_atoms_are_not_bonded() {
        let pair = molecule(&[("C", [0.0, 0.0, 0.0]), ("C", [3.0, 0.0, 0.0])]);
        assert!(infer_bonds(&pair, &RadiusTable::new(), 0.6).unwrap().is_empty());
    }

    #[test]
    fn periodic_images_are_bonded_across_the_boundary() {
        let mut pair = molecule(&[("C", [0.2, 0.0, 0.0]), ("C", [9.4, 0.0, 0.0])]);
        assert!(infer_bonds(&pair, &RadiusTable::new(), 0.6).unwrap().is_empty());

        pair.periodic_box = Some(PeriodicBox::new(Vector3::new(10.0, 10.0, 10.0)));
        let bonds = infer_bonds(&pair, &RadiusTable::new(), 0.6).unwrap();
        assert_eq!(pairs(&bonds), vec![(1, 2)]);
    }

    #[test]
    fn unknown_element_is_reported_with_its_atom() {
        let broken = molecule(&[("C", [0.0, 0.0, 0.0]), ("Xx", [1.0, 0.0, 0.0])]);
        match infer_bonds(&broken, &RadiusTable::new(), 0.6) {
            Err(GraphError::UnknownElement { atom, symbol }) => {
                assert_eq!(atom, 2);
                assert_eq!(symbol, "Xx");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
