use super::error::GraphError;
use super::rings::RingAnalyzer;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::{AtomIndex, Improper};
use crate::core::utils::geometry::dihedral_angle;
use nalgebra::Point3;
use tracing::debug;

/// Finds planar trivalent ring centres that need an improper dihedral.
pub struct ImproperDetector<'a> {
    rings: &'a RingAnalyzer,
    cutoff_degrees: f64,
}

impl<'a> ImproperDetector<'a> {
    pub fn new(rings: &'a RingAnalyzer, cutoff_degrees: f64) -> Self {
        Self {
            rings,
            cutoff_degrees,
        }
    }

    /// Scans atoms in ascending index order and returns one improper for
    /// every ring member with exactly three neighbours whose
    /// `(center, n1, n2, n3)` dihedral magnitude is below the cutoff.
    ///
    /// Substituents keep adjacency order. Positions are taken relative to the
    /// centre through [`Molecule::displacement`], so centres whose neighbours
    /// sit across a periodic boundary are measured on their minimum images.
    pub fn detect(&self, molecule: &Molecule) -> Result<Vec<Improper>, GraphError> {
        let mut impropers = Vec::new();
        for (&center, neighbors) in self.rings.adjacency() {
            let &[n1, n2, n3] = neighbors.as_slice() else {
                continue;
            };
            if !self.rings.is_ring_member(center)? {
                continue;
            }

            let local = |atom: AtomIndex| -> Result<Point3<f64>, GraphError> {
                molecule
                    .displacement(center, atom)
                    .map(Point3::from)
                    .ok_or(GraphError::IndexOutOfRange {
                        atom,
                        atom_count: molecule.atom_count(),
                    })
            };
            let origin = local(center)?;
            let Some(angle) = dihedral_angle(&origin, &local(n1)?, &local(n2)?, &local(n3)?)
            else {
                debug!(center, "Skipping improper candidate with degenerate geometry.");
                continue;
            };

            if angle.abs() < self.cutoff_degrees {
                debug!(center, angle, "Planar ring centre found.");
                impropers.push(Improper::new(center, [n1, n2, n3]));
            }
        }
        Ok(impropers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::Bond;
    use crate::engine::chains::build_adjacency;
    use std::collections::BTreeSet;

    const RING_RADIUS: f64 = 1.4;

    /// Planar six-ring in the xy plane with a substituent (atom 7) on atom 1,
    /// tilted `tilt_degrees` out of the ring plane.
    fn substituted_ring(tilt_degrees: f64) -> (Molecule, RingAnalyzer) {
        let mut molecule = Molecule::new();
        for k in 0..6 {
            let theta = (60.0 * k as f64).to_radians();
            let position = Point3::new(RING_RADIUS * theta.cos(), RING_RADIUS * theta.sin(), 0.0);
            molecule
                .atoms
                .push(Atom::new(k + 1, &format!("C{}", k + 1), "C", position));
        }
        let tilt = tilt_degrees.to_radians();
        let substituent = Point3::new(RING_RADIUS + 1.5 * tilt.cos(), 0.0, 1.5 * tilt.sin());
        molecule.atoms.push(Atom::new(7, "C7", "C", substituent));

        let pairs = [(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1), (1, 7)];
        molecule.bonds = pairs.to_vec();
        let bonds: BTreeSet<Bond> = pairs.iter().map(|&(i, j)| Bond::new([i, j])).collect();
        (molecule, RingAnalyzer::new(build_adjacency(&bonds)))
    }

    #[test]
    fn planar_centre_is_detected_with_adjacency_order() {
        let (molecule, rings) = substituted_ring(0.0);
        let impropers = ImproperDetector::new(&rings, 5.0).detect(&molecule).unwrap();
        assert_eq!(impropers, vec![Improper::new(1, [2, 6, 7])]);
    }

    #[test]
    fn planar_centre_has_zero_dihedral() {
        let (molecule, _) = substituted_ring(0.0);
        let p = |i: usize| molecule.atoms[i - 1].position;
        let angle = dihedral_angle(&p(1), &p(2), &p(6), &p(7)).unwrap();
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn small_tilt_stays_within_cutoff() {
        let (molecule, rings) = substituted_ring(3.0);
        let impropers = ImproperDetector::new(&rings, 5.0).detect(&molecule).unwrap();
        assert_eq!(impropers.len(), 1);
    }

    #[test]
    fn ten_degree_tilt_is_excluded() {
        let (molecule, rings) = substituted_ring(10.0);
        let impropers = ImproperDetector::new(&rings, 5.0).detect(&molecule).unwrap();
        assert!(impropers.is_empty());

        let relaxed = ImproperDetector::new(&rings, 10.0).detect(&molecule).unwrap();
        assert_eq!(relaxed.len(), 1);
    }

    #[test]
    fn acyclic_trivalent_centre_is_ignored() {
        // planar trigonal carbon with three terminal neighbours
        let mut molecule = Molecule::new();
        molecule.atoms.push(Atom::new(1, "C1", "C", Point3::origin()));
        for (k, serial) in (2..=4).enumerate() {
            let theta = (120.0 * k as f64).to_radians();
            let position = Point3::new(1.4 * theta.cos(), 1.4 * theta.sin(), 0.0);
            molecule
                .atoms
                .push(Atom::new(serial, &format!("O{}", serial), "O", position));
        }
        let bonds: BTreeSet<Bond> = [(1, 2), (1, 3), (1, 4)]
            .iter()
            .map(|&(i, j)| Bond::new([i, j]))
            .collect();
        let rings = RingAnalyzer::new(build_adjacency(&bonds));

        let impropers = ImproperDetector::new(&rings, 5.0).detect(&molecule).unwrap();
        assert!(impropers.is_empty());
    }

    #[test]
    fn coincident_neighbours_are_skipped() {
        let (mut molecule, rings) = substituted_ring(0.0);
        molecule.atoms[5].position = molecule.atoms[1].position;
        let impropers = ImproperDetector::new(&rings, 5.0).detect(&molecule).unwrap();
        assert!(impropers.is_empty());
    }
}
