use super::bonding::infer_bonds;
use super::chains::{build_adjacency, extend_chains};
use super::config::GraphConfig;
use super::error::GraphError;
use super::impropers::ImproperDetector;
use super::progress::{Progress, ProgressReporter};
use super::rings::RingAnalyzer;
use crate::core::elements::RadiusTable;
use crate::core::io::graph_dump::GraphDump;
use crate::core::io::traits::TopologyWriter;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::{
    Angle, AtomIndex, Bond, CoordinateCounts, Dihedral, Improper, InternalCoordinates, OneFourPair,
};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Build stages of a [`MoleculeGraph`], in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphState {
    Uninitialized,
    BondsEstablished,
    AnglesDerived,
    DihedralsDerived,
    OneFoursDerived,
    ImpropersDerived,
    Ready,
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphState::Uninitialized => "uninitialized",
            GraphState::BondsEstablished => "bonds established",
            GraphState::AnglesDerived => "angles derived",
            GraphState::DihedralsDerived => "dihedrals derived",
            GraphState::OneFoursDerived => "1-4 pairs derived",
            GraphState::ImpropersDerived => "impropers derived",
            GraphState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Outcome of the improper stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImproperStatus {
    /// `guess_impropers` was off.
    NotRequested,
    /// Impropers were requested but the graph has no coordinates.
    WithoutGeometry,
    Derived,
}

#[derive(Debug, Clone, Copy)]
struct Geometry<'a> {
    molecule: &'a Molecule,
    radii: &'a RadiusTable,
}

/// Derives and holds the bonded internal coordinates of one molecule.
///
/// A graph is created from either a bare bond list or a [`Molecule`] with
/// coordinates, then moved through its build stages exactly once:
///
/// ```text
/// Uninitialized -> BondsEstablished -> AnglesDerived -> DihedralsDerived
///               -> OneFoursDerived -> (ImpropersDerived) -> Ready
/// ```
///
/// The improper stage only runs when `guess_impropers` is enabled. Each
/// derived set is written once and never modified afterwards; a failing stage
/// leaves the graph at the last completed state. Queries on the derived sets
/// succeed only in the `Ready` state.
#[derive(Debug)]
pub struct MoleculeGraph<'a> {
    config: GraphConfig,
    atom_count: usize,
    declared_bonds: BTreeSet<Bond>,
    geometry: Option<Geometry<'a>>,
    state: GraphState,
    coordinates: InternalCoordinates,
    rings: RingAnalyzer,
    improper_status: ImproperStatus,
}

fn canonical_bonds(
    pairs: impl IntoIterator<Item = (AtomIndex, AtomIndex)>,
    atom_count: usize,
) -> Result<BTreeSet<Bond>, GraphError> {
    let mut bonds = BTreeSet::new();
    for (i, j) in pairs {
        for atom in [i, j] {
            if atom == 0 || atom > atom_count {
                return Err(GraphError::IndexOutOfRange { atom, atom_count });
            }
        }
        if i == j {
            return Err(GraphError::SelfBond { atom: i });
        }
        bonds.insert(Bond::new([i, j]));
    }
    Ok(bonds)
}

impl MoleculeGraph<'static> {
    /// Creates a graph from a bond list without coordinates.
    ///
    /// When `atom_count` is `None` the largest index in `bonds` is used.
    /// Impropers can never be derived for such a graph.
    pub fn from_bonds(
        bonds: impl IntoIterator<Item = (AtomIndex, AtomIndex)>,
        atom_count: Option<usize>,
        config: GraphConfig,
    ) -> Result<Self, GraphError> {
        config.validate()?;
        let pairs: Vec<(AtomIndex, AtomIndex)> = bonds.into_iter().collect();
        let atom_count = atom_count.unwrap_or_else(|| {
            pairs
                .iter()
                .map(|&(i, j)| i.max(j))
                .max()
                .unwrap_or(0)
        });
        let declared_bonds = canonical_bonds(pairs, atom_count)?;
        Ok(Self::with_parts(config, atom_count, declared_bonds, None))
    }
}

impl<'a> MoleculeGraph<'a> {
    /// Creates a graph from a molecule with coordinates.
    ///
    /// The molecule's own bonds are used when present; otherwise bonds are
    /// inferred from distances when the graph is built.
    pub fn from_molecule(
        molecule: &'a Molecule,
        radii: &'a RadiusTable,
        config: GraphConfig,
    ) -> Result<Self, GraphError> {
        config.validate()?;
        let atom_count = molecule.atom_count();
        let declared_bonds = canonical_bonds(molecule.bonds.iter().copied(), atom_count)?;
        Ok(Self::with_parts(
            config,
            atom_count,
            declared_bonds,
            Some(Geometry { molecule, radii }),
        ))
    }

    fn with_parts(
        config: GraphConfig,
        atom_count: usize,
        declared_bonds: BTreeSet<Bond>,
        geometry: Option<Geometry<'a>>,
    ) -> Self {
        Self {
            config,
            atom_count,
            declared_bonds,
            geometry,
            state: GraphState::Uninitialized,
            coordinates: InternalCoordinates::default(),
            rings: RingAnalyzer::default(),
            improper_status: ImproperStatus::NotRequested,
        }
    }

    /// Runs every remaining build stage.
    pub fn build(&mut self) -> Result<(), GraphError> {
        self.build_with_progress(&ProgressReporter::new())
    }

    /// Runs every build stage, reporting each completed stage to `reporter`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidTransition`] if the graph has already been
    /// built, or the error of the first stage that fails.
    pub fn build_with_progress(&mut self, reporter: &ProgressReporter) -> Result<(), GraphError> {
        self.establish_bonds()?;
        self.report_stage(reporter, self.coordinates.bonds.len());
        self.derive_angles()?;
        self.report_stage(reporter, self.coordinates.angles.len());
        self.derive_dihedrals()?;
        self.report_stage(reporter, self.coordinates.dihedrals.len());
        self.derive_one_fours()?;
        self.report_stage(reporter, self.coordinates.one_fours.len());
        if self.config.guess_impropers {
            self.derive_impropers()?;
            self.report_stage(reporter, self.coordinates.impropers.len());
        }
        self.finalize()?;

        let counts = self.coordinates.counts();
        info!(
            bonds = counts.bonds,
            angles = counts.angles,
            dihedrals = counts.dihedrals,
            impropers = counts.impropers,
            one_fours = counts.one_fours,
            "Molecule graph ready."
        );
        Ok(())
    }

    fn report_stage(&self, reporter: &ProgressReporter, count: usize) {
        reporter.report(Progress::StageComplete {
            stage: self.state,
            count,
        });
    }

    fn next_state(&self) -> Option<GraphState> {
        match self.state {
            GraphState::Uninitialized => Some(GraphState::BondsEstablished),
            GraphState::BondsEstablished => Some(GraphState::AnglesDerived),
            GraphState::AnglesDerived => Some(GraphState::DihedralsDerived),
            GraphState::DihedralsDerived => Some(GraphState::OneFoursDerived),
            GraphState::OneFoursDerived if self.config.guess_impropers => {
                Some(GraphState::ImpropersDerived)
            }
            GraphState::OneFoursDerived | GraphState::ImpropersDerived => Some(GraphState::Ready),
            GraphState::Ready => None,
        }
    }

    fn expect_transition(&self, to: GraphState) -> Result<(), GraphError> {
        if self.next_state() == Some(to) {
            Ok(())
        } else {
            Err(GraphError::InvalidTransition {
                from: self.state,
                to,
            })
        }
    }

    /// Fixes the bond set, inferring it from coordinates if the source had
    /// no explicit connectivity.
    pub fn establish_bonds(&mut self) -> Result<(), GraphError> {
        self.expect_transition(GraphState::BondsEstablished)?;

        let bonds = match self.geometry {
            Some(geometry) if self.declared_bonds.is_empty() => infer_bonds(
                geometry.molecule,
                geometry.radii,
                self.config.bond_distance_factor,
            )?,
            _ => self.declared_bonds.clone(),
        };
        if bonds.is_empty() {
            let reason = if self.geometry.is_some() {
                "no atom pairs lie within bonding distance"
            } else {
                "the bond list is empty"
            };
            return Err(GraphError::MissingConnectivity {
                reason: reason.to_string(),
            });
        }

        self.rings = RingAnalyzer::new(build_adjacency(&bonds));
        self.coordinates.bonds = bonds;
        self.state = GraphState::BondsEstablished;
        info!(count = self.coordinates.bonds.len(), "Bonds established.");
        Ok(())
    }

    pub fn derive_angles(&mut self) -> Result<(), GraphError> {
        self.expect_transition(GraphState::AnglesDerived)?;
        let angles: BTreeSet<Angle> =
            extend_chains(&self.coordinates.bonds, self.rings.adjacency())?;
        self.coordinates.angles = angles;
        self.state = GraphState::AnglesDerived;
        info!(count = self.coordinates.angles.len(), "Angles derived.");
        Ok(())
    }

    pub fn derive_dihedrals(&mut self) -> Result<(), GraphError> {
        self.expect_transition(GraphState::DihedralsDerived)?;
        let dihedrals: BTreeSet<Dihedral> = if self.coordinates.angles.is_empty() {
            BTreeSet::new()
        } else {
            extend_chains(&self.coordinates.angles, self.rings.adjacency())?
        };
        self.coordinates.dihedrals = dihedrals;
        self.state = GraphState::DihedralsDerived;
        info!(count = self.coordinates.dihedrals.len(), "Dihedrals derived.");
        Ok(())
    }

    /// Collects the end pairs of all dihedrals that are neither bonds nor
    /// angle ends. With `only_cyclic_14s`, a dihedral only contributes when
    /// its central bond `j-k` joins two ring members and closes a ring.
    pub fn derive_one_fours(&mut self) -> Result<(), GraphError> {
        self.expect_transition(GraphState::OneFoursDerived)?;

        let angle_ends: BTreeSet<OneFourPair> =
            self.coordinates.angles.iter().map(|a| a.ends()).collect();
        let mut one_fours = BTreeSet::new();
        for dihedral in &self.coordinates.dihedrals {
            let pair = dihedral.ends();
            if self.coordinates.bonds.contains(&pair) || angle_ends.contains(&pair) {
                continue;
            }
            if self.config.only_cyclic_14s {
                let (j, k) = dihedral.middle();
                let cyclic = self.rings.is_ring_member(j)?
                    && self.rings.is_ring_member(k)?
                    && self.rings.is_form_ring(j, k)?;
                if !cyclic {
                    debug!(%dihedral, "Dropping 1-4 pair of acyclic dihedral.");
                    continue;
                }
            }
            one_fours.insert(pair);
        }

        self.coordinates.one_fours = one_fours;
        self.state = GraphState::OneFoursDerived;
        info!(count = self.coordinates.one_fours.len(), "1-4 pairs derived.");
        Ok(())
    }

    pub fn derive_impropers(&mut self) -> Result<(), GraphError> {
        self.expect_transition(GraphState::ImpropersDerived)?;

        match self.geometry {
            Some(geometry) => {
                let detector =
                    ImproperDetector::new(&self.rings, self.config.improper_planarity_cutoff_degrees);
                self.coordinates.impropers = detector.detect(geometry.molecule)?;
                self.improper_status = ImproperStatus::Derived;
                info!(count = self.coordinates.impropers.len(), "Impropers derived.");
            }
            None => {
                self.improper_status = ImproperStatus::WithoutGeometry;
                warn!("Improper dihedrals requested but the input has no coordinates; none derived.");
            }
        }
        self.state = GraphState::ImpropersDerived;
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<(), GraphError> {
        self.expect_transition(GraphState::Ready)?;
        self.state = GraphState::Ready;
        Ok(())
    }

    fn ready(&self) -> Result<&InternalCoordinates, GraphError> {
        match self.state {
            GraphState::Ready => Ok(&self.coordinates),
            state => Err(GraphError::NotReady { state }),
        }
    }

    pub fn coordinates(&self) -> Result<&InternalCoordinates, GraphError> {
        self.ready()
    }

    /// Consumes the graph and returns its derived sets.
    pub fn into_coordinates(self) -> Result<InternalCoordinates, GraphError> {
        match self.state {
            GraphState::Ready => Ok(self.coordinates),
            state => Err(GraphError::NotReady { state }),
        }
    }

    pub fn bonds(&self) -> Result<&BTreeSet<Bond>, GraphError> {
        Ok(&self.ready()?.bonds)
    }

    pub fn angles(&self) -> Result<&BTreeSet<Angle>, GraphError> {
        Ok(&self.ready()?.angles)
    }

    pub fn dihedrals(&self) -> Result<&BTreeSet<Dihedral>, GraphError> {
        Ok(&self.ready()?.dihedrals)
    }

    pub fn impropers(&self) -> Result<&[Improper], GraphError> {
        Ok(&self.ready()?.impropers)
    }

    pub fn one_fours(&self) -> Result<&BTreeSet<OneFourPair>, GraphError> {
        Ok(&self.ready()?.one_fours)
    }

    pub fn counts(&self) -> Result<CoordinateCounts, GraphError> {
        Ok(self.ready()?.counts())
    }

    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn improper_status(&self) -> ImproperStatus {
        self.improper_status
    }

    /// Writes the graph dump to `path`; the improper section is included for
    /// graphs built from coordinates.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let coordinates = self.ready()?;
        GraphDump::new(self.has_geometry())
            .write_to_path(coordinates, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::config::GraphConfigBuilder;
    use nalgebra::Point3;

    const SIX_RING: [(usize, usize); 6] = [(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)];

    fn built(bonds: &[(usize, usize)], config: GraphConfig) -> MoleculeGraph<'static> {
        let mut graph = MoleculeGraph::from_bonds(bonds.iter().copied(), None, config).unwrap();
        graph.build().unwrap();
        graph
    }

    #[test]
    fn six_ring_derives_expected_sets() {
        let graph = built(&SIX_RING, GraphConfig::default());
        let counts = graph.counts().unwrap();
        assert_eq!(counts.bonds, 6);
        assert_eq!(counts.angles, 6);
        assert_eq!(counts.dihedrals, 6);
        assert_eq!(counts.impropers, 0);

        let pairs: Vec<_> = graph.one_fours().unwrap().iter().copied().collect();
        assert_eq!(
            pairs,
            vec![
                OneFourPair::new([1, 4]),
                OneFourPair::new([2, 5]),
                OneFourPair::new([3, 6])
            ]
        );
    }

    #[test]
    fn three_ring_has_no_one_fours_beyond_bonds() {
        let graph = built(&[(1, 2), (2, 3), (3, 1)], GraphConfig::default());
        assert_eq!(graph.angles().unwrap().len(), 3);
        assert!(graph.dihedrals().unwrap().is_empty());
        assert!(graph.one_fours().unwrap().is_empty());
    }

    #[test]
    fn five_ring_one_fours_coincide_with_angle_ends() {
        let graph = built(&[(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)], GraphConfig::default());
        assert_eq!(graph.dihedrals().unwrap().len(), 5);
        assert!(graph.one_fours().unwrap().is_empty());
    }

    #[test]
    fn single_bond_has_no_angles_or_dihedrals() {
        let graph = built(&[(1, 2)], GraphConfig::default());
        assert_eq!(graph.bonds().unwrap().len(), 1);
        assert!(graph.angles().unwrap().is_empty());
        assert!(graph.dihedrals().unwrap().is_empty());
        assert!(graph.one_fours().unwrap().is_empty());
    }

    #[test]
    fn only_cyclic_filter_keeps_ring_pairs() {
        // ring 1-6 with an ethyl tail 7-8 on atom 1
        let mut bonds = SIX_RING.to_vec();
        bonds.extend([(1, 7), (7, 8)]);

        let all = built(&bonds, GraphConfig::default());
        let cyclic = built(
            &bonds,
            GraphConfigBuilder::new().only_cyclic_14s(true).build().unwrap(),
        );

        let all_pairs = all.one_fours().unwrap();
        let cyclic_pairs = cyclic.one_fours().unwrap();
        assert!(all_pairs.contains(&OneFourPair::new([3, 7])));
        assert!(all_pairs.contains(&OneFourPair::new([2, 8])));
        assert!(cyclic_pairs.contains(&OneFourPair::new([1, 4])));
        assert!(cyclic_pairs.contains(&OneFourPair::new([3, 7])));
        assert!(!cyclic_pairs.contains(&OneFourPair::new([2, 8])));
        assert!(cyclic_pairs.is_subset(all_pairs));
    }

    #[test]
    fn queries_fail_before_build() {
        let graph = MoleculeGraph::from_bonds(SIX_RING, None, GraphConfig::default()).unwrap();
        assert_eq!(graph.state(), GraphState::Uninitialized);
        assert!(matches!(
            graph.bonds(),
            Err(GraphError::NotReady {
                state: GraphState::Uninitialized
            })
        ));
        assert!(graph.counts().is_err());
        assert_eq!(graph.atom_count(), 6);
    }

    #[test]
    fn partially_built_graph_is_not_ready() {
        let mut graph = MoleculeGraph::from_bonds(SIX_RING, None, GraphConfig::default()).unwrap();
        graph.establish_bonds().unwrap();
        graph.derive_angles().unwrap();
        assert_eq!(graph.state(), GraphState::AnglesDerived);
        assert!(matches!(
            graph.angles(),
            Err(GraphError::NotReady {
                state: GraphState::AnglesDerived
            })
        ));
    }

    #[test]
    fn stages_cannot_run_out_of_order() {
        let mut graph = MoleculeGraph::from_bonds(SIX_RING, None, GraphConfig::default()).unwrap();
        assert!(matches!(
            graph.derive_dihedrals(),
            Err(GraphError::InvalidTransition {
                from: GraphState::Uninitialized,
                to: GraphState::DihedralsDerived
            })
        ));
        graph.establish_bonds().unwrap();
        assert!(matches!(
            graph.establish_bonds(),
            Err(GraphError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn impropers_stage_is_skipped_unless_requested() {
        let mut graph = MoleculeGraph::from_bonds(SIX_RING, None, GraphConfig::default()).unwrap();
        graph.establish_bonds().unwrap();
        graph.derive_angles().unwrap();
        graph.derive_dihedrals().unwrap();
        graph.derive_one_fours().unwrap();
        assert!(graph.derive_impropers().is_err());
        graph.finalize().unwrap();
        assert_eq!(graph.improper_status(), ImproperStatus::NotRequested);
    }

    #[test]
    fn build_twice_is_an_invalid_transition() {
        let mut graph = built(&SIX_RING, GraphConfig::default());
        let before = graph.coordinates().unwrap().clone();
        assert!(matches!(
            graph.build(),
            Err(GraphError::InvalidTransition {
                from: GraphState::Ready,
                to: GraphState::BondsEstablished
            })
        ));
        assert_eq!(graph.coordinates().unwrap(), &before);
    }

    #[test]
    fn impropers_without_geometry_are_flagged() {
        let config = GraphConfigBuilder::new().guess_impropers(true).build().unwrap();
        let graph = built(&SIX_RING, config);
        assert_eq!(graph.improper_status(), ImproperStatus::WithoutGeometry);
        assert!(graph.impropers().unwrap().is_empty());
        assert!(!graph.has_geometry());
    }

    #[test]
    fn invalid_bonds_are_rejected_at_construction() {
        assert!(matches!(
            MoleculeGraph::from_bonds([(1, 1)], None, GraphConfig::default()),
            Err(GraphError::SelfBond { atom: 1 })
        ));
        assert!(matches!(
            MoleculeGraph::from_bonds([(1, 5)], Some(4), GraphConfig::default()),
            Err(GraphError::IndexOutOfRange {
                atom: 5,
                atom_count: 4
            })
        ));
        assert!(matches!(
            MoleculeGraph::from_bonds([(0, 2)], None, GraphConfig::default()),
            Err(GraphError::IndexOutOfRange { atom: 0, .. })
        ));
    }

    #[test]
    fn duplicate_and_reversed_bonds_collapse() {
        let graph = built(&[(2, 1), (1, 2), (2, 3), (3, 2)], GraphConfig::default());
        let bonds: Vec<_> = graph.bonds().unwrap().iter().copied().collect();
        assert_eq!(bonds, vec![Bond::new([1, 2]), Bond::new([2, 3])]);
    }

    #[test]
    fn empty_bond_list_is_missing_connectivity() {
        let mut graph =
            MoleculeGraph::from_bonds(Vec::<(usize, usize)>::new(), Some(3), GraphConfig::default()).unwrap();
        assert!(matches!(
            graph.build(),
            Err(GraphError::MissingConnectivity { .. })
        ));
        assert_eq!(graph.state(), GraphState::Uninitialized);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GraphConfig {
            bond_distance_factor: -1.0,
            ..GraphConfig::default()
        };
        assert!(matches!(
            MoleculeGraph::from_bonds(SIX_RING, None, config),
            Err(GraphError::Config(_))
        ));
    }

    #[test]
    fn isolated_atoms_without_bonds_are_missing_connectivity() {
        let mut molecule = Molecule::new();
        molecule
            .atoms
            .push(Atom::new(1, "C1", "C", Point3::new(0.0, 0.0, 0.0)));
        molecule
            .atoms
            .push(Atom::new(2, "C2", "C", Point3::new(5.0, 0.0, 0.0)));
        let radii = RadiusTable::new();
        let mut graph =
            MoleculeGraph::from_molecule(&molecule, &radii, GraphConfig::default()).unwrap();
        assert!(graph.has_geometry());
        assert!(matches!(
            graph.build(),
            Err(GraphError::MissingConnectivity { .. })
        ));
    }

    #[test]
    fn build_reports_each_stage() {
        use std::sync::Mutex;

        let stages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StageComplete { stage, count } = event {
                stages.lock().unwrap().push((stage, count));
            }
        }));
        let mut graph = MoleculeGraph::from_bonds(SIX_RING, None, GraphConfig::default()).unwrap();
        graph.build_with_progress(&reporter).unwrap();
        drop(reporter);

        assert_eq!(
            stages.into_inner().unwrap(),
            vec![
                (GraphState::BondsEstablished, 6),
                (GraphState::AnglesDerived, 6),
                (GraphState::DihedralsDerived, 6),
                (GraphState::OneFoursDerived, 3),
            ]
        );
    }

    #[test]
    fn write_produces_graph_dump() {
        let graph = built(&SIX_RING, GraphConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.dat");
        graph.write(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("#nBonds: 6\n"));
        assert!(content.contains("#n14s: 3\n"));
        assert!(!content.contains("#nImDihedrals"));
    }
}
