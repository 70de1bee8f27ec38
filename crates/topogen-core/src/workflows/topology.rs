use crate::core::elements::RadiusTable;
use crate::core::io::error::WriteError;
use crate::core::io::graph_dump::GraphDump;
use crate::core::io::traits::TopologyWriter;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::{AtomIndex, CoordinateCounts, InternalCoordinates};
use crate::engine::config::GraphConfig;
use crate::engine::error::GraphError;
use crate::engine::graph::{ImproperStatus, MoleculeGraph};
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Graph construction failed: {0}")]
    Graph(#[from] GraphError),
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),
}

/// The derived topology of one molecule together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyResult {
    pub coordinates: InternalCoordinates,
    pub atom_count: usize,
    pub has_geometry: bool,
    pub improper_status: ImproperStatus,
}

impl TopologyResult {
    pub fn counts(&self) -> CoordinateCounts {
        self.coordinates.counts()
    }

    /// Writes the graph dump, with impropers when coordinates were available.
    pub fn write_graph_dump<P: AsRef<Path>>(&self, path: P) -> Result<(), WorkflowError> {
        GraphDump::new(self.has_geometry).write_to_path(&self.coordinates, path)?;
        Ok(())
    }
}

fn finish(graph: MoleculeGraph<'_>) -> Result<TopologyResult, GraphError> {
    let atom_count = graph.atom_count();
    let has_geometry = graph.has_geometry();
    let improper_status = graph.improper_status();
    Ok(TopologyResult {
        coordinates: graph.into_coordinates()?,
        atom_count,
        has_geometry,
        improper_status,
    })
}

/// Derives the topology of a molecule with coordinates.
#[instrument(skip_all, name = "topology_workflow", fields(atoms = molecule.atom_count()))]
pub fn run(
    molecule: &Molecule,
    radii: &RadiusTable,
    config: &GraphConfig,
    reporter: &ProgressReporter,
) -> Result<TopologyResult, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Building Graph",
    });
    if !molecule.has_connectivity() {
        info!("No explicit connectivity in input; bonds will be inferred from distances.");
    }

    let mut graph = MoleculeGraph::from_molecule(molecule, radii, config.clone())?;
    graph.build_with_progress(reporter)?;
    let result = finish(graph)?;

    reporter.report(Progress::PhaseFinish);
    log_summary(&result);
    Ok(result)
}

/// Derives the topology from a bare bond list; impropers are unavailable.
#[instrument(skip_all, name = "bond_list_workflow")]
pub fn run_bond_list(
    bonds: &[(AtomIndex, AtomIndex)],
    atom_count: Option<usize>,
    config: &GraphConfig,
    reporter: &ProgressReporter,
) -> Result<TopologyResult, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Building Graph",
    });

    let mut graph = MoleculeGraph::from_bonds(bonds.iter().copied(), atom_count, config.clone())?;
    graph.build_with_progress(reporter)?;
    let result = finish(graph)?;

    reporter.report(Progress::PhaseFinish);
    log_summary(&result);
    Ok(result)
}

/// Derives the topologies of independent molecules.
///
/// Molecules share nothing but the radius table, so with the `parallel`
/// feature each one is built on the rayon pool. Results keep input order;
/// one failing molecule does not stop the others.
#[instrument(skip_all, name = "batch_workflow", fields(molecules = molecules.len()))]
pub fn run_batch(
    molecules: &[Molecule],
    radii: &RadiusTable,
    config: &GraphConfig,
    reporter: &ProgressReporter,
) -> Vec<Result<TopologyResult, WorkflowError>> {
    reporter.report(Progress::TaskStart {
        total_steps: molecules.len() as u64,
    });
    let silent = ProgressReporter::new();

    let build_one = |molecule: &Molecule| {
        let result = run(molecule, radii, config, &silent);
        reporter.report(Progress::TaskIncrement);
        result
    };

    #[cfg(feature = "parallel")]
    let results: Vec<_> = molecules.par_iter().map(build_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = molecules.iter().map(build_one).collect();

    reporter.report(Progress::TaskFinish);

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, total = molecules.len(), "Some molecules could not be processed.");
    } else {
        info!(total = molecules.len(), "Batch complete.");
    }
    results
}

fn log_summary(result: &TopologyResult) {
    let counts = result.counts();
    info!(
        atoms = result.atom_count,
        bonds = counts.bonds,
        angles = counts.angles,
        dihedrals = counts.dihedrals,
        impropers = counts.impropers,
        one_fours = counts.one_fours,
        "Topology derived."
    );
}
