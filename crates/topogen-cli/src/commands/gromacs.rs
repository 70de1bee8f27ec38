use super::{is_structure_file, read_structure};
use crate::cli::GromacsArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use topogen::core::io::gromacs::GromacsTopology;
use topogen::core::io::traits::TopologyWriter;
use topogen::engine::progress::ProgressReporter;
use topogen::workflows::topology::{self, WorkflowError};
use tracing::info;

pub fn run(args: GromacsArgs) -> Result<()> {
    if !is_structure_file(&args.input) {
        return Err(CliError::Argument(format!(
            "GROMACS output needs a PDB input with force-field columns, got {:?}",
            args.input
        )));
    }

    let partial_config = PartialConfig::load(args.options.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let mut config = partial_config.merge_with_cli(&args.options)?;
    if let Some(name) = &args.molecule_name {
        config.gromacs.molecule_name = name.clone();
    }

    let molecule = read_structure(&args.input)?;
    if !molecule.has_force_field_columns() {
        return Err(CliError::Argument(format!(
            "{:?} has no force-field type columns after column 80",
            args.input
        )));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let result = topology::run(&molecule, &config.radii, &config.graph, &reporter)?;

    info!("Writing GROMACS topology to {:?}", &args.output);
    GromacsTopology::new(&molecule, config.gromacs)
        .write_to_path(&result.coordinates, &args.output)
        .map_err(WorkflowError::from)?;

    if let Some(graph_output) = &args.graph_output {
        result.write_graph_dump(graph_output)?;
        println!("Graph written to: {}", graph_output.display());
    }

    super::graph::print_summary(&result);
    println!("Topology written to: {}", args.output.display());
    Ok(())
}
