use super::{Input, read_input};
use crate::cli::GraphArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use topogen::engine::graph::ImproperStatus;
use topogen::engine::progress::ProgressReporter;
use topogen::workflows::topology::{self, TopologyResult};
use tracing::{info, warn};

pub fn run(args: GraphArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.options.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args.options)?;

    let input = read_input(&args.input)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = match &input {
        Input::Structure(molecule) => {
            topology::run(molecule, &config.radii, &config.graph, &reporter)?
        }
        Input::BondList(bonds) => {
            topology::run_bond_list(bonds, args.atom_count, &config.graph, &reporter)?
        }
    };

    result.write_graph_dump(&args.output)?;
    print_summary(&result);
    println!("Graph written to: {}", args.output.display());
    Ok(())
}

pub(crate) fn print_summary(result: &TopologyResult) {
    let counts = result.counts();
    println!(
        "{} atoms: {} bonds, {} angles, {} dihedrals, {} impropers, {} 1-4 pairs",
        result.atom_count,
        counts.bonds,
        counts.angles,
        counts.dihedrals,
        counts.impropers,
        counts.one_fours
    );
    if result.improper_status == ImproperStatus::WithoutGeometry {
        warn!("Impropers were requested but the input has no coordinates.");
        println!("Warning: improper dihedrals need coordinates; none were derived.");
    }
}
