use super::{is_structure_file, read_structure};
use crate::cli::BatchArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::path::{Path, PathBuf};
use topogen::engine::progress::ProgressReporter;
use topogen::workflows::topology;
use tracing::{error, info};

pub fn run(args: BatchArgs) -> Result<()> {
    if let Some(path) = args.inputs.iter().find(|p| !is_structure_file(p)) {
        return Err(CliError::Argument(format!(
            "Batch mode only accepts PDB inputs, got {:?}",
            path
        )));
    }

    let partial_config = PartialConfig::load(args.options.config.as_deref())?;
    let config = partial_config.merge_with_cli(&args.options)?;

    let molecules = args
        .inputs
        .iter()
        .map(|path| read_structure(path))
        .collect::<Result<Vec<_>>>()?;

    std::fs::create_dir_all(&args.output_dir)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    info!("Building {} molecule graph(s)...", molecules.len());
    let results = topology::run_batch(&molecules, &config.radii, &config.graph, &reporter);

    let mut failures = 0;
    for (input, result) in args.inputs.iter().zip(results) {
        let output = output_path(&args.output_dir, input);
        match result.and_then(|r| r.write_graph_dump(&output)) {
            Ok(()) => println!("{} -> {}", input.display(), output.display()),
            Err(e) => {
                failures += 1;
                error!("Failed to process {:?}: {}", input, e);
                eprintln!("✗ {}: {}", input.display(), e);
            }
        }
    }

    if failures > 0 {
        return Err(CliError::Other(anyhow::anyhow!(
            "{} of {} input(s) failed",
            failures,
            args.inputs.len()
        )));
    }
    Ok(())
}

fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "molecule".to_string());
    output_dir.join(format!("{}.dat", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_input_stem() {
        let path = output_path(Path::new("out"), Path::new("inputs/benzene.pdb"));
        assert_eq!(path, PathBuf::from("out/benzene.dat"));
    }
}
