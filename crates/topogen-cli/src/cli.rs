use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "TopoGen Developers",
    version,
    about = "TopoGen CLI - Derives bonds, angles, dihedrals, impropers and 1-4 pairs from molecular connectivity and writes them as graph dumps or GROMACS topologies.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by `batch`.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive the internal coordinates of one molecule and write the graph dump.
    Graph(GraphArgs),
    /// Write a GROMACS topology for a PDB file carrying force-field columns.
    Gromacs(GromacsArgs),
    /// Derive graph dumps for many structure files in parallel.
    Batch(BatchArgs),
}

/// Arguments for the `graph` subcommand.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Input file: a PDB structure (.pdb, .ent) or a plain bond list (any other extension).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the graph dump.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Number of atoms for bond-list input. Defaults to the largest index in the list.
    #[arg(long, value_name = "INT")]
    pub atom_count: Option<usize>,

    #[command(flatten)]
    pub options: GraphOptions,
}

/// Arguments for the `gromacs` subcommand.
#[derive(Args, Debug)]
pub struct GromacsArgs {
    /// Input PDB file with force-field type (and optional charge) columns after column 80.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the GROMACS .top file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Override `gromacs.molecule-name` from the config file.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub molecule_name: Option<String>,

    /// Also write the graph dump to this path.
    #[arg(long, value_name = "PATH")]
    pub graph_output: Option<PathBuf>,

    #[command(flatten)]
    pub options: GraphOptions,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input PDB files.
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving one `<stem>.dat` graph dump per input.
    #[arg(short = 'd', long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub options: GraphOptions,
}

/// Graph-building options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GraphOptions {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `graph.guess-impropers` from the config file.
    #[command(flatten)]
    pub impropers: GuessImpropers,

    /// Override `graph.only-cyclic-14s` from the config file.
    #[command(flatten)]
    pub cyclic_14s: OnlyCyclic14s,

    /// Override the improper planarity cutoff, in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub planarity_cutoff: Option<f64>,

    /// Override the scale factor applied to summed van der Waals radii during bond inference.
    #[arg(long, value_name = "FLOAT")]
    pub bond_distance_factor: Option<f64>,

    /// TOML file with a `[radii]` table overriding built-in van der Waals radii.
    #[arg(long, value_name = "PATH")]
    pub radii_file: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S graph.planarity-cutoff=7.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive switches for improper detection.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct GuessImpropers {
    /// Detect improper dihedrals at planar trivalent ring centres.
    #[arg(long)]
    pub guess_impropers: bool,
    /// Disable improper detection.
    #[arg(long)]
    pub no_guess_impropers: bool,
}

/// Mutually exclusive switches for the cyclic 1-4 filter.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct OnlyCyclic14s {
    /// Keep only 1-4 pairs whose central bond closes a ring.
    #[arg(long)]
    pub only_cyclic_14s: bool,
    /// Keep every 1-4 pair.
    #[arg(long)]
    pub all_14s: bool,
}

impl GuessImpropers {
    pub fn value(self) -> Option<bool> {
        switch(self.guess_impropers, self.no_guess_impropers)
    }
}

impl OnlyCyclic14s {
    pub fn value(self) -> Option<bool> {
        switch(self.only_cyclic_14s, self.all_14s)
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
