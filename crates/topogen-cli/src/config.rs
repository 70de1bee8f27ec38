use crate::cli::GraphOptions;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use topogen::core::elements::RadiusTable;
use topogen::core::io::gromacs::GromacsOptions;
use topogen::engine::config::{GraphConfig, GraphConfigBuilder};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGraphConfig {
    guess_impropers: Option<bool>,
    only_cyclic_14s: Option<bool>,
    planarity_cutoff: Option<f64>,
    bond_distance_factor: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialElementsConfig {
    radii_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialGromacsConfig {
    molecule_name: Option<String>,
    nb_func: Option<u8>,
    comb_rule: Option<u8>,
    gen_pairs: Option<bool>,
    fudge_lj: Option<f64>,
    fudge_qq: Option<f64>,
    bond_func: Option<u8>,
    angle_func: Option<u8>,
    dihedral_func: Option<u8>,
    improper_func: Option<u8>,
    pair_func: Option<u8>,
}

/// Configuration as read from a TOML file, before command-line overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    graph: Option<PartialGraphConfig>,
    elements: Option<PartialElementsConfig>,
    gromacs: Option<PartialGromacsConfig>,
}

/// Fully resolved settings for one command invocation.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub graph: GraphConfig,
    pub radii: RadiusTable,
    pub gromacs: GromacsOptions,
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts from an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, options: &GraphOptions) -> Result<ResolvedConfig> {
        self.apply_set_values(&options.set_values)?;

        let graph_config = self.graph.take().unwrap_or_default();
        let elements_config = self.elements.take().unwrap_or_default();
        let gromacs_config = self.gromacs.take().unwrap_or_default();

        let mut builder = GraphConfigBuilder::new();
        if let Some(enabled) = options.impropers.value().or(graph_config.guess_impropers) {
            builder = builder.guess_impropers(enabled);
        }
        if let Some(enabled) = options.cyclic_14s.value().or(graph_config.only_cyclic_14s) {
            builder = builder.only_cyclic_14s(enabled);
        }
        if let Some(cutoff) = options.planarity_cutoff.or(graph_config.planarity_cutoff) {
            builder = builder.improper_planarity_cutoff_degrees(cutoff);
        }
        if let Some(factor) = options
            .bond_distance_factor
            .or(graph_config.bond_distance_factor)
        {
            builder = builder.bond_distance_factor(factor);
        }
        let graph = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let radii = match options.radii_file.as_ref().or(elements_config.radii_file.as_ref()) {
            Some(path) => {
                debug!("Loading radius overrides from {:?}", path);
                RadiusTable::load(path).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?
            }
            None => RadiusTable::new(),
        };

        let defaults = GromacsOptions::default();
        let gromacs = GromacsOptions {
            molecule_name: gromacs_config
                .molecule_name
                .unwrap_or(defaults.molecule_name),
            nb_func: gromacs_config.nb_func.unwrap_or(defaults.nb_func),
            comb_rule: gromacs_config.comb_rule.unwrap_or(defaults.comb_rule),
            gen_pairs: gromacs_config.gen_pairs.unwrap_or(defaults.gen_pairs),
            fudge_lj: gromacs_config.fudge_lj.unwrap_or(defaults.fudge_lj),
            fudge_qq: gromacs_config.fudge_qq.unwrap_or(defaults.fudge_qq),
            bond_func: gromacs_config.bond_func,
            angle_func: gromacs_config.angle_func,
            dihedral_func: gromacs_config.dihedral_func,
            improper_func: gromacs_config.improper_func,
            pair_func: gromacs_config.pair_func,
        };

        Ok(ResolvedConfig {
            graph,
            radii,
            gromacs,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            let graph = || PartialGraphConfig::default();
            let gromacs = || PartialGromacsConfig::default();
            match key {
                "graph.guess-impropers" => {
                    self.graph.get_or_insert_with(graph).guess_impropers =
                        Some(parse_value(key, value)?);
                }
                "graph.only-cyclic-14s" => {
                    self.graph.get_or_insert_with(graph).only_cyclic_14s =
                        Some(parse_value(key, value)?);
                }
                "graph.planarity-cutoff" => {
                    self.graph.get_or_insert_with(graph).planarity_cutoff =
                        Some(parse_value(key, value)?);
                }
                "graph.bond-distance-factor" => {
                    self.graph.get_or_insert_with(graph).bond_distance_factor =
                        Some(parse_value(key, value)?);
                }
                "elements.radii-file" => {
                    self.elements
                        .get_or_insert_with(Default::default)
                        .radii_file = Some(PathBuf::from(value));
                }
                "gromacs.molecule-name" => {
                    self.gromacs.get_or_insert_with(gromacs).molecule_name =
                        Some(value.to_string());
                }
                "gromacs.nb-func" => {
                    self.gromacs.get_or_insert_with(gromacs).nb_func = Some(parse_value(key, value)?);
                }
                "gromacs.comb-rule" => {
                    self.gromacs.get_or_insert_with(gromacs).comb_rule =
                        Some(parse_value(key, value)?);
                }
                "gromacs.gen-pairs" => {
                    self.gromacs.get_or_insert_with(gromacs).gen_pairs =
                        Some(parse_value(key, value)?);
                }
                "gromacs.fudge-lj" => {
                    self.gromacs.get_or_insert_with(gromacs).fudge_lj =
                        Some(parse_value(key, value)?);
                }
                "gromacs.fudge-qq" => {
                    self.gromacs.get_or_insert_with(gromacs).fudge_qq =
                        Some(parse_value(key, value)?);
                }
                "gromacs.bond-func" => {
                    self.gromacs.get_or_insert_with(gromacs).bond_func =
                        Some(parse_value(key, value)?);
                }
                "gromacs.angle-func" => {
                    self.gromacs.get_or_insert_with(gromacs).angle_func =
                        Some(parse_value(key, value)?);
                }
                "gromacs.dihedral-func" => {
                    self.gromacs.get_or_insert_with(gromacs).dihedral_func =
                        Some(parse_value(key, value)?);
                }
                "gromacs.improper-func" => {
                    self.gromacs.get_or_insert_with(gromacs).improper_func =
                        Some(parse_value(key, value)?);
                }
                "gromacs.pair-func" => {
                    self.gromacs.get_or_insert_with(gromacs).pair_func =
                        Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
