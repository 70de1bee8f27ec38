use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Parameter '{name}' must be a positive finite number, got {value}")]
    InvalidValue { name: &'static str, value: f64 },
}

/// Options controlling which internal coordinates a graph derives.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Detect improper dihedrals around planar trivalent ring centres.
    pub guess_impropers: bool,
    /// Keep only 1-4 pairs whose dihedral's central bond lies on a ring.
    pub only_cyclic_14s: bool,
    /// Largest |dihedral| in degrees still considered planar.
    pub improper_planarity_cutoff_degrees: f64,
    /// Scale applied to the summed van der Waals radii during bond inference.
    pub bond_distance_factor: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            guess_impropers: false,
            only_cyclic_14s: false,
            improper_planarity_cutoff_degrees: 5.0,
            bond_distance_factor: 0.6,
        }
    }
}

impl GraphConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive(
            "improper_planarity_cutoff_degrees",
            self.improper_planarity_cutoff_degrees,
        )?;
        check_positive("bond_distance_factor", self.bond_distance_factor)?;
        Ok(())
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}

#[derive(Default)]
pub struct GraphConfigBuilder {
    guess_impropers: Option<bool>,
    only_cyclic_14s: Option<bool>,
    improper_planarity_cutoff_degrees: Option<f64>,
    bond_distance_factor: Option<f64>,
}

impl GraphConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guess_impropers(mut self, enabled: bool) -> Self {
        self.guess_impropers = Some(enabled);
        self
    }
    pub fn only_cyclic_14s(mut self, enabled: bool) -> Self {
        self.only_cyclic_14s = Some(enabled);
        self
    }
    pub fn improper_planarity_cutoff_degrees(mut self, degrees: f64) -> Self {
        self.improper_planarity_cutoff_degrees = Some(degrees);
        self
    }
    pub fn bond_distance_factor(mut self, factor: f64) -> Self {
        self.bond_distance_factor = Some(factor);
        self
    }

    pub fn build(self) -> Result<GraphConfig, ConfigError> {
        let defaults = GraphConfig::default();
        let config = GraphConfig {
            guess_impropers: self.guess_impropers.unwrap_or(defaults.guess_impropers),
            only_cyclic_14s: self.only_cyclic_14s.unwrap_or(defaults.only_cyclic_14s),
            improper_planarity_cutoff_degrees: self
                .improper_planarity_cutoff_degrees
                .unwrap_or(defaults.improper_planarity_cutoff_degrees),
            bond_distance_factor: self
                .bond_distance_factor
                .unwrap_or(defaults.bond_distance_factor),
        };
        config.validate()?;
        Ok(config)
    }
}
