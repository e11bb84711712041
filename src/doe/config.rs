/// Study configuration structures
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::bounds::{validate_bounds, DesignBounds};
use super::error::{ConfigError, ValidationError};
use super::model::ParmSchema;
use super::sampling::Criterion;
use crate::config::{
    DEFAULT_ALPHA_DEG, DEFAULT_CONFIG_COUNT, DEFAULT_MACH, DEFAULT_OUTPUT_DIR, DEFAULT_REYNOLDS,
    DEFAULT_SEED, DEFAULT_STUDY_NAME, DEFAULT_WORKERS, DESIGN_DIM, DESIGN_VARIABLES,
    REFERENCE_BOUNDS,
};

/// Free-stream conditions handed to the aerodynamic evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConditions {
    reynolds: f64,
    mach: f64,
    alpha_deg: f64,
}

impl Default for FlowConditions {
    fn default() -> Self {
        Self {
            reynolds: DEFAULT_REYNOLDS,
            mach: DEFAULT_MACH,
            alpha_deg: DEFAULT_ALPHA_DEG,
        }
    }
}

impl FlowConditions {
    pub fn new(reynolds: f64, mach: f64, alpha_deg: f64) -> Result<Self, ValidationError> {
        let flow = Self {
            reynolds,
            mach,
            alpha_deg,
        };
        flow.validate()?;
        Ok(flow)
    }

    /// Reynolds and Mach must be positive, angle of attack finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.reynolds.is_finite() && self.reynolds > 0.0) {
            return Err(ValidationError::Flow(format!(
                "reynolds number must be positive, got {}",
                self.reynolds
            )));
        }
        if !(self.mach.is_finite() && self.mach > 0.0) {
            return Err(ValidationError::Flow(format!(
                "mach number must be positive, got {}",
                self.mach
            )));
        }
        if !self.alpha_deg.is_finite() {
            return Err(ValidationError::Flow(format!(
                "angle of attack must be finite, got {}",
                self.alpha_deg
            )));
        }
        Ok(())
    }

    pub fn reynolds(&self) -> f64 {
        self.reynolds
    }

    pub fn mach(&self) -> f64 {
        self.mach
    }

    pub fn alpha_deg(&self) -> f64 {
        self.alpha_deg
    }
}

/// One sampled design variable and its range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignVariable {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoeConfig {
    /// Name of the study, also the default export name
    pub study_name: String,

    /// Number of configurations to sample
    #[serde(default = "default_config_count")]
    pub n_configs: usize,

    /// Seed for reproducible sampling; fresh entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub criterion: Criterion,

    /// Rows evaluated concurrently, each worker with its own model
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Parameter naming of the in-process model
    #[serde(default)]
    pub schema: ParmSchema,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub flow: FlowConditions,

    /// Sampled variables in wing, tail, fuselage order
    pub variables: Vec<DesignVariable>,
}

fn default_config_count() -> usize {
    DEFAULT_CONFIG_COUNT
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for DoeConfig {
    /// Reference UAV study: 100 maximin LHS configurations, seed 44.
    fn default() -> Self {
        Self::with_bounds(DEFAULT_STUDY_NAME.to_string(), &REFERENCE_BOUNDS)
    }
}

impl DoeConfig {
    /// A study over the standard variable names with the given `(min, max)` pairs.
    pub fn with_bounds(study_name: String, bounds: &[(f64, f64)]) -> Self {
        let variables = bounds
            .iter()
            .enumerate()
            .map(|(i, &(min, max))| DesignVariable {
                name: super::bounds::variable_name(i),
                min,
                max,
            })
            .collect();

        DoeConfig {
            study_name,
            n_configs: DEFAULT_CONFIG_COUNT,
            seed: Some(DEFAULT_SEED),
            criterion: Criterion::default(),
            workers: DEFAULT_WORKERS,
            schema: ParmSchema::default(),
            output_dir: default_output_dir(),
            flow: FlowConditions::default(),
            variables,
        }
    }

    /// Validate the variable table into sampling bounds.
    ///
    /// Names are informational; a name out of the standard order only warns.
    pub fn bounds(&self) -> Result<DesignBounds, ValidationError> {
        for (i, var) in self.variables.iter().enumerate() {
            if let Some(expected) = DESIGN_VARIABLES.get(i) {
                if var.name != *expected {
                    warn!(
                        "variable {} is named '{}' but is sampled as '{}'",
                        i, var.name, expected
                    );
                }
            }
        }
        let rows: Vec<[f64; 2]> = self.variables.iter().map(|v| [v.min, v.max]).collect();
        validate_bounds(&rows, DESIGN_DIM)
    }

    /// Check everything that would abort a run before it starts.
    pub fn validate(&self) -> Result<DesignBounds, ValidationError> {
        self.flow.validate()?;
        self.bounds()
    }

    /// Export file stem derived from the study name.
    pub fn export_name(&self) -> String {
        self.study_name.trim().replace(' ', "_")
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load study configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Save study configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_study_survives_toml() {
        let config = DoeConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = DoeConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.bounds().unwrap().pairs(), REFERENCE_BOUNDS.to_vec());
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let mut text = String::from("study_name = \"tiny\"\ncriterion = \"m\"\n");
        for name in DESIGN_VARIABLES {
            text.push_str(&format!("[[variables]]\nname = \"{name}\"\nmin = 0.0\nmax = 1.0\n"));
        }
        let config = DoeConfig::from_toml_str(&text).unwrap();

        assert_eq!(config.n_configs, DEFAULT_CONFIG_COUNT);
        assert_eq!(config.seed, None);
        assert_eq!(config.criterion, Criterion::Maximin);
        assert_eq!(config.workers, 1);
        assert_eq!(config.schema, ParmSchema::Current);
        assert_eq!(config.output_dir, PathBuf::from("designs"));
        assert_eq!(config.flow, FlowConditions::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_flow_table_keeps_other_defaults() {
        let text = "study_name = \"flow\"\nvariables = []\n[flow]\nmach = 0.3\n";
        let config = DoeConfig::from_toml_str(text).unwrap();
        assert_eq!(config.flow.mach(), 0.3);
        assert_eq!(config.flow.reynolds(), DEFAULT_REYNOLDS);
        assert_eq!(config.flow.alpha_deg(), DEFAULT_ALPHA_DEG);
    }

    #[test]
    fn missing_variable_is_a_shape_error() {
        let mut config = DoeConfig::default();
        config.variables.pop();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Shape { rows: 13, .. })
        ));
    }

    #[test]
    fn invalid_flow_is_rejected() {
        assert!(FlowConditions::new(1e6, 0.0, 5.0).is_err());
        assert!(FlowConditions::new(-1.0, 0.8, 5.0).is_err());
        assert!(FlowConditions::new(1e6, 0.8, f64::INFINITY).is_err());
        let flow = FlowConditions::new(5e5, 0.3, -2.0).unwrap();
        assert_eq!(flow.alpha_deg(), -2.0);

        let mut config = DoeConfig::default();
        config.flow = FlowConditions {
            reynolds: 1e6,
            mach: -0.5,
            alpha_deg: 0.0,
        };
        assert!(matches!(config.validate(), Err(ValidationError::Flow(_))));
    }

    #[test]
    fn garbage_toml_is_a_parse_error() {
        assert!(matches!(
            DoeConfig::from_toml_str("study_name = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn export_name_replaces_spaces() {
        assert_eq!(DoeConfig::default().export_name(), "UAV_design_space");
    }
}
