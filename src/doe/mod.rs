/// Design of Experiments (DOE) module for UAV design-space studies
///
/// This module provides functionality to:
/// - Validate variable bounds and draw Latin hypercube samples
/// - Build wing, tail and fuselage for every configuration on a modeling tool
/// - Score each configuration and record per-step failures without aborting
/// - Export the result table for analysis

pub mod bounds;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod performance;
pub mod record;
pub mod runner;
pub mod sampling;


pub use bounds::{validate_bounds, DesignBounds};
pub use config::{DesignVariable, DoeConfig, FlowConditions};
pub use error::{DoeError, DoeResult, ValidationError};
pub use export::{export_results, export_results_to_csv, export_results_to_json, ExportFormat};
pub use model::{ModelingTool, ParamModel, ParmSchema};
pub use performance::{PerformanceEvaluator, PlaceholderEvaluator};
pub use record::{ConfigurationRecord, DesignVector, Metrics, ResultTable};
pub use runner::{design_space, evaluate_configuration, DoeRunner};
pub use sampling::{sample_design_space, Criterion, LhsSampler};
