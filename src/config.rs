// Centralized defaults for design-space sampling

// ====================
// Design space
// ====================
/// Number of design variables in one configuration.
pub const DESIGN_DIM: usize = 14;

/// Column names of the design variables, in sampling order.
pub const DESIGN_VARIABLES: [&str; DESIGN_DIM] = [
    "wing_aspect",
    "wing_taper",
    "wing_sweep",
    "wing_dihedral",
    "wing_area",
    "tail_aspect",
    "tail_taper",
    "tail_sweep",
    "tail_dihedral",
    "tail_area",
    "fuse_len_fore",
    "fuse_len_mid",
    "fuse_len_aft",
    "fuse_diameter",
];

/// Column names of the metric fields, in output order.
pub const METRIC_COLUMNS: [&str; 6] = ["cL", "cD", "cM", "sigma_dBsm", "Wstructure", "Wempty"];

/// Name of the trailing diagnostic column.
pub const ERROR_COLUMN: &str = "error";

/// Reference bounds for a small fixed-wing UAV (min, max), in DESIGN_VARIABLES order.
pub const REFERENCE_BOUNDS: [(f64, f64); DESIGN_DIM] = [
    (8.0, 12.0),   // wing aspect ratio
    (0.35, 0.70),  // wing taper ratio
    (0.0, 20.0),   // wing sweep (deg)
    (0.0, 8.0),    // wing dihedral (deg)
    (0.8, 2.7),    // wing area (m^2)
    (4.0, 7.0),    // tail aspect ratio
    (0.35, 0.80),  // tail taper ratio
    (0.0, 20.0),   // tail sweep (deg)
    (0.0, 12.0),   // tail dihedral (deg)
    (0.20, 0.80),  // tail area (m^2)
    (0.3, 0.9),    // fuselage fore length (m)
    (1.0, 2.5),    // fuselage mid length (m)
    (0.7, 1.6),    // fuselage aft length (m)
    (0.12, 0.35),  // fuselage diameter (m)
];

// ====================
// Study defaults
// ====================
pub const DEFAULT_STUDY_NAME: &str = "UAV design space";
pub const DEFAULT_CONFIG_COUNT: usize = 100;
pub const DEFAULT_SEED: u64 = 44;
pub const DEFAULT_WORKERS: usize = 1;

// ====================
// Flow conditions
// ====================
pub const DEFAULT_REYNOLDS: f64 = 1.0e6;
pub const DEFAULT_MACH: f64 = 0.8;
pub const DEFAULT_ALPHA_DEG: f64 = 5.0;

// ====================
// Placeholder metrics
// ====================
pub const PLACEHOLDER_CL: f64 = 0.5;
pub const PLACEHOLDER_CD: f64 = 0.1;
pub const PLACEHOLDER_CM: f64 = 0.05;
pub const PLACEHOLDER_STRUCTURAL_WEIGHT: f64 = 1000.0;
pub const PLACEHOLDER_RCS_DBSM: f64 = -20.0;
/// Empty weight as a multiple of structural weight.
pub const EMPTY_WEIGHT_FACTOR: f64 = 1.2;

// ====================
// Output / environment
// ====================
pub const DEFAULT_OUTPUT_DIR: &str = "designs";
pub const DEFAULT_OUTPUT_NAME: &str = "design_output";
/// Overrides the log level when `--verbose` is not given (error, warn, info, debug, trace).
pub const LOG_LEVEL_ENV: &str = "UAV_DOE_LOG_LEVEL";
