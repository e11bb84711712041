//! Command-line front end for design-space studies.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::{DEFAULT_OUTPUT_NAME, LOG_LEVEL_ENV};
use crate::doe::export::{export_results, sanitize_name, ExportFormat};
use crate::doe::{Criterion, DoeConfig, DoeRunner, ParamModel, ParmSchema};

#[derive(Parser)]
#[command(name = "uav_doe")]
#[command(version)]
#[command(about = "Latin hypercube design-space sampling for parametric UAV geometry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug output (overrides UAV_DOE_LOG_LEVEL)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the reference study to a TOML file
    Generate {
        /// Path of the study file to create
        output: PathBuf,
    },

    /// List the design variables of a study
    List {
        /// Path to study TOML file
        study: PathBuf,
    },

    /// Check a study file without running it
    Validate {
        /// Path to study TOML file
        study: PathBuf,
    },

    /// Sample, evaluate and export a study
    Run {
        /// Path to study TOML file (reference study when omitted)
        study: Option<PathBuf>,

        /// Number of configurations
        #[arg(short = 'n', long)]
        configs: Option<usize>,

        /// Sampling seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Space-filling criterion (random, center, maximin, centermaximin, correlation)
        #[arg(long)]
        criterion: Option<Criterion>,

        /// Worker threads, each with its own model
        #[arg(short, long)]
        workers: Option<usize>,

        /// Parameter naming of the model (current, legacy)
        #[arg(long)]
        schema: Option<ParmSchema>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output file stem
        #[arg(long)]
        name: Option<String>,

        /// Ask for the output file stem on stdin
        #[arg(long, conflicts_with = "name")]
        prompt: bool,

        #[arg(long, value_enum, default_value = "csv")]
        format: Format,

        /// Rows shown at each end of the table preview
        #[arg(long, default_value = "5")]
        preview: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
        }
    }
}

fn log_level(verbose: bool) -> Level {
    if verbose {
        return Level::DEBUG;
    }
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(Level::INFO)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(verbose))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to install log subscriber")
}

/// Ask for an output file stem; an empty answer keeps the default.
pub fn prompt_for_name<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<String> {
    write!(output, "Output file name [{}]: ", DEFAULT_OUTPUT_NAME)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(sanitize_name(&line))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Generate { output } => {
            let config = DoeConfig::default();
            config
                .to_file(&output)
                .with_context(|| format!("failed to write study to {}", output.display()))?;
            info!(
                "study '{}' written to {} ({} variables, {} configurations)",
                config.study_name,
                output.display(),
                config.variables.len(),
                config.n_configs
            );
        }

        Commands::List { study } => {
            let config = load_study(&study)?;
            println!("Study: {}", config.study_name);
            println!(
                "{} configurations, {} criterion, seed {}",
                config.n_configs,
                config.criterion,
                config
                    .seed
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!("\n{:<4} {:<18} {:>10} {:>10}", "#", "variable", "min", "max");
            for (i, var) in config.variables.iter().enumerate() {
                println!("{:<4} {:<18} {:>10} {:>10}", i, var.name, var.min, var.max);
            }
        }

        Commands::Validate { study } => {
            let config = load_study(&study)?;
            let bounds = config
                .validate()
                .with_context(|| format!("study {} is invalid", study.display()))?;
            info!("Study is valid");
            info!("  Variables: {}", bounds.dim());
            info!("  Configurations: {}", config.n_configs);
            info!("  Workers: {}", config.workers);
        }

        Commands::Run {
            study,
            configs,
            seed,
            criterion,
            workers,
            schema,
            output_dir,
            name,
            prompt,
            format,
            preview,
        } => {
            let mut config = match &study {
                Some(path) => load_study(path)?,
                None => DoeConfig::default(),
            };
            if let Some(n) = configs {
                config.n_configs = n;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(criterion) = criterion {
                config.criterion = criterion;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(schema) = schema {
                config.schema = schema;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let schema = config.schema;
            let output_dir = config.output_dir.clone();
            let runner = DoeRunner::new(config);
            let table = runner
                .run_with(|| ParamModel::new(schema))
                .context("design-space run failed")?;

            println!("{}", table.preview(preview));

            let name = if prompt {
                let stdin = io::stdin();
                prompt_for_name(stdin.lock(), io::stdout()).context("failed to read output name")?
            } else {
                sanitize_name(name.as_deref().unwrap_or(DEFAULT_OUTPUT_NAME))
            };

            let path = export_results(&table, &output_dir, &name, format.into())
                .context("failed to export results")?;
            println!("Results saved to: {}", path.display());
        }
    }

    Ok(())
}

fn load_study(path: &Path) -> Result<DoeConfig> {
    DoeConfig::from_file(path).with_context(|| format!("failed to load study from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn prompt_uses_answer_or_default() {
        let mut shown = Vec::new();
        let name = prompt_for_name(Cursor::new("wing sweep\n"), &mut shown).unwrap();
        assert_eq!(name, "wing_sweep");
        assert_eq!(
            String::from_utf8(shown).unwrap(),
            "Output file name [design_output]: "
        );

        let name = prompt_for_name(Cursor::new("\n"), Vec::new()).unwrap();
        assert_eq!(name, "design_output");
    }

    #[test]
    fn cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "uav_doe", "run", "--configs", "10", "--seed", "3", "--criterion", "cm", "--schema",
            "legacy", "--format", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                configs,
                seed,
                criterion,
                schema,
                format,
                study,
                ..
            } => {
                assert_eq!(configs, Some(10));
                assert_eq!(seed, Some(3));
                assert_eq!(criterion, Some(Criterion::CenterMaximin));
                assert_eq!(schema, Some(ParmSchema::Legacy));
                assert!(matches!(format, Format::Json));
                assert!(study.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn name_and_prompt_conflict() {
        assert!(Cli::try_parse_from(["uav_doe", "run", "--name", "x", "--prompt"]).is_err());
    }
}
