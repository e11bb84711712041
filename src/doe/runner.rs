/// Design-space runner: sample, build every configuration, score it, tabulate
use std::time::Instant;

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::bounds::{validate_bounds, DesignBounds};
use super::config::{DoeConfig, FlowConditions};
use super::error::{DoeError, DoeResult, MetricError, ValidationError};
use super::geometry::{build_fuselage, build_tail, build_wing};
use super::model::{GeometryState, ModelingTool};
use super::performance::{evaluate_metrics, PerformanceEvaluator, PlaceholderEvaluator};
use super::record::{ConfigurationRecord, DesignVector, Metrics, ResultTable};
use super::sampling::{Criterion, LhsSampler};
use crate::config::DESIGN_DIM;
use crate::profile_scope;

pub struct DoeRunner<E = PlaceholderEvaluator> {
    config: DoeConfig,
    evaluator: E,
}

impl DoeRunner {
    pub fn new(config: DoeConfig) -> Self {
        Self {
            config,
            evaluator: PlaceholderEvaluator,
        }
    }
}

impl<E: PerformanceEvaluator> DoeRunner<E> {
    pub fn with_evaluator(config: DoeConfig, evaluator: E) -> Self {
        Self { config, evaluator }
    }

    pub fn config(&self) -> &DoeConfig {
        &self.config
    }

    /// Validate the study and draw its design matrix.
    ///
    /// Nothing touches a modeling tool before this succeeds.
    pub fn sample(&self) -> DoeResult<Array2<f64>> {
        let bounds = self.config.validate()?;
        self.sample_bounds(&bounds)
    }

    fn sample_bounds(&self, bounds: &DesignBounds) -> DoeResult<Array2<f64>> {
        let sampler = LhsSampler::new(self.config.criterion, self.config.seed);
        info!(
            "sampling {} configurations over {} variables ({} criterion, seed {})",
            self.config.n_configs,
            bounds.dim(),
            self.config.criterion,
            self.config
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "entropy".to_string())
        );
        Ok(sampler.sample(bounds, self.config.n_configs)?)
    }

    /// Evaluate every sampled configuration against one modeling tool.
    pub fn run<M: ModelingTool + ?Sized>(&self, tool: &mut M) -> DoeResult<ResultTable> {
        let designs = designs_from_samples(&self.sample()?)?;
        let start = Instant::now();

        let flow = self.config.flow;
        let table: ResultTable = designs
            .iter()
            .enumerate()
            .map(|(i, design)| evaluate_configuration(&mut *tool, &self.evaluator, &flow, i, design))
            .collect();

        finish_run(&table, start);
        Ok(table)
    }
}

impl<E: PerformanceEvaluator + Sync> DoeRunner<E> {
    /// Evaluate rows on `config.workers` threads, one tool per worker.
    ///
    /// Sampling happens up front, so the table matches `run` for the same seed.
    pub fn run_parallel<M, F>(&self, factory: F) -> DoeResult<ResultTable>
    where
        M: ModelingTool,
        F: Fn() -> M + Sync + Send,
    {
        let designs = designs_from_samples(&self.sample()?)?;
        let workers = self.config.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| DoeError::WorkerPool(e.to_string()))?;

        info!("evaluating on {} workers", workers);
        let start = Instant::now();
        let flow = self.config.flow;
        let evaluator = &self.evaluator;

        let records: Vec<ConfigurationRecord> = pool.install(|| {
            designs
                .par_iter()
                .enumerate()
                .map_init(&factory, |tool, (i, design)| {
                    evaluate_configuration(tool, evaluator, &flow, i, design)
                })
                .collect()
        });

        let table: ResultTable = records.into_iter().collect();
        finish_run(&table, start);
        Ok(table)
    }

    /// `run` for a single worker, `run_parallel` otherwise.
    pub fn run_with<M, F>(&self, factory: F) -> DoeResult<ResultTable>
    where
        M: ModelingTool,
        F: Fn() -> M + Sync + Send,
    {
        if self.config.workers <= 1 {
            self.run(&mut factory())
        } else {
            self.run_parallel(factory)
        }
    }
}

/// Sample `n_configs` maximin configurations within `bounds` and evaluate each
/// one against `tool` with the placeholder scorers.
///
/// `bounds` must be 14 `[min, max]` rows and `flow` (default conditions when
/// `None`) must be physical; anything else fails before the tool is touched.
pub fn design_space<M, R>(
    tool: &mut M,
    n_configs: usize,
    bounds: &[R],
    seed: Option<u64>,
    flow: Option<FlowConditions>,
) -> DoeResult<ResultTable>
where
    M: ModelingTool + ?Sized,
    R: AsRef<[f64]>,
{
    let bounds = validate_bounds(bounds, DESIGN_DIM)?;
    let mut config = DoeConfig::with_bounds(String::from("design_space"), &bounds.pairs());
    config.n_configs = n_configs;
    config.seed = seed;
    config.criterion = Criterion::Maximin;
    if let Some(flow) = flow {
        config.flow = flow;
    }
    DoeRunner::new(config).run(tool)
}

/// Reset the model, build the three parts, finalize and score one row.
///
/// Never fails: every step's failure lands in the record's error trail.
pub fn evaluate_configuration<M, E>(
    tool: &mut M,
    evaluator: &E,
    flow: &FlowConditions,
    index: usize,
    design: &DesignVector,
) -> ConfigurationRecord
where
    M: ModelingTool + ?Sized,
    E: PerformanceEvaluator + ?Sized,
{
    let start = Instant::now();
    let mut errors: Vec<String> = Vec::new();

    {
        profile_scope!("reset_model");
        tool.reset_model();
    }

    {
        profile_scope!("build");
        if let Err(e) = build_wing(tool, &design.wing) {
            errors.push(format!("build_wing: {e}"));
        }
        if let Err(e) = build_tail(tool, &design.tail) {
            errors.push(format!("build_tail: {e}"));
        }
        if let Err(e) = build_fuselage(tool, &design.fuselage) {
            errors.push(format!("build_fuselage: {e}"));
        }
    }

    let finalized = {
        profile_scope!("finalize_model");
        match tool.update() {
            Ok(()) => true,
            Err(e) => {
                errors.push(format!("finalize_model: {e}"));
                false
            }
        }
    };

    // A failed finalize is already on the trail; score an empty snapshot then.
    let snapshot = match tool.geometry_state() {
        Ok(geometry) => Ok(geometry),
        Err(e) if !finalized => {
            debug!("[case {}] no geometry state after failed finalize: {}", index, e);
            Ok(GeometryState::default())
        }
        Err(e) => Err(MetricError::from(e)),
    };

    let metrics = {
        profile_scope!("metrics");
        let scored =
            snapshot.and_then(|geometry| evaluate_metrics(evaluator, &geometry, design, flow));
        match scored {
            Ok(metrics) => metrics,
            Err(e) => {
                errors.push(e.to_string());
                Metrics::undefined()
            }
        }
    };

    let error = errors.join("; ");
    let elapsed = start.elapsed().as_secs_f64();
    if error.is_empty() {
        debug!("[case {}] done in {:.3}s", index, elapsed);
    } else {
        warn!("[case {}] done in {:.3}s (errors: {})", index, elapsed, error);
    }

    ConfigurationRecord {
        index,
        design: *design,
        metrics,
        error,
    }
}

fn designs_from_samples(samples: &Array2<f64>) -> Result<Vec<DesignVector>, ValidationError> {
    samples
        .rows()
        .into_iter()
        .map(|row| {
            DesignVector::from_row(row).ok_or(ValidationError::Shape {
                expected_rows: DESIGN_DIM,
                rows: row.len(),
                cols: 1,
            })
        })
        .collect()
}

fn finish_run(table: &ResultTable, start: Instant) {
    let summary = table.summary();
    info!(
        "design space complete: {} rows x {} columns in {:.3}s ({} with errors, {} without metrics)",
        summary.rows,
        ResultTable::columns().len(),
        start.elapsed().as_secs_f64(),
        summary.rows_with_errors,
        summary.rows_without_metrics
    );

    #[cfg(feature = "profiling")]
    crate::PROFILER.lock().report_and_clear();
}
