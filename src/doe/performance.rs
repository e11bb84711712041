/// Performance scoring for one finalized configuration.
///
/// The physics models are not implemented yet; the placeholder functions
/// return fixed values so the sampling pipeline can be exercised end to end.
/// Real models plug in through `PerformanceEvaluator` without touching the
/// runner.
use super::config::FlowConditions;
use super::error::MetricError;
use super::model::GeometryState;
use super::record::{DesignVector, Metrics};
use crate::config::{
    EMPTY_WEIGHT_FACTOR, PLACEHOLDER_CD, PLACEHOLDER_CL, PLACEHOLDER_CM, PLACEHOLDER_RCS_DBSM,
    PLACEHOLDER_STRUCTURAL_WEIGHT,
};

/// Lift, drag and pitching-moment coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroCoefficients {
    pub cl: f64,
    pub cd: f64,
    pub cm: f64,
}

/// The four scoring functions, called in data-dependency order.
pub trait PerformanceEvaluator {
    fn aerodynamics(
        &self,
        geometry: &GeometryState,
        flow: &FlowConditions,
    ) -> Result<AeroCoefficients, MetricError>;

    fn structural_weight(
        &self,
        geometry: &GeometryState,
        aero: &AeroCoefficients,
    ) -> Result<f64, MetricError>;

    /// Radar cross-section in dBsm.
    fn radar_cross_section(&self, geometry: &GeometryState) -> Result<f64, MetricError>;

    fn empty_weight(
        &self,
        design: &DesignVector,
        structural_weight: f64,
        cl: f64,
        cd: f64,
    ) -> Result<f64, MetricError>;
}

/// Scores every configuration with the placeholder functions below.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEvaluator;

impl PerformanceEvaluator for PlaceholderEvaluator {
    fn aerodynamics(
        &self,
        geometry: &GeometryState,
        flow: &FlowConditions,
    ) -> Result<AeroCoefficients, MetricError> {
        Ok(aerodynamics_performance(geometry, flow))
    }

    fn structural_weight(
        &self,
        geometry: &GeometryState,
        aero: &AeroCoefficients,
    ) -> Result<f64, MetricError> {
        Ok(structural_performance(geometry, aero))
    }

    fn radar_cross_section(&self, geometry: &GeometryState) -> Result<f64, MetricError> {
        Ok(rcs_performance(geometry))
    }

    fn empty_weight(
        &self,
        design: &DesignVector,
        structural_weight: f64,
        cl: f64,
        cd: f64,
    ) -> Result<f64, MetricError> {
        Ok(weights(design, structural_weight, cl, cd))
    }
}

pub fn aerodynamics_performance(_geometry: &GeometryState, _flow: &FlowConditions) -> AeroCoefficients {
    AeroCoefficients {
        cl: PLACEHOLDER_CL,
        cd: PLACEHOLDER_CD,
        cm: PLACEHOLDER_CM,
    }
}

pub fn structural_performance(_geometry: &GeometryState, _aero: &AeroCoefficients) -> f64 {
    PLACEHOLDER_STRUCTURAL_WEIGHT
}

pub fn rcs_performance(_geometry: &GeometryState) -> f64 {
    PLACEHOLDER_RCS_DBSM
}

pub fn weights(_design: &DesignVector, structural_weight: f64, _cl: f64, _cd: f64) -> f64 {
    EMPTY_WEIGHT_FACTOR * structural_weight
}

/// Run the whole chain: aerodynamics -> structure -> RCS -> weights.
///
/// The first failure aborts the chain.
pub fn evaluate_metrics<E: PerformanceEvaluator + ?Sized>(
    evaluator: &E,
    geometry: &GeometryState,
    design: &DesignVector,
    flow: &FlowConditions,
) -> Result<Metrics, MetricError> {
    let aero = evaluator.aerodynamics(geometry, flow)?;
    let structural_weight = evaluator.structural_weight(geometry, &aero)?;
    let sigma_dbsm = evaluator.radar_cross_section(geometry)?;
    let empty_weight = evaluator.empty_weight(design, structural_weight, aero.cl, aero.cd)?;

    Ok(Metrics {
        cl: aero.cl,
        cd: aero.cd,
        cm: aero.cm,
        sigma_dbsm,
        structural_weight,
        empty_weight,
    })
}
