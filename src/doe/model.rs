//! Modeling collaborator: the parametric geometry engine the builders drive.
//!
//! The runner only sees the [`ModelingTool`] trait. [`ParamModel`] is the
//! in-process implementation: a parameter database of geometries, each
//! exposing named parameters in named groups. Two parameter schemas are
//! available because the same logical quantity is not always published
//! under the same name or group.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// Opaque geometry handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeomId(pub u32);

/// Opaque parameter handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParmId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeomKind {
    Wing,
    Fuselage,
}

/// A parameter as published by the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParmInfo {
    pub id: ParmId,
    pub name: String,
    pub group: String,
}

/// Derived geometry of one component, valid after the last `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentState {
    pub geom: GeomId,
    pub kind: GeomKind,
    /// Planform area for surfaces, frontal area for bodies
    pub reference_area: f64,
    /// Span for surfaces, overall length for bodies
    pub reference_length: f64,
    /// Area over span for surfaces, maximum diameter for bodies
    pub mean_chord: f64,
    pub wetted_area: f64,
}

/// Snapshot of the finalized model handed to the metric functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryState {
    pub components: Vec<ComponentState>,
}

impl GeometryState {
    pub fn total_wetted_area(&self) -> f64 {
        self.components.iter().map(|c| c.wetted_area).sum()
    }

    /// Planform area of the first lifting surface, if any.
    pub fn main_wing_area(&self) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.kind == GeomKind::Wing)
            .map(|c| c.reference_area)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Capabilities the sampling loop needs from a geometry engine.
pub trait ModelingTool {
    /// Remove every geometry. Idempotent.
    fn reset_model(&mut self);

    fn add_geom(&mut self, kind: GeomKind) -> Result<GeomId, ModelError>;

    /// Every parameter of `geom`, with its name and group.
    fn geom_parms(&self, geom: GeomId) -> Result<Vec<ParmInfo>, ModelError>;

    /// Set a parameter and return the value the tool stored.
    fn set_parm_val(&mut self, parm: ParmId, value: f64) -> Result<f64, ModelError>;

    /// Propagate parameter changes into derived geometry.
    fn update(&mut self) -> Result<(), ModelError>;

    fn geometry_state(&self) -> Result<GeometryState, ModelError>;
}

/// Naming scheme for the parameters a [`ParamModel`] publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParmSchema {
    /// `Aspect`/`Taper`/`Area` in `WingGeom`, section angles in `XSec_1`,
    /// fuselage lengths in `FuselageGeom`
    #[default]
    Current,
    /// `AR`/`TRat`/`TotalSpan` (no area), section angles in `XSec_0`,
    /// fuselage lengths spread over `XSec_*` groups
    Legacy,
}

impl fmt::Display for ParmSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParmSchema::Current => f.write_str("current"),
            ParmSchema::Legacy => f.write_str("legacy"),
        }
    }
}

impl FromStr for ParmSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(ParmSchema::Current),
            "legacy" => Ok(ParmSchema::Legacy),
            other => Err(format!("unknown parameter schema '{other}' (expected current or legacy)")),
        }
    }
}

/// Physical meaning of a stored parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    AspectRatio,
    Taper,
    Area,
    Span,
    Sweep,
    Dihedral,
    ForeLength,
    MidLength,
    AftLength,
    Diameter,
}

/// (role, name, group, default, min, max)
type ParmSpec = (Role, &'static str, &'static str, f64, f64, f64);

const CURRENT_WING: &[ParmSpec] = &[
    (Role::AspectRatio, "Aspect", "WingGeom", 6.0, 0.0, 100.0),
    (Role::Taper, "Taper", "WingGeom", 1.0, 0.0, 10.0),
    (Role::Area, "Area", "WingGeom", 10.0, 0.0, 1.0e6),
    (Role::Sweep, "Sweep", "XSec_1", 0.0, -85.0, 85.0),
    (Role::Dihedral, "Dihedral", "XSec_1", 0.0, -90.0, 90.0),
];

const LEGACY_WING: &[ParmSpec] = &[
    (Role::AspectRatio, "AR", "WingGeom", 6.0, 0.0, 100.0),
    (Role::Taper, "TRat", "WingGeom", 1.0, 0.0, 10.0),
    (Role::Span, "TotalSpan", "WingGeom", 7.745_966_692_414_834, 0.0, 1.0e4),
    (Role::Sweep, "SweepAng", "XSec_0", 0.0, -85.0, 85.0),
    (Role::Dihedral, "Dihed", "XSec_0", 0.0, -90.0, 90.0),
];

const CURRENT_FUSELAGE: &[ParmSpec] = &[
    (Role::ForeLength, "Length_Fore", "FuselageGeom", 1.0, 0.0, 1.0e3),
    (Role::MidLength, "Length_Mid", "FuselageGeom", 2.0, 0.0, 1.0e3),
    (Role::AftLength, "Length_Aft", "FuselageGeom", 1.0, 0.0, 1.0e3),
    (Role::Diameter, "Diameter", "FuselageGeom", 0.5, 0.0, 1.0e2),
];

const LEGACY_FUSELAGE: &[ParmSpec] = &[
    (Role::ForeLength, "Len_Fore", "XSec_0", 1.0, 0.0, 1.0e3),
    (Role::MidLength, "Len_Mid", "XSec_1", 2.0, 0.0, 1.0e3),
    (Role::AftLength, "Len_Aft", "XSec_2", 1.0, 0.0, 1.0e3),
    (Role::Diameter, "MaxDiameter", "XSec_1", 0.5, 0.0, 1.0e2),
];

#[derive(Debug, Clone)]
struct Parm {
    id: ParmId,
    role: Role,
    name: &'static str,
    group: &'static str,
    value: f64,
    min: f64,
    max: f64,
}

#[derive(Debug, Clone)]
struct Geom {
    id: GeomId,
    kind: GeomKind,
    parms: Vec<Parm>,
}

impl Geom {
    fn value(&self, role: Role) -> Option<f64> {
        self.parms.iter().find(|p| p.role == role).map(|p| p.value)
    }

    fn derive(&self) -> ComponentState {
        match self.kind {
            GeomKind::Wing => {
                let aspect = self.value(Role::AspectRatio).unwrap_or(0.0);
                let (area, span) = match (self.value(Role::Area), self.value(Role::Span)) {
                    (Some(area), _) => (area, (aspect * area).max(0.0).sqrt()),
                    (None, Some(span)) if aspect > 0.0 => (span * span / aspect, span),
                    (None, Some(span)) => (0.0, span),
                    (None, None) => (0.0, 0.0),
                };
                ComponentState {
                    geom: self.id,
                    kind: self.kind,
                    reference_area: area,
                    reference_length: span,
                    mean_chord: if span > 0.0 { area / span } else { 0.0 },
                    // both sides of a thin surface
                    wetted_area: 2.0 * area,
                }
            }
            GeomKind::Fuselage => {
                let fore = self.value(Role::ForeLength).unwrap_or(0.0);
                let mid = self.value(Role::MidLength).unwrap_or(0.0);
                let aft = self.value(Role::AftLength).unwrap_or(0.0);
                let diameter = self.value(Role::Diameter).unwrap_or(0.0);
                let radius = 0.5 * diameter;
                let cone = |h: f64| PI * radius * (h * h + radius * radius).sqrt();
                ComponentState {
                    geom: self.id,
                    kind: self.kind,
                    reference_area: PI * radius * radius,
                    reference_length: fore + mid + aft,
                    mean_chord: diameter,
                    wetted_area: PI * diameter * mid + cone(fore) + cone(aft),
                }
            }
        }
    }
}

/// In-process parametric model.
#[derive(Debug, Clone, Default)]
pub struct ParamModel {
    schema: ParmSchema,
    geoms: Vec<Geom>,
    parm_index: HashMap<ParmId, (usize, usize)>,
    next_geom: u32,
    next_parm: u64,
    state: GeometryState,
    dirty: bool,
}

impl ParamModel {
    pub fn new(schema: ParmSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn schema(&self) -> ParmSchema {
        self.schema
    }

    pub fn geom_count(&self) -> usize {
        self.geoms.len()
    }

    pub fn geom_kinds(&self) -> Vec<GeomKind> {
        self.geoms.iter().map(|g| g.kind).collect()
    }

    /// Current value of the parameter `name` in `group` of `geom`.
    pub fn parm_value(&self, geom: GeomId, group: &str, name: &str) -> Option<f64> {
        self.geoms
            .iter()
            .find(|g| g.id == geom)?
            .parms
            .iter()
            .find(|p| p.group == group && p.name == name)
            .map(|p| p.value)
    }

    /// True when parameters changed since the last `update`.
    pub fn needs_update(&self) -> bool {
        self.dirty
    }

    fn specs(&self, kind: GeomKind) -> &'static [ParmSpec] {
        match (self.schema, kind) {
            (ParmSchema::Current, GeomKind::Wing) => CURRENT_WING,
            (ParmSchema::Legacy, GeomKind::Wing) => LEGACY_WING,
            (ParmSchema::Current, GeomKind::Fuselage) => CURRENT_FUSELAGE,
            (ParmSchema::Legacy, GeomKind::Fuselage) => LEGACY_FUSELAGE,
        }
    }
}

impl ModelingTool for ParamModel {
    fn reset_model(&mut self) {
        self.geoms.clear();
        self.parm_index.clear();
        self.state = GeometryState::default();
        self.dirty = false;
    }

    fn add_geom(&mut self, kind: GeomKind) -> Result<GeomId, ModelError> {
        let id = GeomId(self.next_geom);
        self.next_geom += 1;
        let geom_slot = self.geoms.len();

        let mut parms = Vec::new();
        for (slot, &(role, name, group, value, min, max)) in self.specs(kind).iter().enumerate() {
            let parm_id = ParmId(self.next_parm);
            self.next_parm += 1;
            self.parm_index.insert(parm_id, (geom_slot, slot));
            parms.push(Parm {
                id: parm_id,
                role,
                name,
                group,
                value,
                min,
                max,
            });
        }

        self.geoms.push(Geom { id, kind, parms });
        self.dirty = true;
        Ok(id)
    }

    fn geom_parms(&self, geom: GeomId) -> Result<Vec<ParmInfo>, ModelError> {
        let geom = self
            .geoms
            .iter()
            .find(|g| g.id == geom)
            .ok_or(ModelError::UnknownGeom(geom.0))?;
        Ok(geom
            .parms
            .iter()
            .map(|p| ParmInfo {
                id: p.id,
                name: p.name.to_string(),
                group: p.group.to_string(),
            })
            .collect())
    }

    fn set_parm_val(&mut self, parm: ParmId, value: f64) -> Result<f64, ModelError> {
        let &(g, p) = self
            .parm_index
            .get(&parm)
            .ok_or(ModelError::UnknownParm(parm.0))?;
        let parm = &mut self.geoms[g].parms[p];
        if !value.is_finite() || value < parm.min || value > parm.max {
            return Err(ModelError::RejectedValue {
                name: parm.name.to_string(),
                group: parm.group.to_string(),
                value,
            });
        }
        parm.value = value;
        self.dirty = true;
        Ok(value)
    }

    fn update(&mut self) -> Result<(), ModelError> {
        self.state = GeometryState {
            components: self.geoms.iter().map(Geom::derive).collect(),
        };
        self.dirty = false;
        Ok(())
    }

    fn geometry_state(&self) -> Result<GeometryState, ModelError> {
        if self.dirty {
            return Err(ModelError::Tool(
                "model has pending parameter changes; update it first".to_string(),
            ));
        }
        Ok(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parm_id(model: &ParamModel, geom: GeomId, group: &str, name: &str) -> ParmId {
        model
            .geom_parms(geom)
            .unwrap()
            .into_iter()
            .find(|p| p.group == group && p.name == name)
            .map(|p| p.id)
            .unwrap()
    }

    #[test]
    fn reset_clears_every_geometry() {
        let mut model = ParamModel::new(ParmSchema::Current);
        model.add_geom(GeomKind::Wing).unwrap();
        model.add_geom(GeomKind::Fuselage).unwrap();
        model.update().unwrap();
        assert_eq!(model.geom_count(), 2);

        model.reset_model();
        model.reset_model();
        assert_eq!(model.geom_count(), 0);
        assert!(model.geometry_state().unwrap().is_empty());
    }

    #[test]
    fn schemas_publish_different_names() {
        let mut current = ParamModel::new(ParmSchema::Current);
        let mut legacy = ParamModel::new(ParmSchema::Legacy);
        let a = current.add_geom(GeomKind::Wing).unwrap();
        let b = legacy.add_geom(GeomKind::Wing).unwrap();

        assert!(current.parm_value(a, "WingGeom", "Area").is_some());
        assert!(legacy.parm_value(b, "WingGeom", "Area").is_none());
        assert!(legacy.parm_value(b, "WingGeom", "TotalSpan").is_some());
        assert!(legacy.parm_value(b, "XSec_0", "Dihed").is_some());
    }

    #[test]
    fn wing_span_is_derived_on_update() {
        let mut model = ParamModel::new(ParmSchema::Current);
        let wing = model.add_geom(GeomKind::Wing).unwrap();
        let aspect = parm_id(&model, wing, "WingGeom", "Aspect");
        let area = parm_id(&model, wing, "WingGeom", "Area");
        model.set_parm_val(aspect, 9.0).unwrap();
        model.set_parm_val(area, 4.0).unwrap();

        assert!(model.geometry_state().is_err(), "stale state must not be served");
        model.update().unwrap();

        let state = model.geometry_state().unwrap();
        assert_relative_eq!(state.components[0].reference_length, 6.0);
        assert_relative_eq!(state.components[0].mean_chord, 4.0 / 6.0);
        assert_eq!(state.main_wing_area(), Some(4.0));
    }

    #[test]
    fn legacy_wing_area_comes_from_span() {
        let mut model = ParamModel::new(ParmSchema::Legacy);
        let wing = model.add_geom(GeomKind::Wing).unwrap();
        let aspect = parm_id(&model, wing, "WingGeom", "AR");
        let span = parm_id(&model, wing, "WingGeom", "TotalSpan");
        model.set_parm_val(aspect, 8.0).unwrap();
        model.set_parm_val(span, 4.0).unwrap();
        model.update().unwrap();

        assert_relative_eq!(model.geometry_state().unwrap().components[0].reference_area, 2.0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut model = ParamModel::new(ParmSchema::Current);
        let wing = model.add_geom(GeomKind::Wing).unwrap();
        let sweep = parm_id(&model, wing, "XSec_1", "Sweep");

        assert!(matches!(
            model.set_parm_val(sweep, 120.0),
            Err(ModelError::RejectedValue { .. })
        ));
        assert!(model.set_parm_val(sweep, f64::NAN).is_err());
        assert_eq!(model.set_parm_val(sweep, 15.0), Ok(15.0));
        assert_eq!(
            model.set_parm_val(ParmId(9_999), 1.0),
            Err(ModelError::UnknownParm(9_999))
        );
    }

    #[test]
    fn fuselage_wetted_area() {
        let mut model = ParamModel::new(ParmSchema::Current);
        model.add_geom(GeomKind::Fuselage).unwrap();
        model.update().unwrap();
        let body = &model.geometry_state().unwrap().components[0];
        // defaults: fore 1, mid 2, aft 1, diameter 0.5
        let cone = PI * 0.25 * (1.0f64 + 0.0625).sqrt();
        assert_relative_eq!(body.wetted_area, PI * 0.5 * 2.0 + 2.0 * cone, epsilon = 1e-12);
        assert_relative_eq!(body.reference_length, 4.0);
    }
}
