//! Geometry builders.
//!
//! Parameter names drift between tool versions, so every logical parameter
//! is a prioritized list of candidate names searched in a list of groups.
//! The first candidate that exists is set. A builder sets everything it can
//! resolve and then fails with the list of parameters it could not place.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::error::{GeometryError, ModelError};
use super::model::{GeomId, GeomKind, ModelingTool, ParmId};
use super::record::{FuselageParams, SurfaceParams};

/// A logical parameter and the names it may be published under.
#[derive(Debug, Clone, Copy)]
pub struct ParmAlias {
    pub label: &'static str,
    pub names: &'static [&'static str],
}

pub const ASPECT_RATIO: ParmAlias = ParmAlias {
    label: "aspect ratio",
    names: &["AR", "Aspect", "AspectRatio"],
};
pub const TAPER_RATIO: ParmAlias = ParmAlias {
    label: "taper ratio",
    names: &["TRat", "Taper", "TaperRatio"],
};
pub const AREA: ParmAlias = ParmAlias {
    label: "area",
    names: &["Area", "PlanformArea", "Sref", "SRef"],
};
pub const SPAN: ParmAlias = ParmAlias {
    label: "span",
    names: &["Span", "TotalSpan", "BRef", "Bref"],
};
pub const SWEEP: ParmAlias = ParmAlias {
    label: "sweep",
    names: &["Sweep", "SweepAng", "SweepDeg"],
};
pub const DIHEDRAL: ParmAlias = ParmAlias {
    label: "dihedral",
    names: &["Dihedral", "Dihed"],
};
pub const FORE_LENGTH: ParmAlias = ParmAlias {
    label: "fore length",
    names: &["Length_Fore", "LengthFore", "Len_Fore", "Fore_Length"],
};
pub const MID_LENGTH: ParmAlias = ParmAlias {
    label: "mid length",
    names: &["Length_Mid", "LengthMid", "Len_Mid", "Mid_Length"],
};
pub const AFT_LENGTH: ParmAlias = ParmAlias {
    label: "aft length",
    names: &["Length_Aft", "LengthAft", "Len_Aft", "Aft_Length"],
};
pub const DIAMETER: ParmAlias = ParmAlias {
    label: "diameter",
    names: &["Diameter", "Dia", "MaxDiameter", "XSec_Diameter"],
};

const SURFACE_GROUP: &str = "WingGeom";
const FUSELAGE_GROUPS: &[&str] = &["FuselageGeom", "XSec_0", "XSec_1", "XSec_2"];

/// Parameters of one geometry indexed by group, then by name.
#[derive(Debug, Default)]
pub struct ParmIndex {
    groups: BTreeMap<String, HashMap<String, ParmId>>,
}

impl ParmIndex {
    pub fn load<M: ModelingTool + ?Sized>(tool: &M, geom: GeomId) -> Result<Self, ModelError> {
        let mut groups: BTreeMap<String, HashMap<String, ParmId>> = BTreeMap::new();
        for parm in tool.geom_parms(geom)? {
            groups.entry(parm.group).or_default().insert(parm.name, parm.id);
        }
        Ok(Self { groups })
    }

    /// First candidate name present in the first group that has one.
    pub fn find(&self, alias: &ParmAlias, groups: &[&str]) -> Option<ParmId> {
        groups.iter().find_map(|group| {
            let parms = self.groups.get(*group)?;
            alias.names.iter().find_map(|name| parms.get(*name).copied())
        })
    }

    /// Lowest-numbered `XSec_<n>` group.
    pub fn first_xsec_group(&self) -> Option<&str> {
        self.groups
            .keys()
            .filter_map(|g| {
                let n: u32 = g.strip_prefix("XSec_")?.parse().ok()?;
                Some((n, g.as_str()))
            })
            .min_by_key(|(n, _)| *n)
            .map(|(_, g)| g)
    }
}

/// Sets resolved parameters and remembers the ones that were not found.
struct ParmSetter<'a, M: ModelingTool + ?Sized> {
    tool: &'a mut M,
    index: ParmIndex,
    unresolved: Vec<String>,
}

impl<'a, M: ModelingTool + ?Sized> ParmSetter<'a, M> {
    fn new(tool: &'a mut M, geom: GeomId) -> Result<Self, ModelError> {
        let index = ParmIndex::load(&*tool, geom)?;
        Ok(Self {
            tool,
            index,
            unresolved: Vec::new(),
        })
    }

    /// Returns `Ok(false)` when no candidate exists; a rejected value is an error.
    fn try_set(&mut self, alias: &ParmAlias, groups: &[&str], value: f64) -> Result<bool, ModelError> {
        match self.index.find(alias, groups) {
            Some(parm) => {
                self.tool.set_parm_val(parm, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set(&mut self, alias: &ParmAlias, groups: &[&str], value: f64) -> Result<(), ModelError> {
        if !self.try_set(alias, groups, value)? {
            debug!("no candidate for {} in {:?}", alias.label, groups);
            self.unresolved.push(alias.label.to_string());
        }
        Ok(())
    }

    fn finish(self, geom: GeomId) -> Result<GeomId, GeometryError> {
        if self.unresolved.is_empty() {
            Ok(geom)
        } else {
            Err(GeometryError::Unresolved(self.unresolved))
        }
    }
}

/// Add a lifting surface and set its planform.
///
/// When no area parameter exists the span `sqrt(AR * S)` is set instead.
/// Sweep and dihedral go to the first cross-section group.
pub fn build_surface<M: ModelingTool + ?Sized>(
    tool: &mut M,
    params: &SurfaceParams,
) -> Result<GeomId, GeometryError> {
    let geom = tool.add_geom(GeomKind::Wing)?;
    let mut setter = ParmSetter::new(tool, geom)?;

    setter.set(&ASPECT_RATIO, &[SURFACE_GROUP], params.aspect_ratio)?;
    setter.set(&TAPER_RATIO, &[SURFACE_GROUP], params.taper_ratio)?;

    if !setter.try_set(&AREA, &[SURFACE_GROUP], params.area)? {
        let span = (params.aspect_ratio * params.area).sqrt();
        if !setter.try_set(&SPAN, &[SURFACE_GROUP], span)? {
            setter.unresolved.push(AREA.label.to_string());
        }
    }

    match setter.index.first_xsec_group().map(str::to_owned) {
        Some(xsec) => {
            setter.set(&SWEEP, &[xsec.as_str()], params.sweep_deg)?;
            setter.set(&DIHEDRAL, &[xsec.as_str()], params.dihedral_deg)?;
        }
        None => {
            setter.unresolved.push(SWEEP.label.to_string());
            setter.unresolved.push(DIHEDRAL.label.to_string());
        }
    }

    setter.finish(geom)
}

pub fn build_wing<M: ModelingTool + ?Sized>(
    tool: &mut M,
    params: &SurfaceParams,
) -> Result<GeomId, GeometryError> {
    build_surface(tool, params)
}

/// The horizontal tail is modeled as a second lifting surface.
pub fn build_tail<M: ModelingTool + ?Sized>(
    tool: &mut M,
    params: &SurfaceParams,
) -> Result<GeomId, GeometryError> {
    build_surface(tool, params)
}

pub fn build_fuselage<M: ModelingTool + ?Sized>(
    tool: &mut M,
    params: &FuselageParams,
) -> Result<GeomId, GeometryError> {
    let geom = tool.add_geom(GeomKind::Fuselage)?;
    let mut setter = ParmSetter::new(tool, geom)?;

    setter.set(&FORE_LENGTH, FUSELAGE_GROUPS, params.fore_length)?;
    setter.set(&MID_LENGTH, FUSELAGE_GROUPS, params.mid_length)?;
    setter.set(&AFT_LENGTH, FUSELAGE_GROUPS, params.aft_length)?;
    setter.set(&DIAMETER, FUSELAGE_GROUPS, params.diameter)?;

    setter.finish(geom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doe::model::{GeometryState, ParamModel, ParmInfo, ParmSchema};
    use approx::assert_relative_eq;

    fn wing() -> SurfaceParams {
        SurfaceParams {
            aspect_ratio: 9.0,
            taper_ratio: 0.5,
            sweep_deg: 12.0,
            dihedral_deg: 3.0,
            area: 1.6,
        }
    }

    fn fuselage() -> FuselageParams {
        FuselageParams {
            fore_length: 0.5,
            mid_length: 1.8,
            aft_length: 1.1,
            diameter: 0.2,
        }
    }

    #[test]
    fn current_schema_sets_every_parameter() {
        let mut model = ParamModel::new(ParmSchema::Current);
        let id = build_wing(&mut model, &wing()).unwrap();

        assert_eq!(model.parm_value(id, "WingGeom", "Aspect"), Some(9.0));
        assert_eq!(model.parm_value(id, "WingGeom", "Taper"), Some(0.5));
        assert_eq!(model.parm_value(id, "WingGeom", "Area"), Some(1.6));
        assert_eq!(model.parm_value(id, "XSec_1", "Sweep"), Some(12.0));
        assert_eq!(model.parm_value(id, "XSec_1", "Dihedral"), Some(3.0));
    }

    #[test]
    fn legacy_schema_falls_back_to_span() {
        let mut model = ParamModel::new(ParmSchema::Legacy);
        let id = build_tail(&mut model, &wing()).unwrap();

        assert_eq!(model.parm_value(id, "WingGeom", "AR"), Some(9.0));
        let span = model.parm_value(id, "WingGeom", "TotalSpan").unwrap();
        assert_relative_eq!(span, (9.0f64 * 1.6).sqrt());
        assert_eq!(model.parm_value(id, "XSec_0", "Dihed"), Some(3.0));

        model.update().unwrap();
        let state = model.geometry_state().unwrap();
        assert_relative_eq!(state.components[0].reference_area, 1.6, epsilon = 1e-12);
    }

    #[test]
    fn fuselage_searches_across_groups() {
        for schema in [ParmSchema::Current, ParmSchema::Legacy] {
            let mut model = ParamModel::new(schema);
            build_fuselage(&mut model, &fuselage()).unwrap();
            model.update().unwrap();
            let body = &model.geometry_state().unwrap().components[0];
            assert_relative_eq!(body.reference_length, 3.4, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejected_value_fails_the_builder() {
        let mut model = ParamModel::new(ParmSchema::Current);
        let mut params = wing();
        params.sweep_deg = 95.0;
        let err = build_wing(&mut model, &params).unwrap_err();
        assert!(matches!(err, GeometryError::Model(ModelError::RejectedValue { .. })));
    }

    /// Publishes only an aspect ratio, so most aliases are exhausted.
    struct SparseTool {
        inner: ParamModel,
    }

    impl ModelingTool for SparseTool {
        fn reset_model(&mut self) {
            self.inner.reset_model();
        }
        fn add_geom(&mut self, kind: GeomKind) -> Result<GeomId, ModelError> {
            self.inner.add_geom(kind)
        }
        fn geom_parms(&self, geom: GeomId) -> Result<Vec<ParmInfo>, ModelError> {
            Ok(self
                .inner
                .geom_parms(geom)?
                .into_iter()
                .filter(|p| p.name == "Aspect")
                .collect())
        }
        fn set_parm_val(&mut self, parm: ParmId, value: f64) -> Result<f64, ModelError> {
            self.inner.set_parm_val(parm, value)
        }
        fn update(&mut self) -> Result<(), ModelError> {
            self.inner.update()
        }
        fn geometry_state(&self) -> Result<GeometryState, ModelError> {
            self.inner.geometry_state()
        }
    }

    #[test]
    fn exhausted_aliases_are_all_reported() {
        let mut tool = SparseTool {
            inner: ParamModel::new(ParmSchema::Current),
        };
        let err = build_wing(&mut tool, &wing()).unwrap_err();
        assert_eq!(
            err,
            GeometryError::Unresolved(vec![
                "taper ratio".into(),
                "area".into(),
                "sweep".into(),
                "dihedral".into(),
            ])
        );
        // the resolvable parameter was still set
        assert_eq!(tool.inner.parm_value(GeomId(0), "WingGeom", "Aspect"), Some(9.0));
    }

    #[test]
    fn xsec_groups_sort_numerically() {
        let mut index = ParmIndex::default();
        for group in ["XSec_10", "XSec_2", "WingGeom"] {
            index.groups.entry(group.to_string()).or_default();
        }
        assert_eq!(index.first_xsec_group(), Some("XSec_2"));
    }
}
