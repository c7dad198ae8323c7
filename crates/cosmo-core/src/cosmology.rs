//! Cosmology instances
//!
//! A [`Cosmology`] is an immutable value: a class, an optional name, one
//! value per class parameter (stored in the parameter's declared unit) and
//! ordered metadata. Instances come from a [`CosmologyBuilder`], either fresh
//! or derived from an existing instance via [`Cosmology::clone_with`].

use std::fmt;

use cosmo_units::UnitResolver;
use tracing::trace;

use crate::class::{CosmologyClass, Flatness};
use crate::error::CoreError;
use crate::meta::Meta;
use crate::parameter::ParamValue;

// Ok0 below this magnitude counts as flat.
const FLATNESS_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Cosmology {
    class: &'static CosmologyClass,
    name: Option<String>,
    values: Vec<ParamValue>,
    meta: Meta,
}

impl Cosmology {
    pub fn builder(class: &'static CosmologyClass) -> CosmologyBuilder {
        CosmologyBuilder::new(class)
    }

    pub fn class(&self) -> &'static CosmologyClass {
        self.class
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.class.param_index(name).map(|i| &self.values[i])
    }

    /// `(name, value)` pairs in constructor order.
    pub fn params(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.class
            .params
            .iter()
            .map(|p| p.name)
            .zip(self.values.iter())
    }

    pub fn is_flat(&self) -> bool {
        match self.class.flatness {
            Flatness::Always => true,
            Flatness::FromCurvature => {
                let om0 = self.param("Om0").and_then(ParamValue::as_f64).unwrap_or(0.0);
                let ode0 = self.param("Ode0").and_then(ParamValue::as_f64).unwrap_or(0.0);
                (1.0 - om0 - ode0).abs() < FLATNESS_TOLERANCE
            }
        }
    }

    /// Same class and same parameter values. Name and metadata are ignored.
    pub fn is_equivalent(&self, other: &Cosmology) -> bool {
        self.class == other.class && self.values == other.values
    }

    /// Start a modified copy. Building with no changes returns an identical
    /// instance; otherwise the name becomes `"<name> (modified)"` unless a new
    /// one is set, and metadata is merged with new keys preferred.
    pub fn clone_with(&self) -> CosmologyBuilder {
        CosmologyBuilder {
            origin: Some(self.clone()),
            ..CosmologyBuilder::new(self.class)
        }
    }
}

/// Equal when equivalent and identically named; metadata does not count.
impl PartialEq for Cosmology {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other) && self.name == other.name
    }
}

impl fmt::Display for Cosmology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class.name)?;
        if let Some(name) = &self.name {
            write!(f, "name=\"{}\", ", name)?;
        }
        let params = self
            .params()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{})", params)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects constructor arguments and validates them against the class.
#[derive(Debug, Clone)]
pub struct CosmologyBuilder {
    class: &'static CosmologyClass,
    name: Option<Option<String>>,
    args: Vec<(String, ParamValue)>,
    meta: Option<Meta>,
    origin: Option<Cosmology>,
}

impl CosmologyBuilder {
    pub fn new(class: &'static CosmologyClass) -> Self {
        Self {
            class,
            name: None,
            args: Vec::new(),
            meta: None,
            origin: None,
        }
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.name_opt(Some(name.into()))
    }

    /// Set the name explicitly, including to none.
    pub fn name_opt(mut self, name: Option<String>) -> Self {
        self.name = Some(name);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    pub fn meta(mut self, key: impl Into<serde_yaml::Value>, value: impl Into<serde_yaml::Value>) -> Self {
        self.meta.get_or_insert_with(Meta::new).insert(key, value);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(match self.meta.take() {
            Some(existing) => existing.merged(&meta),
            None => meta,
        });
        self
    }

    pub fn build(self, units: &dyn UnitResolver) -> Result<Cosmology, CoreError> {
        let class = self.class;

        if let Some(origin) = &self.origin {
            if self.args.is_empty() && self.meta.is_none() && self.name.is_none() {
                return Ok(origin.clone());
            }
        }

        // a later argument for the same parameter wins
        let mut supplied: Vec<Option<ParamValue>> = vec![None; class.params.len()];
        for (name, value) in self.args {
            let index = class
                .param_index(&name)
                .ok_or_else(|| CoreError::UnexpectedField {
                    class: class.name.to_string(),
                    field: name.clone(),
                })?;
            supplied[index] = Some(value);
        }

        let mut values = Vec::with_capacity(class.params.len());
        for (def, value) in class.params.iter().zip(supplied) {
            let inherited = self
                .origin
                .as_ref()
                .map(|o| o.values[values.len()].clone());
            let value = match value.or(inherited) {
                Some(v) => def.coerce(v, units)?,
                None => def.default_value()?.ok_or_else(|| CoreError::MissingField {
                    class: class.name.to_string(),
                    field: def.name.to_string(),
                })?,
            };
            values.push(value);
        }

        let (name, meta) = match self.origin {
            Some(origin) => {
                let name = self.name.unwrap_or_else(|| {
                    origin.name.as_ref().map(|n| format!("{} (modified)", n))
                });
                let meta = match self.meta {
                    Some(m) => origin.meta.merged(&m),
                    None => origin.meta,
                };
                (name, meta)
            }
            None => (self.name.flatten(), self.meta.unwrap_or_default()),
        };

        trace!(class = class.name, name = ?name, "built cosmology");
        Ok(Cosmology {
            class,
            name,
            values,
            meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{FLAT_LAMBDA_CDM, LAMBDA_CDM, W_CDM};
    use cosmo_units::{Quantity, UnitRegistry};
    use pretty_assertions::assert_eq;

    fn h0(v: f64) -> Quantity {
        Quantity::parse(v, "km / (Mpc s)").unwrap()
    }

    fn flat(units: &UnitRegistry) -> Cosmology {
        Cosmology::builder(&FLAT_LAMBDA_CDM)
            .name("test")
            .param("H0", h0(70.0))
            .param("Om0", 0.3)
            .meta("name", "test")
            .build(units)
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_parameters() {
        let units = UnitRegistry::standard();
        let c = flat(&units);
        assert_eq!(c.param("Neff"), Some(&ParamValue::Float(3.04)));
        assert_eq!(
            c.param("Tcmb0"),
            Some(&ParamValue::Quantity(Quantity::parse(0.0, "K").unwrap()))
        );
        assert_eq!(c.param("Ob0"), Some(&ParamValue::Null));
        assert!(c.param("Ode0").is_none());
    }

    #[test]
    fn test_missing_required_parameter() {
        let units = UnitRegistry::standard();
        let err = Cosmology::builder(&FLAT_LAMBDA_CDM)
            .param("H0", h0(70.0))
            .build(&units)
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingField {
                class: "FlatLambdaCDM".into(),
                field: "Om0".into()
            }
        );
    }

    #[test]
    fn test_unexpected_parameter() {
        let units = UnitRegistry::standard();
        let err = Cosmology::builder(&FLAT_LAMBDA_CDM)
            .param("H0", h0(70.0))
            .param("Om0", 0.3)
            .param("Ode0", 0.7)
            .build(&units)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnexpectedField { field, .. } if field == "Ode0"));
    }

    #[test]
    fn test_h0_converted_to_declared_unit() {
        let units = UnitRegistry::standard();
        let c = Cosmology::builder(&FLAT_LAMBDA_CDM)
            .param("H0", Quantity::parse(70.0, "km/s/Mpc").unwrap())
            .param("Om0", 0.3)
            .build(&units)
            .unwrap();
        assert_eq!(c.param("H0"), Some(&ParamValue::Quantity(h0(70.0))));
    }

    #[test]
    fn test_flatness() {
        let units = UnitRegistry::standard();
        assert!(flat(&units).is_flat());

        let curved = Cosmology::builder(&LAMBDA_CDM)
            .param("H0", h0(70.0))
            .param("Om0", 0.3)
            .param("Ode0", 0.6)
            .build(&units)
            .unwrap();
        assert!(!curved.is_flat());

        let closed = Cosmology::builder(&W_CDM)
            .param("H0", h0(70.0))
            .param("Om0", 0.3)
            .param("Ode0", 0.7)
            .build(&units)
            .unwrap();
        assert!(closed.is_flat());
    }

    #[test]
    fn test_clone_with_no_changes_is_identical() {
        let units = UnitRegistry::standard();
        let c = flat(&units);
        let same = c.clone_with().build(&units).unwrap();
        assert_eq!(same, c);
        assert_eq!(same.name(), Some("test"));
    }

    #[test]
    fn test_clone_with_marks_name_modified() {
        let units = UnitRegistry::standard();
        let c = flat(&units);
        let changed = c
            .clone_with()
            .param("Om0", 0.35)
            .meta("ref", "x")
            .build(&units)
            .unwrap();
        assert_eq!(changed.name(), Some("test (modified)"));
        assert_eq!(changed.param("Om0"), Some(&ParamValue::Float(0.35)));
        assert_eq!(changed.param("H0"), c.param("H0"));
        let keys: Vec<_> = changed.meta().keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, ["name", "ref"]);
    }

    #[test]
    fn test_equality_ignores_meta() {
        let units = UnitRegistry::standard();
        let a = flat(&units);
        let b = Cosmology::builder(&FLAT_LAMBDA_CDM)
            .name("test")
            .param("H0", h0(70.0))
            .param("Om0", 0.3)
            .build(&units)
            .unwrap();
        assert_eq!(a, b);

        let renamed = a.clone_with().name("other").build(&units).unwrap();
        assert_ne!(a, renamed);
        assert!(a.is_equivalent(&renamed));
    }

    #[test]
    fn test_display() {
        let units = UnitRegistry::standard();
        assert_eq!(
            flat(&units).to_string(),
            "FlatLambdaCDM(name=\"test\", H0=70 km / (Mpc s), Om0=0.3, Tcmb0=0 K, Neff=3.04, m_nu=0 eV, Ob0=None)"
        );
    }
}
