//! Ordered mapping transform
//!
//! Converts a [`Cosmology`] to and from an insertion-ordered
//! `serde_yaml::Mapping`:
//!
//! ```text
//! cosmology: FlatLambdaCDM     # class name
//! name: Planck18               # or null
//! H0: !units.Quantity {..}     # one entry per parameter, constructor order
//! Om0: 0.3
//! ...
//! meta: {..}                   # ordered metadata
//! ```
//!
//! This is both the `mapping` interchange format and the intermediate form
//! other formats build on.

use cosmo_units::UnitResolver;
use serde_yaml::{Mapping, Value};
use tracing::trace;

use crate::class::CosmologyClass;
use crate::cosmology::Cosmology;
use crate::error::CoreError;
use crate::meta::Meta;
use crate::parameter::ParamValue;
use crate::registry::ClassRegistry;

/// Key naming the class inside a mapping.
pub const CLASS_KEY: &str = "cosmology";
pub const NAME_KEY: &str = "name";
pub const META_KEY: &str = "meta";

pub fn to_mapping(cosmology: &Cosmology) -> Mapping {
    let mut map = Mapping::new();
    map.insert(CLASS_KEY.into(), cosmology.class().name.into());
    map.insert(
        NAME_KEY.into(),
        cosmology.name().map(Value::from).unwrap_or(Value::Null),
    );
    for (name, value) in cosmology.params() {
        map.insert(name.into(), value.to_yaml_value());
    }
    map.insert(
        META_KEY.into(),
        Value::Mapping(cosmology.meta().as_mapping().clone()),
    );
    map
}

/// Build a cosmology from `map`.
///
/// The class comes from the mapping's `cosmology` key when present, else
/// from `cosmology`. Keys that are not parameters of the class go into the
/// metadata when `move_to_meta` is set and fail with `UnexpectedField`
/// otherwise.
pub fn from_mapping(
    mut map: Mapping,
    move_to_meta: bool,
    cosmology: Option<&str>,
    classes: &ClassRegistry,
    units: &dyn UnitResolver,
) -> Result<Cosmology, CoreError> {
    let class_name = match map.shift_remove(CLASS_KEY) {
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(CoreError::invalid(
                CLASS_KEY,
                format!("expected a class name, found {:?}", other),
            ))
        }
        None => cosmology.ok_or(CoreError::MissingClass)?.to_string(),
    };
    let class = classes.require(&class_name)?;
    from_mapping_for_class(map, move_to_meta, class, units)
}

/// Build a cosmology of exactly `class` from `map`, with no registry lookup.
///
/// Used when the caller already holds the class, e.g. a YAML constructor
/// bound to one tag. A `cosmology` key left in `map` is treated like any
/// other non-parameter key.
pub fn from_mapping_for_class(
    mut map: Mapping,
    move_to_meta: bool,
    class: &'static CosmologyClass,
    units: &dyn UnitResolver,
) -> Result<Cosmology, CoreError> {
    let mut meta = match map.shift_remove(META_KEY) {
        Some(Value::Mapping(m)) => Meta::from(m),
        Some(Value::Null) | None => Meta::new(),
        Some(other) => {
            return Err(CoreError::invalid(
                META_KEY,
                format!("expected a mapping, found {:?}", other),
            ))
        }
    };

    let mut builder = Cosmology::builder(class);
    match map.shift_remove(NAME_KEY) {
        Some(Value::String(s)) => builder = builder.name(s),
        Some(Value::Null) | None => {}
        Some(other) => {
            return Err(CoreError::invalid(
                NAME_KEY,
                format!("expected a string, found {:?}", other),
            ))
        }
    }

    for (key, value) in map {
        let known = key
            .as_str()
            .filter(|f| class.param(f).is_some())
            .map(str::to_string);
        let Some(field) = known else {
            if move_to_meta {
                trace!(class = class.name, key = ?key, "moving unrecognized key into meta");
                meta.insert(key, value);
                continue;
            }
            return Err(CoreError::UnexpectedField {
                class: class.name.to_string(),
                field: key
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{:?}", key)),
            });
        };
        let value = ParamValue::from_yaml_value(&field, &value, units)?;
        builder = builder.param(field, value);
    }

    builder.with_meta(meta).build(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{FLAT_LAMBDA_CDM, LAMBDA_CDM};
    use cosmo_units::{Quantity, UnitRegistry};
    use pretty_assertions::assert_eq;

    fn sample(units: &UnitRegistry) -> Cosmology {
        Cosmology::builder(&FLAT_LAMBDA_CDM)
            .name("test")
            .param("H0", Quantity::parse(70.0, "km / (Mpc s)").unwrap())
            .param("Om0", 0.3)
            .meta("b", 1)
            .meta("a", 2)
            .build(units)
            .unwrap()
    }

    fn keys(map: &Mapping) -> Vec<&str> {
        map.keys().filter_map(Value::as_str).collect()
    }

    #[test]
    fn test_to_mapping_layout() {
        let units = UnitRegistry::standard();
        let map = to_mapping(&sample(&units));
        assert_eq!(
            keys(&map),
            ["cosmology", "name", "H0", "Om0", "Tcmb0", "Neff", "m_nu", "Ob0", "meta"]
        );
        assert_eq!(map.get("cosmology"), Some(&Value::from("FlatLambdaCDM")));
        assert_eq!(map.get("Ob0"), Some(&Value::Null));
    }

    #[test]
    fn test_mapping_round_trip() {
        let units = UnitRegistry::standard();
        let classes = ClassRegistry::builtin();
        let original = sample(&units);
        let back = from_mapping(to_mapping(&original), false, None, &classes, &units).unwrap();
        assert_eq!(back, original);
        assert_eq!(back.meta(), original.meta());
    }

    #[test]
    fn test_class_argument_used_when_key_absent() {
        let units = UnitRegistry::standard();
        let classes = ClassRegistry::builtin();
        let mut map = to_mapping(&sample(&units));
        map.shift_remove(CLASS_KEY);

        let back = from_mapping(map.clone(), false, Some("FlatLambdaCDM"), &classes, &units).unwrap();
        assert_eq!(back.class(), &FLAT_LAMBDA_CDM);

        assert_eq!(
            from_mapping(map, false, None, &classes, &units).unwrap_err(),
            CoreError::MissingClass
        );
    }

    #[test]
    fn test_unknown_class() {
        let units = UnitRegistry::standard();
        let classes = ClassRegistry::builtin();
        let err = from_mapping(Mapping::new(), false, Some("Nonexistent"), &classes, &units)
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownClass("Nonexistent".into()));
    }

    #[test]
    fn test_unrecognized_key_rejected_without_move_to_meta() {
        let units = UnitRegistry::standard();
        let classes = ClassRegistry::builtin();
        let mut map = to_mapping(&sample(&units));
        map.insert("Ode0".into(), 0.7.into());

        let err = from_mapping(map, false, None, &classes, &units).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnexpectedField {
                class: "FlatLambdaCDM".into(),
                field: "Ode0".into()
            }
        );
    }

    #[test]
    fn test_unrecognized_key_moved_to_meta() {
        let units = UnitRegistry::standard();
        let classes = ClassRegistry::builtin();
        let mut map = to_mapping(&sample(&units));
        map.insert("reference".into(), "arXiv:1807.06209".into());

        let c = from_mapping(map, true, None, &classes, &units).unwrap();
        assert_eq!(c.meta().get("reference"), Some(&Value::from("arXiv:1807.06209")));
        let meta_keys: Vec<_> = c.meta().keys().filter_map(Value::as_str).collect();
        assert_eq!(meta_keys, ["b", "a", "reference"]);
    }

    #[test]
    fn test_missing_parameter() {
        let units = UnitRegistry::standard();
        let classes = ClassRegistry::builtin();
        let mut map = Mapping::new();
        map.insert("H0".into(), 70.0.into());
        map.insert("Om0".into(), 0.3.into());

        let err = from_mapping(map, false, Some("LambdaCDM"), &classes, &units).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingField {
                class: LAMBDA_CDM.name.into(),
                field: "Ode0".into()
            }
        );
    }

    #[test]
    fn test_for_class_skips_registry() {
        let units = UnitRegistry::standard();
        let mut map = to_mapping(&sample(&units));
        map.shift_remove(CLASS_KEY);

        // no registry is consulted, so an empty one cannot get in the way
        let c = from_mapping_for_class(map.clone(), false, &FLAT_LAMBDA_CDM, &units).unwrap();
        assert_eq!(c, sample(&units));

        map.insert(CLASS_KEY.into(), "LambdaCDM".into());
        let err = from_mapping_for_class(map, false, &FLAT_LAMBDA_CDM, &units).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnexpectedField {
                class: "FlatLambdaCDM".into(),
                field: CLASS_KEY.into()
            }
        );
    }
}
