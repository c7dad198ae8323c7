use std::fmt;

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::error::UnitError;
use crate::registry::UnitResolver;
use crate::unit::Unit;

/// YAML tag for a unit-bearing scalar.
pub const QUANTITY_TAG: &str = "!units.Quantity";

/// A number with a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Build from a unit expression, e.g. `Quantity::parse(70.0, "km / (Mpc s)")`.
    pub fn parse(value: f64, unit: &str) -> Result<Self, UnitError> {
        Ok(Self::new(value, Unit::parse(unit)?))
    }

    /// Convert to `target`. Structurally equal units skip the arithmetic so
    /// the value comes back bit-for-bit.
    pub fn to(&self, target: &Unit, units: &dyn UnitResolver) -> Result<Quantity, UnitError> {
        if &self.unit == target {
            return Ok(self.clone());
        }
        let from = units.resolve(&self.unit)?;
        let to = units.resolve(target)?;
        if from.dimension != to.dimension {
            return Err(UnitError::Incompatible {
                from: self.unit.to_string(),
                to: target.to_string(),
            });
        }
        Ok(Quantity::new(self.value * from.scale / to.scale, target.clone()))
    }

    /// `!units.Quantity {value: .., unit: ..}`
    pub fn to_yaml_value(&self) -> Value {
        let mut body = Mapping::new();
        body.insert(Value::from("value"), Value::from(self.value));
        body.insert(Value::from("unit"), Value::from(self.unit.to_string()));
        Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(QUANTITY_TAG),
            value: Value::Mapping(body),
        }))
    }

    /// Inverse of [`Quantity::to_yaml_value`]. Every unit symbol must resolve
    /// through `units`.
    pub fn from_yaml_value(value: &Value, units: &dyn UnitResolver) -> Result<Self, UnitError> {
        let tagged = match value {
            Value::Tagged(tagged) if tagged.tag == QUANTITY_TAG => tagged,
            other => {
                return Err(UnitError::MalformedQuantity(format!(
                    "expected {} node, found {}",
                    QUANTITY_TAG,
                    describe(other)
                )))
            }
        };
        let body = tagged.value.as_mapping().ok_or_else(|| {
            UnitError::MalformedQuantity("quantity body is not a mapping".to_string())
        })?;

        if let Some(extra) = body
            .keys()
            .find(|k| !matches!(k.as_str(), Some("value" | "unit")))
        {
            return Err(UnitError::MalformedQuantity(format!(
                "unexpected key {:?}",
                extra
            )));
        }

        let number = body
            .get("value")
            .and_then(Value::as_f64)
            .ok_or_else(|| UnitError::MalformedQuantity("missing numeric 'value'".to_string()))?;
        let unit = match body.get("unit") {
            Some(Value::String(s)) => Unit::parse(s)?,
            Some(Value::Null) | None => Unit::dimensionless(),
            Some(other) => {
                return Err(UnitError::MalformedQuantity(format!(
                    "'unit' must be a string, found {}",
                    describe(other)
                )))
            }
        };
        units.resolve(&unit)?;

        Ok(Quantity::new(number, unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged node",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{cosmology_units, UnitRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_hubble_units() {
        let units = UnitRegistry::standard();
        let h0 = Quantity::parse(70.0, "km / (Mpc s)").unwrap();
        let per_second = h0.to(&Unit::parse("1 / s").unwrap(), &units).unwrap();
        assert!((per_second.value - 2.2685455e-18).abs() < 1e-24);
        assert_eq!(per_second.unit.to_string(), "1 / s");
    }

    #[test]
    fn test_convert_same_unit_is_exact() {
        let units = UnitRegistry::standard();
        let q = Quantity::parse(0.1, "km/s/Mpc").unwrap();
        let same = q.to(&Unit::parse("km / (Mpc s)").unwrap(), &units).unwrap();
        assert_eq!(same.value.to_bits(), q.value.to_bits());
    }

    #[test]
    fn test_incompatible_conversion() {
        let units = UnitRegistry::standard();
        let t = Quantity::parse(2.7, "K").unwrap();
        let err = t.to(&Unit::symbol("eV"), &units).unwrap_err();
        assert_eq!(
            err,
            UnitError::Incompatible {
                from: "K".into(),
                to: "eV".into()
            }
        );
    }

    #[test]
    fn test_yaml_value_round_trip() {
        let units = UnitRegistry::standard();
        let q = Quantity::parse(2.7255, "K").unwrap();
        let value = q.to_yaml_value();
        assert_eq!(Quantity::from_yaml_value(&value, &units).unwrap(), q);
    }

    #[test]
    fn test_yaml_text_shape() {
        let q = Quantity::parse(70.0, "km / (Mpc s)").unwrap();
        let text = serde_yaml::to_string(&q.to_yaml_value()).unwrap();
        assert!(text.starts_with("!units.Quantity"), "{}", text);
        assert!(text.contains("unit: km / (Mpc s)"), "{}", text);
    }

    #[test]
    fn test_from_yaml_needs_enabled_units() {
        let q = Quantity::parse(100.0, "Mpc / littleh").unwrap();
        let value = q.to_yaml_value();

        let units = UnitRegistry::standard();
        assert_eq!(
            Quantity::from_yaml_value(&value, &units),
            Err(UnitError::UnknownUnit("littleh".into()))
        );

        let extra = cosmology_units();
        let scope = units.enable(&extra);
        assert_eq!(Quantity::from_yaml_value(&value, &scope).unwrap(), q);
    }

    #[test]
    fn test_from_yaml_rejects_untagged() {
        let units = UnitRegistry::standard();
        let err = Quantity::from_yaml_value(&Value::from(70.0), &units).unwrap_err();
        assert!(matches!(err, UnitError::MalformedQuantity(_)));
    }
}
