//! Parameter definitions and values

use std::fmt;

use cosmo_units::{Quantity, Unit, UnitResolver};
use serde_yaml::Value;

use crate::error::CoreError;

/// What a parameter takes when the caller does not supply it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    /// Must be supplied.
    Required,
    /// Optional; absent means `None`.
    Null,
    Float(f64),
    /// Value in the given unit expression.
    Quantity(f64, &'static str),
}

/// Declaration of one cosmology parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDef {
    pub name: &'static str,
    /// Unit expression the value is stored in; `None` for dimensionless.
    pub unit: Option<&'static str>,
    pub default: ParamDefault,
    pub doc: &'static str,
}

impl ParameterDef {
    pub fn is_required(&self) -> bool {
        matches!(self.default, ParamDefault::Required)
    }

    pub fn parsed_unit(&self) -> Result<Option<Unit>, CoreError> {
        Ok(match self.unit {
            Some(expr) => Some(Unit::parse(expr)?),
            None => None,
        })
    }

    /// The value used when the parameter is omitted, or `None` if required.
    pub fn default_value(&self) -> Result<Option<ParamValue>, CoreError> {
        Ok(match self.default {
            ParamDefault::Required => None,
            ParamDefault::Null => Some(ParamValue::Null),
            ParamDefault::Float(v) => Some(ParamValue::Float(v)),
            ParamDefault::Quantity(v, unit) => Some(ParamValue::Quantity(Quantity::parse(v, unit)?)),
        })
    }

    /// Bring a supplied value into this parameter's storage form.
    ///
    /// Quantities convert into the declared unit, bare floats are read in the
    /// declared unit, and `None` is only accepted by optional parameters.
    pub fn coerce(&self, value: ParamValue, units: &dyn UnitResolver) -> Result<ParamValue, CoreError> {
        let unit = self.parsed_unit()?;
        match (value, unit) {
            (ParamValue::Null, _) => match self.default {
                ParamDefault::Null => Ok(ParamValue::Null),
                _ => Err(CoreError::invalid(self.name, "may not be None")),
            },
            (ParamValue::Float(v), Some(unit)) => Ok(ParamValue::Quantity(Quantity::new(v, unit))),
            (ParamValue::Float(v), None) => Ok(ParamValue::Float(v)),
            (ParamValue::Quantity(q), Some(unit)) => Ok(ParamValue::Quantity(q.to(&unit, units)?)),
            (ParamValue::Quantity(q), None) => {
                Ok(ParamValue::Float(q.to(&Unit::dimensionless(), units)?.value))
            }
        }
    }
}

/// A stored parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Float(f64),
    Quantity(Quantity),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Quantity(q) => Some(q.value),
            Self::Null => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Self::Quantity(q) => Some(q),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_yaml_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Float(v) => Value::from(*v),
            Self::Quantity(q) => q.to_yaml_value(),
        }
    }

    /// Read a value for parameter `field`.
    pub fn from_yaml_value(
        field: &str,
        value: &Value,
        units: &dyn UnitResolver,
    ) -> Result<ParamValue, CoreError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Float)
                .ok_or_else(|| CoreError::invalid(field, format!("{} is not a float", n))),
            Value::Tagged(_) => Ok(Self::Quantity(Quantity::from_yaml_value(value, units)?)),
            other => Err(CoreError::invalid(
                field,
                format!("expected a number or quantity, found {:?}", other),
            )),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Quantity> for ParamValue {
    fn from(q: Quantity) -> Self {
        Self::Quantity(q)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Float(v) => write!(f, "{}", v),
            Self::Quantity(q) => write!(f, "{}", q),
        }
    }
}
