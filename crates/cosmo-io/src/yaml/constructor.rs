//! Tagged YAML node → cosmology

use cosmo_core::{
    from_mapping_for_class, ClassRegistry, CoreError, Cosmology, CosmologyClass, CLASS_KEY,
    META_KEY,
};
use cosmo_units::UnitResolver;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::error::IoError;

/// What a constructor may consult while decoding.
#[derive(Clone, Copy)]
pub struct ConstructContext<'a> {
    pub classes: &'a ClassRegistry,
    /// Usually a [`UnitScope`](cosmo_units::UnitScope) with cosmology units enabled.
    pub units: &'a dyn UnitResolver,
}

/// Decodes a tagged node into a cosmology.
pub trait Construct: Send + Sync {
    fn construct(&self, node: TaggedValue, ctx: &ConstructContext<'_>)
        -> Result<Cosmology, IoError>;
}

/// Constructor bound to one class. The registry selects it by tag, so the
/// class it holds is the one the tag names; decoding never looks the class
/// up again by short name.
#[derive(Debug, Clone, Copy)]
pub struct Constructor {
    class: &'static CosmologyClass,
}

pub fn make_constructor(class: &'static CosmologyClass) -> Constructor {
    Constructor { class }
}

impl Constructor {
    pub fn class(&self) -> &'static CosmologyClass {
        self.class
    }
}

impl Construct for Constructor {
    fn construct(
        &self,
        node: TaggedValue,
        ctx: &ConstructContext<'_>,
    ) -> Result<Cosmology, IoError> {
        let mut map = match node.value {
            Value::Mapping(m) => m,
            other => {
                return Err(IoError::MalformedNode(format!(
                    "{} body must be a mapping, found {:?}",
                    node.tag, other
                )))
            }
        };

        if !ctx.classes.contains(self.class) {
            return Err(CoreError::UnknownClass(self.class.qualified_name()).into());
        }

        // the tag is the only carrier of class identity
        if map.contains_key(CLASS_KEY) {
            return Err(CoreError::UnexpectedField {
                class: self.class.name.to_string(),
                field: CLASS_KEY.to_string(),
            }
            .into());
        }

        if let Some(meta) = map.get_mut(META_KEY) {
            *meta = Value::Mapping(pairs_to_meta(std::mem::take(meta))?);
        }

        Ok(from_mapping_for_class(map, false, self.class, ctx.units)?)
    }
}

fn pairs_to_meta(pairs: Value) -> Result<Mapping, IoError> {
    let items = match pairs {
        Value::Sequence(items) => items,
        Value::Null => return Ok(Mapping::new()),
        other => {
            return Err(IoError::MalformedNode(format!(
                "meta must be a sequence of [key, value] pairs, found {:?}",
                other
            )))
        }
    };

    let mut meta = Mapping::new();
    for item in items {
        match item {
            Value::Sequence(pair) if pair.len() == 2 => {
                let mut pair = pair.into_iter();
                if let (Some(k), Some(v)) = (pair.next(), pair.next()) {
                    meta.insert(k, v);
                }
            }
            other => {
                return Err(IoError::MalformedNode(format!(
                    "meta entry is not a [key, value] pair: {:?}",
                    other
                )))
            }
        }
    }
    Ok(meta)
}
