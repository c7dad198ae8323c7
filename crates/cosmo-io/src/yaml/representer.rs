//! Cosmology → tagged YAML node

use cosmo_core::{to_mapping, Cosmology, CLASS_KEY, META_KEY};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;

use crate::error::IoError;

/// Encodes a cosmology as a tagged node.
pub trait Represent: Send + Sync {
    fn represent(&self, cosmology: &Cosmology) -> Result<TaggedValue, IoError>;
}

/// Representer bound to one class tag.
#[derive(Debug, Clone)]
pub struct Representer {
    tag: Tag,
}

/// Representer emitting nodes tagged `tag`, e.g. `!cosmology.flrw.LambdaCDM`.
pub fn make_representer(tag: &str) -> Result<Representer, IoError> {
    match tag.strip_prefix('!') {
        Some(name) if !name.is_empty() && !name.starts_with('!') => Ok(Representer {
            tag: Tag::new(tag),
        }),
        _ => Err(IoError::InvalidTag(tag.to_string())),
    }
}

impl Representer {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

impl Represent for Representer {
    /// The class key is dropped because the tag already names the class, and
    /// `meta` becomes a sequence of `[key, value]` pairs so its order
    /// survives any YAML consumer.
    fn represent(&self, cosmology: &Cosmology) -> Result<TaggedValue, IoError> {
        let mut map = to_mapping(cosmology);
        map.shift_remove(CLASS_KEY);

        if let Some(meta) = map.get_mut(META_KEY) {
            *meta = meta_to_pairs(std::mem::take(meta))?;
        }

        Ok(TaggedValue {
            tag: self.tag.clone(),
            value: Value::Mapping(map),
        })
    }
}

fn meta_to_pairs(meta: Value) -> Result<Value, IoError> {
    match meta {
        Value::Mapping(m) => Ok(Value::Sequence(
            m.into_iter()
                .map(|(k, v)| Value::Sequence(vec![k, v]))
                .collect(),
        )),
        Value::Null => Ok(Value::Sequence(Vec::new())),
        other => Err(IoError::MalformedNode(format!(
            "meta must be a mapping, found {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmo_core::FLAT_LAMBDA_CDM;
    use cosmo_units::{Quantity, UnitRegistry};
    use pretty_assertions::assert_eq;

    fn sample() -> Cosmology {
        Cosmology::builder(&FLAT_LAMBDA_CDM)
            .name("test")
            .param("H0", Quantity::parse(70.0, "km / (Mpc s)").unwrap())
            .param("Om0", 0.3)
            .meta("b", 1)
            .meta("a", 2)
            .meta("c", 3)
            .build(&UnitRegistry::standard())
            .unwrap()
    }

    #[test]
    fn test_node_carries_tag_and_no_class_key() {
        let representer = make_representer(&FLAT_LAMBDA_CDM.tag()).unwrap();
        let node = representer.represent(&sample()).unwrap();
        assert_eq!(node.tag.to_string(), "!cosmology.flrw.FlatLambdaCDM");

        let body = node.value.as_mapping().unwrap();
        assert!(!body.contains_key(CLASS_KEY));
        assert!(body.contains_key("H0"));
        assert!(body.contains_key("Om0"));
    }

    #[test]
    fn test_meta_becomes_ordered_pairs() {
        let representer = make_representer(&FLAT_LAMBDA_CDM.tag()).unwrap();
        let node = representer.represent(&sample()).unwrap();
        let meta = node.value.as_mapping().unwrap().get(META_KEY).unwrap();

        let pair = |k: &str, v: i32| Value::Sequence(vec![Value::from(k), Value::from(v)]);
        assert_eq!(
            meta,
            &Value::Sequence(vec![pair("b", 1), pair("a", 2), pair("c", 3)])
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let c = sample();
        let before = c.clone();
        make_representer("!x.Y").unwrap().represent(&c).unwrap();
        assert_eq!(c, before);
        assert_eq!(c.meta(), before.meta());
    }

    #[test]
    fn test_invalid_tags() {
        for tag in ["", "!", "cosmology.flrw.LambdaCDM", "!!str"] {
            assert!(
                matches!(make_representer(tag), Err(IoError::InvalidTag(_))),
                "{:?}",
                tag
            );
        }
    }
}
