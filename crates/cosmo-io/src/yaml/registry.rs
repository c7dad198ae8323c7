//! YAML dispatch tables
//!
//! Two tables, built once and then only read:
//! - class → representer, used by [`YamlRegistry::dump`]
//! - tag → constructor, used by [`YamlRegistry::load`]
//!
//! Unknown tags fail at lookup with `UnknownTag`. Whether a second binding
//! for the same key fails or replaces the first is the registry's
//! [`DuplicatePolicy`].

use std::collections::HashMap;

use cosmo_core::{Cosmology, CosmologyClass};
use serde_yaml::value::Tag;
use serde_yaml::Value;
use tracing::{debug, trace, warn};

use super::constructor::{make_constructor, Construct, ConstructContext};
use super::representer::{make_representer, Represent};
use crate::config::DuplicatePolicy;
use crate::error::IoError;

pub struct YamlRegistry {
    policy: DuplicatePolicy,
    /// keyed by qualified class name
    representers: HashMap<String, Box<dyn Represent>>,
    /// keyed by normalized tag (`!name`)
    constructors: HashMap<String, Box<dyn Construct>>,
}

impl YamlRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            representers: HashMap::new(),
            constructors: HashMap::new(),
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn add_representer(
        &mut self,
        class: &CosmologyClass,
        representer: impl Represent + 'static,
    ) -> Result<(), IoError> {
        let key = class.qualified_name();
        self.check_duplicate(self.representers.contains_key(&key), &class.tag())?;
        debug!(class = %key, "bound yaml representer");
        self.representers.insert(key, Box::new(representer));
        Ok(())
    }

    pub fn add_constructor(
        &mut self,
        tag: &str,
        constructor: impl Construct + 'static,
    ) -> Result<(), IoError> {
        let key = normalize_tag(tag)?;
        self.check_duplicate(self.constructors.contains_key(&key), &key)?;
        debug!(tag = %key, "bound yaml constructor");
        self.constructors.insert(key, Box::new(constructor));
        Ok(())
    }

    /// Bind the class's representer and constructor under `class.tag()`.
    ///
    /// Under `Reject` both tables are checked before either is touched, so a
    /// failed registration leaves the registry unchanged.
    pub fn register_class(&mut self, class: &'static CosmologyClass) -> Result<(), IoError> {
        let tag = class.tag();
        if self.policy == DuplicatePolicy::Reject
            && (self.representers.contains_key(&class.qualified_name())
                || self.constructors.contains_key(&tag))
        {
            return Err(IoError::DuplicateTag(tag));
        }
        self.add_representer(class, make_representer(&tag)?)?;
        self.add_constructor(&tag, make_constructor(class))
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        normalize_tag(tag)
            .map(|key| self.constructors.contains_key(&key))
            .unwrap_or(false)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Encode with the representer registered for the cosmology's class.
    pub fn represent(&self, cosmology: &Cosmology) -> Result<Value, IoError> {
        let key = cosmology.class().qualified_name();
        let representer = self
            .representers
            .get(&key)
            .ok_or_else(|| IoError::NoRepresenter(key.clone()))?;
        trace!(class = %key, "representing cosmology");
        let node = representer.represent(cosmology)?;
        Ok(Value::Tagged(Box::new(node)))
    }

    /// Decode a tagged value with the constructor registered for its tag.
    pub fn construct(&self, value: Value, ctx: &ConstructContext<'_>) -> Result<Cosmology, IoError> {
        let node = match value {
            Value::Tagged(node) => *node,
            other => {
                return Err(IoError::MalformedNode(format!(
                    "expected a tagged cosmology node, found {:?}",
                    other
                )))
            }
        };
        let tag = node.tag.to_string();
        let constructor = self
            .constructors
            .get(&tag)
            .ok_or_else(|| IoError::UnknownTag(tag.clone()))?;
        trace!(tag = %tag, "constructing cosmology");
        constructor.construct(node, ctx)
    }

    pub fn dump(&self, cosmology: &Cosmology) -> Result<String, IoError> {
        let value = self.represent(cosmology)?;
        Ok(serde_yaml::to_string(&value)?)
    }

    pub fn load(&self, text: &str, ctx: &ConstructContext<'_>) -> Result<Cosmology, IoError> {
        let value: Value = serde_yaml::from_str(text)?;
        self.construct(value, ctx)
    }

    fn check_duplicate(&self, exists: bool, tag: &str) -> Result<(), IoError> {
        match (exists, self.policy) {
            (false, _) => Ok(()),
            (true, DuplicatePolicy::Reject) => Err(IoError::DuplicateTag(tag.to_string())),
            (true, DuplicatePolicy::Overwrite) => {
                warn!(tag = %tag, "overwriting existing yaml binding");
                Ok(())
            }
        }
    }
}

impl Default for YamlRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl std::fmt::Debug for YamlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlRegistry")
            .field("policy", &self.policy)
            .field("tags", &self.tags())
            .finish()
    }
}

/// `!name` form of a local tag; the leading `!` is optional on input.
fn normalize_tag(tag: &str) -> Result<String, IoError> {
    let name = tag.strip_prefix('!').unwrap_or(tag);
    if name.is_empty() || name.starts_with('!') {
        return Err(IoError::InvalidTag(tag.to_string()));
    }
    Ok(Tag::new(name).to_string())
}
