use std::collections::HashMap;

use tracing::debug;

use crate::class::{builtin_classes, CosmologyClass};
use crate::error::CoreError;

/// Known cosmology classes, keyed by short class name.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Vec<&'static CosmologyClass>,
    by_name: HashMap<&'static str, usize>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the builtin FLRW classes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for class in builtin_classes() {
            registry.insert(class);
        }
        registry
    }

    /// Add a class. Two classes may not share a short name.
    pub fn register(&mut self, class: &'static CosmologyClass) -> Result<(), CoreError> {
        if self.by_name.contains_key(class.name) {
            return Err(CoreError::DuplicateClass(class.name.to_string()));
        }
        self.insert(class);
        Ok(())
    }

    // Callers guarantee `class.name` is not taken yet.
    fn insert(&mut self, class: &'static CosmologyClass) {
        debug_assert!(!self.by_name.contains_key(class.name), "{}", class);
        debug!(class = %class, "registered cosmology class");
        self.by_name.insert(class.name, self.classes.len());
        self.classes.push(class);
    }

    pub fn get(&self, name: &str) -> Option<&'static CosmologyClass> {
        self.by_name.get(name).map(|&i| self.classes[i])
    }

    /// Like [`ClassRegistry::get`], failing with `UnknownClass`.
    pub fn require(&self, name: &str) -> Result<&'static CosmologyClass, CoreError> {
        self.get(name)
            .ok_or_else(|| CoreError::UnknownClass(name.to_string()))
    }

    /// True when this exact class (name and module) is registered.
    pub fn contains(&self, class: &CosmologyClass) -> bool {
        self.get(class.name).is_some_and(|c| c == class)
    }

    /// Classes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static CosmologyClass> + '_ {
        self.classes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
