use serde_yaml::{Mapping, Value};

/// Free-form metadata attached to a cosmology. Keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta(Mapping);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.0.keys()
    }

    /// `self` updated with `other`; keys from `other` win.
    pub fn merged(&self, other: &Meta) -> Meta {
        let mut out = self.clone();
        for (k, v) in other.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn into_mapping(self) -> Mapping {
        self.0
    }
}

impl From<Mapping> for Meta {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Meta::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let meta: Meta = [("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
        let keys: Vec<_> = meta.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_merged_prefers_other_and_appends_new_keys() {
        let base: Meta = [("name", "old"), ("ref", "x")].into_iter().collect();
        let update: Meta = [("name", "new"), ("extra", "y")].into_iter().collect();
        let merged = base.merged(&update);
        let keys: Vec<_> = merged.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["name", "ref", "extra"]);
        assert_eq!(merged.get("name"), Some(&Value::from("new")));
    }
}
