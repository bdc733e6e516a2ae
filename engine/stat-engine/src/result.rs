//! Sparse stat map returned by projections

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping of stat name to optional value.
///
/// `None` means "no data", which is not the same as a recorded `0.0`.
/// Serializes as a JSON object in insertion order with `null` for `None`;
/// keys are never dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatResult {
    entries: Vec<(&'static str, Option<f64>)>,
}

impl StatResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty result with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Set `name`, keeping its original position if already present
    pub fn insert(&mut self, name: &'static str, value: Option<f64>) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value of `name`; `None` both for null and for a missing key
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(key, _)| *key == name).and_then(|(_, value)| *value)
    }

    /// Whether `name` is a key, null or not
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| *key == name)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(&'static str, Option<f64>)> for StatResult {
    fn from_iter<I: IntoIterator<Item = (&'static str, Option<f64>)>>(iter: I) -> Self {
        let mut result = StatResult::new();
        for (name, value) in iter {
            result.insert(name, value);
        }
        result
    }
}

impl Serialize for StatResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_kept_distinct_from_zero() {
        let result: StatResult = [("goals", Some(0.0)), ("assists", None)].into_iter().collect();
        assert_eq!(result.get("goals"), Some(0.0));
        assert_eq!(result.get("assists"), None);
        assert!(result.contains_key("assists"));
        assert!(!result.contains_key("saves"));
    }

    #[test]
    fn test_serializes_nulls_in_order() {
        let result: StatResult =
            [("rating", Some(7.5)), ("goals", None), ("assists", Some(2.0))].into_iter().collect();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"rating":7.5,"goals":null,"assists":2.0}"#);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut result = StatResult::new();
        result.insert("a", Some(1.0));
        result.insert("b", Some(2.0));
        result.insert("a", None);
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(result.get("a"), None);
        assert_eq!(result.len(), 2);
    }
}
