//! Sparse record updates: which fields to write, and with what

use crate::types::{Number, Value};
use crate::view::{FieldValue, View};

/// One entry of an [`Update`]
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateValue {
    /// Value for a numeric field, coerced on write
    Scalar(Number),
    /// Nested update for a struct field
    Record(Update),
}

impl UpdateValue {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            UpdateValue::Scalar(_) => "number",
            UpdateValue::Record(_) => "record",
        }
    }
}

macro_rules! update_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for UpdateValue {
                fn from(value: $t) -> Self {
                    UpdateValue::Scalar(value.into())
                }
            }
        )*
    };
}

update_value_from!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize, f32, f64, Number, Value);

impl From<Update> for UpdateValue {
    fn from(update: Update) -> Self {
        UpdateValue::Record(update)
    }
}

/// An ordered, sparse set of field values.
///
/// Only fields named here are written by structural assignment; every other
/// destination field keeps its bytes. Names that match no destination field
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    entries: Vec<(String, UpdateValue)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a numeric field
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Number>) -> Self {
        self.insert(name, UpdateValue::Scalar(value.into()));
        self
    }

    /// Builder: set a nested struct field
    pub fn record(mut self, name: impl Into<String>, update: Update) -> Self {
        self.insert(name, UpdateValue::Record(update));
        self
    }

    /// Insert or replace the entry for `name`, keeping its original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<UpdateValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&UpdateValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<UpdateValue> {
        let pos = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UpdateValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Snapshot every field of `view`, recursing into nested structs
    pub fn from_view(view: &View<'_>) -> Self {
        let mut update = Update::new();
        for (name, value) in view.entries() {
            match value {
                FieldValue::Scalar(v) => update.insert(name, UpdateValue::Scalar(v.into())),
                FieldValue::Struct(child) => {
                    update.insert(name, UpdateValue::Record(Update::from_view(&child)))
                }
            }
        }
        update
    }
}

impl<K, V> FromIterator<(K, V)> for Update
where
    K: Into<String>,
    V: Into<UpdateValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut update = Update::new();
        for (name, value) in iter {
            update.insert(name, value);
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order_and_replaces() {
        let update = Update::new().set("x", 1).set("y", 2.5).set("x", 3);
        let names: Vec<&str> = update.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(update.get("x"), Some(&UpdateValue::Scalar(Number::Int(3))));
        assert_eq!(update.get("y"), Some(&UpdateValue::Scalar(Number::Float(2.5))));
    }

    #[test]
    fn test_nested_records() {
        let update = Update::new()
            .record("ul", Update::new().set("x", 1))
            .record("lr", Update::new().set("y", 2));
        assert_eq!(update.len(), 2);
        match update.get("lr") {
            Some(UpdateValue::Record(inner)) => assert!(inner.contains("y")),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_from_iterator_and_remove() {
        let mut update: Update = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(update.remove("a"), Some(UpdateValue::Scalar(Number::Int(1))));
        assert_eq!(update.remove("a"), None);
        assert!(!update.is_empty());
    }
}
