//! Filled slot values and the aggregated result tree.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Value produced by a prompt for a scalar slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScalarValue {
    Text(String),
    Number(f64),
    Choice { value: String, index: usize },
}

impl ScalarValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(text) => Some(text),
            ScalarValue::Choice { value, .. } => Some(value),
            ScalarValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Text(text) => write!(f, "{}", text),
            ScalarValue::Number(n) => write!(f, "{}", n),
            ScalarValue::Choice { value, .. } => write!(f, "{}", value),
        }
    }
}

/// Result of one slot: a scalar, or the values of a nested slot set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilledValue {
    Scalar(ScalarValue),
    Group(SlotValues),
}

impl FilledValue {
    pub fn text(text: impl Into<String>) -> Self {
        FilledValue::Scalar(ScalarValue::Text(text.into()))
    }

    pub fn number(n: f64) -> Self {
        FilledValue::Scalar(ScalarValue::Number(n))
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            FilledValue::Scalar(scalar) => Some(scalar),
            FilledValue::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&SlotValues> {
        match self {
            FilledValue::Group(values) => Some(values),
            FilledValue::Scalar(_) => None,
        }
    }
}

impl fmt::Display for FilledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilledValue::Scalar(scalar) => write!(f, "{}", scalar),
            FilledValue::Group(values) => {
                let parts: Vec<String> = values.iter().map(|(_, v)| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SlotEntry {
    name: String,
    value: FilledValue,
}

/// Slot name to value mapping, kept in fill order.
///
/// A name, once filled, cannot be overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotValues {
    entries: Vec<SlotEntry>,
}

impl SlotValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the value of a slot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the slot already holds a value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: FilledValue,
    ) -> Result<(), ValidationError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(ValidationError::invalid_format(name, "slot already filled"));
        }
        self.entries.push(SlotEntry { name, value });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FilledValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    /// Looks up a value by dotted path, e.g. `fullname.first`.
    pub fn lookup(&self, path: &str) -> Option<&FilledValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_group()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilledValue)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fullname() -> SlotValues {
        let mut values = SlotValues::new();
        values.insert("first", FilledValue::text("John")).unwrap();
        values.insert("last", FilledValue::text("Smith")).unwrap();
        values
    }

    #[test]
    fn insert_refuses_overwrite() {
        let mut values = fullname();

        let result = values.insert("first", FilledValue::text("Jane"));

        assert!(result.is_err());
        assert_eq!(values.get("first"), Some(&FilledValue::text("John")));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn lookup_follows_dotted_path() {
        let mut root = SlotValues::new();
        root.insert("fullname", FilledValue::Group(fullname())).unwrap();
        root.insert("shoesize", FilledValue::number(10.0)).unwrap();

        assert_eq!(
            root.lookup("fullname.last"),
            Some(&FilledValue::text("Smith"))
        );
        assert_eq!(root.lookup("shoesize"), Some(&FilledValue::number(10.0)));
        assert_eq!(root.lookup("shoesize.inner"), None);
        assert_eq!(root.lookup("missing"), None);
    }

    #[test]
    fn names_keep_fill_order() {
        let values = fullname();
        assert_eq!(values.names().collect::<Vec<_>>(), vec!["first", "last"]);
    }

    #[test]
    fn display_renders_numbers_without_trailing_zero() {
        assert_eq!(FilledValue::number(10.0).to_string(), "10");
        assert_eq!(FilledValue::number(8.5).to_string(), "8.5");
    }

    #[test]
    fn display_joins_group_members() {
        assert_eq!(FilledValue::Group(fullname()).to_string(), "John, Smith");
    }

    #[test]
    fn serializes_tree_with_tags() {
        let mut root = SlotValues::new();
        root.insert("fullname", FilledValue::Group(fullname())).unwrap();

        let json = serde_json::to_string(&root).unwrap();
        let back: SlotValues = serde_json::from_str(&json).unwrap();

        assert!(json.contains("\"kind\":\"group\""));
        assert_eq!(back, root);
    }
}
