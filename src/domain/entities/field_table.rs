//! Resolved field table - field id to display value

use std::collections::BTreeMap;

use serde::Serialize;

/// Display value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Check(bool),
}

impl FieldValue {
    pub fn blank() -> Self {
        FieldValue::Text(String::new())
    }

    /// Whether painting this value leaves no mark
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Check(checked) => !checked,
        }
    }
}

/// Output of the Data Resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldTable(BTreeMap<String, FieldValue>);

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: FieldValue) {
        self.0.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.0.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        match self.0.get(id)? {
            FieldValue::Text(text) => Some(text),
            FieldValue::Check(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields that will leave a mark on the page
    pub fn filled(&self) -> usize {
        self.0.values().filter(|v| !v.is_blank()).count()
    }
}
