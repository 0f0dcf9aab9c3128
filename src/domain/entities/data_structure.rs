//! Data Structure - the accepted shape of an input data tree
//!
//! Declares, per top-level section, which fields exist, their types and
//! optional patterns, box numbers and domain checks. Patterns are compiled
//! once when the structure is loaded.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DataPath;

/// Declared JSON type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Integer,
    Boolean,
    /// `YYYY-MM-DD` string
    Date,
    Array,
    Object,
    #[default]
    Any,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Any => "any",
        }
    }
}

/// Named domain validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Nif,
    Iban,
    PostalCode,
}

impl Check {
    pub fn as_str(self) -> &'static str {
        match self {
            Check::Nif => "nif",
            Check::Iban => "iban",
            Check::PostalCode => "postal_code",
        }
    }
}

/// Box numbers appear as numbers or strings in structure files
#[derive(Deserialize)]
#[serde(untagged)]
enum BoxRefDe {
    Number(u32),
    Text(String),
}

impl From<BoxRefDe> for String {
    fn from(value: BoxRefDe) -> Self {
        match value {
            BoxRefDe::Number(n) => n.to_string(),
            BoxRefDe::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FieldSpecDe {
    id: String,
    #[serde(default, rename = "type")]
    kind: ValueType,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    casilla: Option<BoxRefDe>,
    #[serde(default)]
    formula: Option<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    checks: Vec<Check>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionSpecDe {
    id: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    strict: bool,
    #[serde(default)]
    fields: Vec<FieldSpecDe>,
}

#[derive(Deserialize)]
struct DataStructureDe {
    #[serde(default)]
    model: Option<String>,
    sections: Vec<SectionSpecDe>,
}

/// One declared field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Key inside its section
    pub id: String,
    /// Full path from the tree root (`section.id`)
    pub path: DataPath,
    pub kind: ValueType,
    pub required: bool,
    pub pattern: Option<Regex>,
    /// Printed box number, when the field is a box
    pub casilla: Option<String>,
    /// Descriptive derivation rule
    pub formula: Option<String>,
    pub depends_on: Vec<DataPath>,
    pub checks: Vec<Check>,
    pub description: Option<String>,
}

/// One top-level section of the data tree
#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub id: String,
    pub required: bool,
    /// Keys not declared here are rejected
    pub strict: bool,
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Immutable, validated data structure
#[derive(Debug, Clone)]
pub struct DataStructure {
    model: Option<String>,
    sections: Vec<SectionSpec>,
    by_path: HashMap<String, (usize, usize)>,
}

impl DataStructure {
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Declared field addressed by a full data path
    pub fn field_for_path(&self, path: &DataPath) -> Option<&FieldSpec> {
        let (s, f) = self.by_path.get(path.as_str())?;
        Some(&self.sections[*s].fields[*f])
    }

    /// A structure that declares nothing and accepts any tree
    pub fn permissive() -> Self {
        Self {
            model: None,
            sections: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    fn from_de(de: DataStructureDe) -> Result<Self, String> {
        let mut sections = Vec::with_capacity(de.sections.len());
        let mut by_path = HashMap::new();

        for (s_idx, section) in de.sections.into_iter().enumerate() {
            if section.id.trim().is_empty() || section.id.contains('.') {
                return Err(format!("invalid section id '{}'", section.id));
            }
            if sections.iter().any(|s: &SectionSpec| s.id == section.id) {
                return Err(format!("duplicate section '{}'", section.id));
            }

            let mut fields = Vec::with_capacity(section.fields.len());
            for (f_idx, field) in section.fields.into_iter().enumerate() {
                let full = format!("{}.{}", section.id, field.id);
                let path = DataPath::parse(&full).map_err(|e| e.to_string())?;
                if by_path.insert(full.clone(), (s_idx, f_idx)).is_some() {
                    return Err(format!("duplicate field '{full}'"));
                }
                let pattern = field
                    .pattern
                    .as_deref()
                    .map(|p| Regex::new(p).map_err(|e| format!("field '{full}': invalid pattern: {e}")))
                    .transpose()?;
                let depends_on = field
                    .depends_on
                    .iter()
                    .map(|d| DataPath::parse(d).map_err(|e| format!("field '{full}': {e}")))
                    .collect::<Result<Vec<_>, _>>()?;

                fields.push(FieldSpec {
                    id: field.id,
                    path,
                    kind: field.kind,
                    required: field.required,
                    pattern,
                    casilla: field.casilla.map(String::from),
                    formula: field.formula,
                    depends_on,
                    checks: field.checks,
                    description: field.description,
                });
            }

            sections.push(SectionSpec {
                id: section.id,
                required: section.required,
                strict: section.strict,
                fields,
            });
        }

        Ok(Self {
            model: de.model,
            sections,
            by_path,
        })
    }
}

impl<'de> Deserialize<'de> for DataStructure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let de = DataStructureDe::deserialize(deserializer)?;
        Self::from_de(de).map_err(serde::de::Error::custom)
    }
}
