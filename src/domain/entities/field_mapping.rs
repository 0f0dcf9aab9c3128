//! Mapping Model - where and how every field is painted
//!
//! A mapping document is either a bare list of field mappings or an object
//! `{ "model": "650", "fields": [...] }`. Loading validates the whole model
//! once; afterwards it is immutable and shared read-only between runs.

use std::collections::{BTreeSet, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::services::formatter::check_date_pattern;
use crate::domain::value_objects::{amount, DataPath, IbanPart};

/// Standard-14 faces available to the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFace {
    #[default]
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Helvetica-Bold")]
    HelveticaBold,
}

impl FontFace {
    /// PostScript base font name
    pub fn base_name(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Checkbox,
}

/// How a resolved value is turned into display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Raw,
    Date,
    Decimal,
    Integer,
    Currency,
    /// `Sí` or `No` by checkbox truthiness
    #[serde(rename = "boolean_text")]
    BooleanText,
    /// Mapped but always drawn empty
    Blank,
}

/// Boolean test applied by a derived checkbox
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Truthy,
    NotEmpty,
    Equals(Value),
    OneOf(Vec<Value>),
    AtLeast(Decimal),
}

/// Where a field's value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// One path in the data tree
    Lookup(DataPath),
    /// Several paths joined by `separator`
    Combine {
        paths: Vec<DataPath>,
        separator: String,
    },
    /// Boolean derived from another value
    Derive { from: DataPath, predicate: Predicate },
    /// One box of a split Spanish IBAN
    Iban { path: DataPath, part: IbanPart },
    /// Constant text
    Literal(String),
}

impl Source {
    /// Every data path this source reads
    pub fn paths(&self) -> Vec<&DataPath> {
        match self {
            Source::Lookup(path) => vec![path],
            Source::Combine { paths, .. } => paths.iter().collect(),
            Source::Derive { from, .. } => vec![from],
            Source::Iban { path, .. } => vec![path],
            Source::Literal(_) => Vec::new(),
        }
    }
}

fn default_separator() -> String {
    " ".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum PredicateTest {
    Truthy,
    NotEmpty,
    Equals,
    OneOf,
    AtLeast,
}

#[derive(Deserialize)]
struct DeriveDe {
    from: String,
    test: PredicateTest,
    #[serde(default)]
    value: Option<Value>,
}

impl DeriveDe {
    fn predicate(self) -> Result<Predicate, String> {
        let value = self.value;
        let missing = |test: &str| format!("predicate '{test}' needs a value");
        Ok(match self.test {
            PredicateTest::Truthy => Predicate::Truthy,
            PredicateTest::NotEmpty => Predicate::NotEmpty,
            PredicateTest::Equals => Predicate::Equals(value.ok_or_else(|| missing("equals"))?),
            PredicateTest::OneOf => match value {
                Some(Value::Array(items)) => Predicate::OneOf(items),
                _ => return Err("predicate 'one_of' needs a list value".to_string()),
            },
            PredicateTest::AtLeast => {
                let threshold = value
                    .as_ref()
                    .and_then(amount::decimal_from_json)
                    .ok_or_else(|| "predicate 'at_least' needs a numeric value".to_string())?;
                Predicate::AtLeast(threshold)
            }
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceDe {
    Path(String),
    Paths(Vec<String>),
    Lookup {
        path: String,
    },
    Combine {
        combine: Vec<String>,
        #[serde(default = "default_separator")]
        separator: String,
    },
    Derive {
        derive: DeriveDe,
    },
    Iban {
        iban: String,
        part: IbanPart,
    },
    Literal {
        literal: Value,
    },
}

fn parse_path(raw: &str) -> Result<DataPath, String> {
    DataPath::parse(raw).map_err(|e| e.to_string())
}

impl TryFrom<SourceDe> for Source {
    type Error = String;

    fn try_from(de: SourceDe) -> Result<Self, Self::Error> {
        Ok(match de {
            SourceDe::Path(path) | SourceDe::Lookup { path } => Source::Lookup(parse_path(&path)?),
            SourceDe::Paths(paths) => Source::Combine {
                paths: paths.iter().map(|p| parse_path(p)).collect::<Result<_, _>>()?,
                separator: default_separator(),
            },
            SourceDe::Combine { combine, separator } => Source::Combine {
                paths: combine.iter().map(|p| parse_path(p)).collect::<Result<_, _>>()?,
                separator,
            },
            SourceDe::Derive { derive } => Source::Derive {
                from: parse_path(&derive.from)?,
                predicate: derive.predicate()?,
            },
            SourceDe::Iban { iban, part } => Source::Iban {
                path: parse_path(&iban)?,
                part,
            },
            SourceDe::Literal { literal } => Source::Literal(match literal {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        })
    }
}

/// A single page or every page the field repeats on
#[derive(Deserialize)]
#[serde(untagged)]
enum PageSpecDe {
    One(usize),
    Many(Vec<usize>),
}

fn default_size() -> f32 {
    10.0
}

fn default_true_label() -> String {
    "X".to_string()
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldMappingDe {
    id: String,
    page: PageSpecDe,
    x: f32,
    y: f32,
    #[serde(default)]
    font: FontFace,
    #[serde(default = "default_size", alias = "font_size")]
    size: f32,
    #[serde(default)]
    align: Align,
    #[serde(default, rename = "type")]
    kind: FieldKind,
    #[serde(default)]
    source: Option<SourceDe>,
    #[serde(default)]
    format: Format,
    #[serde(default)]
    date_pattern: Option<String>,
    #[serde(default = "default_true_label")]
    true_label: String,
    #[serde(default)]
    required: bool,
}

/// Everything needed to locate, resolve and paint one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub id: String,
    /// 0-based template page indices, ascending and unique
    pub pages: Vec<usize>,
    /// Points from the left edge
    pub x: f32,
    /// Points from the bottom edge
    pub y: f32,
    pub font: FontFace,
    pub size: f32,
    pub align: Align,
    pub kind: FieldKind,
    pub source: Source,
    pub format: Format,
    /// Overrides the run-wide pattern for this `date` field
    pub date_pattern: Option<String>,
    pub true_label: String,
    pub required: bool,
}

impl FieldMapping {
    pub fn is_checkbox(&self) -> bool {
        self.kind == FieldKind::Checkbox
    }

    fn from_de(de: FieldMappingDe) -> Result<Self, String> {
        let id = de.id.trim().to_string();
        if id.is_empty() {
            return Err("field mapping with empty id".to_string());
        }
        let err = |msg: String| format!("field '{id}': {msg}");

        let pages: Vec<usize> = match de.page {
            PageSpecDe::One(page) => vec![page],
            PageSpecDe::Many(pages) => pages
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };
        if pages.is_empty() {
            return Err(err("page list is empty".to_string()));
        }
        if !(de.size.is_finite() && de.size > 0.0) {
            return Err(err(format!("font size must be positive, got {}", de.size)));
        }
        if !(de.x.is_finite() && de.y.is_finite()) {
            return Err(err("coordinates must be finite".to_string()));
        }

        let source = match de.source {
            Some(raw) => Source::try_from(raw).map_err(err)?,
            None => Source::Lookup(parse_path(&id).map_err(err)?),
        };
        match &source {
            Source::Combine { paths, .. } if paths.is_empty() => {
                return Err(err("combine source lists no paths".to_string()));
            }
            Source::Derive { .. } if de.kind != FieldKind::Checkbox => {
                return Err(err("derived sources are only allowed on checkboxes".to_string()));
            }
            _ => {}
        }
        if let Some(pattern) = &de.date_pattern {
            if de.format != Format::Date {
                return Err(err("date_pattern requires format 'date'".to_string()));
            }
            check_date_pattern(pattern).map_err(err)?;
        }

        Ok(Self {
            id,
            pages,
            x: de.x,
            y: de.y,
            font: de.font,
            size: de.size,
            align: de.align,
            kind: de.kind,
            source,
            format: de.format,
            date_pattern: de.date_pattern,
            true_label: de.true_label,
            required: de.required,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MappingModelDe {
    List(Vec<FieldMappingDe>),
    Document {
        #[serde(default)]
        model: Option<String>,
        fields: Vec<FieldMappingDe>,
    },
}

/// The ordered, validated list of field mappings of one form model
#[derive(Debug, Clone, PartialEq)]
pub struct MappingModel {
    name: Option<String>,
    fields: Vec<FieldMapping>,
}

impl MappingModel {
    pub fn new(name: Option<String>, fields: Vec<FieldMapping>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.id.as_str()) {
                return Err(format!("duplicate field id '{}'", field.id));
            }
        }
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn get(&self, id: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Mappings painted on `page`, in model order
    pub fn fields_on_page(&self, page: usize) -> impl Iterator<Item = &FieldMapping> {
        self.fields.iter().filter(move |f| f.pages.contains(&page))
    }

    /// Highest page index any mapping targets
    pub fn max_page(&self) -> Option<usize> {
        self.fields.iter().filter_map(|f| f.pages.last().copied()).max()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'de> Deserialize<'de> for MappingModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (name, raw) = match MappingModelDe::deserialize(deserializer)? {
            MappingModelDe::List(fields) => (None, fields),
            MappingModelDe::Document { model, fields } => (model, fields),
        };
        let fields = raw
            .into_iter()
            .map(FieldMapping::from_de)
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?;
        MappingModel::new(name, fields).map_err(serde::de::Error::custom)
    }
}
