//! Structure validation of input data trees
//!
//! Checks a data tree against a [`DataStructure`] and collects every
//! violation instead of stopping at the first one, so a caller can fix the
//! input in a single pass.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::domain::entities::{Check, DataStructure, FieldSpec, MappingModel, SectionSpec, ValueType};
use crate::domain::value_objects::{amount, iban, nif, DataPath, Segment};
use crate::error::{CasillaError, CasillaResult};

/// What went wrong at one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    MissingSection,
    MissingField,
    WrongType { expected: String },
    PatternMismatch { pattern: String },
    FailedCheck { check: String },
    UnknownField,
    MissingDependency { dependency: String },
}

/// A single structure violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::MissingSection => write!(f, "{}: required section is missing", self.path)?,
            ViolationKind::MissingField => write!(f, "{}: required field is missing", self.path)?,
            ViolationKind::WrongType { expected } => write!(f, "{}: expected {expected}", self.path)?,
            ViolationKind::PatternMismatch { pattern } => {
                write!(f, "{}: does not match pattern '{pattern}'", self.path)?
            }
            ViolationKind::FailedCheck { check } => write!(f, "{}: fails {check} check", self.path)?,
            ViolationKind::UnknownField => write!(f, "{}: unknown field", self.path)?,
            ViolationKind::MissingDependency { dependency } => {
                write!(f, "{}: requires '{dependency}' to be present", self.path)?
            }
        }
        if let Some(value) = &self.value {
            write!(f, " (got '{value}')")?;
        }
        Ok(())
    }
}

/// Pass/fail outcome with every violation found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, path: impl Into<String>, kind: ViolationKind, value: Option<&Value>) {
        self.violations.push(Violation {
            path: path.into(),
            kind,
            value: value.map(display_value),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `null`, `""` and missing keys all count as absent.
pub fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn type_matches(kind: ValueType, value: &Value) -> bool {
    match kind {
        ValueType::Any => true,
        ValueType::String => value.is_string(),
        ValueType::Number => amount::decimal_from_json(value).is_some(),
        ValueType::Integer => amount::decimal_from_json(value).is_some_and(|d| d.fract().is_zero()),
        ValueType::Boolean => value.is_boolean(),
        ValueType::Date => value
            .as_str()
            .is_some_and(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()),
        ValueType::Array => value.is_array(),
        ValueType::Object => value.is_object(),
    }
}

fn passes_check(check: Check, text: &str) -> bool {
    match check {
        Check::Nif => nif::is_valid(text),
        Check::Iban => iban::is_valid(text),
        Check::PostalCode => nif::is_valid_postal_code(text),
    }
}

/// Validates data trees against one structure
pub struct StructureValidator<'a> {
    structure: &'a DataStructure,
}

impl<'a> StructureValidator<'a> {
    pub fn new(structure: &'a DataStructure) -> Self {
        Self { structure }
    }

    /// Reject mappings that read an undeclared field of a declared section.
    ///
    /// Sections that declare no fields (such as `reducciones`) are opaque
    /// and accept any path below them; undeclared sections are not checked.
    pub fn check_sources(&self, mapping: &MappingModel) -> CasillaResult<()> {
        for field in mapping.fields() {
            for path in field.source.paths() {
                if !self.declares(path) {
                    return Err(CasillaError::Validation {
                        field: field.id.clone(),
                        value: Some(path.to_string()),
                        reason: "source path is not declared in the data structure".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn declares(&self, path: &DataPath) -> bool {
        let Some(section) = path.section().and_then(|id| self.structure.section(id)) else {
            return true;
        };
        if section.fields.is_empty() {
            return true;
        }
        match path.segments().get(1) {
            Some(Segment::Key(key)) => section.field(key).is_some(),
            _ => true,
        }
    }

    pub fn validate(&self, tree: &Value) -> ValidationReport {
        let mut report = ValidationReport::default();
        if !tree.is_object() {
            report.push("$", ViolationKind::WrongType { expected: "object".into() }, Some(tree));
            return report;
        }

        for section in self.structure.sections() {
            self.validate_section(section, tree, &mut report);
        }
        report
    }

    fn validate_section(&self, section: &SectionSpec, tree: &Value, report: &mut ValidationReport) {
        let value = tree.get(&section.id);
        if is_absent(value) {
            if section.required {
                report.push(&section.id, ViolationKind::MissingSection, None);
            }
            return;
        }

        let object = match value {
            Some(Value::Object(map)) => map,
            // Array sections (reductions) are checked by the normalizer.
            Some(Value::Array(_)) => return,
            other => {
                report.push(
                    &section.id,
                    ViolationKind::WrongType { expected: "object".into() },
                    other,
                );
                return;
            }
        };

        for field in &section.fields {
            self.validate_field(field, object.get(&field.id), tree, report);
        }

        if section.strict {
            for key in object.keys() {
                if section.field(key).is_none() {
                    report.push(format!("{}.{key}", section.id), ViolationKind::UnknownField, None);
                }
            }
        }
    }

    fn validate_field(
        &self,
        field: &FieldSpec,
        value: Option<&Value>,
        tree: &Value,
        report: &mut ValidationReport,
    ) {
        let path = field.path.as_str();
        let value = match value {
            Some(v) if !is_absent(Some(v)) => v,
            _ => {
                if field.required {
                    report.push(path, ViolationKind::MissingField, None);
                }
                return;
            }
        };

        if !type_matches(field.kind, value) {
            report.push(
                path,
                ViolationKind::WrongType { expected: field.kind.as_str().into() },
                Some(value),
            );
            return;
        }

        let text = match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) | Value::Bool(_) => Some(display_value(value)),
            _ => None,
        };
        if let Some(text) = &text {
            if let Some(pattern) = &field.pattern {
                if !pattern.is_match(text) {
                    report.push(
                        path,
                        ViolationKind::PatternMismatch { pattern: pattern.as_str().into() },
                        Some(value),
                    );
                }
            }
            for check in &field.checks {
                if !passes_check(*check, text) {
                    report.push(
                        path,
                        ViolationKind::FailedCheck { check: check.as_str().into() },
                        Some(value),
                    );
                }
            }
        }

        for dependency in &field.depends_on {
            if is_absent(dependency.lookup(tree)) {
                report.push(
                    path,
                    ViolationKind::MissingDependency { dependency: dependency.to_string() },
                    None,
                );
            }
        }
    }
}
