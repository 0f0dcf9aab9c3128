//! Data resolution
//!
//! Walks the mapping model against a validated data tree and produces the
//! display table. Pure: the tree is only read.

use log::trace;
use serde_json::Value;

use crate::domain::entities::{
    DataStructure, FieldMapping, FieldTable, FieldValue, Format, MappingModel, Predicate, Source,
};
use crate::domain::services::formatter::{format_date, format_value, parse_lenient, raw_text, FormatOptions};
use crate::domain::services::structure_validator::is_absent;
use crate::domain::value_objects::{amount, iban, DataPath};
use crate::error::{CasillaError, CasillaResult};

const TRUTHY_WORDS: [&str; 9] = ["1", "true", "t", "yes", "y", "si", "sí", "s", "x"];

/// Checkbox truthiness of a plain value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(_) => amount::decimal_from_json(value).is_some_and(|d| !d.is_zero()),
        Value::String(s) => {
            let word = s.trim().to_lowercase();
            TRUTHY_WORDS.contains(&word.as_str())
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (amount::decimal_from_json(left), amount::decimal_from_json(right)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => left == right,
    }
}

/// Evaluate a predicate against a possibly absent value.
pub fn evaluate(predicate: &Predicate, value: Option<&Value>) -> bool {
    let value = match value {
        Some(v) if !is_absent(Some(v)) => v,
        _ => return false,
    };
    match predicate {
        Predicate::Truthy => is_truthy(value),
        Predicate::NotEmpty => match value {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => true,
        },
        Predicate::Equals(expected) => loosely_equal(value, expected),
        Predicate::OneOf(options) => options.iter().any(|o| loosely_equal(value, o)),
        Predicate::AtLeast(threshold) => parse_lenient(value).is_some_and(|n| n >= *threshold),
    }
}

/// Resolves every mapped field of a model
pub struct DataResolver<'a> {
    mapping: &'a MappingModel,
    structure: &'a DataStructure,
    options: &'a FormatOptions,
}

impl<'a> DataResolver<'a> {
    pub fn new(mapping: &'a MappingModel, structure: &'a DataStructure, options: &'a FormatOptions) -> Self {
        Self {
            mapping,
            structure,
            options,
        }
    }

    pub fn resolve(&self, tree: &Value) -> CasillaResult<FieldTable> {
        let mut table = FieldTable::new();
        for field in self.mapping.fields() {
            let value = self.resolve_field(field, tree)?;
            trace!("{} = {:?}", field.id, value);
            table.insert(field.id.clone(), value);
        }
        Ok(table)
    }

    /// Resolve a single mapping.
    pub fn resolve_field(&self, field: &FieldMapping, tree: &Value) -> CasillaResult<FieldValue> {
        if field.format == Format::Blank && !field.is_checkbox() {
            return Ok(FieldValue::blank());
        }

        match &field.source {
            Source::Literal(text) => Ok(if field.is_checkbox() {
                FieldValue::Check(is_truthy(&Value::String(text.clone())))
            } else {
                FieldValue::Text(text.clone())
            }),
            Source::Lookup(path) => match self.present(field, path, tree)? {
                None => Ok(self.empty(field)),
                Some(value) if field.is_checkbox() => Ok(FieldValue::Check(is_truthy(value))),
                Some(value) => self.format(field, value).map(FieldValue::Text),
            },
            Source::Combine { paths, separator } => {
                let mut parts = Vec::with_capacity(paths.len());
                let mut any_checked = false;
                for path in paths {
                    let Some(value) = self.present(field, path, tree)? else {
                        continue;
                    };
                    if field.is_checkbox() {
                        any_checked |= is_truthy(value);
                        continue;
                    }
                    let text = self.format(field, value)?;
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
                Ok(if field.is_checkbox() {
                    FieldValue::Check(any_checked)
                } else {
                    FieldValue::Text(parts.join(separator))
                })
            }
            Source::Derive { from, predicate } => {
                let value = self.present(field, from, tree)?;
                Ok(FieldValue::Check(evaluate(predicate, value)))
            }
            Source::Iban { path, part } => match self.present(field, path, tree)? {
                None => Ok(self.empty(field)),
                Some(value) => {
                    let text = iban::spanish_part(&raw_text(value), *part);
                    Ok(if field.is_checkbox() {
                        FieldValue::Check(!text.is_empty())
                    } else {
                        FieldValue::Text(text)
                    })
                }
            },
        }
    }

    fn empty(&self, field: &FieldMapping) -> FieldValue {
        if field.is_checkbox() {
            FieldValue::Check(false)
        } else {
            FieldValue::blank()
        }
    }

    /// Look a path up, applying the presence rule and the declared pattern.
    fn present<'t>(
        &self,
        field: &FieldMapping,
        path: &DataPath,
        tree: &'t Value,
    ) -> CasillaResult<Option<&'t Value>> {
        let value = path.lookup(tree);
        if is_absent(value) {
            if field.required {
                return Err(CasillaError::MissingField {
                    field_id: field.id.clone(),
                    path: path.to_string(),
                });
            }
            return Ok(None);
        }
        let Some(value) = value else { return Ok(None) };

        if let Some(pattern) = self.structure.field_for_path(path).and_then(|f| f.pattern.as_ref()) {
            let text = raw_text(value);
            if !pattern.is_match(&text) {
                return Err(CasillaError::invalid(
                    field.id.clone(),
                    text,
                    format!("does not match pattern '{}'", pattern.as_str()),
                ));
            }
        }
        Ok(Some(value))
    }

    fn format(&self, field: &FieldMapping, value: &Value) -> CasillaResult<String> {
        let text = match (&field.date_pattern, field.format) {
            (Some(pattern), Format::Date) => format_date(value, pattern),
            _ => format_value(value, field.format, self.options),
        };
        text.map_err(|e| CasillaError::invalid(field.id.clone(), raw_text(value), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(fields: Value) -> MappingModel {
        serde_json::from_value(fields).unwrap()
    }

    fn resolve(fields: Value, tree: Value) -> CasillaResult<FieldTable> {
        let model = mapping(fields);
        let structure = DataStructure::permissive();
        let options = FormatOptions::default();
        DataResolver::new(&model, &structure, &options).resolve(&tree)
    }

    #[test]
    fn optional_absent_values_are_blank() {
        let table = resolve(
            json!([{ "id": "causante.causanteNombre", "page": 0, "x": 0, "y": 0 }]),
            json!({ "causante": { "causanteNombre": null } }),
        )
        .unwrap();
        assert_eq!(table.text("causante.causanteNombre"), Some(""));
    }

    #[test]
    fn required_absent_value_names_field_and_path() {
        let err = resolve(
            json!([{ "id": "nif", "page": 0, "x": 0, "y": 0, "required": true,
                     "source": "causante.causanteNif" }]),
            json!({ "causante": { "causanteNif": "" } }),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required value for field 'nif' (path 'causante.causanteNif')"
        );
    }

    #[test]
    fn combine_skips_blank_operands() {
        let table = resolve(
            json!([{ "id": "nombre", "page": 0, "x": 0, "y": 0,
                     "source": ["causante.nombre", "causante.segundo", "causante.apellidos"] }]),
            json!({ "causante": { "nombre": "Ana", "segundo": "", "apellidos": "Puig Soler" } }),
        )
        .unwrap();
        assert_eq!(table.text("nombre"), Some("Ana Puig Soler"));
    }

    #[test]
    fn combine_operands_follow_presence_rule() {
        let err = resolve(
            json!([{ "id": "domicilio", "page": 0, "x": 0, "y": 0, "required": true,
                     "source": { "combine": ["d.via", "d.numero"], "separator": ", " } }]),
            json!({ "d": { "via": "Diagonal" } }),
        )
        .unwrap_err();
        assert!(matches!(err, CasillaError::MissingField { ref path, .. } if path == "d.numero"));
    }

    #[test]
    fn derived_checkboxes() {
        let table = resolve(
            json!([
                { "id": "disc33", "page": 0, "x": 0, "y": 0, "type": "checkbox",
                  "source": { "derive": { "from": "b.grado", "test": "at_least", "value": 33 } } },
                { "id": "disc65", "page": 0, "x": 0, "y": 0, "type": "checkbox",
                  "source": { "derive": { "from": "b.grado", "test": "at_least", "value": 65 } } },
                { "id": "grupo2", "page": 0, "x": 0, "y": 0, "type": "checkbox",
                  "source": { "derive": { "from": "b.grupo", "test": "one_of", "value": ["II", "III"] } } },
                { "id": "sinDato", "page": 0, "x": 0, "y": 0, "type": "checkbox",
                  "source": { "derive": { "from": "b.nada", "test": "not_empty" } } }
            ]),
            json!({ "b": { "grado": "45 %", "grupo": "ii" } }),
        )
        .unwrap();
        assert_eq!(table.get("disc33"), Some(&FieldValue::Check(true)));
        assert_eq!(table.get("disc65"), Some(&FieldValue::Check(false)));
        assert_eq!(table.get("grupo2"), Some(&FieldValue::Check(true)));
        assert_eq!(table.get("sinDato"), Some(&FieldValue::Check(false)));
    }

    #[test]
    fn plain_checkbox_truthiness() {
        for (value, expected) in [
            (json!(true), true),
            (json!("Sí"), true),
            (json!("X"), true),
            (json!(1), true),
            (json!(0), false),
            (json!("no"), false),
        ] {
            let table = resolve(
                json!([{ "id": "c", "page": 0, "x": 0, "y": 0, "type": "checkbox", "source": "v" }]),
                json!({ "v": value }),
            )
            .unwrap();
            assert_eq!(table.get("c"), Some(&FieldValue::Check(expected)), "{value}");
        }
    }

    #[test]
    fn iban_parts_and_literals() {
        let table = resolve(
            json!([
                { "id": "entidad", "page": 0, "x": 0, "y": 0,
                  "source": { "iban": "pago.iban", "part": "entity" } },
                { "id": "cuenta", "page": 0, "x": 0, "y": 0,
                  "source": { "iban": "pago.iban", "part": "account" } },
                { "id": "modelo", "page": 0, "x": 0, "y": 0, "source": { "literal": "650" } }
            ]),
            json!({ "pago": { "iban": "ES9121000418450200051332" } }),
        )
        .unwrap();
        assert_eq!(table.text("entidad"), Some("2100"));
        assert_eq!(table.text("cuenta"), Some("0200051332"));
        assert_eq!(table.text("modelo"), Some("650"));
    }

    #[test]
    fn unparseable_amount_is_a_validation_error() {
        let err = resolve(
            json!([{ "id": "caja13", "page": 0, "x": 0, "y": 0, "format": "currency",
                     "source": "liquidacion.caja13" }]),
            json!({ "liquidacion": { "caja13": "mucho" } }),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for 'caja13': expected a number (got 'mucho')"
        );
    }

    #[test]
    fn declared_pattern_is_enforced() {
        let model = mapping(json!([{ "id": "cp", "page": 0, "x": 0, "y": 0, "source": "causante.cp" }]));
        let structure: DataStructure = serde_json::from_value(json!({
            "sections": [{ "id": "causante", "fields": [{ "id": "cp", "pattern": "^[0-9]{5}$" }] }]
        }))
        .unwrap();
        let options = FormatOptions::default();
        let resolver = DataResolver::new(&model, &structure, &options);
        let err = resolver.resolve(&json!({ "causante": { "cp": "0800" } })).unwrap_err();
        assert!(matches!(err, CasillaError::Validation { ref field, ref value, .. }
            if field == "cp" && value.as_deref() == Some("0800")));
        assert!(resolver.resolve(&json!({ "causante": { "cp": "08001" } })).is_ok());
    }

    #[test]
    fn blank_format_ignores_value() {
        let table = resolve(
            json!([{ "id": "reservada", "page": 0, "x": 0, "y": 0, "format": "blank", "required": true }]),
            json!({}),
        )
        .unwrap();
        assert_eq!(table.text("reservada"), Some(""));
    }

    #[test]
    fn field_date_pattern_overrides_run_default() {
        let table = resolve(
            json!([
                { "id": "nacimiento", "page": 0, "x": 0, "y": 0, "format": "date",
                  "date_pattern": "%Y %m %d", "source": "sujeto.fechaNacimiento" },
                { "id": "acta", "page": 0, "x": 0, "y": 0, "format": "date",
                  "source": "sujeto.fechaNacimiento" },
                { "id": "discapacidad", "page": 0, "x": 0, "y": 0, "format": "boolean_text",
                  "source": "sujeto.discapacidad" }
            ]),
            json!({ "sujeto": { "fechaNacimiento": "1975-04-12", "discapacidad": false } }),
        )
        .unwrap();
        assert_eq!(table.text("nacimiento"), Some("1975 04 12"));
        assert_eq!(table.text("acta"), Some("12/04/1975"));
        assert_eq!(table.text("discapacidad"), Some("No"));
    }
}
