//! Reduction normalization
//!
//! Reductions arrive either as a flat legacy mapping
//! (`{"reduccionParentesco": 25000}`) or as the canonical list. Both are
//! resolved here, once, into `Vec<Reduction>`; later stages only ever see
//! the canonical form.

use std::collections::HashSet;

use log::debug;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::domain::entities::{Reduction, ReductionShape, CANONICAL_KEYS, REDUCCIONES};
use crate::domain::value_objects::amount;
use crate::error::{CasillaError, CasillaResult};

/// Suffix of the companion key carrying a legacy theoretical amount
pub const TEORICO_SUFFIX: &str = "Teorico";

/// Fixed canonical identity of a legacy reduction key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyReduction {
    pub key: &'static str,
    pub clave: &'static str,
    pub etiqueta: &'static str,
    pub casilla_real: &'static str,
    pub casilla_teorica: &'static str,
}

/// Recognized legacy keys, in `clave` order
pub const LEGACY_REDUCTIONS: [LegacyReduction; 5] = [
    LegacyReduction {
        key: "reduccionParentesco",
        clave: "01",
        etiqueta: "Reducción por parentesco",
        casilla_real: "501",
        casilla_teorica: "551",
    },
    LegacyReduction {
        key: "reduccionDiscapacidad",
        clave: "02",
        etiqueta: "Reducción por discapacidad",
        casilla_real: "502",
        casilla_teorica: "552",
    },
    LegacyReduction {
        key: "reduccionSeguroVida",
        clave: "03",
        etiqueta: "Reducción por seguros de vida",
        casilla_real: "503",
        casilla_teorica: "553",
    },
    LegacyReduction {
        key: "reduccionEmpresaFamiliar",
        clave: "04",
        etiqueta: "Reducción por empresa familiar",
        casilla_real: "504",
        casilla_teorica: "554",
    },
    LegacyReduction {
        key: "reduccionViviendaHabitual",
        clave: "05",
        etiqueta: "Reducción por vivienda habitual",
        casilla_real: "505",
        casilla_teorica: "555",
    },
];

fn legacy_entry(key: &str) -> Option<&'static LegacyReduction> {
    LEGACY_REDUCTIONS.iter().find(|r| r.key == key)
}

fn recognized_keys() -> String {
    LEGACY_REDUCTIONS
        .iter()
        .map(|r| r.key)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonical list plus the shape it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReductions {
    pub reductions: Vec<Reduction>,
    pub shape: ReductionShape,
}

/// Converts and validates the `reducciones` section
#[derive(Debug, Clone, Copy, Default)]
pub struct ReductionNormalizer;

impl ReductionNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a `reducciones` value without touching the tree.
    pub fn normalize(&self, value: Option<&Value>) -> CasillaResult<NormalizedReductions> {
        let normalized = match value {
            None | Some(Value::Null) => NormalizedReductions {
                reductions: Vec::new(),
                shape: ReductionShape::Absent,
            },
            Some(Value::Object(map)) => NormalizedReductions {
                reductions: self.from_legacy(map)?,
                shape: ReductionShape::Legacy,
            },
            Some(Value::Array(items)) => NormalizedReductions {
                reductions: self.from_canonical(items)?,
                shape: ReductionShape::Canonical,
            },
            Some(other) => {
                return Err(CasillaError::invalid(
                    REDUCCIONES,
                    other.to_string(),
                    "expected a list of reductions or a legacy mapping",
                ))
            }
        };
        debug!(
            "normalized {} reduction(s) from {} shape",
            normalized.reductions.len(),
            normalized.shape.as_str()
        );
        Ok(normalized)
    }

    /// Normalize `tree.reducciones` and write the canonical list back.
    pub fn apply(&self, tree: &mut Value) -> CasillaResult<NormalizedReductions> {
        let normalized = self.normalize(tree.get(REDUCCIONES))?;
        if normalized.shape != ReductionShape::Absent {
            if let Some(root) = tree.as_object_mut() {
                root.insert(
                    REDUCCIONES.to_string(),
                    Value::Array(normalized.reductions.iter().map(Reduction::to_json).collect()),
                );
            }
        }
        Ok(normalized)
    }

    fn from_legacy(&self, map: &Map<String, Value>) -> CasillaResult<Vec<Reduction>> {
        for key in map.keys() {
            let base = key.strip_suffix(TEORICO_SUFFIX).unwrap_or(key);
            if legacy_entry(base).is_none() {
                return Err(CasillaError::UnknownReductionKey {
                    key: key.clone(),
                    recognized: recognized_keys(),
                });
            }
        }

        let mut reductions = Vec::new();
        // The table is in clave order, so the output is too.
        for entry in &LEGACY_REDUCTIONS {
            let companion = format!("{}{TEORICO_SUFFIX}", entry.key);
            let real = legacy_amount(map, entry.key)?;
            let teorico = legacy_amount(map, &companion)?;

            let importe_real = real.unwrap_or(Decimal::ZERO);
            let importe_teorico = teorico.unwrap_or(importe_real);
            if importe_real.is_zero() && importe_teorico.is_zero() {
                continue;
            }
            reductions.push(Reduction {
                casilla_real: entry.casilla_real.to_string(),
                casilla_teorica: entry.casilla_teorica.to_string(),
                clave: entry.clave.to_string(),
                etiqueta: entry.etiqueta.to_string(),
                importe_real: amount::round_money(importe_real),
                importe_teorico: amount::round_money(importe_teorico),
            });
        }
        Ok(reductions)
    }

    fn from_canonical(&self, items: &[Value]) -> CasillaResult<Vec<Reduction>> {
        let mut claves = HashSet::new();
        let mut reductions = Vec::with_capacity(items.len());

        for (i, item) in items.iter().enumerate() {
            let at = |key: &str| format!("{REDUCCIONES}[{i}].{key}");
            let object = item.as_object().ok_or_else(|| {
                CasillaError::invalid(format!("{REDUCCIONES}[{i}]"), item.to_string(), "expected an object")
            })?;
            for key in CANONICAL_KEYS {
                if !object.contains_key(key) {
                    return Err(CasillaError::malformed(at(key), "missing key"));
                }
            }

            let reduction = Reduction {
                casilla_real: identifier(&object["casillaReal"], || at("casillaReal"))?,
                casilla_teorica: identifier(&object["casillaTeorica"], || at("casillaTeorica"))?,
                clave: identifier(&object["clave"], || at("clave"))?,
                etiqueta: object["etiqueta"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| CasillaError::malformed(at("etiqueta"), "expected a string"))?,
                importe_real: canonical_amount(&object["importeReal"], || at("importeReal"))?,
                importe_teorico: canonical_amount(&object["importeTeorico"], || at("importeTeorico"))?,
            };

            if !claves.insert(reduction.clave.clone()) {
                return Err(CasillaError::invalid(
                    at("clave"),
                    reduction.clave,
                    "duplicate clave",
                ));
            }
            reductions.push(reduction);
        }
        Ok(reductions)
    }
}

fn legacy_amount(map: &Map<String, Value>, key: &str) -> CasillaResult<Option<Decimal>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => amount::amount_from_json(value)
            .map(Some)
            .map_err(|e| {
                CasillaError::invalid(format!("{REDUCCIONES}.{key}"), value.to_string(), e.to_string())
            }),
    }
}

fn canonical_amount(value: &Value, field: impl Fn() -> String) -> CasillaResult<Decimal> {
    amount::amount_from_json(value)
        .map_err(|e| CasillaError::invalid(field(), value.to_string(), e.to_string()))
}

fn identifier(value: &Value, field: impl Fn() -> String) -> CasillaResult<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Number(n) if n.is_u64() => Ok(n.to_string()),
        other => Err(CasillaError::invalid(
            field(),
            other.to_string(),
            "expected a non-empty code",
        )),
    }
}
