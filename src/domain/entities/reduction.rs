//! Reductions applied to the taxable base
//!
//! The canonical form is a list of entries carrying both the real and the
//! theoretical amount plus the boxes they are printed in.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::value_objects::amount::amount_to_json;

/// Section of the data tree holding the reductions
pub const REDUCCIONES: &str = "reducciones";

/// Section of the data tree holding the reduction totals
pub const TOTALES: &str = "totalesReducciones";

/// Keys every canonical entry must carry
pub const CANONICAL_KEYS: [&str; 6] = [
    "casillaReal",
    "casillaTeorica",
    "clave",
    "etiqueta",
    "importeReal",
    "importeTeorico",
];

/// One canonical reduction entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    pub casilla_real: String,
    pub casilla_teorica: String,
    pub clave: String,
    pub etiqueta: String,
    pub importe_real: Decimal,
    pub importe_teorico: Decimal,
}

impl Reduction {
    /// Canonical JSON object written back into the data tree
    pub fn to_json(&self) -> Value {
        json!({
            "casillaReal": self.casilla_real,
            "casillaTeorica": self.casilla_teorica,
            "clave": self.clave,
            "etiqueta": self.etiqueta,
            "importeReal": amount_to_json(self.importe_real),
            "importeTeorico": amount_to_json(self.importe_teorico),
        })
    }
}

/// Shape the reductions arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionShape {
    /// Flat mapping keyed by semantic reduction names
    Legacy,
    /// List of canonical entries
    Canonical,
    /// Section missing or `null`
    Absent,
}

impl ReductionShape {
    pub fn as_str(self) -> &'static str {
        match self {
            ReductionShape::Legacy => "legacy",
            ReductionShape::Canonical => "canonical",
            ReductionShape::Absent => "absent",
        }
    }
}

/// Sums of the real and theoretical amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReductionTotals {
    pub total_real: Decimal,
    pub total_teorico: Decimal,
}

impl ReductionTotals {
    /// Exact sums over the canonical list
    pub fn of(reductions: &[Reduction]) -> Self {
        reductions.iter().fold(Self::default(), |acc, r| Self {
            total_real: acc.total_real + r.importe_real,
            total_teorico: acc.total_teorico + r.importe_teorico,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "totalReal": amount_to_json(self.total_real),
            "totalTeorico": amount_to_json(self.total_teorico),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reduction(clave: &str, real: Decimal, teorico: Decimal) -> Reduction {
        Reduction {
            casilla_real: "501".into(),
            casilla_teorica: "551".into(),
            clave: clave.into(),
            etiqueta: "Reducción por parentesco".into(),
            importe_real: real,
            importe_teorico: teorico,
        }
    }

    #[test]
    fn totals_are_exact_sums() {
        let list = vec![
            reduction("01", dec!(0.10), dec!(0.10)),
            reduction("02", dec!(0.20), dec!(0.30)),
        ];
        let totals = ReductionTotals::of(&list);
        assert_eq!(totals.total_real, dec!(0.30));
        assert_eq!(totals.total_teorico, dec!(0.40));
    }

    #[test]
    fn canonical_json_carries_all_six_keys() {
        let value = reduction("01", dec!(25000.00), dec!(25000.00)).to_json();
        let object = value.as_object().unwrap();
        for key in CANONICAL_KEYS {
            assert!(object.contains_key(key), "{key}");
        }
        assert_eq!(value["importeReal"], json!(25000));
    }
}
