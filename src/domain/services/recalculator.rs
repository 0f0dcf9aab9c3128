//! Recalculation of the taxable base and dependent boxes
//!
//! Totals, bases and the proportional adjustment factor are derived from the
//! canonical reductions instead of trusting caller-supplied figures. The
//! engine first builds a complete [`Recalculation`] plan from the untouched
//! tree and only then writes it back, so a failing run changes nothing.
//!
//! Pre-reduction values are stored next to the boxes they came from. A second
//! run starts from those baselines and reproduces the same figures.

use std::collections::BTreeMap;

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::entities::{Reduction, ReductionTotals, TOTALES};
use crate::domain::services::structure_validator::is_absent;
use crate::domain::value_objects::amount::{amount_to_json, decimal_from_json, round_half_up, round_money};
use crate::domain::value_objects::{
    Casilla, BASE_REAL_BASELINE, BASE_TEORICA_BASELINE, DEPENDENT_BASELINE, LIQUIDACION,
};
use crate::error::{CasillaError, CasillaResult};

/// Tunables of the recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalcOptions {
    /// Largest accepted gap between declared and recomputed totals
    pub tolerance: Decimal,
    /// Fraction digits the adjustment factor is rounded to
    pub factor_digits: u32,
}

impl Default for RecalcOptions {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
            factor_digits: 10,
        }
    }
}

/// Declared total that differed from the recomputed one within tolerance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsDiscrepancy {
    pub total: &'static str,
    pub declared: Decimal,
    pub computed: Decimal,
}

/// One dependent box scaled by the factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxChange {
    pub casilla: &'static str,
    /// Value before any reduction (baseline)
    pub before: Decimal,
    pub after: Decimal,
}

/// Everything a run will write, computed before any write happens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recalculation {
    pub total_real: Decimal,
    pub total_teorico: Decimal,
    pub discrepancies: Vec<TotalsDiscrepancy>,
    pub base_previa_real: Decimal,
    pub base_previa_teorica: Decimal,
    pub base_nueva_real: Decimal,
    pub base_nueva_teorica: Decimal,
    /// `None` when the real base before reductions is zero
    pub factor: Option<Decimal>,
    pub boxes: Vec<BoxChange>,
}

/// Derives totals, bases and dependent boxes
#[derive(Debug, Clone, Default)]
pub struct Recalculator {
    options: RecalcOptions,
}

fn read_decimal(section: Option<&Map<String, Value>>, key: &str, path: &str) -> CasillaResult<Option<Decimal>> {
    let value = section.and_then(|s| s.get(key));
    if is_absent(value) {
        return Ok(None);
    }
    match value.and_then(decimal_from_json) {
        Some(d) => Ok(Some(d)),
        None => Err(CasillaError::invalid(
            path,
            value.map(Value::to_string).unwrap_or_default(),
            "expected a number",
        )),
    }
}

impl Recalculator {
    pub fn new(options: RecalcOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RecalcOptions {
        &self.options
    }

    /// Compute every new value from the untouched tree.
    pub fn plan(&self, tree: &Value, reductions: &[Reduction]) -> CasillaResult<Recalculation> {
        let computed = ReductionTotals::of(reductions);
        let total_real = round_money(computed.total_real);
        let total_teorico = round_money(computed.total_teorico);

        // Step 1: declared totals must agree with the sums.
        let declared = tree.get(TOTALES).and_then(Value::as_object);
        let mut discrepancies = Vec::new();
        for (name, sum) in [("totalReal", total_real), ("totalTeorico", total_teorico)] {
            let path = format!("{TOTALES}.{name}");
            let Some(value) = read_decimal(declared, name, &path)? else {
                continue;
            };
            let gap = (value - sum).abs();
            if gap > self.options.tolerance {
                return Err(CasillaError::TotalsMismatch {
                    total: name,
                    declared: value,
                    computed: sum,
                });
            }
            if !gap.is_zero() {
                warn!("{path} declared {value} but reductions sum to {sum}; using {sum}");
                discrepancies.push(TotalsDiscrepancy {
                    total: name,
                    declared: value,
                    computed: sum,
                });
            }
        }

        // Step 2: bases after reductions.
        let liquidacion = tree.get(LIQUIDACION).and_then(Value::as_object);
        let read = |key: &str| read_decimal(liquidacion, key, &format!("{LIQUIDACION}.{key}"));

        let stored_real = match read(BASE_REAL_BASELINE)? {
            Some(v) => Some(v),
            None => read(Casilla::BaseReal.key())?,
        };
        let stored_teorica = match read(BASE_TEORICA_BASELINE)? {
            Some(v) => Some(v),
            None => read(Casilla::BaseTeorica.key())?,
        };
        let base_previa_real = stored_real.unwrap_or(Decimal::ZERO);
        let base_previa_teorica = stored_teorica.unwrap_or(base_previa_real);

        let base_nueva_real = round_money(base_previa_real - total_real);
        let base_nueva_teorica = round_money(base_previa_teorica - total_teorico);
        for (casilla, previa, total, nueva) in [
            (Casilla::BaseReal, base_previa_real, total_real, base_nueva_real),
            (Casilla::BaseTeorica, base_previa_teorica, total_teorico, base_nueva_teorica),
        ] {
            if nueva.is_sign_negative() && !nueva.is_zero() {
                return Err(CasillaError::NegativeBase {
                    casilla: casilla.number(),
                    base_previa: previa,
                    total_reducciones: total,
                    base_nueva: nueva,
                });
            }
        }
        debug!(
            "base 13: {base_previa_real} - {total_real} = {base_nueva_real}; \
             base 14: {base_previa_teorica} - {total_teorico} = {base_nueva_teorica}"
        );

        // Step 3: proportional adjustment of the dependent boxes.
        let factor = if base_previa_real.is_zero() {
            None
        } else {
            base_nueva_real
                .checked_div(base_previa_real)
                .map(|f| round_half_up(f, self.options.factor_digits))
        };

        let baselines = liquidacion
            .and_then(|l| l.get(DEPENDENT_BASELINE))
            .and_then(Value::as_object);
        let mut boxes = Vec::new();
        for casilla in Casilla::DEPENDENT {
            let current = read(casilla.key())?;
            let baseline = read_decimal(
                baselines,
                casilla.number(),
                &format!("{LIQUIDACION}.{DEPENDENT_BASELINE}.{}", casilla.number()),
            )?;
            // Boxes absent from the tree stay absent.
            let Some(current) = current else { continue };
            let before = baseline.unwrap_or(current);
            let after = match factor {
                Some(f) => round_money(before * f),
                None => current,
            };
            boxes.push(BoxChange {
                casilla: casilla.number(),
                before,
                after,
            });
        }
        if let Some(f) = factor {
            debug!("adjustment factor {f} applied to {} box(es)", boxes.len());
        }

        Ok(Recalculation {
            total_real,
            total_teorico,
            discrepancies,
            base_previa_real,
            base_previa_teorica,
            base_nueva_real,
            base_nueva_teorica,
            factor,
            boxes,
        })
    }

    /// Write a computed plan into the tree.
    pub fn commit(&self, plan: &Recalculation, tree: &mut Value) {
        let Some(root) = tree.as_object_mut() else {
            return;
        };
        root.insert(
            TOTALES.to_string(),
            ReductionTotals {
                total_real: plan.total_real,
                total_teorico: plan.total_teorico,
            }
            .to_json(),
        );

        let liquidacion = root
            .entry(LIQUIDACION)
            .or_insert_with(|| Value::Object(Map::new()));
        if !liquidacion.is_object() {
            *liquidacion = Value::Object(Map::new());
        }
        let Some(liquidacion) = liquidacion.as_object_mut() else {
            return;
        };

        liquidacion.insert(BASE_REAL_BASELINE.to_string(), amount_to_json(plan.base_previa_real));
        liquidacion.insert(
            BASE_TEORICA_BASELINE.to_string(),
            amount_to_json(plan.base_previa_teorica),
        );
        liquidacion.insert(Casilla::BaseReal.key().to_string(), amount_to_json(plan.base_nueva_real));
        liquidacion.insert(
            Casilla::BaseTeorica.key().to_string(),
            amount_to_json(plan.base_nueva_teorica),
        );

        if plan.boxes.is_empty() {
            return;
        }
        let mut snapshot: BTreeMap<&str, Value> = BTreeMap::new();
        for change in &plan.boxes {
            snapshot.insert(change.casilla, amount_to_json(change.before));
            if let Some(casilla) = Casilla::DEPENDENT.iter().find(|c| c.number() == change.casilla) {
                liquidacion.insert(casilla.key().to_string(), amount_to_json(change.after));
            }
        }
        let baseline = liquidacion
            .entry(DEPENDENT_BASELINE)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(baseline) = baseline.as_object_mut() {
            for (number, value) in snapshot {
                baseline.entry(number).or_insert(value);
            }
        }
    }

    /// Plan and commit in one step.
    pub fn apply(&self, tree: &mut Value, reductions: &[Reduction]) -> CasillaResult<Recalculation> {
        let plan = self.plan(tree, reductions)?;
        self.commit(&plan, tree);
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn reduction(real: Decimal, teorico: Decimal) -> Reduction {
        Reduction {
            casilla_real: "501".into(),
            casilla_teorica: "551".into(),
            clave: "01".into(),
            etiqueta: "Reducción por parentesco".into(),
            importe_real: real,
            importe_teorico: teorico,
        }
    }

    fn scenario_tree() -> Value {
        json!({
            "liquidacion": {
                "liquidacionBaseLiquidableRealCaja13": 100000.00,
                "liquidacionCuotaTributariaCaja605": 9000.00
            }
        })
    }

    #[test]
    fn reference_scenario() {
        let mut tree = scenario_tree();
        let plan = Recalculator::default()
            .apply(&mut tree, &[reduction(dec!(25000.00), dec!(20000.00))])
            .unwrap();
        assert_eq!(plan.base_nueva_real, dec!(75000.00));
        assert_eq!(plan.base_nueva_teorica, dec!(80000.00));
        assert_eq!(plan.factor, Some(dec!(0.75)));
        assert_eq!(tree["liquidacion"]["liquidacionCuotaTributariaCaja605"], json!(6750));
        assert_eq!(tree["liquidacion"]["liquidacionBaseLiquidableRealCaja13"], json!(75000));
        assert_eq!(tree["liquidacion"]["liquidacionBaseLiquidableTeoricaCaja14"], json!(80000));
        assert_eq!(tree["totalesReducciones"], json!({ "totalReal": 25000, "totalTeorico": 20000 }));
        // Absent dependent boxes stay absent.
        assert!(tree["liquidacion"].get("liquidacionCuotaIntegraCaja16").is_none());
    }

    #[test]
    fn second_run_changes_nothing() {
        let reductions = [reduction(dec!(25000.00), dec!(20000.00))];
        let recalculator = Recalculator::default();
        let mut tree = scenario_tree();
        recalculator.apply(&mut tree, &reductions).unwrap();
        let once = tree.clone();
        recalculator.apply(&mut tree, &reductions).unwrap();
        assert_eq!(tree, once);
    }

    #[test]
    fn zero_base_leaves_dependent_boxes_alone() {
        let mut tree = json!({
            "liquidacion": {
                "liquidacionBaseLiquidableRealCaja13": 0,
                "liquidacionCuotaTributariaCaja605": 123.45
            }
        });
        let plan = Recalculator::default().apply(&mut tree, &[]).unwrap();
        assert_eq!(plan.factor, None);
        assert_eq!(
            decimal_from_json(&tree["liquidacion"]["liquidacionCuotaTributariaCaja605"]),
            Some(dec!(123.45))
        );
    }

    #[test]
    fn reductions_equal_to_base_give_zero() {
        let mut tree = scenario_tree();
        let plan = Recalculator::default()
            .apply(&mut tree, &[reduction(dec!(100000.00), dec!(100000.00))])
            .unwrap();
        assert!(plan.base_nueva_real.is_zero());
        assert_eq!(plan.factor, Some(Decimal::ZERO));
        assert_eq!(tree["liquidacion"]["liquidacionCuotaTributariaCaja605"], json!(0));
    }

    #[test]
    fn reductions_above_base_fail_without_touching_tree() {
        let mut tree = scenario_tree();
        let before = tree.clone();
        let err = Recalculator::default()
            .apply(&mut tree, &[reduction(dec!(100000.01), dec!(0))])
            .unwrap_err();
        assert!(matches!(err, CasillaError::NegativeBase { casilla: "13", .. }));
        assert_eq!(tree, before);
    }

    #[test]
    fn declared_totals_beyond_tolerance_fail() {
        let mut tree = scenario_tree();
        tree["totalesReducciones"] = json!({ "totalReal": 24000, "totalTeorico": 20000 });
        let err = Recalculator::default()
            .plan(&tree, &[reduction(dec!(25000.00), dec!(20000.00))])
            .unwrap_err();
        match err {
            CasillaError::TotalsMismatch { total, declared, computed } => {
                assert_eq!(total, "totalReal");
                assert_eq!(declared, dec!(24000));
                assert_eq!(computed, dec!(25000.00));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn declared_totals_within_tolerance_are_reported() {
        let mut tree = scenario_tree();
        tree["totalesReducciones"] = json!({ "totalReal": 25000.01, "totalTeorico": "20000" });
        let plan = Recalculator::default()
            .apply(&mut tree, &[reduction(dec!(25000.00), dec!(20000.00))])
            .unwrap();
        assert_eq!(plan.discrepancies.len(), 1);
        assert_eq!(plan.discrepancies[0].total, "totalReal");
        assert_eq!(tree["totalesReducciones"]["totalReal"], json!(25000));
    }

    #[test]
    fn factor_is_rounded_to_ten_digits() {
        let mut tree = json!({
            "liquidacion": {
                "liquidacionBaseLiquidableRealCaja13": 3,
                "liquidacionCuotaIntegraCaja16": 300000
            }
        });
        let plan = Recalculator::default()
            .apply(&mut tree, &[reduction(dec!(1), dec!(1))])
            .unwrap();
        assert_eq!(plan.factor, Some(dec!(0.6666666667)));
        assert_eq!(tree["liquidacion"]["liquidacionCuotaIntegraCaja16"], json!(200000));
    }

    #[test]
    fn non_numeric_box_is_a_validation_error() {
        let tree = json!({ "liquidacion": { "liquidacionBaseLiquidableRealCaja13": "mucho" } });
        let err = Recalculator::default().plan(&tree, &[]).unwrap_err();
        assert!(err.to_string().contains("liquidacion.liquidacionBaseLiquidableRealCaja13"));
    }
}
