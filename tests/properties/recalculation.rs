//! Property tests for the recalculation engine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use casilla::domain::entities::Reduction;
use casilla::domain::services::{RecalcOptions, Recalculator, ReductionNormalizer};
use casilla::domain::value_objects::amount::decimal_from_json;
use casilla::CasillaError;

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn reduction(clave: usize, real: i64, teorico: i64) -> Value {
    json!({
        "casillaReal": format!("50{clave}"),
        "casillaTeorica": format!("55{clave}"),
        "clave": format!("0{clave}"),
        "etiqueta": "Reducción",
        "importeReal": cents(real).to_string(),
        "importeTeorico": cents(teorico).to_string(),
    })
}

/// A base in cents and reductions whose sums never exceed it
fn settlement() -> impl Strategy<Value = (i64, Vec<(i64, i64)>, i64)> {
    (1i64..100_000_000, 1usize..4).prop_flat_map(|(base, count)| {
        let share = base / count as i64;
        (
            Just(base),
            proptest::collection::vec((0..=share, 0..=share), count),
            0i64..50_000_000,
        )
    })
}

fn tree(base: i64, reductions: &[(i64, i64)], cuota: i64) -> Value {
    let list: Vec<Value> = reductions
        .iter()
        .enumerate()
        .map(|(i, (real, teorico))| reduction(i + 1, *real, *teorico))
        .collect();
    json!({
        "reducciones": list,
        "liquidacion": {
            "liquidacionBaseLiquidableRealCaja13": cents(base).to_string(),
            "liquidacionCuotaTributariaCaja605": cents(cuota).to_string(),
        }
    })
}

/// Legacy keys with the box numbers and labels of the official form
const FORM_REDUCTIONS: [(&str, &str, &str, &str, &str); 5] = [
    ("reduccionParentesco", "01", "501", "551", "Reducción por parentesco"),
    ("reduccionDiscapacidad", "02", "502", "552", "Reducción por discapacidad"),
    ("reduccionSeguroVida", "03", "503", "553", "Reducción por seguros de vida"),
    ("reduccionEmpresaFamiliar", "04", "504", "554", "Reducción por empresa familiar"),
    ("reduccionViviendaHabitual", "05", "505", "555", "Reducción por vivienda habitual"),
];

type FormEntry = Option<(i64, Option<i64>)>;

/// A base in cents and one optional (real, teorico) pair per form reduction
fn form_settlement() -> impl Strategy<Value = (i64, Vec<FormEntry>, i64)> {
    (1i64..100_000_000).prop_flat_map(|base| {
        let share = base / FORM_REDUCTIONS.len() as i64;
        (
            Just(base),
            proptest::collection::vec(
                proptest::option::of((0..=share, proptest::option::of(0..=share))),
                FORM_REDUCTIONS.len(),
            ),
            0i64..50_000_000,
        )
    })
}

fn with_liquidacion(reducciones: Value, base: i64, cuota: i64) -> Value {
    json!({
        "reducciones": reducciones,
        "liquidacion": {
            "liquidacionBaseLiquidableRealCaja13": cents(base).to_string(),
            "liquidacionCuotaTributariaCaja605": cents(cuota).to_string(),
        }
    })
}

fn legacy_shape(entries: &[FormEntry]) -> Value {
    let mut map = Map::new();
    for ((key, ..), entry) in FORM_REDUCTIONS.iter().zip(entries) {
        let Some((real, teorico)) = entry else { continue };
        map.insert(key.to_string(), json!(cents(*real).to_string()));
        if let Some(teorico) = teorico {
            map.insert(format!("{key}Teorico"), json!(cents(*teorico).to_string()));
        }
    }
    Value::Object(map)
}

fn canonical_shape(entries: &[FormEntry]) -> Value {
    let mut list = Vec::new();
    for ((_, clave, real_box, teorica_box, label), entry) in FORM_REDUCTIONS.iter().zip(entries) {
        let Some((real, teorico)) = entry else { continue };
        let teorico = teorico.unwrap_or(*real);
        if *real == 0 && teorico == 0 {
            continue;
        }
        list.push(json!({
            "casillaReal": real_box,
            "casillaTeorica": teorica_box,
            "clave": clave,
            "etiqueta": label,
            "importeReal": cents(*real).to_string(),
            "importeTeorico": cents(teorico).to_string(),
        }));
    }
    Value::Array(list)
}

fn run(tree: &mut Value) -> Result<casilla::domain::services::Recalculation, CasillaError> {
    let normalized = ReductionNormalizer::new().apply(tree)?;
    Recalculator::new(RecalcOptions::default()).apply(tree, &normalized.reductions)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Running the engine twice gives the same tree as running it once.
    #[test]
    fn property_recalculation_is_idempotent((base, reductions, cuota) in settlement()) {
        let mut data = tree(base, &reductions, cuota);
        let first = run(&mut data).unwrap();
        let once = data.clone();

        let second = run(&mut data).unwrap();
        prop_assert_eq!(&data, &once);
        prop_assert_eq!(second.base_nueva_real, first.base_nueva_real);
        prop_assert_eq!(second.boxes, first.boxes);
    }

    /// PROPERTY: Written totals equal the exact sums of the reductions.
    #[test]
    fn property_totals_are_exact((base, reductions, cuota) in settlement()) {
        let mut data = tree(base, &reductions, cuota);
        let plan = run(&mut data).unwrap();

        let real: i64 = reductions.iter().map(|(r, _)| r).sum();
        let teorico: i64 = reductions.iter().map(|(_, t)| t).sum();
        prop_assert_eq!(plan.total_real, cents(real));
        prop_assert_eq!(plan.total_teorico, cents(teorico));
        prop_assert_eq!(plan.base_nueva_real, cents(base - real));
        prop_assert!(!plan.base_nueva_real.is_sign_negative() || plan.base_nueva_real.is_zero());
    }

    /// PROPERTY: A zero base leaves every dependent box unchanged.
    #[test]
    fn property_zero_base_keeps_dependent_boxes(cuota in 0i64..50_000_000) {
        let mut data = tree(0, &[(0, 0)], cuota);
        let plan = run(&mut data).unwrap();

        prop_assert_eq!(plan.factor, None);
        for change in &plan.boxes {
            prop_assert_eq!(change.after, change.before);
        }
        let written = &data["liquidacion"]["liquidacionCuotaTributariaCaja605"];
        prop_assert_eq!(decimal_from_json(written), Some(cents(cuota)));
    }

    /// PROPERTY: A legacy object and a canonical list naming the same
    /// reductions give the same totals and the same dependent boxes.
    #[test]
    fn property_legacy_and_canonical_inputs_recalculate_alike(
        (base, entries, cuota) in form_settlement()
    ) {
        let mut legacy = with_liquidacion(legacy_shape(&entries), base, cuota);
        let mut canonical = with_liquidacion(canonical_shape(&entries), base, cuota);

        let from_legacy = run(&mut legacy).unwrap();
        let from_canonical = run(&mut canonical).unwrap();
        prop_assert_eq!(&from_legacy, &from_canonical);
        prop_assert_eq!(&legacy["liquidacion"], &canonical["liquidacion"]);
    }

    /// PROPERTY: Reductions above the base are always rejected, never clamped.
    #[test]
    fn property_negative_base_is_an_error(base in 0i64..1_000_000, excess in 1i64..1_000_000) {
        let mut data = tree(base, &[(base + excess, 0)], 0);
        let err = run(&mut data).unwrap_err();
        let is_negative_base = matches!(err, CasillaError::NegativeBase { casilla: "13", .. });
        prop_assert!(is_negative_base);
    }
}

#[test]
fn reduction_entries_round_trip_through_json() {
    let entry = Reduction {
        casilla_real: "501".to_string(),
        casilla_teorica: "551".to_string(),
        clave: "01".to_string(),
        etiqueta: "Reducción por parentesco".to_string(),
        importe_real: cents(2_500_000),
        importe_teorico: cents(2_000_000),
    };
    let tree = json!({ "reducciones": [entry.to_json()] });
    let normalized = ReductionNormalizer::new().normalize(tree.get("reducciones")).unwrap();
    assert_eq!(normalized.reductions, vec![entry]);
}
