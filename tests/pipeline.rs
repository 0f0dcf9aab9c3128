//! End-to-end runs through the library API: load the model documents,
//! fill a generated template and inspect the produced PDF.

mod common;

use std::path::Path;
use std::sync::Arc;

use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::tempdir;

use casilla::application::RunStatus;
use casilla::domain::entities::{DataStructure, ReductionShape};
use casilla::infrastructure::{FsDocumentRepository, PdfTemplate};
use casilla::{CasillaError, Config, FillJob, FillOptions, FillUseCase, FieldValue, MappingModel};

use common::*;

fn sample_use_case() -> FillUseCase {
    let repo = FsDocumentRepository::new();
    let mapping = repo.load_mapping(&model_file("field_mappings.json")).unwrap();
    let structure = repo.load_structure(&model_file("data_structure.json")).unwrap();
    FillUseCase::new(Arc::new(mapping), Arc::new(structure), Config::default().fill_options()).unwrap()
}

fn settlement_use_case(extra_page: Option<usize>) -> FillUseCase {
    let mut fields = vec![
        json!({ "id": "caja13", "source": "liquidacion.liquidacionBaseLiquidableRealCaja13",
                "format": "currency", "page": 0, "x": 300, "y": 356 }),
        json!({ "id": "caja14", "source": "liquidacion.liquidacionBaseLiquidableTeoricaCaja14",
                "format": "currency", "page": 0, "x": 560, "y": 356 }),
        json!({ "id": "caja605", "source": "liquidacion.liquidacionCuotaTributariaCaja605",
                "format": "currency", "page": 0, "x": 300, "y": 266 }),
    ];
    if let Some(page) = extra_page {
        fields.push(json!({ "id": "anexo", "source": { "literal": "Anexo" }, "page": page, "x": 40, "y": 40 }));
    }
    let mapping: MappingModel = serde_json::from_value(json!({ "model": "650", "fields": fields })).unwrap();
    FillUseCase::new(
        Arc::new(mapping),
        Arc::new(DataStructure::permissive()),
        FillOptions::default(),
    )
    .unwrap()
}

#[test]
fn bundled_model_loads_and_example_passes_validation() {
    let use_case = sample_use_case();
    assert_eq!(use_case.model(), "650");
    assert!(use_case.mapping().len() > 40);
    assert_eq!(use_case.mapping().max_page(), Some(MODEL_650_PAGES - 1));

    let report = use_case.check("example", example_data(), true);
    assert_eq!(report.status, RunStatus::Checked, "{:?}", report.error);
    assert_eq!(report.reductions_shape, Some(ReductionShape::Legacy));
    assert_eq!(report.reductions, 1);

    let fields = report.fields.unwrap();
    assert_eq!(fields.text("sujeto_nacimiento"), Some("1975 04 12"));
    assert_eq!(fields.text("caja13"), Some("200.000,00"));
    assert_eq!(fields.text("caja14"), Some("200.000,00"));
    assert_eq!(fields.text("caja16"), Some("20.000,00"));
    assert_eq!(fields.text("caja605"), Some("16.000,00"));
    assert_eq!(fields.text("caja606"), Some(""));
    assert_eq!(fields.text("caja607"), Some(""));
    assert_eq!(fields.text("reducciones_total_real"), Some("100.000,00"));
    assert_eq!(fields.text("iban_entidad"), Some("2100"));
    assert_eq!(fields.text("iban_cuenta"), Some("0200051332"));
    assert_eq!(fields.text("causante_domicilio"), Some("Passeig de Gràcia, 45"));
    assert_eq!(fields.get("causante_testada"), Some(&FieldValue::Check(true)));
    assert_eq!(fields.get("causante_intestada"), Some(&FieldValue::Check(false)));
    assert_eq!(fields.get("pago_cargo"), Some(&FieldValue::Check(true)));
}

#[test]
fn example_fills_every_template_page() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("mod650cat.pdf");
    std::fs::write(&template, template_pdf(MODEL_650_PAGES)).unwrap();
    let output = dir.path().join("out").join("example.pdf");

    let report = sample_use_case().run(FillJob {
        id: "example".to_string(),
        data: example_data(),
        template,
        output: Some(output.clone()),
    });
    assert_eq!(report.status, RunStatus::Success, "{:?}", report.error);
    assert_eq!(report.pages, MODEL_650_PAGES);

    let bytes = std::fs::read(&output).unwrap();
    let pages = page_contents(&bytes);
    assert_eq!(pages.len(), MODEL_650_PAGES);

    for (index, content) in pages.iter().enumerate() {
        assert!(
            content.contains(&format!("(Model 650 page {}) Tj", index + 1)),
            "template content lost on page {index}"
        );
        assert!(content.contains("(650001) Tj"), "header missing on page {index}");
    }
    assert!(pages[0].contains("(Anna Puig Serra) Tj"));
    assert!(pages[0].contains("(12345678Z) Tj"));
    assert!(pages[3].contains("(1975 04 12) Tj"));
    assert!(!pages[0].contains("(200.000,00) Tj"));
    assert!(pages[4].contains("(200.000,00) Tj"));
    assert!(pages[5].contains("(16.000,00) Tj"));

    assert_eq!(info_entry(&bytes, "Title").as_deref(), Some("Modelo 650 - example"));
    assert_eq!(info_entry(&bytes, "Author").as_deref(), Some("casilla"));
}

#[test]
fn filled_output_reloads_as_a_template() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("t.pdf");
    std::fs::write(&template, template_pdf(MODEL_650_PAGES)).unwrap();
    let first = dir.path().join("first.pdf");

    let use_case = sample_use_case();
    let report = use_case.run(FillJob {
        id: "first".to_string(),
        data: example_data(),
        template,
        output: Some(first.clone()),
    });
    assert!(report.is_success());

    let reloaded = PdfTemplate::load(&first).unwrap();
    assert_eq!(
        casilla::domain::ports::TemplateDocument::page_count(&reloaded),
        MODEL_650_PAGES
    );
}

#[test]
fn canonical_reduction_scales_dependent_boxes() {
    let mut tree = json!({
        "reducciones": [{
            "casillaReal": "501", "casillaTeorica": "551", "clave": "01",
            "etiqueta": "Reducción por parentesco",
            "importeReal": 25000.00, "importeTeorico": 20000.00
        }],
        "liquidacion": {
            "liquidacionBaseLiquidableRealCaja13": 100000.00,
            "liquidacionBaseLiquidableTeoricaCaja14": 100000.00,
            "liquidacionCuotaTributariaCaja605": 9000.00
        }
    });
    let prepared = settlement_use_case(None).prepare(&mut tree).unwrap();

    assert_eq!(prepared.shape, ReductionShape::Canonical);
    assert_eq!(prepared.table.text("caja13"), Some("75.000,00"));
    assert_eq!(prepared.table.text("caja14"), Some("80.000,00"));
    assert_eq!(prepared.table.text("caja605"), Some("6.750,00"));
    assert_eq!(prepared.recalculation.factor, Some(dec!(0.75)));
}

#[test]
fn legacy_parentesco_becomes_one_canonical_entry() {
    let mut tree = json!({
        "reducciones": { "reduccionParentesco": 5000.00 },
        "liquidacion": { "liquidacionBaseLiquidableRealCaja13": 20000 }
    });
    let prepared = settlement_use_case(None).prepare(&mut tree).unwrap();

    assert_eq!(prepared.shape, ReductionShape::Legacy);
    let entries = tree["reducciones"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["clave"], json!("01"));
    assert_eq!(entries[0]["importeReal"], entries[0]["importeTeorico"]);
    assert_eq!(entries[0]["importeReal"].as_f64(), Some(5000.0));
}

#[test]
fn page_beyond_template_fails_before_writing() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("t.pdf");
    std::fs::write(&template, template_pdf(15)).unwrap();
    let output = dir.path().join("never.pdf");

    let report = settlement_use_case(Some(20)).run(FillJob {
        id: "x".to_string(),
        data: json!({ "liquidacion": { "liquidacionBaseLiquidableRealCaja13": 1000 } }),
        template,
        output: Some(output.clone()),
    });

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.error.as_ref().unwrap().code, "page_out_of_range");
    assert!(!output.exists());
}

#[test]
fn reductions_above_base_are_rejected() {
    let mut tree = json!({
        "reducciones": { "reduccionParentesco": 150000 },
        "liquidacion": { "liquidacionBaseLiquidableRealCaja13": 100000 }
    });
    let err = settlement_use_case(None).prepare(&mut tree).unwrap_err();
    assert!(matches!(err, CasillaError::NegativeBase { casilla: "13", .. }), "{err}");
}

#[test]
fn missing_template_reports_template_error() {
    let report = settlement_use_case(None).run(FillJob {
        id: "x".to_string(),
        data: json!({}),
        template: Path::new("/nonexistent/template.pdf").to_path_buf(),
        output: None,
    });
    assert_eq!(report.error.unwrap().code, "template");
}
