//! File-based tests for the data-model and manifest loaders and the model facade

use pretty_assertions::assert_eq;
use schematic_service::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

const DATA_MODEL: &str = "\
Attribute,Description,Valid Values,DependsOn,Properties,Required,Parent,DependsOn Component,Validation Rules
Component,,,,,True,,,
Patient,,,\"Component, Patient ID, Diagnosis\",,False,DataType,,
Patient ID,,,,,True,DataProperty,,unique
Diagnosis,,\"Healthy, Cancer\",,,True,DataProperty,,
Cancer,,,Cancer Type,,False,ValidValue,,
Cancer Type,,\"Breast, Lung\",,,True,DataProperty,,
Biospecimen,,,\"Component, Sample ID\",,False,DataType,,Patient
Sample ID,,,,,True,DataProperty,,
";

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn test_config() -> SchematicConfig {
    let mut config = SchematicConfig::default();
    config.validator.thread_count = 2;
    config
}

#[tokio::test]
async fn test_load_data_model_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DATA_MODEL.as_bytes()).unwrap();

    let graph = DataModelLoader::new().load_file(file.path()).await.unwrap();

    assert!(graph.node_exists("Patient"));
    assert_eq!(
        graph.out_edges("Patient", Relationship::RequiresDependency),
        vec!["Component", "PatientID", "Diagnosis"]
    );
    assert_eq!(
        graph.out_edges("Biospecimen", Relationship::RequiresComponent),
        vec!["Patient"]
    );
    assert_eq!(
        graph.get_node("Diagnosis").unwrap().valid_values,
        vec!["Healthy", "Cancer"]
    );
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = DataModelLoader::new()
        .load_file(&dir.path().join("missing.csv"))
        .await;
    assert!(matches!(result, Err(SchematicError::IoError(_))));
}

#[tokio::test]
async fn test_load_tsv_manifest() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "manifest.tsv",
        "Component\tPatient ID\tDiagnosis\nPatient\tp1\tHealthy\n\t\t\nPatient\tp2\tCancer\n",
    );

    let records = ManifestLoader::with_options(CsvOptions::tsv())
        .load_file(&path)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["Patient ID"], "p2");
    assert_eq!(records[1]["Diagnosis"], "Cancer");
}

#[tokio::test]
async fn test_model_validates_manifest_file() {
    let dir = TempDir::new().unwrap();
    let model_path = write_file(dir.path(), "model.csv", DATA_MODEL);
    let manifest_path = write_file(
        dir.path(),
        "patient.csv",
        "Component,Patient ID,Diagnosis,Cancer Type,\n\
         Patient,p1,Healthy,,\n\
         Patient,p2,Cancer,,\n\
         ,,,,\n\
         Patient,p1,Healthy,,\n",
    );

    let model = MetadataModel::load(test_config(), Some(model_path.as_path()))
        .await
        .unwrap();
    let diagnostics = model
        .validate_manifest(&manifest_path, "Patient", None)
        .await
        .unwrap();

    let summary: Vec<(usize, &str, DiagnosticKind)> = diagnostics
        .iter()
        .map(|d| (d.row, d.field(), d.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            (3, "Cancer Type", DiagnosticKind::ConditionalRequirement),
            (4, "Patient ID", DiagnosticKind::DuplicateValue),
        ]
    );
}

#[tokio::test]
async fn test_model_uses_configured_location() {
    let dir = TempDir::new().unwrap();
    let model_path = write_file(dir.path(), "model.csv", DATA_MODEL);

    let mut config = test_config();
    config.model.location = Some(model_path);
    let model = MetadataModel::load(config, None).await.unwrap();

    assert_eq!(
        model.component_requirements("Biospecimen").unwrap(),
        vec!["Patient"]
    );
    assert_eq!(
        model
            .ordered_model_nodes("Patient", Relationship::RequiresDependency)
            .unwrap(),
        vec!["Diagnosis", "PatientID", "Component"]
    );

    let schema = model.validation_schema("Biospecimen").unwrap();
    assert_eq!(schema.required, vec!["Sample ID", "Component"]);
}

#[tokio::test]
async fn test_validate_manifest_with_supplied_schema() {
    let dir = TempDir::new().unwrap();
    let model_path = write_file(dir.path(), "model.csv", DATA_MODEL);
    let manifest_path = write_file(dir.path(), "patient.csv", "Patient ID\np1\n");

    let model = MetadataModel::load(test_config(), Some(model_path.as_path()))
        .await
        .unwrap();

    let mut schema = ConstraintDocument::new("Patient");
    schema
        .properties
        .insert("Patient ID".to_string(), PropertyConstraint::string());
    schema.required.push("Patient ID".to_string());

    let diagnostics = model
        .validate_manifest(&manifest_path, "Patient", Some(&schema))
        .await
        .unwrap();
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn test_bad_data_model_reports_row() {
    let dir = TempDir::new().unwrap();
    let model_path = write_file(
        dir.path(),
        "model.csv",
        "Attribute,Required\nPatient,False\nPatient ID,maybe\n",
    );

    let result = MetadataModel::load(test_config(), Some(model_path.as_path())).await;
    match result {
        Err(SchematicError::ParseError { location, .. }) => {
            assert_eq!(location.as_deref(), Some("row 3"));
        }
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_shipped_example_model_and_manifest() {
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let model = MetadataModel::load(test_config(), Some(data.join("example.model.csv").as_path()))
        .await
        .unwrap();

    let diagnostics = model
        .validate_manifest(&data.join("example.patient.csv"), "Patient", None)
        .await
        .unwrap();
    let summary: Vec<(usize, &str, DiagnosticKind)> = diagnostics
        .iter()
        .map(|d| (d.row, d.field(), d.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            (4, "Year of Birth", DiagnosticKind::OutOfRange),
            (4, "Family History", DiagnosticKind::ConditionalRequirement),
            (4, "Cancer Type", DiagnosticKind::ConditionalRequirement),
            (5, "Sex", DiagnosticKind::InvalidValue),
            (5, "Patient ID", DiagnosticKind::DuplicateValue),
        ]
    );
}
