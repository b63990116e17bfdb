use std::sync::Arc;

use dyelab_core::ParameterField;
use dyelab_core::prediction::{ModelLoader, PredictionPipeline};
use dyelab_core::requirements::{CompleteRequirements, RequirementsRecord};
use dyelab_infrastructure::JsonModelLoader;
use serde_json::json;
use tempfile::TempDir;

fn write_artifact(dir: &TempDir, artifact: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("colour_predictor.json");
    std::fs::write(&path, artifact.to_string()).unwrap();
    path
}

fn linear_artifact() -> serde_json::Value {
    let names: Vec<&str> = ParameterField::all().map(|f| f.name()).collect();
    let mut red = vec![0.0; 12];
    red[0] = 40.0;
    let mut green = vec![0.0; 12];
    green[1] = 60.0;
    let mut blue = vec![0.0; 12];
    blue[2] = 200.0;
    json!({
        "feature_names": names,
        "targets": ["R", "G", "B"],
        "model": {
            "type": "linear",
            "coefficients": [red, green, blue],
            "intercepts": [16.0, 145.0, 131.0]
        }
    })
}

fn reference() -> CompleteRequirements {
    let values = [2.5, 1.0, 0.5, 50.0, 15.0, 60.8, 45.0, 10.5, 10.0, 150.0, 80.0, 15.0];
    let record = ParameterField::all()
        .zip(values)
        .fold(RequirementsRecord::new(), |record, (field, value)| {
            record.with(field, value)
        });
    CompleteRequirements::try_from(&record).unwrap()
}

#[tokio::test]
async fn test_loads_linear_artifact_from_disk() {
    let dir = TempDir::new().unwrap();
    let loader = JsonModelLoader::new(write_artifact(&dir, linear_artifact()));

    let model = loader.load().await.unwrap();

    assert_eq!(model.kind(), "linear");
    // 16 + 40*2.5, 145 + 60*1.0, 131 + 200*0.5
    assert_eq!(model.predict(reference().features()), [116.0, 205.0, 231.0]);
}

#[tokio::test]
async fn test_pipeline_over_file_loader_gives_reference_hex() {
    let dir = TempDir::new().unwrap();
    let loader = Arc::new(JsonModelLoader::new(write_artifact(&dir, linear_artifact())));
    let pipeline = PredictionPipeline::new(loader);

    let result = pipeline.predict(&reference()).await;

    assert!(result.success);
    assert_eq!(result.hex.as_deref(), Some("#74cde7"));
}

#[tokio::test]
async fn test_missing_file_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let loader = JsonModelLoader::new(dir.path().join("absent.json"));

    let err = loader.load().await.err().unwrap();

    assert!(err.is_model_unavailable());
    assert!(err.to_string().contains("absent.json"));
}

#[tokio::test]
async fn test_garbage_file_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"\x80\x04pickle").unwrap();

    let err = JsonModelLoader::new(&path).load().await.err().unwrap();

    assert!(err.is_model_unavailable());
}

#[tokio::test]
async fn test_pipeline_recovers_once_artifact_appears() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("colour_predictor.json");
    let pipeline = PredictionPipeline::new(Arc::new(JsonModelLoader::new(&path)));

    let before = pipeline.predict(&reference()).await;
    assert!(!before.success);
    assert!(before.error.unwrap().contains("Model unavailable"));

    write_artifact(&dir, linear_artifact());
    let after = pipeline.predict(&reference()).await;
    assert!(after.success);
}
