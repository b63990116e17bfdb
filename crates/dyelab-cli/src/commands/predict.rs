use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use dyelab_core::config::AppConfig;
use dyelab_core::prediction::PredictionPipeline;
use dyelab_infrastructure::{ConfigService, JsonModelLoader};

use super::input::read_record;

pub async fn run(config: &AppConfig, input: &str, model: Option<PathBuf>) -> Result<()> {
    let record = read_record(input)?;

    let model_path = match model {
        Some(path) => path,
        None => ConfigService::resolve_model_path(&config.model)?,
    };
    tracing::debug!("[Predict] Using model artifact {}", model_path.display());
    let pipeline = PredictionPipeline::new(Arc::new(JsonModelLoader::new(model_path)));

    let result = pipeline.predict_record(&record).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        bail!("prediction failed");
    }
    Ok(())
}
