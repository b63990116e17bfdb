//! Prediction pipeline.
//!
//! Turns a complete requirements record into a colour: builds the feature
//! vector, calls the regressor once, then truncates, clamps and formats the
//! three outputs. The regressor is loaded lazily on first use and cached for
//! the lifetime of the pipeline.

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::regressor::{ColourRegressor, ModelLoader, TARGET_COUNT};
use super::result::{PredictionResult, clamp_channel};
use crate::error::Result;
use crate::requirements::{CompleteRequirements, RequirementsRecord};

const CHANNELS: [&str; TARGET_COUNT] = ["R", "G", "B"];

pub struct PredictionPipeline {
    loader: Arc<dyn ModelLoader>,
    model: OnceCell<Arc<dyn ColourRegressor>>,
}

impl PredictionPipeline {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Builds a pipeline around an already-loaded regressor.
    pub fn with_model(loader: Arc<dyn ModelLoader>, model: Arc<dyn ColourRegressor>) -> Self {
        Self {
            loader,
            model: OnceCell::new_with(Some(model)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Loads the model now instead of on the first prediction.
    pub async fn warm_up(&self) -> Result<()> {
        self.model().await.map(|_| ())
    }

    /// Concurrent first calls share one load. A failed load leaves the cell
    /// empty so the next call tries again.
    async fn model(&self) -> Result<Arc<dyn ColourRegressor>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                tracing::info!("[Pipeline] Loading model from {}", self.loader.describe());
                let model = self.loader.load().await?;
                tracing::info!("[Pipeline] Loaded {} model", model.kind());
                Ok::<_, crate::error::DyelabError>(model)
            })
            .await?;
        Ok(Arc::clone(model))
    }

    /// Predicts the colour for a complete record.
    ///
    /// Never fails outright: model and output problems are reported through
    /// a failed [`PredictionResult`].
    pub async fn predict(&self, requirements: &CompleteRequirements) -> PredictionResult {
        let model = match self.model().await {
            Ok(model) => model,
            Err(e) => {
                tracing::error!("[Pipeline] {}", e);
                return PredictionResult::failure(e.to_string());
            }
        };

        let raw = model.predict(requirements.features());

        if let Some(channel) = raw.iter().position(|v| !v.is_finite()) {
            tracing::error!(
                "[Pipeline] Model returned non-finite {} value {}",
                CHANNELS[channel],
                raw[channel]
            );
            return PredictionResult::failure(format!(
                "Model produced a non-finite {} value",
                CHANNELS[channel]
            ));
        }

        for (name, value) in out_of_range_channels(&raw) {
            tracing::warn!(
                "[Pipeline] {} output {:.2} is outside the model range 0-255; clamping",
                name,
                value
            );
        }

        PredictionResult::success(raw.map(clamp_channel))
    }

    /// Predicts from a raw record, checking completeness first.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteInput` naming every missing or invalid field.
    pub async fn predict_record(&self, record: &RequirementsRecord) -> Result<PredictionResult> {
        let requirements = CompleteRequirements::try_from(record)?;
        Ok(self.predict(&requirements).await)
    }
}

/// Channels whose raw output falls outside `[0, 255]`, with their values.
fn out_of_range_channels(raw: &[f64; TARGET_COUNT]) -> Vec<(&'static str, f64)> {
    CHANNELS
        .iter()
        .zip(raw)
        .filter(|(_, value)| !(0.0..=255.0).contains(*value))
        .map(|(name, value)| (*name, *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DyelabError;
    use crate::schema::{FEATURE_COUNT, ParameterField};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed output, or a function of the red dye column.
    struct FixedRegressor([f64; TARGET_COUNT]);

    impl ColourRegressor for FixedRegressor {
        fn kind(&self) -> &str {
            "fixed"
        }

        fn predict(&self, features: &[f64; FEATURE_COUNT]) -> [f64; TARGET_COUNT] {
            let red = features[ParameterField::DyeRedOwf.index()];
            [self.0[0] + red, self.0[1], self.0[2]]
        }
    }

    struct CountingLoader {
        calls: AtomicUsize,
        fail_first: usize,
        output: [f64; TARGET_COUNT],
    }

    impl CountingLoader {
        fn new(output: [f64; TARGET_COUNT]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                output,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn ColourRegressor>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(DyelabError::model_unavailable("artifact missing"));
            }
            Ok(Arc::new(FixedRegressor(self.output)))
        }

        fn describe(&self) -> String {
            "counting loader".to_string()
        }
    }

    fn reference_record() -> RequirementsRecord {
        let values = [2.5, 1.0, 0.5, 50.0, 15.0, 60.8, 45.0, 10.5, 10.0, 150.0, 80.0, 15.0];
        ParameterField::all()
            .zip(values)
            .fold(RequirementsRecord::new(), |record, (field, value)| {
                record.with(field, value)
            })
    }

    fn reference() -> CompleteRequirements {
        CompleteRequirements::try_from(&reference_record()).unwrap()
    }

    #[tokio::test]
    async fn test_reference_input_formats_colour() {
        let loader = Arc::new(CountingLoader::new([114.4, 205.9, 231.2]));
        let pipeline = PredictionPipeline::new(loader);

        let result = pipeline.predict(&reference()).await;

        assert!(result.success);
        assert_eq!(result.rgb(), Some([116, 205, 231]));
        assert_eq!(result.hex.as_deref(), Some("#74cde7"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_outputs_are_clamped() {
        let loader = Arc::new(CountingLoader::new([-42.0, 300.5, 0.9]));
        let pipeline = PredictionPipeline::new(loader);

        let result = pipeline.predict(&reference()).await;

        // red = -42 + 2.5 = -39.5
        assert_eq!(result.rgb(), Some([0, 255, 0]));
        assert_eq!(result.hex.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_out_of_range_channels_are_flagged() {
        assert_eq!(
            out_of_range_channels(&[-39.5, 300.5, 0.9]),
            vec![("R", -39.5), ("G", 300.5)]
        );
        assert!(out_of_range_channels(&[0.0, 255.0, 116.9]).is_empty());
    }

    #[tokio::test]
    async fn test_non_finite_output_fails() {
        let loader = Arc::new(CountingLoader::new([f64::NAN, 1.0, 1.0]));
        let pipeline = PredictionPipeline::new(loader);

        let result = pipeline.predict(&reference()).await;

        assert!(!result.success);
        assert!(result.hex.is_none());
        assert!(result.error.unwrap().contains("non-finite R"));
    }

    #[tokio::test]
    async fn test_predict_is_deterministic() {
        let pipeline = PredictionPipeline::new(Arc::new(CountingLoader::new([10.0, 20.0, 30.0])));
        let first = pipeline.predict(&reference()).await;
        let second = pipeline.predict(&reference()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_loader_runs_once_after_warm_up() {
        let loader = Arc::new(CountingLoader::new([10.0, 20.0, 30.0]));
        let pipeline = PredictionPipeline::new(loader.clone());
        assert!(!pipeline.is_loaded());

        pipeline.warm_up().await.unwrap();
        for _ in 0..5 {
            pipeline.predict(&reference()).await;
        }

        assert!(pipeline.is_loaded());
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_load() {
        let loader = Arc::new(CountingLoader::new([10.0, 20.0, 30.0]));
        let pipeline = Arc::new(PredictionPipeline::new(loader.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.predict(&reference()).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().success);
        }

        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = Arc::new(CountingLoader {
            fail_first: 1,
            ..CountingLoader::new([10.0, 20.0, 30.0])
        });
        let pipeline = PredictionPipeline::new(loader.clone());

        let first = pipeline.predict(&reference()).await;
        assert!(!first.success);
        assert!(first.error.unwrap().contains("Model unavailable"));

        let second = pipeline.predict(&reference()).await;
        assert!(second.success);
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test]
    async fn test_predict_record_names_missing_ph() {
        let pipeline = PredictionPipeline::new(Arc::new(CountingLoader::new([0.0; 3])));
        let mut record = reference_record();
        record.ph = None;

        let err = pipeline.predict_record(&record).await.unwrap_err();

        assert!(err.is_incomplete_input());
        assert_eq!(err.missing_fields(), &["pH".to_string()]);
    }

    #[tokio::test]
    async fn test_with_model_skips_loader() {
        let loader = Arc::new(CountingLoader::new([0.0; 3]));
        let pipeline =
            PredictionPipeline::with_model(loader.clone(), Arc::new(FixedRegressor([1.0; 3])));

        assert!(pipeline.is_loaded());
        assert!(pipeline.predict(&reference()).await.success);
        assert_eq!(loader.calls(), 0);
    }
}
