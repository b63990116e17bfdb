use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dyelab_core::error::{DyelabError, Result};
use dyelab_core::prediction::{ColourRegressor, ModelLoader};

use super::artifact::parse_artifact;

/// Loads a regressor from a JSON artifact on disk.
#[derive(Debug, Clone)]
pub struct JsonModelLoader {
    path: PathBuf,
}

impl JsonModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ModelLoader for JsonModelLoader {
    async fn load(&self) -> Result<Arc<dyn ColourRegressor>> {
        let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DyelabError::model_unavailable(format!(
                "cannot read model artifact {}: {}",
                self.path.display(),
                e
            ))
        })?;
        parse_artifact(&json).map_err(|e| match e {
            DyelabError::ModelUnavailable(reason) => DyelabError::model_unavailable(format!(
                "{}: {}",
                self.path.display(),
                reason
            )),
            other => other,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
