//! Builds a ready [`ConversationUseCase`] from configuration.

use std::sync::Arc;
use std::time::Duration;

use dyelab_core::config::AppConfig;
use dyelab_core::error::Result;
use dyelab_core::prediction::PredictionPipeline;
use dyelab_infrastructure::{ConfigService, InMemorySessionStore, JsonModelLoader};
use dyelab_interaction::build_extractor;

use crate::conversation_usecase::ConversationUseCase;

const REAPER_INTERVAL: Duration = Duration::from_secs(60);

/// Assembles store, extractor and pipeline as configured.
///
/// When called inside a tokio runtime a background task also purges idle
/// sessions once a minute. The model is not loaded here; call
/// [`PredictionPipeline::warm_up`] to load it eagerly.
pub fn build_usecase(config: &AppConfig) -> Result<ConversationUseCase> {
    let store = Arc::new(InMemorySessionStore::new(config.session.ttl()));
    if tokio::runtime::Handle::try_current().is_ok() {
        store.clone().spawn_reaper(REAPER_INTERVAL);
    }

    let extractor = build_extractor(&config.extractor)?;

    let model_path = ConfigService::resolve_model_path(&config.model)?;
    let pipeline = Arc::new(PredictionPipeline::new(Arc::new(JsonModelLoader::new(
        model_path,
    ))));

    Ok(ConversationUseCase::new(store, extractor, pipeline))
}
