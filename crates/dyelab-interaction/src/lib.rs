//! Extractor implementations mapping conversation text onto the parameter
//! schema.
//!
//! # Module Structure
//!
//! - `rule_based`: Regex-driven local extractor (`RuleBasedExtractor`)
//! - `openai_extractor`: Chat Completions extractor (`OpenAiExtractor`)
//! - `prompt`: minijinja system prompt for the LLM extractor

pub mod openai_extractor;
pub mod prompt;
pub mod rule_based;

use std::sync::Arc;

use dyelab_core::config::{ExtractorConfig, ExtractorKind};
use dyelab_core::error::Result;
use dyelab_core::extraction::RequirementsExtractor;

pub use openai_extractor::OpenAiExtractor;
pub use rule_based::RuleBasedExtractor;

/// Builds the extractor selected in the configuration.
pub fn build_extractor(config: &ExtractorConfig) -> Result<Arc<dyn RequirementsExtractor>> {
    let extractor: Arc<dyn RequirementsExtractor> = match config.kind {
        ExtractorKind::RuleBased => Arc::new(RuleBasedExtractor::new()?),
        ExtractorKind::OpenAi => Arc::new(OpenAiExtractor::from_config(config)?),
    };
    tracing::info!("[Extractor] Using {} extractor", extractor.name());
    Ok(extractor)
}
