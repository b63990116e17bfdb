//! Extraction seam between free-form conversation and the parameter schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::requirements::RequirementsRecord;
use crate::session::ConversationMessage;

/// What an extractor pulled out of the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Fields the extractor found. Unset fields mean "not mentioned".
    pub record: RequirementsRecord,
    /// Optional free-text note to show the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ExtractionOutput {
    pub fn new(record: RequirementsRecord) -> Self {
        Self {
            record,
            remark: None,
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }
}

/// Maps a conversation onto the parameter schema.
///
/// Implementations receive the full history (including the latest user
/// message) and the record gathered so far, and return the fields they can
/// read out of it. The caller merges the output into the session record
/// without clearing anything, so returning only what was found is enough.
///
/// # Errors
///
/// Transport failures and unusable output are reported as
/// [`DyelabError::Extraction`](crate::error::DyelabError::Extraction); the
/// conversation ends in `FAILED` when that happens.
#[async_trait]
pub trait RequirementsExtractor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn extract(
        &self,
        history: &[ConversationMessage],
        current: &RequirementsRecord,
    ) -> Result<ExtractionOutput>;
}
