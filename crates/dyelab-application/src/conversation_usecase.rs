//! Conversation use case.
//!
//! Drives one turn of the requirements conversation:
//!
//! 1. Find or create the session for the key and lock it.
//! 2. Append the user message; `AWAITING_USER -> GATHERING`.
//! 3. Run the extractor over the whole history and merge its output.
//! 4. Check completeness. If something is missing, ask for the first missing
//!    field (`GATHERING -> AWAITING_USER`).
//! 5. Otherwise `GATHERING -> COMPLETE`, predict, and end in `PREDICTED` or
//!    `FAILED`. Terminal sessions are removed from the store.

use std::sync::Arc;

use chrono::Utc;
use dyelab_core::error::Result;
use dyelab_core::extraction::RequirementsExtractor;
use dyelab_core::prediction::{PredictionPipeline, PredictionResult};
use dyelab_core::requirements::{
    CompleteRequirements, CompletenessChecker, MergeReport, RequirementsRecord,
};
use dyelab_core::session::{
    ConversationMessage, ConversationSession, ConversationState, SessionStore,
};
use uuid::Uuid;

use crate::turn::TurnResponse;

/// Shown when extraction fails. Details go to the log and the prediction
/// error, not the chat.
pub const EXTRACTION_APOLOGY: &str = "Sorry, I couldn't process that message. \
     This session has ended; please start a new one and describe your recipe again.";

pub struct ConversationUseCase {
    store: Arc<dyn SessionStore>,
    extractor: Arc<dyn RequirementsExtractor>,
    pipeline: Arc<PredictionPipeline>,
}

impl ConversationUseCase {
    pub fn new(
        store: Arc<dyn SessionStore>,
        extractor: Arc<dyn RequirementsExtractor>,
        pipeline: Arc<PredictionPipeline>,
    ) -> Self {
        Self {
            store,
            extractor,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &Arc<PredictionPipeline> {
        &self.pipeline
    }

    /// Handles one user message.
    ///
    /// Without a key a fresh UUID v4 session is started. A key whose session
    /// ended or expired starts over at `GATHERING`.
    ///
    /// # Errors
    ///
    /// Only store failures and internal state-machine violations are
    /// returned as errors. Extraction and prediction failures end the
    /// session and are reported in the response.
    pub async fn start_or_resume(
        &self,
        session_key: Option<String>,
        user_message: &str,
    ) -> Result<TurnResponse> {
        let session_id = session_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let (shared, _) = self.store.get_or_create(&session_id).await?;
        let mut session = Arc::clone(&shared).lock_owned().await;

        // Another turn on this key finished the session while we waited. It
        // has left the store, unless the store still holds this same entry.
        if session.is_terminal() {
            drop(session);
            let (current, _) = self.store.get_or_create(&session_id).await?;
            let fresh = if Arc::ptr_eq(&current, &shared) {
                self.store.create(&session_id).await?
            } else {
                current
            };
            session = fresh.lock_owned().await;
        }

        session.push_message(ConversationMessage::user(user_message));
        if session.state == ConversationState::AwaitingUser {
            session.transition(ConversationState::Gathering)?;
        }

        let response = match self
            .extractor
            .extract(&session.history, &session.record)
            .await
        {
            Ok(output) => {
                let report = session.record.merge_extracted(&output.record);
                self.after_extraction(&mut session, report, output.remark)
                    .await?
            }
            Err(e) => {
                tracing::error!(
                    "[Conversation] Extraction by {} failed for session {}: {}",
                    self.extractor.name(),
                    session.id,
                    e
                );
                let requirements = session.record.clone();
                session.fail(e.to_string())?;
                session.push_message(ConversationMessage::assistant(EXTRACTION_APOLOGY));
                TurnResponse {
                    session_id: session.id.clone(),
                    response: EXTRACTION_APOLOGY.to_string(),
                    requires_input: false,
                    state: session.state,
                    prediction: session.prediction.clone(),
                    requirements: Some(requirements),
                    warnings: Vec::new(),
                }
            }
        };

        if session.is_terminal() {
            self.store.remove(&session_id).await?;
            tracing::info!(
                "[Conversation] Session {} finished in {}",
                session_id,
                session.state
            );
        }

        Ok(response)
    }

    async fn after_extraction(
        &self,
        session: &mut ConversationSession,
        report: MergeReport,
        remark: Option<String>,
    ) -> Result<TurnResponse> {
        let warnings: Vec<String> = report.rejected.iter().map(ToString::to_string).collect();
        let check = CompletenessChecker::check(&session.record);

        if let Some(field) = check.first_missing() {
            session.transition(ConversationState::AwaitingUser)?;

            let mut lines = Vec::new();
            let noted = noted_line(&session.record, &report);
            lines.extend(noted);
            lines.extend(warnings.iter().map(|w| format!("Ignored: {}.", w)));
            lines.extend(remark);
            lines.push(check.next_question.clone());
            let response = lines.join("\n");

            session.push_message(ConversationMessage::question(response.clone(), field));
            return Ok(TurnResponse {
                session_id: session.id.clone(),
                response,
                requires_input: true,
                state: session.state,
                prediction: None,
                requirements: Some(session.record.clone()),
                warnings,
            });
        }

        session.transition(ConversationState::Complete)?;
        let requirements = CompleteRequirements::try_from(&session.record)?;
        let result = self.pipeline.predict(&requirements).await;
        let gathered = session.record.clone();

        let response = match &result.error {
            None => {
                session.transition(ConversationState::Predicted)?;
                session.prediction = Some(result.clone());
                session.discard_record();
                success_text(&result)
            }
            Some(error) => {
                let text = format!("Prediction failed: {}", error);
                session.fail(error.clone())?;
                text
            }
        };
        session.push_message(ConversationMessage::assistant(response.clone()));

        Ok(TurnResponse {
            session_id: session.id.clone(),
            response,
            requires_input: false,
            state: session.state,
            prediction: Some(result),
            requirements: Some(gathered),
            warnings,
        })
    }

    /// The parameters gathered so far in a live session.
    pub async fn requirements(&self, session_key: &str) -> Result<Option<RequirementsRecord>> {
        match self.store.get(session_key).await? {
            Some(shared) => Ok(Some(shared.lock().await.record.clone())),
            None => Ok(None),
        }
    }

    /// Drops a session. Unknown keys are ignored.
    pub async fn end_session(&self, session_key: &str) -> Result<()> {
        self.store.remove(session_key).await?;
        Ok(())
    }

    /// Removes idle sessions. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now()).await
    }

    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }
}

fn noted_line(record: &RequirementsRecord, report: &MergeReport) -> Option<String> {
    let mut fields: Vec<_> = report
        .filled
        .iter()
        .chain(&report.corrected)
        .copied()
        .collect();
    if fields.is_empty() {
        return None;
    }
    fields.sort();
    let parts: Vec<String> = fields
        .into_iter()
        .filter_map(|field| record.get(field).map(|value| field.spec().describe(value)))
        .collect();
    Some(format!("Noted: {}.", parts.join(", ")))
}

fn success_text(result: &PredictionResult) -> String {
    match (result.rgb(), &result.hex) {
        (Some([r, g, b]), Some(hex)) => {
            format!("Prediction complete! RGB: R={r}, G={g}, B={b} | Hex: {hex}")
        }
        _ => "Prediction complete.".to_string(),
    }
}
