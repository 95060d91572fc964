use super::{
    fsm::{SessionEvent, SessionState, SessionStateMachine},
    types::{AnalyzeOutcome, SessionView},
};
use crate::{Result, assistant::MedicalAssistant, image};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// One user's interaction state: the pending upload, the last analysis and
/// the simplify toggle.
pub struct Session {
    id: Uuid,
    fsm: SessionStateMachine,
    upload_dir: PathBuf,
    filename: Option<PathBuf>,
    result: Option<String>,
    simplify: bool,
    simplified: Option<String>,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            id,
            fsm: SessionStateMachine::new(),
            upload_dir: upload_dir.into(),
            filename: None,
            result: None,
            simplify: false,
            simplified: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.fsm.current_state()
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn simplified(&self) -> Option<&str> {
        self.simplified.as_deref()
    }

    /// Stores the upload in a fresh temp file and forgets the previous one.
    ///
    /// A superseded file is removed from disk; any earlier result is cleared.
    pub async fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = image::write_temp_image(&self.upload_dir, file_name, bytes).await?;
        self.fsm.transition(SessionEvent::Upload)?;

        if let Some(previous) = self.filename.replace(path.clone()) {
            image::discard_temp_image(&previous).await;
        }
        self.result = None;
        self.simplify = false;
        self.simplified = None;

        info!(
            "Session {} stored upload '{}' ({} bytes)",
            self.id,
            file_name,
            bytes.len()
        );

        Ok(path)
    }

    /// Sends the stored file for analysis.
    ///
    /// Without a stored file on disk this is a no-op. On success the result is
    /// stored and the file removed; on failure the file stays for a retry.
    pub async fn analyze(&mut self, assistant: &MedicalAssistant) -> Result<AnalyzeOutcome> {
        let path = match &self.filename {
            Some(path) if tokio::fs::try_exists(path).await.unwrap_or(false) => path.clone(),
            Some(path) => {
                warn!(
                    "Session {}: stored file {} is missing, skipping analysis",
                    self.id,
                    path.display()
                );
                return Ok(AnalyzeOutcome::Skipped);
            }
            None => {
                warn!("Session {}: nothing uploaded, skipping analysis", self.id);
                return Ok(AnalyzeOutcome::Skipped);
            }
        };

        match assistant.analyze_image(&path).await {
            Ok(result) => {
                self.fsm.transition(SessionEvent::AnalysisSucceeded)?;
                self.result = Some(result.clone());
                self.filename = None;
                image::discard_temp_image(&path).await;
                info!("Session {} analysis complete", self.id);
                Ok(AnalyzeOutcome::Analyzed(result))
            }
            Err(e) => {
                self.fsm.transition(SessionEvent::AnalysisFailed)?;
                warn!(
                    "Session {} analysis failed, keeping {}: {}",
                    self.id,
                    path.display(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Applies the simplify toggle. Turning it on always asks the model anew.
    ///
    /// A failed call leaves the toggle off with no simplified text, even when
    /// an earlier explanation was on display.
    pub async fn set_simplify(
        &mut self,
        enabled: bool,
        assistant: &MedicalAssistant,
    ) -> Result<Option<&str>> {
        if !enabled {
            self.clear_simplified()?;
            return Ok(None);
        }

        // Reject before spending a model call.
        self.fsm.next_state(SessionEvent::SimplifyOn)?;
        self.clear_simplified()?;

        let result = self.result.as_deref().unwrap_or_default();
        let simplified = match assistant.simplify(result).await {
            Ok(simplified) => simplified,
            Err(e) => {
                warn!("Session {} simplification failed: {}", self.id, e);
                return Err(e);
            }
        };

        self.fsm.transition(SessionEvent::SimplifyOn)?;
        self.simplify = true;
        self.simplified = Some(simplified);

        Ok(self.simplified.as_deref())
    }

    fn clear_simplified(&mut self) -> Result<()> {
        if matches!(self.state(), SessionState::Simplified) {
            self.fsm.transition(SessionEvent::SimplifyOff)?;
        }
        self.simplify = false;
        self.simplified = None;
        Ok(())
    }

    /// Ends the session, removing a file that was never analyzed.
    pub async fn discard(&mut self) {
        if let Some(path) = self.filename.take() {
            image::discard_temp_image(&path).await;
        }
    }

    pub fn view(&self, skipped: bool) -> SessionView {
        SessionView {
            session_id: self.id,
            state: self.state(),
            has_file: self.filename.is_some(),
            result: self.result.clone(),
            simplify: self.simplify,
            simplified: self.simplified.clone(),
            skipped,
            created_at: self.created_at,
        }
    }
}
