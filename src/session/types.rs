use super::SessionState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    Analyzed(String),
    /// No stored file, or it is gone from disk. Nothing was sent.
    Skipped,
}

/// What the page renders for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    pub has_file: bool,
    pub result: Option<String>,
    pub simplify: bool,
    pub simplified: Option<String>,
    pub skipped: bool,
    pub created_at: DateTime<Utc>,
}
