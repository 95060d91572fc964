use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    FileUploaded,
    Analyzed,
    Simplified,
}

// Session events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Upload,
    AnalysisSucceeded,
    AnalysisFailed,
    SimplifyOn,
    SimplifyOff,
}

pub struct SessionStateMachine {
    state: SessionState,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Empty,
        }
    }

    pub fn current_state(&self) -> SessionState {
        self.state
    }

    /// State the machine would move to, without moving.
    pub fn next_state(&self, event: SessionEvent) -> Result<SessionState> {
        let next = match (self.state, event) {
            (_, SessionEvent::Upload) => SessionState::FileUploaded,
            (SessionState::FileUploaded, SessionEvent::AnalysisSucceeded) => {
                SessionState::Analyzed
            }
            (SessionState::FileUploaded, SessionEvent::AnalysisFailed) => {
                SessionState::FileUploaded
            }
            (SessionState::Analyzed | SessionState::Simplified, SessionEvent::SimplifyOn) => {
                SessionState::Simplified
            }
            (SessionState::Analyzed | SessionState::Simplified, SessionEvent::SimplifyOff) => {
                SessionState::Analyzed
            }
            _ => {
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", self.state),
                    requested: format!("{:?}", event),
                });
            }
        };
        Ok(next)
    }

    pub fn transition(&mut self, event: SessionEvent) -> Result<()> {
        let old_state = self.state;
        debug!("Session FSM processing {:?} in state {:?}", event, old_state);

        let new_state = match self.next_state(event) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Invalid session transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(e);
            }
        };

        if old_state != new_state {
            info!(
                "Session state transition: {:?} -> {:?} (event: {:?})",
                old_state, new_state, event
            );
        }

        self.state = new_state;
        Ok(())
    }
}
