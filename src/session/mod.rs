mod context;
pub mod fsm;
mod store;
mod types;

pub use context::Session;
pub use fsm::{SessionEvent, SessionState, SessionStateMachine};
pub use store::SessionStore;
pub use types::{AnalyzeOutcome, SessionView};
