mod orchestrator;
mod session;

pub use orchestrator::ExchangeOutcome;
pub use orchestrator::FetchOutcome;
pub use orchestrator::PlaylistOutcome;
pub use orchestrator::ResumeOutcome;
pub use orchestrator::SessionOrchestrator;
pub use session::PlaylistTarget;
pub use session::Session;
pub use session::SessionEvent;
pub use session::SessionState;
