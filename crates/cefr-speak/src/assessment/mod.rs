pub mod backend;
pub mod domain;
pub mod driver;
pub mod export;
pub mod practice;
pub mod profile;
pub mod progress;
pub mod prompts;
pub mod scale;
pub mod scoring;
pub mod session;
mod store;

pub use backend::{AnalysisOutcome, BackendError, MockSpeechAnalyzer, SpeechAnalyzer};
pub use domain::{
    CefrLevel, LearningGoal, PracticeSession, ResultId, Subskill, Subskills, TestResult, UserId,
    UserProfile,
};
pub use driver::{AssessmentError, SessionDriver, SessionObserver, SessionUpdate};
pub use practice::{PracticeError, PracticeSessionMachine, PracticeState};
pub use profile::{JsonFileProfileStore, ProfileDraft, ProfileRepository};
pub use session::{AssessmentSession, Directive, SessionState, SessionTicket, TurnPhase};
pub use store::AppStore;

#[cfg(test)]
mod tests;
