use super::domain::{PracticeSession, TestResult, UserProfile};

/// Process-wide application state, constructed once at startup and passed by
/// reference to whoever needs it. Setters are the only mutation path; the
/// store performs no validation or derivation of its own.
#[derive(Debug, Default, Clone)]
pub struct AppStore {
    current_user: Option<UserProfile>,
    current_result: Option<TestResult>,
    test_history: Vec<TestResult>,
    practice_history: Vec<PracticeSession>,
    is_recording: bool,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: Option<UserProfile>) -> Self {
        Self {
            current_user: user,
            ..Self::default()
        }
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn set_current_user(&mut self, user: Option<UserProfile>) {
        self.current_user = user;
    }

    pub fn current_result(&self) -> Option<&TestResult> {
        self.current_result.as_ref()
    }

    pub fn set_current_result(&mut self, result: Option<TestResult>) {
        self.current_result = result;
    }

    pub fn test_history(&self) -> &[TestResult] {
        &self.test_history
    }

    pub fn set_test_history(&mut self, history: Vec<TestResult>) {
        self.test_history = history;
    }

    pub fn practice_history(&self) -> &[PracticeSession] {
        &self.practice_history
    }

    pub fn set_practice_history(&mut self, history: Vec<PracticeSession>) {
        self.practice_history = history;
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.is_recording = recording;
    }

    /// Makes `result` the current result and appends it to the test history.
    pub fn record_test_result(&mut self, result: TestResult) {
        self.test_history.push(result.clone());
        self.current_result = Some(result);
    }

    pub fn record_practice_session(&mut self, session: PracticeSession) {
        self.practice_history.push(session);
    }
}
