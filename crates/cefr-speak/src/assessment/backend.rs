use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::domain::{ScoringError, Subskills};
use super::session::RecordingSubmission;

/// Raw scores produced for a recorded conversation or practice answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub subskills: Subskills,
    pub transcript: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("analysis backend rejected the submission: {0}")]
    Rejected(String),
    #[error("analysis backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    InvalidScores(#[from] ScoringError),
}

/// Speech analysis seam. Implementations turn recorded answers into subskill
/// scores; the shipped one is [`MockSpeechAnalyzer`].
pub trait SpeechAnalyzer: Send + Sync {
    fn analyze(
        &self,
        submission: &RecordingSubmission,
    ) -> impl Future<Output = Result<AnalysisOutcome, BackendError>> + Send;
}

const MOCK_TRANSCRIPT: &str = "Thank you for sharing your thoughts. I noticed you used past tense correctly and provided good details.";

/// Placeholder backend: waits a fixed delay, then returns uniformly random
/// subskill scores in `1.0..6.0`.
#[derive(Debug)]
pub struct MockSpeechAnalyzer {
    delay: Duration,
    rng: Mutex<StdRng>,
    fail: bool,
}

impl MockSpeechAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
            fail: false,
        }
    }

    pub fn seeded(delay: Duration, seed: u64) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            fail: false,
        }
    }

    /// A backend whose every request is rejected after the delay.
    pub fn failing(delay: Duration) -> Self {
        Self {
            fail: true,
            ..Self::seeded(delay, 0)
        }
    }

    fn draw_scores(&self) -> Result<Subskills, BackendError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| BackendError::Unavailable("score generator poisoned".to_string()))?;
        let mut draw = || rng.gen_range(1.0_f64..6.0);
        Subskills::new(draw(), draw(), draw(), draw(), draw()).map_err(BackendError::from)
    }
}

impl SpeechAnalyzer for MockSpeechAnalyzer {
    fn analyze(
        &self,
        submission: &RecordingSubmission,
    ) -> impl Future<Output = Result<AnalysisOutcome, BackendError>> + Send {
        let turns = submission.turns.len();
        let outcome = if self.fail {
            Err(BackendError::Rejected("mock backend configured to fail".to_string()))
        } else {
            self.draw_scores().map(|subskills| AnalysisOutcome {
                subskills,
                transcript: Some(MOCK_TRANSCRIPT.to_string()),
            })
        };
        let delay = self.delay;

        async move {
            debug!(turns, delay_ms = delay.as_millis() as u64, "mock analysis started");
            tokio::time::sleep(delay).await;
            outcome
        }
    }
}
