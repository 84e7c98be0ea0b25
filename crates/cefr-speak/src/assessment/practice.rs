//! Single-topic practice: the prompt is played, the user answers, and the
//! answer is scored. Elapsed time only runs while the user is answering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{PracticeSession, ResultId, Subskills, UserId};
use super::prompts::PracticeTopic;
use super::scale::score_to_level;
use super::scoring::practice_feedback;
use super::session::{RecordingSubmission, SessionTicket, TurnRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeState {
    #[default]
    Idle,
    Listening,
    Recording,
    Feedback,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PracticeError {
    #[error("cannot {action} while practice is {state:?}")]
    InvalidTransition {
        state: PracticeState,
        action: &'static str,
    },
    #[error("practice is closed once the target level is reached")]
    Locked,
}

#[derive(Debug, Default)]
pub struct PracticeSessionMachine {
    state: PracticeState,
    topic: Option<PracticeTopic>,
    elapsed: u32,
    epoch: u64,
    session: Option<PracticeSession>,
}

impl PracticeSessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PracticeState {
        self.state
    }

    pub fn topic(&self) -> Option<&PracticeTopic> {
        self.topic.as_ref()
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn session(&self) -> Option<&PracticeSession> {
        self.session.as_ref()
    }

    fn ticket(&self) -> SessionTicket {
        SessionTicket::at(self.epoch)
    }

    fn advance_epoch(&mut self) -> SessionTicket {
        self.epoch += 1;
        self.ticket()
    }

    fn reject(&self, action: &'static str) -> PracticeError {
        PracticeError::InvalidTransition {
            state: self.state,
            action,
        }
    }

    /// Begins playing the topic prompt.
    pub fn start(&mut self, topic: PracticeTopic) -> Result<SessionTicket, PracticeError> {
        if self.state != PracticeState::Idle {
            return Err(self.reject("start"));
        }
        info!(topic = topic.key, "practice started");
        self.topic = Some(topic);
        self.elapsed = 0;
        self.session = None;
        self.state = PracticeState::Listening;
        Ok(self.advance_epoch())
    }

    /// Returns `false` when the ticket belongs to an abandoned attempt.
    pub fn playback_finished(&mut self, ticket: SessionTicket) -> Result<bool, PracticeError> {
        if ticket != self.ticket() {
            return Ok(false);
        }
        if self.state != PracticeState::Listening {
            return Err(self.reject("open the recorder"));
        }
        self.state = PracticeState::Recording;
        Ok(true)
    }

    pub fn tick(&mut self, ticket: SessionTicket) -> bool {
        if ticket != self.ticket() || self.state != PracticeState::Recording {
            return false;
        }
        self.elapsed += 1;
        true
    }

    /// Stops recording and returns what should be sent for scoring.
    pub fn finish_recording(
        &mut self,
    ) -> Result<(SessionTicket, RecordingSubmission), PracticeError> {
        if self.state != PracticeState::Recording {
            return Err(self.reject("finish recording"));
        }
        self.state = PracticeState::Feedback;
        let ticket = self.advance_epoch();
        let prompt = self
            .topic
            .as_ref()
            .map(|topic| topic.prompt.to_string())
            .unwrap_or_default();
        debug!(elapsed = self.elapsed, "practice answer submitted");
        Ok((
            ticket,
            RecordingSubmission {
                turns: vec![TurnRecord {
                    turn: 0,
                    prompt,
                    answered_at: self.elapsed,
                }],
                elapsed: self.elapsed,
            },
        ))
    }

    /// Attaches scores to the submitted answer. `duration_secs` is the
    /// recording time in seconds; the machine itself only counts ticks.
    /// Returns `None` for a stale ticket.
    pub fn score(
        &mut self,
        ticket: SessionTicket,
        subskills: Subskills,
        user_id: UserId,
        completed_at: DateTime<Utc>,
        duration_secs: u32,
    ) -> Result<Option<&PracticeSession>, PracticeError> {
        if ticket != self.ticket() {
            return Ok(None);
        }
        if self.state != PracticeState::Feedback || self.session.is_some() {
            return Err(self.reject("record a score"));
        }

        let score = subskills.mean();
        let topic = self
            .topic
            .as_ref()
            .map(|topic| topic.title.to_string())
            .unwrap_or_default();
        info!(topic = %topic, score, "practice scored");
        let session: &PracticeSession = self.session.insert(PracticeSession {
            id: ResultId::generate(),
            user_id,
            topic,
            score,
            subskills,
            feedback: practice_feedback(score_to_level(score)),
            completed_at,
            duration: duration_secs,
        });
        Ok(Some(session))
    }

    /// Returns to idle from any state, dropping the current attempt.
    pub fn reset(&mut self) {
        self.state = PracticeState::Idle;
        self.topic = None;
        self.elapsed = 0;
        self.session = None;
        self.advance_epoch();
    }
}
