//! Event-driven state machine for one assessment conversation.
//!
//! The machine owns no timers. A driver feeds it discrete events (`tick`,
//! `prompt_ready`, `playback_finished`, `user_done`, and the analysis
//! outcome) and acts on the [`Directive`] each transition returns.
//!
//! Every asynchronous callback carries the [`SessionTicket`] issued for the
//! phase that scheduled it. Leaving the conversation, cancelling, failing or
//! restarting bumps the session epoch, so callbacks from an abandoned phase
//! are discarded instead of resurrecting it.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::TestResult;
use super::prompts::PromptScript;

pub const DEFAULT_TIME_BUDGET: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// The prompt for the current turn is being played back.
    Listening,
    /// The user is answering the current prompt.
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "phase")]
pub enum SessionState {
    Idle,
    Starting,
    Conversation(TurnPhase),
    Processing,
    Completed,
}

impl SessionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Conversation(TurnPhase::Listening) => "conversation/listening",
            Self::Conversation(TurnPhase::Recording) => "conversation/recording",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    PromptReady,
    PlaybackFinished,
    UserDone,
    Complete,
    Fail,
}

/// Epoch-stamped token tying a callback to the phase that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionTicket {
    epoch: u64,
}

impl SessionTicket {
    pub(super) const fn at(epoch: u64) -> Self {
        Self { epoch }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub turn: usize,
    pub prompt: String,
    /// Elapsed ticks when the user finished answering.
    pub answered_at: u32,
}

/// Everything the analysis backend receives once the conversation ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingSubmission {
    pub turns: Vec<TurnRecord>,
    pub elapsed: u32,
}

/// What the driver should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Play `prompt` back and report `playback_finished` with `ticket`.
    Speak {
        turn: usize,
        prompt: String,
        ticket: SessionTicket,
    },
    /// Open the recorder for `turn` and report `user_done` when the answer ends.
    Record { turn: usize },
    /// Send the submission for analysis and report the outcome with `ticket`.
    Analyze {
        ticket: SessionTicket,
        submission: RecordingSubmission,
    },
    /// The callback belonged to an abandoned phase and had no effect.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot handle {event:?} while the session is {}", .state.label())]
    InvalidTransition {
        state: SessionState,
        event: SessionEvent,
    },
}

#[derive(Debug)]
pub struct AssessmentSession {
    script: PromptScript,
    time_budget: u32,
    state: SessionState,
    turn: usize,
    elapsed: u32,
    epoch: u64,
    answers: Vec<TurnRecord>,
    result: Option<TestResult>,
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new(PromptScript::standard(), DEFAULT_TIME_BUDGET)
    }
}

impl AssessmentSession {
    pub fn new(script: PromptScript, time_budget: u32) -> Self {
        Self {
            script,
            time_budget,
            state: SessionState::Idle,
            turn: 0,
            elapsed: 0,
            epoch: 0,
            answers: Vec::new(),
            result: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn time_budget(&self) -> u32 {
        self.time_budget
    }

    pub fn prompt_count(&self) -> usize {
        self.script.len()
    }

    pub fn current_prompt(&self) -> Option<&str> {
        match self.state {
            SessionState::Conversation(_) => self.script.get(self.turn),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Conversation(TurnPhase::Recording)
    }

    /// The ticket that callbacks scheduled now should carry.
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket { epoch: self.epoch }
    }

    fn is_current(&self, ticket: SessionTicket) -> bool {
        ticket.epoch == self.epoch
    }

    fn advance_epoch(&mut self) -> SessionTicket {
        self.epoch += 1;
        self.ticket()
    }

    fn reject(&self, event: SessionEvent) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state,
            event,
        }
    }

    pub fn start(&mut self) -> Result<SessionTicket, SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.reject(SessionEvent::Start));
        }

        self.turn = 0;
        self.elapsed = 0;
        self.answers.clear();
        self.state = SessionState::Starting;
        let ticket = self.advance_epoch();
        info!(
            prompts = self.script.len(),
            budget = self.time_budget,
            "assessment session starting"
        );
        Ok(ticket)
    }

    pub fn prompt_ready(&mut self, ticket: SessionTicket) -> Result<Directive, SessionError> {
        if !self.is_current(ticket) {
            return Ok(Directive::Discarded);
        }
        if self.state != SessionState::Starting {
            return Err(self.reject(SessionEvent::PromptReady));
        }

        self.state = SessionState::Conversation(TurnPhase::Listening);
        Ok(self.speak_current())
    }

    pub fn playback_finished(&mut self, ticket: SessionTicket) -> Result<Directive, SessionError> {
        if !self.is_current(ticket) {
            return Ok(Directive::Discarded);
        }
        if self.state != SessionState::Conversation(TurnPhase::Listening) {
            return Err(self.reject(SessionEvent::PlaybackFinished));
        }

        self.state = SessionState::Conversation(TurnPhase::Recording);
        debug!(turn = self.turn, "recording answer");
        Ok(Directive::Record { turn: self.turn })
    }

    /// The user finished answering the current prompt.
    pub fn user_done(&mut self) -> Result<Directive, SessionError> {
        if self.state != SessionState::Conversation(TurnPhase::Recording) {
            return Err(self.reject(SessionEvent::UserDone));
        }

        self.answers.push(TurnRecord {
            turn: self.turn,
            prompt: self.script.get(self.turn).unwrap_or_default().to_string(),
            answered_at: self.elapsed,
        });

        let last_turn = self.turn >= self.script.last_turn();
        let out_of_time = self.elapsed >= self.time_budget;
        if last_turn || out_of_time {
            self.state = SessionState::Processing;
            let ticket = self.advance_epoch();
            info!(
                turn = self.turn,
                elapsed = self.elapsed,
                out_of_time,
                "conversation finished, analyzing answers"
            );
            return Ok(Directive::Analyze {
                ticket,
                submission: RecordingSubmission {
                    turns: self.answers.clone(),
                    elapsed: self.elapsed,
                },
            });
        }

        self.turn += 1;
        self.state = SessionState::Conversation(TurnPhase::Listening);
        Ok(self.speak_current())
    }

    fn speak_current(&self) -> Directive {
        debug!(turn = self.turn, "speaking prompt");
        Directive::Speak {
            turn: self.turn,
            prompt: self.script.get(self.turn).unwrap_or_default().to_string(),
            ticket: self.ticket(),
        }
    }

    /// Counts one time unit. Returns whether the tick was applied; ticks
    /// outside the conversation or from an abandoned phase are ignored.
    pub fn tick(&mut self, ticket: SessionTicket) -> bool {
        if !self.is_current(ticket) || !matches!(self.state, SessionState::Conversation(_)) {
            return false;
        }
        self.elapsed += 1;
        true
    }

    /// Stores the analysis result. Returns `None` when the ticket is stale,
    /// in which case nothing is stored.
    pub fn complete(
        &mut self,
        ticket: SessionTicket,
        result: TestResult,
    ) -> Result<Option<&TestResult>, SessionError> {
        if !self.is_current(ticket) {
            return Ok(None);
        }
        if self.state != SessionState::Processing {
            return Err(self.reject(SessionEvent::Complete));
        }

        info!(cefr_level = %result.cefr_level, score = result.overall_score, "assessment completed");
        self.state = SessionState::Completed;
        let stored: &TestResult = self.result.insert(result);
        Ok(Some(stored))
    }

    /// Analysis failed: drop back to idle without a result.
    pub fn fail(&mut self, ticket: SessionTicket) -> Result<bool, SessionError> {
        if !self.is_current(ticket) {
            return Ok(false);
        }
        if self.state != SessionState::Processing {
            return Err(self.reject(SessionEvent::Fail));
        }

        warn!(elapsed = self.elapsed, "analysis failed, session reset to idle");
        self.state = SessionState::Idle;
        self.advance_epoch();
        Ok(true)
    }

    /// Abandons a running session. The elapsed counter keeps its last value.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SessionState::Starting | SessionState::Conversation(_) | SessionState::Processing => {
                info!(
                    from = self.state.label(),
                    turn = self.turn,
                    elapsed = self.elapsed,
                    "assessment session cancelled"
                );
                self.state = SessionState::Idle;
                self.advance_epoch();
                true
            }
            SessionState::Idle | SessionState::Completed => false,
        }
    }
}
