//! Runs the session state machines against real time.
//!
//! The driver owns every timer: the elapsed-time ticker, prompt playback,
//! the simulated user answer and the analysis call. Cancelling the token
//! abandons whatever is in flight.

use chrono::Utc;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::backend::{BackendError, SpeechAnalyzer};
use super::domain::{PracticeSession, TestResult, UserProfile};
use super::practice::{PracticeError, PracticeSessionMachine};
use super::progress::practice_locked;
use super::prompts::{PracticeTopic, PromptScript};
use super::scoring::{aggregate, ResultContext};
use super::session::{AssessmentSession, Directive, SessionError, SessionTicket};
use super::store::AppStore;
use crate::config::SessionConfig;

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("no profile is set up yet")]
    MissingUser,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Practice(#[from] PracticeError),
    #[error("speech analysis failed: {0}")]
    Backend(#[from] BackendError),
    #[error("cancelled after {elapsed} ticks")]
    Cancelled { elapsed: u32 },
}

/// Progress notifications for whoever is presenting the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Starting,
    Speaking { turn: usize, prompt: String },
    Recording { turn: usize },
    Analyzing { answered: usize, elapsed: u32 },
    Completed,
    Failed,
}

pub trait SessionObserver {
    fn notify(&mut self, update: SessionUpdate);
}

impl SessionObserver for () {
    fn notify(&mut self, _update: SessionUpdate) {}
}

impl SessionObserver for Vec<SessionUpdate> {
    fn notify(&mut self, update: SessionUpdate) {
        self.push(update);
    }
}

/// The step the driver is waiting on besides the ticker.
enum Pending {
    PlaybackFinished(SessionTicket, Instant),
    UserDone(Instant),
}

impl Pending {
    fn deadline(&self) -> Instant {
        match self {
            Self::PlaybackFinished(_, at) | Self::UserDone(at) => *at,
        }
    }
}

pub struct SessionDriver<A> {
    analyzer: A,
    script: PromptScript,
    config: SessionConfig,
}

impl<A: SpeechAnalyzer> SessionDriver<A> {
    pub fn new(analyzer: A, config: SessionConfig) -> Self {
        Self {
            analyzer,
            script: PromptScript::standard(),
            config,
        }
    }

    pub fn with_script(mut self, script: PromptScript) -> Self {
        self.script = script;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn ticker(&self) -> tokio::time::Interval {
        let tick = self.config.tick_interval;
        let mut ticker = interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    fn seconds(&self, ticks: u32) -> u32 {
        u32::try_from((self.config.tick_interval * ticks).as_secs()).unwrap_or(u32::MAX)
    }

    /// Runs one full speaking test for the current user. On success the
    /// result is recorded in `store`; on failure or cancellation the store is
    /// left as it was, apart from the recording flag being cleared.
    pub async fn run_assessment(
        &self,
        store: &mut AppStore,
        cancel: &CancellationToken,
        observer: &mut impl SessionObserver,
    ) -> Result<TestResult, AssessmentError> {
        let user = store
            .current_user()
            .cloned()
            .ok_or(AssessmentError::MissingUser)?;

        let mut session = AssessmentSession::new(self.script.clone(), self.config.time_budget);
        let outcome = self
            .converse(&mut session, &user, store, cancel, observer)
            .await;
        store.set_recording(false);

        match outcome {
            Ok(result) => {
                store.record_test_result(result.clone());
                observer.notify(SessionUpdate::Completed);
                Ok(result)
            }
            Err(err) => {
                if !matches!(err, AssessmentError::Cancelled { .. }) {
                    observer.notify(SessionUpdate::Failed);
                }
                Err(err)
            }
        }
    }

    async fn converse(
        &self,
        session: &mut AssessmentSession,
        user: &UserProfile,
        store: &mut AppStore,
        cancel: &CancellationToken,
        observer: &mut impl SessionObserver,
    ) -> Result<TestResult, AssessmentError> {
        if cancel.is_cancelled() {
            return Err(AssessmentError::Cancelled { elapsed: 0 });
        }

        let conversation = session.start()?;
        observer.notify(SessionUpdate::Starting);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.cancel();
                return Err(AssessmentError::Cancelled { elapsed: session.elapsed() });
            }
            _ = tokio::time::sleep(self.config.startup_delay) => {}
        }
        let mut directive = session.prompt_ready(conversation)?;
        // Elapsed counts from entry into the conversation.
        let mut ticker = self.ticker();

        let (ticket, submission) = loop {
            store.set_recording(session.is_recording());
            let pending = match directive {
                Directive::Speak { turn, prompt, ticket } => {
                    observer.notify(SessionUpdate::Speaking { turn, prompt });
                    Pending::PlaybackFinished(ticket, Instant::now() + self.config.playback_delay)
                }
                Directive::Record { turn } => {
                    observer.notify(SessionUpdate::Recording { turn });
                    Pending::UserDone(Instant::now() + self.config.response_duration)
                }
                Directive::Analyze { ticket, submission } => break (ticket, submission),
                Directive::Discarded => {
                    warn!("driver step arrived for an abandoned phase");
                    return Err(AssessmentError::Cancelled {
                        elapsed: session.elapsed(),
                    });
                }
            };

            let step_due = sleep_until(pending.deadline());
            tokio::pin!(step_due);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        session.cancel();
                        return Err(AssessmentError::Cancelled { elapsed: session.elapsed() });
                    }
                    _ = ticker.tick() => {
                        session.tick(conversation);
                    }
                    _ = &mut step_due => break,
                }
            }

            directive = match pending {
                Pending::PlaybackFinished(ticket, _) => session.playback_finished(ticket)?,
                Pending::UserDone(_) => session.user_done()?,
            };
        };

        observer.notify(SessionUpdate::Analyzing {
            answered: submission.turns.len(),
            elapsed: submission.elapsed,
        });

        let analysis = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                session.cancel();
                return Err(AssessmentError::Cancelled { elapsed: session.elapsed() });
            }
            outcome = self.analyzer.analyze(&submission) => outcome,
        };

        let outcome = match analysis {
            Ok(outcome) => outcome,
            Err(err) => {
                session.fail(ticket)?;
                warn!(error = %err, "assessment analysis failed");
                return Err(err.into());
            }
        };

        let mut context = ResultContext::new(
            user.id.clone(),
            self.seconds(submission.elapsed),
            Utc::now(),
        );
        context.transcript = outcome.transcript;
        let result = aggregate(&outcome.subskills, context);

        let stored = session.complete(ticket, result)?.cloned();
        stored.ok_or(AssessmentError::Cancelled {
            elapsed: session.elapsed(),
        })
    }

    /// Runs one practice answer on `topic`. Closed once the current result
    /// meets the user's target.
    pub async fn run_practice(
        &self,
        topic: PracticeTopic,
        store: &mut AppStore,
        cancel: &CancellationToken,
        observer: &mut impl SessionObserver,
    ) -> Result<PracticeSession, AssessmentError> {
        let user = store
            .current_user()
            .cloned()
            .ok_or(AssessmentError::MissingUser)?;
        if practice_locked(store) {
            return Err(PracticeError::Locked.into());
        }

        let mut machine = PracticeSessionMachine::new();
        let outcome = self
            .practice(&mut machine, topic, &user, store, cancel, observer)
            .await;
        store.set_recording(false);

        let session = outcome?;
        store.record_practice_session(session.clone());
        info!(topic = %session.topic, score = session.score, "practice recorded");
        Ok(session)
    }

    async fn practice(
        &self,
        machine: &mut PracticeSessionMachine,
        topic: PracticeTopic,
        user: &UserProfile,
        store: &mut AppStore,
        cancel: &CancellationToken,
        observer: &mut impl SessionObserver,
    ) -> Result<PracticeSession, AssessmentError> {
        let prompt = topic.prompt.to_string();
        let attempt = machine.start(topic)?;
        observer.notify(SessionUpdate::Speaking { turn: 0, prompt });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                machine.reset();
                return Err(AssessmentError::Cancelled { elapsed: 0 });
            }
            _ = tokio::time::sleep(self.config.playback_delay) => {}
        }
        machine.playback_finished(attempt)?;
        store.set_recording(true);
        observer.notify(SessionUpdate::Recording { turn: 0 });

        let mut ticker = self.ticker();
        let answer_ends = sleep_until(Instant::now() + self.config.response_duration);
        tokio::pin!(answer_ends);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let elapsed = machine.elapsed();
                    machine.reset();
                    return Err(AssessmentError::Cancelled { elapsed });
                }
                _ = ticker.tick() => {
                    machine.tick(attempt);
                }
                _ = &mut answer_ends => break,
            }
        }

        let (ticket, submission) = machine.finish_recording()?;
        store.set_recording(false);
        observer.notify(SessionUpdate::Analyzing {
            answered: submission.turns.len(),
            elapsed: submission.elapsed,
        });

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let elapsed = machine.elapsed();
                machine.reset();
                return Err(AssessmentError::Cancelled { elapsed });
            }
            outcome = self.analyzer.analyze(&submission) => outcome,
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                machine.reset();
                observer.notify(SessionUpdate::Failed);
                return Err(err.into());
            }
        };

        let duration_secs = self.seconds(submission.elapsed);
        let scored = machine
            .score(
                ticket,
                outcome.subskills,
                user.id.clone(),
                Utc::now(),
                duration_secs,
            )?
            .cloned();
        let session = scored.ok_or(AssessmentError::Cancelled {
            elapsed: machine.elapsed(),
        })?;
        observer.notify(SessionUpdate::Completed);
        Ok(session)
    }
}
