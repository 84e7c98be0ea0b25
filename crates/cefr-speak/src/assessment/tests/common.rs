use chrono::{DateTime, TimeZone, Utc};

use crate::assessment::domain::{
    CefrLevel, LearningGoal, Subskills, TestResult, UserId, UserProfile,
};
use crate::assessment::prompts::PromptScript;
use crate::assessment::scoring::{aggregate, ResultContext};
use crate::assessment::session::{AssessmentSession, Directive, SessionTicket};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn profile(target: CefrLevel) -> UserProfile {
    UserProfile {
        id: UserId("3f2a9c0d41b7e8a6".to_string()),
        name: "Mariana".to_string(),
        age: Some(31),
        native_language: Some("Portuguese".to_string()),
        learning_goal: LearningGoal::JobInterview,
        target_cefr: target,
        created_at: now(),
    }
}

pub(super) fn result_with_score(score: f64) -> TestResult {
    let subskills = Subskills::uniform(score).expect("score in range");
    aggregate(
        &subskills,
        ResultContext::new(profile(CefrLevel::B2).id, 96, now()),
    )
}

pub(super) fn five_prompts() -> PromptScript {
    PromptScript::new(["one", "two", "three", "four", "five"]).expect("non-empty script")
}

/// Starts `session` and walks it into recording the first answer.
pub(super) fn begin_recording(session: &mut AssessmentSession) -> SessionTicket {
    let ticket = session.start().expect("idle session starts");
    let speak = session.prompt_ready(ticket).expect("prompt ready");
    let Directive::Speak { ticket: playback, .. } = speak else {
        panic!("expected speak directive, got {speak:?}");
    };
    let record = session
        .playback_finished(playback)
        .expect("playback finished");
    assert_eq!(record, Directive::Record { turn: 0 });
    ticket
}

/// Answers the current prompt and waits for the next one to be recorded.
pub(super) fn answer_and_continue(session: &mut AssessmentSession) {
    let directive = session.user_done().expect("user done while recording");
    let Directive::Speak { ticket, turn, .. } = directive else {
        panic!("expected another prompt, got {directive:?}");
    };
    assert_eq!(
        session.playback_finished(ticket).expect("playback finished"),
        Directive::Record { turn }
    );
}

pub(super) fn tick_times(session: &mut AssessmentSession, ticket: SessionTicket, times: u32) {
    for _ in 0..times {
        assert!(session.tick(ticket));
    }
}
