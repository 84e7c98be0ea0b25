use super::common::*;
use crate::assessment::domain::CefrLevel;
use crate::assessment::session::{
    AssessmentSession, Directive, SessionError, SessionEvent, SessionState, TurnPhase,
};

#[test]
fn start_resets_turn_and_elapsed() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    let ticket = begin_recording(&mut session);
    tick_times(&mut session, ticket, 12);
    answer_and_continue(&mut session);
    assert!(session.cancel());

    session.start().expect("cancelled session restarts");
    assert_eq!(session.state(), SessionState::Starting);
    assert_eq!(session.turn(), 0);
    assert_eq!(session.elapsed(), 0);
}

#[test]
fn turns_advance_one_at_a_time_until_the_last_prompt() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    begin_recording(&mut session);
    assert!(session.is_recording());
    assert_eq!(session.current_prompt(), Some("one"));

    for expected in 1..5 {
        answer_and_continue(&mut session);
        assert_eq!(session.turn(), expected);
    }

    match session.user_done().expect("last answer") {
        Directive::Analyze { submission, .. } => {
            assert_eq!(submission.turns.len(), 5);
            assert_eq!(submission.turns[4].prompt, "five");
        }
        other => panic!("expected analysis, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Processing);
    assert_eq!(session.current_prompt(), None);
}

#[test]
fn running_out_of_time_skips_remaining_prompts() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    let ticket = begin_recording(&mut session);
    answer_and_continue(&mut session);
    answer_and_continue(&mut session);
    assert_eq!(session.turn(), 2);

    tick_times(&mut session, ticket, 121);

    match session.user_done().expect("answer past the budget") {
        Directive::Analyze { submission, .. } => {
            assert_eq!(submission.turns.len(), 3);
            assert_eq!(submission.elapsed, 121);
        }
        other => panic!("expected analysis, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Processing);
}

#[test]
fn ticks_only_count_during_the_conversation() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    let ticket = session.start().expect("starts");
    assert!(!session.tick(ticket));
    assert_eq!(session.elapsed(), 0);

    session.prompt_ready(ticket).expect("prompt ready");
    assert_eq!(
        session.state(),
        SessionState::Conversation(TurnPhase::Listening)
    );
    assert!(session.tick(ticket));
    assert_eq!(session.elapsed(), 1);
}

#[test]
fn cancel_freezes_elapsed_and_discards_stale_callbacks() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    let ticket = begin_recording(&mut session);
    tick_times(&mut session, ticket, 40);

    assert!(session.cancel());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.elapsed(), 40);

    assert!(!session.tick(ticket));
    assert_eq!(
        session.playback_finished(ticket).expect("stale ticket is not an error"),
        Directive::Discarded
    );
    assert_eq!(
        session.prompt_ready(ticket).expect("stale ticket is not an error"),
        Directive::Discarded
    );
    assert_eq!(session.elapsed(), 40);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.cancel());
}

#[test]
fn callbacks_from_a_previous_run_do_not_reach_a_new_one() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    let old = session.start().expect("starts");
    session.cancel();
    let fresh = session.start().expect("restarts");
    assert_ne!(old, fresh);

    assert_eq!(
        session.prompt_ready(old).expect("stale"),
        Directive::Discarded
    );
    assert_eq!(session.state(), SessionState::Starting);
    assert!(matches!(
        session.prompt_ready(fresh).expect("current"),
        Directive::Speak { turn: 0, .. }
    ));
}

#[test]
fn out_of_order_events_are_rejected() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    assert_eq!(
        session.user_done(),
        Err(SessionError::InvalidTransition {
            state: SessionState::Idle,
            event: SessionEvent::UserDone,
        })
    );

    let ticket = session.start().expect("starts");
    assert!(matches!(
        session.start(),
        Err(SessionError::InvalidTransition {
            event: SessionEvent::Start,
            ..
        })
    ));
    assert!(matches!(
        session.playback_finished(ticket),
        Err(SessionError::InvalidTransition {
            state: SessionState::Starting,
            event: SessionEvent::PlaybackFinished,
        })
    ));
}

#[test]
fn completion_stores_the_result_and_is_terminal() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    begin_recording(&mut session);
    for _ in 1..5 {
        answer_and_continue(&mut session);
    }
    let Directive::Analyze { ticket, .. } = session.user_done().expect("last answer") else {
        panic!("expected analysis");
    };

    let stored = session
        .complete(ticket, result_with_score(4.0))
        .expect("processing accepts a result")
        .expect("ticket is current");
    assert_eq!(stored.cefr_level, CefrLevel::B2);
    assert_eq!(session.state(), SessionState::Completed);
    assert!(session.result().is_some());

    assert!(session.start().is_err());
    assert!(!session.cancel());
}

#[test]
fn failed_analysis_returns_to_idle_without_a_result() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    begin_recording(&mut session);
    for _ in 1..5 {
        answer_and_continue(&mut session);
    }
    let Directive::Analyze { ticket, .. } = session.user_done().expect("last answer") else {
        panic!("expected analysis");
    };

    assert_eq!(session.fail(ticket), Ok(true));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.result().is_none());

    assert_eq!(
        session
            .complete(ticket, result_with_score(5.0))
            .expect("stale completion is ignored"),
        None
    );
    assert!(session.result().is_none());
}

#[test]
fn cancelling_during_processing_drops_the_late_result() {
    let mut session = AssessmentSession::new(five_prompts(), 120);
    begin_recording(&mut session);
    for _ in 1..5 {
        answer_and_continue(&mut session);
    }
    let Directive::Analyze { ticket, .. } = session.user_done().expect("last answer") else {
        panic!("expected analysis");
    };

    assert!(session.cancel());
    assert_eq!(
        session
            .complete(ticket, result_with_score(3.0))
            .expect("stale completion is ignored"),
        None
    );
    assert_eq!(session.state(), SessionState::Idle);
}
