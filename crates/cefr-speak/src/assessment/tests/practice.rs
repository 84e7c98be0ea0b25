use super::common::*;
use crate::assessment::domain::{CefrLevel, Subskills};
use crate::assessment::practice::{PracticeError, PracticeSessionMachine, PracticeState};
use crate::assessment::prompts::find_topic;
use crate::assessment::scale::score_to_level;
use crate::assessment::scoring::practice_feedback;

#[test]
fn elapsed_counts_only_while_recording() {
    let mut machine = PracticeSessionMachine::new();
    let topic = find_topic("travel").expect("travel topic");
    let ticket = machine.start(topic).expect("idle machine starts");
    assert_eq!(machine.state(), PracticeState::Listening);

    assert!(!machine.tick(ticket));
    assert_eq!(machine.elapsed(), 0);

    assert_eq!(machine.playback_finished(ticket), Ok(true));
    for _ in 0..7 {
        assert!(machine.tick(ticket));
    }
    assert_eq!(machine.elapsed(), 7);

    let (_, submission) = machine.finish_recording().expect("recording ends");
    assert_eq!(machine.state(), PracticeState::Feedback);
    assert!(!machine.tick(ticket));
    assert_eq!(machine.elapsed(), 7);
    assert_eq!(submission.elapsed, 7);
    assert_eq!(submission.turns.len(), 1);
}

#[test]
fn scoring_produces_a_practice_session() {
    let mut machine = PracticeSessionMachine::new();
    let ticket = machine
        .start(find_topic("career").expect("career topic"))
        .expect("starts");
    machine.playback_finished(ticket).expect("recording");
    machine.tick(ticket);
    let (scored, _) = machine.finish_recording().expect("recording ends");

    let subskills = Subskills::new(3.0, 3.5, 4.0, 3.0, 2.5).expect("in range");
    let user = profile(CefrLevel::C1);
    let session = machine
        .score(scored, subskills, user.id.clone(), now(), 12)
        .expect("feedback phase accepts a score")
        .cloned()
        .expect("ticket is current");

    assert_eq!(session.topic, "Career Goals");
    assert_eq!(session.score, subskills.mean());
    assert_eq!(session.duration, 12);
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.feedback, practice_feedback(score_to_level(subskills.mean())));

    assert!(matches!(
        machine.score(scored, subskills, user.id, now(), 12),
        Err(PracticeError::InvalidTransition { .. })
    ));
}

#[test]
fn reset_discards_the_attempt() {
    let mut machine = PracticeSessionMachine::new();
    let ticket = machine
        .start(find_topic("climate").expect("climate topic"))
        .expect("starts");
    machine.playback_finished(ticket).expect("recording");
    machine.tick(ticket);

    machine.reset();
    assert_eq!(machine.state(), PracticeState::Idle);
    assert_eq!(machine.elapsed(), 0);
    assert!(machine.topic().is_none());
    assert!(!machine.tick(ticket));
    assert_eq!(machine.playback_finished(ticket), Ok(false));
}

#[test]
fn finishing_before_recording_is_rejected() {
    let mut machine = PracticeSessionMachine::new();
    assert_eq!(
        machine.finish_recording().map(|_| ()),
        Err(PracticeError::InvalidTransition {
            state: PracticeState::Idle,
            action: "finish recording",
        })
    );
}
