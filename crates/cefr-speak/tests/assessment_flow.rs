use std::time::Duration;

use cefr_speak::assessment::prompts::{find_topic, PromptScript};
use cefr_speak::assessment::scale::score_to_level;
use cefr_speak::assessment::{
    AppStore, AssessmentError, BackendError, CefrLevel, LearningGoal, MockSpeechAnalyzer,
    PracticeError, SessionDriver, SessionUpdate, UserId, UserProfile,
};
use cefr_speak::config::SessionConfig;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

fn learner(target: CefrLevel) -> UserProfile {
    UserProfile {
        id: UserId("a91c44e07f2d5b13".to_string()),
        name: "Kenji".to_string(),
        age: Some(27),
        native_language: Some("Japanese".to_string()),
        learning_goal: LearningGoal::StudyAbroad,
        target_cefr: target,
        created_at: Utc::now(),
    }
}

fn driver(analyzer: MockSpeechAnalyzer) -> SessionDriver<MockSpeechAnalyzer> {
    SessionDriver::new(analyzer, SessionConfig::default())
}

#[tokio::test(start_paused = true)]
async fn full_assessment_records_a_consistent_result() {
    let driver = driver(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 11));
    let mut store = AppStore::with_user(Some(learner(CefrLevel::B2)));
    let cancel = CancellationToken::new();
    let mut updates: Vec<SessionUpdate> = Vec::new();

    let result = driver
        .run_assessment(&mut store, &cancel, &mut updates)
        .await
        .expect("assessment completes");

    assert_eq!(result.cefr_level, score_to_level(result.overall_score));
    assert_eq!(result.overall_score, result.subskills.mean());
    assert!((80..=90).contains(&result.duration), "duration {}", result.duration);
    assert!(result.transcript.is_some());

    assert_eq!(store.current_result(), Some(&result));
    assert_eq!(store.test_history().len(), 1);
    assert!(!store.is_recording());

    let spoken = updates
        .iter()
        .filter(|update| matches!(update, SessionUpdate::Speaking { .. }))
        .count();
    assert_eq!(spoken, 5);
    assert_eq!(updates.first(), Some(&SessionUpdate::Starting));
    assert_eq!(updates.last(), Some(&SessionUpdate::Completed));
}

#[tokio::test(start_paused = true)]
async fn long_answers_end_the_conversation_at_the_time_budget() {
    let config = SessionConfig {
        response_duration: Duration::from_secs(30),
        ..SessionConfig::default()
    };
    let driver = SessionDriver::new(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 5), config);
    let mut store = AppStore::with_user(Some(learner(CefrLevel::C1)));
    let cancel = CancellationToken::new();
    let mut updates: Vec<SessionUpdate> = Vec::new();

    let result = driver
        .run_assessment(&mut store, &cancel, &mut updates)
        .await
        .expect("assessment completes");

    assert!(result.duration >= 120, "duration {}", result.duration);
    let answered = updates.iter().find_map(|update| match update {
        SessionUpdate::Analyzing { answered, .. } => Some(*answered),
        _ => None,
    });
    assert_eq!(answered, Some(4));
}

#[tokio::test(start_paused = true)]
async fn elapsed_time_counts_from_the_first_prompt() {
    let config = SessionConfig {
        tick_interval: Duration::from_secs(2),
        startup_delay: Duration::from_millis(1500),
        playback_delay: Duration::from_millis(400),
        response_duration: Duration::from_millis(2400),
        ..SessionConfig::default()
    };
    let script = PromptScript::new(["Describe your hometown."]).expect("one prompt");
    let driver = SessionDriver::new(MockSpeechAnalyzer::seeded(Duration::from_secs(1), 4), config)
        .with_script(script);
    let mut store = AppStore::with_user(Some(learner(CefrLevel::B1)));
    let cancel = CancellationToken::new();
    let mut updates: Vec<SessionUpdate> = Vec::new();

    let result = driver
        .run_assessment(&mut store, &cancel, &mut updates)
        .await
        .expect("assessment completes");

    // 2.8 s of conversation holds one full 2 s tick once the clock starts at
    // the first prompt rather than at session start.
    assert!(updates.contains(&SessionUpdate::Analyzing {
        answered: 1,
        elapsed: 1
    }));
    assert_eq!(result.duration, 2);
    assert!(updates.contains(&SessionUpdate::Speaking {
        turn: 0,
        prompt: "Describe your hometown.".to_string()
    }));
}

#[tokio::test(start_paused = true)]
async fn backend_failure_leaves_the_store_untouched() {
    let driver = driver(MockSpeechAnalyzer::failing(Duration::from_secs(3)));
    let mut store = AppStore::with_user(Some(learner(CefrLevel::B2)));
    let cancel = CancellationToken::new();
    let mut updates: Vec<SessionUpdate> = Vec::new();

    let err = driver
        .run_assessment(&mut store, &cancel, &mut updates)
        .await
        .expect_err("backend rejects");

    assert!(matches!(
        err,
        AssessmentError::Backend(BackendError::Rejected(_))
    ));
    assert!(store.current_result().is_none());
    assert!(store.test_history().is_empty());
    assert!(!store.is_recording());
    assert_eq!(updates.last(), Some(&SessionUpdate::Failed));
}

#[tokio::test(start_paused = true)]
async fn cancelling_mid_conversation_stops_the_clock() {
    let driver = driver(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 2));
    let mut store = AppStore::with_user(Some(learner(CefrLevel::B2)));
    let cancel = CancellationToken::new();

    let canceller = async {
        tokio::time::sleep(Duration::from_millis(40_500)).await;
        cancel.cancel();
    };
    let mut sink = ();
    let (outcome, ()) = tokio::join!(
        driver.run_assessment(&mut store, &cancel, &mut sink),
        canceller
    );

    match outcome {
        Err(AssessmentError::Cancelled { elapsed }) => {
            assert!((37..=39).contains(&elapsed), "elapsed {elapsed}")
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(store.current_result().is_none());
    assert!(!store.is_recording());
}

#[tokio::test(start_paused = true)]
async fn assessment_requires_a_profile() {
    let driver = driver(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 1));
    let mut store = AppStore::new();
    let cancel = CancellationToken::new();

    let err = driver
        .run_assessment(&mut store, &cancel, &mut ())
        .await
        .expect_err("no profile");
    assert!(matches!(err, AssessmentError::MissingUser));
}

#[tokio::test(start_paused = true)]
async fn practice_is_recorded_without_touching_progress() {
    let driver = driver(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 9));
    let mut store = AppStore::with_user(Some(learner(CefrLevel::C2)));
    let cancel = CancellationToken::new();
    let topic = find_topic("technology").expect("technology topic");

    let session = driver
        .run_practice(topic, &mut store, &cancel, &mut ())
        .await
        .expect("practice completes");

    assert_eq!(session.topic, "Technology in Education");
    assert!((14..=15).contains(&session.duration), "duration {}", session.duration);
    assert_eq!(store.practice_history(), &[session]);
    assert!(store.current_result().is_none());
    assert!(store.test_history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn practice_duration_is_reported_in_seconds_for_sub_second_ticks() {
    let config = SessionConfig {
        tick_interval: Duration::from_millis(500),
        response_duration: Duration::from_secs(15),
        ..SessionConfig::default()
    };
    let driver = SessionDriver::new(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 6), config);
    let mut store = AppStore::with_user(Some(learner(CefrLevel::C2)));
    let cancel = CancellationToken::new();

    let session = driver
        .run_practice(
            find_topic("travel").expect("travel topic"),
            &mut store,
            &cancel,
            &mut (),
        )
        .await
        .expect("practice completes");

    assert!((14..=15).contains(&session.duration), "duration {}", session.duration);
}

#[tokio::test(start_paused = true)]
async fn practice_closes_once_the_target_is_met() {
    let driver = driver(MockSpeechAnalyzer::seeded(Duration::from_secs(3), 3));
    let mut store = AppStore::with_user(Some(learner(CefrLevel::A1)));
    let cancel = CancellationToken::new();
    driver
        .run_assessment(&mut store, &cancel, &mut ())
        .await
        .expect("assessment completes");

    let err = driver
        .run_practice(
            find_topic("travel").expect("travel topic"),
            &mut store,
            &cancel,
            &mut (),
        )
        .await
        .expect_err("practice locked");
    assert!(matches!(err, AssessmentError::Practice(PracticeError::Locked)));
    assert!(store.practice_history().is_empty());
}
