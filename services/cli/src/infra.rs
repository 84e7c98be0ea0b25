use cefr_speak::assessment::profile::load_saved_profile;
use cefr_speak::assessment::{
    AppStore, CefrLevel, JsonFileProfileStore, LearningGoal, MockSpeechAnalyzer, SessionObserver,
    SessionUpdate,
};
use cefr_speak::config::AppConfig;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Per-invocation wiring: configuration, profile storage and the store
/// seeded with the saved profile.
pub(crate) struct AppContext {
    pub(crate) config: AppConfig,
    pub(crate) profiles: JsonFileProfileStore,
    pub(crate) store: AppStore,
}

impl AppContext {
    pub(crate) fn open(config: AppConfig) -> Self {
        let profiles = JsonFileProfileStore::in_dir(&config.storage.data_dir);
        let store = AppStore::with_user(load_saved_profile(&profiles));
        Self {
            config,
            profiles,
            store,
        }
    }

    pub(crate) fn analyzer(&self, seed: Option<u64>, fail: bool) -> MockSpeechAnalyzer {
        let delay = self.config.session.backend_delay;
        match (fail, seed) {
            (true, _) => MockSpeechAnalyzer::failing(delay),
            (false, Some(seed)) => MockSpeechAnalyzer::seeded(delay, seed),
            (false, None) => MockSpeechAnalyzer::new(delay),
        }
    }
}

/// Cancelled on Ctrl-C so a running session can stop cleanly.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => trigger.cancel(),
            Err(err) => warn!(error = %err, "failed to listen for ctrl-c"),
        }
    });
    token
}

/// Prints session progress as it happens.
#[derive(Debug, Default)]
pub(crate) struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn notify(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::Starting => println!("Preparing your conversation..."),
            SessionUpdate::Speaking { turn, prompt } => {
                println!("\n[{}] Examiner: {prompt}", turn + 1)
            }
            SessionUpdate::Recording { .. } => println!("    (recording your answer)"),
            SessionUpdate::Analyzing { answered, elapsed } => println!(
                "\nAnalyzing {answered} answer(s) recorded over {elapsed}s..."
            ),
            SessionUpdate::Completed => println!("Analysis complete."),
            SessionUpdate::Failed => println!("Analysis failed; nothing was saved."),
        }
    }
}

pub(crate) fn parse_level(raw: &str) -> Result<CefrLevel, String> {
    raw.parse::<CefrLevel>().map_err(|err| err.to_string())
}

pub(crate) fn parse_goal(raw: &str) -> Result<LearningGoal, String> {
    raw.parse::<LearningGoal>().map_err(|err| err.to_string())
}

/// Fixed-width bar for a score on the 0-6 scale.
pub(crate) fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 6.0) * 2.0).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(12 - filled))
}
