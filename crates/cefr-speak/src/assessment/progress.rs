use serde::Serialize;

use super::domain::{TestResult, UserProfile};
use super::store::AppStore;

/// Where the user is sent after reviewing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Certificate,
    Practice,
}

impl NextStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Certificate => "Claim your certificate",
            Self::Practice => "Keep practicing",
        }
    }
}

pub fn has_reached_target(result: &TestResult, profile: &UserProfile) -> bool {
    result.cefr_level >= profile.target_cefr
}

pub fn next_step(result: &TestResult, profile: &UserProfile) -> NextStep {
    if has_reached_target(result, profile) {
        NextStep::Certificate
    } else {
        NextStep::Practice
    }
}

/// Practice closes once the current result meets the user's target.
pub fn practice_locked(store: &AppStore) -> bool {
    match (store.current_result(), store.current_user()) {
        (Some(result), Some(user)) => has_reached_target(result, user),
        _ => false,
    }
}
