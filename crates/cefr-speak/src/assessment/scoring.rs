use chrono::{DateTime, Utc};

use super::domain::{CefrLevel, ResultId, Subskills, TestResult, UserId};
use super::scale::{info_for, score_to_level};

/// Non-scoring fields attached to a result when it is produced.
#[derive(Debug, Clone)]
pub struct ResultContext {
    pub user_id: UserId,
    pub duration_secs: u32,
    pub completed_at: DateTime<Utc>,
    pub transcript: Option<String>,
    pub audio_url: Option<String>,
}

impl ResultContext {
    pub fn new(user_id: UserId, duration_secs: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            duration_secs,
            completed_at,
            transcript: None,
            audio_url: None,
        }
    }
}

/// Folds five subskill scores into a result. The overall score is their
/// mean and the level is derived from that mean, so the two never disagree.
pub fn aggregate(subskills: &Subskills, context: ResultContext) -> TestResult {
    let overall_score = subskills.mean();
    let cefr_level = score_to_level(overall_score);

    TestResult {
        id: ResultId::generate(),
        user_id: context.user_id,
        cefr_level,
        overall_score,
        subskills: *subskills,
        feedback: assessment_feedback(cefr_level),
        audio_url: context.audio_url,
        transcript: context.transcript,
        completed_at: context.completed_at,
        duration: context.duration_secs,
    }
}

pub fn assessment_feedback(level: CefrLevel) -> String {
    let info = info_for(level);
    format!(
        "Your speaking demonstrates {level} ({}) proficiency. {} {}",
        info.description,
        info.skill_description,
        improvement_advice(level)
    )
}

pub fn practice_feedback(level: CefrLevel) -> String {
    format!(
        "This answer sits at {level} ({}). {}",
        info_for(level).description,
        improvement_advice(level)
    )
}

const fn improvement_advice(level: CefrLevel) -> &'static str {
    match level {
        CefrLevel::A1 | CefrLevel::A2 => {
            "To improve, build everyday vocabulary and practice short answers about familiar topics daily."
        }
        CefrLevel::B1 => {
            "To improve, focus on increasing fluency and reducing hesitation when giving opinions."
        }
        CefrLevel::B2 => {
            "To improve, use a wider range of connectors and support each point with examples."
        }
        CefrLevel::C1 | CefrLevel::C2 => {
            "To improve, refine idiomatic precision and vary intonation to signal emphasis."
        }
    }
}
