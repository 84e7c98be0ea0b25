use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound of every subskill and overall score.
pub const MAX_SCORE: f64 = 6.0;

/// CEFR proficiency levels, ordered from A1 (lowest) to C2 (highest).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    #[default]
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub const fn ordered() -> [Self; 6] {
        [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1, Self::C2]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CEFR level '{0}' (expected A1, A2, B1, B2, C1 or C2)")]
pub struct UnknownLevel(pub String);

impl FromStr for CefrLevel {
    type Err = UnknownLevel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ordered()
            .into_iter()
            .find(|level| level.code() == normalized)
            .ok_or_else(|| UnknownLevel(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningGoal {
    #[default]
    Fluency,
    Ielts,
    StudyAbroad,
    JobInterview,
}

impl LearningGoal {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Fluency,
            Self::Ielts,
            Self::StudyAbroad,
            Self::JobInterview,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Fluency => "fluency",
            Self::Ielts => "ielts",
            Self::StudyAbroad => "study-abroad",
            Self::JobInterview => "job-interview",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fluency => "General Fluency",
            Self::Ielts => "IELTS Preparation",
            Self::StudyAbroad => "Study Abroad",
            Self::JobInterview => "Job Interview",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown learning goal '{0}' (expected fluency, ielts, study-abroad or job-interview)")]
pub struct UnknownGoal(pub String);

impl FromStr for LearningGoal {
    type Err = UnknownGoal;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Self::ordered()
            .into_iter()
            .find(|goal| goal.key() == normalized)
            .ok_or_else(|| UnknownGoal(raw.to_string()))
    }
}

/// Identifier wrapper for user profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for test results and practice sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(pub String);

impl ResultId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_language: Option<String>,
    pub learning_goal: LearningGoal,
    #[serde(rename = "targetCEFR")]
    pub target_cefr: CefrLevel,
    pub created_at: DateTime<Utc>,
}

/// The five scored dimensions of a speaking sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subskill {
    Fluency,
    Grammar,
    Vocabulary,
    Coherence,
    Pronunciation,
}

impl Subskill {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Fluency,
            Self::Grammar,
            Self::Vocabulary,
            Self::Coherence,
            Self::Pronunciation,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fluency => "Fluency",
            Self::Grammar => "Grammar",
            Self::Vocabulary => "Vocabulary",
            Self::Coherence => "Coherence",
            Self::Pronunciation => "Pronunciation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{} score {value} is outside 0.0..=6.0", .skill.label())]
    OutOfRange { skill: Subskill, value: f64 },
}

/// Per-skill scores, each guaranteed to be finite and within `0.0..=6.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSubskills")]
pub struct Subskills {
    fluency: f64,
    grammar: f64,
    vocabulary: f64,
    coherence: f64,
    pronunciation: f64,
}

#[derive(Deserialize)]
struct RawSubskills {
    fluency: f64,
    grammar: f64,
    vocabulary: f64,
    coherence: f64,
    pronunciation: f64,
}

impl TryFrom<RawSubskills> for Subskills {
    type Error = ScoringError;

    fn try_from(raw: RawSubskills) -> Result<Self, Self::Error> {
        Self::new(
            raw.fluency,
            raw.grammar,
            raw.vocabulary,
            raw.coherence,
            raw.pronunciation,
        )
    }
}

impl Subskills {
    pub fn new(
        fluency: f64,
        grammar: f64,
        vocabulary: f64,
        coherence: f64,
        pronunciation: f64,
    ) -> Result<Self, ScoringError> {
        let scores = Self {
            fluency,
            grammar,
            vocabulary,
            coherence,
            pronunciation,
        };
        for (skill, value) in scores.entries() {
            if !value.is_finite() || !(0.0..=MAX_SCORE).contains(&value) {
                return Err(ScoringError::OutOfRange { skill, value });
            }
        }
        Ok(scores)
    }

    /// Every subskill set to the same score.
    pub fn uniform(score: f64) -> Result<Self, ScoringError> {
        Self::new(score, score, score, score, score)
    }

    pub fn get(&self, skill: Subskill) -> f64 {
        match skill {
            Subskill::Fluency => self.fluency,
            Subskill::Grammar => self.grammar,
            Subskill::Vocabulary => self.vocabulary,
            Subskill::Coherence => self.coherence,
            Subskill::Pronunciation => self.pronunciation,
        }
    }

    pub fn entries(&self) -> [(Subskill, f64); 5] {
        Subskill::ordered().map(|skill| (skill, self.get(skill)))
    }

    /// Arithmetic mean of the five scores, summed in declaration order.
    pub fn mean(&self) -> f64 {
        let total =
            self.fluency + self.grammar + self.vocabulary + self.coherence + self.pronunciation;
        total / 5.0
    }

    /// Lowest-scoring subskill; ties resolve to the earlier one.
    pub fn weakest(&self) -> Subskill {
        let mut weakest = (Subskill::Fluency, self.fluency);
        for (skill, value) in self.entries() {
            if value < weakest.1 {
                weakest = (skill, value);
            }
        }
        weakest.0
    }
}

/// Outcome of one completed assessment session. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: ResultId,
    pub user_id: UserId,
    pub cefr_level: CefrLevel,
    pub overall_score: f64,
    pub subskills: Subskills,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub completed_at: DateTime<Utc>,
    /// Seconds.
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub id: ResultId,
    pub user_id: UserId,
    pub topic: String,
    pub score: f64,
    pub subskills: Subskills,
    pub feedback: String,
    pub completed_at: DateTime<Utc>,
    /// Seconds.
    pub duration: u32,
}
