use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{CefrLevel, LearningGoal, UserId, UserProfile};

/// Well-known key the profile is persisted under.
pub const PROFILE_KEY: &str = "cefrUser";

/// Unvalidated profile form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub age: Option<i64>,
    pub native_language: Option<String>,
    pub learning_goal: LearningGoal,
    pub target_cefr: CefrLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("a name is required")]
    MissingName,
    #[error("age must be a positive whole number, got {0}")]
    InvalidAge(i64),
}

impl ProfileDraft {
    /// Prefills a draft from an existing profile, as when editing it.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            age: profile.age.map(i64::from),
            native_language: profile.native_language.clone(),
            learning_goal: profile.learning_goal,
            target_cefr: profile.target_cefr,
        }
    }

    /// Validates the draft. When `existing` is given, its id and creation
    /// time carry over and the remaining fields are replaced.
    pub fn into_profile(
        self,
        existing: Option<&UserProfile>,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, ProfileError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProfileError::MissingName);
        }

        let age = match self.age {
            Some(age) if age <= 0 => return Err(ProfileError::InvalidAge(age)),
            Some(age) => Some(u32::try_from(age).map_err(|_| ProfileError::InvalidAge(age))?),
            None => None,
        };

        let native_language = self
            .native_language
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty());

        let (id, created_at) = match existing {
            Some(profile) => (profile.id.clone(), profile.created_at),
            None => (UserId::generate(), now),
        };

        Ok(UserProfile {
            id,
            name: name.to_string(),
            age,
            native_language,
            learning_goal: self.learning_goal,
            target_cefr: self.target_cefr,
            created_at,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("profile storage unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("profile JSON could not be processed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for the single saved profile.
pub trait ProfileRepository: Send + Sync {
    fn load(&self) -> Result<Option<UserProfile>, RepositoryError>;
    fn save(&self, profile: &UserProfile) -> Result<(), RepositoryError>;
}

/// Keeps the profile as one JSON document named after [`PROFILE_KEY`].
#[derive(Debug, Clone)]
pub struct JsonFileProfileStore {
    path: PathBuf,
}

impl JsonFileProfileStore {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{PROFILE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileRepository for JsonFileProfileStore {
    fn load(&self) -> Result<Option<UserProfile>, RepositoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), user = %profile.id, "profile saved");
        Ok(())
    }
}

/// Startup load. A missing or unreadable profile means starting without a
/// user; read failures are logged rather than propagated.
pub fn load_saved_profile<R: ProfileRepository + ?Sized>(repository: &R) -> Option<UserProfile> {
    match repository.load() {
        Ok(profile) => profile,
        Err(err) => {
            warn!(error = %err, "failed to load saved profile");
            None
        }
    }
}

/// Validates and persists a draft, updating `existing` in place if present.
/// Nothing is written when validation fails.
pub fn save_profile<R: ProfileRepository + ?Sized>(
    repository: &R,
    draft: ProfileDraft,
    existing: Option<&UserProfile>,
    now: DateTime<Utc>,
) -> Result<UserProfile, ProfileServiceError> {
    let profile = draft.into_profile(existing, now)?;
    repository.save(&profile)?;
    Ok(profile)
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error(transparent)]
    Validation(#[from] ProfileError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
