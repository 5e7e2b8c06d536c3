use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelupError {
    #[error("not initialized: run 'levelup init'")]
    NotInitialized,

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("quest instance {id} is {status}: {reason}")]
    InvalidState {
        id: String,
        status: String,
        reason: String,
    },

    #[error("achievement not found: {0}")]
    AchievementNotFound(String),

    #[error("quest not found: {0}")]
    QuestNotFound(String),

    #[error("quest instance not found: {0}")]
    QuestInstanceNotFound(String),

    #[error("objective '{objective}' not found on quest '{quest}'")]
    ObjectiveNotFound { quest: String, objective: String },

    #[error("duplicate id in catalog: {0}")]
    DuplicateId(String),

    #[error("invalid id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("could not issue a unique invite code after {0} attempts")]
    InviteExhausted(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl LevelupError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LevelupError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the caller can fix by changing its input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LevelupError::Validation { .. } | LevelupError::InvalidState { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LevelupError>;
