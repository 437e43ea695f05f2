use crate::domain::entities::session::{Session, Theme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Message(String),
    Corrupt(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Message(message) => write!(f, "{message}"),
            RepoError::Corrupt(message) => write!(f, "stored session is unreadable: {message}"),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<tokio::task::JoinError> for RepoError {
    fn from(err: tokio::task::JoinError) -> Self {
        RepoError::Message(err.to_string())
    }
}

pub trait SessionRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn load_session(&self) -> Result<Option<Session>, RepoError>;
    fn save_session(&self, session: &Session) -> Result<(), RepoError>;
    fn clear_session(&self) -> Result<(), RepoError>;

    fn load_theme(&self) -> Result<Theme, RepoError>;
    fn save_theme(&self, theme: Theme) -> Result<(), RepoError>;
}
