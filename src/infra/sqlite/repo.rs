use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::config::project_dirs;
use crate::domain::entities::finance::User;
use crate::domain::entities::session::{Session, Theme};
use crate::infra::sqlite::queries::{
    clear_session, load_preference, load_session, save_preference, save_session,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{RepoError, SessionRepository};

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("gastos.sqlite"))
}

pub struct SqliteSessionRepo {
    pub db_path: PathBuf,
}

impl SqliteSessionRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn at_default_location() -> Result<Self> {
        default_db_path()
            .map(Self::new)
            .map_err(|err| anyhow!("unable to resolve database path: {err}"))
    }
}

fn message(err: anyhow::Error) -> RepoError {
    RepoError::Message(format!("{err:#}"))
}

impl SessionRepository for SqliteSessionRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(message)
    }

    fn load_session(&self) -> Result<Option<Session>, RepoError> {
        let Some(stored) = load_session(&self.db_path).map_err(message)? else {
            return Ok(None);
        };
        let user: User = serde_json::from_str(&stored.user_json)
            .map_err(|err| RepoError::Corrupt(err.to_string()))?;
        Ok(Some(Session {
            token: stored.token,
            user,
        }))
    }

    fn save_session(&self, session: &Session) -> Result<(), RepoError> {
        let user_json = serde_json::to_string(&session.user)
            .map_err(|err| RepoError::Message(err.to_string()))?;
        save_session(&self.db_path, &session.token, &user_json).map_err(message)
    }

    fn clear_session(&self) -> Result<(), RepoError> {
        clear_session(&self.db_path).map_err(message)
    }

    fn load_theme(&self) -> Result<Theme, RepoError> {
        let stored = load_preference(&self.db_path, Theme::PREFERENCE_KEY).map_err(message)?;
        Ok(stored.map(|value| Theme::parse(&value)).unwrap_or_default())
    }

    fn save_theme(&self, theme: Theme) -> Result<(), RepoError> {
        save_preference(&self.db_path, Theme::PREFERENCE_KEY, theme.as_str()).map_err(message)
    }
}
