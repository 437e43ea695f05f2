use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::session::{Session, Theme};
use crate::platform::desktop::blocking::run_blocking;
use crate::usecase::ports::api::{ApiError, FinanceApi};
use crate::usecase::ports::repo::{RepoError, SessionRepository};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no se pudo guardar la sesión: {0}")]
    Store(#[from] RepoError),
}

pub struct SessionService {
    api: Arc<dyn FinanceApi>,
    repo: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(api: Arc<dyn FinanceApi>, repo: Arc<dyn SessionRepository>) -> Self {
        Self { api, repo }
    }

    pub async fn init(&self) -> Result<(), SessionError> {
        let repo = self.repo.clone();
        run_blocking(move || repo.init()).await?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let token = self.api.login(email.trim(), password).await?;
        self.api.set_token(Some(token.clone()));
        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(err) => {
                self.api.set_token(None);
                return Err(err.into());
            }
        };
        let session = Session { token, user };
        self.persist(session.clone()).await?;
        info!(email = %session.user.email, "session started");
        Ok(session)
    }

    /// Brings back the stored session. A rejected token clears it; a backend
    /// that cannot be reached keeps the stored copy.
    pub async fn restore(&self) -> Result<Option<Session>, SessionError> {
        let repo = self.repo.clone();
        let stored = match run_blocking(move || repo.load_session()).await {
            Ok(stored) => stored,
            Err(RepoError::Corrupt(reason)) => {
                warn!(%reason, "discarding unreadable session");
                self.forget().await?;
                None
            }
            Err(err) => return Err(err.into()),
        };
        let Some(mut session) = stored else {
            return Ok(None);
        };

        self.api.set_token(Some(session.token.clone()));
        match self.api.current_user().await {
            Ok(user) => {
                session.user = user;
                self.persist(session.clone()).await?;
                Ok(Some(session))
            }
            Err(ApiError::Unauthorized) => {
                info!("stored session expired");
                self.logout().await?;
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "could not refresh user; keeping stored session");
                Ok(Some(session))
            }
        }
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.api.set_token(None);
        self.forget().await?;
        info!("session ended");
        Ok(())
    }

    pub async fn load_theme(&self) -> Result<Theme, SessionError> {
        let repo = self.repo.clone();
        Ok(run_blocking(move || repo.load_theme()).await?)
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<(), SessionError> {
        let repo = self.repo.clone();
        Ok(run_blocking(move || repo.save_theme(theme)).await?)
    }

    async fn persist(&self, session: Session) -> Result<(), SessionError> {
        let repo = self.repo.clone();
        Ok(run_blocking(move || repo.save_session(&session)).await?)
    }

    async fn forget(&self) -> Result<(), SessionError> {
        let repo = self.repo.clone();
        Ok(run_blocking(move || repo.clear_session()).await?)
    }
}
