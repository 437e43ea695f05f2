use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use tokio::sync::oneshot;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::entities::modal::ModalKind;
use crate::domain::entities::session::{Session, Theme};
use crate::infra::http::client::RestClient;
use crate::infra::http::search::UrlOptionSource;
use crate::infra::sqlite::repo::SqliteSessionRepo;
use crate::usecase::ports::api::FinanceApi;
use crate::usecase::ports::search::OptionSource;
use crate::usecase::services::category_service::CategoryService;
use crate::usecase::services::error::ServiceError;
use crate::usecase::services::ledger_service::LedgerService;
use crate::usecase::services::session_service::SessionService;

pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// Services shared by every page, built once at launch.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub api: Arc<dyn FinanceApi>,
    pub category_source: Arc<dyn OptionSource>,
    pub sessions: Arc<SessionService>,
    pub categories: Arc<CategoryService>,
    pub ledger: Arc<LedgerService>,
}

impl AppContext {
    pub fn build(config: AppConfig) -> anyhow::Result<Self> {
        let client = Arc::new(RestClient::from_config(&config)?);
        let repo = Arc::new(SqliteSessionRepo::at_default_location()?);
        let api: Arc<dyn FinanceApi> = client.clone();
        Ok(Self {
            category_source: Arc::new(UrlOptionSource::categories(client)),
            sessions: Arc::new(SessionService::new(api.clone(), repo)),
            categories: Arc::new(CategoryService::new(api.clone())),
            ledger: Arc::new(LedgerService::new(api.clone())),
            api,
            config,
        })
    }
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.sessions, &other.sessions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Expenses,
    Incomes,
    Categories,
    CategoryAdmin,
    AuditLog,
    Users,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Expenses,
        Route::Incomes,
        Route::Categories,
        Route::CategoryAdmin,
        Route::AuditLog,
        Route::Users,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Route::Expenses => "Gastos",
            Route::Incomes => "Ingresos",
            Route::Categories => "Categorías",
            Route::CategoryAdmin => "Administrar categorías",
            Route::AuditLog => "Bitácora",
            Route::Users => "Usuarios",
        }
    }

    pub fn superuser_only(self) -> bool {
        matches!(self, Route::AuditLog | Route::Users)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
}

pub struct ModalRequest {
    pub kind: ModalKind,
    responder: Option<oneshot::Sender<bool>>,
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub session: Signal<Option<Session>>,
    pub theme: Signal<Theme>,
    pub route: Signal<Route>,
    pub booting: Signal<bool>,
    pub modal: Signal<Option<ModalRequest>>,
    pub toasts: Signal<Vec<Toast>>,
    next_toast: Signal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: use_signal(|| None::<Session>),
            theme: use_signal(Theme::default),
            route: use_signal(|| Route::Expenses),
            booting: use_signal(|| true),
            modal: use_signal(|| None::<ModalRequest>),
            toasts: use_signal(Vec::<Toast>::new),
            next_toast: use_signal(|| 0_u64),
        }
    }

    pub fn is_superuser(&self) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(Session::is_superuser)
    }

    /// Opens `kind` and waits for the user's answer. Dismissing counts as no,
    /// and so does being replaced by another modal.
    pub async fn confirm(mut self, kind: ModalKind) -> bool {
        let (sender, receiver) = oneshot::channel();
        let previous = self.modal.write().replace(ModalRequest {
            kind,
            responder: Some(sender),
        });
        if let Some(ModalRequest {
            responder: Some(previous),
            ..
        }) = previous
        {
            let _ = previous.send(false);
        }
        receiver.await.unwrap_or(false)
    }

    pub fn show(mut self, kind: ModalKind) {
        if let Some(ModalRequest {
            responder: Some(previous),
            ..
        }) = self.modal.write().replace(ModalRequest {
            kind,
            responder: None,
        }) {
            let _ = previous.send(false);
        }
    }

    pub fn resolve_modal(mut self, answer: bool) {
        if let Some(ModalRequest {
            responder: Some(responder),
            ..
        }) = self.modal.write().take()
        {
            let _ = responder.send(answer);
        }
    }

    pub fn toast(mut self, level: ToastLevel, message: impl Into<String>) {
        let id = {
            let mut next = self.next_toast.write();
            *next += 1;
            *next
        };
        self.toasts.write().push(Toast {
            id,
            level,
            message: message.into(),
        });
        let mut toasts = self.toasts;
        spawn(async move {
            tokio::time::sleep(TOAST_LIFETIME).await;
            toasts.write().retain(|toast| toast.id != id);
        });
    }

    pub fn dismiss_toast(mut self, id: u64) {
        self.toasts.write().retain(|toast| toast.id != id);
    }

    /// Toasts the failure; an expired token also ends the session.
    pub fn report(self, ctx: &AppContext, err: &ServiceError, action: &str) {
        if err.is_unauthorized() {
            self.expire_session(ctx);
            return;
        }
        warn!(error = %err, action, "request failed");
        self.toast(ToastLevel::Error, format!("{action}: {err}"));
    }

    pub fn expire_session(self, ctx: &AppContext) {
        let sessions = ctx.sessions.clone();
        let mut session = self.session;
        let mut route = self.route;
        spawn(async move {
            if let Err(err) = sessions.logout().await {
                warn!(error = %err, "failed to clear stored session");
            }
            session.set(None);
            route.set(Route::Expenses);
        });
        self.toast(ToastLevel::Warning, "Tu sesión expiró. Inicia sesión de nuevo.");
    }
}
