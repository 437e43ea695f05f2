use async_trait::async_trait;

use crate::domain::entities::finance::{
    AuditLog, Category, CategoryEntry, EntryKind, Expense, Income, NewExpense, NewIncome, User,
};

/// Errors coming back from the finance backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The token was rejected; the session must end.
    #[error("la sesión expiró")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Response parse error: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScope {
    Mine,
    Active,
    All,
    Admin,
}

#[async_trait]
pub trait FinanceApi: Send + Sync {
    fn set_token(&self, token: Option<String>);

    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn audit_logs(&self) -> Result<Vec<AuditLog>, ApiError>;

    async fn list_categories(&self, scope: CategoryScope) -> Result<Vec<Category>, ApiError>;
    async fn search_categories(&self, term: &str) -> Result<serde_json::Value, ApiError>;
    async fn create_category(&self, name: &str) -> Result<Category, ApiError>;
    async fn update_category(
        &self,
        id: &str,
        name: &str,
        is_active: Option<bool>,
    ) -> Result<Category, ApiError>;
    async fn delete_category(&self, id: &str) -> Result<(), ApiError>;
    async fn merge_categories(&self, target_id: &str, source_ids: &[String])
        -> Result<(), ApiError>;
    async fn category_entries(
        &self,
        id: &str,
        kind: EntryKind,
    ) -> Result<Vec<CategoryEntry>, ApiError>;

    async fn list_expenses(&self) -> Result<Vec<Expense>, ApiError>;
    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, ApiError>;
    async fn update_expense(&self, id: &str, expense: &NewExpense) -> Result<Expense, ApiError>;
    async fn delete_expense(&self, id: &str) -> Result<(), ApiError>;

    async fn list_incomes(&self) -> Result<Vec<Income>, ApiError>;
    async fn create_income(&self, income: &NewIncome) -> Result<Income, ApiError>;
    async fn update_income(&self, id: &str, income: &NewIncome) -> Result<Income, ApiError>;
    async fn delete_income(&self, id: &str) -> Result<(), ApiError>;
}
