use std::sync::Arc;

use tracing::info;

use crate::domain::entities::finance::{
    AuditLog, Expense, ExpenseDraft, Income, IncomeDraft, User,
};
use crate::usecase::ports::api::FinanceApi;
use crate::usecase::services::error::ServiceError;

/// Expenses, incomes and the read-only admin listings.
pub struct LedgerService {
    api: Arc<dyn FinanceApi>,
}

impl LedgerService {
    pub fn new(api: Arc<dyn FinanceApi>) -> Self {
        Self { api }
    }

    pub async fn expenses(&self) -> Result<Vec<Expense>, ServiceError> {
        Ok(self.api.list_expenses().await?)
    }

    /// Creates when `id` is `None`, updates otherwise.
    pub async fn save_expense(
        &self,
        id: Option<&str>,
        draft: &ExpenseDraft,
    ) -> Result<Expense, ServiceError> {
        let payload = draft.validate()?;
        let saved = match id {
            Some(id) => self.api.update_expense(id, &payload).await?,
            None => self.api.create_expense(&payload).await?,
        };
        info!(id = %saved.id, total = saved.total, "expense saved");
        Ok(saved)
    }

    pub async fn delete_expense(&self, id: &str) -> Result<(), ServiceError> {
        self.api.delete_expense(id).await?;
        info!(id, "expense deleted");
        Ok(())
    }

    pub async fn incomes(&self) -> Result<Vec<Income>, ServiceError> {
        Ok(self.api.list_incomes().await?)
    }

    pub async fn save_income(
        &self,
        id: Option<&str>,
        draft: &IncomeDraft,
    ) -> Result<Income, ServiceError> {
        let payload = draft.validate()?;
        let saved = match id {
            Some(id) => self.api.update_income(id, &payload).await?,
            None => self.api.create_income(&payload).await?,
        };
        info!(id = %saved.id, total = saved.total, "income saved");
        Ok(saved)
    }

    pub async fn delete_income(&self, id: &str) -> Result<(), ServiceError> {
        self.api.delete_income(id).await?;
        info!(id, "income deleted");
        Ok(())
    }

    pub async fn users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.api.list_users().await?)
    }

    /// Newest first.
    pub async fn audit_logs(&self) -> Result<Vec<AuditLog>, ServiceError> {
        let mut logs = self.api.audit_logs().await?;
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(logs)
    }
}

/// Replaces the record with the same id or prepends a new one.
pub fn upsert_by_id<T, F>(list: &mut Vec<T>, record: T, id_of: F)
where
    F: Fn(&T) -> &str,
{
    match list.iter().position(|existing| id_of(existing) == id_of(&record)) {
        Some(idx) => list[idx] = record,
        None => list.insert(0, record),
    }
}
