use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::AppConfig;
use crate::domain::entities::finance::{
    AuditLog, Category, CategoryEntry, EntryKind, Expense, Income, NewExpense, NewIncome, User,
};
use crate::usecase::ports::api::{ApiError, CategoryScope, FinanceApi};

/// REST adapter for the finance backend. Every request carries the current
/// bearer token, if any.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct CategoryPayload<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

#[derive(Serialize)]
struct MergePayload<'a> {
    source_ids: &'a [String],
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url.trim()).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Resolves `path` (which may carry its own query string) against the base
    /// URL and appends `query`.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(builder).send().await?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::parse(err.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        debug!(%url, "GET");
        self.send_json(self.http.get(url)).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        debug!(%url, "POST");
        self.send_json(self.http.post(url).json(body)).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        debug!(%url, "PUT");
        self.send_json(self.http.put(url).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path, &[])?;
        debug!(%url, "DELETE");
        self.send(self.http.delete(url)).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::http(status.as_u16(), error_message(status, &body)))
}

/// Pulls a readable message out of an error body: `{"detail": "..."}`, the
/// validation list form `{"detail": [{"msg": "..."}]}`, raw text, or the
/// status reason as a last resort.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(entries)) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("error desconocido")
        .to_string()
}

fn category_list_path(scope: CategoryScope) -> &'static str {
    match scope {
        CategoryScope::Mine => "/categories/",
        CategoryScope::Active => "/categories/active",
        CategoryScope::All => "/categories/?status=all",
        CategoryScope::Admin => "/categories/admin/all",
    }
}

#[async_trait]
impl FinanceApi for RestClient {
    fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url("/login/access-token", &[])?;
        let params = [("username", email), ("password", password)];
        let response = self.http.post(url).form(&params).send().await?;
        let token: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|err| ApiError::parse(err.to_string()))?;
        info!(email, "login accepted");
        Ok(token.access_token)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/users/me", &[]).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/users/", &[]).await
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLog>, ApiError> {
        self.get_json("/users/logs/all", &[]).await
    }

    async fn list_categories(&self, scope: CategoryScope) -> Result<Vec<Category>, ApiError> {
        self.get_json(category_list_path(scope), &[]).await
    }

    async fn search_categories(&self, term: &str) -> Result<Value, ApiError> {
        self.get_json(category_list_path(CategoryScope::All), &[("search", term)])
            .await
    }

    async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        self.post_json(
            "/categories/",
            &CategoryPayload {
                name,
                is_active: Some(true),
            },
        )
        .await
    }

    async fn update_category(
        &self,
        id: &str,
        name: &str,
        is_active: Option<bool>,
    ) -> Result<Category, ApiError> {
        self.put_json(
            &format!("/categories/{id}"),
            &CategoryPayload { name, is_active },
        )
        .await
    }

    async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/categories/{id}")).await
    }

    async fn merge_categories(
        &self,
        target_id: &str,
        source_ids: &[String],
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/categories/{target_id}/merge"), &[])?;
        info!(target_id, sources = source_ids.len(), "merging categories");
        self.send(self.http.post(url).json(&MergePayload { source_ids }))
            .await
            .map(|_| ())
    }

    async fn category_entries(
        &self,
        id: &str,
        kind: EntryKind,
    ) -> Result<Vec<CategoryEntry>, ApiError> {
        let segment = match kind {
            EntryKind::Expenses => "expenses",
            EntryKind::Incomes => "incomes",
        };
        self.get_json(&format!("/categories/{id}/{segment}"), &[])
            .await
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        self.get_json("/expenses/", &[]).await
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, ApiError> {
        self.post_json("/expenses/", expense).await
    }

    async fn update_expense(&self, id: &str, expense: &NewExpense) -> Result<Expense, ApiError> {
        self.put_json(&format!("/expenses/{id}"), expense).await
    }

    async fn delete_expense(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/expenses/{id}")).await
    }

    async fn list_incomes(&self) -> Result<Vec<Income>, ApiError> {
        self.get_json("/incomes/", &[]).await
    }

    async fn create_income(&self, income: &NewIncome) -> Result<Income, ApiError> {
        self.post_json("/incomes/", income).await
    }

    async fn update_income(&self, id: &str, income: &NewIncome) -> Result<Income, ApiError> {
        self.put_json(&format!("/incomes/{id}"), income).await
    }

    async fn delete_income(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/incomes/{id}")).await
    }
}
