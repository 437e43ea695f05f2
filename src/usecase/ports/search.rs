use async_trait::async_trait;

use crate::domain::entities::option::AsyncOption;
use crate::usecase::ports::api::ApiError;

/// Where a search selector gets its options from.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<AsyncOption>, ApiError>;
}

/// Adapts any `term -> future` closure into an option source.
pub struct FnOptionSource<F>(pub F);

#[async_trait]
impl<F, Fut> OptionSource for FnOptionSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Vec<AsyncOption>, ApiError>> + Send,
{
    async fn search(&self, term: &str) -> Result<Vec<AsyncOption>, ApiError> {
        (self.0)(term.to_string()).await
    }
}
