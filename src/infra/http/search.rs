use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::finance::Category;
use crate::domain::entities::option::{default_option_mapper, AsyncOption};
use crate::infra::http::client::RestClient;
use crate::usecase::ports::api::ApiError;
use crate::usecase::ports::search::OptionSource;

pub type OptionMapper = fn(&Value) -> Vec<AsyncOption>;

/// Searches by appending `query_param=<term>` to `base_path` and mapping the
/// JSON response.
pub struct UrlOptionSource {
    client: Arc<RestClient>,
    base_path: String,
    query_param: String,
    mapper: OptionMapper,
}

impl UrlOptionSource {
    pub fn new(
        client: Arc<RestClient>,
        base_path: impl Into<String>,
        query_param: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_path: base_path.into(),
            query_param: query_param.into(),
            mapper: default_option_mapper,
        }
    }

    pub fn with_mapper(mut self, mapper: OptionMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn categories(client: Arc<RestClient>) -> Self {
        Self::new(client, "/categories/?status=all", "search").with_mapper(category_options)
    }
}

/// Category payloads go through `Category` so labels match the cached list.
pub fn category_options(data: &Value) -> Vec<AsyncOption> {
    match serde_json::from_value::<Vec<Category>>(data.clone()) {
        Ok(categories) => categories.iter().map(Category::to_option).collect(),
        Err(_) => default_option_mapper(data),
    }
}

#[async_trait]
impl OptionSource for UrlOptionSource {
    async fn search(&self, term: &str) -> Result<Vec<AsyncOption>, ApiError> {
        let data: Value = self
            .client
            .get_json(&self.base_path, &[(self.query_param.as_str(), term)])
            .await?;
        Ok((self.mapper)(&data))
    }
}
