use std::sync::Arc;

use tracing::info;

use crate::domain::category_groups::{group_categories, CategoryGroup, MergePlan};
use crate::domain::entities::finance::{validate_category_name, Category, CategoryEntry, EntryKind};
use crate::usecase::ports::api::{CategoryScope, FinanceApi};
use crate::usecase::services::error::ServiceError;

pub struct CategoryService {
    api: Arc<dyn FinanceApi>,
}

impl CategoryService {
    pub fn new(api: Arc<dyn FinanceApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self, scope: CategoryScope) -> Result<Vec<Category>, ServiceError> {
        let mut categories = self.api.list_categories(scope).await?;
        sort_by_name(&mut categories);
        Ok(categories)
    }

    /// Includes inactive ones so selectors can offer reactivation.
    pub async fn for_selector(&self) -> Result<Vec<Category>, ServiceError> {
        self.list(CategoryScope::All).await
    }

    pub async fn create_private(&self, name: &str) -> Result<Category, ServiceError> {
        let name = validate_category_name(name)?;
        let created = self.api.create_category(&name).await?;
        info!(id = %created.id, name = %created.name, "category created");
        Ok(created)
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<Category, ServiceError> {
        let name = validate_category_name(name)?;
        Ok(self.api.update_category(id, &name, None).await?)
    }

    pub async fn reactivate(&self, category: &Category) -> Result<Category, ServiceError> {
        let mut updated = self
            .api
            .update_category(&category.id, &category.name, Some(true))
            .await?;
        updated.is_active = true;
        info!(id = %updated.id, "category reactivated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.api.delete_category(id).await?;
        info!(id, "category deleted");
        Ok(())
    }

    pub async fn admin_groups(&self) -> Result<Vec<CategoryGroup>, ServiceError> {
        let categories = self.api.list_categories(CategoryScope::Admin).await?;
        Ok(group_categories(&categories))
    }

    pub async fn merge(&self, plan: &MergePlan) -> Result<(), ServiceError> {
        self.api
            .merge_categories(&plan.target_id, &plan.source_ids)
            .await?;
        Ok(())
    }

    pub async fn entries(
        &self,
        category: &Category,
        kind: EntryKind,
    ) -> Result<Vec<CategoryEntry>, ServiceError> {
        Ok(self.api.category_entries(&category.id, kind).await?)
    }
}

/// Keeps a loaded list sorted after inserting or replacing one category.
pub fn upsert_category(list: &mut Vec<Category>, category: Category) {
    match list.iter_mut().find(|existing| existing.id == category.id) {
        Some(existing) => *existing = category,
        None => list.push(category),
    }
    sort_by_name(list);
}

fn sort_by_name(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        crate::domain::entities::table::locale_compare(&a.name, &b.name)
    });
}
