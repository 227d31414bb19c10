//! Equipment category service

use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CreateCategory},
        enums::ActivityType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn create(&self, actor_id: i32, request: &CreateCategory) -> AppResult<Category> {
        let category = self.repository.categories.create(request).await?;

        self.audit(
            actor_id,
            ActivityType::CreateCategory,
            &format!("Added category {}", category.name),
        )
        .await;
        Ok(category)
    }

    /// Move a category to the recycle bin. Categories still holding live
    /// equipment stay put.
    pub async fn delete(&self, actor_id: i32, id: i32) -> AppResult<()> {
        let category = self.repository.categories.get_by_id(id).await?;
        if self.repository.equipment.count_live_in_category(id).await? > 0 {
            return Err(AppError::Validation(format!(
                "Category {} still holds equipment and cannot be deleted",
                category.name
            )));
        }

        self.repository.categories.soft_delete(id).await?;

        self.audit(
            actor_id,
            ActivityType::DeleteCategory,
            &format!("Deleted category {}", category.name),
        )
        .await;
        Ok(())
    }

    pub async fn list_deleted(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list_deleted().await
    }

    pub async fn restore(&self, actor_id: i32, id: i32) -> AppResult<Category> {
        let category = self.repository.categories.restore(id).await?;

        self.audit(
            actor_id,
            ActivityType::RestoreCategory,
            &format!("Restored category {}", category.name),
        )
        .await;
        Ok(category)
    }

    pub async fn purge(&self, actor_id: i32, id: i32) -> AppResult<()> {
        self.repository.categories.purge(id).await?;

        self.audit(
            actor_id,
            ActivityType::DeleteCategory,
            &format!("Permanently removed category {}", id),
        )
        .await;
        Ok(())
    }

    async fn audit(&self, user_id: i32, event: ActivityType, detail: &str) {
        if let Err(e) = self.repository.activity.log(user_id, event.as_str(), detail).await {
            tracing::warn!("Failed to write activity log: {}", e);
        }
    }
}
