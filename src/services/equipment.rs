//! Equipment inventory service
//!
//! Thin CRUD over the repository plus code generation and the recycle bin.
//! Stock edits through here are explicit admin corrections; loan-driven
//! stock movement stays inside the loan transactions.

use rand::Rng;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ActivityType,
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list().await
    }

    pub async fn create(&self, actor_id: i32, request: &CreateEquipment) -> AppResult<Equipment> {
        // Referenced category must exist and be live
        self.repository.categories.get_by_id(request.category_id).await?;

        let code = generate_equipment_code();
        let equipment = self.repository.equipment.create(&code, request).await?;

        self.audit(
            actor_id,
            ActivityType::CreateEquipment,
            &format!("Added equipment {} ({})", equipment.name, equipment.code),
        )
        .await;
        Ok(equipment)
    }

    pub async fn update(
        &self,
        actor_id: i32,
        id: i32,
        request: &UpdateEquipment,
    ) -> AppResult<Equipment> {
        if let Some(category_id) = request.category_id {
            self.repository.categories.get_by_id(category_id).await?;
        }

        let equipment = self.repository.equipment.update(id, request).await?;

        self.audit(
            actor_id,
            ActivityType::UpdateEquipment,
            &format!("Updated equipment {} ({})", equipment.name, equipment.code),
        )
        .await;
        Ok(equipment)
    }

    /// Move equipment to the recycle bin. Items with an open loan stay put.
    pub async fn delete(&self, actor_id: i32, id: i32) -> AppResult<()> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        if self.repository.loans.has_any_open_for_equipment(id).await? {
            return Err(AppError::Validation(format!(
                "Equipment {} has open loans and cannot be deleted",
                equipment.code
            )));
        }

        self.repository.equipment.soft_delete(id).await?;

        self.audit(
            actor_id,
            ActivityType::DeleteEquipment,
            &format!("Deleted equipment {} ({})", equipment.name, equipment.code),
        )
        .await;
        Ok(())
    }

    pub async fn list_deleted(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list_deleted().await
    }

    pub async fn restore(&self, actor_id: i32, id: i32) -> AppResult<Equipment> {
        let equipment = self.repository.equipment.restore(id).await?;

        self.audit(
            actor_id,
            ActivityType::RestoreEquipment,
            &format!("Restored equipment {} ({})", equipment.name, equipment.code),
        )
        .await;
        Ok(equipment)
    }

    pub async fn purge(&self, actor_id: i32, id: i32) -> AppResult<()> {
        self.repository.equipment.purge(id).await?;

        self.audit(
            actor_id,
            ActivityType::DeleteEquipment,
            &format!("Permanently removed equipment {}", id),
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

/// Generate an equipment code of the form ALT-XXXXX
fn generate_equipment_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..5)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("ALT-{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_codes_follow_the_expected_shape() {
        let code = generate_equipment_code();
        assert!(code.starts_with("ALT-"));
        assert_eq!(code.len(), 9);
        assert!(code[4..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
