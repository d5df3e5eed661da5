//! Database queries for users.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Column, Entity as User};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Find a user by username.
    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        let result = User::find()
            .filter(Column::Username.eq(username))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        Ok(result)
    }

    /// Find a user by ID.
    pub async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<user::Model>> {
        let result = User::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        Ok(result)
    }

    /// Insert a user. Called at startup to seed the admin account.
    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> AppResult<user::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

        Ok(result)
    }
}
