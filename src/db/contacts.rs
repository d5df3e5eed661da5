//! Database queries for contact form submissions.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::contact::{self, ActiveModel, Column, Entity as Contact};
use crate::error::{AppError, AppResult};
use crate::models::ContactStatus;
use crate::models::contact::ContactSubmission;

use super::DbPool;

impl DbPool {
    /// Insert a new contact submission in `new` state.
    pub async fn insert_contact(
        &self,
        submission: &ContactSubmission,
    ) -> AppResult<contact::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(submission.name.clone()),
            email: Set(submission.email.clone()),
            ngo_id: Set(submission.ngo_id.clone()),
            subject: Set(submission.subject.clone()),
            message: Set(submission.message.clone()),
            status: Set(ContactStatus::New.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert contact: {}", e)))?;

        Ok(result)
    }

    /// Get a contact by ID.
    pub async fn get_contact_by_id(&self, id: Uuid) -> AppResult<Option<contact::Model>> {
        let result = Contact::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get contact: {}", e)))?;

        Ok(result)
    }

    /// List all contacts, newest first.
    pub async fn list_contacts(&self) -> AppResult<Vec<contact::Model>> {
        let result = Contact::find()
            .order_by_desc(Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list contacts: {}", e)))?;

        Ok(result)
    }

    /// List contacts in a given status, newest first.
    pub async fn list_contacts_by_status(
        &self,
        status: ContactStatus,
    ) -> AppResult<Vec<contact::Model>> {
        let result = Contact::find()
            .filter(Column::Status.eq(status.as_str()))
            .order_by_desc(Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list contacts: {}", e)))?;

        Ok(result)
    }

    /// Update a contact's status.
    pub async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> AppResult<contact::Model> {
        let contact = self
            .get_contact_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact {}", id)))?;

        let mut active: ActiveModel = contact.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update contact status: {}", e)))?;

        Ok(result)
    }
}
