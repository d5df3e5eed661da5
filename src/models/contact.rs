//! Contact domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::contact;

/// Contact lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    InProgress,
    Resolved,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body for contact form submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub ngo_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated contact submission with trimmed fields.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub ngo_id: Option<String>,
    pub subject: String,
    pub message: String,
}

impl SubmitContactRequest {
    /// Validate the request, collecting every violation.
    pub fn validate(&self) -> Result<ContactSubmission, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            errors.push("Name is required".to_string());
        } else if name.len() > 100 {
            errors.push("Name must be between 1 and 100 characters".to_string());
        }

        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_lowercase();
        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !is_plausible_email(&email) {
            errors.push("Invalid email format".to_string());
        }

        let ngo_id = self
            .ngo_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(id) = ngo_id
            && id.len() > 50
        {
            errors.push("NGO ID must be less than 50 characters".to_string());
        }

        let subject = self.subject.as_deref().map(str::trim).unwrap_or("");
        if subject.is_empty() {
            errors.push("Subject is required".to_string());
        } else if subject.len() > 200 {
            errors.push("Subject must be between 1 and 200 characters".to_string());
        }

        let message = self.message.as_deref().map(str::trim).unwrap_or("");
        if message.is_empty() {
            errors.push("Message is required".to_string());
        } else if message.len() > 2000 {
            errors.push("Message must be between 1 and 2000 characters".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContactSubmission {
            name: name.to_string(),
            email,
            ngo_id: ngo_id.map(str::to_string),
            subject: subject.to_string(),
            message: message.to_string(),
        })
    }
}

/// Minimal shape check: local part, one '@', dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Request body for updating a contact's status.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateContactStatusRequest {
    pub status: ContactStatus,
}

/// Persisted contact, as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ngo_id: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<contact::Model> for ContactResponse {
    fn from(m: contact::Model) -> Self {
        ContactResponse {
            id: m.id,
            name: m.name,
            email: m.email,
            ngo_id: m.ngo_id,
            subject: m.subject,
            message: m.message,
            status: ContactStatus::parse(&m.status).unwrap_or(ContactStatus::New),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmitContactRequest {
        SubmitContactRequest {
            name: Some("Jane Doe".to_string()),
            email: Some("jane@example.org".to_string()),
            ngo_id: Some("NGO001".to_string()),
            subject: Some("Funding question".to_string()),
            message: Some("How do I apply?".to_string()),
        }
    }

    #[test]
    fn test_valid_contact_passes() {
        let submission = valid_request().validate().expect("should validate");
        assert_eq!(submission.email, "jane@example.org");
        assert_eq!(submission.ngo_id.as_deref(), Some("NGO001"));
    }

    #[test]
    fn test_email_is_lowercased() {
        let req = SubmitContactRequest {
            email: Some("Jane@Example.ORG".to_string()),
            ..valid_request()
        };
        let submission = req.validate().expect("should validate");
        assert_eq!(submission.email, "jane@example.org");
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["not-an-email", "@example.org", "jane@", "jane@nodot"] {
            let req = SubmitContactRequest {
                email: Some(email.to_string()),
                ..valid_request()
            };
            let errors = req.validate().unwrap_err();
            assert!(errors.iter().any(|e| e.contains("Invalid email")), "{email}");
        }
    }

    #[test]
    fn test_missing_fields_accumulate() {
        let req = SubmitContactRequest {
            name: None,
            email: None,
            ngo_id: None,
            subject: None,
            message: None,
        };
        let errors = req.validate().unwrap_err();
        // ngo_id is optional; the other four are required
        assert_eq!(errors.len(), 4);
    }
}
