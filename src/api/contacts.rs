//! Contact form API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContactResponse, ContactStatus, SubmitContactRequest, UpdateContactStatusRequest,
};

/// Submit a contact form.
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    tag = "Contacts",
    request_body = SubmitContactRequest,
    responses(
        (status = 201, description = "Contact submitted", body = ContactResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse),
    )
)]
pub async fn submit_contact(
    pool: web::Data<DbPool>,
    body: web::Json<SubmitContactRequest>,
) -> AppResult<HttpResponse> {
    let submission = body.into_inner().validate().map_err(AppError::Validation)?;

    let contact = pool.insert_contact(&submission).await?;

    info!("Contact form submitted: {}", contact.id);

    Ok(HttpResponse::Created().json(ContactResponse::from(contact)))
}

/// List all contacts, newest first (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    tag = "Contacts",
    responses(
        (status = 200, description = "Contacts", body = Vec<ContactResponse>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_contacts(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let contacts = pool.list_contacts().await?;
    let response: Vec<ContactResponse> =
        contacts.into_iter().map(ContactResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// List contacts in a given status (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/contacts/status/{status}",
    tag = "Contacts",
    params(
        ("status" = String, Path, description = "new, in_progress or resolved")
    ),
    responses(
        (status = 200, description = "Contacts", body = Vec<ContactResponse>),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_contacts_by_status(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let status = ContactStatus::parse(&path.into_inner())
        .ok_or_else(|| AppError::InvalidInput("Unknown contact status".to_string()))?;

    let contacts = pool.list_contacts_by_status(status).await?;
    let response: Vec<ContactResponse> =
        contacts.into_iter().map(ContactResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a contact by id (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{contact_id}",
    tag = "Contacts",
    params(
        ("contact_id" = Uuid, Path, description = "Contact UUID")
    ),
    responses(
        (status = 200, description = "Contact", body = ContactResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_contact(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let contact_id = path.into_inner();
    let contact = pool
        .get_contact_by_id(contact_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {}", contact_id)))?;

    Ok(HttpResponse::Ok().json(ContactResponse::from(contact)))
}

/// Update a contact's status (admin only).
#[utoipa::path(
    put,
    path = "/api/v1/contacts/{contact_id}/status",
    tag = "Contacts",
    params(
        ("contact_id" = Uuid, Path, description = "Contact UUID")
    ),
    request_body = UpdateContactStatusRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Contact not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_contact_status(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContactStatusRequest>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let contact_id = path.into_inner();
    let contact = pool
        .update_contact_status(contact_id, body.status)
        .await?;

    info!("Contact {} moved to {}", contact.id, contact.status);

    Ok(HttpResponse::Ok().json(ContactResponse::from(contact)))
}

/// Configure contact routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contacts")
            .route(web::get().to(list_contacts))
            .route(web::post().to(submit_contact)),
    )
    .service(
        web::resource("/contacts/status/{status}").route(web::get().to(list_contacts_by_status)),
    )
    .service(web::resource("/contacts/{contact_id}").route(web::get().to(get_contact)))
    .service(
        web::resource("/contacts/{contact_id}/status")
            .route(web::put().to(update_contact_status)),
    );
}
