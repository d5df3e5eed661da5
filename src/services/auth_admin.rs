//! Admin login endpoints.
//!
//! Tokens are stateless JWTs: logout is an acknowledgement for clients that
//! want to drop their token, nothing is revoked server-side.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::{AuthService, AuthUser, verify_password};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, LoginResponse, UserInfo};

/// Authenticate with username/password and receive a JWT.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
    )
)]
pub async fn login(
    pool: web::Data<DbPool>,
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = pool.find_user_by_username(&req.username).await?;

    // Same response for unknown user and wrong password
    let Some(user) = user else {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = auth.issue_token(user.id, &user.username, &user.role)?;

    info!("User {} logged in", user.username);

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Acknowledge logout. Tokens are stateless; clients simply discard theirs.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out"),
    )
)]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Logged out" }))
}

/// Return the authenticated user's info.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let user = pool
        .find_user_by_id(auth.claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", auth.claims.sub)))?;

    Ok(HttpResponse::Ok().json(UserInfo::from(user)))
}

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/login").route(web::post().to(login)))
        .service(web::resource("/auth/logout").route(web::post().to(logout)))
        .service(web::resource("/auth/me").route(web::get().to(me)));
}
