//! Actix-web extractor for Bearer-token authentication.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use super::AuthService;
use crate::error::ErrorResponse;
use crate::models::Claims;

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid Bearer token.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(auth: AuthUser) -> impl Responder {
///     // auth.claims contains the verified token claims
/// }
/// ```
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    /// Guard for admin-only handlers.
    pub fn require_admin(&self) -> Result<(), crate::error::AppError> {
        if self.claims.is_admin() {
            Ok(())
        } else {
            Err(crate::error::AppError::Unauthorized(
                "Admin role required".to_string(),
            ))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(auth_service) = req.app_data::<web::Data<AuthService>>() else {
            return ready(Err(AuthError {
                message: "Internal configuration error".to_string(),
            }));
        };

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let Some(token) = token else {
            return ready(Err(AuthError {
                message: "Missing Authorization header. Provide a Bearer token.".to_string(),
            }));
        };

        match auth_service.verify_token(token) {
            Ok(claims) => ready(Ok(AuthUser { claims })),
            Err(_) => ready(Err(AuthError {
                message: "Invalid or expired token".to_string(),
            })),
        }
    }
}
