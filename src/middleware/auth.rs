use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::account_repository::AccountKind;
use crate::utils::jwt;

/// Compte authentifié (refuge ou adoptant), extrait du bearer token
/// Utilisé comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub account_id: i32,
    pub email: String,
    pub kind: AccountKind,
}

impl AuthUser {
    /// UNAUTHORIZED si le token n'appartient pas au bon type de compte
    pub fn require(&self, kind: AccountKind) -> Result<(), AppError> {
        if self.kind != kind {
            return Err(AppError::Unauthorized(format!("This action requires a {} account", kind)));
        }
        Ok(())
    }
}

fn extract(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // 1. Header Authorization
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    // 2. Format "Bearer <token>"
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid Authorization format (expected: Bearer <token>)".to_string())
    })?;

    // 3. Vérification du JWT
    let claims = jwt::verify_token(token).map_err(AppError::Unauthorized)?;

    Ok(AuthUser {
        account_id: claims.sub,
        email: claims.email,
        kind: claims.kind,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
