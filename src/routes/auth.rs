use actix_web::{HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::account_repository::{Account, AccountKind, AccountRepository, SeaOrmAccountRepository};
use crate::utils::{jwt, password};

// DTO pour l'inscription
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

// DTO pour la connexion
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après login/register
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub account_id: i32,
    pub email: String,
    pub kind: AccountKind,
}

impl AuthResponse {
    fn for_account(account: &Account) -> Result<Self, AppError> {
        let token = jwt::generate_token(account.id, &account.email, account.kind).map_err(AppError::Internal)?;

        Ok(Self {
            token,
            account_id: account.id,
            email: account.email.clone(),
            kind: account.kind,
        })
    }
}

/// POST /auth/{kind}/register - Créer un compte refuge ou adoptant (PUBLIC)
#[post("/{kind}/register")]
pub async fn register(
    kind: web::Path<AccountKind>,
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let accounts = SeaOrmAccountRepository::new(db.get_ref().clone(), kind.into_inner());
    let email = body.email.trim().to_lowercase();

    let password_hash = password::hash_password(&body.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let account = accounts.create(&email, body.name.trim(), &password_hash).await?;
    tracing::info!(kind = %account.kind, account_id = account.id, "account registered");

    Ok(HttpResponse::Created().json(AuthResponse::for_account(&account)?))
}

/// POST /auth/{kind}/login - Se connecter (PUBLIC)
#[post("/{kind}/login")]
pub async fn login(
    kind: web::Path<AccountKind>,
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());
    let accounts = SeaOrmAccountRepository::new(db.get_ref().clone(), kind.into_inner());

    let account = accounts
        .find_by_email(&body.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    let is_valid = password::verify_password(&body.password, &account.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;

    if !is_valid {
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(AuthResponse::for_account(&account)?))
}

/// GET /auth/me - Identité portée par le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth_user)
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
    );
}
