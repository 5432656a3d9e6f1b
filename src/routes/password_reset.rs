use actix_web::{HttpResponse, post, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::dto::MessageResponse;
use crate::services::account_repository::{AccountKind, SeaOrmAccountRepository};
use crate::services::password_reset::PasswordResetService;

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResetRequest {
    pub email: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// POST /{kind}/reset/request - Envoie un code de vérification par email
#[post("/{kind}/reset/request")]
pub async fn request_code(
    kind: web::Path<AccountKind>,
    body: web::Json<ResetRequest>,
    db: web::Data<DatabaseConnection>,
    resets: web::Data<PasswordResetService>,
) -> Result<HttpResponse, AppError> {
    let accounts = SeaOrmAccountRepository::new(db.get_ref().clone(), kind.into_inner());
    resets.request(&accounts, &body.email.trim().to_lowercase()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Verification code sent")))
}

/// POST /{kind}/reset/verify - Vérifie le code reçu
#[post("/{kind}/reset/verify")]
pub async fn verify_code(
    kind: web::Path<AccountKind>,
    body: web::Json<VerifyCodeRequest>,
    resets: web::Data<PasswordResetService>,
) -> Result<HttpResponse, AppError> {
    resets.verify(kind.into_inner(), &body.email, &body.code).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Code verified")))
}

/// POST /{kind}/reset/confirm - Nouveau mot de passe (après vérification)
#[post("/{kind}/reset/confirm")]
pub async fn confirm_reset(
    kind: web::Path<AccountKind>,
    body: web::Json<ConfirmResetRequest>,
    db: web::Data<DatabaseConnection>,
    resets: web::Data<PasswordResetService>,
) -> Result<HttpResponse, AppError> {
    let accounts = SeaOrmAccountRepository::new(db.get_ref().clone(), kind.into_inner());
    resets
        .reset(&accounts, &body.email.trim().to_lowercase(), &body.new_password, &body.confirm_password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated")))
}

pub fn password_reset_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(request_code)
        .service(verify_code)
        .service(confirm_reset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::email::{EmailError, EmailSender};
    use crate::services::verification_store::InMemoryVerificationStore;
    use crate::test_support::{MutableClock, fixture_timestamp, seed_adopter, setup_db};
    use crate::utils::password;
    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    use std::sync::{Arc, Mutex};

    use crate::models::adopters;

    /// Garde le dernier corps d'email pour récupérer le code
    #[derive(Default)]
    struct Inbox(Mutex<Option<String>>);

    impl Inbox {
        fn last_code(&self) -> String {
            let body = self.0.lock().unwrap().clone().expect("an email was sent");
            body.split_whitespace()
                .find(|w| w.trim_end_matches('.').len() == 6 && w.trim_end_matches('.').chars().all(|c| c.is_ascii_digit()))
                .map(|w| w.trim_end_matches('.').to_string())
                .expect("code in body")
        }
    }

    #[async_trait]
    impl EmailSender for Inbox {
        async fn send(&self, _to: &str, _subject: &str, body: &str) -> Result<(), EmailError> {
            *self.0.lock().unwrap() = Some(body.to_string());
            Ok(())
        }
    }

    #[actix_web::test]
    async fn test_full_reset_flow_over_http() {
        let db = setup_db().await;
        let adopter = seed_adopter(&db, "ana@example.com").await;
        let mut active: adopters::ActiveModel = adopter.clone().into();
        active.password_hash = Set(password::hash_password("old-password").unwrap());
        active.update(&db).await.unwrap();

        let inbox = Arc::new(Inbox::default());
        let clock = Arc::new(MutableClock::new(fixture_timestamp()));
        let resets = PasswordResetService::new(Arc::new(InMemoryVerificationStore::new(clock)), inbox.clone());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db.clone()))
                .app_data(web::Data::new(resets))
                .configure(password_reset_routes)
        ).await;

        let req = test::TestRequest::post()
            .uri("/adopter/reset/request")
            .set_json(serde_json::json!({ "email": "ana@example.com" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        // Confirmer sans vérifier le code: refusé
        let req = test::TestRequest::post()
            .uri("/adopter/reset/confirm")
            .set_json(serde_json::json!({
                "email": "ana@example.com",
                "newPassword": "new-password",
                "confirmPassword": "new-password"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/adopter/reset/verify")
            .set_json(serde_json::json!({ "email": "ana@example.com", "code": inbox.last_code() }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/adopter/reset/confirm")
            .set_json(serde_json::json!({
                "email": "ana@example.com",
                "newPassword": "new-password",
                "confirmPassword": "new-password"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let stored = adopters::Entity::find_by_id(adopter.id).one(&db).await.unwrap().unwrap();
        assert!(password::verify_password("new-password", &stored.password_hash).unwrap());
    }

    #[actix_web::test]
    async fn test_unknown_email_and_unknown_kind() {
        let db = setup_db().await;
        let clock = Arc::new(MutableClock::new(fixture_timestamp()));
        let resets = PasswordResetService::new(
            Arc::new(InMemoryVerificationStore::new(clock)),
            Arc::new(Inbox::default()),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(resets))
                .configure(password_reset_routes)
        ).await;

        let req = test::TestRequest::post()
            .uri("/shelter/reset/request")
            .set_json(serde_json::json!({ "email": "nobody@example.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "NOT_FOUND");

        let req = test::TestRequest::post()
            .uri("/adopter/reset/verify")
            .set_json(serde_json::json!({ "email": "nobody@example.com", "code": "123456" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/volunteer/reset/request")
            .set_json(serde_json::json!({ "email": "nobody@example.com" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
