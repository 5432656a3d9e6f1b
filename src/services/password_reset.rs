// ============================================================================
// SERVICE : RESET DE MOT DE PASSE (code par email)
// ============================================================================
//
// Workflow (identique pour refuges et adoptants):
//   1. request : compte existe ? -> issue() -> email avec le code
//   2. verify  : check(code) ok -> mark_verified(code) (fenêtre de 15 min, une seule fois)
//   3. reset   : mots de passe identiques + is_verified() -> nouveau hash -> clear()
//
// Points d'attention:
//   - Un échec d'envoi d'email laisse le code valide (le client peut refaire request)
//   - Après un reset réussi, il faut recommencer à l'étape 1
//   - Aucun retry automatique
//
// ============================================================================

use std::sync::Arc;

use crate::error::AppError;
use crate::services::account_repository::{AccountKind, AccountRepository};
use crate::services::email::EmailSender;
use crate::services::verification_store::VerificationCodeStore;
use crate::utils::password;

pub struct PasswordResetService {
    store: Arc<dyn VerificationCodeStore>,
    mailer: Arc<dyn EmailSender>,
}

/// Clé du store: un même email peut avoir un compte refuge ET un compte adoptant
fn identity_key(kind: AccountKind, email: &str) -> String {
    format!("{}:{}", kind, email.trim().to_lowercase())
}

impl PasswordResetService {
    pub fn new(store: Arc<dyn VerificationCodeStore>, mailer: Arc<dyn EmailSender>) -> Self {
        Self { store, mailer }
    }

    /// Étape 1: émet un code et l'envoie par email
    pub async fn request(&self, accounts: &dyn AccountRepository, email: &str) -> Result<(), AppError> {
        let account = accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account found with this email".to_string()))?;

        let code = self.store.issue(&identity_key(accounts.kind(), email)).await?;

        let body = format!(
            "Your verification code is {}. It expires in 5 minutes.\n\
             If you did not request a password reset, you can ignore this email.",
            code
        );

        if let Err(e) = self.mailer.send(&account.email, "Password reset code", &body).await {
            tracing::warn!(kind = %accounts.kind(), error = %e, "verification email delivery failed");
            return Err(AppError::Delivery(
                "Failed to send verification email, please try again".to_string(),
            ));
        }

        tracing::info!(kind = %accounts.kind(), account_id = account.id, "verification code issued");
        Ok(())
    }

    /// Étape 2: vérifie le code soumis
    pub async fn verify(&self, kind: AccountKind, email: &str, code: &str) -> Result<(), AppError> {
        let identity = identity_key(kind, email);

        if !self.store.check(&identity, code.trim()).await? {
            return Err(AppError::Unauthorized("Invalid or expired verification code".to_string()));
        }

        // Le code a pu être remplacé par une nouvelle demande depuis check()
        if !self.store.mark_verified(&identity, code.trim()).await? {
            return Err(AppError::Unauthorized("Invalid or expired verification code".to_string()));
        }
        Ok(())
    }

    /// Étape 3: change le mot de passe si le code a été vérifié
    pub async fn reset(
        &self,
        accounts: &dyn AccountRepository,
        email: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        if new_password.is_empty() {
            return Err(AppError::Validation("New password is required".to_string()));
        }
        if new_password != confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        let identity = identity_key(accounts.kind(), email);
        if !self.store.is_verified(&identity).await? {
            return Err(AppError::Unauthorized("Verification required before resetting password".to_string()));
        }

        let account = accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account found with this email".to_string()))?;

        let password_hash = password::hash_password(new_password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        accounts.update_password(account.id, &password_hash).await?;
        self.store.clear(&identity).await?;

        tracing::info!(kind = %accounts.kind(), account_id = account.id, "password reset completed");
        Ok(())
    }
}
