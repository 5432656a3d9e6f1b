// ============================================================================
// STORE : CODES DE VÉRIFICATION
// ============================================================================
//
// Description:
//   Codes à usage unique pour le reset de mot de passe, indexés par identité
//   ("adopter:ana@example.com"). Stockés en mémoire uniquement: un redémarrage
//   perd les flows en cours (TTL de 5 à 15 minutes, acceptable).
//
// Cycle de vie:
//   NONE --issue--> ISSUED --check ok + mark_verified--> VERIFIED --clear--> NONE
//   - issue écrase toujours l'entrée précédente (nouveau code, +5 min)
//   - check et mark_verified ne voient que les entrées ISSUED
//   - mark_verified recompare le code sous le verrou, puis prolonge à +15 min
//   - une entrée expirée est traitée comme absente (pas de tâche de purge)
//
// Points d'attention:
//   - Un seul Mutex pour toute la map, jamais tenu à travers un .await
//   - La comparaison du code est en temps constant
//
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::Rng;
use thiserror::Error;

use crate::utils::constant_time_eq;

pub const CODE_TTL_SECONDS: i64 = 5 * 60;
pub const VERIFIED_TTL_SECONDS: i64 = 15 * 60;
const CODE_SPACE: u32 = 1_000_000;

#[derive(Debug, Error)]
pub enum VerificationStoreError {
    /// Réservé aux implémentations persistantes (cache TTL externe).
    /// Le store mémoire ne peut pas échouer.
    #[allow(dead_code)]
    #[error("verification store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    Issued,
    Verified,
}

#[derive(Debug, Clone)]
pub struct VerificationEntry {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub state: VerificationState,
}

impl VerificationEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Contrat du store, injecté dans le service de reset.
/// L'implémentation mémoire peut être remplacée par un cache TTL sans toucher aux appelants.
#[async_trait]
pub trait VerificationCodeStore: Send + Sync {
    async fn issue(&self, identity: &str) -> Result<String, VerificationStoreError>;

    async fn check(&self, identity: &str, code: &str) -> Result<bool, VerificationStoreError>;

    /// Passe ISSUED -> VERIFIED si `code` est toujours le code en cours.
    /// Renvoie false si l'entrée a été remplacée, vérifiée ou a expiré entre-temps.
    async fn mark_verified(&self, identity: &str, code: &str) -> Result<bool, VerificationStoreError>;

    async fn is_verified(&self, identity: &str) -> Result<bool, VerificationStoreError>;

    async fn clear(&self, identity: &str) -> Result<(), VerificationStoreError>;
}

pub struct InMemoryVerificationStore {
    entries: Mutex<HashMap<String, VerificationEntry>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryVerificationStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, VerificationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_entry<'a>(
        entries: &'a mut HashMap<String, VerificationEntry>,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Option<&'a mut VerificationEntry> {
        entries.get_mut(identity).filter(|entry| entry.is_live(now))
    }

    /// Entrée ISSUED, non expirée, dont le code correspond
    fn pending_match<'a>(
        entries: &'a mut HashMap<String, VerificationEntry>,
        identity: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Option<&'a mut VerificationEntry> {
        Self::live_entry(entries, identity, now).filter(|entry| {
            entry.state == VerificationState::Issued && constant_time_eq(entry.code.as_bytes(), code.as_bytes())
        })
    }
}

/// Code numérique à 6 chiffres, complété par des zéros ("004217")
fn generate_code() -> String {
    let value = rand::thread_rng().gen_range(0..CODE_SPACE);
    format!("{:06}", value)
}

#[async_trait]
impl VerificationCodeStore for InMemoryVerificationStore {
    async fn issue(&self, identity: &str) -> Result<String, VerificationStoreError> {
        let now = self.clock.utc();
        let code = generate_code();

        let mut entries = self.lock_entries();
        // Purge opportuniste des flows abandonnés
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            identity.to_string(),
            VerificationEntry {
                code: code.clone(),
                expires_at: now + TimeDelta::seconds(CODE_TTL_SECONDS),
                state: VerificationState::Issued,
            },
        );

        Ok(code)
    }

    async fn check(&self, identity: &str, code: &str) -> Result<bool, VerificationStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries();

        Ok(Self::pending_match(&mut entries, identity, code, now).is_some())
    }

    async fn mark_verified(&self, identity: &str, code: &str) -> Result<bool, VerificationStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries();

        let Some(entry) = Self::pending_match(&mut entries, identity, code, now) else {
            return Ok(false);
        };
        entry.state = VerificationState::Verified;
        entry.expires_at = now + TimeDelta::seconds(VERIFIED_TTL_SECONDS);

        Ok(true)
    }

    async fn is_verified(&self, identity: &str) -> Result<bool, VerificationStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries();

        Ok(Self::live_entry(&mut entries, identity, now)
            .is_some_and(|entry| entry.state == VerificationState::Verified))
    }

    async fn clear(&self, identity: &str) -> Result<(), VerificationStoreError> {
        self.lock_entries().remove(identity);
        Ok(())
    }
}
