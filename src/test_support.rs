//! Fixtures partagées par les tests: BD SQLite en mémoire et horloge mutable.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    Schema, Set,
};

use crate::models::{adopters, adoption_submissions, pets, shelters, submission_photos};

/// BD SQLite en mémoire avec le schéma dérivé des entités.
/// Une seule connexion: sinon chaque connexion verrait sa propre BD vide.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite in memory");

    create_table(&db, shelters::Entity).await;
    create_table(&db, adopters::Entity).await;
    create_table(&db, pets::Entity).await;
    create_table(&db, adoption_submissions::Entity).await;
    create_table(&db, submission_photos::Entity).await;

    db
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(entity)))
        .await
        .expect("create table");
}

pub async fn seed_shelter(db: &DatabaseConnection, email: &str) -> shelters::Model {
    shelters::ActiveModel {
        name: Set("Happy Paws".to_string()),
        email: Set(email.to_string()),
        password_hash: Set("unused".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .expect("seed shelter")
}

pub async fn seed_adopter(db: &DatabaseConnection, email: &str) -> adopters::Model {
    adopters::ActiveModel {
        name: Set("Ana Reyes".to_string()),
        email: Set(email.to_string()),
        password_hash: Set("unused".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .expect("seed adopter")
}

pub async fn seed_pet(db: &DatabaseConnection, shelter_id: i32) -> pets::Model {
    pets::ActiveModel {
        shelter_id: Set(shelter_id),
        name: Set("Biscuit".to_string()),
        pet_type: Set("dog".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
        .insert(db)
        .await
        .expect("seed pet")
}

pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Horloge figée que les tests font avancer à la main
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
