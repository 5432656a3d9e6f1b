use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{adopters, shelters};

/// Les deux types de comptes partagent la même logique (login, reset...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Shelter,
    Adopter,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Shelter => "shelter",
            AccountKind::Adopter => "adopter",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vue commune d'un refuge ou d'un adoptant
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i32,
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<shelters::Model> for Account {
    fn from(m: shelters::Model) -> Self {
        Self {
            id: m.id,
            kind: AccountKind::Shelter,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
        }
    }
}

impl From<adopters::Model> for Account {
    fn from(m: adopters::Model) -> Self {
        Self {
            id: m.id,
            kind: AccountKind::Adopter,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    fn kind(&self) -> AccountKind;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    /// Pas encore appelé par les routes (les tokens portent déjà l'identité)
    #[allow(dead_code)]
    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AppError>;

    /// Crée le compte. CONFLICT si l'email est déjà pris.
    async fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<Account, AppError>;

    async fn update_password(&self, id: i32, password_hash: &str) -> Result<(), AppError>;
}

/// Implémentation SeaORM: table `shelters` ou `adopters` selon `kind`
pub struct SeaOrmAccountRepository {
    db: DatabaseConnection,
    kind: AccountKind,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection, kind: AccountKind) -> Self {
        Self { db, kind }
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    fn kind(&self) -> AccountKind {
        self.kind
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = match self.kind {
            AccountKind::Shelter => shelters::Entity::find()
                .filter(shelters::Column::Email.eq(email))
                .one(&self.db)
                .await?
                .map(Account::from),
            AccountKind::Adopter => adopters::Entity::find()
                .filter(adopters::Column::Email.eq(email))
                .one(&self.db)
                .await?
                .map(Account::from),
        };

        Ok(account)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Account>, AppError> {
        let account = match self.kind {
            AccountKind::Shelter => shelters::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Account::from),
            AccountKind::Adopter => adopters::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(Account::from),
        };

        Ok(account)
    }

    async fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<Account, AppError> {
        // 1. Vérifier si l'email existe déjà (la contrainte UNIQUE couvre les courses)
        if self.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        // 2. Insérer dans la bonne table
        let created = match self.kind {
            AccountKind::Shelter => shelters::ActiveModel {
                name: Set(name.to_string()),
                email: Set(email.to_string()),
                password_hash: Set(password_hash.to_string()),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
                .insert(&self.db)
                .await
                .map(Account::from),
            AccountKind::Adopter => adopters::ActiveModel {
                name: Set(name.to_string()),
                email: Set(email.to_string()),
                password_hash: Set(password_hash.to_string()),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
                .insert(&self.db)
                .await
                .map(Account::from),
        };

        created.map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
            other => other,
        })
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> Result<(), AppError> {
        let result = match self.kind {
            AccountKind::Shelter => shelters::Entity::update_many()
                .col_expr(shelters::Column::PasswordHash, Expr::value(password_hash))
                .filter(shelters::Column::Id.eq(id))
                .exec(&self.db)
                .await?,
            AccountKind::Adopter => adopters::Entity::update_many()
                .col_expr(adopters::Column::PasswordHash, Expr::value(password_hash))
                .filter(adopters::Column::Id.eq(id))
                .exec(&self.db)
                .await?,
        };

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{} not found", self.kind)));
        }

        Ok(())
    }
}
