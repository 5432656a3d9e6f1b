// ============================================================================
// MODÈLE : ADOPTION SUBMISSIONS
// ============================================================================
//
// Description:
//   Une demande d'adoption = un adoptant, un animal, un refuge.
//   Contient le contact alternatif, le questionnaire et les références
//   vers les pièces d'identité (noms de fichiers).
//
// Colonnes de la table adoption_submissions:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - shelter_id, pet_id, adopter_id (INTEGER, NOT NULL, FK)
//   - alt_* : contact alternatif (tous NOT NULL)
//   - alt_email (VARCHAR, UNIQUE, NOT NULL)
//   - pet_type ... interview_setting : questionnaire (NOT NULL)
//   - valid_id, alt_valid_id (VARCHAR, NULL) - nom du fichier envoyé
//   - status (VARCHAR, 'Pending' | 'Approved' | 'Declined')
//   - created_at (TIMESTAMPTZ, NOT NULL)
//
// Points d'attention:
//   - alt_email est UNIQUE en BD: c'est la vraie garantie contre les doublons,
//     la vérification applicative n'est qu'un raccourci
//   - Le statut est modifié par le workflow de revue (hors de ce service)
//   - ON DELETE CASCADE vers submission_photos
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SubmissionStatus {
    #[default]
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Declined")]
    Declined,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "adoption_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub shelter_id: i32,
    pub pet_id: i32,
    pub adopter_id: i32,

    pub alt_first_name: String,
    pub alt_last_name: String,
    pub alt_relationship: String,
    pub alt_phone: String,
    #[sea_orm(unique)]
    pub alt_email: String,

    pub pet_type: String,
    pub ideal_pet_description: String,
    pub housing_situation: String,
    pub pets_at_home: String,
    pub allergies: String,
    pub family_support: String,
    pub past_pets: String,
    pub interview_setting: String,

    #[serde(rename = "validID")]
    pub valid_id: Option<String>,
    #[serde(rename = "altValidID")]
    pub alt_valid_id: Option<String>,

    pub status: SubmissionStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shelters::Entity",
        from = "Column::ShelterId",
        to = "super::shelters::Column::Id"
    )]
    Shelter,

    #[sea_orm(
        belongs_to = "super::adopters::Entity",
        from = "Column::AdopterId",
        to = "super::adopters::Column::Id"
    )]
    Adopter,

    #[sea_orm(
        belongs_to = "super::pets::Entity",
        from = "Column::PetId",
        to = "super::pets::Column::Id"
    )]
    Pet,

    #[sea_orm(has_many = "super::submission_photos::Entity")]
    Photos,
}

impl Related<super::shelters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelter.def()
    }
}

impl Related<super::adopters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adopter.def()
    }
}

impl Related<super::pets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pet.def()
    }
}

impl Related<super::submission_photos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
