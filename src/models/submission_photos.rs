// ============================================================================
// MODÈLE : SUBMISSION PHOTOS
// ============================================================================
//
// Colonnes de la table submission_photos:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - submission_id (INTEGER, NOT NULL, FK vers adoption_submissions)
//   - photo_type (VARCHAR) - 'Home Photo or PDF' | 'Valid ID' | 'Alternate Valid ID'
//   - file_name (VARCHAR, NULL)
//   - payload (TEXT, NOT NULL) - contenu du fichier en base64
//   - uploaded_at (TIMESTAMPTZ, NOT NULL)
//
// Points d'attention:
//   - Toujours créée dans la même transaction que sa demande
//   - Plusieurs 'Home Photo or PDF', au plus une de chaque pièce d'identité
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PhotoType {
    #[serde(rename = "Home Photo or PDF")]
    #[sea_orm(string_value = "Home Photo or PDF")]
    HomePhoto,
    #[serde(rename = "Valid ID")]
    #[sea_orm(string_value = "Valid ID")]
    ValidId,
    #[serde(rename = "Alternate Valid ID")]
    #[sea_orm(string_value = "Alternate Valid ID")]
    AltValidId,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "submission_photos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub submission_id: i32,

    pub photo_type: PhotoType,

    pub file_name: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub payload: String,

    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::adoption_submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::adoption_submissions::Column::Id",
        on_delete = "Cascade"
    )]
    Submission,
}

impl Related<super::adoption_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
