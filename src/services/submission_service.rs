// ============================================================================
// SERVICE : DEMANDES D'ADOPTION
// ============================================================================
//
// Workflow de création:
//   1. validate() : règles 1 à 5 (avant toute écriture)
//   2. l'animal existe ? -> son refuge devient shelter_id
//   3. email alternatif déjà utilisé ? -> CONFLICT
//   4. transaction:
//        - insert de la demande (status = Pending)
//        - une ligne par fichier "home" (plafond cumulé 15 MiB)
//        - validID puis altValidID (8 MiB chacun)
//      commit si tout passe, rollback automatique sinon
//
// Points d'attention:
//   - Aucune ligne partielle: un fichier trop gros annule aussi la demande
//   - La contrainte UNIQUE sur alt_email transforme une course en CONFLICT
//   - Pas de retry: l'appelant doit resoumettre
//
// ============================================================================

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use sea_orm::*;

use crate::error::AppError;
use crate::models::adoption_submissions::{self, SubmissionStatus};
use crate::models::dto::SubmissionDetail;
use crate::models::{pets, submission_photos};
use crate::models::submission_photos::PhotoType;
use crate::services::account_repository::AccountKind;
use crate::services::submission_validator::{self, SubmissionForm, ValidatedSubmission};

pub const MIB: usize = 1024 * 1024;
/// Plafond cumulé pour l'ensemble des fichiers "home"
pub const HOME_FILES_CEILING: usize = 15 * MIB;
/// Plafond par pièce d'identité
pub const ID_FILE_CEILING: usize = 8 * MIB;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fichiers reçus, déjà triés par catégorie
#[derive(Debug, Clone, Default)]
pub struct SubmissionUploads {
    pub home: Vec<UploadedFile>,
    pub valid_id: Option<UploadedFile>,
    pub alt_valid_id: Option<UploadedFile>,
}

/// Demande validée + identifiants résolus, prête pour la transaction
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub shelter_id: i32,
    pub adopter_id: i32,
    pub details: ValidatedSubmission,
}

pub struct SubmissionService;

impl SubmissionService {
    /// Chaîne complète: validation -> animal -> email unique -> transaction
    pub async fn create_submission(
        db: &DatabaseConnection,
        adopter_id: i32,
        form: &SubmissionForm,
        uploads: SubmissionUploads,
    ) -> Result<adoption_submissions::Model, AppError> {
        let details = submission_validator::validate(form)?;

        let pet = pets::Entity::find_by_id(details.pet_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pet {} not found", details.pet_id)))?;

        submission_validator::ensure_alt_email_available(db, &details.contact.email).await?;

        let new_submission = NewSubmission {
            shelter_id: pet.shelter_id,
            adopter_id,
            details,
        };

        Self::persist_submission(db, new_submission, uploads).await
    }

    /// Écrit la demande et ses pièces jointes en une seule transaction
    pub async fn persist_submission(
        db: &DatabaseConnection,
        new_submission: NewSubmission,
        uploads: SubmissionUploads,
    ) -> Result<adoption_submissions::Model, AppError> {
        let photo_count = uploads.home.len()
            + usize::from(uploads.valid_id.is_some())
            + usize::from(uploads.alt_valid_id.is_some());

        let submission = db
            .transaction::<_, adoption_submissions::Model, AppError>(move |txn| {
                Box::pin(async move {
                    // 1. La demande (avec les noms des pièces d'identité)
                    let id_references = (
                        uploads.valid_id.as_ref().and_then(|f| f.file_name.clone()),
                        uploads.alt_valid_id.as_ref().and_then(|f| f.file_name.clone()),
                    );
                    let submission = insert_submission(txn, new_submission, id_references).await?;

                    // 2. Photos du logement (plafond cumulé)
                    let mut home_total = 0usize;
                    for file in uploads.home {
                        home_total += file.bytes.len();
                        if home_total > HOME_FILES_CEILING {
                            return Err(AppError::SizeLimit(
                                "home photos exceed the 15 MiB total limit".to_string(),
                            ));
                        }
                        insert_photo(txn, submission.id, PhotoType::HomePhoto, file).await?;
                    }

                    // 3. Pièces d'identité
                    if let Some(file) = uploads.valid_id {
                        if file.bytes.len() > ID_FILE_CEILING {
                            return Err(AppError::SizeLimit("validID exceeds the 8 MiB limit".to_string()));
                        }
                        insert_photo(txn, submission.id, PhotoType::ValidId, file).await?;
                    }

                    if let Some(file) = uploads.alt_valid_id {
                        if file.bytes.len() > ID_FILE_CEILING {
                            return Err(AppError::SizeLimit("altValidID exceeds the 8 MiB limit".to_string()));
                        }
                        insert_photo(txn, submission.id, PhotoType::AltValidId, file).await?;
                    }

                    Ok(submission)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => AppError::from(db_err),
                TransactionError::Transaction(app_err) => app_err,
            })?;

        tracing::info!(
            submission_id = submission.id,
            adopter_id = submission.adopter_id,
            pet_id = submission.pet_id,
            photos = photo_count,
            "adoption submission created"
        );

        Ok(submission)
    }

    /// Une demande et ses pièces jointes, visible par l'adoptant ou le refuge concerné
    pub async fn find_with_photos(
        db: &DatabaseConnection,
        submission_id: i32,
        viewer_id: i32,
        viewer_kind: AccountKind,
    ) -> Result<SubmissionDetail, AppError> {
        let not_found = || AppError::NotFound(format!("Submission {} not found", submission_id));

        let submission = adoption_submissions::Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or_else(not_found)?;

        let owner_id = match viewer_kind {
            AccountKind::Adopter => submission.adopter_id,
            AccountKind::Shelter => submission.shelter_id,
        };
        // Pas de 403: on ne révèle pas l'existence des demandes des autres
        if owner_id != viewer_id {
            return Err(not_found());
        }

        let photos = submission_photos::Entity::find()
            .filter(submission_photos::Column::SubmissionId.eq(submission.id))
            .order_by_asc(submission_photos::Column::Id)
            .all(db)
            .await?;

        Ok(SubmissionDetail { submission, photos })
    }

    /// Les demandes d'un adoptant ou adressées à un refuge, plus récentes d'abord
    pub async fn list_for_account(
        db: &DatabaseConnection,
        account_id: i32,
        kind: AccountKind,
    ) -> Result<Vec<adoption_submissions::Model>, AppError> {
        let filter = match kind {
            AccountKind::Adopter => adoption_submissions::Column::AdopterId.eq(account_id),
            AccountKind::Shelter => adoption_submissions::Column::ShelterId.eq(account_id),
        };

        let submissions = adoption_submissions::Entity::find()
            .filter(filter)
            .order_by_desc(adoption_submissions::Column::CreatedAt)
            .order_by_desc(adoption_submissions::Column::Id)
            .all(db)
            .await?;

        Ok(submissions)
    }
}

async fn insert_submission(
    txn: &DatabaseTransaction,
    new_submission: NewSubmission,
    (valid_id, alt_valid_id): (Option<String>, Option<String>),
) -> Result<adoption_submissions::Model, AppError> {
    let NewSubmission { shelter_id, adopter_id, details } = new_submission;
    let contact = details.contact;
    let answers = details.questionnaire;

    let model = adoption_submissions::ActiveModel {
        shelter_id: Set(shelter_id),
        pet_id: Set(details.pet_id),
        adopter_id: Set(adopter_id),
        alt_first_name: Set(contact.first_name),
        alt_last_name: Set(contact.last_name),
        alt_relationship: Set(contact.relationship),
        alt_phone: Set(contact.phone),
        alt_email: Set(contact.email),
        pet_type: Set(answers.pet_type),
        ideal_pet_description: Set(answers.ideal_pet_description),
        housing_situation: Set(answers.housing_situation),
        pets_at_home: Set(answers.pets_at_home),
        allergies: Set(answers.allergies),
        family_support: Set(answers.family_support),
        past_pets: Set(answers.past_pets),
        interview_setting: Set(answers.interview_setting),
        valid_id: Set(valid_id),
        alt_valid_id: Set(alt_valid_id),
        status: Set(SubmissionStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model.insert(txn).await.map_err(|e| match AppError::from(e) {
        // Deux soumissions concurrentes ont passé la vérification applicative
        AppError::Conflict(_) => AppError::Conflict("email already used.".to_string()),
        other => other,
    })
}

async fn insert_photo(
    txn: &DatabaseTransaction,
    submission_id: i32,
    photo_type: PhotoType,
    file: UploadedFile,
) -> Result<(), AppError> {
    let payload = STANDARD.encode(&file.bytes);

    submission_photos::ActiveModel {
        submission_id: Set(submission_id),
        photo_type: Set(photo_type),
        file_name: Set(file.file_name),
        payload: Set(payload),
        uploaded_at: Set(Utc::now()),
        ..Default::default()
    }
        .insert(txn)
        .await?;

    Ok(())
}
