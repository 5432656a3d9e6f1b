// ============================================================================
// VALIDATION DES DEMANDES D'ADOPTION
// ============================================================================
//
// Règles, dans cet ordre (la première qui échoue donne le message):
//   1. contact alternatif complet
//   2. questionnaire complet
//   3. téléphone >= 11 caractères
//   4. téléphone uniquement des chiffres
//   5. email avec '@' et '.'
//   6. email alternatif jamais utilisé (lecture BD, juste avant la transaction)
//
// Les valeurs sont trimées avant vérification.
//
// ============================================================================

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use thiserror::Error;

use crate::error::AppError;
use crate::models::adoption_submissions;

pub const MIN_PHONE_LENGTH: usize = 11;

/// Champs texte bruts du formulaire multipart
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionForm {
    pub pet_id: String,

    pub alt_first_name: String,
    pub alt_last_name: String,
    pub relationship: String,
    pub alt_phone: String,
    pub alt_email: String,

    pub pet_type: String,
    pub ideal_pet: String,
    pub housing_situation: String,
    pub pets_at_home: String,
    pub allergies: String,
    pub family_support: String,
    pub past_pets: String,
    pub interview_setting: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateContact {
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    pub pet_type: String,
    pub ideal_pet_description: String,
    pub housing_situation: String,
    pub pets_at_home: String,
    pub allergies: String,
    pub family_support: String,
    pub past_pets: String,
    pub interview_setting: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub pet_id: i32,
    pub contact: AlternateContact,
    pub questionnaire: Questionnaire,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionValidationError {
    #[error("alternate contact fields required.")]
    MissingAlternateContact,

    #[error("complete all questionnaire fields.")]
    IncompleteQuestionnaire,

    #[error("phone number must be at least 11 digits.")]
    PhoneTooShort,

    #[error("phone number must contain digits only.")]
    PhoneNotNumeric,

    #[error("invalid email format.")]
    InvalidEmail,

    #[error("a valid pet id is required.")]
    InvalidPetId,
}

impl From<SubmissionValidationError> for AppError {
    fn from(err: SubmissionValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

fn all_present(values: &[&str]) -> bool {
    values.iter().all(|v| !v.is_empty())
}

/// Validation pure (règles 1 à 5, puis l'identifiant de l'animal)
pub fn validate(form: &SubmissionForm) -> Result<ValidatedSubmission, SubmissionValidationError> {
    let contact = AlternateContact {
        first_name: form.alt_first_name.trim().to_string(),
        last_name: form.alt_last_name.trim().to_string(),
        relationship: form.relationship.trim().to_string(),
        phone: form.alt_phone.trim().to_string(),
        email: form.alt_email.trim().to_string(),
    };

    let questionnaire = Questionnaire {
        pet_type: form.pet_type.trim().to_string(),
        ideal_pet_description: form.ideal_pet.trim().to_string(),
        housing_situation: form.housing_situation.trim().to_string(),
        pets_at_home: form.pets_at_home.trim().to_string(),
        allergies: form.allergies.trim().to_string(),
        family_support: form.family_support.trim().to_string(),
        past_pets: form.past_pets.trim().to_string(),
        interview_setting: form.interview_setting.trim().to_string(),
    };

    if !all_present(&[
        contact.first_name.as_str(),
        contact.last_name.as_str(),
        contact.relationship.as_str(),
        contact.phone.as_str(),
        contact.email.as_str(),
    ]) {
        return Err(SubmissionValidationError::MissingAlternateContact);
    }

    if !all_present(&[
        questionnaire.pet_type.as_str(),
        questionnaire.ideal_pet_description.as_str(),
        questionnaire.housing_situation.as_str(),
        questionnaire.pets_at_home.as_str(),
        questionnaire.allergies.as_str(),
        questionnaire.family_support.as_str(),
        questionnaire.past_pets.as_str(),
        questionnaire.interview_setting.as_str(),
    ]) {
        return Err(SubmissionValidationError::IncompleteQuestionnaire);
    }

    if contact.phone.chars().count() < MIN_PHONE_LENGTH {
        return Err(SubmissionValidationError::PhoneTooShort);
    }

    if !contact.phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(SubmissionValidationError::PhoneNotNumeric);
    }

    if !(contact.email.contains('@') && contact.email.contains('.')) {
        return Err(SubmissionValidationError::InvalidEmail);
    }

    let pet_id = form
        .pet_id
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(SubmissionValidationError::InvalidPetId)?;

    Ok(ValidatedSubmission {
        pet_id,
        contact,
        questionnaire,
    })
}

/// Règle 6: raccourci applicatif. La contrainte UNIQUE sur alt_email reste
/// la garantie en cas de soumissions concurrentes.
pub async fn ensure_alt_email_available<C: ConnectionTrait>(db: &C, alt_email: &str) -> Result<(), AppError> {
    let existing = adoption_submissions::Entity::find()
        .filter(adoption_submissions::Column::AltEmail.eq(alt_email))
        .one(db)
        .await?;

    match existing {
        Some(_) => Err(AppError::Conflict("email already used.".to_string())),
        None => Ok(()),
    }
}
