use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, get, post, web};
use futures::StreamExt;
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::account_repository::AccountKind;
use crate::services::submission_service::{
    HOME_FILES_CEILING, ID_FILE_CEILING, MIB, SubmissionService, SubmissionUploads, UploadedFile,
};
use crate::services::submission_validator::SubmissionForm;

/// Lecture du corps multipart: au-delà, on arrête de lire
/// (les plafonds fins par fichier sont appliqués dans la transaction)
const MAX_BODY_BYTES: usize = HOME_FILES_CEILING + 2 * ID_FILE_CEILING + MIB;

/// Répartit les parties multipart entre champs texte et fichiers
#[derive(Debug, Default)]
struct SubmissionIntake {
    fields: Map<String, Value>,
    uploads: SubmissionUploads,
}

impl SubmissionIntake {
    fn push_text(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        let value = String::from_utf8(bytes)
            .map_err(|_| AppError::Validation(format!("field {} is not valid UTF-8", name)))?;
        self.fields.insert(name.to_string(), Value::String(value));
        Ok(())
    }

    fn push_file(&mut self, name: &str, file: UploadedFile) -> Result<(), AppError> {
        // Un input fichier vide est envoyé par le navigateur sans contenu
        if file.bytes.is_empty() {
            return Ok(());
        }

        let slot = match name {
            "home" => {
                self.uploads.home.push(file);
                return Ok(());
            }
            "validID" => &mut self.uploads.valid_id,
            "altValidID" => &mut self.uploads.alt_valid_id,
            other => return Err(AppError::Validation(format!("unexpected file field: {}", other))),
        };

        if slot.is_some() {
            return Err(AppError::Validation(format!("only one {} file is allowed", name)));
        }
        *slot = Some(file);
        Ok(())
    }

    fn into_parts(self) -> Result<(SubmissionForm, SubmissionUploads), AppError> {
        let form = serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| AppError::Validation(format!("invalid form fields: {}", e)))?;
        Ok((form, self.uploads))
    }
}

async fn read_field(field: &mut Field, total: &mut usize) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::Validation(format!("invalid multipart body: {}", e)))?;
        *total += chunk.len();
        if *total > MAX_BODY_BYTES {
            return Err(AppError::SizeLimit("request body is too large".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

async fn read_intake(mut payload: Multipart) -> Result<SubmissionIntake, AppError> {
    let mut intake = SubmissionIntake::default();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::Validation(format!("invalid multipart body: {}", e)))?;
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let bytes = read_field(&mut field, &mut total).await?;

        let is_file = file_name.is_some() || matches!(name.as_str(), "home" | "validID" | "altValidID");
        if is_file {
            intake.push_file(&name, UploadedFile { file_name, bytes })?;
        } else {
            intake.push_text(&name, bytes)?;
        }
    }

    Ok(intake)
}

/// POST /submissions - Nouvelle demande d'adoption (adoptant, multipart)
#[post("")]
pub async fn create_submission(
    auth_user: AuthUser,
    payload: Multipart,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    auth_user.require(AccountKind::Adopter)?;

    let (form, uploads) = read_intake(payload).await?.into_parts()?;
    let submission = SubmissionService::create_submission(db.get_ref(), auth_user.account_id, &form, uploads).await?;

    Ok(HttpResponse::Created().json(submission))
}

/// GET /submissions - Demandes du compte connecté (sans pièces jointes)
#[get("")]
pub async fn list_submissions(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let submissions = SubmissionService::list_for_account(db.get_ref(), auth_user.account_id, auth_user.kind).await?;

    Ok(HttpResponse::Ok().json(submissions))
}

/// GET /submissions/{id} - Une demande et ses pièces jointes
#[get("/{id}")]
pub async fn get_submission(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let detail = SubmissionService::find_with_photos(
        db.get_ref(),
        path.into_inner(),
        auth_user.account_id,
        auth_user.kind,
    )
        .await?;

    Ok(HttpResponse::Ok().json(detail))
}

pub fn submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/submissions")
            .service(create_submission)
            .service(list_submissions)
            .service(get_submission)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_adopter, seed_pet, seed_shelter, setup_db};
    use crate::utils::jwt;
    use actix_web::{App, http::StatusCode, test as atest};

    const BOUNDARY: &str = "----adoption-boundary";

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[test]
    fn test_intake_sorts_files_by_field_name() {
        let mut intake = SubmissionIntake::default();
        intake.push_file("home", file("a.jpg")).unwrap();
        intake.push_file("home", file("b.pdf")).unwrap();
        intake.push_file("validID", file("id.jpg")).unwrap();
        intake.push_text("altEmail", b"a@b.com".to_vec()).unwrap();

        let (form, uploads) = intake.into_parts().unwrap();
        assert_eq!(form.alt_email, "a@b.com");
        assert_eq!(uploads.home.len(), 2);
        assert!(uploads.valid_id.is_some());
        assert!(uploads.alt_valid_id.is_none());
    }

    #[test]
    fn test_intake_rejects_duplicate_id_and_unknown_file() {
        let mut intake = SubmissionIntake::default();
        intake.push_file("validID", file("id.jpg")).unwrap();

        assert!(matches!(intake.push_file("validID", file("again.jpg")), Err(AppError::Validation(_))));
        assert!(matches!(intake.push_file("resume", file("cv.pdf")), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_intake_skips_empty_file_inputs() {
        let mut intake = SubmissionIntake::default();
        intake
            .push_file("altValidID", UploadedFile { file_name: Some(String::new()), bytes: Vec::new() })
            .unwrap();

        let (_, uploads) = intake.into_parts().unwrap();
        assert!(uploads.alt_valid_id.is_none());
    }

    fn multipart_body(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in texts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                    .as_bytes(),
            );
        }
        for (name, file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                    .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn complete_fields(pet_id: &str, alt_email: &str) -> Vec<(&'static str, String)> {
        vec![
            ("petId", pet_id.to_string()),
            ("altFirstName", "Maria".to_string()),
            ("altLastName", "Santos".to_string()),
            ("relationship", "Sister".to_string()),
            ("altPhone", "09171234567".to_string()),
            ("altEmail", alt_email.to_string()),
            ("petType", "Dog".to_string()),
            ("idealPet", "Calm".to_string()),
            ("housingSituation", "Condo".to_string()),
            ("petsAtHome", "None".to_string()),
            ("allergies", "None".to_string()),
            ("familySupport", "Yes".to_string()),
            ("pastPets", "None".to_string()),
            ("interviewSetting", "Online".to_string()),
        ]
    }

    #[actix_web::test]
    async fn test_multipart_submission_end_to_end() {
        let db = setup_db().await;
        let shelter = seed_shelter(&db, "paws@example.com").await;
        let adopter = seed_adopter(&db, "ana@example.com").await;
        let pet = seed_pet(&db, shelter.id).await;
        let adopter_token = jwt::generate_token(adopter.id, &adopter.email, AccountKind::Adopter).unwrap();
        let shelter_token = jwt::generate_token(shelter.id, &shelter.email, AccountKind::Shelter).unwrap();

        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .configure(submission_routes)
        ).await;

        let fields = complete_fields(&pet.id.to_string(), "a@b.com");
        let texts: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = multipart_body(&texts, &[("home", "yard.jpg", &b"jpeg-bytes"[..]), ("validID", "id.jpg", &b"id-bytes"[..])]);
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");

        let req = atest::TestRequest::post()
            .uri("/submissions")
            .insert_header(("Authorization", format!("Bearer {}", adopter_token)))
            .insert_header(("Content-Type", content_type.clone()))
            .set_payload(body.clone())
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: serde_json::Value = atest::read_body_json(resp).await;
        assert_eq!(created["validID"], "id.jpg");
        assert_eq!(created["status"], "Pending");

        // Même formulaire: l'email alternatif est déjà pris
        let req = atest::TestRequest::post()
            .uri("/submissions")
            .insert_header(("Authorization", format!("Bearer {}", adopter_token)))
            .insert_header(("Content-Type", content_type.clone()))
            .set_payload(body.clone())
            .to_request();
        assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        // Un refuge ne peut pas déposer de demande
        let req = atest::TestRequest::post()
            .uri("/submissions")
            .insert_header(("Authorization", format!("Bearer {}", shelter_token)))
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        assert_eq!(atest::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        // Le refuge voit la demande qui lui est adressée
        let req = atest::TestRequest::get()
            .uri(&format!("/submissions/{}", created["id"]))
            .insert_header(("Authorization", format!("Bearer {}", shelter_token)))
            .to_request();
        let detail: serde_json::Value = atest::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["photos"].as_array().map(Vec::len), Some(2));

        let req = atest::TestRequest::get()
            .uri("/submissions")
            .insert_header(("Authorization", format!("Bearer {}", adopter_token)))
            .to_request();
        let mine: serde_json::Value = atest::call_and_read_body_json(&app, req).await;
        assert_eq!(mine.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let db = setup_db().await;
        let app = atest::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .configure(submission_routes)
        ).await;

        let req = atest::TestRequest::get().uri("/submissions").to_request();
        let resp = atest::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
