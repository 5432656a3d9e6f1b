//pour les réponses structurées
use serde::Serialize;

use crate::models::{adoption_submissions, submission_photos};

// 1 demande + ses pièces jointes
#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    pub submission: adoption_submissions::Model,
    pub photos: Vec<submission_photos::Model>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
