// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - shelters : Comptes refuges
//   - adopters : Comptes adoptants
//   - pets : Animaux proposés par les refuges (lecture seule ici)
//   - adoption_submissions : Demandes d'adoption
//   - submission_photos : Pièces jointes des demandes (base64)
//   - dto : Data Transfer Objects pour les réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les migrations vivent hors de ce dépôt
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod shelters;
pub mod adopters;
pub mod pets;
pub mod adoption_submissions;
pub mod submission_photos;
pub mod dto;
