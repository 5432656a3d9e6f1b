pub mod account_repository;
pub mod email;
pub mod password_reset;
pub mod submission_service;
pub mod submission_validator;
pub mod verification_store;
