//! Use-case services for books and user accounts.
//!
//! # Responsibility
//! - Orchestrate validation, hashing and repository calls per operation.
//! - Translate repository outcomes into the service error taxonomy.
//!
//! # Invariants
//! - Input guards (ids, blank terms, payload validation) run before any
//!   repository call.
//! - Services hold no record state; every call is independent.
//! - Check-then-act sequences are not atomic; store constraints and
//!   zero-row NotFound cover the race window.

use crate::credential::CredentialError;
use crate::repo::RepoError;
use crate::validation::ValidationError;
use thiserror::Error;

pub mod book_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure category, used by boundaries to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Auth,
    Internal,
}

/// Errors surfaced by book and user services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or out-of-bounds input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Referenced entity is absent.
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),
    /// Credential mismatch.
    #[error("{0}")]
    Auth(String),
    /// Storage or transport failure.
    #[error("storage failure: {0}")]
    Storage(#[source] RepoError),
    /// Hashing backend failure.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Storage(_) | Self::Credential(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, .. } => Self::NotFound(format!("{entity} not found")),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Storage(other),
        }
    }
}
