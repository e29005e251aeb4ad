//! Domain records for the book catalogue and user accounts.
//!
//! # Responsibility
//! - Define the canonical shapes shared by validation, services and storage.
//! - Separate input payloads (`NewBook`, `NewUser`, `UserUpdate`) from stored
//!   records that carry a store-assigned id.
//!
//! # Invariants
//! - Ids are assigned by the store and are positive once persisted.
//! - A `User` leaving the service layer never carries a password value.

pub mod book;
pub mod user;
