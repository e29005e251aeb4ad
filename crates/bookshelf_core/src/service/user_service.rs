//! User account use-case service.
//!
//! # Responsibility
//! - Register, update, look up, delete and authenticate user accounts.
//! - Hash passwords before they reach the repository.
//!
//! # Invariants
//! - Every `User` returned from this service has an empty `password`.
//! - Registration forces `role = "user"` and checks only username collisions;
//!   email collisions are not checked.
//! - Plaintext passwords are zeroized once hashed or verified.
//! - Sessions are not tracked: `logout` is a no-op.

use crate::credential::CredentialHasher;
use crate::model::user::{NewUser, User, UserId, UserUpdate, DEFAULT_ROLE};
use crate::repo::user_repo::UserRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::{
    normalize_term, validate_id, validate_user, validate_user_update, ValidationError,
};
use log::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

const USERNAME_CONFLICT: &str = "a user with that username already exists";
const USER_NOT_FOUND: &str = "user not found";
const INCORRECT_PASSWORD: &str = "incorrect password";

/// User service facade over repository and hasher implementations.
pub struct UserService<R: UserRepository, H: CredentialHasher> {
    repo: R,
    hasher: H,
}

impl<R: UserRepository, H: CredentialHasher> UserService<R, H> {
    pub fn new(repo: R, hasher: H) -> Self {
        Self { repo, hasher }
    }

    pub fn get_all(&self) -> ServiceResult<Vec<User>> {
        Ok(strip_passwords(self.repo.get_all()?))
    }

    /// Finds users whose username or email contains `term`.
    pub fn search(&self, term: &str) -> ServiceResult<Vec<User>> {
        let term = normalize_term(term)?;
        Ok(strip_passwords(self.repo.search_by_user_or_email(term)?))
    }

    /// Looks up one user by exact username or email.
    pub fn get_by_identifier(&self, identifier: &str) -> ServiceResult<User> {
        let identifier = required(identifier, "identifier")?;
        self.repo
            .get_by_identifier(identifier)?
            .map(User::without_password)
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))
    }

    pub fn exists(&self, id: UserId) -> ServiceResult<bool> {
        validate_id(id)?;
        Ok(self.repo.exists(id)?)
    }

    /// Registers a new account.
    ///
    /// # Contract
    /// - Validation, the username collision check and hashing all complete
    ///   before the single repository write.
    /// - The collision lookup uses the username value against the identifier
    ///   lookup, so it also matches an existing email equal to that username.
    pub fn register(&self, mut user: NewUser) -> ServiceResult<User> {
        let validated = validate_user(&user);
        user.password.zeroize();
        let mut normalized = validated?;

        if self.repo.get_by_identifier(&normalized.username)?.is_some() {
            warn!("event=user_register module=service status=rejected reason=username_taken");
            normalized.password.zeroize();
            return Err(ServiceError::Conflict(USERNAME_CONFLICT.to_string()));
        }

        let plaintext = Zeroizing::new(std::mem::take(&mut normalized.password));
        normalized.password = self.hasher.hash(&plaintext)?;

        let created = self.repo.create(&normalized, DEFAULT_ROLE)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            created.id
        );
        Ok(created.without_password())
    }

    /// Applies a sparse update to an existing account.
    ///
    /// # Contract
    /// - Only fields present in `changes` are validated and written.
    /// - A present password is hashed before persistence.
    pub fn update(&self, id: UserId, mut changes: UserUpdate) -> ServiceResult<User> {
        let result = self.apply_update(id, &changes);
        if let Some(password) = changes.password.as_mut() {
            password.zeroize();
        }
        result
    }

    /// Checks credentials and returns the matching account.
    ///
    /// Both inputs are trimmed before use.
    pub fn login(&self, identifier: &str, password: &str) -> ServiceResult<User> {
        let identifier = required(identifier, "identifier")?;
        let password = required(password, "password")?;

        let Some(stored) = self.repo.get_by_identifier(identifier)? else {
            warn!("event=user_login module=service status=rejected reason=unknown_identifier");
            return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
        };

        if !self.hasher.verify(password, &stored.password)? {
            warn!(
                "event=user_login module=service status=rejected reason=incorrect_password user_id={}",
                stored.id
            );
            return Err(ServiceError::Auth(INCORRECT_PASSWORD.to_string()));
        }

        info!(
            "event=user_login module=service status=ok user_id={}",
            stored.id
        );
        Ok(stored.without_password())
    }

    /// Deletes an account after confirming it exists.
    pub fn delete(&self, id: UserId) -> ServiceResult<()> {
        validate_id(id)?;
        if !self.repo.exists(id)? {
            return Err(ServiceError::NotFound(
                "cannot delete: user does not exist".to_string(),
            ));
        }
        self.repo.delete(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    /// Ends a session. No session state exists, so this only logs.
    pub fn logout(&self) {
        debug!("event=user_logout module=service status=ok");
    }

    fn apply_update(&self, id: UserId, changes: &UserUpdate) -> ServiceResult<User> {
        validate_id(id)?;
        if !self.repo.exists(id)? {
            return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
        }

        let mut normalized = validate_user_update(changes)?;
        if let Some(plaintext) = normalized.password.take() {
            let plaintext = Zeroizing::new(plaintext);
            normalized.password = Some(self.hasher.hash(&plaintext)?);
        }

        let updated = self.repo.update(id, &normalized)?;
        info!("event=user_update module=service status=ok user_id={id}");
        Ok(updated.without_password())
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(trimmed)
}

fn strip_passwords(users: Vec<User>) -> Vec<User> {
    users.into_iter().map(User::without_password).collect()
}
