//! Field-level admission rules for books and users.
//!
//! # Responsibility
//! - Decide whether a payload is admissible before any store call.
//! - Return the normalized (trimmed) copy that callers must persist.
//!
//! # Invariants
//! - Validation is pure: inputs are never mutated.
//! - Checks run in a fixed order and the first failing check wins.
//! - Lengths are counted in characters, not bytes.

use crate::model::book::NewBook;
use crate::model::user::{NewUser, UserUpdate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const AUTHOR_MIN_CHARS: usize = 3;
pub const AUTHOR_MAX_CHARS: usize = 60;
pub const PASSWORD_MIN_CHARS: usize = 6;

// Letters, numbers, whitespace and `. , : ; ! ? - ' " ( ) ¿ ¡`.
static ALLOWED_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\p{L}\p{N}\s.,:;!?'"()¿¡-]*$"#).expect("valid allowed-text regex")
});

/// Rejection reason for malformed or out-of-bounds input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} is too short (minimum {min} characters)")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} is too long (maximum {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: &'static str },
    #[error("id must be positive")]
    NonPositiveId,
    #[error("search term must not be empty")]
    EmptySearchTerm,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a book payload and returns its trimmed copy.
pub fn validate_book(book: &NewBook) -> ValidationResult<NewBook> {
    let title = bounded_text("title", &book.title, TITLE_MIN_CHARS, TITLE_MAX_CHARS)?;
    let author = bounded_text("author", &book.author, AUTHOR_MIN_CHARS, AUTHOR_MAX_CHARS)?;
    Ok(NewBook { title, author })
}

/// Validates a registration payload and returns its normalized copy.
///
/// Username and email are trimmed; the password is kept verbatim. Email is
/// only checked for presence.
pub fn validate_user(user: &NewUser) -> ValidationResult<NewUser> {
    let username = user.username.trim();
    let email = user.email.trim();

    if username.is_empty() {
        return Err(ValidationError::Missing { field: "username" });
    }
    if email.is_empty() {
        return Err(ValidationError::Missing { field: "email" });
    }
    check_password(&user.password)?;
    check_charset("username", username)?;

    Ok(NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password: user.password.clone(),
    })
}

/// Validates only the fields present in a sparse update.
pub fn validate_user_update(update: &UserUpdate) -> ValidationResult<UserUpdate> {
    let username = match update.username.as_deref() {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::Missing { field: "username" });
            }
            check_charset("username", trimmed)?;
            Some(trimmed.to_string())
        }
        None => None,
    };

    let email = match update.email.as_deref() {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::Missing { field: "email" });
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    if let Some(password) = update.password.as_deref() {
        check_password(password)?;
    }

    Ok(UserUpdate {
        username,
        email,
        password: update.password.clone(),
    })
}

/// Rejects store-assigned ids that can never exist.
pub fn validate_id(id: i64) -> ValidationResult<i64> {
    if id <= 0 {
        return Err(ValidationError::NonPositiveId);
    }
    Ok(id)
}

/// Trims a search term or identifier and rejects blank input.
pub fn normalize_term(term: &str) -> ValidationResult<&str> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptySearchTerm);
    }
    Ok(trimmed)
}

/// Returns whether `text` only uses the restricted character set.
pub fn is_valid_text(text: &str) -> bool {
    ALLOWED_TEXT_RE.is_match(text)
}

fn bounded_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> ValidationResult<String> {
    let trimmed = raw.trim();
    let chars = trimmed.chars().count();

    if chars == 0 {
        return Err(ValidationError::Missing { field });
    }
    if chars < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if chars > max {
        return Err(ValidationError::TooLong { field, max });
    }
    check_charset(field, trimmed)?;

    Ok(trimmed.to_string())
}

fn check_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Missing { field: "password" });
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field: "password",
            min: PASSWORD_MIN_CHARS,
        });
    }
    Ok(())
}

fn check_charset(field: &'static str, value: &str) -> ValidationResult<()> {
    if !is_valid_text(value) {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Dune", "Frank Herbert")]
    #[case("  Cien años de soledad  ", "\tGabriel García Márquez\n")]
    #[case("¿Quién se ha llevado mi queso? (2a ed.)", "Spencer Johnson")]
    #[case("It's \"fine\": really!", "O'Brien-Smith")]
    #[case("1984", "George Orwell")]
    fn validate_book_accepts_allowed_text(#[case] title: &str, #[case] author: &str) {
        let normalized = validate_book(&NewBook::new(title, author)).unwrap();
        assert_eq!(normalized.title, title.trim());
        assert_eq!(normalized.author, author.trim());
    }

    #[rstest]
    #[case("", "Frank Herbert", ValidationError::Missing { field: "title" })]
    #[case("    ", "Frank Herbert", ValidationError::Missing { field: "title" })]
    #[case("Du", "Frank Herbert", ValidationError::TooShort { field: "title", min: 3 })]
    #[case("Dune #1", "Frank Herbert", ValidationError::InvalidCharacters { field: "title" })]
    #[case("Dune", "", ValidationError::Missing { field: "author" })]
    #[case("Dune", " FH ", ValidationError::TooShort { field: "author", min: 3 })]
    #[case("Dune", "Frank@Herbert", ValidationError::InvalidCharacters { field: "author" })]
    fn validate_book_rejects_bad_input(
        #[case] title: &str,
        #[case] author: &str,
        #[case] expected: ValidationError,
    ) {
        let err = validate_book(&NewBook::new(title, author)).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn validate_book_enforces_upper_bounds_in_characters() {
        let title_at_limit = "ñ".repeat(TITLE_MAX_CHARS);
        assert!(validate_book(&NewBook::new(title_at_limit.as_str(), "Author")).is_ok());

        let title_over = "a".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(
            validate_book(&NewBook::new(title_over, "Author")).unwrap_err(),
            ValidationError::TooLong {
                field: "title",
                max: TITLE_MAX_CHARS
            }
        );

        let author_over = "b".repeat(AUTHOR_MAX_CHARS + 1);
        assert_eq!(
            validate_book(&NewBook::new("Title", author_over)).unwrap_err(),
            ValidationError::TooLong {
                field: "author",
                max: AUTHOR_MAX_CHARS
            }
        );
    }

    #[test]
    fn validate_book_reports_title_before_author() {
        let err = validate_book(&NewBook::new("x", "")).unwrap_err();
        assert_eq!(err, ValidationError::TooShort { field: "title", min: 3 });
    }

    #[test]
    fn validate_book_does_not_mutate_input() {
        let input = NewBook::new("  Dune  ", " Frank Herbert ");
        let normalized = validate_book(&input).unwrap();
        assert_eq!(input.title, "  Dune  ");
        assert_eq!(normalized.title, "Dune");
    }

    #[test]
    fn validate_user_trims_identity_fields_but_not_password() {
        let normalized =
            validate_user(&NewUser::new("  ana ", " ana@x.com ", " secret1 ")).unwrap();
        assert_eq!(normalized.username, "ana");
        assert_eq!(normalized.email, "ana@x.com");
        assert_eq!(normalized.password, " secret1 ");
    }

    #[rstest]
    #[case(NewUser::new("", "ana@x.com", "secret1"), ValidationError::Missing { field: "username" })]
    #[case(NewUser::new("ana", "  ", "secret1"), ValidationError::Missing { field: "email" })]
    #[case(NewUser::new("ana", "ana@x.com", ""), ValidationError::Missing { field: "password" })]
    #[case(NewUser::new("ana", "ana@x.com", "12345"), ValidationError::TooShort { field: "password", min: 6 })]
    #[case(NewUser::new("ana_01", "ana@x.com", "secret1"), ValidationError::InvalidCharacters { field: "username" })]
    fn validate_user_rejects_bad_input(#[case] user: NewUser, #[case] expected: ValidationError) {
        assert_eq!(validate_user(&user).unwrap_err(), expected);
    }

    #[test]
    fn validate_user_does_not_check_email_charset() {
        assert!(validate_user(&NewUser::new("ana", "ana+tag@x.com", "secret1")).is_ok());
    }

    #[test]
    fn validate_user_update_skips_absent_fields() {
        let update = UserUpdate {
            email: Some(" new@x.com ".to_string()),
            ..UserUpdate::default()
        };
        let normalized = validate_user_update(&update).unwrap();
        assert_eq!(normalized.email.as_deref(), Some("new@x.com"));
        assert!(normalized.username.is_none());
        assert!(normalized.password.is_none());
    }

    #[test]
    fn validate_user_update_rejects_present_but_invalid_fields() {
        let blank_username = UserUpdate {
            username: Some("   ".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(
            validate_user_update(&blank_username).unwrap_err(),
            ValidationError::Missing { field: "username" }
        );

        let short_password = UserUpdate {
            password: Some("abc".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(
            validate_user_update(&short_password).unwrap_err(),
            ValidationError::TooShort {
                field: "password",
                min: PASSWORD_MIN_CHARS
            }
        );
    }

    #[test]
    fn validate_id_rejects_zero_and_negative() {
        assert_eq!(validate_id(0), Err(ValidationError::NonPositiveId));
        assert_eq!(validate_id(-1), Err(ValidationError::NonPositiveId));
        assert_eq!(validate_id(7), Ok(7));
    }

    #[test]
    fn normalize_term_trims_and_rejects_blank() {
        assert_eq!(normalize_term("  go  "), Ok("go"));
        assert_eq!(normalize_term(" \t "), Err(ValidationError::EmptySearchTerm));
    }
}
