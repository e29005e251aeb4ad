//! Book use-case service.
//!
//! # Responsibility
//! - Guard ids and search terms, validate payloads, enforce title uniqueness
//!   on update and existence on delete.
//!
//! # Invariants
//! - Only trimmed, validated payloads reach the repository.
//! - With [`TitleConflictCheck::AnyMatch`] (the default) an update conflicts
//!   with every book the title search returns, including the book being
//!   updated. Keeping a title unchanged therefore conflicts with itself.

use crate::model::book::{Book, BookId, NewBook};
use crate::repo::book_repo::BookRepository;
use crate::service::{ServiceError, ServiceResult};
use crate::validation::{normalize_term, validate_book, validate_id};
use log::{info, warn};

const TITLE_CONFLICT: &str = "a book with that title already exists";

/// How `update` treats title-search hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleConflictCheck {
    /// Any hit conflicts, including the record being updated.
    #[default]
    AnyMatch,
    /// Hits on the record being updated are ignored.
    ExcludeSelf,
}

/// Book service facade over a repository implementation.
pub struct BookService<R: BookRepository> {
    repo: R,
    conflict_check: TitleConflictCheck,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            conflict_check: TitleConflictCheck::default(),
        }
    }

    /// Overrides the title conflict policy applied by `update`.
    pub fn with_conflict_check(mut self, conflict_check: TitleConflictCheck) -> Self {
        self.conflict_check = conflict_check;
        self
    }

    /// Lists all books in store order.
    pub fn get_all(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.repo.get_all()?)
    }

    /// Finds books whose title or author contains `term`.
    pub fn search(&self, term: &str) -> ServiceResult<Vec<Book>> {
        let term = normalize_term(term)?;
        Ok(self.repo.search_by_title_or_author(term)?)
    }

    pub fn get_by_id(&self, id: BookId) -> ServiceResult<Book> {
        validate_id(id)?;
        self.repo
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound("book not found".to_string()))
    }

    /// Reports whether a book exists; absence is not an error.
    pub fn exists(&self, id: BookId) -> ServiceResult<bool> {
        validate_id(id)?;
        Ok(self.repo.exists(id)?)
    }

    /// Validates and inserts a book, returning it with its assigned id.
    pub fn create(&self, book: &NewBook) -> ServiceResult<Book> {
        let normalized = validate_book(book)?;
        let created = self.repo.create(&normalized)?;
        info!(
            "event=book_create module=service status=ok book_id={}",
            created.id
        );
        Ok(created)
    }

    /// Replaces title and author of an existing book.
    ///
    /// # Contract
    /// - Title search runs on the normalized title and matches title or
    ///   author substrings, as the repository search does.
    /// - A book removed between the conflict check and the write yields
    ///   `NotFound`.
    pub fn update(&self, id: BookId, book: &NewBook) -> ServiceResult<Book> {
        validate_id(id)?;
        let normalized = validate_book(book)?;

        let hits = self.repo.search_by_title_or_author(&normalized.title)?;
        let conflicting = match self.conflict_check {
            TitleConflictCheck::AnyMatch => !hits.is_empty(),
            TitleConflictCheck::ExcludeSelf => hits.iter().any(|hit| hit.id != id),
        };
        if conflicting {
            warn!(
                "event=book_update module=service status=rejected reason=title_conflict book_id={id} hits={}",
                hits.len()
            );
            return Err(ServiceError::Conflict(TITLE_CONFLICT.to_string()));
        }

        let updated = self.repo.update(id, &normalized)?;
        info!("event=book_update module=service status=ok book_id={id}");
        Ok(updated)
    }

    /// Deletes a book after confirming it exists.
    pub fn delete(&self, id: BookId) -> ServiceResult<()> {
        validate_id(id)?;
        if !self.repo.exists(id)? {
            return Err(ServiceError::NotFound(
                "cannot delete: book does not exist".to_string(),
            ));
        }
        self.repo.delete(id)?;
        info!("event=book_delete module=service status=ok book_id={id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BookService, TitleConflictCheck};
    use crate::model::book::{Book, NewBook};
    use crate::repo::book_repo::MockBookRepository;
    use crate::repo::RepoError;
    use crate::service::{ErrorKind, ServiceError};
    use crate::validation::ValidationError;

    fn book(id: i64, title: &str, author: &str) -> Book {
        NewBook::new(title, author).with_id(id)
    }

    #[test]
    fn search_with_blank_term_makes_no_store_call() {
        let service = BookService::new(MockBookRepository::new());
        let err = service.search("   ").unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmptySearchTerm)
        ));
    }

    #[test]
    fn search_passes_trimmed_term() {
        let mut repo = MockBookRepository::new();
        repo.expect_search_by_title_or_author()
            .withf(|term| term == "Go")
            .times(1)
            .returning(|_| Ok(vec![book(1, "The Go Way", "A. Author")]));

        let results = BookService::new(repo).search("  Go ").unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn exists_with_negative_id_makes_no_store_call() {
        let service = BookService::new(MockBookRepository::new());
        let err = service.exists(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn get_by_id_maps_absent_row_to_not_found() {
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_id().times(1).returning(|_| Ok(None));

        let err = BookService::new(repo).get_by_id(9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn get_by_id_maps_storage_failure_to_internal() {
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_id()
            .times(1)
            .returning(|_| Err(RepoError::InvalidData("broken row".to_string())));

        let err = BookService::new(repo).get_by_id(9).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn create_persists_trimmed_payload() {
        let mut repo = MockBookRepository::new();
        repo.expect_create()
            .withf(|book| book.title == "The Go Way" && book.author == "A. Author")
            .times(1)
            .returning(|book| Ok(book.clone().with_id(1)));

        let created = BookService::new(repo)
            .create(&NewBook::new("  The Go Way ", " A. Author  "))
            .unwrap();
        assert_eq!(created, book(1, "The Go Way", "A. Author"));
    }

    #[test]
    fn create_rejects_invalid_payload_without_store_call() {
        let service = BookService::new(MockBookRepository::new());
        let err = service.create(&NewBook::new("Go", "A. Author")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn update_conflicts_with_itself_under_default_policy() {
        let mut repo = MockBookRepository::new();
        repo.expect_search_by_title_or_author()
            .times(1)
            .returning(|_| Ok(vec![book(1, "The Go Way", "A. Author")]));
        repo.expect_update().never();

        let err = BookService::new(repo)
            .update(1, &NewBook::new("The Go Way", "A. Author"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "a book with that title already exists");
    }

    #[test]
    fn update_excluding_self_only_conflicts_with_other_books() {
        let mut repo = MockBookRepository::new();
        repo.expect_search_by_title_or_author()
            .times(1)
            .returning(|_| Ok(vec![book(1, "The Go Way", "A. Author")]));
        repo.expect_update()
            .times(1)
            .returning(|id, book| Ok(book.clone().with_id(id)));

        let service = BookService::new(repo).with_conflict_check(TitleConflictCheck::ExcludeSelf);
        let updated = service
            .update(1, &NewBook::new("The Go Way", "Another Author"))
            .unwrap();
        assert_eq!(updated.author, "Another Author");

        let mut repo = MockBookRepository::new();
        repo.expect_search_by_title_or_author()
            .times(1)
            .returning(|_| Ok(vec![book(2, "The Go Way", "A. Author")]));
        let service = BookService::new(repo).with_conflict_check(TitleConflictCheck::ExcludeSelf);
        let err = service
            .update(1, &NewBook::new("The Go Way", "A. Author"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn update_rejects_non_positive_id_before_validation() {
        let service = BookService::new(MockBookRepository::new());
        let err = service.update(0, &NewBook::new("", "")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::NonPositiveId)
        ));
    }

    #[test]
    fn delete_missing_book_returns_not_found() {
        let mut repo = MockBookRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(false));
        repo.expect_delete().never();

        let err = BookService::new(repo).delete(42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn delete_existing_book_calls_store() {
        let mut repo = MockBookRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(true));
        repo.expect_delete().times(1).returning(|_| Ok(()));

        BookService::new(repo).delete(42).unwrap();
    }
}
