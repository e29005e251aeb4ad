//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, substring search and existence checks over `books`.
//!
//! # Invariants
//! - `get_by_id` reports absence as `Ok(None)`.
//! - Results are ordered by ascending id.
//! - Callers persist only validated payloads; this layer does not re-validate.

use crate::model::book::{Book, BookId, NewBook};
use crate::repo::{checked_id, contains_pattern, write_error, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const BOOK_SELECT_SQL: &str = "SELECT id, title, author FROM books";
const TITLE_TAKEN: &str = "a book with that title already exists";

/// Storage operations required by the book service.
#[cfg_attr(test, mockall::automock)]
pub trait BookRepository {
    fn get_all(&self) -> RepoResult<Vec<Book>>;
    /// Substring match on title or author.
    fn search_by_title_or_author(&self, term: &str) -> RepoResult<Vec<Book>>;
    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn exists(&self, id: BookId) -> RepoResult<bool>;
    /// Inserts the book and returns it with the store-assigned id.
    fn create(&self, book: &NewBook) -> RepoResult<Book>;
    fn update(&self, id: BookId, book: &NewBook) -> RepoResult<Book>;
    fn delete(&self, id: BookId) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_books(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Book>> {
        self.query_books(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"), params![])
    }

    fn search_by_title_or_author(&self, term: &str) -> RepoResult<Vec<Book>> {
        let pattern = contains_pattern(term);
        self.query_books(
            &format!(
                "{BOOK_SELECT_SQL}
                 WHERE title LIKE ?1 ESCAPE '\\' OR author LIKE ?1 ESCAPE '\\'
                 ORDER BY id ASC;"
            ),
            params![pattern],
        )
    }

    fn get_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn exists(&self, id: BookId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM books WHERE id = ?1;", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn create(&self, book: &NewBook) -> RepoResult<Book> {
        self.conn
            .execute(
                "INSERT INTO books (title, author) VALUES (?1, ?2);",
                params![book.title, book.author],
            )
            .map_err(|err| write_error(err, TITLE_TAKEN))?;

        let id = checked_id("book", self.conn.last_insert_rowid())?;
        Ok(book.clone().with_id(id))
    }

    fn update(&self, id: BookId, book: &NewBook) -> RepoResult<Book> {
        let changed = self
            .conn
            .execute(
                "UPDATE books SET title = ?1, author = ?2 WHERE id = ?3;",
                params![book.title, book.author, id],
            )
            .map_err(|err| write_error(err, TITLE_TAKEN))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "book", id });
        }
        Ok(book.clone().with_id(id))
    }

    fn delete(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "book", id });
        }
        Ok(())
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    Ok(Book {
        id: checked_id("book", row.get("id")?)?,
        title: row.get("title")?,
        author: row.get("author")?,
    })
}
