//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, search and identifier lookup over `users`.
//!
//! # Invariants
//! - Returned records carry the stored credential hash in `password`; the
//!   service layer is responsible for clearing it.
//! - `get_by_identifier` matches username or email exactly and reports
//!   absence as `Ok(None)`.
//! - `update` applies only the fields present in the payload.

use crate::model::user::{NewUser, User, UserId, UserUpdate};
use crate::repo::{checked_id, contains_pattern, write_error, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, username, email, password, role FROM users";
const USERNAME_TAKEN: &str = "a user with that username already exists";

/// Storage operations required by the user service.
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository {
    fn get_all(&self) -> RepoResult<Vec<User>>;
    /// Substring match on username or email.
    fn search_by_user_or_email(&self, term: &str) -> RepoResult<Vec<User>>;
    /// Exact match on username or email.
    fn get_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>>;
    fn exists(&self, id: UserId) -> RepoResult<bool>;
    /// Inserts a user whose `password` is already hashed.
    fn create(&self, user: &NewUser, role: &str) -> RepoResult<User>;
    fn update(&self, id: UserId, changes: &UserUpdate) -> RepoResult<User>;
    fn delete(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_users(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn find_one(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<User>> {
        self.query_users(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"), params![])
    }

    fn search_by_user_or_email(&self, term: &str) -> RepoResult<Vec<User>> {
        let pattern = contains_pattern(term);
        self.query_users(
            &format!(
                "{USER_SELECT_SQL}
                 WHERE username LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\'
                 ORDER BY id ASC;"
            ),
            params![pattern],
        )
    }

    fn get_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>> {
        self.find_one(
            &format!(
                "{USER_SELECT_SQL}
                 WHERE username = ?1 OR email = ?1
                 ORDER BY id ASC
                 LIMIT 1;"
            ),
            params![identifier],
        )
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM users WHERE id = ?1;", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn create(&self, user: &NewUser, role: &str) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (username, email, password, role) VALUES (?1, ?2, ?3, ?4);",
                params![user.username, user.email, user.password, role],
            )
            .map_err(|err| write_error(err, USERNAME_TAKEN))?;

        Ok(User {
            id: checked_id("user", self.conn.last_insert_rowid())?,
            username: user.username.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            role: role.to_string(),
        })
    }

    fn update(&self, id: UserId, changes: &UserUpdate) -> RepoResult<User> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    username = COALESCE(?1, username),
                    email = COALESCE(?2, email),
                    password = COALESCE(?3, password)
                 WHERE id = ?4;",
                params![changes.username, changes.email, changes.password, id],
            )
            .map_err(|err| write_error(err, USERNAME_TAKEN))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        self.find_one(&format!("{USER_SELECT_SQL} WHERE id = ?1;"), params![id])?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }

    fn delete(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: checked_id("user", row.get("id")?)?,
        username: row.get("username")?,
        email: row.get("email")?,
        password: row.get("password")?,
        role: row.get("role")?,
    })
}
