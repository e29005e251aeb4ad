//! Business rules and persistence for a small book catalogue with user
//! accounts.
//!
//! Services validate input and enforce uniqueness and existence before any
//! mutation; repositories hide SQLite behind two traits.

pub mod api;
pub mod credential;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use api::{Api, ApiRequest, ApiResponse, Method};
pub use credential::{Argon2Hasher, CredentialError, CredentialHasher};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{Book, BookId, NewBook};
pub use model::user::{LoginRequest, NewUser, User, UserId, UserUpdate, DEFAULT_ROLE};
pub use repo::book_repo::{BookRepository, SqliteBookRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::book_service::{BookService, TitleConflictCheck};
pub use service::user_service::UserService;
pub use service::{ErrorKind, ServiceError, ServiceResult};
pub use validation::{validate_book, validate_user, validate_user_update, ValidationError};
