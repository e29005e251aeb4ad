//! Transport-agnostic request boundary.
//!
//! # Responsibility
//! - Map `method + path` onto book and user service operations.
//! - Decode JSON bodies, wrap results in named envelopes and map service
//!   errors onto status codes.
//!
//! # Invariants
//! - Success bodies wrap the payload under one key (`book`, `books`, `user`,
//!   `users`, `results`, `exists`, `message`); failures are `{"error": ...}`.
//! - Internal failures are logged in full and answered with a redacted
//!   message.
//! - Log lines carry the route name, never path parameters or bodies.

use crate::credential::CredentialHasher;
use crate::model::book::NewBook;
use crate::model::user::{LoginRequest, NewUser, UserUpdate};
use crate::repo::book_repo::BookRepository;
use crate::repo::user_repo::UserRepository;
use crate::service::book_service::BookService;
use crate::service::user_service::UserService;
use crate::service::{ErrorKind, ServiceError};
use log::{error, info};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Request methods understood by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported method `{other}`")),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Decoded request: method, target (`/path?query`) and optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub target: String,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: STATUS_NO_CONTENT,
            body: None,
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }
}

enum ApiError {
    BadRequest(&'static str),
    RouteNotFound,
    MethodNotAllowed,
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

type HandlerResult = Result<ApiResponse, ApiError>;

/// Maps a service error kind onto its status code.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Validation => STATUS_BAD_REQUEST,
        ErrorKind::NotFound => STATUS_NOT_FOUND,
        ErrorKind::Conflict => STATUS_CONFLICT,
        ErrorKind::Auth => STATUS_UNAUTHORIZED,
        ErrorKind::Internal => STATUS_INTERNAL_ERROR,
    }
}

/// Router over one book service and one user service.
pub struct Api<'s, B, U, H>
where
    B: BookRepository,
    U: UserRepository,
    H: CredentialHasher,
{
    books: &'s BookService<B>,
    users: &'s UserService<U, H>,
}

impl<'s, B, U, H> Api<'s, B, U, H>
where
    B: BookRepository,
    U: UserRepository,
    H: CredentialHasher,
{
    pub fn new(books: &'s BookService<B>, users: &'s UserService<U, H>) -> Self {
        Self { books, users }
    }

    /// Routes one request and frames the outcome.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let started_at = Instant::now();
        let (path, query) = split_target(&request.target);
        let decoded = path_segments(path);
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
        let route = route_name(&segments);

        let response = match self.dispatch(request, &segments, query) {
            Ok(response) => response,
            Err(err) => error_response(err, route),
        };

        info!(
            "event=api_request module=api status={} method={} route={route} duration_ms={}",
            response.status,
            request.method,
            started_at.elapsed().as_millis()
        );
        response
    }

    fn dispatch(&self, request: &ApiRequest, segments: &[&str], query: &str) -> HandlerResult {
        let body = request.body.as_deref();
        match (request.method, segments) {
            (Method::Get, ["books"]) => {
                let books = self.books.get_all()?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "books": books })))
            }
            (Method::Post, ["books"]) => {
                let payload: NewBook = decode_body(body)?;
                let book = self.books.create(&payload)?;
                Ok(ApiResponse::json(STATUS_CREATED, json!({ "book": book })))
            }
            (Method::Get, ["books", "search"]) => {
                let results = self.books.search(&query_param(query, "q"))?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "results": results })))
            }
            (Method::Get, ["books", "exists", id]) => {
                let exists = self.books.exists(parse_id(id)?)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "exists": exists })))
            }
            (Method::Get, ["books", id]) => {
                let book = self.books.get_by_id(parse_id(id)?)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "book": book })))
            }
            (Method::Put, ["books", id]) => {
                let id = parse_id(id)?;
                let payload: NewBook = decode_body(body)?;
                let book = self.books.update(id, &payload)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "book": book })))
            }
            (Method::Delete, ["books", id]) => {
                self.books.delete(parse_id(id)?)?;
                Ok(ApiResponse::no_content())
            }
            (Method::Get, ["users"]) => {
                let users = self.users.get_all()?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "users": users })))
            }
            (Method::Post, ["users"]) => {
                let payload: NewUser = decode_body(body)?;
                let user = self.users.register(payload)?;
                Ok(ApiResponse::json(STATUS_CREATED, json!({ "user": user })))
            }
            (Method::Get, ["users", "search"]) => {
                let results = self.users.search(&query_param(query, "q"))?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "results": results })))
            }
            (Method::Get, ["users", "exists", id]) => {
                let exists = self.users.exists(parse_id(id)?)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "exists": exists })))
            }
            (Method::Post, ["users", "login"]) => {
                let payload: LoginRequest = decode_body(body)?;
                let user = self.users.login(&payload.identifier, &payload.password)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "user": user })))
            }
            (Method::Post, ["users", "logout"]) => {
                self.users.logout();
                Ok(ApiResponse::json(
                    STATUS_OK,
                    json!({ "message": "logged out" }),
                ))
            }
            (_, ["users", "login" | "logout"]) => Err(ApiError::MethodNotAllowed),
            (Method::Get, ["users", identifier]) => {
                let user = self.users.get_by_identifier(identifier)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "user": user })))
            }
            (Method::Put, ["users", id]) => {
                let id = parse_id(id)?;
                let payload: UserUpdate = decode_body(body)?;
                let user = self.users.update(id, payload)?;
                Ok(ApiResponse::json(STATUS_OK, json!({ "user": user })))
            }
            (Method::Delete, ["users", id]) => {
                self.users.delete(parse_id(id)?)?;
                Ok(ApiResponse::no_content())
            }
            _ if route_name(segments) != "unknown" => Err(ApiError::MethodNotAllowed),
            _ => Err(ApiError::RouteNotFound),
        }
    }
}

fn error_response(err: ApiError, route: &str) -> ApiResponse {
    match err {
        ApiError::BadRequest(message) => ApiResponse::error(STATUS_BAD_REQUEST, message),
        ApiError::RouteNotFound => ApiResponse::error(STATUS_NOT_FOUND, "route not found"),
        ApiError::MethodNotAllowed => {
            ApiResponse::error(STATUS_METHOD_NOT_ALLOWED, "method not allowed")
        }
        ApiError::Service(err) => {
            let status = status_for(err.kind());
            if err.kind() == ErrorKind::Internal {
                error!("event=api_request module=api status=error route={route} error={err}");
                ApiResponse::error(status, "internal server error")
            } else {
                ApiResponse::error(status, err.to_string())
            }
        }
    }
}

fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

/// Splits a path into percent-decoded, non-empty segments.
///
/// Decoding happens per segment, so an encoded `/` stays inside its segment.
fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect()
}

fn query_param(query: &str, name: &str) -> String {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("invalid id"))
}

fn decode_body<T: DeserializeOwned>(body: Option<&str>) -> Result<T, ApiError> {
    let raw = body.unwrap_or_default();
    serde_json::from_str(raw).map_err(|_| ApiError::BadRequest("invalid request body"))
}

/// Stable route label used for logging and method-mismatch detection.
fn route_name(segments: &[&str]) -> &'static str {
    match segments {
        ["books"] => "books.collection",
        ["books", "search"] => "books.search",
        ["books", "exists", _] => "books.exists",
        ["books", _] => "books.item",
        ["users"] => "users.collection",
        ["users", "search"] => "users.search",
        ["users", "exists", _] => "users.exists",
        ["users", "login"] => "users.login",
        ["users", "logout"] => "users.logout",
        ["users", _] => "users.item",
        _ => "unknown",
    }
}
