//! Command-line front end.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the store.
//! - Translate subcommands into API requests and print the framed response.
//!
//! # Invariants
//! - Every command goes through `Api::handle`, so status codes and envelopes
//!   match the request boundary exactly.
//! - Exit status is non-zero whenever the response status is 400 or above.

mod config;

use anyhow::{Context, Result};
use bookshelf_core::db::{open_db, open_db_in_memory};
use bookshelf_core::{
    init_logging, Api, ApiRequest, ApiResponse, Argon2Hasher, BookService, Method,
    SqliteBookRepository, SqliteUserRepository, UserService,
};
use clap::{Parser, Subcommand};
use config::{AppConfig, DbLocation, GlobalArgs};
use log::info;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{json, Map, Value};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue with user accounts")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the book catalogue
    Books {
        #[command(subcommand)]
        action: BookCommand,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Send a raw request, e.g. `request GET /books/search?q=go`
    Request {
        method: Method,
        target: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum BookCommand {
    List,
    Search {
        term: String,
    },
    Get {
        id: i64,
    },
    Exists {
        id: i64,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
    },
    /// Replace title and author of a book
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    List,
    Search {
        term: String,
    },
    /// Look up a user by username or email
    Get {
        identifier: String,
    },
    Exists {
        id: i64,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Change only the given fields
    Update {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Delete {
        id: i64,
    },
    Login {
        identifier: String,
        #[arg(long)]
        password: String,
    },
    Logout,
}

impl Commands {
    fn into_request(self) -> ApiRequest {
        match self {
            Self::Books { action } => action.into_request(),
            Self::Users { action } => action.into_request(),
            Self::Request {
                method,
                target,
                body,
            } => {
                let request = ApiRequest::new(method, target);
                match body {
                    Some(body) => request.with_body(body),
                    None => request,
                }
            }
        }
    }
}

impl BookCommand {
    fn into_request(self) -> ApiRequest {
        match self {
            Self::List => ApiRequest::new(Method::Get, "/books"),
            Self::Search { term } => ApiRequest::new(Method::Get, search_target("books", &term)),
            Self::Get { id } => ApiRequest::new(Method::Get, format!("/books/{id}")),
            Self::Exists { id } => ApiRequest::new(Method::Get, format!("/books/exists/{id}")),
            Self::Add { title, author } => ApiRequest::new(Method::Post, "/books")
                .with_body(json!({ "title": title, "author": author }).to_string()),
            Self::Update { id, title, author } => {
                ApiRequest::new(Method::Put, format!("/books/{id}"))
                    .with_body(json!({ "title": title, "author": author }).to_string())
            }
            Self::Delete { id } => ApiRequest::new(Method::Delete, format!("/books/{id}")),
        }
    }
}

impl UserCommand {
    fn into_request(self) -> ApiRequest {
        match self {
            Self::List => ApiRequest::new(Method::Get, "/users"),
            Self::Search { term } => ApiRequest::new(Method::Get, search_target("users", &term)),
            Self::Get { identifier } => {
                let segment = utf8_percent_encode(&identifier, NON_ALPHANUMERIC);
                ApiRequest::new(Method::Get, format!("/users/{segment}"))
            }
            Self::Exists { id } => ApiRequest::new(Method::Get, format!("/users/exists/{id}")),
            Self::Register {
                username,
                email,
                password,
            } => ApiRequest::new(Method::Post, "/users").with_body(
                json!({ "username": username, "email": email, "password": password })
                    .to_string(),
            ),
            Self::Update {
                id,
                username,
                email,
                password,
            } => {
                let mut changes = Map::new();
                for (key, value) in [
                    ("username", username),
                    ("email", email),
                    ("password", password),
                ] {
                    if let Some(value) = value {
                        changes.insert(key.to_string(), Value::String(value));
                    }
                }
                ApiRequest::new(Method::Put, format!("/users/{id}"))
                    .with_body(Value::Object(changes).to_string())
            }
            Self::Delete { id } => ApiRequest::new(Method::Delete, format!("/users/{id}")),
            Self::Login {
                identifier,
                password,
            } => ApiRequest::new(Method::Post, "/users/login").with_body(
                json!({ "identifier": identifier, "password": password }).to_string(),
            ),
            Self::Logout => ApiRequest::new(Method::Post, "/users/logout"),
        }
    }
}

fn search_target(collection: &str, term: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", term)
        .finish();
    format!("/{collection}/search?{query}")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(status) if status < 400 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<u16> {
    let config = AppConfig::from_args(&cli.global)?;
    init_logging(&config.log_level, &config.log_dir).context("failed to initialize logging")?;

    let conn = match &config.db {
        DbLocation::Memory => open_db_in_memory(),
        DbLocation::File(path) => open_db(path),
    }
    .context("failed to open database")?;

    let books = BookService::new(SqliteBookRepository::new(&conn))
        .with_conflict_check(config.conflict_check);
    let users = UserService::new(SqliteUserRepository::new(&conn), Argon2Hasher::new());
    let api = Api::new(&books, &users);

    let request = cli.command.into_request();
    info!(
        "event=cli_command module=cli status=start method={}",
        request.method
    );
    let response = api.handle(&request);
    print_response(&response)?;
    Ok(response.status)
}

fn print_response(response: &ApiResponse) -> Result<()> {
    let framed = json!({
        "status": response.status,
        "body": response.body.clone().unwrap_or(Value::Null),
    });
    println!("{}", serde_json::to_string_pretty(&framed)?);
    Ok(())
}
