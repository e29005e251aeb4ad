//! End-to-end tests for the `bookshelf` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command bound to a database and log directory inside `dir`.
#[allow(deprecated)]
fn bookshelf(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env_remove("BOOKSHELF_DB")
        .env_remove("BOOKSHELF_LOG_DIR")
        .env_remove("BOOKSHELF_LOG_LEVEL")
        .arg("--db")
        .arg(dir.path().join("bookshelf.sqlite3"))
        .arg("--log-dir")
        .arg(dir.path().join("logs"));
    cmd
}

#[test]
fn add_then_get_book_from_same_database() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args(["books", "add", "--title", "Dune", "--author", "Frank Herbert"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": 201"))
        .stdout(predicate::str::contains("\"title\": \"Dune\""));

    bookshelf(&dir)
        .args(["books", "get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"author\": \"Frank Herbert\""));

    assert!(dir.path().join("logs").is_dir());
}

#[test]
fn update_with_unchanged_title_fails_unless_self_is_excluded() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args(["books", "add", "--title", "The Go Way", "--author", "A. Author"])
        .assert()
        .success();

    bookshelf(&dir)
        .args(["books", "update", "1", "--title", "The Go Way", "--author", "A. Author"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": 409"));

    bookshelf(&dir)
        .args([
            "--exclude-self-on-update",
            "books",
            "update",
            "1",
            "--title",
            "The Go Way",
            "--author",
            "B. Author",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("B. Author"));
}

#[test]
fn search_term_with_spaces_is_encoded() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args(["books", "add", "--title", "The Go Way", "--author", "A. Author"])
        .assert()
        .success();

    bookshelf(&dir)
        .args(["books", "search", "go way"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Go Way"));
}

#[test]
fn register_and_login_round_trip() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args([
            "users",
            "register",
            "--username",
            "ana",
            "--email",
            "ana@x.com",
            "--password",
            "secret1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"role\": \"user\""))
        .stdout(predicate::str::contains("\"password\": \"\""));

    bookshelf(&dir)
        .args(["users", "login", "ana@x.com", "--password", "secret1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"ana\""));

    bookshelf(&dir)
        .args(["users", "login", "ana", "--password", "wrong-pass"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": 401"));
}

#[test]
fn raw_request_reaches_router() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args(["request", "get", "/authors"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("route not found"));

    bookshelf(&dir)
        .args([
            "request",
            "POST",
            "/books",
            "--body",
            r#"{"title":"Rust in Action","author":"Tim McNamara"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": 201"));
}

#[test]
fn memory_database_starts_empty() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args(["--memory", "books", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"books\": []"));
}

#[test]
fn invalid_log_level_is_a_startup_error() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args(["--log-level", "loud", "books", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported log level"));
}

#[test]
fn get_user_encodes_identifier_into_path() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .args([
            "users",
            "register",
            "--username",
            "who?",
            "--email",
            "who@x.com",
            "--password",
            "secret1",
        ])
        .assert()
        .success();

    bookshelf(&dir)
        .args(["users", "get", "who?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"who?\""));
}
