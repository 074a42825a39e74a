//! Admin command handlers
//!
//! Each handler runs one store operation and renders its outcome as JSON.
//! Failures render as `{"status": <code>, "error": <message>}`.

use log::info;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs::File;
use std::io;

use crate::commands::parser::{Command, CommandResult, CommandStatus, USAGE};
use crate::error::StoreError;
use crate::error::handlers::{handle_error, status_code};
use crate::service::ContentStore;

/// Run a parsed command against the store
pub async fn handle_command(store: &ContentStore, command: Command) -> CommandResult {
    info!("Running command {:?}", command);

    match command {
        Command::Provision(tenant_id) => handle_cmd_provision(store, &tenant_id).await,
        Command::Docs(tenant_id) => respond(store.list_documents(&tenant_id).await),
        Command::Read {
            tenant_id,
            filename,
        } => respond(store.read_document(&tenant_id, &filename).await),
        Command::Update {
            tenant_id,
            filename,
            json,
        } => handle_cmd_update(store, &tenant_id, &filename, &json).await,
        Command::Upload {
            tenant_id,
            filename,
            source,
        } => handle_cmd_upload(store, &tenant_id, &filename, &source).await,
        Command::Images(tenant_id) => respond(store.list_images(&tenant_id).await),
        Command::RmImage {
            tenant_id,
            filename,
        } => respond(store.delete_image(&tenant_id, &filename).await),
        Command::Pair {
            tenant_id,
            base_name,
        } => respond(store.create_pair(&tenant_id, &base_name, None).await),
        Command::Unpair {
            tenant_id,
            base_name,
        } => respond(store.delete_pair(&tenant_id, &base_name).await),
        Command::Sweep => respond(store.sweep_temp_files().await),
        Command::Help => CommandResult {
            status: CommandStatus::Success,
            body: json!({ "usage": USAGE }),
        },
        Command::Unknown(raw) => CommandResult {
            status: CommandStatus::Failure(400),
            body: json!({
                "status": 400,
                "error": format!("Unknown command: {}", raw),
                "usage": USAGE,
            }),
        },
    }
}

fn success(body: Value) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        body,
    }
}

fn failure(err: &StoreError) -> CommandResult {
    handle_error(err);
    let code = status_code(err);
    CommandResult {
        status: CommandStatus::Failure(code),
        body: json!({ "status": code, "error": err.to_string() }),
    }
}

fn respond<T: Serialize>(result: Result<T, StoreError>) -> CommandResult {
    match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
        Ok(body) => success(body),
        Err(e) => failure(&e),
    }
}

async fn handle_cmd_provision(store: &ContentStore, tenant_id: &str) -> CommandResult {
    let outcome = match store.provision(tenant_id).await {
        Ok(outcome) => outcome,
        Err(e) => return failure(&e),
    };

    match serde_json::to_value(&outcome) {
        Ok(mut body) => {
            body["message"] = Value::String(outcome.message());
            success(body)
        }
        Err(e) => failure(&e.into()),
    }
}

async fn handle_cmd_update(
    store: &ContentStore,
    tenant_id: &str,
    filename: &str,
    raw_json: &str,
) -> CommandResult {
    let value: Value = match serde_json::from_str(raw_json) {
        Ok(value) => value,
        Err(e) => {
            return failure(&StoreError::InvalidContent(format!(
                "Invalid JSON format: {}",
                e
            )));
        }
    };

    respond(store.update_document(tenant_id, filename, value).await)
}

async fn handle_cmd_upload(
    store: &ContentStore,
    tenant_id: &str,
    filename: &str,
    source: &str,
) -> CommandResult {
    let file = match File::open(source) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return failure(&StoreError::NotFound(source.to_string()));
        }
        Err(e) => return failure(&StoreError::Io(e)),
    };

    respond(store.upload_image(tenant_id, filename, file).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::parser::parse_command;
    use crate::config::StoreConfig;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn store() -> (TempDir, ContentStore) {
        let dir = tempdir().expect("temp");
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).expect("templates");
        fs::write(templates.join("home.json"), b"{\"title\":\"Home\"}").expect("home");
        let store = ContentStore::new(StoreConfig::for_roots(dir.path().join("stores"), &templates))
            .expect("store");
        (dir, store)
    }

    async fn run(store: &ContentStore, args: &[&str]) -> CommandResult {
        handle_command(store, parse_command(args)).await
    }

    #[tokio::test]
    async fn test_provision_then_list() {
        let (_dir, store) = store();

        let result = run(&store, &["PROVISION", "s1"]).await;
        assert!(result.is_success());
        assert_eq!(result.body["status"], "created");
        assert_eq!(result.body["url"], "http://localhost/s1");
        assert_eq!(result.body["message"], "Store initialized with 1 template files");

        let again = run(&store, &["PROVISION", "s1"]).await;
        assert_eq!(again.body["message"], "Store already exists");

        let docs = run(&store, &["DOCS", "s1"]).await;
        assert_eq!(docs.body["files"], json!(["home.json"]));
    }

    #[tokio::test]
    async fn test_update_and_read() {
        let (_dir, store) = store();
        run(&store, &["PROVISION", "s1"]).await;

        let bad = run(&store, &["UPDATE", "s1", "home.json", "{oops"]).await;
        assert_eq!(bad.status, CommandStatus::Failure(400));

        let ok = run(&store, &["UPDATE", "s1", "home.json", "{\"title\":", "\"New\"}"]).await;
        assert!(ok.is_success());

        let read = run(&store, &["READ", "s1", "home.json"]).await;
        assert_eq!(read.body["title"], "New");
    }

    #[tokio::test]
    async fn test_failures_carry_status_codes() {
        let (_dir, store) = store();

        let missing = run(&store, &["DOCS", "ghost"]).await;
        assert_eq!(missing.status, CommandStatus::Failure(404));
        assert_eq!(missing.body["status"], 404);

        let traversal = run(&store, &["READ", "..", "home.json"]).await;
        assert_eq!(traversal.status, CommandStatus::Failure(400));

        let unknown = run(&store, &["FROB"]).await;
        assert_eq!(unknown.status, CommandStatus::Failure(400));

        let no_source = run(&store, &["UPLOAD", "s1", "a.png", "/definitely/not/here.png"]).await;
        assert_eq!(no_source.status, CommandStatus::Failure(404));
    }

    #[tokio::test]
    async fn test_pair_conflict_maps_to_409() {
        let (_dir, store) = store();
        run(&store, &["PROVISION", "s1"]).await;

        assert!(run(&store, &["PAIR", "s1", "hero"]).await.is_success());
        let conflict = run(&store, &["PAIR", "s1", "hero"]).await;
        assert_eq!(conflict.status, CommandStatus::Failure(409));

        let unpaired = run(&store, &["UNPAIR", "s1", "hero"]).await;
        assert_eq!(unpaired.body["deleted"], json!(["herolg.json", "herosm.json"]));
    }
}
