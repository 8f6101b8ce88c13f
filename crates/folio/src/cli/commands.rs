//! # CLI Layer
//!
//! The only place in folio that knows about stdout, stderr and exit codes.
//!
//! ## Responsibilities
//!
//! 1. **Argument parsing**: clap turns shell arguments into [`Commands`]
//! 2. **Context setup**: config, logging and the file-backed API
//! 3. **Request building**: every data command becomes a JSON action request
//!    sent through `NamespaceApi::dispatch`, the same path a web client uses
//! 4. **Output**: styled text via `render`, or the raw response with `--json`
//! 5. **Failure**: an unsuccessful response becomes an error, so the process
//!    exits with status 1
//!
//! `doctor` and `config` are maintenance commands and call the library directly.

use super::render::{render_messages, render_response};
use super::setup::{Cli, Commands, ConfigCommands};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use folioapp::api::Response;
use folioapp::config::FolioConfig;
use folioapp::init::build_context;
use folioapp::logging;
use folioapp::owner::RequestMeta;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = FolioConfig::load(&cwd)?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    logging::init(level);

    if let Commands::Config { action } = &cli.command {
        return handle_config(action.unwrap_or(ConfigCommands::Show), &config, &cwd);
    }

    let mut ctx = build_context(config, cli.global, cli.data_dir.clone())?;

    if let Commands::Doctor = &cli.command {
        let result = ctx.api.doctor(ctx.scope)?;
        let messages = serde_json::to_value(&result.messages)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&json!({ "messages": messages }))?);
        } else {
            print!("{}", render_messages(&messages));
        }
        return Ok(());
    }

    let payload = build_request(&cli)?;
    let response = ctx.api.dispatch(&payload, &request_meta());
    emit(&response, cli.json)
}

/// Stable metadata, so anonymous CLI use always lands in the same namespace.
fn request_meta() -> RequestMeta {
    RequestMeta::new(
        format!("folio-cli/{}", env!("CARGO_PKG_VERSION")),
        std::env::var("LANG").unwrap_or_default(),
    )
}

fn emit(response: &Response, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&response.to_value())?);
    } else if response.success {
        print!("{}", render_response(response));
    }
    if !response.success {
        let message = response.error.clone().unwrap_or_else(|| "Request failed".into());
        bail!(message);
    }
    Ok(())
}

fn action(name: &str, fields: Value) -> Map<String, Value> {
    let mut map = match fields {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert("action".into(), Value::String(name.into()));
    map
}

fn pick<'a>(item: bool, folder_action: &'a str, item_action: &'a str) -> &'a str {
    if item {
        item_action
    } else {
        folder_action
    }
}

fn target(item: bool, id: &str) -> Value {
    if item {
        json!({ "itemId": id })
    } else {
        json!({ "folderId": id })
    }
}

/// A single id uses the folder or item action; several ids become one
/// multi-select request.
fn one_or_many(
    ids: &[String],
    item: bool,
    [folder, single_item, many]: [&str; 3],
) -> Map<String, Value> {
    match ids {
        [id] => action(pick(item, folder, single_item), target(item, id)),
        _ => {
            let key = if item { "itemIds" } else { "folderIds" };
            let mut fields = Map::new();
            fields.insert(key.into(), json!(ids));
            action(many, Value::Object(fields))
        }
    }
}

/// Maps a subcommand to its action request. `--owner` fills in `ownerId`
/// unless the payload already names an owner.
pub fn build_request(cli: &Cli) -> Result<Value> {
    let mut request = match &cli.command {
        Commands::Dispatch { payload } => {
            let value: Value = serde_json::from_str(payload).context("payload is not valid JSON")?;
            match value {
                Value::Object(map) => map,
                _ => return Err(anyhow!("payload must be a JSON object")),
            }
        }
        Commands::Tree => action("read", json!({})),
        Commands::Mkdir { name, parent } => action(
            "adjacencyCreateFolder",
            json!({ "name": name, "parentId": parent }),
        ),
        Commands::Ls { parent, recursive } => action(
            "adjacencyListChildren",
            json!({ "parentId": parent, "recursive": recursive }),
        ),
        Commands::Put {
            content,
            folder,
            kind,
            id,
            name,
            url,
            file_name,
        } => action(
            "adjacencyUpsertItem",
            json!({
                "folderId": folder,
                "type": kind,
                "itemId": id,
                "name": name,
                "url": url,
                "fileName": file_name,
                "content": content,
            }),
        ),
        Commands::Rename { id, name, item } => {
            let mut fields = target(*item, id);
            fields["name"] = json!(name);
            action(
                pick(*item, "adjacencyRenameFolder", "adjacencyRenameItem"),
                fields,
            )
        }
        Commands::Mv {
            id,
            destination,
            item,
        } => {
            let fields = if *item {
                json!({ "itemId": id, "folderId": destination })
            } else {
                json!({ "folderId": id, "parentId": destination })
            };
            action(pick(*item, "adjacencyMoveFolder", "adjacencyMoveItem"), fields)
        }
        Commands::Trash { ids, item } => one_or_many(
            ids,
            *item,
            ["adjacencyTrashFolder", "adjacencyTrashItem", "adjacencyTrashMany"],
        ),
        Commands::Restore { ids, item } => one_or_many(
            ids,
            *item,
            ["adjacencyRestoreFolder", "adjacencyRestoreItem", "adjacencyRestoreMany"],
        ),
        Commands::Purge { ids, item } => one_or_many(
            ids,
            *item,
            ["adjacencyDeleteFolder", "adjacencyDeleteItem", "adjacencyDeleteMany"],
        ),
        Commands::TrashList => action("adjacencyListTrash", json!({})),
        Commands::Star { id, item, off } => {
            let mut fields = target(*item, id);
            fields["starred"] = json!(!off);
            action(pick(*item, "adjacencyStarFolder", "adjacencyStarItem"), fields)
        }
        Commands::ImportTree => action("adjacencyImportTree", json!({})),
        Commands::Doctor | Commands::Config { .. } => {
            bail!("this command does not send a request")
        }
    };

    // Explicit nulls would fail the payload's string fields
    request.retain(|_, v| !v.is_null());

    let names_owner = request.contains_key("ownerId") || request.contains_key("roomId");
    if let (Some(owner), false) = (&cli.owner, names_owner) {
        request.insert("ownerId".into(), Value::String(owner.clone()));
    }
    Ok(Value::Object(request))
}

fn handle_config(action: ConfigCommands, config: &FolioConfig, cwd: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let data_dir = config
                .data_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|e| format!("<{}>", e));
            println!("data_dir = {}", data_dir);
            println!("log_level = {}", config.log_level);
            println!("default_scope = {}", config.default_scope);
        }
        ConfigCommands::Template => print!("{}", FolioConfig::template()),
        ConfigCommands::Paths => {
            for path in FolioConfig::search_paths(cwd) {
                let marker = if path.exists() { "" } else { " (missing)" };
                println!("{}{}", path.display(), marker);
            }
        }
    }
    Ok(())
}
