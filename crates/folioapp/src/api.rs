//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for every folio operation, whichever client is talking.
//!
//! ## Role and Responsibilities
//!
//! - **Parses** loose JSON payloads into a typed [`Request`] ([`Request::parse`])
//! - **Resolves** the caller's owner namespace (explicit id or anonymous fingerprint)
//! - **Dispatches** to the matching command function
//! - **Shapes** the result into a [`Response`] with an HTTP-like status
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **I/O**: no stdout, no files; the store is whatever `S` is
//! - **Presentation**: responses are JSON values, the CLI decides how to show them
//!
//! ## Payload
//!
//! ```json
//! { "action": "createFolder", "ownerId": "u1", "scope": "local",
//!   "parentId": "root", "name": "Docs" }
//! ```
//!
//! `roomId` is accepted in place of `ownerId`, and a numeric owner id is read as
//! its decimal text. A missing `scope` falls back to the facade's default.
//!
//! ## Response Bodies
//!
//! | action | body |
//! |---|---|
//! | `read` | `tree`, `folders`, `itemsMap` |
//! | `createFolder` | `folder`, `folders`, `itemsMap` |
//! | `renameFolder`, `deleteFolder` | `folders`, `itemsMap` |
//! | `listItems`, `deleteItem` | `items` |
//! | `upsertItem`, `update<Kind>` | `item`, `items` |
//! | `adjacency*` | `folders`, `items`, `counts`?, `messages` |
//!
//! Failures carry only `error`. Server-side causes are logged and reported as
//! "Server error".
//!
//! ## Generic Over DataStore
//!
//! `NamespaceApi<S: DataStore>` runs on `FileStore` in production and on
//! `InMemoryStore` in tests.

use crate::commands::bulk::{BulkAction, Selection};
use crate::commands::{self, tree::TreeSnapshot, CmdResult};
use crate::error::{FolioError, Result};
use crate::model::{Author, ItemInput, ItemKind, Scope, ROOT_ID};
use crate::owner::{resolve_owner, OwnerFilter, RequestMeta};
use crate::store::DataStore;
use crate::view::{items_map, ui_folders};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info_span, warn};

/// Embedded Tree Model actions.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeCommand {
    Read,
    CreateFolder {
        parent_id: String,
        name: String,
    },
    RenameFolder {
        folder_id: String,
        name: String,
    },
    DeleteFolder {
        folder_id: String,
    },
    ListItems {
        folder_id: String,
    },
    UpsertItem {
        folder_id: String,
        input: ItemInput,
    },
    DeleteItem {
        folder_id: String,
        item_id: String,
    },
}

/// Adjacency Model actions.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjacencyCommand {
    CreateFolder {
        parent_id: String,
        name: String,
        author: Author,
    },
    RenameFolder {
        folder_id: String,
        name: String,
    },
    RenameItem {
        item_id: String,
        name: String,
    },
    MoveFolder {
        folder_id: String,
        parent_id: String,
    },
    MoveItem {
        item_id: String,
        folder_id: String,
    },
    TrashFolder {
        folder_id: String,
    },
    TrashItem {
        item_id: String,
    },
    RestoreFolder {
        folder_id: String,
    },
    RestoreItem {
        item_id: String,
    },
    DeleteFolder {
        folder_id: String,
    },
    DeleteItem {
        item_id: String,
    },
    ListChildren {
        parent_id: String,
        recursive: bool,
    },
    ListTrash,
    UpsertItem {
        folder_id: String,
        input: ItemInput,
    },
    StarFolder {
        folder_id: String,
        starred: bool,
    },
    StarItem {
        item_id: String,
        starred: bool,
    },
    TrashMany {
        selection: Selection,
    },
    RestoreMany {
        selection: Selection,
    },
    DeleteMany {
        selection: Selection,
    },
    ImportTree,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tree(TreeCommand),
    Adjacency(AdjacencyCommand),
}

impl Command {
    /// The action name this command answers to, for logs.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Tree(cmd) => match cmd {
                TreeCommand::Read => "read",
                TreeCommand::CreateFolder { .. } => "createFolder",
                TreeCommand::RenameFolder { .. } => "renameFolder",
                TreeCommand::DeleteFolder { .. } => "deleteFolder",
                TreeCommand::ListItems { .. } => "listItems",
                TreeCommand::UpsertItem { .. } => "upsertItem",
                TreeCommand::DeleteItem { .. } => "deleteItem",
            },
            Command::Adjacency(cmd) => match cmd {
                AdjacencyCommand::CreateFolder { .. } => "adjacencyCreateFolder",
                AdjacencyCommand::RenameFolder { .. } => "adjacencyRenameFolder",
                AdjacencyCommand::RenameItem { .. } => "adjacencyRenameItem",
                AdjacencyCommand::MoveFolder { .. } => "adjacencyMoveFolder",
                AdjacencyCommand::MoveItem { .. } => "adjacencyMoveItem",
                AdjacencyCommand::TrashFolder { .. } => "adjacencyTrashFolder",
                AdjacencyCommand::TrashItem { .. } => "adjacencyTrashItem",
                AdjacencyCommand::RestoreFolder { .. } => "adjacencyRestoreFolder",
                AdjacencyCommand::RestoreItem { .. } => "adjacencyRestoreItem",
                AdjacencyCommand::DeleteFolder { .. } => "adjacencyDeleteFolder",
                AdjacencyCommand::DeleteItem { .. } => "adjacencyDeleteItem",
                AdjacencyCommand::ListChildren { .. } => "adjacencyListChildren",
                AdjacencyCommand::ListTrash => "adjacencyListTrash",
                AdjacencyCommand::UpsertItem { .. } => "adjacencyUpsertItem",
                AdjacencyCommand::StarFolder { .. } => "adjacencyStarFolder",
                AdjacencyCommand::StarItem { .. } => "adjacencyStarItem",
                AdjacencyCommand::TrashMany { .. } => "adjacencyTrashMany",
                AdjacencyCommand::RestoreMany { .. } => "adjacencyRestoreMany",
                AdjacencyCommand::DeleteMany { .. } => "adjacencyDeleteMany",
                AdjacencyCommand::ImportTree => "adjacencyImportTree",
            },
        }
    }
}

/// The loose wire payload, before any field is checked.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default, alias = "roomId")]
    owner_id: Option<Value>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    folder_id: Option<String>,
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    folder_ids: Option<Vec<String>>,
    #[serde(default)]
    item_ids: Option<Vec<String>>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    recursive: Option<bool>,
    #[serde(default)]
    starred: Option<bool>,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    author_avatar: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, field: &str) -> Result<String> {
    trimmed(value).ok_or_else(|| FolioError::missing_field(field))
}

/// Trimmed, non-blank ids in their original order.
fn id_list(values: &Option<Vec<String>>) -> Vec<String> {
    values
        .iter()
        .flatten()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

impl RawPayload {
    fn parent_or_root(&self) -> String {
        trimmed(&self.parent_id).unwrap_or_else(|| ROOT_ID.to_string())
    }

    /// `null` counts as absent; any other non-string, non-number owner id is
    /// rejected rather than silently treated as anonymous.
    fn owner(&self) -> Result<Option<String>> {
        match &self.owner_id {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(FolioError::Validation(
                "ownerId must be a string or a number".to_string(),
            )),
        }
    }

    fn selection(&self) -> Result<Selection> {
        let selection = Selection {
            folder_ids: id_list(&self.folder_ids),
            item_ids: id_list(&self.item_ids),
        };
        if selection.is_empty() {
            return Err(FolioError::missing_field("folderIds or itemIds"));
        }
        Ok(selection)
    }

    fn scope(&self, default: Scope) -> Result<Scope> {
        match trimmed(&self.scope) {
            Some(s) => s.parse().map_err(FolioError::Validation),
            None => Ok(default),
        }
    }

    fn author(&self) -> Author {
        Author {
            author_id: self.author_id.clone(),
            author_name: self.author_name.clone(),
            author_avatar: self.author_avatar.clone(),
        }
    }

    /// Builds the item write. The kind comes from `type` unless the action
    /// forces one (`updateImage` and friends). A blank `itemId` means "new".
    fn item_input(&self, forced: Option<ItemKind>) -> Result<ItemInput> {
        let kind = match forced {
            Some(kind) => kind,
            None => required(&self.kind, "type")?
                .parse()
                .map_err(FolioError::Validation)?,
        };
        Ok(ItemInput {
            id: trimmed(&self.item_id),
            kind,
            name: self.name.clone(),
            url: self.url.clone(),
            file_name: self.file_name.clone(),
            content: self.content.clone(),
            author: self.author(),
        })
    }

    fn command(&self, action: &str) -> Result<Command> {
        use AdjacencyCommand as A;
        use TreeCommand as T;

        let folder_id = || required(&self.folder_id, "folderId");
        let item_id = || required(&self.item_id, "itemId");
        let name = || required(&self.name, "name");
        let starred = self.starred.unwrap_or(true);

        let tree = |cmd: TreeCommand| -> Result<Command> { Ok(Command::Tree(cmd)) };
        let adjacency =
            |cmd: AdjacencyCommand| -> Result<Command> { Ok(Command::Adjacency(cmd)) };

        match action {
            "read" => tree(T::Read),
            "createFolder" => tree(T::CreateFolder {
                parent_id: self.parent_or_root(),
                name: name()?,
            }),
            "renameFolder" => tree(T::RenameFolder {
                folder_id: folder_id()?,
                name: name()?,
            }),
            "deleteFolder" => tree(T::DeleteFolder {
                folder_id: folder_id()?,
            }),
            "listItems" => tree(T::ListItems {
                folder_id: folder_id()?,
            }),
            "upsertItem" | "updateText" | "updateImage" | "updateVideo" | "updateFile" => {
                tree(T::UpsertItem {
                    folder_id: folder_id()?,
                    input: self.item_input(ItemKind::from_action(action))?,
                })
            }
            "deleteItem" => tree(T::DeleteItem {
                folder_id: folder_id()?,
                item_id: item_id()?,
            }),
            "adjacencyCreateFolder" => adjacency(A::CreateFolder {
                parent_id: self.parent_or_root(),
                name: name()?,
                author: self.author(),
            }),
            "adjacencyRenameFolder" => adjacency(A::RenameFolder {
                folder_id: folder_id()?,
                name: name()?,
            }),
            "adjacencyRenameItem" => adjacency(A::RenameItem {
                item_id: item_id()?,
                name: name()?,
            }),
            "adjacencyMoveFolder" => adjacency(A::MoveFolder {
                folder_id: folder_id()?,
                parent_id: required(&self.parent_id, "parentId")?,
            }),
            "adjacencyMoveItem" => adjacency(A::MoveItem {
                item_id: item_id()?,
                folder_id: folder_id()?,
            }),
            "adjacencyTrashFolder" => adjacency(A::TrashFolder {
                folder_id: folder_id()?,
            }),
            "adjacencyTrashItem" => adjacency(A::TrashItem { item_id: item_id()? }),
            "adjacencyRestoreFolder" => adjacency(A::RestoreFolder {
                folder_id: folder_id()?,
            }),
            "adjacencyRestoreItem" => adjacency(A::RestoreItem { item_id: item_id()? }),
            "adjacencyDeleteFolder" => adjacency(A::DeleteFolder {
                folder_id: folder_id()?,
            }),
            "adjacencyDeleteItem" => adjacency(A::DeleteItem { item_id: item_id()? }),
            "adjacencyListChildren" => adjacency(A::ListChildren {
                parent_id: self.parent_or_root(),
                recursive: self.recursive.unwrap_or(false),
            }),
            "adjacencyListTrash" => adjacency(A::ListTrash),
            "adjacencyUpsertItem" => adjacency(A::UpsertItem {
                folder_id: trimmed(&self.folder_id).unwrap_or_else(|| ROOT_ID.to_string()),
                input: self.item_input(None)?,
            }),
            "adjacencyStarFolder" => adjacency(A::StarFolder {
                folder_id: folder_id()?,
                starred,
            }),
            "adjacencyStarItem" => adjacency(A::StarItem {
                item_id: item_id()?,
                starred,
            }),
            "adjacencyTrashMany" => adjacency(A::TrashMany {
                selection: self.selection()?,
            }),
            "adjacencyRestoreMany" => adjacency(A::RestoreMany {
                selection: self.selection()?,
            }),
            "adjacencyDeleteMany" => adjacency(A::DeleteMany {
                selection: self.selection()?,
            }),
            "adjacencyImportTree" => adjacency(A::ImportTree),
            _ => Err(FolioError::Validation("Invalid action".to_string())),
        }
    }
}

/// A parsed, validated request. `owner` is still unresolved: `None` means the
/// caller is anonymous.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub command: Command,
    pub owner: Option<String>,
    pub scope: Scope,
}

impl Request {
    pub fn parse(payload: &Value, default_scope: Scope) -> Result<Self> {
        if !payload.is_object() {
            return Err(FolioError::Validation(
                "Request must be a JSON object".to_string(),
            ));
        }
        let raw: RawPayload = serde_json::from_value(payload.clone())
            .map_err(|e| FolioError::Validation(format!("Invalid request: {}", e)))?;
        let action = trimmed(&raw.action).ok_or_else(|| FolioError::missing_field("action"))?;

        Ok(Self {
            command: raw.command(&action)?,
            owner: raw.owner()?,
            scope: raw.scope(default_scope)?,
        })
    }
}

/// What `dispatch` hands back: `{ success, error?, ...body }`.
///
/// `status` mirrors the HTTP status a web route would answer with and is not
/// part of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip)]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Response {
    pub fn ok(body: Map<String, Value>) -> Self {
        Self {
            success: true,
            status: 200,
            error: None,
            body,
        }
    }

    pub fn failure(err: &FolioError) -> Self {
        Self {
            success: false,
            status: err.status(),
            error: Some(err.client_message()),
            body: Map::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut out = self.body.clone();
        out.insert("success".into(), Value::Bool(self.success));
        if let Some(err) = &self.error {
            out.insert("error".into(), Value::String(err.clone()));
        }
        Value::Object(out)
    }
}

fn body(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn outline(snapshot: &TreeSnapshot) -> Result<Map<String, Value>> {
    Ok(body(json!({
        "folders": serde_json::to_value(ui_folders(&snapshot.root))?,
        "itemsMap": serde_json::to_value(items_map(&snapshot.root))?,
    })))
}

fn adjacency_body(result: CmdResult) -> Result<Map<String, Value>> {
    let mut out = body(json!({
        "folders": serde_json::to_value(&result.folders)?,
        "items": serde_json::to_value(&result.items)?,
        "messages": serde_json::to_value(&result.messages)?,
    }));
    if let Some(counts) = result.counts {
        out.insert("counts".into(), serde_json::to_value(counts)?);
    }
    Ok(out)
}

/// The main API facade.
///
/// Generic over `DataStore` so the same dispatch runs over files or memory.
pub struct NamespaceApi<S: DataStore> {
    store: S,
    default_scope: Scope,
}

impl<S: DataStore> NamespaceApi<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_scope: Scope::Local,
        }
    }

    pub fn with_default_scope(mut self, scope: Scope) -> Self {
        self.default_scope = scope;
        self
    }

    pub fn default_scope(&self) -> Scope {
        self.default_scope
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parses, resolves the owner, runs the command. Never panics and never
    /// returns `Err`: every failure becomes a `success: false` response.
    pub fn dispatch(&mut self, payload: &Value, meta: &RequestMeta) -> Response {
        let request = match Request::parse(payload, self.default_scope) {
            Ok(request) => request,
            Err(e) => {
                warn!("rejected request: {}", e);
                return Response::failure(&e);
            }
        };

        let span = info_span!(
            "dispatch",
            action = request.command.action(),
            scope = %request.scope
        );
        let _guard = span.enter();

        let owner = OwnerFilter::new(&resolve_owner(request.owner.as_deref(), meta));
        match self.execute(&request.command, request.scope, &owner) {
            Ok(body) => Response::ok(body),
            Err(e) => {
                if e.status() >= 500 {
                    error!(owner = owner.owner(), "request failed: {}", e);
                } else {
                    debug!(owner = owner.owner(), "request refused: {}", e);
                }
                Response::failure(&e)
            }
        }
    }

    /// Runs an already-parsed command for a resolved owner and returns the
    /// response body.
    pub fn execute(
        &mut self,
        command: &Command,
        scope: Scope,
        owner: &OwnerFilter,
    ) -> Result<Map<String, Value>> {
        match command {
            Command::Tree(cmd) => self.execute_tree(cmd, scope, owner),
            Command::Adjacency(cmd) => {
                let result = self.execute_adjacency(cmd, scope, owner)?;
                adjacency_body(result)
            }
        }
    }

    fn execute_tree(
        &mut self,
        command: &TreeCommand,
        scope: Scope,
        owner: &OwnerFilter,
    ) -> Result<Map<String, Value>> {
        use commands::tree;
        let store = &mut self.store;

        match command {
            TreeCommand::Read => {
                let snapshot = tree::read(store, scope, owner)?;
                let mut out = outline(&snapshot)?;
                out.insert("tree".into(), serde_json::to_value(&snapshot)?);
                Ok(out)
            }
            TreeCommand::CreateFolder { parent_id, name } => {
                let (snapshot, folder) = tree::create_folder(store, scope, owner, parent_id, name)?;
                let mut out = outline(&snapshot)?;
                out.insert("folder".into(), serde_json::to_value(folder)?);
                Ok(out)
            }
            TreeCommand::RenameFolder { folder_id, name } => {
                outline(&tree::rename_folder(store, scope, owner, folder_id, name)?)
            }
            TreeCommand::DeleteFolder { folder_id } => {
                outline(&tree::delete_folder(store, scope, owner, folder_id)?)
            }
            TreeCommand::ListItems { folder_id } => {
                let items = tree::list_items(store, scope, owner, folder_id)?;
                Ok(body(json!({ "items": serde_json::to_value(items)? })))
            }
            TreeCommand::UpsertItem { folder_id, input } => {
                let (item, items) = tree::upsert_item(store, scope, owner, folder_id, input.clone())?;
                Ok(body(json!({
                    "item": serde_json::to_value(item)?,
                    "items": serde_json::to_value(items)?,
                })))
            }
            TreeCommand::DeleteItem { folder_id, item_id } => {
                let items = tree::delete_item(store, scope, owner, folder_id, item_id)?;
                Ok(body(json!({ "items": serde_json::to_value(items)? })))
            }
        }
    }

    fn execute_adjacency(
        &mut self,
        command: &AdjacencyCommand,
        scope: Scope,
        owner: &OwnerFilter,
    ) -> Result<CmdResult> {
        use commands::{
            bulk, create, list, migrate, move_nodes, purge, rename, restore, star, trash, upsert,
        };
        let store = &mut self.store;

        match command {
            AdjacencyCommand::CreateFolder {
                parent_id,
                name,
                author,
            } => create::run(store, scope, owner, parent_id, name, author.clone()),
            AdjacencyCommand::RenameFolder { folder_id, name } => {
                rename::folder(store, scope, owner, folder_id, name)
            }
            AdjacencyCommand::RenameItem { item_id, name } => {
                rename::item(store, scope, owner, item_id, name)
            }
            AdjacencyCommand::MoveFolder {
                folder_id,
                parent_id,
            } => move_nodes::folder(store, scope, owner, folder_id, parent_id),
            AdjacencyCommand::MoveItem { item_id, folder_id } => {
                move_nodes::item(store, scope, owner, item_id, folder_id)
            }
            AdjacencyCommand::TrashFolder { folder_id } => {
                trash::folder(store, scope, owner, folder_id)
            }
            AdjacencyCommand::TrashItem { item_id } => trash::item(store, scope, owner, item_id),
            AdjacencyCommand::RestoreFolder { folder_id } => {
                restore::folder(store, scope, owner, folder_id)
            }
            AdjacencyCommand::RestoreItem { item_id } => {
                restore::item(store, scope, owner, item_id)
            }
            AdjacencyCommand::DeleteFolder { folder_id } => {
                purge::folder(store, scope, owner, folder_id)
            }
            AdjacencyCommand::DeleteItem { item_id } => purge::item(store, scope, owner, item_id),
            AdjacencyCommand::ListChildren {
                parent_id,
                recursive,
            } => list::children(store, scope, owner, parent_id, *recursive),
            AdjacencyCommand::ListTrash => list::trash(store, scope, owner),
            AdjacencyCommand::UpsertItem { folder_id, input } => {
                upsert::run(store, scope, owner, folder_id, input.clone())
            }
            AdjacencyCommand::StarFolder { folder_id, starred } => {
                star::folder(store, scope, owner, folder_id, *starred)
            }
            AdjacencyCommand::StarItem { item_id, starred } => {
                star::item(store, scope, owner, item_id, *starred)
            }
            AdjacencyCommand::TrashMany { selection } => {
                bulk::run(store, scope, owner, BulkAction::Trash, selection)
            }
            AdjacencyCommand::RestoreMany { selection } => {
                bulk::run(store, scope, owner, BulkAction::Restore, selection)
            }
            AdjacencyCommand::DeleteMany { selection } => {
                bulk::run(store, scope, owner, BulkAction::Purge, selection)
            }
            AdjacencyCommand::ImportTree => migrate::import_tree(store, scope, owner),
        }
    }

    /// Store maintenance: rewrites legacy numeric owner ids in one scope.
    /// Not reachable through `dispatch`, since it spans all owners.
    pub fn doctor(&mut self, scope: Scope) -> Result<CmdResult> {
        commands::doctor::run(&mut self.store, scope)
    }
}
