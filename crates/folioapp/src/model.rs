//! # Domain Model
//!
//! Folio persists one namespace per owner in two shapes:
//!
//! - **Tree Model**: a single [`TreeDocument`] per owner holding the whole
//!   hierarchy as nested [`FolderNode`]s, with leaf [`Item`]s embedded in
//!   their folder.
//! - **Adjacency Model**: independent [`FolderRecord`]s and [`ItemRecord`]s,
//!   each pointing at its parent folder by id.
//!
//! Both shapes share the sentinel [`ROOT_ID`]: the root node of a tree, and the
//! default parent of any top-level record.
//!
//! ## Timestamps
//!
//! Timestamps are `DateTime<Utc>` in memory and epoch milliseconds on the wire,
//! matching the number format the browser client works with.
//!
//! ## Soft Delete
//!
//! A record with `trashed_at` set is in the trash: logically gone, physically
//! stored until purged. Clearing `trashed_at` restores it.

use crate::owner::OwnerValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ROOT_ID: &str = "root";

fn root_id() -> String {
    ROOT_ID.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Local,
    Global,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Scope::Local),
            "global" => Ok(Scope::Global),
            other => Err(format!("Unknown scope: {}", other)),
        }
    }
}

/// The four kinds of leaf item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Video,
    Image,
    File,
    Text,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Video => "video",
            ItemKind::Image => "image",
            ItemKind::File => "file",
            ItemKind::Text => "text",
        }
    }

    /// Derives the kind forced by an `update<Kind>` action name.
    ///
    /// `updateImage` -> `Image`. Any other action yields `None`.
    pub fn from_action(action: &str) -> Option<Self> {
        action
            .strip_prefix("update")
            .and_then(|rest| rest.to_lowercase().parse().ok())
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "video" => Ok(ItemKind::Video),
            "image" => Ok(ItemKind::Image),
            "file" => Ok(ItemKind::File),
            "text" => Ok(ItemKind::Text),
            other => Err(format!("Unknown item type: {}", other)),
        }
    }
}

/// Attribution copied onto records by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
}

/// A leaf item embedded in a tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub author: Author,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<FolderNode>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FolderNode {
    /// A fresh, empty root. Never persisted until the first mutation.
    pub fn root(now: DateTime<Utc>) -> Self {
        Self {
            id: root_id(),
            name: root_id(),
            parent_id: None,
            children: Vec::new(),
            items: Vec::new(),
            created_at: Some(now),
            updated_at: None,
        }
    }

    pub fn child(id: String, name: String, parent_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            parent_id: Some(parent_id),
            children: Vec::new(),
            items: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }
}

/// The per-owner Tree Model document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    pub owner_id: OwnerValue,
    pub root: FolderNode,
    /// Bumped on every write; writers must present the version they read.
    #[serde(default)]
    pub version: u64,
}

/// An Adjacency Model folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub owner_id: OwnerValue,
    pub id: String,
    pub name: String,
    #[serde(default = "root_id")]
    pub parent_id: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(flatten)]
    pub author: Author,
    #[serde(default)]
    pub starred: bool,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub trashed_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// An Adjacency Model leaf item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub owner_id: OwnerValue,
    pub id: String,
    #[serde(default = "root_id")]
    pub folder_id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(flatten)]
    pub author: Author,
    #[serde(default)]
    pub starred: bool,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub trashed_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields of an item write, shared by both models.
///
/// `id: None` asks the engine to generate one.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInput {
    pub id: Option<String>,
    pub kind: ItemKind,
    pub name: Option<String>,
    pub url: Option<String>,
    pub file_name: Option<String>,
    pub content: Option<String>,
    pub author: Author,
}

impl ItemInput {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            id: None,
            kind,
            name: None,
            url: None,
            file_name: None,
            content: None,
            author: Author::default(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(ItemKind::Text)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A `$set` / `$unset` style update for one adjacency record.
///
/// `None` leaves a field alone. `trashed_at: Some(None)` clears the trash mark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub parent: Option<String>,
    pub trashed_at: Option<Option<DateTime<Utc>>>,
    pub starred: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecordPatch {
    pub fn rename(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: Some(name.into()),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn move_to(parent: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            parent: Some(parent.into()),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn trash(now: DateTime<Utc>) -> Self {
        Self {
            trashed_at: Some(Some(now)),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn restore(now: DateTime<Utc>) -> Self {
        Self {
            trashed_at: Some(None),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn star(starred: bool, now: DateTime<Utc>) -> Self {
        Self {
            starred: Some(starred),
            updated_at: Some(now),
            ..Default::default()
        }
    }
}

/// Shared accessors over adjacency records, used by the store's query engine.
pub trait Record: Clone {
    fn id(&self) -> &str;
    fn owner(&self) -> &OwnerValue;
    fn owner_mut(&mut self) -> &mut OwnerValue;
    /// `parent_id` for folders, `folder_id` for items.
    fn parent(&self) -> &str;
    fn trashed_at(&self) -> Option<DateTime<Utc>>;
    fn apply(&mut self, patch: &RecordPatch);

    fn is_trashed(&self) -> bool {
        self.trashed_at().is_some()
    }
}

impl Record for FolderRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner(&self) -> &OwnerValue {
        &self.owner_id
    }
    fn owner_mut(&mut self) -> &mut OwnerValue {
        &mut self.owner_id
    }
    fn parent(&self) -> &str {
        &self.parent_id
    }
    fn trashed_at(&self) -> Option<DateTime<Utc>> {
        self.trashed_at
    }
    fn apply(&mut self, patch: &RecordPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(parent) = &patch.parent {
            self.parent_id = parent.clone();
        }
        if let Some(trashed_at) = patch.trashed_at {
            self.trashed_at = trashed_at;
        }
        if let Some(starred) = patch.starred {
            self.starred = starred;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
    }
}

impl Record for ItemRecord {
    fn id(&self) -> &str {
        &self.id
    }
    fn owner(&self) -> &OwnerValue {
        &self.owner_id
    }
    fn owner_mut(&mut self) -> &mut OwnerValue {
        &mut self.owner_id
    }
    fn parent(&self) -> &str {
        &self.folder_id
    }
    fn trashed_at(&self) -> Option<DateTime<Utc>> {
        self.trashed_at
    }
    fn apply(&mut self, patch: &RecordPatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(parent) = &patch.parent {
            self.folder_id = parent.clone();
        }
        if let Some(trashed_at) = patch.trashed_at {
            self.trashed_at = trashed_at;
        }
        if let Some(starred) = patch.starred {
            self.starred = starred;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = updated_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_action() {
        assert_eq!(ItemKind::from_action("updateImage"), Some(ItemKind::Image));
        assert_eq!(ItemKind::from_action("updateText"), Some(ItemKind::Text));
        assert_eq!(ItemKind::from_action("updateVideo"), Some(ItemKind::Video));
        assert_eq!(ItemKind::from_action("updateFile"), Some(ItemKind::File));
        assert_eq!(ItemKind::from_action("upsertItem"), None);
        assert_eq!(ItemKind::from_action("updateLink"), None);
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("local".parse::<Scope>().unwrap(), Scope::Local);
        assert_eq!("GLOBAL".parse::<Scope>().unwrap(), Scope::Global);
        assert!("shared".parse::<Scope>().is_err());
        assert_eq!(Scope::default(), Scope::Local);
    }

    #[test]
    fn test_folder_record_defaults_parent_to_root() {
        let json = r#"{"ownerId": 42, "id": "f1", "name": "Docs",
                       "createdAt": 1700000000000, "updatedAt": 1700000000000}"#;
        let record: FolderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.parent_id, ROOT_ID);
        assert_eq!(record.owner_id, OwnerValue::Number(42.0));
        assert_eq!(record.scope, Scope::Local);
        assert!(!record.is_trashed());
    }

    #[test]
    fn test_item_serializes_wire_shape() {
        let item = Item {
            id: "i1".into(),
            kind: ItemKind::Text,
            name: Some("note".into()),
            url: None,
            file_name: None,
            content: Some("hello".into()),
            author: Author::default(),
            updated_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["updatedAt"], 1_700_000_000_000i64);
        assert!(value.get("url").is_none());
    }

    #[test]
    fn test_patch_trash_and_restore() {
        let now = Utc::now();
        let json = r#"{"ownerId": "o", "id": "f1", "name": "Docs",
                       "createdAt": 1700000000000, "updatedAt": 1700000000000}"#;
        let mut record: FolderRecord = serde_json::from_str(json).unwrap();

        record.apply(&RecordPatch::trash(now));
        assert_eq!(record.trashed_at, Some(now));
        assert_eq!(record.name, "Docs");

        record.apply(&RecordPatch::restore(now));
        assert!(!record.is_trashed());

        record.apply(&RecordPatch::rename("Papers", now));
        assert_eq!(record.name, "Papers");
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_root_node_shape() {
        let root = FolderNode::root(Utc::now());
        assert!(root.is_root());
        assert_eq!(root.name, ROOT_ID);
        assert!(root.parent_id.is_none());
        assert!(root.children.is_empty());
    }
}
