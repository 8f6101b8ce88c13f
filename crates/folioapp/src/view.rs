//! Client-facing projections.
//!
//! Responses never carry full internal records: owner ids and other
//! server-authored fields are dropped here, and tree items are reshaped into
//! the `fileUrl` form the browser client renders.

use crate::model::{Author, FolderNode, FolderRecord, Item, ItemKind, ItemRecord, Scope};
use crate::tree;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    pub id: String,
    pub name: String,
    pub parent_id: String,
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

impl From<&FolderRecord> for FolderView {
    fn from(r: &FolderRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            parent_id: r.parent_id.clone(),
            scope: r.scope,
            author: r.author.clone(),
            starred: r.starred,
            trashed_at: r.trashed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
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

impl ItemView {
    /// Display name: the explicit name, else the file name, else the url.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.file_name.as_deref())
            .or(self.url.as_deref())
            .unwrap_or("Untitled")
    }
}

impl From<&ItemRecord> for ItemView {
    fn from(r: &ItemRecord) -> Self {
        Self {
            id: r.id.clone(),
            folder_id: r.folder_id.clone(),
            kind: r.kind,
            name: r.name.clone(),
            url: r.url.clone(),
            file_name: r.file_name.clone(),
            content: r.content.clone(),
            scope: r.scope,
            author: r.author.clone(),
            starred: r.starred,
            trashed_at: r.trashed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Flat folder/item listing returned by adjacency reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub folders: Vec<FolderView>,
    pub items: Vec<ItemView>,
}

impl Listing {
    pub fn from_records(folders: &[FolderRecord], items: &[ItemRecord]) -> Self {
        Self {
            folders: folders.iter().map(FolderView::from).collect(),
            items: items.iter().map(ItemView::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.items.is_empty()
    }
}

// --- Tree Model projections ---

/// Folder outline used by the sidebar: names and nesting only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiFolder {
    pub id: String,
    pub name: String,
    pub children: Vec<UiFolder>,
}

impl From<&FolderNode> for UiFolder {
    fn from(n: &FolderNode) -> Self {
        Self {
            id: n.id.clone(),
            name: n.name.clone(),
            children: n.children.iter().map(UiFolder::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItemView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl From<&Item> for TreeItemView {
    fn from(it: &Item) -> Self {
        Self {
            id: it.id.clone(),
            kind: it.kind,
            name: it.name.clone(),
            content: it.content.clone(),
            file_url: it.url.clone(),
            file_name: it.file_name.clone(),
        }
    }
}

pub fn item_views(node: &FolderNode) -> Vec<TreeItemView> {
    node.items.iter().map(TreeItemView::from).collect()
}

/// The outline under the root (the root itself is implicit in the UI).
pub fn ui_folders(root: &FolderNode) -> Vec<UiFolder> {
    root.children.iter().map(UiFolder::from).collect()
}

/// Node id -> items, for every node including the root.
pub fn items_map(root: &FolderNode) -> BTreeMap<String, Vec<TreeItemView>> {
    let mut acc = BTreeMap::new();
    tree::walk(root, &mut |node| {
        acc.insert(node.id.clone(), item_views(node));
    });
    acc
}

/// Minimal description of a newly created tree folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSummary {
    pub id: String,
    pub name: String,
    pub parent_id: String,
}
