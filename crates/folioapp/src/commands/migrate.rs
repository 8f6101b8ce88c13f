//! One-way migration from the Tree Model to the Adjacency Model.
//!
//! Every non-root node of the owner's tree becomes a [`FolderRecord`] with the
//! same id, name, and parent; every embedded item becomes an [`ItemRecord`]
//! filed under the node that held it. Records that already exist are updated in
//! place, so running the import twice changes nothing. The tree document is
//! left untouched.

use crate::commands::{CmdMessage, CmdResult, RecordCounts};
use crate::error::Result;
use crate::model::{FolderNode, FolderRecord, ItemRecord, RecordPatch, Scope, ROOT_ID};
use crate::owner::OwnerFilter;
use crate::store::{DataStore, RecordQuery};
use crate::tree;
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::info;

pub fn import_tree<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
) -> Result<CmdResult> {
    let Some(doc) = store.find_tree(scope, owner)? else {
        let mut result = CmdResult::default().with_counts(RecordCounts::default());
        result.add_message(CmdMessage::info("No tree to import"));
        return Ok(result);
    };

    let existing: BTreeSet<String> = store
        .find_folders(scope, owner, &RecordQuery::all())?
        .into_iter()
        .map(|f| f.id)
        .collect();

    let mut nodes: Vec<&FolderNode> = Vec::new();
    tree::walk(&doc.root, &mut |node| nodes.push(node));

    let now = Utc::now();
    let mut counts = RecordCounts::default();

    for node in &nodes {
        if node.is_root() {
            continue;
        }
        let parent = node.parent_id.clone().unwrap_or_else(|| ROOT_ID.to_string());
        if existing.contains(&node.id) {
            let patch = RecordPatch {
                name: Some(node.name.clone()),
                parent: Some(parent),
                ..Default::default()
            };
            store.update_folder(scope, owner, &node.id, &patch)?;
        } else {
            let created_at = node.created_at.unwrap_or(now);
            store.insert_folder(
                scope,
                FolderRecord {
                    owner_id: owner.canonical(),
                    id: node.id.clone(),
                    name: node.name.clone(),
                    parent_id: parent,
                    scope,
                    author: Default::default(),
                    starred: false,
                    trashed_at: None,
                    created_at,
                    updated_at: node.updated_at.unwrap_or(created_at),
                },
            )?;
        }
        counts.folders += 1;
    }

    for node in &nodes {
        for item in &node.items {
            store.upsert_item(
                scope,
                owner,
                ItemRecord {
                    owner_id: owner.canonical(),
                    id: item.id.clone(),
                    folder_id: node.id.clone(),
                    kind: item.kind,
                    name: item.name.clone(),
                    url: item.url.clone(),
                    file_name: item.file_name.clone(),
                    content: item.content.clone(),
                    scope,
                    author: item.author.clone(),
                    starred: false,
                    trashed_at: None,
                    created_at: item.updated_at,
                    updated_at: item.updated_at,
                },
            )?;
            counts.items += 1;
        }
    }

    info!(
        owner = owner.owner(),
        %scope,
        folders = counts.folders,
        items = counts.items,
        "tree imported"
    );
    let mut result = CmdResult::default().with_counts(counts);
    result.add_message(CmdMessage::success(format!(
        "Imported {} folder(s) and {} item(s)",
        counts.folders, counts.items
    )));
    Ok(result)
}
