use crate::error::{FolioError, Result};
use crate::model::{FolderRecord, ItemRecord, RecordPatch, Scope, ROOT_ID};
use crate::owner::OwnerFilter;
use crate::store::{DataStore, RecordQuery};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

fn generate_id(prefix: char, now: DateTime<Utc>) -> String {
    let entropy = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, now.timestamp_millis(), &entropy[..6])
}

/// `f-<millis>-<6 chars>`
pub fn new_folder_id(now: DateTime<Utc>) -> String {
    generate_id('f', now)
}

/// `i-<millis>-<6 chars>`
pub fn new_item_id(now: DateTime<Utc>) -> String {
    generate_id('i', now)
}

/// Trims a user-supplied name and rejects blanks.
pub fn clean_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FolioError::missing_field("name"));
    }
    Ok(trimmed.to_string())
}

pub fn require_folder<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    id: &str,
) -> Result<FolderRecord> {
    store
        .find_folders(scope, owner, &RecordQuery::by_id(id))?
        .into_iter()
        .next()
        .ok_or_else(|| FolioError::NotFound("Folder".to_string()))
}

pub fn require_item<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    id: &str,
) -> Result<ItemRecord> {
    store
        .find_items(scope, owner, &RecordQuery::by_id(id))?
        .into_iter()
        .next()
        .ok_or_else(|| FolioError::NotFound("Item".to_string()))
}

/// Applies `patch` to one owned folder, or reports it missing.
pub fn patch_folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    id: &str,
    patch: &RecordPatch,
) -> Result<FolderRecord> {
    store
        .update_folder(scope, owner, id, patch)?
        .ok_or_else(|| FolioError::NotFound("Folder".to_string()))
}

pub fn patch_item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    id: &str,
    patch: &RecordPatch,
) -> Result<ItemRecord> {
    store
        .update_item(scope, owner, id, patch)?
        .ok_or_else(|| FolioError::NotFound("Item".to_string()))
}

/// The root always exists; any other parent must be a stored folder.
pub fn require_parent<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    parent_id: &str,
) -> Result<()> {
    if parent_id == ROOT_ID {
        return Ok(());
    }
    store
        .find_folders(scope, owner, &RecordQuery::by_id(parent_id))?
        .first()
        .map(|_| ())
        .ok_or_else(|| FolioError::NotFound("Parent folder".to_string()))
}

/// Breadth-first closure of `start` and every folder below it.
///
/// Each round asks for folders whose parent is in the frontier; the walk stops
/// when a round adds nothing new. Trashed folders are included. The visited set
/// also guards against corrupt parent cycles.
pub fn descendant_folder_ids<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    start: &str,
) -> Result<BTreeSet<String>> {
    let mut closure = BTreeSet::from([start.to_string()]);
    let mut frontier = closure.clone();

    while !frontier.is_empty() {
        let children = store.find_folders(scope, owner, &RecordQuery::children_of(frontier))?;
        frontier = children
            .into_iter()
            .map(|f| f.id)
            .filter(|id| !closure.contains(id))
            .collect();
        closure.extend(frontier.iter().cloned());
    }

    Ok(closure)
}
