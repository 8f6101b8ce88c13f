use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Author, FolderRecord, Scope};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::view::FolderView;
use chrono::Utc;
use tracing::info;

use super::helpers::{clean_name, new_folder_id, require_parent};

/// Creates an Adjacency Model folder under `parent_id` (the root when top-level).
pub fn run<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    parent_id: &str,
    name: &str,
    author: Author,
) -> Result<CmdResult> {
    let name = clean_name(name)?;
    require_parent(store, scope, owner, parent_id)?;

    let now = Utc::now();
    let record = FolderRecord {
        owner_id: owner.canonical(),
        id: new_folder_id(now),
        name,
        parent_id: parent_id.to_string(),
        scope,
        author,
        starred: false,
        trashed_at: None,
        created_at: now,
        updated_at: now,
    };
    let record = store.insert_folder(scope, record)?;
    info!(owner = owner.owner(), folder_id = %record.id, parent_id, "folder created");

    let mut result = CmdResult::default().with_folders(vec![FolderView::from(&record)]);
    result.add_message(CmdMessage::success(format!(
        "Folder created: {}",
        record.name
    )));
    Ok(result)
}
