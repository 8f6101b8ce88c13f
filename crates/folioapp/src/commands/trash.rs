//! Soft delete.
//!
//! Trashing marks exactly one record. It does **not** cascade: children of a
//! trashed folder stay live and keep showing up in recursive listings until the
//! folder is purged.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{RecordPatch, Scope};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::view::{FolderView, ItemView};
use chrono::Utc;
use tracing::info;

use super::helpers::{patch_folder, patch_item};

pub fn folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
) -> Result<CmdResult> {
    let record = patch_folder(store, scope, owner, folder_id, &RecordPatch::trash(Utc::now()))?;
    info!(owner = owner.owner(), folder_id, "folder trashed");

    let mut result = CmdResult::default().with_folders(vec![FolderView::from(&record)]);
    result.add_message(CmdMessage::success(format!(
        "Moved to trash: {}",
        record.name
    )));
    Ok(result)
}

pub fn item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    item_id: &str,
) -> Result<CmdResult> {
    let record = patch_item(store, scope, owner, item_id, &RecordPatch::trash(Utc::now()))?;
    info!(owner = owner.owner(), item_id, "item trashed");

    let view = ItemView::from(&record);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Moved to trash: {}", view.label())));
    Ok(result.with_items(vec![view]))
}
