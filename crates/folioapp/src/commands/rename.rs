use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{RecordPatch, Scope};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::view::{FolderView, ItemView};
use chrono::Utc;
use tracing::info;

use super::helpers::{clean_name, patch_folder, patch_item};

pub fn folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    name: &str,
) -> Result<CmdResult> {
    let name = clean_name(name)?;
    let record = patch_folder(
        store,
        scope,
        owner,
        folder_id,
        &RecordPatch::rename(name, Utc::now()),
    )?;
    info!(owner = owner.owner(), folder_id, "folder renamed");

    let mut result = CmdResult::default().with_folders(vec![FolderView::from(&record)]);
    result.add_message(CmdMessage::success(format!(
        "Folder renamed: {}",
        record.name
    )));
    Ok(result)
}

pub fn item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    item_id: &str,
    name: &str,
) -> Result<CmdResult> {
    let name = clean_name(name)?;
    let record = patch_item(
        store,
        scope,
        owner,
        item_id,
        &RecordPatch::rename(name, Utc::now()),
    )?;
    info!(owner = owner.owner(), item_id, "item renamed");

    let view = ItemView::from(&record);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Item renamed: {}", view.label())));
    Ok(result.with_items(vec![view]))
}
