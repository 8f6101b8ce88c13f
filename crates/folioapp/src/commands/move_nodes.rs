use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FolioError, Result};
use crate::model::{RecordPatch, Scope};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::view::{FolderView, ItemView};
use chrono::Utc;
use tracing::info;

use super::helpers::{
    descendant_folder_ids, patch_folder, patch_item, require_folder, require_item, require_parent,
};

/// Re-parents a folder. Moving into itself or any of its descendants would
/// detach the subtree from the root and is refused.
pub fn folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    destination: &str,
) -> Result<CmdResult> {
    let current = require_folder(store, scope, owner, folder_id)?;
    require_parent(store, scope, owner, destination)?;

    if current.parent_id == destination {
        let mut result = CmdResult::default().with_folders(vec![FolderView::from(&current)]);
        result.add_message(CmdMessage::info("Already there"));
        return Ok(result);
    }

    let subtree = descendant_folder_ids(store, scope, owner, folder_id)?;
    if subtree.contains(destination) {
        return Err(FolioError::Validation(
            "Cannot move a folder into itself or one of its subfolders".to_string(),
        ));
    }

    let record = patch_folder(
        store,
        scope,
        owner,
        folder_id,
        &RecordPatch::move_to(destination, Utc::now()),
    )?;
    info!(owner = owner.owner(), folder_id, destination, "folder moved");

    let mut result = CmdResult::default().with_folders(vec![FolderView::from(&record)]);
    result.add_message(CmdMessage::success(format!("Moved: {}", record.name)));
    Ok(result)
}

pub fn item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    item_id: &str,
    destination: &str,
) -> Result<CmdResult> {
    let current = require_item(store, scope, owner, item_id)?;
    require_parent(store, scope, owner, destination)?;

    if current.folder_id == destination {
        let mut result = CmdResult::default().with_items(vec![ItemView::from(&current)]);
        result.add_message(CmdMessage::info("Already there"));
        return Ok(result);
    }

    let record = patch_item(
        store,
        scope,
        owner,
        item_id,
        &RecordPatch::move_to(destination, Utc::now()),
    )?;
    info!(owner = owner.owner(), item_id, destination, "item moved");

    let view = ItemView::from(&record);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Moved: {}", view.label())));
    Ok(result.with_items(vec![view]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ROOT_ID;
    use crate::store::memory::fixtures::StoreFixture;

    fn sample() -> StoreFixture {
        StoreFixture::default()
            .with_folder("a", "A", ROOT_ID)
            .with_folder("b", "B", "a")
            .with_folder("c", "C", ROOT_ID)
            .with_text_item("i1", "a", "x")
    }

    #[test]
    fn moves_folder_between_parents() {
        let mut fx = sample();
        let owner = fx.filter();
        let res = folder(&mut fx.store, fx.scope, &owner, "b", "c").unwrap();
        assert_eq!(res.folders[0].parent_id, "c");

        let res = folder(&mut fx.store, fx.scope, &owner, "b", ROOT_ID).unwrap();
        assert_eq!(res.folders[0].parent_id, ROOT_ID);
    }

    #[test]
    fn refuses_move_into_descendant() {
        let mut fx = sample();
        let owner = fx.filter();
        assert!(matches!(
            folder(&mut fx.store, fx.scope, &owner, "a", "b"),
            Err(FolioError::Validation(_))
        ));
        assert!(matches!(
            folder(&mut fx.store, fx.scope, &owner, "a", "a"),
            Err(FolioError::Validation(_))
        ));
    }

    #[test]
    fn move_to_current_parent_is_noop() {
        let mut fx = sample();
        let owner = fx.filter();
        let res = folder(&mut fx.store, fx.scope, &owner, "b", "a").unwrap();
        assert_eq!(res.messages[0].content, "Already there");
    }

    #[test]
    fn moves_item_and_checks_destination() {
        let mut fx = sample();
        let owner = fx.filter();
        let res = item(&mut fx.store, fx.scope, &owner, "i1", "c").unwrap();
        assert_eq!(res.items[0].folder_id, "c");

        assert!(matches!(
            item(&mut fx.store, fx.scope, &owner, "i1", "ghost"),
            Err(FolioError::NotFound(_))
        ));
    }
}
