use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{RecordPatch, Scope};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::view::{FolderView, ItemView};
use chrono::Utc;
use tracing::info;

use super::helpers::{patch_folder, patch_item};

fn verb(starred: bool) -> &'static str {
    if starred {
        "Starred"
    } else {
        "Unstarred"
    }
}

pub fn folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    starred: bool,
) -> Result<CmdResult> {
    let record = patch_folder(
        store,
        scope,
        owner,
        folder_id,
        &RecordPatch::star(starred, Utc::now()),
    )?;
    info!(owner = owner.owner(), folder_id, starred, "folder star set");

    let mut result = CmdResult::default().with_folders(vec![FolderView::from(&record)]);
    result.add_message(CmdMessage::success(format!("{}: {}", verb(starred), record.name)));
    Ok(result)
}

pub fn item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    item_id: &str,
    starred: bool,
) -> Result<CmdResult> {
    let record = patch_item(
        store,
        scope,
        owner,
        item_id,
        &RecordPatch::star(starred, Utc::now()),
    )?;
    info!(owner = owner.owner(), item_id, starred, "item star set");

    let view = ItemView::from(&record);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("{}: {}", verb(starred), view.label())));
    Ok(result.with_items(vec![view]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ROOT_ID;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn star_and_unstar() {
        let mut fx = StoreFixture::default()
            .with_folder("f1", "Docs", ROOT_ID)
            .with_text_item("i1", "f1", "x");
        let owner = fx.filter();

        assert!(folder(&mut fx.store, fx.scope, &owner, "f1", true).unwrap().folders[0].starred);
        assert!(!folder(&mut fx.store, fx.scope, &owner, "f1", false).unwrap().folders[0].starred);

        let res = item(&mut fx.store, fx.scope, &owner, "i1", true).unwrap();
        assert!(res.items[0].starred);
        assert!(res.messages[0].content.starts_with("Starred"));
    }
}
