use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Scope;
use crate::owner::OwnerFilter;
use crate::store::{DataStore, RecordQuery};
use crate::view::Listing;
use tracing::debug;

/// Lists an owner's live records.
///
/// Shallow: the direct child folders of `parent_id` and the items filed in it.
/// Recursive: every live folder and item of the owner regardless of depth; the
/// caller rebuilds the hierarchy from `parentId` / `folderId`.
pub fn children<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    parent_id: &str,
    recursive: bool,
) -> Result<CmdResult> {
    let query = if recursive {
        RecordQuery::all().live()
    } else {
        RecordQuery::children_of([parent_id]).live()
    };

    let folders = store.find_folders(scope, owner, &query)?;
    let items = store.find_items(scope, owner, &query)?;
    debug!(
        owner = owner.owner(),
        parent_id,
        recursive,
        folders = folders.len(),
        items = items.len(),
        "listed children"
    );

    Ok(CmdResult::default().with_listing(Listing::from_records(&folders, &items)))
}

/// Every trashed folder and item of the owner, flat.
pub fn trash<S: DataStore>(store: &S, scope: Scope, owner: &OwnerFilter) -> Result<CmdResult> {
    let query = RecordQuery::all().trashed();
    let folders = store.find_folders(scope, owner, &query)?;
    let items = store.find_items(scope, owner, &query)?;

    let listing = Listing::from_records(&folders, &items);

    let mut result = CmdResult::default();
    if listing.is_empty() {
        result.add_message(CmdMessage::info("Trash is empty"));
    }
    Ok(result.with_listing(listing))
}
