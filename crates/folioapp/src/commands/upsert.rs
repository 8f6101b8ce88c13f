use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{ItemInput, ItemRecord, Scope};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::view::ItemView;
use chrono::Utc;
use tracing::info;

use super::helpers::{new_item_id, require_parent};

/// Writes a leaf item into `folder_id`, keyed by `(owner, id)`.
///
/// A new id is generated when the input has none. `createdAt` is only set on
/// first insert; updates keep the original along with the star and trash state.
pub fn run<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    input: ItemInput,
) -> Result<CmdResult> {
    require_parent(store, scope, owner, folder_id)?;

    let now = Utc::now();
    let record = ItemRecord {
        owner_id: owner.canonical(),
        id: input.id.unwrap_or_else(|| new_item_id(now)),
        folder_id: folder_id.to_string(),
        kind: input.kind,
        name: input.name,
        url: input.url,
        file_name: input.file_name,
        content: input.content,
        scope,
        author: input.author,
        starred: false,
        trashed_at: None,
        created_at: now,
        updated_at: now,
    };
    let stored = store.upsert_item(scope, owner, record)?;
    info!(owner = owner.owner(), item_id = %stored.id, folder_id, kind = %stored.kind, "item written");

    let view = ItemView::from(&stored);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Saved: {}", view.label())));
    Ok(result.with_items(vec![view]))
}
