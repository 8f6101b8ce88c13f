//! Multi-select actions: trash, restore or purge a mixed set of folders and
//! items in one request.
//!
//! Every id runs through the matching single-record command, so the usual rules
//! hold (trash does not cascade, purge takes the subtree). Ids that are not
//! found are skipped and reported in a warning; any other failure stops the
//! batch. If nothing in the selection exists the whole request is not-found.

use crate::commands::{purge, restore, trash, CmdMessage, CmdResult, RecordCounts};
use crate::error::{FolioError, Result};
use crate::model::Scope;
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use std::collections::BTreeSet;
use tracing::info;

use super::helpers::descendant_folder_ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Trash,
    Restore,
    Purge,
}

impl BulkAction {
    fn folder<S: DataStore>(
        self,
        store: &mut S,
        scope: Scope,
        owner: &OwnerFilter,
        id: &str,
    ) -> Result<CmdResult> {
        match self {
            BulkAction::Trash => trash::folder(store, scope, owner, id),
            BulkAction::Restore => restore::folder(store, scope, owner, id),
            BulkAction::Purge => purge::folder(store, scope, owner, id),
        }
    }

    fn item<S: DataStore>(
        self,
        store: &mut S,
        scope: Scope,
        owner: &OwnerFilter,
        id: &str,
    ) -> Result<CmdResult> {
        match self {
            BulkAction::Trash => trash::item(store, scope, owner, id),
            BulkAction::Restore => restore::item(store, scope, owner, id),
            BulkAction::Purge => purge::item(store, scope, owner, id),
        }
    }
}

/// The ids picked by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub folder_ids: Vec<String>,
    pub item_ids: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.folder_ids.is_empty() && self.item_ids.is_empty()
    }
}

fn absorb(total: &mut CmdResult, part: CmdResult) {
    total.folders.extend(part.folders);
    total.items.extend(part.items);
    total.messages.extend(part.messages);
    if let Some(counts) = part.counts {
        let sum = total.counts.get_or_insert_with(RecordCounts::default);
        sum.folders += counts.folders;
        sum.items += counts.items;
    }
}

pub fn run<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    action: BulkAction,
    selection: &Selection,
) -> Result<CmdResult> {
    if selection.is_empty() {
        return Err(FolioError::Validation(
            "Missing folderIds or itemIds".to_string(),
        ));
    }

    let mut result = CmdResult::default();
    let mut missing = Vec::new();
    let mut handled = 0;

    // Items go first: a purged folder would otherwise take selected items
    // with it and they would read as missing.
    for id in &selection.item_ids {
        match action.item(store, scope, owner, id) {
            Ok(part) => {
                absorb(&mut result, part);
                handled += 1;
            }
            Err(FolioError::NotFound(_)) => missing.push(id.clone()),
            Err(e) => return Err(e),
        }
    }

    // Folders already removed as part of an earlier purge in this batch
    let mut purged = BTreeSet::new();
    for id in &selection.folder_ids {
        if purged.contains(id) {
            handled += 1;
            continue;
        }
        let closure = if action == BulkAction::Purge {
            descendant_folder_ids(store, scope, owner, id)?
        } else {
            BTreeSet::new()
        };
        match action.folder(store, scope, owner, id) {
            Ok(part) => {
                absorb(&mut result, part);
                purged.extend(closure);
                handled += 1;
            }
            Err(FolioError::NotFound(_)) => missing.push(id.clone()),
            Err(e) => return Err(e),
        }
    }

    if handled == 0 {
        return Err(FolioError::NotFound("Selection".to_string()));
    }
    if action == BulkAction::Purge {
        result.counts.get_or_insert_with(RecordCounts::default);
    }
    if !missing.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "Skipped missing: {}",
            missing.join(", ")
        )));
    }
    info!(
        owner = owner.owner(),
        ?action,
        handled,
        missing = missing.len(),
        "bulk action applied"
    );
    Ok(result)
}
