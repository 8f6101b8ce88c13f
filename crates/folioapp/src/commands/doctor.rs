use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Scope;
use crate::store::DataStore;
use tracing::info;

/// Rewrites legacy numeric owner ids to their string form across one scope.
pub fn run<S: DataStore>(store: &mut S, scope: Scope) -> Result<CmdResult> {
    let report = store.doctor(scope)?;
    let mut result = CmdResult::default();

    if report.total() == 0 {
        result.add_message(CmdMessage::success(format!(
            "No legacy owner ids found in {} scope.",
            scope
        )));
        return Ok(result);
    }

    info!(%scope, fixed = report.total(), "normalized owner ids");
    result.add_message(CmdMessage::warning(format!(
        "Normalized legacy owner ids in {} scope:",
        scope
    )));
    for (count, what) in [
        (report.fixed_tree_owners, "tree document(s)"),
        (report.fixed_folder_owners, "folder(s)"),
        (report.fixed_item_owners, "item(s)"),
    ] {
        if count > 0 {
            result.add_message(CmdMessage::info(format!("  - {} {}", count, what)));
        }
    }
    Ok(result)
}
