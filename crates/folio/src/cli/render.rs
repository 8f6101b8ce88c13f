//! Turns dispatch responses into terminal text.
//!
//! The response body shape says what to draw: a `tree` becomes an indented
//! outline, an adjacency body becomes a flat listing followed by its messages.
//! Anything unrecognised is printed as pretty JSON.

use super::styles;
use folioapp::api::Response;
use folioapp::model::{FolderNode, Item};
use folioapp::view::{FolderView, ItemView, TreeItemView, UiFolder};
use serde_json::Value;

const INDENT: &str = "  ";

fn tree_item_label(item: &Item) -> &str {
    item.name
        .as_deref()
        .or(item.file_name.as_deref())
        .or(item.content.as_deref())
        .unwrap_or(&item.id)
}

fn push_node(node: &FolderNode, depth: usize, out: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    for item in &node.items {
        out.push(format!(
            "{}- {} {}  {}",
            indent,
            styles::kind().apply_to(format!("[{}]", item.kind)),
            styles::item().apply_to(tree_item_label(item)),
            styles::id().apply_to(&item.id)
        ));
    }
    for child in &node.children {
        out.push(format!(
            "{}{}  {}",
            indent,
            styles::folder().apply_to(format!("{}/", child.name)),
            styles::id().apply_to(&child.id)
        ));
        push_node(child, depth + 1, out);
    }
}

pub fn render_tree(root: &FolderNode) -> String {
    let mut lines = vec![styles::folder().apply_to("/").to_string()];
    push_node(root, 1, &mut lines);
    lines.join("\n") + "\n"
}

fn push_outline(folders: &[UiFolder], depth: usize, out: &mut Vec<String>) {
    for folder in folders {
        out.push(format!(
            "{}{}  {}",
            INDENT.repeat(depth),
            styles::folder().apply_to(format!("{}/", folder.name)),
            styles::id().apply_to(&folder.id)
        ));
        push_outline(&folder.children, depth + 1, out);
    }
}

fn folder_line(folder: &FolderView) -> String {
    let mut line = format!(
        "{}  {}",
        styles::folder().apply_to(format!("{}/", folder.name)),
        styles::id().apply_to(&folder.id)
    );
    if folder.starred {
        line.push_str(&format!(" {}", styles::starred().apply_to("*")));
    }
    if folder.trashed_at.is_some() {
        line.push_str(&format!(" {}", styles::trashed().apply_to("(trashed)")));
    }
    line
}

fn item_line(item: &ItemView) -> String {
    let mut line = format!(
        "{} {}  {}",
        styles::kind().apply_to(format!("[{}]", item.kind)),
        styles::item().apply_to(item.label()),
        styles::id().apply_to(&item.id)
    );
    if item.starred {
        line.push_str(&format!(" {}", styles::starred().apply_to("*")));
    }
    if item.trashed_at.is_some() {
        line.push_str(&format!(" {}", styles::trashed().apply_to("(trashed)")));
    }
    line
}

pub fn render_listing(folders: &[FolderView], items: &[ItemView]) -> String {
    let lines: Vec<String> = folders
        .iter()
        .map(folder_line)
        .chain(items.iter().map(item_line))
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    lines.join("\n") + "\n"
}

fn render_tree_items(items: &[TreeItemView]) -> String {
    if items.is_empty() {
        return format!("{}\n", styles::info().apply_to("No items."));
    }
    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            let label = item
                .name
                .as_deref()
                .or(item.file_name.as_deref())
                .or(item.content.as_deref())
                .unwrap_or(&item.id);
            format!(
                "{} {}  {}",
                styles::kind().apply_to(format!("[{}]", item.kind)),
                styles::item().apply_to(label),
                styles::id().apply_to(&item.id)
            )
        })
        .collect();
    lines.join("\n") + "\n"
}

/// Renders a `[{level, content}]` message array.
pub fn render_messages(messages: &Value) -> String {
    let Some(list) = messages.as_array() else {
        return String::new();
    };
    let mut out = String::new();
    for message in list {
        let content = message["content"].as_str().unwrap_or_default();
        let styled = match message["level"].as_str() {
            Some("success") => styles::success().apply_to(content),
            Some("warning") => styles::warning().apply_to(content),
            _ => styles::info().apply_to(content),
        };
        out.push_str(&format!("{}\n", styled));
    }
    out
}

fn parse<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    serde_json::from_value(value?.clone()).ok()
}

fn render_body(res: &Response) -> Option<String> {
    let body = &res.body;

    if let Some(tree) = body.get("tree") {
        let root: FolderNode = parse(tree.get("root"))?;
        return Some(render_tree(&root));
    }

    if let Some(messages) = body.get("messages") {
        let folders: Vec<FolderView> = parse(body.get("folders"))?;
        let items: Vec<ItemView> = parse(body.get("items"))?;
        return Some(render_listing(&folders, &items) + &render_messages(messages));
    }

    if let Some(folder) = body.get("folder") {
        let name = folder["name"].as_str().unwrap_or_default();
        let id = folder["id"].as_str().unwrap_or_default();
        return Some(format!(
            "{}  {}\n",
            styles::success().apply_to(format!("Folder created: {}", name)),
            styles::id().apply_to(id)
        ));
    }

    if let Some(item) = body.get("item") {
        let id = item["id"].as_str().unwrap_or_default();
        let kind = item["type"].as_str().unwrap_or_default();
        return Some(format!(
            "{}  {}\n",
            styles::success().apply_to(format!("Saved {} item", kind)),
            styles::id().apply_to(id)
        ));
    }

    if let Some(items) = body.get("items") {
        let items: Vec<TreeItemView> = parse(Some(items))?;
        return Some(render_tree_items(&items));
    }

    if body.contains_key("itemsMap") {
        let folders: Vec<UiFolder> = parse(body.get("folders"))?;
        let mut lines = vec![styles::folder().apply_to("/").to_string()];
        push_outline(&folders, 1, &mut lines);
        return Some(lines.join("\n") + "\n");
    }

    None
}

/// Human-readable rendering of a successful response.
pub fn render_response(res: &Response) -> String {
    render_body(res).unwrap_or_else(|| {
        serde_json::to_string_pretty(&res.to_value()).unwrap_or_default() + "\n"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn response(body: Value) -> Response {
        let Value::Object(map) = body else {
            panic!("body must be an object");
        };
        Response::ok(map)
    }

    fn plain(text: String) -> String {
        console::strip_ansi_codes(&text).to_string()
    }

    #[test]
    fn test_tree_outline_nests_children() {
        let res = response(json!({
            "tree": {
                "version": 3,
                "root": {
                    "id": "root",
                    "name": "root",
                    "children": [{
                        "id": "f-1",
                        "name": "Docs",
                        "parentId": "root",
                        "children": [],
                        "items": [{ "id": "i-1", "type": "text", "content": "hi", "updatedAt": 0 }]
                    }],
                    "items": []
                }
            },
            "folders": [],
            "itemsMap": {}
        }));
        let out = plain(render_response(&res));
        assert_eq!(out, "/\n  Docs/  f-1\n    - [text] hi  i-1\n");
    }

    #[test]
    fn test_adjacency_listing_with_messages() {
        let res = response(json!({
            "folders": [{
                "id": "f-1",
                "name": "Docs",
                "parentId": "root",
                "scope": "local",
                "starred": true,
                "createdAt": 0,
                "updatedAt": 0
            }],
            "items": [],
            "messages": [{ "level": "success", "content": "Folder created: Docs" }]
        }));
        let out = plain(render_response(&res));
        assert!(out.contains("Docs/  f-1 *"));
        assert!(out.ends_with("Folder created: Docs\n"));
    }

    #[test]
    fn test_trashed_item_is_marked() {
        let res = response(json!({
            "folders": [],
            "items": [{
                "id": "i-1",
                "folderId": "root",
                "type": "image",
                "name": "cat",
                "scope": "local",
                "trashedAt": 5,
                "createdAt": 0,
                "updatedAt": 0
            }],
            "messages": []
        }));
        let out = plain(render_response(&res));
        assert_eq!(out, "[image] cat  i-1 (trashed)\n");
    }

    #[test]
    fn test_unknown_body_falls_back_to_json() {
        let res = Response::ok(Map::new());
        let out = render_response(&res);
        assert!(out.contains("\"success\": true"));
    }

    #[test]
    fn test_empty_tree_items() {
        let res = response(json!({ "items": [] }));
        assert_eq!(plain(render_response(&res)), "No items.\n");
    }
}
