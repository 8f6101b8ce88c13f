//! Client views over a [`LocalTree`]: which records a sidebar section shows, how a
//! search narrows them, how they sort, and the per-type counts shown on filter
//! chips.
//!
//! Everything here is a pure function of the cached tree; nothing touches the
//! store.

use crate::model::{ItemKind, Scope};
use crate::reconcile::LocalTree;
use crate::view::{FolderView, ItemView};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;

/// A sidebar section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Live local records; only the children of `folder` when one is open.
    All { folder: Option<String> },
    /// Everything trashed, both scopes.
    Trash,
    /// Starred and live, both scopes.
    Starred,
    /// Live records of one scope, optionally only one type.
    Scoped {
        scope: Scope,
        kind: Option<EntryKind>,
    },
}

/// Folder or one of the item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Folder,
    Item(ItemKind),
}

impl EntryKind {
    /// Display order: folders, then images, videos, text, files.
    fn rank(self) -> u8 {
        match self {
            EntryKind::Folder => 0,
            EntryKind::Item(ItemKind::Image) => 1,
            EntryKind::Item(ItemKind::Video) => 2,
            EntryKind::Item(ItemKind::Text) => 3,
            EntryKind::Item(ItemKind::File) => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    Folder(&'a FolderView),
    Item(&'a ItemView),
}

impl<'a> Entry<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            Entry::Folder(f) => &f.id,
            Entry::Item(i) => &i.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            Entry::Folder(f) => &f.name,
            Entry::Item(i) => i.label(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Folder(_) => EntryKind::Folder,
            Entry::Item(i) => EntryKind::Item(i.kind),
        }
    }

    fn created_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Folder(f) => f.created_at,
            Entry::Item(i) => i.created_at,
        }
    }

    fn trashed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Entry::Folder(f) => f.trashed_at,
            Entry::Item(i) => i.trashed_at,
        }
    }
}

/// Per-type tallies over a searched set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub all: usize,
    pub folder: usize,
    pub image: usize,
    pub video: usize,
    pub text: usize,
    pub file: usize,
}

pub fn section_entries<'a>(tree: &'a LocalTree, section: &Section) -> Vec<Entry<'a>> {
    let folders = tree.folders.iter();
    let items = tree.items.iter();

    match section {
        Section::Trash => folders
            .filter(|f| f.trashed_at.is_some())
            .map(Entry::Folder)
            .chain(items.filter(|i| i.trashed_at.is_some()).map(Entry::Item))
            .collect(),
        Section::Starred => folders
            .filter(|f| f.starred && f.trashed_at.is_none())
            .map(Entry::Folder)
            .chain(
                items
                    .filter(|i| i.starred && i.trashed_at.is_none())
                    .map(Entry::Item),
            )
            .collect(),
        Section::Scoped { scope, kind } => {
            let live_folders = folders.filter(|f| f.scope == *scope && f.trashed_at.is_none());
            let live_items = items.filter(|i| i.scope == *scope && i.trashed_at.is_none());
            match kind {
                None => live_folders
                    .map(Entry::Folder)
                    .chain(live_items.map(Entry::Item))
                    .collect(),
                Some(EntryKind::Folder) => live_folders.map(Entry::Folder).collect(),
                Some(EntryKind::Item(k)) => live_items
                    .filter(|i| i.kind == *k)
                    .map(Entry::Item)
                    .collect(),
            }
        }
        Section::All { folder } => {
            let in_view = |scope: Scope, trashed: bool, parent: &str| {
                scope == Scope::Local
                    && !trashed
                    && folder.as_deref().map_or(true, |open| open == parent)
            };
            folders
                .filter(|f| in_view(f.scope, f.trashed_at.is_some(), &f.parent_id))
                .map(Entry::Folder)
                .chain(
                    items
                        .filter(|i| in_view(i.scope, i.trashed_at.is_some(), &i.folder_id))
                        .map(Entry::Item),
                )
                .collect()
        }
    }
}

/// Case-insensitive substring match on the display name. A blank query keeps
/// everything.
pub fn search<'a>(entries: Vec<Entry<'a>>, query: &str) -> Vec<Entry<'a>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|e| e.name().to_lowercase().contains(&needle))
        .collect()
}

/// Type order first, then newest first. The trash orders by when a record was
/// trashed, falling back to creation time.
pub fn sort(entries: &mut [Entry<'_>], trash: bool) {
    entries.sort_by_key(|e| {
        let stamp = if trash {
            e.trashed_at().unwrap_or_else(|| e.created_at())
        } else {
            e.created_at()
        };
        (e.kind().rank(), Reverse(stamp))
    });
}

pub fn counts(entries: &[Entry<'_>]) -> Counts {
    let mut counts = Counts {
        all: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        match entry.kind() {
            EntryKind::Folder => counts.folder += 1,
            EntryKind::Item(ItemKind::Image) => counts.image += 1,
            EntryKind::Item(ItemKind::Video) => counts.video += 1,
            EntryKind::Item(ItemKind::Text) => counts.text += 1,
            EntryKind::Item(ItemKind::File) => counts.file += 1,
        }
    }
    counts
}

/// One rendered view: section, then search, then the type chip, then sort.
/// Counts are taken after search but before the type chip so every chip shows
/// its own total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseQuery {
    pub section: Section,
    pub search: String,
    pub kind: Option<EntryKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseView<'a> {
    pub entries: Vec<Entry<'a>>,
    pub counts: Counts,
}

pub fn browse<'a>(tree: &'a LocalTree, query: &BrowseQuery) -> BrowseView<'a> {
    let searched = search(section_entries(tree, &query.section), &query.search);
    let counts = counts(&searched);

    let mut entries: Vec<Entry<'a>> = match query.kind {
        Some(kind) => searched.into_iter().filter(|e| e.kind() == kind).collect(),
        None => searched,
    };
    sort(&mut entries, query.section == Section::Trash);

    BrowseView { entries, counts }
}
