//! # Command Layer
//!
//! This module contains the **core business logic** of folio. Each command lives in
//! its own submodule and implements plain functions generic over [`DataStore`].
//!
//! ## Role and Responsibilities
//!
//! Commands are where the real work happens:
//! - Validate that targeted folders and items exist (not-found is decided here)
//! - Drive the pure [`crate::tree`] transforms and the store's record queries
//! - Return structured results carrying client views and messages
//! - Are completely UI-agnostic
//!
//! ## What Commands Do NOT Do
//!
//! - **Payload parsing**: `api` turns loose JSON into typed arguments first
//! - **Owner resolution**: callers hand in an already-resolved [`OwnerFilter`]
//! - **Rendering**: results are data; the CLI or the dispatch boundary decides how
//!   to present them
//!
//! ## Two Models
//!
//! [`tree`] serves the embedded Tree Model: every action reads the owner's
//! document, applies a pure transform, and writes it back under a version check.
//! The remaining modules serve the Adjacency Model, where each folder and item is
//! its own record.
//!
//! ## Testing Strategy
//!
//! Command tests use `InMemoryStore` and cover every branch, including not-found
//! and write failures.
//!
//! [`OwnerFilter`]: crate::owner::OwnerFilter

use crate::view::{FolderView, ItemView, Listing};
use serde::Serialize;

pub mod bulk;
pub mod create;
pub mod doctor;
pub mod helpers;
pub mod list;
pub mod migrate;
pub mod move_nodes;
pub mod purge;
pub mod rename;
pub mod restore;
pub mod star;
pub mod trash;
pub mod tree;
pub mod upsert;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// Folder and item tallies reported by bulk operations (purge, import).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordCounts {
    pub folders: usize,
    pub items: usize,
}

/// Result of an Adjacency Model command.
///
/// `folders` / `items` hold the records the command touched or listed, already
/// projected for the client.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub folders: Vec<FolderView>,
    pub items: Vec<ItemView>,
    pub counts: Option<RecordCounts>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_folders(mut self, folders: Vec<FolderView>) -> Self {
        self.folders = folders;
        self
    }

    pub fn with_items(mut self, items: Vec<ItemView>) -> Self {
        self.items = items;
        self
    }

    pub fn with_listing(self, listing: Listing) -> Self {
        self.with_folders(listing.folders).with_items(listing.items)
    }

    pub fn with_counts(mut self, counts: RecordCounts) -> Self {
        self.counts = Some(counts);
        self
    }
}
