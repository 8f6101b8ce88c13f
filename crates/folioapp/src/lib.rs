//! # Folio Architecture
//!
//! Folio is a **UI-agnostic namespace engine**: each owner gets a hierarchy of
//! folders holding leaf items (image, video, file, text), stored as JSON
//! documents. The library never assumes who is calling; the `folio` CLI and a
//! web route would both talk to it through the same dispatch.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (folio CLI, a web route, ...)                      │
//! │  - Build JSON requests, render responses                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Parses payloads into typed commands                      │
//! │  - Resolves the owner, maps errors to statuses              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Tree Model service and Adjacency Model operations        │
//! │  - Pure transforms live in tree.rs                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait over per-scope collections               │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Client-side state lives beside the stack rather than in it: [`reconcile`]
//! merges listing responses into a local cache and [`browse`] derives what a
//! sidebar section shows from that cache.
//!
//! ## Two Models
//!
//! - **Tree Model**: one document per owner holding the whole recursive tree.
//!   Every write is a read-modify-write guarded by a version number.
//! - **Adjacency Model**: one record per folder or item with a parent pointer.
//!   Supports trash, restore, star, move and cascading purge.
//!
//! `adjacencyImportTree` copies a Tree Model document into adjacency records.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never prints and never exits. Errors are
//! [`error::FolioError`] values; the API turns them into responses.
//!
//! ## Module Overview
//!
//! - [`api`]: Dispatch boundary and the `NamespaceApi` facade
//! - [`commands`]: Business logic for each operation
//! - [`tree`]: Pure transforms over the embedded folder tree
//! - [`store`]: Storage abstraction and implementations
//! - [`owner`]: Owner resolution and legacy owner-id matching
//! - [`model`], [`view`]: Stored records and their client projections
//! - [`reconcile`], [`browse`]: Client cache merge and view derivation
//! - [`config`], [`init`], [`logging`]: Process setup
//! - [`error`]: Error types

pub mod api;
pub mod browse;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod logging;
pub mod model;
pub mod owner;
pub mod reconcile;
pub mod store;
pub mod tree;
pub mod view;
