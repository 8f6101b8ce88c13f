//! # CLI Behavior
//!
//! This is **one possible client** for folio, not the application itself. It
//! talks to the library exactly the way a web route would: by building action
//! requests and dispatching them.
//!
//! For the overall architecture, see the `folioapp` crate documentation.
//!
//! ## Owners
//!
//! `--owner <id>` selects the namespace. Without it the CLI is an anonymous
//! caller whose fingerprint is derived from fixed request metadata, so repeated
//! runs on one machine share a namespace.
//!
//! ## Which Model
//!
//! Data subcommands (`mkdir`, `ls`, `put`, `trash`, ...) work on the Adjacency
//! Model. `tree` shows the embedded Tree Model and `import-tree` copies it over.
//! Anything else is reachable through `folio dispatch '<json>'`.
//!
//! ## Module Structure
//!
//! - `commands`: context setup, request building, exit behaviour
//! - `render`: response bodies to terminal text
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
