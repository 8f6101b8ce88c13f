//! # Folio CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/` and this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/folio/src/cli/)                          │
//! │  - clap parsing, request building, rendering                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  JSON action requests
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  folioapp::api::NamespaceApi::dispatch                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed request prints `Error: <message>` on stderr and exits with status 1.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
