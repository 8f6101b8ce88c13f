//! # Configuration
//!
//! Folio configuration is loaded with [`confique`] from layered TOML files and
//! environment variables.
//!
//! ## Layers
//!
//! Resolved in priority order:
//! 1. **Environment variables**: `FOLIO_DATA_DIR`, `FOLIO_LOG`, `FOLIO_SCOPE`.
//! 2. **Working directory**: `./folio.toml`.
//! 3. **User config**: `folio.toml` in the OS config directory (via `directories`).
//! 4. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! Missing files are skipped.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where the JSON collections live |
//! | `log_level` | `warn` | `trace`, `debug`, `info`, `warn` or `error` |
//! | `default_scope` | `local` | Scope used when a request names none |

use crate::error::{FolioError, Result};
use crate::model::Scope;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "folio.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "folio", "folio")
}

/// Configuration for folio, stored in `folio.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FolioConfig {
    /// Directory holding the collections. When absent, the OS data directory
    /// for folio is used.
    #[config(env = "FOLIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level. `RUST_LOG` takes precedence when set.
    #[config(default = "warn", env = "FOLIO_LOG")]
    pub log_level: String,

    /// Scope used when a request does not name one ("local" or "global").
    #[config(default = "local", env = "FOLIO_SCOPE")]
    pub default_scope: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "warn".to_string(),
            default_scope: "local".to_string(),
        }
    }
}

impl FolioConfig {
    /// Config files consulted from `cwd`, highest priority first.
    pub fn search_paths(cwd: &Path) -> Vec<PathBuf> {
        let mut paths = vec![cwd.join(CONFIG_FILE)];
        if let Some(dirs) = project_dirs() {
            paths.push(dirs.config_dir().join(CONFIG_FILE));
        }
        paths
    }

    /// Loads every layer: environment, then the files from [`Self::search_paths`].
    pub fn load(cwd: &Path) -> Result<Self> {
        Self::from_sources(&Self::search_paths(cwd), true)
    }

    /// Loads from the given files (highest priority first), optionally with the
    /// environment layered on top.
    pub fn from_sources(files: &[PathBuf], with_env: bool) -> Result<Self> {
        let mut builder = Self::builder();
        if with_env {
            builder = builder.env();
        }
        for file in files {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| FolioError::Config(e.to_string()))
    }

    pub fn scope(&self) -> Result<Scope> {
        self.default_scope.parse().map_err(FolioError::Config)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| FolioError::Config("Could not determine data directory".into())),
        }
    }

    /// A commented `folio.toml` listing every setting with its default.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }
}
