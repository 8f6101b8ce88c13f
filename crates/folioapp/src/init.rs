//! # Context Setup
//!
//! [`initialize`] turns the process environment into a ready-to-use
//! [`FolioContext`]: the loaded configuration, the resolved data directory, and
//! a [`NamespaceApi`] over a [`FileStore`] rooted there.
//!
//! ## Resolution
//!
//! 1. Configuration layers are loaded from `cwd` (see [`crate::config`]).
//! 2. The data directory is `data_override` when given, else the configured
//!    `data_dir`, else the OS data directory.
//! 3. The scope is `Global` when `use_global` is set, else the configured
//!    `default_scope`.

use crate::api::NamespaceApi;
use crate::config::FolioConfig;
use crate::error::Result;
use crate::model::Scope;
use crate::store::fs_backend::FileStore;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FolioContext {
    pub api: NamespaceApi<FileStore>,
    pub scope: Scope,
    pub config: FolioConfig,
    pub data_dir: PathBuf,
}

pub fn initialize(
    cwd: &Path,
    use_global: bool,
    data_override: Option<PathBuf>,
) -> Result<FolioContext> {
    let config = FolioConfig::load(cwd)?;
    build_context(config, use_global, data_override)
}

/// Same as [`initialize`] with an already-loaded configuration.
pub fn build_context(
    config: FolioConfig,
    use_global: bool,
    data_override: Option<PathBuf>,
) -> Result<FolioContext> {
    let data_dir = match data_override {
        Some(dir) => dir,
        None => config.data_dir()?,
    };
    let scope = if use_global {
        Scope::Global
    } else {
        config.scope()?
    };
    debug!(data_dir = %data_dir.display(), %scope, "context ready");

    let api = NamespaceApi::new(FileStore::open(data_dir.clone())).with_default_scope(scope);
    Ok(FolioContext {
        api,
        scope,
        config,
        data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_override_beats_config() {
        let dir = TempDir::new().unwrap();
        let config = FolioConfig {
            data_dir: Some(PathBuf::from("/nonexistent/folio")),
            ..Default::default()
        };
        let ctx = build_context(config, false, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(ctx.data_dir, dir.path());
        assert_eq!(ctx.scope, Scope::Local);
    }

    #[test]
    fn test_global_flag_forces_scope() {
        let dir = TempDir::new().unwrap();
        let ctx = build_context(
            FolioConfig::default(),
            true,
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        assert_eq!(ctx.scope, Scope::Global);
        assert_eq!(ctx.api.default_scope(), Scope::Global);
    }

    #[test]
    fn test_context_writes_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let mut ctx = build_context(
            FolioConfig::default(),
            false,
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        let res = ctx.api.dispatch(
            &json!({ "action": "createFolder", "ownerId": "u1", "name": "Docs" }),
            &Default::default(),
        );
        assert!(res.success);
        assert!(dir.path().join("local").join("trees.json").exists());
    }
}
