// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve a config path against the current working directory.
pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}

/// The `MDS_CONFIG` override wins over the baked-in default; either way
/// the path must exist.
pub fn config_path_from_env(default: &str) -> Result<PathBuf> {
    let rel = std::env::var("MDS_CONFIG").unwrap_or_else(|_| default.to_string());
    resolve_config_path(&rel)
}
