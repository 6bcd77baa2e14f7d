//! Resolving the configured file (or pattern) to upload specs.

use crate::error::{ConfigError, ReleaseError, Result};
use std::path::{Path, PathBuf};

/// One local file to attach to the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    /// Local file
    pub path: PathBuf,
    /// Name of the asset on the release
    pub asset_name: String,
    /// Replace an existing asset with the same name
    pub overwrite: bool,
}

/// Expand `file` into upload specs
///
/// With `file_glob`, every match is uploaded under its base name (sorted, so
/// runs are reproducible) and `asset_name` is ignored. Otherwise `file` is
/// uploaded as `asset_name`, falling back to its base name.
pub fn resolve_assets(
    file: &str,
    asset_name: Option<&str>,
    file_glob: bool,
    overwrite: bool,
) -> Result<Vec<AssetSpec>> {
    if !file_glob {
        let path = PathBuf::from(file);
        let asset_name = match asset_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => base_name(&path)?,
        };
        return Ok(vec![AssetSpec {
            path,
            asset_name,
            overwrite,
        }]);
    }

    if asset_name.is_some_and(|name| !name.is_empty()) {
        log::warn!("asset_name is ignored when file_glob is set");
    }

    let mut paths = glob::glob(file)
        .map_err(|e| ConfigError::InvalidValue {
            input: "file".to_string(),
            reason: format!("invalid glob pattern: {e}"),
        })?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ReleaseError::Io(e.into()))?;

    if paths.is_empty() {
        return Err(ConfigError::NoMatchingFiles {
            pattern: file.to_string(),
        }
        .into());
    }

    paths.sort();
    log::debug!("Pattern {} matched {} file(s)", file, paths.len());

    paths
        .into_iter()
        .map(|path| {
            Ok(AssetSpec {
                asset_name: base_name(&path)?,
                path,
                overwrite,
            })
        })
        .collect()
}

fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                input: "file".to_string(),
                reason: format!("'{}' has no file name", path.display()),
            }
            .into()
        })
}
