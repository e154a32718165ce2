// SPDX-License-Identifier: GPL-3.0-only

//! Locating the device catalog and the flash script
//!
//! Both are looked up next to the working directory first (a source checkout
//! run from the repository root or from a build directory below it) and then
//! next to the executable (an installed bundle).

use crate::error::{Result, SysError};
use flash_types::Catalog;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CATALOG_DIR_NAME: &str = "data";
pub const CATALOG_FILE_NAME: &str = "template.csv";
pub const SCRIPT_FILE_NAME: &str = "flash_cordatus.sh";

/// Where a loaded catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Embedded,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Embedded => f.write_str("built-in catalog"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub source: CatalogSource,
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

fn catalog_relative_path() -> PathBuf {
    Path::new(CATALOG_DIR_NAME).join(CATALOG_FILE_NAME)
}

/// Catalog locations tried when none is configured, in order.
pub fn catalog_candidates(exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![
        Path::new(".").join(catalog_relative_path()),
        Path::new("..").join(catalog_relative_path()),
    ];
    if let Some(dir) = exe_dir {
        candidates.push(dir.join(catalog_relative_path()));
        candidates.push(dir.join(CATALOG_FILE_NAME));
    }
    candidates
}

/// Script locations tried when none is configured, in order.
pub fn script_candidates(exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = exe_dir {
        candidates.push(dir.join(SCRIPT_FILE_NAME));
    }
    candidates.push(Path::new(".").join(SCRIPT_FILE_NAME));
    candidates.push(Path::new("..").join(SCRIPT_FILE_NAME));
    candidates
}

/// Read and parse one catalog file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SysError::CatalogNotFound(path.to_path_buf())
        } else {
            SysError::Io(e)
        }
    })?;

    let catalog = Catalog::parse_csv(&text)?;
    debug!("Loaded {} catalog rows from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load the catalog from `configured`, or discover one.
///
/// A configured path must load. Discovered files that fail to parse are
/// skipped, and the built-in catalog is used when nothing else is found.
pub fn load_catalog(configured: Option<&Path>) -> Result<LoadedCatalog> {
    if let Some(path) = configured {
        let catalog = load_catalog_file(path)?;
        return Ok(LoadedCatalog {
            catalog,
            source: CatalogSource::File(path.to_path_buf()),
        });
    }

    for candidate in catalog_candidates(exe_dir().as_deref()) {
        if !candidate.is_file() {
            continue;
        }
        match load_catalog_file(&candidate) {
            Ok(catalog) => {
                info!("Using catalog {}", candidate.display());
                return Ok(LoadedCatalog {
                    catalog,
                    source: CatalogSource::File(candidate),
                });
            }
            Err(e) => warn!("Skipping catalog {}: {}", candidate.display(), e),
        }
    }

    info!("No catalog file found, using the built-in catalog");
    Ok(LoadedCatalog {
        catalog: Catalog::embedded()?,
        source: CatalogSource::Embedded,
    })
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn searched_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate the flash script, returning an absolute path.
pub fn find_script(configured: Option<&Path>) -> Result<PathBuf> {
    find_script_in(configured, exe_dir().as_deref())
}

pub(crate) fn find_script_in(configured: Option<&Path>, exe_dir: Option<&Path>) -> Result<PathBuf> {
    let candidates = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => script_candidates(exe_dir),
    };

    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .map(|candidate| absolute(candidate))
        .ok_or_else(|| SysError::ScriptNotFound {
            name: configured
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| SCRIPT_FILE_NAME.to_string()),
            searched: searched_list(&candidates),
        })
}

/// The directory the flash script runs in.
///
/// The script reads `data/template.csv` relative to its working directory,
/// so prefer a directory that has one.
pub fn resolve_working_dir(script: &Path) -> PathBuf {
    let script_dir = script
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    [script_dir.clone(), PathBuf::from("."), PathBuf::from("..")]
        .into_iter()
        .find(|dir| dir.join(catalog_relative_path()).is_file())
        .map(|dir| absolute(&dir))
        .unwrap_or_else(|| absolute(&script_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn catalog_candidates_prefer_working_tree() {
        let candidates = catalog_candidates(Some(Path::new("/opt/flash/bin")));
        assert_eq!(candidates[0], Path::new("./data/template.csv"));
        assert_eq!(candidates[1], Path::new("../data/template.csv"));
        assert_eq!(candidates[2], Path::new("/opt/flash/bin/data/template.csv"));
        assert_eq!(candidates[3], Path::new("/opt/flash/bin/template.csv"));
    }

    #[test]
    fn configured_catalog_loads() {
        let path = fixtures().join("data/template.csv");
        let loaded = load_catalog(Some(&path)).unwrap();
        assert_eq!(loaded.source, CatalogSource::File(path));
        assert_eq!(loaded.catalog.len(), 3);
    }

    #[test]
    fn missing_configured_catalog_is_an_error() {
        let err = load_catalog(Some(Path::new("/nonexistent/template.csv"))).unwrap_err();
        assert!(matches!(err, SysError::CatalogNotFound(_)));
    }

    #[test]
    fn script_lookup_uses_exe_dir_first() {
        let script = find_script_in(None, Some(&fixtures())).unwrap();
        assert!(script.is_absolute());
        assert!(script.ends_with(SCRIPT_FILE_NAME));
    }

    #[test]
    fn missing_script_lists_searched_paths() {
        let err = find_script_in(Some(Path::new("/nonexistent/flash.sh")), None).unwrap_err();
        match err {
            SysError::ScriptNotFound { name, searched } => {
                assert_eq!(name, "flash.sh");
                assert!(searched.contains("/nonexistent/flash.sh"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn working_dir_is_the_one_holding_the_catalog() {
        let script = fixtures().join(SCRIPT_FILE_NAME);
        assert_eq!(resolve_working_dir(&script), absolute(&fixtures()));
    }
}
