//! Target application metadata
//!
//! The host environment (a hooking framework, the CLI, a test harness) hands
//! the core an [`ApplicationContext`] through the [`ContextProvider`] seam.
//! [`FsContextProvider`] is the filesystem-backed provider used by the CLI:
//! it locates the installed package under an app root and reads the
//! last-update timestamp from the package file itself.

use std::fs;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use crate::config::Config;
use crate::error::{ListerError, Result};

/// Installed-application metadata needed for dex enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationContext {
    /// Package name, e.g. `com.example.app`.
    pub package_name: String,
    /// Path to the installed application package file.
    pub source_apk: PathBuf,
    /// The application's private data directory.
    pub data_dir: PathBuf,
    /// The application's private cache directory (holds the class list cache).
    pub cache_dir: PathBuf,
    /// Package last-update timestamp in milliseconds; bumped on reinstall.
    pub last_update_time: u64,
}

/// Injected capability resolving the target application's context.
pub trait ContextProvider {
    fn target_context(&self) -> Result<ApplicationContext>;
}

/// Resolves an [`ApplicationContext`] from the on-disk install layout:
/// `<app_root>/<package>[-suffix]/base.apk` and `<data_root>/<package>`.
#[derive(Clone, Debug)]
pub struct FsContextProvider {
    package: String,
    app_root: PathBuf,
    data_root: PathBuf,
    apk_override: Option<PathBuf>,
}

const PACKAGE_FILE_NAME: &str = "base.apk";

impl FsContextProvider {
    pub fn new(cfg: &Config) -> Self {
        Self {
            package: cfg.package.clone(),
            app_root: cfg.app_root.clone(),
            data_root: cfg.data_root.clone(),
            apk_override: cfg.apk.clone(),
        }
    }

    fn lookup_error(&self, reason: impl Into<String>) -> ListerError {
        ListerError::PackageLookup {
            package: self.package.clone(),
            reason: reason.into(),
        }
    }

    /// Find the installed package file. Install directories may carry a
    /// version suffix (`<package>-<suffix>`), so both forms are accepted.
    fn locate_apk(&self) -> Result<PathBuf> {
        if let Some(apk) = &self.apk_override {
            if apk.is_file() {
                return Ok(apk.clone());
            }
            return Err(self.lookup_error(format!("package file '{}' does not exist", apk.display())));
        }

        let entries = fs::read_dir(&self.app_root)
            .map_err(|e| self.lookup_error(format!("cannot read app root '{}': {e}", self.app_root.display())))?;

        let versioned_prefix = format!("{}-", self.package);
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name != self.package && !name.starts_with(&versioned_prefix) {
                continue;
            }
            let candidate = entry.path().join(PACKAGE_FILE_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(self.lookup_error(format!(
            "no install directory under '{}'",
            self.app_root.display()
        )))
    }
}

impl ContextProvider for FsContextProvider {
    fn target_context(&self) -> Result<ApplicationContext> {
        let source_apk = self.locate_apk()?;

        let metadata = fs::metadata(&source_apk)
            .map_err(|e| self.lookup_error(format!("cannot stat '{}': {e}", source_apk.display())))?;
        let modified = metadata
            .modified()
            .map_err(|e| self.lookup_error(format!("no modification time for '{}': {e}", source_apk.display())))?;
        let last_update_time = modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let data_dir = self.data_root.join(&self.package);
        Ok(ApplicationContext {
            package_name: self.package.clone(),
            source_apk,
            cache_dir: data_dir.join("cache"),
            data_dir,
            last_update_time,
        })
    }
}
