use std::path::PathBuf;

pub const DEFAULT_APP_ROOT: &str = "/data/app";
pub const DEFAULT_DATA_ROOT: &str = "/data/data";

#[derive(Clone, Debug)]
pub struct Config {
    /// Package name of the target application.
    pub package: String,
    /// Directory holding installed application packages.
    pub app_root: PathBuf,
    /// Root of per-application private data directories.
    pub data_root: PathBuf,
    /// Explicit package file path, bypassing the app-root search.
    pub apk: Option<PathBuf>,
    pub use_cache: bool,
    pub verify_checksum: bool,
}

impl Config {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            app_root: PathBuf::from(DEFAULT_APP_ROOT),
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            apk: None,
            use_cache: true,
            verify_checksum: false,
        }
    }
}
