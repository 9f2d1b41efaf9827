//! Dex source path resolution
//!
//! An installed application carries its primary dex payload inside the
//! package file; the multidex installer extracts the rest as numbered zip
//! archives under the app's private data directory. This module turns an
//! [`ApplicationContext`] into the ordered list of dex-bearing files.

use std::fmt;
use std::path::PathBuf;

use crate::context::ApplicationContext;
use crate::diag::DiagnosticsSink;
use crate::prefs;

/// Name infix of extracted secondary archives, ie: `base.apk.classes2.zip`.
pub const EXTRACTED_NAME_EXT: &str = ".classes";
pub const EXTRACTED_SUFFIX: &str = ".zip";

/// Where the multidex installer extracts secondary archives, relative to the
/// app's private data directory.
pub const SECONDARY_FOLDER_NAME: &str = "code_cache/secondary-dexes";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DexSourceKind {
    /// The application package file itself.
    Primary,
    /// An extracted archive, numbered from 2.
    Secondary { ordinal: u32 },
}

impl fmt::Display for DexSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DexSourceKind::Primary => write!(f, "primary"),
            DexSourceKind::Secondary { ordinal } => write!(f, "secondary#{ordinal}"),
        }
    }
}

/// One dex-bearing file. Computed fresh on every enumeration, never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DexSource {
    pub path: PathBuf,
    pub kind: DexSourceKind,
}

impl DexSource {
    /// Extracted secondary archives are zip containers and need the
    /// temp-file-backed open.
    pub fn is_extracted_archive(&self) -> bool {
        self.path.to_string_lossy().ends_with(EXTRACTED_SUFFIX)
    }
}

/// Resolve the ordered dex source list: the package file first, then every
/// extracted secondary archive the installer declared. A missing archive is
/// logged and skipped; later ordinals are still probed.
pub fn resolve_dex_sources(ctx: &ApplicationContext, sink: &dyn DiagnosticsSink) -> Vec<DexSource> {
    let mut sources = vec![DexSource {
        path: ctx.source_apk.clone(),
        kind: DexSourceKind::Primary,
    }];

    let Some(apk_name) = ctx.source_apk.file_name() else {
        return sources;
    };
    let extracted_prefix = format!("{}{EXTRACTED_NAME_EXT}", apk_name.to_string_lossy());

    let dex_dir = ctx.data_dir.join(SECONDARY_FOLDER_NAME);
    let total_dex_number = prefs::secondary_dex_count(&ctx.data_dir, sink);

    for ordinal in 2..=total_dex_number {
        let file = dex_dir.join(format!("{extracted_prefix}{ordinal}{EXTRACTED_SUFFIX}"));
        if file.is_file() {
            sources.push(DexSource {
                path: file,
                kind: DexSourceKind::Secondary { ordinal },
            });
        } else {
            sink.log(&format!(
                "missing extracted secondary dex file '{}'",
                file.display()
            ));
        }
    }

    sources
}
