//! Class enumeration with cache
//!
//! Ties the pieces together: resolve the target context, consult the cache,
//! otherwise walk every dex source and concatenate class names. Only the
//! context lookup can fail the call; every per-source failure degrades to a
//! shorter list plus a diagnostic, and suppresses the cache write for that
//! pass so the next call rescans instead of trusting a partial record.

use crate::cache::{self, CACHE_FILE_NAME};
use crate::context::ContextProvider;
use crate::dex::DexContainer;
use crate::diag::DiagnosticsSink;
use crate::error::Result;
use crate::paths::{resolve_dex_sources, DexSource};

pub struct ClassLister<P, S> {
    provider: P,
    sink: S,
    verify_checksum: bool,
}

impl<P: ContextProvider, S: DiagnosticsSink> ClassLister<P, S> {
    pub fn new(provider: P, sink: S) -> Self {
        Self {
            provider,
            sink,
            verify_checksum: false,
        }
    }

    /// Also check each container's header checksum while enumerating.
    /// Never consulted on the cached fast path.
    pub fn verify_checksums(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    /// All class names packed in the target application's dex files, in
    /// source order then class_def order, duplicates preserved.
    ///
    /// With `use_cache`, a stored list whose timestamp matches the package's
    /// live last-update time is returned without touching any dex file; a
    /// fully successful scan replaces the stored record.
    pub fn all_classes(&self, use_cache: bool) -> Result<Vec<String>> {
        let ctx = self.provider.target_context()?;
        let cache_file = ctx.cache_dir.join(CACHE_FILE_NAME);

        if use_cache && cache_file.is_file() {
            match cache::read(&cache_file) {
                Ok(record) if record.last_update_time == ctx.last_update_time => {
                    return Ok(record.class_names);
                }
                Ok(_) => {} // stale, rescan and overwrite below
                Err(e) => {
                    self.sink.log(&format!(
                        "ignoring unreadable class list cache '{}': {e}",
                        cache_file.display()
                    ));
                }
            }
        }

        let mut class_names = Vec::new();
        let mut had_failure = false;
        for source in resolve_dex_sources(&ctx, &self.sink) {
            match self.enumerate_source(&source) {
                Ok(mut names) => class_names.append(&mut names),
                Err(e) => {
                    had_failure = true;
                    self.sink.log(&format!(
                        "error loading dex file '{}': {e}",
                        source.path.display()
                    ));
                }
            }
        }

        if use_cache && !had_failure {
            if let Err(e) = cache::write(&cache_file, ctx.last_update_time, &class_names) {
                self.sink.log(&format!(
                    "failed to write class list cache '{}': {e}",
                    cache_file.display()
                ));
            }
        }

        Ok(class_names)
    }

    fn enumerate_source(&self, source: &DexSource) -> Result<Vec<String>> {
        let container = if source.is_extracted_archive() {
            DexContainer::open_extracted_archive(&source.path)?
        } else {
            DexContainer::open(&source.path)?
        };
        if self.verify_checksum {
            container.verify_checksum()?;
        }
        container.class_names()
    }
}
