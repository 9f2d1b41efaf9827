//! Persisted class list cache
//!
//! One record per target application, stored in its private cache directory:
//! the package's last-update timestamp plus the full class name list. The
//! record is only trusted while the stored timestamp matches the live one.
//!
//! The format is a versioned, length-prefixed binary layout (little-endian):
//! magic, format version, timestamp u64, count u32, then `count` strings as
//! u32 length + UTF-8 bytes. Every write replaces the whole record through a
//! scratch file and an atomic rename, so readers never observe a partial
//! record and concurrent writers just race to the last complete one.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ListerError, Result};

/// Cache file name inside the app's private cache directory.
pub const CACHE_FILE_NAME: &str = "ClassList.dat";

const CACHE_MAGIC: &[u8; 4] = b"DXLS";
const CACHE_VERSION: u8 = 1;

/// A decoded cache record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheRecord {
    pub last_update_time: u64,
    pub class_names: Vec<String>,
}

/// Decode the record at `path`. Any mismatch fails; callers treat every
/// failure as a cache miss.
pub fn read(path: &Path) -> Result<CacheRecord> {
    let bytes = fs::read(path).map_err(|e| ListerError::from_io_error(path, e))?;
    let mut pos = 0usize;

    if take(&bytes, &mut pos, CACHE_MAGIC.len())? != CACHE_MAGIC {
        return Err(ListerError::CacheFormat("bad magic".to_string()));
    }
    let version = take(&bytes, &mut pos, 1)?[0];
    if version != CACHE_VERSION {
        return Err(ListerError::CacheFormat(format!(
            "unsupported version {version}"
        )));
    }

    let last_update_time = u64::from_le_bytes(take(&bytes, &mut pos, 8)?.try_into().unwrap());
    let count = u32::from_le_bytes(take(&bytes, &mut pos, 4)?.try_into().unwrap()) as usize;

    // each entry needs at least its length prefix
    if count.saturating_mul(4) > bytes.len() - pos {
        return Err(ListerError::CacheFormat(format!(
            "implausible entry count {count}"
        )));
    }

    let mut class_names = Vec::with_capacity(count);
    for _ in 0..count {
        let len = u32::from_le_bytes(take(&bytes, &mut pos, 4)?.try_into().unwrap()) as usize;
        let raw = take(&bytes, &mut pos, len)?;
        let name = std::str::from_utf8(raw)
            .map_err(|_| ListerError::CacheFormat("class name is not UTF-8".to_string()))?;
        class_names.push(name.to_string());
    }

    if pos != bytes.len() {
        return Err(ListerError::CacheFormat("trailing data".to_string()));
    }

    Ok(CacheRecord {
        last_update_time,
        class_names,
    })
}

/// Serialize and atomically replace the record at `path`.
pub fn write(path: &Path, last_update_time: u64, class_names: &[String]) -> Result<()> {
    let mut buf = Vec::new();
    buf.extend_from_slice(CACHE_MAGIC);
    buf.push(CACHE_VERSION);
    buf.extend_from_slice(&last_update_time.to_le_bytes());
    buf.extend_from_slice(&(class_names.len() as u32).to_le_bytes());
    for name in class_names {
        buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
        buf.extend_from_slice(name.as_bytes());
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| ListerError::from_io_error(dir, e))?;

    let mut scratch =
        NamedTempFile::new_in(dir).map_err(|e| ListerError::from_io_error(dir, e))?;
    scratch
        .write_all(&buf)
        .map_err(|e| ListerError::from_io_error(scratch.path(), e))?;
    scratch
        .persist(path)
        .map_err(|e| ListerError::from_io_error(path, e.error))?;
    Ok(())
}

fn take<'a>(bytes: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8]> {
    let end = pos
        .checked_add(n)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| ListerError::CacheFormat("record truncated".to_string()))?;
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn roundtrip_preserves_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);

        let list = names(&["com.example.Foo", "com.example.Foo", "a.b.C"]);
        write(&path, 1_700_000_000_123, &list).unwrap();

        let record = read(&path).unwrap();
        assert_eq!(record.last_update_time, 1_700_000_000_123);
        assert_eq!(record.class_names, list);
    }

    #[test]
    fn roundtrip_empty_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);

        write(&path, 7, &[]).unwrap();
        let record = read(&path).unwrap();
        assert_eq!(record.last_update_time, 7);
        assert!(record.class_names.is_empty());
    }

    #[test]
    fn write_creates_cache_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cache").join(CACHE_FILE_NAME);

        write(&path, 1, &names(&["a.A"])).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn overwrite_replaces_whole_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);

        write(&path, 1, &names(&["a.A", "a.B", "a.C"])).unwrap();
        write(&path, 2, &names(&["x.Y"])).unwrap();

        let record = read(&path).unwrap();
        assert_eq!(record.last_update_time, 2);
        assert_eq!(record.class_names, names(&["x.Y"]));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let err = read(&temp.path().join(CACHE_FILE_NAME)).unwrap_err();
        assert!(matches!(err, ListerError::Io { .. }));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);
        fs::write(&path, b"JUNKxxxxxxxxxxxxxxxx").unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, ListerError::CacheFormat(_)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);
        write(&path, 1, &[]).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[4] = 99;
        fs::write(&path, bytes).unwrap();

        let err = read(&path).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn truncated_record_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);
        write(&path, 1, &names(&["com.example.Foo"])).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, ListerError::CacheFormat(_)));
    }

    #[test]
    fn trailing_data_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CACHE_FILE_NAME);
        write(&path, 1, &[]).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes.push(0xAB);
        fs::write(&path, bytes).unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, ListerError::CacheFormat(_)));
    }
}
