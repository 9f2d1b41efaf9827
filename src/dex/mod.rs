//! Dex container handling
//!
//! This module provides the functionality needed to enumerate class names
//! from dex-bearing files:
//! - Magic number detection (DEX/CDEX/zip)
//! - Header parsing, validation and checksum verification
//! - Class name extraction from the string/type/class_def tables
//!
//! A container is either a raw dex file, an application package (zip with a
//! `classes.dex` entry), or an extracted secondary archive (zip, opened
//! through a scratch file).

mod header;
mod kind;
mod mutf8;

#[cfg(test)]
pub(crate) mod testdex;

pub use header::{DexHeader, CLASS_DEF_SIZE, ENDIAN_CONSTANT};
pub use kind::{detect_container_kind, ContainerKind};

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ListerError, Result};

/// DEX file header size (standard)
pub const HEADER_SIZE: usize = 0x70;

/// Dex payload entry inside package and secondary archives
pub const PRIMARY_DEX_ENTRY: &str = "classes.dex";

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

/// A parsed, bounds-checked dex container ready for class enumeration.
#[derive(Debug)]
pub struct DexContainer {
    bytes: Vec<u8>,
    header: DexHeader,
}

impl DexContainer {
    /// Open a dex-bearing file: either a raw dex file or a package archive
    /// whose `classes.dex` entry holds the primary dex.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| ListerError::from_io_error(path, e))?;
        match detect_container_kind(&bytes) {
            Some(ContainerKind::Dex) => Self::from_dex_bytes(bytes),
            Some(ContainerKind::Zip) => {
                let dex = embedded_dex_bytes(path, bytes)?;
                Self::from_dex_bytes(dex)
            }
            Some(ContainerKind::Cdex) => Err(ListerError::Unsupported("compact dex (cdex)")),
            None => Err(ListerError::InvalidMagic),
        }
    }

    /// Open an extracted secondary archive. The payload is staged to a
    /// scratch file and parsed from there; the scratch file is removed when
    /// the guard drops, failure paths included.
    pub fn open_extracted_archive(path: &Path) -> Result<Self> {
        let container = fs::read(path).map_err(|e| ListerError::from_io_error(path, e))?;
        let dex = embedded_dex_bytes(path, container)?;

        let mut scratch = NamedTempFile::new()
            .map_err(|e| ListerError::from_io_error(std::env::temp_dir(), e))?;
        scratch
            .write_all(&dex)
            .and_then(|_| scratch.flush())
            .map_err(|e| ListerError::from_io_error(scratch.path(), e))?;
        Self::open(scratch.path())
    }

    /// Parse an in-memory standard dex image.
    pub fn from_dex_bytes(bytes: Vec<u8>) -> Result<Self> {
        match detect_container_kind(&bytes) {
            Some(ContainerKind::Dex) => {}
            Some(ContainerKind::Cdex) => return Err(ListerError::Unsupported("compact dex (cdex)")),
            _ => return Err(ListerError::InvalidMagic),
        }
        let header = DexHeader::parse(&bytes)?;
        header.validate(bytes.len())?;
        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &DexHeader {
        &self.header
    }

    /// Check the header's Adler-32 checksum against the payload.
    pub fn verify_checksum(&self) -> Result<()> {
        header::verify_checksum(&self.bytes, &self.header)
    }

    /// Every class name the container defines, in class_def table order,
    /// as binary names (`com.example.Foo`).
    pub fn class_names(&self) -> Result<Vec<String>> {
        let count = self.header.class_defs_size as usize;
        let mut names = Vec::with_capacity(count);
        for index in 0..count {
            let def_off = self.header.class_defs_off as usize + index * CLASS_DEF_SIZE;
            let class_idx = read_u32(&self.bytes, def_off);
            let descriptor = self.type_descriptor(class_idx)?;
            names.push(descriptor_to_binary_name(&descriptor)?);
        }
        Ok(names)
    }

    fn type_descriptor(&self, type_idx: u32) -> Result<String> {
        if type_idx >= self.header.type_ids_size {
            return Err(ListerError::Malformed(format!(
                "type index {type_idx} out of range"
            )));
        }
        let string_idx = read_u32(
            &self.bytes,
            self.header.type_ids_off as usize + type_idx as usize * 4,
        );
        self.string_at(string_idx)
    }

    fn string_at(&self, string_idx: u32) -> Result<String> {
        if string_idx >= self.header.string_ids_size {
            return Err(ListerError::Malformed(format!(
                "string index {string_idx} out of range"
            )));
        }
        let data_off = read_u32(
            &self.bytes,
            self.header.string_ids_off as usize + string_idx as usize * 4,
        ) as usize;
        // skip the uleb128 UTF-16 length, the payload is NUL-terminated
        let (_utf16_len, cursor) = mutf8::read_uleb128(&self.bytes, data_off)?;
        mutf8::decode_mutf8(&self.bytes, cursor)
    }
}

/// Turn a type descriptor (`Lcom/example/Foo;`) into a binary class name.
pub fn descriptor_to_binary_name(descriptor: &str) -> Result<String> {
    let inner = descriptor
        .strip_prefix('L')
        .and_then(|d| d.strip_suffix(';'))
        .ok_or_else(|| {
            ListerError::Malformed(format!("not a class descriptor: '{descriptor}'"))
        })?;
    Ok(inner.replace('/', "."))
}

/// Pull the `classes.dex` entry out of a zip container.
fn embedded_dex_bytes(path: &Path, container: Vec<u8>) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(container))?;
    let mut entry = match archive.by_name(PRIMARY_DEX_ENTRY) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(ListerError::MissingEntry(PRIMARY_DEX_ENTRY)),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ListerError::from_io_error(path, e))?;
    Ok(bytes)
}
