//! DEX header parsing and validation

use crate::error::{ListerError, Result};

use super::{read_u32, HEADER_SIZE};

/// DEX header offsets
const CHECKSUM_OFFSET: usize = 0x08;
const SIGNATURE_OFFSET: usize = 0x0C;
const FILE_SIZE_OFFSET: usize = 0x20;
const HEADER_SIZE_OFFSET: usize = 0x24;
const ENDIAN_TAG_OFFSET: usize = 0x28;
const STRING_IDS_SIZE_OFFSET: usize = 0x38;
const STRING_IDS_OFF_OFFSET: usize = 0x3C;
const TYPE_IDS_SIZE_OFFSET: usize = 0x40;
const TYPE_IDS_OFF_OFFSET: usize = 0x44;
const CLASS_DEFS_SIZE_OFFSET: usize = 0x60;
const CLASS_DEFS_OFF_OFFSET: usize = 0x64;

/// Little-endian marker required in `endian_tag`
pub const ENDIAN_CONSTANT: u32 = 0x1234_5678;

/// Size of one class_def_item
pub const CLASS_DEF_SIZE: usize = 0x20;

/// The subset of the 0x70-byte header needed for class enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DexHeader {
    pub checksum: u32,
    pub file_size: u32,
    pub header_size: u32,
    pub endian_tag: u32,
    pub string_ids_size: u32,
    pub string_ids_off: u32,
    pub type_ids_size: u32,
    pub type_ids_off: u32,
    pub class_defs_size: u32,
    pub class_defs_off: u32,
}

impl DexHeader {
    /// Read the header fields. Fails only on a short buffer; structural
    /// checks live in [`DexHeader::validate`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ListerError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            checksum: read_u32(bytes, CHECKSUM_OFFSET),
            file_size: read_u32(bytes, FILE_SIZE_OFFSET),
            header_size: read_u32(bytes, HEADER_SIZE_OFFSET),
            endian_tag: read_u32(bytes, ENDIAN_TAG_OFFSET),
            string_ids_size: read_u32(bytes, STRING_IDS_SIZE_OFFSET),
            string_ids_off: read_u32(bytes, STRING_IDS_OFF_OFFSET),
            type_ids_size: read_u32(bytes, TYPE_IDS_SIZE_OFFSET),
            type_ids_off: read_u32(bytes, TYPE_IDS_OFF_OFFSET),
            class_defs_size: read_u32(bytes, CLASS_DEFS_SIZE_OFFSET),
            class_defs_off: read_u32(bytes, CLASS_DEFS_OFF_OFFSET),
        })
    }

    /// Check that every table the enumerator walks lies inside the buffer.
    pub fn validate(&self, available: usize) -> Result<()> {
        if self.endian_tag != ENDIAN_CONSTANT {
            return Err(ListerError::Malformed(format!(
                "unexpected endian tag {:#010x}",
                self.endian_tag
            )));
        }
        if (self.header_size as usize) < HEADER_SIZE {
            return Err(ListerError::Malformed(format!(
                "declared header size {:#x} below minimum",
                self.header_size
            )));
        }
        if self.file_size as usize > available {
            return Err(ListerError::Truncated {
                expected: self.file_size as usize,
                actual: available,
            });
        }

        table_in_bounds(self.string_ids_off, self.string_ids_size, 4, available)?;
        table_in_bounds(self.type_ids_off, self.type_ids_size, 4, available)?;
        table_in_bounds(
            self.class_defs_off,
            self.class_defs_size,
            CLASS_DEF_SIZE,
            available,
        )?;
        Ok(())
    }
}

fn table_in_bounds(off: u32, count: u32, entry_size: usize, available: usize) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let end = off as u64 + count as u64 * entry_size as u64;
    if end > available as u64 {
        return Err(ListerError::Truncated {
            expected: end as usize,
            actual: available,
        });
    }
    Ok(())
}

/// Check the stored Adler-32 checksum against the payload
///
/// The checksum field covers everything after itself, signature included.
pub fn verify_checksum(bytes: &[u8], header: &DexHeader) -> Result<()> {
    if bytes.len() <= SIGNATURE_OFFSET {
        return Err(ListerError::Truncated {
            expected: SIGNATURE_OFFSET + 1,
            actual: bytes.len(),
        });
    }
    let computed = adler32(&bytes[SIGNATURE_OFFSET..]);
    if computed != header.checksum {
        return Err(ListerError::ChecksumMismatch {
            stored: header.checksum,
            computed,
        });
    }
    Ok(())
}

/// Compute Adler-32 checksum (as used in DEX files)
///
/// # Arguments
/// * `data` - Byte slice to checksum
///
/// # Returns
/// 32-bit Adler-32 checksum
pub(crate) fn adler32(data: &[u8]) -> u32 {
    const MOD: u32 = 65_521;
    let mut a = 1u32;
    let mut b = 0u32;

    for &byte in data {
        a = (a + byte as u32) % MOD;
        b = (b + a) % MOD;
    }

    (b << 16) | a
}
