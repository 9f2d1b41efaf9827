//! ULEB128 and modified-UTF-8 decoding
//!
//! Dex string data items are a ULEB128 UTF-16 length followed by
//! NUL-terminated modified UTF-8, where U+0000 is encoded as `C0 80` so the
//! terminator stays unambiguous.

use crate::error::{ListerError, Result};

/// Read an unsigned LEB128 value, returning it with the cursor past it.
pub fn read_uleb128(data: &[u8], mut offset: usize) -> Result<(u32, usize)> {
    let mut result = 0u32;
    let mut shift = 0u32;
    loop {
        let byte = *data
            .get(offset)
            .ok_or_else(|| ListerError::Malformed("uleb128 runs past end of buffer".to_string()))?;
        offset += 1;
        result |= ((byte & 0x7F) as u32) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 32 {
            return Err(ListerError::Malformed(
                "uleb128 value overflows 32 bits".to_string(),
            ));
        }
    }
    Ok((result, offset))
}

/// Decode a NUL-terminated modified-UTF-8 string starting at `offset`.
pub fn decode_mutf8(data: &[u8], mut offset: usize) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        let byte = match data.get(offset) {
            Some(0) => break,
            Some(&b) => b,
            None => {
                return Err(ListerError::Malformed(
                    "unterminated string data".to_string(),
                ))
            }
        };
        // two-byte encoding of an embedded NUL
        if byte == 0xC0 && data.get(offset + 1) == Some(&0x80) {
            bytes.push(0);
            offset += 2;
            continue;
        }
        bytes.push(byte);
        offset += 1;
    }

    String::from_utf8(bytes)
        .map_err(|_| ListerError::Malformed("string data is not valid UTF-8".to_string()))
}
