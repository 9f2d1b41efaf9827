//! Synthetic dex containers for tests
//!
//! Builds the minimal standard-dex layout the enumerator walks: header,
//! string_ids, type_ids, class_defs and string data, with a valid Adler-32
//! checksum. One string/type/class_def per descriptor, in argument order.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::header::{adler32, CLASS_DEF_SIZE, ENDIAN_CONSTANT};
use super::{HEADER_SIZE, PRIMARY_DEX_ENTRY};

pub(crate) fn build_dex(descriptors: &[&str]) -> Vec<u8> {
    let n = descriptors.len();
    let string_ids_off = HEADER_SIZE;
    let type_ids_off = string_ids_off + 4 * n;
    let class_defs_off = type_ids_off + 4 * n;
    let data_off = class_defs_off + CLASS_DEF_SIZE * n;

    let mut string_data = Vec::new();
    let mut string_offsets = Vec::with_capacity(n);
    for descriptor in descriptors {
        string_offsets.push((data_off + string_data.len()) as u32);
        push_uleb128(&mut string_data, descriptor.chars().count() as u32);
        string_data.extend_from_slice(descriptor.as_bytes());
        string_data.push(0);
    }

    let total = data_off + string_data.len();
    let mut out = vec![0u8; data_off];
    out.extend_from_slice(&string_data);

    out[0..8].copy_from_slice(b"dex\n035\0");
    put_u32(&mut out, 0x20, total as u32); // file_size
    put_u32(&mut out, 0x24, HEADER_SIZE as u32);
    put_u32(&mut out, 0x28, ENDIAN_CONSTANT);
    put_u32(&mut out, 0x38, n as u32);
    put_u32(&mut out, 0x3C, string_ids_off as u32);
    put_u32(&mut out, 0x40, n as u32);
    put_u32(&mut out, 0x44, type_ids_off as u32);
    put_u32(&mut out, 0x60, n as u32);
    put_u32(&mut out, 0x64, class_defs_off as u32);
    put_u32(&mut out, 0x68, string_data.len() as u32); // data_size
    put_u32(&mut out, 0x6C, data_off as u32);

    for i in 0..n {
        put_u32(&mut out, string_ids_off + 4 * i, string_offsets[i]);
        put_u32(&mut out, type_ids_off + 4 * i, i as u32); // descriptor_idx
        let def = class_defs_off + CLASS_DEF_SIZE * i;
        put_u32(&mut out, def, i as u32); // class_idx
        put_u32(&mut out, def + 8, u32::MAX); // superclass_idx = NO_INDEX
    }

    let checksum = adler32(&out[0x0C..]);
    put_u32(&mut out, 0x08, checksum);
    out
}

/// Zip archive holding one `classes.dex` entry, the secondary-dex layout.
pub(crate) fn build_secondary_zip(descriptors: &[&str]) -> Vec<u8> {
    wrap_in_zip(&build_dex(descriptors))
}

pub(crate) fn wrap_in_zip(dex: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file(PRIMARY_DEX_ENTRY, options).unwrap();
    writer.write_all(dex).unwrap();
    writer.finish().unwrap().into_inner()
}

/// A valid zip with no dex payload at all.
pub(crate) fn empty_zip() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("README.txt", options).unwrap();
    writer.write_all(b"nothing here").unwrap();
    writer.finish().unwrap().into_inner()
}

fn put_u32(out: &mut [u8], offset: usize, value: u32) {
    out[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn push_uleb128(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}
