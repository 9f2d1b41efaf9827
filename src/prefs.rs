//! Multidex installer preferences
//!
//! The platform's multidex installer records how many dex files it extracted
//! in a shared-preferences file. This module only ever reads that store; the
//! installer owns it. Every failure degrades to the default count with a
//! diagnostic, never an error.

use std::fs;
use std::io;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::diag::DiagnosticsSink;

/// Preference store name used by the multidex installer.
pub const PREFS_FILE: &str = "multidex.version";

/// Integer key holding the total dex count (primary included).
pub const KEY_DEX_NUMBER: &str = "dex.number";

/// Count when the store or key is absent: a single, primary-only dex.
pub const DEFAULT_DEX_NUMBER: u32 = 1;

const SHARED_PREFS_DIR: &str = "shared_prefs";

/// Dex count declared by the installer for the app at `data_dir`. Ordinals
/// 2..=count name the extracted secondary archives; 1 means primary only.
pub fn secondary_dex_count(data_dir: &Path, sink: &dyn DiagnosticsSink) -> u32 {
    let path = data_dir
        .join(SHARED_PREFS_DIR)
        .join(format!("{PREFS_FILE}.xml"));

    let xml = match fs::read_to_string(&path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return DEFAULT_DEX_NUMBER,
        Err(e) => {
            sink.log(&format!(
                "failed to read multidex preferences '{}': {e}",
                path.display()
            ));
            return DEFAULT_DEX_NUMBER;
        }
    };

    match parse_dex_number(&xml) {
        Some(count) => count,
        None => {
            sink.log(&format!(
                "no usable '{KEY_DEX_NUMBER}' entry in '{}'",
                path.display()
            ));
            DEFAULT_DEX_NUMBER
        }
    }
}

/// Scan shared-preferences XML for `<int name="dex.number" value="N"/>`.
fn parse_dex_number(xml: &str) -> Option<u32> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"int" => {
                let mut key_matches = false;
                let mut value = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => {
                            key_matches = attr
                                .unescape_value()
                                .is_ok_and(|v| v.as_ref() == KEY_DEX_NUMBER);
                        }
                        b"value" => {
                            value = attr
                                .unescape_value()
                                .ok()
                                .and_then(|v| v.parse::<u32>().ok());
                        }
                        _ => {}
                    }
                }
                if key_matches {
                    return value;
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::diag::RecordingSink;
    use tempfile::TempDir;

    fn write_prefs(data_dir: &Path, body: &str) {
        let dir = data_dir.join(SHARED_PREFS_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{PREFS_FILE}.xml")), body).unwrap();
    }

    #[test]
    fn reads_declared_count() {
        let temp = TempDir::new().unwrap();
        write_prefs(
            temp.path(),
            r#"<?xml version='1.0' encoding='utf-8' standalone='yes' ?>
<map>
    <int name="dex.number" value="3" />
</map>
"#,
        );

        let sink = RecordingSink::default();
        assert_eq!(secondary_dex_count(temp.path(), &sink), 3);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn missing_store_defaults_silently() {
        let temp = TempDir::new().unwrap();
        let sink = RecordingSink::default();
        assert_eq!(secondary_dex_count(temp.path(), &sink), DEFAULT_DEX_NUMBER);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn other_keys_are_ignored() {
        let temp = TempDir::new().unwrap();
        write_prefs(
            temp.path(),
            r#"<map>
    <long name="timestamp" value="1700000000000" />
    <int name="dex.crc" value="12345" />
    <int name="dex.number" value="4" />
</map>"#,
        );

        let sink = RecordingSink::default();
        assert_eq!(secondary_dex_count(temp.path(), &sink), 4);
    }

    #[test]
    fn malformed_store_defaults_with_diagnostic() {
        let temp = TempDir::new().unwrap();
        write_prefs(temp.path(), "<map><int name=\"dex.number\" value=\"nope\" /></map>");

        let sink = RecordingSink::default();
        assert_eq!(secondary_dex_count(temp.path(), &sink), DEFAULT_DEX_NUMBER);
        assert_eq!(sink.messages().len(), 1);
        assert!(sink.messages()[0].contains(KEY_DEX_NUMBER));
    }

    #[test]
    fn absent_key_defaults_with_diagnostic() {
        let temp = TempDir::new().unwrap();
        write_prefs(temp.path(), "<map><int name=\"dex.crc\" value=\"7\" /></map>");

        let sink = RecordingSink::default();
        assert_eq!(secondary_dex_count(temp.path(), &sink), DEFAULT_DEX_NUMBER);
        assert_eq!(sink.messages().len(), 1);
    }
}
