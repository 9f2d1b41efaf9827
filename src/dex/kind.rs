//! Container type detection

/// Represents the type of container a dex source file holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    /// Standard DEX format (dex\n035)
    Dex,
    /// Compact DEX format (cdex)
    Cdex,
    /// Zip archive wrapping a dex payload (APK or extracted secondary)
    Zip,
}

impl ContainerKind {
    /// Returns the string representation for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Dex => "DEX",
            ContainerKind::Cdex => "CDEX",
            ContainerKind::Zip => "ZIP",
        }
    }
}

/// Detect the container type from leading bytes
///
/// # Arguments
/// * `header` - First few bytes of the file (at least 8 bytes recommended)
///
/// # Returns
/// - `Some(ContainerKind::Dex)` if standard DEX format detected
/// - `Some(ContainerKind::Cdex)` if compact DEX format detected
/// - `Some(ContainerKind::Zip)` if a zip local-file header is detected
/// - `None` otherwise
pub fn detect_container_kind(header: &[u8]) -> Option<ContainerKind> {
    // Standard DEX format: "dex\n" followed by version digits
    if header.len() >= 8
        && &header[0..4] == b"dex\n"
        && header[4..7]
            .iter()
            .all(|c| *c == b'\0' || c.is_ascii_digit())
    {
        return Some(ContainerKind::Dex);
    }

    // Compact DEX format: "cdex\n"
    if header.len() >= 5 && &header[0..4] == b"cdex" && header[4] == b'\n' {
        return Some(ContainerKind::Cdex);
    }

    if header.len() >= 4 && &header[0..4] == b"PK\x03\x04" {
        return Some(ContainerKind::Zip);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_standard_dex() {
        let header = b"dex\n035\0extra bytes";
        assert_eq!(detect_container_kind(header), Some(ContainerKind::Dex));
    }

    #[test]
    fn test_detect_compact_dex() {
        let header = b"cdex\nextra bytes";
        assert_eq!(detect_container_kind(header), Some(ContainerKind::Cdex));
    }

    #[test]
    fn test_detect_zip() {
        let header = b"PK\x03\x04\x14\x00";
        assert_eq!(detect_container_kind(header), Some(ContainerKind::Zip));
    }

    #[test]
    fn test_invalid_magic() {
        let header = b"invalid data";
        assert_eq!(detect_container_kind(header), None);
    }

    #[test]
    fn test_too_short() {
        let header = b"dex\n035";
        assert_eq!(detect_container_kind(header), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(ContainerKind::Dex.as_str(), "DEX");
        assert_eq!(ContainerKind::Cdex.as_str(), "CDEX");
        assert_eq!(ContainerKind::Zip.as_str(), "ZIP");
    }
}
