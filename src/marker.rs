//! File name marker for encrypted files
//!
//! Encrypted files carry an `.enc` extension so that a download can be routed
//! to decryption instead of being handed over as-is. The blob itself carries
//! no magic bytes, so the name is the only signal.

/// Extension appended to the names of encrypted files, without the dot.
pub const EXTENSION: &str = "enc";

/// Append the marker to a file name.
pub fn mark(name: &str) -> String {
    format!("{}.{}", name, EXTENSION)
}

/// True if the file name ends with the marker (ASCII case-insensitive).
pub fn is_marked(name: &str) -> bool {
    unmark(name).is_some()
}

/// Strip the marker, returning the original name.
///
/// Returns `None` if the marker is absent or nothing would remain.
pub fn unmark(name: &str) -> Option<&str> {
    let suffix_len = EXTENSION.len() + 1;
    if name.len() <= suffix_len {
        return None;
    }
    let split = name.len() - suffix_len;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (stem, suffix) = name.split_at(split);
    let ext = suffix.strip_prefix('.')?;
    ext.eq_ignore_ascii_case(EXTENSION).then_some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark() {
        assert_eq!(mark("report.pdf"), "report.pdf.enc");
        assert_eq!(mark("noext"), "noext.enc");
    }

    #[test]
    fn test_unmark() {
        assert_eq!(unmark("report.pdf.enc"), Some("report.pdf"));
        assert_eq!(unmark("report.pdf.ENC"), Some("report.pdf"));
        assert_eq!(unmark(&mark("a")), Some("a"));
    }

    #[test]
    fn test_unmark_rejects_unmarked() {
        assert_eq!(unmark("report.pdf"), None);
        assert_eq!(unmark("report.encrypted"), None);
        assert_eq!(unmark("reportenc"), None);
        assert_eq!(unmark(".enc"), None);
        assert_eq!(unmark("enc"), None);
        assert_eq!(unmark(""), None);
    }

    #[test]
    fn test_unmark_multibyte_names() {
        assert_eq!(unmark("résumé.enc"), Some("résumé"));
        assert_eq!(unmark("日本"), None);
    }

    #[test]
    fn test_is_marked() {
        assert!(is_marked("photo.jpg.enc"));
        assert!(!is_marked("photo.jpg"));
    }
}
