//! Client-side file checks run before any network call.
//!
//! These mirror the server allow-lists but never replace them. The declared MIME
//! type is compared as-is; the file content is not inspected.

use crate::error::{UploadError, UploadResult};
use crate::models::UploadFile;

/// Validate `file` against a MIME allow-list and a byte ceiling.
///
/// An empty allow-list accepts any MIME. A non-positive `max_bytes` disables the
/// ceiling, but files with a zero or negative size are always rejected.
/// The MIME check runs first.
pub fn validate_file(file: &UploadFile, allowed_mime: &[String], max_bytes: i64) -> UploadResult<()> {
    let mime = file.declared_mime();
    if !allowed_mime.is_empty() && !allowed_mime.iter().any(|m| m == mime) {
        return Err(UploadError::MimeRejected {
            mime: mime.to_string(),
            allowed: allowed_mime.to_vec(),
        });
    }

    if file.size <= 0 || (max_bytes > 0 && file.size > max_bytes) {
        return Err(UploadError::SizeRejected {
            size: file.size,
            max_bytes,
        });
    }

    Ok(())
}

/// Parse a comma separated MIME list as carried by form attributes.
pub fn parse_allowed_mime(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a byte ceiling as carried by form attributes. Unparseable input disables the ceiling.
pub fn parse_max_bytes(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn file(mime: &str, size: i64) -> UploadFile {
        UploadFile::new("f", mime, vec![1u8; 4]).with_declared_size(size)
    }

    #[test]
    fn test_non_positive_size_always_rejected() {
        for max in [-1, 0, 1, 10_485_760] {
            for size in [-5, 0] {
                let err = validate_file(&file("image/png", size), &[], max).unwrap_err();
                assert!(matches!(err, UploadError::SizeRejected { .. }), "size {size} max {max}");
            }
        }
    }

    #[test]
    fn test_mime_outside_allow_list_rejected() {
        let list = allow(&["image/png", "image/jpeg"]);
        for mime in ["application/pdf", "", "image/PNG", "image/png; charset=x"] {
            let err = validate_file(&file(mime, 10), &list, 0).unwrap_err();
            assert!(matches!(err, UploadError::MimeRejected { .. }), "mime {mime}");
        }
    }

    #[test]
    fn test_empty_allow_list_accepts_any_mime() {
        assert!(validate_file(&file("application/x-anything", 10), &[], 0).is_ok());
        assert!(validate_file(&file("", 10), &[], 0).is_ok());
    }

    #[test]
    fn test_ceiling() {
        assert!(validate_file(&file("image/png", 100), &[], 100).is_ok());
        let err = validate_file(&file("image/png", 101), &[], 100).unwrap_err();
        assert!(matches!(
            err,
            UploadError::SizeRejected {
                size: 101,
                max_bytes: 100
            }
        ));
        // disabled ceiling
        assert!(validate_file(&file("image/png", i64::MAX), &[], 0).is_ok());
        assert!(validate_file(&file("image/png", i64::MAX), &[], -1).is_ok());
    }

    #[test]
    fn test_mime_checked_before_size() {
        let list = allow(&["image/png"]);
        let err = validate_file(&file("text/plain", 0), &list, 10).unwrap_err();
        assert!(matches!(err, UploadError::MimeRejected { .. }));
    }

    #[test]
    fn test_report_pdf_scenario() {
        let list = allow(&["image/png", "image/jpeg", "application/pdf"]);
        let f = UploadFile::new("report.pdf", "application/pdf", vec![7u8; 2048]);
        assert!(validate_file(&f, &list, 10_485_760).is_ok());
    }

    #[test]
    fn test_parse_allowed_mime() {
        assert_eq!(
            parse_allowed_mime(" application/pdf, image/png ,, "),
            allow(&["application/pdf", "image/png"])
        );
        assert!(parse_allowed_mime("").is_empty());
    }

    #[test]
    fn test_parse_max_bytes() {
        assert_eq!(parse_max_bytes("1024"), 1024);
        assert_eq!(parse_max_bytes(" 20 "), 20);
        assert_eq!(parse_max_bytes(""), 0);
        assert_eq!(parse_max_bytes("abc"), 0);
    }
}
