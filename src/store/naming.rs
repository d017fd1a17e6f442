//! Segment escaping and per-site table naming.
//!
//! Table names are derived only from the immutable numeric site id, never
//! from the user-editable site name, so renaming a site never touches its
//! storage.

/// Percent-encode a site name, page title or filename for use as a URL path
/// segment.
pub fn escape(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Inverse of [`escape`]. Malformed input is returned unchanged; the lookup
/// it feeds simply misses.
pub fn unescape(s: &str) -> String {
    urlencoding::decode(s)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| s.to_string())
}

/// Name of the page table owned by the given site.
pub fn page_table_name(site_id: i64) -> String {
    format!("pages_{site_id}")
}

/// Name of the file table owned by the given site.
pub fn file_table_name(site_id: i64) -> String {
    format!("files_{site_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_round_trip() {
        let cases = [
            "plain",
            "with space",
            "a/b",
            "100%",
            "odd?&=chars",
            "~file/nested name",
            "ünïcødé ページ",
        ];
        for s in cases {
            assert_eq!(unescape(&escape(s)), s, "round trip failed for {s:?}");
        }
    }

    #[test]
    fn test_unescape_malformed_passthrough() {
        assert_eq!(unescape("100%ZZ%"), "100%ZZ%");
    }

    #[test]
    fn test_table_names_deterministic_and_distinct() {
        assert_eq!(page_table_name(7), "pages_7");
        assert_eq!(file_table_name(7), "files_7");
        for a in 0..50i64 {
            for b in (a + 1)..50i64 {
                assert_ne!(page_table_name(a), page_table_name(b));
                assert_ne!(file_table_name(a), file_table_name(b));
            }
        }
    }
}
