//! Content addressing: decoding request paths into (site, page) or
//! (site, file) coordinates and building the canonical URLs back.

use crate::store::naming::{escape, unescape};

/// Reserved second path segment that marks a file address. Wire-level
/// contract: changing it breaks every existing file link.
pub const FILE_TOKEN: &str = "~file";

/// A decoded request path. Two address spaces share the `/<site>/...`
/// prefix; the reserved token keeps them disjoint by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Bare `/`: no site selected.
    SiteIndex,
    /// `/<site>` (empty title means the landing page) or `/<site>/<title>`.
    Page { site: String, title: String },
    /// `/<site>/~file/<filename>`.
    File { site: String, filename: String },
}

impl Address {
    /// Decode a raw request path. Every segment round-trips through the
    /// codec; raw path bytes are never used as lookup keys. Segments past
    /// the ones each form consumes are ignored, matching the historical
    /// behavior of these URLs.
    pub fn parse(path: &str) -> Address {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Address::SiteIndex;
        }
        let segments: Vec<&str> = trimmed.split('/').collect();

        if segments.len() >= 3 && segments[1] == FILE_TOKEN {
            return Address::File {
                site: unescape(segments[0]),
                filename: unescape(segments[2]),
            };
        }

        Address::Page {
            site: unescape(segments[0]),
            title: segments.get(1).map(|s| unescape(s)).unwrap_or_default(),
        }
    }
}

/// Canonical URL for a page coordinate. Empty parts are omitted from the
/// tail: `/`, `/<site>`, or `/<site>/<title>`.
pub fn page_url(site: &str, title: &str) -> String {
    if site.is_empty() {
        return "/".to_string();
    }
    if title.is_empty() {
        return format!("/{}", escape(site));
    }
    format!("/{}/{}", escape(site), escape(title))
}

/// Canonical URL for a file coordinate: `/<site>/~file/<filename>`.
pub fn file_url(site: &str, filename: &str) -> String {
    if site.is_empty() {
        return "/".to_string();
    }
    if filename.is_empty() {
        return format!("/{}", escape(site));
    }
    format!("/{}/{FILE_TOKEN}/{}", escape(site), escape(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_site_index() {
        assert_eq!(Address::parse("/"), Address::SiteIndex);
        assert_eq!(Address::parse(""), Address::SiteIndex);
        assert_eq!(Address::parse("///"), Address::SiteIndex);
    }

    #[test]
    fn test_parse_site_only() {
        assert_eq!(
            Address::parse("/demo"),
            Address::Page {
                site: "demo".to_string(),
                title: String::new()
            }
        );
    }

    #[test]
    fn test_parse_site_and_title() {
        assert_eq!(
            Address::parse("/demo/Home"),
            Address::Page {
                site: "demo".to_string(),
                title: "Home".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unescapes_segments() {
        assert_eq!(
            Address::parse("/my%20site/Some%2FPage"),
            Address::Page {
                site: "my site".to_string(),
                title: "Some/Page".to_string()
            }
        );
    }

    #[test]
    fn test_parse_file_address() {
        assert_eq!(
            Address::parse("/demo/~file/a.png"),
            Address::File {
                site: "demo".to_string(),
                filename: "a.png".to_string()
            }
        );
    }

    #[test]
    fn test_file_and_page_spaces_disjoint() {
        // The same path never decodes as both a file and a page address.
        match Address::parse("/demo/~file/a.png") {
            Address::File { .. } => {}
            other => panic!("expected file address, got {other:?}"),
        }
        // Without a third segment the reserved token reads as a page title;
        // such a page exists but is unreachable by direct URL once a third
        // segment appears. Defined edge case.
        assert_eq!(
            Address::parse("/demo/~file"),
            Address::Page {
                site: "demo".to_string(),
                title: "~file".to_string()
            }
        );
    }

    #[test]
    fn test_parse_ignores_extra_segments() {
        assert_eq!(
            Address::parse("/demo/Home/extra/bits"),
            Address::Page {
                site: "demo".to_string(),
                title: "Home".to_string()
            }
        );
        assert_eq!(
            Address::parse("/demo/~file/a.png/extra"),
            Address::File {
                site: "demo".to_string(),
                filename: "a.png".to_string()
            }
        );
    }

    #[test]
    fn test_page_url_forms() {
        assert_eq!(page_url("", ""), "/");
        assert_eq!(page_url("demo", ""), "/demo");
        assert_eq!(page_url("demo", "Home"), "/demo/Home");
        assert_eq!(page_url("my site", "A/B"), "/my%20site/A%2FB");
    }

    #[test]
    fn test_file_url_forms() {
        assert_eq!(file_url("", ""), "/");
        assert_eq!(file_url("demo", ""), "/demo");
        assert_eq!(file_url("demo", "a.png"), "/demo/~file/a.png");
    }

    #[test]
    fn test_url_parse_round_trip() {
        for (site, title) in [("demo", "Home"), ("my site", "100% notes"), ("a/b", "c d")] {
            let addr = Address::parse(&page_url(site, title));
            assert_eq!(
                addr,
                Address::Page {
                    site: site.to_string(),
                    title: title.to_string()
                }
            );
        }
        let addr = Address::parse(&file_url("my site", "img 1.png"));
        assert_eq!(
            addr,
            Address::File {
                site: "my site".to_string(),
                filename: "img 1.png".to_string()
            }
        );
    }
}
