//! Page body rendering: line normalization, markdown conversion, then
//! wiki-link rewriting scoped to the owning site.
//!
//! Rendering is stateless: the same stored body always yields the same
//! HTML. The output is final and must never be fed back through this
//! pipeline.

use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::{Captures, Regex};

use crate::store::naming::escape;
use crate::types::Site;

/// Strip carriage returns so stored bodies are canonical LF text. Applied
/// both before storage and before rendering.
pub fn normalize_text(s: &str) -> String {
    s.replace('\r', "")
}

/// Convert a normalized page body to HTML.
pub fn markdown_to_html(s: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(s, options);
    let mut out = String::with_capacity(s.len() * 2);
    html::push_html(&mut out, parser);
    out
}

// The embed pattern is a superset of the reference pattern, so it must be
// rewritten first; in the opposite order every embed would be mangled into
// a plain link with a dangling `!`.
static EMBED_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[\[(.+?)\]\]").unwrap());
static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.+?)\]\]").unwrap());

/// Rewrite the two wiki-link syntaxes in converted HTML into site-scoped
/// anchors and images:
///
/// - `![[file1.png]]` => `<img src="/sitename/~file/file1.png">`
/// - `[[Target Page]]` => `<a href="/sitename/Target Page">Target Page</a>`
///
/// A `~file/` prefix in a reference link is stripped from the displayed
/// text only; the href keeps the raw bracket contents so it resolves
/// through the reserved file address space.
pub fn rewrite_wiki_links(body: &str, site: &Site) -> String {
    let sitename = escape(&site.name);

    let body = EMBED_LINK.replace_all(body, |caps: &Captures| {
        format!("<img src=\"/{}/~file/{}\">", sitename, &caps[1])
    });

    let body = WIKI_LINK.replace_all(&body, |caps: &Captures| {
        let target = &caps[1];
        let display = target.strip_prefix("~file/").unwrap_or(target);
        format!("<a href=\"/{}/{}\">{}</a>", sitename, target, display)
    });

    body.into_owned()
}

/// Full pipeline for a stored page body. Without an owning site the link
/// rewrites have no scope and are skipped.
pub fn render_page(body: &str, site: Option<&Site>) -> String {
    let html = markdown_to_html(&normalize_text(body));
    match site {
        Some(site) => rewrite_wiki_links(&html, site),
        None => html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_site() -> Site {
        Site {
            site_id: 1,
            name: "demo".to_string(),
            desc: String::new(),
        }
    }

    #[test]
    fn test_normalize_strips_carriage_returns() {
        assert_eq!(normalize_text("a\r\nb\r\nc"), "a\nb\nc");
        assert_eq!(normalize_text("plain\n"), "plain\n");
    }

    #[test]
    fn test_markdown_basics() {
        let html = markdown_to_html("# Title\n\nsome *emphasis*");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_embed_rewrite() {
        let out = rewrite_wiki_links("![[a.png]]", &demo_site());
        assert_eq!(out, "<img src=\"/demo/~file/a.png\">");
    }

    #[test]
    fn test_reference_rewrite() {
        let out = rewrite_wiki_links("[[Target Page]]", &demo_site());
        assert_eq!(out, "<a href=\"/demo/Target Page\">Target Page</a>");
    }

    #[test]
    fn test_file_reference_strips_display_prefix_only() {
        let out = rewrite_wiki_links("[[~file/a.png]]", &demo_site());
        assert_eq!(out, "<a href=\"/demo/~file/a.png\">a.png</a>");
    }

    #[test]
    fn test_embed_rewritten_before_reference() {
        let out = rewrite_wiki_links("see ![[a.png]] and [[Other]]", &demo_site());
        assert!(out.contains("<img src=\"/demo/~file/a.png\">"));
        assert!(out.contains("<a href=\"/demo/Other\">Other</a>"));
        assert!(!out.contains("!<a"));
    }

    #[test]
    fn test_site_name_escaped_in_urls() {
        let site = Site {
            site_id: 2,
            name: "my site".to_string(),
            desc: String::new(),
        };
        let out = rewrite_wiki_links("[[Home]]", &site);
        assert_eq!(out, "<a href=\"/my%20site/Home\">Home</a>");
    }

    #[test]
    fn test_render_page_without_site_skips_rewrites() {
        let out = render_page("[[Target]]", None);
        assert!(out.contains("[[Target]]"));
        assert!(!out.contains("<a href"));
    }

    #[test]
    fn test_render_page_full_pipeline() {
        let out = render_page("intro\r\n\r\n![[a.png]]\r\n", Some(&demo_site()));
        assert!(out.contains("<p>intro</p>"));
        assert!(out.contains("<img src=\"/demo/~file/a.png\">"));
        // Deterministic: same body, same output.
        assert_eq!(out, render_page("intro\r\n\r\n![[a.png]]\r\n", Some(&demo_site())));
    }
}
