//! HTML assembly helpers: the page shell, menus and form controls shared by
//! the browse and form handlers. Presentation glue only.

use std::fmt::Write;

use crate::server::address::{file_url, page_url};
use crate::types::{Site, User};

/// Escape text for interpolation into HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap the menu, main and sidebar columns in the page shell.
pub fn shell(title: &str, menu: &str, main: &str, sidebar: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" type=\"text/css\" href=\"/static/style.css\">\n\
         </head>\n<body class=\"text-black bg-white text-sm\">\n\
         <section class=\"flex flex-row py-4 mx-auto\">\n\
         <section class=\"col-menu flex flex-col text-xs px-4\">\n{}</section>\n\
         <section class=\"col-content flex-grow flex flex-col px-8\">\n{}</section>\n\
         <section class=\"col-sidebar flex flex-col text-xs px-8\">\n{}</section>\n\
         </section>\n</body>\n</html>\n",
        escape_html(title),
        menu,
        main,
        sidebar
    )
}

/// Breadcrumb and login status block at the top of the menu column.
pub fn menu_head(site: Option<&Site>, login: Option<&User>) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"flex flex-col mb-4\">\n<p class=\"italic\">\n<a href=\"/\">Home</a>\n");
    if let Some(site) = site {
        let _ = write!(
            out,
            "&gt; <a href=\"{}\">{}</a>\n",
            page_url(&site.name, ""),
            escape_html(&site.name)
        );
    }
    out.push_str("</p>\n<div>\n");
    match login {
        Some(user) => {
            let _ = write!(
                out,
                "<span class=\"pill mr-1\">{}</span>\n",
                escape_html(&user.username)
            );
        }
        None => out.push_str("<span class=\"text-gray-700 italic\">(not logged in)</span>\n"),
    }
    out.push_str("</div>\n</div>\n");
    out
}

/// A titled list of links; shows the note instead when there are no items.
pub fn menu_list(title: &str, items: &[(String, String)], empty_note: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<ul class=\"list-none mb-2\">\n<li><p class=\"border-b mb-1\">{}</p></li>\n",
        escape_html(title)
    );
    if items.is_empty() {
        let _ = write!(
            out,
            "<li><p class=\"text-gray-700 italic\">{}</p></li>\n",
            escape_html(empty_note)
        );
    }
    for (href, text) in items {
        let _ = write!(
            out,
            "<li><a class=\"text-blue-900\" href=\"{}\">{}</a></li>\n",
            href,
            escape_html(text)
        );
    }
    out.push_str("</ul>\n");
    out
}

/// The Pages and Files lists for the menu column.
pub fn site_lists(site: &Site, pages: &[(i64, String)], files: &[(i64, String)]) -> String {
    let page_items: Vec<(String, String)> = pages
        .iter()
        .map(|(_, title)| (page_url(&site.name, title), title.clone()))
        .collect();
    let file_items: Vec<(String, String)> = files
        .iter()
        .map(|(_, name)| (file_url(&site.name, name), name.clone()))
        .collect();

    let mut out = menu_list("Pages", &page_items, "(no pages yet)");
    out.push_str(&menu_list("Files", &file_items, "(no files yet)"));
    out
}

/// The sidebar column: every site in the registry.
pub fn sites_sidebar(sites: &[Site]) -> String {
    let items: Vec<(String, String)> = sites
        .iter()
        .map(|s| (page_url(&s.name, ""), s.name.clone()))
        .collect();
    menu_list("Sites", &items, "(no sites yet)")
}

pub fn page_nav(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    format!(
        "<nav class=\"flex flex-row justify-between border-b border-gray-500 pb-1 mb-4\">\n\
         <h1 class=\"font-bold text-xl\">{}</h1>\n</nav>\n",
        escape_html(title)
    )
}

/// Rendered page markup wrapped in the content container. The markup is
/// final HTML from the rendering pipeline, not escaped again.
pub fn content_div(markup: &str) -> String {
    format!("<div class=\"content\">\n{markup}\n</div>\n")
}

// Form controls

pub fn form_head(action: &str, multipart: bool) -> String {
    let enctype = if multipart {
        " enctype=\"multipart/form-data\""
    } else {
        ""
    };
    format!("<form class=\"max-w-2xl\" method=\"post\" action=\"{action}\"{enctype}>\n")
}

pub fn form_foot() -> String {
    "</form>\n".to_string()
}

pub fn form_title(title: &str) -> String {
    format!("<h1 class=\"font-bold mb-4\">{}</h1>\n", escape_html(title))
}

pub fn form_error(errmsg: &str) -> String {
    if errmsg.is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"mb-2\"><p class=\"text-red-500 italic\">{}</p></div>\n",
        escape_html(errmsg)
    )
}

pub fn form_input(id: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"mb-2\">\n<label class=\"lbl\" for=\"{id}\">{}</label>\n\
         <input class=\"input w-full\" id=\"{id}\" name=\"{id}\" type=\"text\" value=\"{}\">\n</div>\n",
        escape_html(label),
        escape_html(value)
    )
}

pub fn form_textarea(id: &str, label: &str, value: &str, rows: u32) -> String {
    format!(
        "<div class=\"mb-2\">\n<label class=\"lbl\" for=\"{id}\">{}</label>\n\
         <textarea class=\"input w-full\" id=\"{id}\" name=\"{id}\" rows=\"{rows}\">{}</textarea>\n</div>\n",
        escape_html(label),
        escape_html(value)
    )
}

pub fn form_file(id: &str, label: &str) -> String {
    format!(
        "<div class=\"mb-2\">\n<label class=\"lbl\" for=\"{id}\">{}</label>\n\
         <input class=\"input w-full\" id=\"{id}\" name=\"{id}\" type=\"file\">\n</div>\n",
        escape_html(label)
    )
}

pub fn form_checkbox(id: &str, label: &str, checked: bool) -> String {
    let checked_attr = if checked { " checked" } else { "" };
    format!(
        "<div class=\"mb-2\">\n\
         <input id=\"{id}\" name=\"{id}\" type=\"checkbox\" value=\"y\"{checked_attr}>\n\
         <label class=\"mr-2\" for=\"{id}\">{}</label>\n</div>\n",
        escape_html(label)
    )
}

pub fn form_submit(id: &str, label: &str) -> String {
    format!(
        "<div class=\"mb-2\">\n<button class=\"btn\" id=\"{id}\" name=\"{id}\" type=\"submit\">{}</button>\n</div>\n",
        escape_html(label)
    )
}
