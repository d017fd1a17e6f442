//! The fallback handler: every path that is not a form endpoint is a
//! content address and resolves to a site index, a page view, or a file
//! download.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Uri, header},
    response::{IntoResponse, Response},
};

use crate::auth::OptionalUser;
use crate::error::Result;
use crate::render::render_page;
use crate::server::AppState;
use crate::server::address::Address;
use crate::server::html;
use crate::server::response::{html_page, not_found, storage_failure};
use crate::store::Store;
use crate::store::naming::escape;
use crate::types::{Page, Site, User};

pub async fn browse(
    State(state): State<Arc<AppState>>,
    OptionalUser(login): OptionalUser,
    uri: Uri,
) -> Response {
    let store = state.store.as_ref();
    match Address::parse(uri.path()) {
        Address::File { site, filename } => serve_file(store, &site, &filename),
        Address::SiteIndex => site_index(store, login.as_ref()),
        Address::Page { site, title } => page_view(store, login.as_ref(), &site, &title),
    }
}

/// Outcome of resolving a page address within a known site.
enum Resolution {
    Found(Page),
    Missing { requested_title: String },
}

/// Page resolution precedence: an explicit title is looked up as-is; an
/// empty title addresses the landing page, which is materialized on first
/// visit.
fn resolve_page(store: &dyn Store, site: &Site, title: &str) -> Result<Resolution> {
    if !title.is_empty() {
        return Ok(match store.page_by_title(site.site_id, title)? {
            Some(page) => Resolution::Found(page),
            None => Resolution::Missing {
                requested_title: title.to_string(),
            },
        });
    }
    store.ensure_landing_page(site).map(Resolution::Found)
}

fn site_index(store: &dyn Store, login: Option<&User>) -> Response {
    let sites = match store.list_sites() {
        Ok(sites) => sites,
        Err(err) => return storage_failure("site_index", &err),
    };

    let mut menu = html::menu_head(None, login);
    menu.push_str(&html::menu_list(
        "Actions",
        &[("/createsite".to_string(), "Create Site".to_string())],
        "",
    ));

    html_page(html::shell("warren", &menu, "", &html::sites_sidebar(&sites)))
}

fn page_view(store: &dyn Store, login: Option<&User>, sitename: &str, title: &str) -> Response {
    let site = match store.site_by_name(sitename) {
        Ok(Some(site)) => site,
        Ok(None) => return not_found(&format!("Site '{sitename}' not found.")),
        Err(err) => return storage_failure("page_view", &err),
    };

    let resolution = match resolve_page(store, &site, title) {
        Ok(resolution) => resolution,
        Err(err) => return storage_failure("page_view", &err),
    };

    let pages = store.list_pages(site.site_id).unwrap_or_else(|err| {
        tracing::error!("page_view: list_pages failed ({err})");
        Vec::new()
    });
    let files = store.list_files(site.site_id).unwrap_or_else(|err| {
        tracing::error!("page_view: list_files failed ({err})");
        Vec::new()
    });

    let mut actions = vec![
        (
            format!("/editsite?siteid={}", site.site_id),
            "Site Settings".to_string(),
        ),
        (
            format!("/uploadfile?siteid={}", site.site_id),
            "Upload Files".to_string(),
        ),
    ];

    let (nav_title, main_content) = match &resolution {
        Resolution::Found(page) => {
            actions.push((
                format!("/createpage?siteid={}", site.site_id),
                "Create Page".to_string(),
            ));
            actions.push((
                format!("/editpage?siteid={}&pageid={}", site.site_id, page.page_id),
                "Edit Page".to_string(),
            ));
            let rendered = render_page(&page.body, Some(&site));
            (page.title.clone(), html::content_div(&rendered))
        }
        Resolution::Missing { requested_title } => {
            actions.push((
                format!(
                    "/createpage?siteid={}&title={}",
                    site.site_id,
                    escape(requested_title)
                ),
                format!("Create page '{requested_title}'"),
            ));
            (
                requested_title.clone(),
                html::content_div("<p class=\"italic\">(Page not found)</p>"),
            )
        }
    };

    let sites = store.list_sites().unwrap_or_else(|err| {
        tracing::error!("page_view: list_sites failed ({err})");
        Vec::new()
    });

    let mut menu = html::menu_head(Some(&site), login);
    menu.push_str(&html::menu_list("Actions", &actions, ""));
    menu.push_str(&html::site_lists(&site, &pages, &files));

    let main = format!("{}{}", html::page_nav(&nav_title), main_content);

    html_page(html::shell("warren", &menu, &main, &html::sites_sidebar(&sites)))
}

fn serve_file(store: &dyn Store, sitename: &str, filename: &str) -> Response {
    if sitename.is_empty() || filename.is_empty() {
        return not_found("Bad file address.");
    }

    let site = match store.site_by_name(sitename) {
        Ok(Some(site)) => site,
        Ok(None) => return not_found(&format!("Site '{sitename}' not found.")),
        Err(err) => return storage_failure("serve_file", &err),
    };

    let file = match store.file_by_name(site.site_id, filename) {
        Ok(Some(file)) => file,
        Ok(None) => return not_found(&format!("File '{filename}' not found.")),
        Err(err) => return storage_failure("serve_file", &err),
    };

    (
        [(header::CONTENT_TYPE, content_type(&file.filename))],
        file.bytes,
    )
        .into_response()
}

fn content_type(filename: &str) -> String {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => return "application/octet-stream".to_string(),
    };
    match ext.as_str() {
        "png" | "gif" | "bmp" | "webp" => format!("image/{ext}"),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "pdf" => "application/pdf".to_string(),
        "txt" | "md" => "text/plain; charset=utf-8".to_string(),
        _ => "application/octet-stream".to_string(),
    }
}
