//! Site create/edit/delete forms. Every mutation is gated by an active
//! authenticated user before the store is touched.

use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::auth::RequireUser;
use crate::error::Result;
use crate::render::{normalize_text, render_page};
use crate::server::AppState;
use crate::server::address::page_url;
use crate::server::html;
use crate::server::response::{form_errmsg, form_shell, not_found, see_other, storage_failure};
use crate::server::validation::require_field;
use crate::types::Site;

#[derive(Debug, Deserialize)]
pub struct SiteQuery {
    pub siteid: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SiteForm {
    #[serde(default)]
    pub sitename: String,
    #[serde(default)]
    pub desc: String,
}

fn create_site_page(sitename: &str, desc: &str, errmsg: &str) -> String {
    let mut main = html::form_head("/createsite", false);
    main.push_str(&html::form_title("Create site"));
    main.push_str(&html::form_error(errmsg));
    main.push_str(&html::form_input(
        "sitename",
        "Sitename (enter a unique site name)",
        sitename,
    ));
    main.push_str(&html::form_textarea("desc", "Description", desc, 10));
    main.push_str(&html::form_submit("create", "Create"));
    main.push_str(&html::form_foot());
    main
}

pub async fn create_site_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
) -> Response {
    let main = create_site_page("", "", "");
    form_shell(state.store.as_ref(), None, Some(&login), "Create Site", main)
}

pub async fn create_site_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Form(form): Form<SiteForm>,
) -> Response {
    let desc = normalize_text(form.desc.trim());

    let created: Result<String> = require_field(&form.sitename, "site name")
        .and_then(|name| state.store.create_site(&name, &desc).map(|_| name));

    match created {
        Ok(name) => see_other(&page_url(&name, "")),
        Err(err) => {
            let errmsg = form_errmsg("create_site", &err);
            let main = create_site_page(form.sitename.trim(), &desc, &errmsg);
            form_shell(state.store.as_ref(), None, Some(&login), "Create Site", main)
        }
    }
}

fn edit_site_page(site: &Site, sitename: &str, desc: &str, errmsg: &str) -> String {
    let mut main = html::form_head(&format!("/editsite?siteid={}", site.site_id), false);
    main.push_str(&html::form_title("Edit site"));
    main.push_str(&html::form_error(errmsg));
    main.push_str(&html::form_input(
        "sitename",
        "Sitename (unique sitename required)",
        sitename,
    ));
    main.push_str(&html::form_textarea("desc", "Description", desc, 10));
    main.push_str(&html::form_submit("update", "Update"));
    main.push_str(&html::form_foot());
    main
}

fn load_site(state: &AppState, site_id: i64) -> std::result::Result<Site, Response> {
    match state.store.site_by_id(site_id) {
        Ok(Some(site)) => Ok(site),
        Ok(None) => Err(not_found(&format!("siteid {site_id} not found."))),
        Err(err) => Err(storage_failure("load_site", &err)),
    }
}

pub async fn edit_site_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    let mut main = edit_site_page(&site, &site.name, &site.desc, "");
    main.push_str(&html::menu_list(
        "Actions",
        &[(
            format!("/delsite?siteid={}", site.site_id),
            "Delete Site".to_string(),
        )],
        "",
    ));
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Edit Site", main)
}

pub async fn edit_site_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
    Form(form): Form<SiteForm>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    let desc = normalize_text(form.desc.trim());
    let updated: Result<Site> = require_field(&form.sitename, "site name").and_then(|name| {
        let updated = Site {
            site_id: site.site_id,
            name,
            desc: desc.clone(),
        };
        state.store.update_site(&updated)?;
        Ok(updated)
    });

    match updated {
        Ok(updated) => see_other(&page_url(&updated.name, "")),
        Err(err) => {
            let errmsg = form_errmsg("edit_site", &err);
            let main = edit_site_page(&site, form.sitename.trim(), &desc, &errmsg);
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Edit Site", main)
        }
    }
}

fn delete_site_page(site: &Site, errmsg: &str) -> String {
    let mut main = html::form_head(&format!("/delsite?siteid={}", site.site_id), false);
    main.push_str(&html::form_error(errmsg));
    main.push_str(&html::form_submit("delete", "Delete Site"));
    main.push_str("<div class=\"border p-2\">\n");
    main.push_str(&html::form_title(&site.name));
    // Preview only; no owning-site scope is applied to the description.
    main.push_str(&html::content_div(&render_page(&site.desc, None)));
    main.push_str("</div>\n");
    main.push_str(&html::form_foot());
    main
}

pub async fn delete_site_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let main = delete_site_page(&site, "");
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Delete Site", main)
}

pub async fn delete_site_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    match state.store.delete_site(site.site_id) {
        Ok(()) => see_other("/"),
        Err(err) => {
            let errmsg = form_errmsg("delete_site", &err);
            let main = delete_site_page(&site, &errmsg);
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Delete Site", main)
        }
    }
}
