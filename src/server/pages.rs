//! Page create/edit/delete forms.

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
use crate::types::{Page, Site};

#[derive(Debug, Deserialize)]
pub struct CreatePageQuery {
    pub siteid: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub siteid: i64,
    pub pageid: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

fn load_site(state: &AppState, site_id: i64) -> std::result::Result<Site, Response> {
    match state.store.site_by_id(site_id) {
        Ok(Some(site)) => Ok(site),
        Ok(None) => Err(not_found(&format!("siteid {site_id} not found."))),
        Err(err) => Err(storage_failure("load_site", &err)),
    }
}

fn load_page(state: &AppState, site_id: i64, page_id: i64) -> std::result::Result<Page, Response> {
    match state.store.page_by_id(site_id, page_id) {
        Ok(Some(page)) => Ok(page),
        Ok(None) => Err(not_found(&format!("pageid {page_id} not found."))),
        Err(err) => Err(storage_failure("load_page", &err)),
    }
}

fn page_form(action: &str, heading: &str, title: &str, body: &str, errmsg: &str, submit: (&str, &str)) -> String {
    let mut main = html::form_head(action, false);
    main.push_str(&html::form_title(heading));
    main.push_str(&html::form_error(errmsg));
    main.push_str(&html::form_input("title", "Title", title));
    main.push_str(&html::form_textarea("body", "Body", body, 25));
    main.push_str(&html::form_submit(submit.0, submit.1));
    main.push_str(&html::form_foot());
    main
}

pub async fn create_page_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreatePageQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    let action = format!("/createpage?siteid={}", site.site_id);
    // The title may be pre-filled from a "create this missing page" link.
    let main = page_form(&action, "Create Page", query.title.trim(), "", "", ("create", "Create"));
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Create Page", main)
}

pub async fn create_page_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreatePageQuery>,
    Form(form): Form<PageForm>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    let body = normalize_text(&form.body);
    let created: Result<String> = require_field(&form.title, "page title").and_then(|title| {
        state.store.create_page(site.site_id, &title, &body)?;
        Ok(title)
    });

    match created {
        Ok(title) => see_other(&page_url(&site.name, &title)),
        Err(err) => {
            let errmsg = form_errmsg("create_page", &err);
            let action = format!("/createpage?siteid={}", site.site_id);
            let main = page_form(&action, "Create Page", form.title.trim(), &body, &errmsg, ("create", "Create"));
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Create Page", main)
        }
    }
}

pub async fn edit_page_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let page = match load_page(&state, site.site_id, query.pageid) {
        Ok(page) => page,
        Err(resp) => return resp,
    };

    let action = format!("/editpage?siteid={}&pageid={}", site.site_id, page.page_id);
    let mut main = page_form(&action, "Edit Page", &page.title, &page.body, "", ("update", "Update"));
    main.push_str(&html::menu_list(
        "Actions",
        &[(
            format!("/delpage?siteid={}&pageid={}", site.site_id, page.page_id),
            "Delete Page".to_string(),
        )],
        "",
    ));
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Edit Page", main)
}

pub async fn edit_page_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    Form(form): Form<PageForm>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let page = match load_page(&state, site.site_id, query.pageid) {
        Ok(page) => page,
        Err(resp) => return resp,
    };

    let body = normalize_text(&form.body);
    let updated: Result<String> = require_field(&form.title, "page title").and_then(|title| {
        state
            .store
            .update_page(site.site_id, page.page_id, &title, &body)?;
        Ok(title)
    });

    match updated {
        Ok(title) => see_other(&page_url(&site.name, &title)),
        Err(err) => {
            let errmsg = form_errmsg("edit_page", &err);
            let action = format!("/editpage?siteid={}&pageid={}", site.site_id, page.page_id);
            let main = page_form(&action, "Edit Page", form.title.trim(), &body, &errmsg, ("update", "Update"));
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Edit Page", main)
        }
    }
}

fn delete_page_page(site: &Site, page: &Page, errmsg: &str) -> String {
    let action = format!("/delpage?siteid={}&pageid={}", site.site_id, page.page_id);
    let mut main = html::form_head(&action, false);
    main.push_str(&html::form_error(errmsg));
    main.push_str(&html::form_submit("delete", "Delete Page"));
    main.push_str("<div class=\"border p-2\">\n");
    main.push_str(&html::form_title(&page.title));
    // Confirmation preview: markdown only, no site-scoped link rewriting.
    main.push_str(&html::content_div(&render_page(&page.body, None)));
    main.push_str("</div>\n");
    main.push_str(&html::form_foot());
    main
}

pub async fn delete_page_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let page = match load_page(&state, site.site_id, query.pageid) {
        Ok(page) => page,
        Err(resp) => return resp,
    };
    let main = delete_page_page(&site, &page, "");
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Delete Page", main)
}

pub async fn delete_page_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let page = match load_page(&state, site.site_id, query.pageid) {
        Ok(page) => page,
        Err(resp) => return resp,
    };

    match state.store.delete_page(site.site_id, page.page_id) {
        Ok(()) => see_other(&page_url(&site.name, "")),
        Err(err) => {
            let errmsg = form_errmsg("delete_page", &err);
            let main = delete_page_page(&site, &page, &errmsg);
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Delete Page", main)
        }
    }
}
