//! File upload and batch deletion forms.

use std::sync::Arc;

use axum::{
    extract::{Form, Multipart, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::auth::RequireUser;
use crate::error::{Error, Result};
use crate::server::AppState;
use crate::server::html;
use crate::server::response::{form_errmsg, form_shell, not_found, see_other, storage_failure};
use crate::types::Site;

#[derive(Debug, Deserialize)]
pub struct SiteQuery {
    pub siteid: i64,
}

fn load_site(state: &AppState, site_id: i64) -> std::result::Result<Site, Response> {
    match state.store.site_by_id(site_id) {
        Ok(Some(site)) => Ok(site),
        Ok(None) => Err(not_found(&format!("siteid {site_id} not found."))),
        Err(err) => Err(storage_failure("load_site", &err)),
    }
}

fn upload_file_page(site: &Site, errmsg: &str) -> String {
    let mut main = html::form_head(&format!("/uploadfile?siteid={}", site.site_id), true);
    main.push_str(&html::form_title("Upload File"));
    main.push_str(&html::form_error(errmsg));
    main.push_str(&html::form_file("file", "Upload file"));
    main.push_str(&html::form_submit("upload", "Upload"));
    main.push_str(&html::form_foot());
    main.push_str(&html::menu_list(
        "Actions",
        &[(
            format!("/delfile?siteid={}", site.site_id),
            "Delete Files".to_string(),
        )],
        "",
    ));
    main
}

pub async fn upload_file_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let main = upload_file_page(&site, "");
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Upload File", main)
}

/// Pull the uploaded `file` field out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Upload failed: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::Validation("Please select a file to upload.".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Upload failed: {e}")))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(Error::Validation(
        "Please select a file to upload.".to_string(),
    ))
}

pub async fn upload_file_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
    mut multipart: Multipart,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    let stored: Result<()> = match read_upload(&mut multipart).await {
        Ok((filename, bytes)) => state
            .store
            .create_file(site.site_id, &filename, &bytes)
            .map(|_| ()),
        Err(err) => Err(err),
    };

    match stored {
        Ok(()) => see_other(&format!("/uploadfile?siteid={}", site.site_id)),
        Err(err) => {
            let errmsg = form_errmsg("upload_file", &err);
            let main = upload_file_page(&site, &errmsg);
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Upload File", main)
        }
    }
}

fn delete_files_page(site: &Site, files: &[(i64, String)], errmsg: &str) -> String {
    let mut main = html::form_head(&format!("/delfile?siteid={}", site.site_id), false);
    main.push_str(&html::form_title("Delete Files"));
    main.push_str(&html::form_error(errmsg));
    if files.is_empty() {
        main.push_str("<p class=\"text-gray-700 italic\">(no files yet)</p>\n");
    }
    for (file_id, filename) in files {
        main.push_str(&html::form_checkbox(&format!("chk-{file_id}"), filename, false));
    }
    if !files.is_empty() {
        main.push_str(&html::form_submit("del", "Delete"));
    }
    main.push_str(&html::form_foot());
    main
}

pub async fn delete_files_form(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };
    let files = match state.store.list_files(site.site_id) {
        Ok(files) => files,
        Err(err) => return storage_failure("delete_files_form", &err),
    };
    let main = delete_files_page(&site, &files, "");
    form_shell(state.store.as_ref(), Some(&site), Some(&login), "Delete Files", main)
}

/// Checked files arrive as `chk-<fileid>=y` fields; everything else in the
/// form body is ignored.
fn checked_file_ids(fields: &[(String, String)]) -> Vec<i64> {
    fields
        .iter()
        .filter_map(|(key, _)| key.strip_prefix("chk-")?.parse::<i64>().ok())
        .collect()
}

pub async fn delete_files_submit(
    RequireUser(login): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SiteQuery>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let site = match load_site(&state, query.siteid) {
        Ok(site) => site,
        Err(resp) => return resp,
    };

    let file_ids = checked_file_ids(&fields);
    match state.store.delete_files(site.site_id, &file_ids) {
        Ok(()) => see_other(&format!("/uploadfile?siteid={}", site.site_id)),
        Err(err) => {
            let errmsg = form_errmsg("delete_files", &err);
            let files = state.store.list_files(site.site_id).unwrap_or_default();
            let main = delete_files_page(&site, &files, &errmsg);
            form_shell(state.store.as_ref(), Some(&site), Some(&login), "Delete Files", main)
        }
    }
}
