use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::error::Error;
use crate::server::html;
use crate::store::Store;
use crate::types::{Site, User};

/// 303 redirect to the canonical URL after a successful form POST.
pub fn see_other(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn html_page(body: String) -> Response {
    Html(body).into_response()
}

pub fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, message.to_string()).into_response()
}

/// Log an engine failure with context and answer with a generic message;
/// raw diagnostics never reach the remote caller.
pub fn storage_failure(context: &str, err: &Error) -> Response {
    tracing::error!("{context}: database error ({err})");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server database error.".to_string(),
    )
        .into_response()
}

/// Assemble a form page: breadcrumb menu, the form as the main column, and
/// the sites sidebar.
pub fn form_shell(
    store: &dyn Store,
    site: Option<&Site>,
    login: Option<&User>,
    title: &str,
    main: String,
) -> Response {
    let sites = match store.list_sites() {
        Ok(sites) => sites,
        Err(err) => return storage_failure("form_shell", &err),
    };
    let menu = html::menu_head(site, login);
    html_page(html::shell(title, &menu, &main, &html::sites_sidebar(&sites)))
}

/// Message shown inside a re-rendered form when a mutation fails. User
/// correctable errors keep their text; engine failures are logged and
/// replaced with a generic retry message.
pub fn form_errmsg(context: &str, err: &Error) -> String {
    match err {
        Error::DuplicateName(name) => format!("'{name}' already exists. Enter another name."),
        Error::Validation(msg) => msg.clone(),
        Error::NotFound => "Not found.".to_string(),
        _ => {
            tracing::error!("{context}: database error ({err})");
            "A problem occured. Please try again.".to_string()
        }
    }
}
