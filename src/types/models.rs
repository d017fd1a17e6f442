use serde::{Deserialize, Serialize};

/// An isolated content tenant. The numeric id is stable for the lifetime of
/// the site and is the only input to per-site table naming; the name is
/// user-editable and unique across all sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub site_id: i64,
    pub name: String,
    pub desc: String,
}

/// A wiki page, owned by exactly one site. Titles are unique within the
/// owning site. Page id 1 is reserved for the site's landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub page_id: i64,
    pub title: String,
    pub body: String,
}

/// An uploaded file, owned by exactly one site. Filenames are unique within
/// the owning site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: i64,
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// An editor account. Read-only to the wiki core; only used to gate
/// mutating operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub active: bool,
    pub email: String,
}

/// Reserved page id for a site's landing page.
pub const LANDING_PAGE_ID: i64 = 1;

/// Body used when the landing page is materialized on first visit.
pub const DEFAULT_LANDING_BODY: &str = "(Edit this page to fill in start page content)";
