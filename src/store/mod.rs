pub mod naming;
mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Site creation and deletion are atomic units: the registry row and both
/// per-site tables appear and disappear together. Point lookups return
/// `Ok(None)` when the entity is absent, including lookups under a deleted
/// site's id; `Err` is reserved for engine failures and uniqueness
/// violations.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Site lifecycle (registry row + per-site table pair, all-or-nothing)
    fn create_site(&self, name: &str, desc: &str) -> Result<i64>;
    fn delete_site(&self, site_id: i64) -> Result<()>;
    fn update_site(&self, site: &Site) -> Result<()>;
    fn site_by_id(&self, site_id: i64) -> Result<Option<Site>>;
    fn site_by_name(&self, name: &str) -> Result<Option<Site>>;
    fn list_sites(&self) -> Result<Vec<Site>>;

    /// Fetch the site's landing page, materializing it on first request.
    /// A concurrent first visit loses the insert race benignly and reads
    /// back the winner's row.
    fn ensure_landing_page(&self, site: &Site) -> Result<Page>;

    // Page operations
    fn page_by_id(&self, site_id: i64, page_id: i64) -> Result<Option<Page>>;
    fn page_by_title(&self, site_id: i64, title: &str) -> Result<Option<Page>>;
    fn list_pages(&self, site_id: i64) -> Result<Vec<(i64, String)>>;
    fn create_page(&self, site_id: i64, title: &str, body: &str) -> Result<i64>;
    fn update_page(&self, site_id: i64, page_id: i64, title: &str, body: &str) -> Result<()>;
    fn delete_page(&self, site_id: i64, page_id: i64) -> Result<()>;

    // File operations
    fn file_by_name(&self, site_id: i64, filename: &str) -> Result<Option<FileRecord>>;
    fn list_files(&self, site_id: i64) -> Result<Vec<(i64, String)>>;
    fn create_file(&self, site_id: i64, filename: &str, bytes: &[u8]) -> Result<i64>;
    fn delete_files(&self, site_id: i64, file_ids: &[i64]) -> Result<()>;

    // Users are read-only to the wiki core
    fn user_by_id(&self, user_id: i64) -> Result<Option<User>>;
}
