use super::naming::{file_table_name, page_table_name};

/// Registry schema. Per-site content lives in dynamically named table
/// pairs created alongside each `site` row; see the builders below.
pub const SCHEMA: &str = r#"
-- Sites are isolated content tenants
CREATE TABLE IF NOT EXISTS site (
    site_id INTEGER PRIMARY KEY NOT NULL,
    sitename TEXT NOT NULL UNIQUE,
    desc TEXT NOT NULL DEFAULT ''
);

-- Editor accounts; the wiki core only reads these to gate mutations
CREATE TABLE IF NOT EXISTS user (
    user_id INTEGER PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 1,
    email TEXT NOT NULL DEFAULT ''
);

INSERT OR IGNORE INTO user (user_id, username, password, active, email)
    VALUES (1, 'admin', '', 1, '');
"#;

/// DDL for the page table owned by the given site. Column shape
/// (page_id/title/body) is a compatibility surface and must not change.
pub fn create_page_table_sql(site_id: i64) -> String {
    format!(
        "CREATE TABLE {} (page_id INTEGER PRIMARY KEY NOT NULL, title TEXT NOT NULL UNIQUE, body TEXT NOT NULL)",
        page_table_name(site_id)
    )
}

/// DDL for the file table owned by the given site. Column shape
/// (file_id/filename/bytes) is a compatibility surface and must not change.
pub fn create_file_table_sql(site_id: i64) -> String {
    format!(
        "CREATE TABLE {} (file_id INTEGER PRIMARY KEY NOT NULL, filename TEXT NOT NULL UNIQUE, bytes BLOB NOT NULL)",
        file_table_name(site_id)
    )
}

pub fn drop_page_table_sql(site_id: i64) -> String {
    format!("DROP TABLE {}", page_table_name(site_id))
}

pub fn drop_file_table_sql(site_id: i64) -> String {
    format!("DROP TABLE {}", file_table_name(site_id))
}
