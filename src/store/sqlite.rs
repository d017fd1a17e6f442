use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::Store;
use super::naming::{file_table_name, page_table_name};
use super::schema::{
    SCHEMA, create_file_table_sql, create_page_table_sql, drop_file_table_sql,
    drop_page_table_sql,
};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

/// Map a UNIQUE violation to `DuplicateName`, leaving other engine errors
/// as `Database`.
fn map_unique(err: rusqlite::Error, name: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::DuplicateName(name.to_string())
        }
        e => Error::from(e),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// A per-site table that no longer exists means the owning site was
/// deleted; lookups under it are ordinary misses, not engine failures.
fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table")
    )
}

fn missing_table_as_none<T>(
    result: std::result::Result<Option<T>, rusqlite::Error>,
) -> Result<Option<T>> {
    match result {
        Err(e) if is_missing_table(&e) => Ok(None),
        other => other.map_err(Error::from),
    }
}

/// Error mapping for per-site mutations: a dropped table reads as
/// `NotFound`, a UNIQUE violation as `DuplicateName`.
fn map_mutation(err: rusqlite::Error, name: &str) -> Error {
    if is_missing_table(&err) {
        return Error::NotFound;
    }
    map_unique(err, name)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Site lifecycle

    fn create_site(&self, name: &str, desc: &str) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO site (sitename, desc) VALUES (?1, ?2)",
            params![name, desc],
        )
        .map_err(|e| map_unique(e, name))?;
        let site_id = tx.last_insert_rowid();

        // Dropping the transaction on any failure below rolls back the
        // registry row, so the row is never visible without its tables.
        tx.execute_batch(&create_page_table_sql(site_id))?;
        tx.execute_batch(&create_file_table_sql(site_id))?;

        tx.commit()?;
        Ok(site_id)
    }

    fn delete_site(&self, site_id: i64) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute("DELETE FROM site WHERE site_id = ?1", params![site_id])?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        tx.execute_batch(&drop_page_table_sql(site_id))?;
        tx.execute_batch(&drop_file_table_sql(site_id))?;

        tx.commit()?;
        Ok(())
    }

    fn update_site(&self, site: &Site) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE site SET sitename = ?1, desc = ?2 WHERE site_id = ?3",
                params![site.name, site.desc, site.site_id],
            )
            .map_err(|e| map_unique(e, &site.name))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn site_by_id(&self, site_id: i64) -> Result<Option<Site>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT site_id, sitename, desc FROM site WHERE site_id = ?1",
            params![site_id],
            |row| {
                Ok(Site {
                    site_id: row.get(0)?,
                    name: row.get(1)?,
                    desc: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn site_by_name(&self, name: &str) -> Result<Option<Site>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT site_id, sitename, desc FROM site WHERE sitename = ?1",
            params![name],
            |row| {
                Ok(Site {
                    site_id: row.get(0)?,
                    name: row.get(1)?,
                    desc: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT site_id, sitename, desc FROM site ORDER BY site_id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Site {
                site_id: row.get(0)?,
                name: row.get(1)?,
                desc: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn ensure_landing_page(&self, site: &Site) -> Result<Page> {
        if let Some(page) = self.page_by_id(site.site_id, LANDING_PAGE_ID)? {
            return Ok(page);
        }

        let title = format!("{} start page", site.name);
        let sql = format!(
            "INSERT INTO {} (page_id, title, body) VALUES (?1, ?2, ?3)",
            page_table_name(site.site_id)
        );
        let result = self
            .conn()
            .execute(&sql, params![LANDING_PAGE_ID, title, DEFAULT_LANDING_BODY]);

        match result {
            Ok(_) => Ok(Page {
                page_id: LANDING_PAGE_ID,
                title,
                body: DEFAULT_LANDING_BODY.to_string(),
            }),
            // A concurrent first visit won the insert; read back its row.
            Err(ref e) if is_unique_violation(e) => self
                .page_by_id(site.site_id, LANDING_PAGE_ID)?
                .ok_or(Error::NotFound),
            Err(e) => Err(map_mutation(e, &title)),
        }
    }

    // Page operations

    fn page_by_id(&self, site_id: i64, page_id: i64) -> Result<Option<Page>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT page_id, title, body FROM {} WHERE page_id = ?1",
            page_table_name(site_id)
        );
        missing_table_as_none(
            conn.query_row(&sql, params![page_id], |row| {
                Ok(Page {
                    page_id: row.get(0)?,
                    title: row.get(1)?,
                    body: row.get(2)?,
                })
            })
            .optional(),
        )
    }

    fn page_by_title(&self, site_id: i64, title: &str) -> Result<Option<Page>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT page_id, title, body FROM {} WHERE title = ?1",
            page_table_name(site_id)
        );
        missing_table_as_none(
            conn.query_row(&sql, params![title], |row| {
                Ok(Page {
                    page_id: row.get(0)?,
                    title: row.get(1)?,
                    body: row.get(2)?,
                })
            })
            .optional(),
        )
    }

    fn list_pages(&self, site_id: i64) -> Result<Vec<(i64, String)>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT page_id, title FROM {} ORDER BY title",
            page_table_name(site_id)
        );
        let mut stmt = match conn.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_page(&self, site_id: i64, title: &str, body: &str) -> Result<i64> {
        let conn = self.conn();
        let sql = format!(
            "INSERT INTO {} (title, body) VALUES (?1, ?2)",
            page_table_name(site_id)
        );
        conn.execute(&sql, params![title, body])
            .map_err(|e| map_mutation(e, title))?;
        Ok(conn.last_insert_rowid())
    }

    fn update_page(&self, site_id: i64, page_id: i64, title: &str, body: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET title = ?1, body = ?2 WHERE page_id = ?3",
            page_table_name(site_id)
        );
        let rows = self
            .conn()
            .execute(&sql, params![title, body, page_id])
            .map_err(|e| map_mutation(e, title))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_page(&self, site_id: i64, page_id: i64) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE page_id = ?1",
            page_table_name(site_id)
        );
        let rows = self
            .conn()
            .execute(&sql, params![page_id])
            .map_err(|e| map_mutation(e, ""))?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // File operations

    fn file_by_name(&self, site_id: i64, filename: &str) -> Result<Option<FileRecord>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT file_id, filename, bytes FROM {} WHERE filename = ?1",
            file_table_name(site_id)
        );
        missing_table_as_none(
            conn.query_row(&sql, params![filename], |row| {
                Ok(FileRecord {
                    file_id: row.get(0)?,
                    filename: row.get(1)?,
                    bytes: row.get(2)?,
                })
            })
            .optional(),
        )
    }

    fn list_files(&self, site_id: i64) -> Result<Vec<(i64, String)>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT file_id, filename FROM {} ORDER BY filename",
            file_table_name(site_id)
        );
        let mut stmt = match conn.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(e) if is_missing_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_file(&self, site_id: i64, filename: &str, bytes: &[u8]) -> Result<i64> {
        let conn = self.conn();
        let sql = format!(
            "INSERT INTO {} (filename, bytes) VALUES (?1, ?2)",
            file_table_name(site_id)
        );
        conn.execute(&sql, params![filename, bytes])
            .map_err(|e| map_mutation(e, filename))?;
        Ok(conn.last_insert_rowid())
    }

    fn delete_files(&self, site_id: i64, file_ids: &[i64]) -> Result<()> {
        if file_ids.is_empty() {
            return Ok(());
        }
        let placeholders = (1..=file_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "DELETE FROM {} WHERE file_id IN ({placeholders})",
            file_table_name(site_id)
        );
        self.conn()
            .execute(&sql, params_from_iter(file_ids.iter()))
            .map_err(|e| map_mutation(e, ""))?;
        Ok(())
    }

    // User operations

    fn user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT user_id, username, active, email FROM user WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    active: row.get(2)?,
                    email: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::open(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn table_names(store: &SqliteStore) -> Vec<String> {
        let conn = store.conn();
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_initialize_creates_registry() {
        let (_temp, store) = test_store();

        let tables = table_names(&store);
        assert!(tables.contains(&"site".to_string()));
        assert!(tables.contains(&"user".to_string()));

        // initialize seeds the admin account
        let admin = store.user_by_id(1).unwrap().unwrap();
        assert_eq!(admin.username, "admin");
        assert!(admin.active);
    }

    #[test]
    fn test_create_site_creates_both_tables() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "a demo site").unwrap();

        let site = store.site_by_name("demo").unwrap().unwrap();
        assert_eq!(site.site_id, site_id);

        let tables = table_names(&store);
        assert!(tables.contains(&page_table_name(site_id)));
        assert!(tables.contains(&file_table_name(site_id)));

        // Both containers start empty but queryable.
        assert!(store.list_pages(site_id).unwrap().is_empty());
        assert!(store.list_files(site_id).unwrap().is_empty());
    }

    #[test]
    fn test_create_site_duplicate_name() {
        let (_temp, store) = test_store();

        store.create_site("demo", "").unwrap();
        let result = store.create_site("demo", "again");
        assert!(matches!(result, Err(Error::DuplicateName(_))));

        // The failed attempt must not leave stray tables behind.
        let site = store.site_by_name("demo").unwrap().unwrap();
        let expected = 2 + 2; // site + user + one table pair
        assert_eq!(table_names(&store).len(), expected);
        assert_eq!(store.list_sites().unwrap().len(), 1);
        assert!(store.site_by_id(site.site_id).unwrap().is_some());
    }

    #[test]
    fn test_delete_site_drops_both_tables() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "").unwrap();
        store.create_page(site_id, "Home", "hello").unwrap();
        store.create_file(site_id, "a.png", b"\x89PNG").unwrap();

        store.delete_site(site_id).unwrap();

        assert!(store.site_by_id(site_id).unwrap().is_none());
        let tables = table_names(&store);
        assert!(!tables.contains(&page_table_name(site_id)));
        assert!(!tables.contains(&file_table_name(site_id)));
    }

    #[test]
    fn test_deleted_site_lookups_are_not_found() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "").unwrap();
        store.create_page(site_id, "Home", "hello").unwrap();
        store.create_file(site_id, "a.png", b"\x89PNG").unwrap();
        store.delete_site(site_id).unwrap();

        // Reads under the dead site are ordinary misses, not engine errors.
        assert!(store.page_by_id(site_id, 1).unwrap().is_none());
        assert!(store.page_by_title(site_id, "Home").unwrap().is_none());
        assert!(store.file_by_name(site_id, "a.png").unwrap().is_none());
        assert!(store.list_pages(site_id).unwrap().is_empty());
        assert!(store.list_files(site_id).unwrap().is_empty());

        // Mutations under the dead site report not-found.
        assert!(matches!(
            store.create_page(site_id, "New", ""),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            store.update_page(site_id, 1, "New", ""),
            Err(Error::NotFound)
        ));
        assert!(matches!(store.delete_page(site_id, 1), Err(Error::NotFound)));
        assert!(matches!(
            store.create_file(site_id, "b.png", b"x"),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            store.delete_files(site_id, &[1]),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_delete_site_not_found() {
        let (_temp, store) = test_store();
        assert!(matches!(store.delete_site(99), Err(Error::NotFound)));
    }

    #[test]
    fn test_update_site_rename_keeps_tables() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("old", "").unwrap();
        store.create_page(site_id, "Home", "x").unwrap();

        let mut site = store.site_by_id(site_id).unwrap().unwrap();
        site.name = "new".to_string();
        store.update_site(&site).unwrap();

        // Table naming derives from the id, so content survives a rename.
        assert!(store.site_by_name("old").unwrap().is_none());
        assert_eq!(store.site_by_name("new").unwrap().unwrap().site_id, site_id);
        assert_eq!(store.list_pages(site_id).unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_landing_page_materializes_once() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "").unwrap();
        let site = store.site_by_id(site_id).unwrap().unwrap();

        assert!(store.page_by_id(site_id, LANDING_PAGE_ID).unwrap().is_none());

        let first = store.ensure_landing_page(&site).unwrap();
        assert_eq!(first.page_id, LANDING_PAGE_ID);
        assert_eq!(first.title, "demo start page");

        // Second call returns the persisted row, not a fresh default.
        store
            .update_page(site_id, LANDING_PAGE_ID, "demo start page", "edited")
            .unwrap();
        let second = store.ensure_landing_page(&site).unwrap();
        assert_eq!(second.body, "edited");

        assert_eq!(store.list_pages(site_id).unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_landing_page_absorbs_lost_race() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "").unwrap();
        let site = store.site_by_id(site_id).unwrap().unwrap();

        // Simulate another request winning the insert between our miss and
        // our insert: id 1 already holds a row with a conflicting title.
        let sql = format!(
            "INSERT INTO {} (page_id, title, body) VALUES (1, 'demo start page', 'winner')",
            page_table_name(site_id)
        );
        store.conn().execute(&sql, []).unwrap();

        let page = store.ensure_landing_page(&site).unwrap();
        assert_eq!(page.page_id, LANDING_PAGE_ID);
        assert_eq!(page.body, "winner");
    }

    #[test]
    fn test_page_crud_and_title_uniqueness() {
        let (_temp, store) = test_store();

        let a = store.create_site("alpha", "").unwrap();
        let b = store.create_site("beta", "").unwrap();

        let page_id = store.create_page(a, "Home", "hello").unwrap();
        let fetched = store.page_by_title(a, "Home").unwrap().unwrap();
        assert_eq!(fetched.page_id, page_id);
        assert_eq!(fetched.body, "hello");

        // Duplicate title within a site is rejected; across sites it is fine.
        let dup = store.create_page(a, "Home", "other");
        assert!(matches!(dup, Err(Error::DuplicateName(_))));
        store.create_page(b, "Home", "other site").unwrap();

        store.update_page(a, page_id, "Start", "edited").unwrap();
        assert!(store.page_by_title(a, "Home").unwrap().is_none());
        assert_eq!(store.page_by_title(a, "Start").unwrap().unwrap().body, "edited");

        store.delete_page(a, page_id).unwrap();
        assert!(store.page_by_id(a, page_id).unwrap().is_none());
        assert!(matches!(store.delete_page(a, page_id), Err(Error::NotFound)));
    }

    #[test]
    fn test_list_pages_ordered_by_title() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "").unwrap();
        store.create_page(site_id, "zebra", "").unwrap();
        store.create_page(site_id, "apple", "").unwrap();
        store.create_page(site_id, "mango", "").unwrap();

        let titles: Vec<String> = store
            .list_pages(site_id)
            .unwrap()
            .into_iter()
            .map(|(_, t)| t)
            .collect();
        assert_eq!(titles, ["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_file_crud() {
        let (_temp, store) = test_store();

        let site_id = store.create_site("demo", "").unwrap();
        store.create_file(site_id, "b.png", b"bbb").unwrap();
        let a_id = store.create_file(site_id, "a.png", b"aaa").unwrap();

        let file = store.file_by_name(site_id, "a.png").unwrap().unwrap();
        assert_eq!(file.file_id, a_id);
        assert_eq!(file.bytes, b"aaa");

        let dup = store.create_file(site_id, "a.png", b"zzz");
        assert!(matches!(dup, Err(Error::DuplicateName(_))));

        let names: Vec<String> = store
            .list_files(site_id)
            .unwrap()
            .into_iter()
            .map(|(_, n)| n)
            .collect();
        assert_eq!(names, ["a.png", "b.png"]);

        store.delete_files(site_id, &[a_id]).unwrap();
        assert!(store.file_by_name(site_id, "a.png").unwrap().is_none());
        assert!(store.file_by_name(site_id, "b.png").unwrap().is_some());

        // Empty batch is a no-op.
        store.delete_files(site_id, &[]).unwrap();
    }
}
