//! SQLite adapter for the table store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{StorageError, TableStore, Thumbnails};
use crate::domain::{Asset, Folder, FolderId};

/// [`TableStore`] backed by a single SQLite database file
pub struct SqliteTableStore {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteTableStore {
    /// Open or create the database and its schema
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn,
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        // Row order is kept explicitly: the catalog is insertion-ordered
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS folders (
                position        INTEGER NOT NULL,
                folder_id       TEXT PRIMARY KEY,
                path            TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS assets (
                position                        INTEGER NOT NULL,
                folder_id                       TEXT NOT NULL,
                file_name                       TEXT NOT NULL,
                file_size                       INTEGER NOT NULL,
                pixel_width                     INTEGER NOT NULL,
                pixel_height                    INTEGER NOT NULL,
                hash                            TEXT NOT NULL,
                thumbnail_creation_date_time    TEXT NOT NULL,
                file_creation_date_time         TEXT NOT NULL,
                file_modification_date_time     TEXT NOT NULL,
                PRIMARY KEY (folder_id, file_name)
            );
            CREATE INDEX IF NOT EXISTS idx_assets_hash ON assets(hash);
            CREATE TABLE IF NOT EXISTS thumbnail_blobs (
                blob_name       TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS thumbnails (
                blob_name       TEXT NOT NULL,
                file_name       TEXT NOT NULL,
                data            BLOB NOT NULL,
                PRIMARY KEY (blob_name, file_name),
                FOREIGN KEY(blob_name) REFERENCES thumbnail_blobs(blob_name) ON DELETE CASCADE
            );",
        )?;
        Ok(())
    }
}

impl TableStore for SqliteTableStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load_folders(&mut self) -> Result<Vec<Folder>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT folder_id, path FROM folders ORDER BY position")?;

        let rows = stmt.query_map([], |row| {
            Ok(Folder {
                folder_id: folder_id_column(row, 0)?,
                path: row.get(1)?,
            })
        })?;

        let mut folders = Vec::new();
        for folder in rows {
            folders.push(folder?);
        }
        Ok(folders)
    }

    fn save_folders(&mut self, folders: &[Folder]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM folders", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO folders (position, folder_id, path) VALUES (?1, ?2, ?3)")?;
            for (position, folder) in folders.iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    folder.folder_id.to_string(),
                    folder.path
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_assets(&mut self) -> Result<Vec<Asset>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT folder_id, file_name, file_size, pixel_width, pixel_height, hash,
                    thumbnail_creation_date_time, file_creation_date_time, file_modification_date_time
             FROM assets ORDER BY position",
        )?;

        let rows = stmt.query_map([], |row| {
            let file_size: i64 = row.get(2)?;
            Ok(Asset {
                folder_id: folder_id_column(row, 0)?,
                file_name: row.get(1)?,
                file_size: file_size.max(0) as u64,
                pixel_width: row.get(3)?,
                pixel_height: row.get(4)?,
                hash: row.get(5)?,
                thumbnail_creation_date_time: datetime_column(row, 6)?,
                file_creation_date_time: datetime_column(row, 7)?,
                file_modification_date_time: datetime_column(row, 8)?,
                folder: None,
                image_data: None,
            })
        })?;

        let mut assets = Vec::new();
        for asset in rows {
            assets.push(asset?);
        }
        Ok(assets)
    }

    fn save_assets(&mut self, assets: &[Asset]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM assets", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO assets (position, folder_id, file_name, file_size, pixel_width,
                    pixel_height, hash, thumbnail_creation_date_time, file_creation_date_time,
                    file_modification_date_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for (position, asset) in assets.iter().enumerate() {
                stmt.execute(params![
                    position as i64,
                    asset.folder_id.to_string(),
                    asset.file_name,
                    asset.file_size as i64,
                    asset.pixel_width,
                    asset.pixel_height,
                    asset.hash,
                    asset.thumbnail_creation_date_time.to_rfc3339(),
                    asset.file_creation_date_time.to_rfc3339(),
                    asset.file_modification_date_time.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_blob(&mut self, name: &str) -> Result<Option<Thumbnails>, StorageError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM thumbnail_blobs WHERE blob_name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        if !exists {
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT file_name, data FROM thumbnails WHERE blob_name = ?1")?;
        let rows = stmt.query_map([name], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut thumbnails = Thumbnails::new();
        for row in rows {
            let (file_name, data) = row?;
            thumbnails.insert(file_name, data);
        }
        Ok(Some(thumbnails))
    }

    fn save_blob(&mut self, name: &str, thumbnails: &Thumbnails) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO thumbnail_blobs (blob_name) VALUES (?1)",
            [name],
        )?;
        tx.execute("DELETE FROM thumbnails WHERE blob_name = ?1", [name])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO thumbnails (blob_name, file_name, data) VALUES (?1, ?2, ?3)",
            )?;
            for (file_name, data) in thumbnails {
                stmt.execute(params![name, file_name, data])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTableStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

fn folder_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<FolderId> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;
    use tempfile::TempDir;

    #[test]
    fn test_missing_tables_load_empty() {
        let mut store = SqliteTableStore::open_in_memory().unwrap();
        contract::missing_tables_load_empty(&mut store);
    }

    #[test]
    fn test_tables_round_trip() {
        let mut store = SqliteTableStore::open_in_memory().unwrap();
        contract::tables_round_trip_in_order(&mut store);
    }

    #[test]
    fn test_blobs_round_trip() {
        let mut store = SqliteTableStore::open_in_memory().unwrap();
        contract::blobs_round_trip(&mut store);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("catalog.db");

        let folder = Folder::new("/pictures");
        {
            let mut store = SqliteTableStore::open(&db_path).unwrap();
            store.save_folders(std::slice::from_ref(&folder)).unwrap();
        }

        let mut store = SqliteTableStore::open(&db_path).unwrap();
        assert_eq!(store.load_folders().unwrap(), vec![folder]);
    }
}
