//! `SQLite`-backed credential store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::schema;
use super::{Credential, CredentialStore, StoredCredential, CREDENTIAL_KEY};
use crate::error::{Error, Result};

/// Keeps the map access token in a local settings database.
#[derive(Debug)]
pub struct SqliteCredentialStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteCredentialStore {
    /// Open or create the settings database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening settings database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        schema::initialize_schema(&conn)?;

        info!("Settings database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        schema::initialize_schema(&conn)?;
        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT value, updated_at FROM settings WHERE key = ?1",
                [CREDENTIAL_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, updated_at)) = row else {
            return Ok(None);
        };

        // A blank row counts as absent: the capture form must be shown.
        let Some(credential) = Credential::parse(&value) else {
            warn!("Ignoring blank stored credential");
            return Ok(None);
        };

        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Unparseable credential timestamp");
                DateTime::<Utc>::UNIX_EPOCH
            });

        Ok(Some(StoredCredential {
            credential,
            updated_at,
        }))
    }

    fn save(&mut self, credential: &Credential) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![CREDENTIAL_KEY, credential.expose(), Utc::now().to_rfc3339()],
        )?;
        info!(credential = %credential, "Stored map credential");
        Ok(())
    }

    fn clear(&mut self) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", [CREDENTIAL_KEY])?;
        if affected > 0 {
            info!("Cleared stored map credential");
        }
        Ok(affected > 0)
    }
}
