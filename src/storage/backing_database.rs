use std::{path::Path, sync::Mutex};

use log::info;
use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::errors::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Sqlite,
    PostgreSql,
}

/// Row store shared by every persistence-backed helper.
pub struct BackingDatabase {
    connection: Mutex<Option<Connection>>,
}

impl BackingDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<BackingDatabase, DatabaseError> {
        let connection = Connection::open(path.as_ref())?;
        info!("Opened SQLite database: {}", path.as_ref().display());

        Ok(BackingDatabase {
            connection: Mutex::new(Some(connection)),
        })
    }

    pub fn open_in_memory() -> Result<BackingDatabase, DatabaseError> {
        let connection = Connection::open_in_memory()?;

        Ok(BackingDatabase {
            connection: Mutex::new(Some(connection)),
        })
    }

    pub fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn with_connection<T>(
        &self,
        work: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let guard = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match guard.as_ref() {
            Some(connection) => work(connection),
            None => Err(DatabaseError::Closed),
        }
    }

    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize, DatabaseError> {
        self.with_connection(|connection| Ok(connection.execute(sql, params)?))
    }

    pub fn fetch_row<T, F>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: F,
    ) -> Result<Option<T>, DatabaseError>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|connection| {
            Ok(connection.query_row(sql, params, map).optional()?)
        })
    }

    pub fn fetch_rows<T, F>(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        map: F,
    ) -> Result<Vec<T>, DatabaseError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|connection| {
            let mut statement = connection.prepare(sql)?;
            let rows = statement.query_map(params, map)?;
            let mut results = Vec::new();
            for row in rows {
                results.push(row?);
            }
            Ok(results)
        })
    }

    pub fn create_table_if_not_exists(&self, ddl: &str) -> Result<(), DatabaseError> {
        self.with_connection(|connection| Ok(connection.execute_batch(ddl)?))
    }

    pub fn close(&self) -> Result<(), DatabaseError> {
        let mut guard = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(connection) = guard.take() {
            connection.close().map_err(|(_, error)| error)?;
            info!("Closed SQLite database");
        }

        Ok(())
    }
}
