use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Bookmark, NewBookmark, SortKey, STORED_DATE_FORMAT};

use super::schema::SCHEMA;

/// Every call is a single auto-committed statement; nothing spans two calls.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        let repository = Self { conn };
        repository.ensure_schema().await?;
        tracing::debug!("Opened bookmark store at {}", db_path);
        Ok(repository)
    }

    /// Safe to call repeatedly; never drops or alters existing data.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn insert(&self, bookmark: NewBookmark) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO bookmarks (url, title, summary, stored_date, due_date) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        bookmark.url,
                        bookmark.title,
                        bookmark.summary,
                        bookmark.stored_date.format(STORED_DATE_FORMAT).to_string(),
                        bookmark.due_date,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        tracing::debug!("Inserted bookmark {}", id);
        Ok(id)
    }

    pub async fn list_sorted(&self, sort: SortKey) -> Result<Vec<Bookmark>> {
        let sql = format!(
            "SELECT id, url, title, summary, stored_date, due_date FROM bookmarks ORDER BY {}, id",
            sort.column()
        );
        let bookmarks = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let bookmarks = stmt
                    .query_map([], bookmark_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(bookmarks)
            })
            .await?;
        Ok(bookmarks)
    }

    /// Deleting an unknown id is not an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .call(move |conn| Ok(conn.execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?))
            .await?;
        tracing::debug!("Deleted bookmark {} ({} rows)", id, affected);
        Ok(())
    }

    pub async fn update_due_date(&self, id: i64, due_date: &str) -> Result<()> {
        let due_date = due_date.to_string();
        let affected = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "UPDATE bookmarks SET due_date = ?1 WHERE id = ?2",
                    params![due_date, id],
                )?)
            })
            .await?;
        tracing::debug!("Updated due date of bookmark {} ({} rows)", id, affected);
        Ok(())
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}

fn parse_stored_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, STORED_DATE_FORMAT)
        // rows written before sub-second precision was kept
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn bookmark_from_row(row: &Row) -> rusqlite::Result<Bookmark> {
    let stored_date: String = row.get(4)?;
    Ok(Bookmark {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        stored_date: parse_stored_date(4, &stored_date)?,
        due_date: row.get(5)?,
    })
}
