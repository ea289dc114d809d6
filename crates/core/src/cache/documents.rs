//! Document CRUD operations.
//!
//! Lookups never touch the network. A missing row is `Ok(None)`; only
//! storage failures are errors.

use super::connection::CacheDb;
use super::hash::content_hash;
use crate::{CachedDocument, Error, PolicyRef};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

const SELECT_COLUMNS: &str =
    "SELECT category, identifier, text, content_hash, source_url, title, page_count, fetched_at FROM documents";

impl CachedDocument {
    /// Build a cache row for freshly extracted text, stamped with the current time.
    pub fn new(
        reference: &PolicyRef, text: String, source_url: Option<String>, title: Option<String>,
        page_count: Option<i64>,
    ) -> Self {
        Self {
            category: reference.category.clone(),
            identifier: reference.identifier.clone(),
            content_hash: content_hash(&text),
            text,
            source_url,
            title,
            page_count,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<CachedDocument> {
    Ok(CachedDocument {
        category: row.get(0)?,
        identifier: row.get(1)?,
        text: row.get(2)?,
        content_hash: row.get(3)?,
        source_url: row.get(4)?,
        title: row.get(5)?,
        page_count: row.get(6)?,
        fetched_at: row.get(7)?,
    })
}

impl CacheDb {
    /// Insert or replace the text stored for a reference.
    ///
    /// Uses UPSERT semantics, so writing the same reference twice is harmless.
    pub async fn put_document(&self, doc: &CachedDocument) -> Result<(), Error> {
        let doc = doc.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO documents (
                    category, identifier, text, content_hash, source_url, title, page_count, fetched_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(category, identifier) DO UPDATE SET
                    text = excluded.text,
                    content_hash = excluded.content_hash,
                    source_url = excluded.source_url,
                    title = excluded.title,
                    page_count = excluded.page_count,
                    fetched_at = excluded.fetched_at",
                    params![
                        &doc.category,
                        &doc.identifier,
                        &doc.text,
                        &doc.content_hash,
                        &doc.source_url,
                        &doc.title,
                        &doc.page_count,
                        &doc.fetched_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the cached document for a reference.
    ///
    /// Returns None if the reference has never been extracted.
    pub async fn get_document(&self, reference: &PolicyRef) -> Result<Option<CachedDocument>, Error> {
        let reference = reference.clone();
        self.conn
            .call(move |conn| -> Result<Option<CachedDocument>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE category = ?1 AND identifier = ?2"))?;

                match stmt.query_row(params![reference.category, reference.identifier], row_to_document) {
                    Ok(doc) => Ok(Some(doc)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get the cached documents for several references, skipping misses.
    ///
    /// Results are ordered by `(category, identifier)`.
    pub async fn get_documents(&self, references: Vec<PolicyRef>) -> Result<Vec<CachedDocument>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<CachedDocument>, Error> {
                let tx = conn.transaction()?;
                let mut docs = Vec::with_capacity(references.len());
                {
                    let mut stmt =
                        tx.prepare(&format!("{SELECT_COLUMNS} WHERE category = ?1 AND identifier = ?2"))?;
                    for reference in &references {
                        match stmt.query_row(params![reference.category, reference.identifier], row_to_document) {
                            Ok(doc) => docs.push(doc),
                            Err(rusqlite::Error::QueryReturnedNoRows) => {}
                            Err(e) => return Err(e.into()),
                        }
                    }
                }
                tx.commit()?;
                docs.sort_by(|a, b| (&a.category, &a.identifier).cmp(&(&b.category, &b.identifier)));
                Ok(docs)
            })
            .await
            .map_err(Error::from)
    }

    /// Every cached document, ordered by `(category, identifier)`.
    ///
    /// Runs as a single statement, so each call sees one consistent snapshot
    /// even while other requests are writing.
    pub async fn list_documents(&self) -> Result<Vec<CachedDocument>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<CachedDocument>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY category, identifier"))?;
                let docs = stmt
                    .query_map([], row_to_document)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(docs)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached documents.
    pub async fn count_documents(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the cached document for one reference.
    ///
    /// Returns true if a row was removed.
    pub async fn delete_document(&self, reference: &PolicyRef) -> Result<bool, Error> {
        let reference = reference.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM documents WHERE category = ?1 AND identifier = ?2",
                    params![reference.category, reference.identifier],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every cached document in a category.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_category(&self, category: &str) -> Result<u64, Error> {
        let category = category.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM documents WHERE category = ?1", params![category])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every cached document.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_all(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM documents", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
