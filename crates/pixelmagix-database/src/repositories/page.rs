//! Page repository implementation.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use pixelmagix_core::error::{AppError, ErrorKind};
use pixelmagix_core::result::AppResult;
use pixelmagix_entity::page::{Page, PageSection, SavePage, SectionInput};

/// Repository for pages and their sections.
#[derive(Debug, Clone)]
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    /// Create a new page repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a page by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Page>> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find page", e))
    }

    /// Find a page by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Page>> {
        sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find page by slug", e)
            })
    }

    /// List pages ordered by ID.
    pub async fn find_all(
        &self,
        offset: i64,
        limit: i64,
        published_only: bool,
    ) -> AppResult<Vec<Page>> {
        let sql = if published_only {
            "SELECT * FROM pages WHERE is_published = 1 ORDER BY id LIMIT ? OFFSET ?"
        } else {
            "SELECT * FROM pages ORDER BY id LIMIT ? OFFSET ?"
        };

        sqlx::query_as::<_, Page>(sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list pages", e))
    }

    /// Whether a slug is taken by a page other than `exclude_id`.
    pub async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE slug = ? AND id != ?")
                .bind(slug)
                .bind(exclude_id.unwrap_or(-1))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to check page slug", e)
                })?;
        Ok(count > 0)
    }

    /// Sections of a page ordered by position.
    pub async fn sections(&self, page_id: i64) -> AppResult<Vec<PageSection>> {
        sqlx::query_as::<_, PageSection>(
            "SELECT * FROM page_sections WHERE page_id = ? ORDER BY position, id",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sections", e))
    }

    /// Create a page and its sections atomically.
    pub async fn create(&self, data: &SavePage, sections: &[SectionInput]) -> AppResult<Page> {
        let mut tx = self.begin().await?;
        let now = Utc::now();

        let page = sqlx::query_as::<_, Page>(
            "INSERT INTO pages (title, slug, description, html_content, css_content, js_content, \
             components, styles, metadata, is_published, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(&data.html_content)
        .bind(&data.css_content)
        .bind(&data.js_content)
        .bind(&data.components)
        .bind(&data.styles)
        .bind(&data.metadata)
        .bind(data.is_published)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create page"))?;

        insert_sections(&mut tx, page.id, sections).await?;
        commit(tx).await?;
        Ok(page)
    }

    /// Update a page. When `sections` is given the existing sections are
    /// replaced in the same transaction.
    pub async fn update(
        &self,
        id: i64,
        data: &SavePage,
        sections: Option<&[SectionInput]>,
    ) -> AppResult<Option<Page>> {
        let mut tx = self.begin().await?;

        let page = sqlx::query_as::<_, Page>(
            "UPDATE pages SET title = ?, slug = ?, description = ?, html_content = ?, \
             css_content = ?, js_content = ?, components = ?, styles = ?, metadata = ?, \
             is_published = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(&data.html_content)
        .bind(&data.css_content)
        .bind(&data.js_content)
        .bind(&data.components)
        .bind(&data.styles)
        .bind(&data.metadata)
        .bind(data.is_published)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update page"))?;

        let Some(page) = page else {
            return Ok(None);
        };

        if let Some(sections) = sections {
            sqlx::query("DELETE FROM page_sections WHERE page_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to clear sections", e)
                })?;
            insert_sections(&mut tx, id, sections).await?;
        }

        commit(tx).await?;
        Ok(Some(page))
    }

    /// Delete a page (sections cascade). Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete page", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }
}

async fn insert_sections(
    tx: &mut Transaction<'static, Sqlite>,
    page_id: i64,
    sections: &[SectionInput],
) -> AppResult<()> {
    for (position, section) in sections.iter().enumerate() {
        sqlx::query(
            "INSERT INTO page_sections (page_id, name, section_type, content, position) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(page_id)
        .bind(&section.name)
        .bind(&section.section_type)
        .bind(&section.content)
        .bind(position as i64)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert section", e))?;
    }
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit().await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
    })
}

fn map_write_error(err: sqlx::Error, message: &str) -> AppError {
    let unique = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        AppError::with_source(ErrorKind::Conflict, "A page with this slug already exists", err)
    } else {
        AppError::with_source(ErrorKind::Database, message.to_string(), err)
    }
}
