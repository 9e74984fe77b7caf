use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::pagination::{Page, Pagination};
use crate::db::sanitize::sanitize;
use crate::db::validation::validate_title;
use crate::db::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

impl Category {
    fn sanitized(mut self) -> Self {
        self.title = sanitize(&self.title);
        self
    }
}

/// Derives the external identifier from a title: lowercased, spaces
/// replaced with hyphens. Nothing else is rewritten, so titles that only
/// differ in case or spacing collide on the unique slug index.
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::Conflict("category")
        }
        other => StoreError::Storage(other),
    }
}

pub async fn list_categories(
    pool: &SqlitePool,
    pagination: Pagination,
) -> Result<Page<Category>, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    let items = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, title, slug FROM categories
        ORDER BY id
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(pagination.limit as i64)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Category::sanitized)
    .collect();

    Ok(Page::new(items, total, pagination))
}

pub async fn get_category(pool: &SqlitePool, slug: &str) -> Result<Option<Category>, StoreError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, title, slug FROM categories WHERE slug = ?1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(category.map(Category::sanitized))
}

pub async fn create_category(pool: &SqlitePool, title: &str) -> Result<Category, StoreError> {
    // validate what actually gets stored, not the raw markup
    let title = sanitize(title);
    validate_title(&title)?;
    let slug = slugify(&title);

    let id = sqlx::query("INSERT INTO categories (title, slug) VALUES (?1, ?2)")
        .bind(&title)
        .bind(&slug)
        .execute(pool)
        .await
        .map_err(map_write_error)?
        .last_insert_rowid();

    Ok(Category { id, title, slug })
}

/// Renames a category. The slug is re-derived from the new title, so the
/// external identifier changes and the old slug stops resolving.
pub async fn update_category(
    pool: &SqlitePool,
    slug: &str,
    title: &str,
) -> Result<Option<Category>, StoreError> {
    let title = sanitize(title);
    validate_title(&title)?;
    let new_slug = slugify(&title);

    let Some(existing) = get_category(pool, slug).await? else {
        return Ok(None);
    };

    sqlx::query("UPDATE categories SET title = ?1, slug = ?2 WHERE id = ?3")
        .bind(&title)
        .bind(&new_slug)
        .bind(existing.id)
        .execute(pool)
        .await
        .map_err(map_write_error)?;

    Ok(Some(Category {
        id: existing.id,
        title,
        slug: new_slug,
    }))
}

/// Deletes a category together with all of its questions and their options.
/// The cascade runs in one transaction so a failure leaves everything in
/// place.
pub async fn delete_category(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<Category>, StoreError> {
    let Some(category) = get_category(pool, slug).await? else {
        return Ok(None);
    };

    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        DELETE FROM options
        WHERE question_id IN (SELECT id FROM questions WHERE category_id = ?1)
        "#,
    )
    .bind(category.id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM questions WHERE category_id = ?1")
        .bind(category.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM categories WHERE id = ?1")
        .bind(category.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Some(category))
}

pub async fn get_all_categories(pool: &SqlitePool) -> Result<Vec<Category>, StoreError> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, title, slug FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(categories.into_iter().map(Category::sanitized).collect())
}

/// Bulk insert preserving ids, used by the import CLI.
pub async fn import_categories(
    pool: &SqlitePool,
    categories: Vec<Category>,
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    for category in categories {
        sqlx::query("INSERT INTO categories (id, title, slug) VALUES (?1, ?2, ?3)")
            .bind(category.id)
            .bind(sanitize(&category.title))
            .bind(&category.slug)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
    }
    tx.commit().await?;
    Ok(())
}
