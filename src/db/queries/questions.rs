use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::pagination::{Page, Pagination};
use crate::db::sanitize::sanitize;
use crate::db::validation::{validate_option_text, validate_question_text};
use crate::db::StoreError;

/// A question with its options attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub category_id: i64,
    pub options: Vec<AnswerOption>,
}

/// The flat `questions` row, also the CSV record for import/export.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuestionRecord {
    pub id: i64,
    pub text: String,
    pub category_id: i64,
}

// `Option` would shadow the std type, hence the longer name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnswerOption {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
    pub question_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub category_id: i64,
    pub options: Vec<NewOption>,
}

/// Partial update; `options: Some(_)` replaces the whole option set,
/// `None` leaves the existing options untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionUpdate {
    pub text: Option<String>,
    pub category_id: Option<i64>,
    pub options: Option<Vec<NewOption>>,
}

impl AnswerOption {
    fn sanitized(mut self) -> Self {
        self.text = sanitize(&self.text);
        self
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            StoreError::Validation {
                field: "category_id",
                message: "referenced category does not exist".to_owned(),
            }
        }
        other => StoreError::Storage(other),
    }
}

// Length checks run on the sanitized text, i.e. on what ends up stored.
fn validate_options(options: &[NewOption]) -> Result<(), StoreError> {
    for (index, option) in options.iter().enumerate() {
        validate_option_text(index, &sanitize(&option.text))?;
    }
    Ok(())
}

async fn list_options(pool: &SqlitePool, question_id: i64) -> sqlx::Result<Vec<AnswerOption>> {
    let options = sqlx::query_as::<_, AnswerOption>(
        r#"
        SELECT id, text, is_correct, question_id FROM options
        WHERE question_id = ?1
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;
    Ok(options.into_iter().map(AnswerOption::sanitized).collect())
}

async fn attach_options(
    pool: &SqlitePool,
    records: Vec<QuestionRecord>,
) -> sqlx::Result<Vec<Question>> {
    let mut questions = Vec::with_capacity(records.len());
    for record in records {
        let options = list_options(pool, record.id).await?;
        questions.push(Question {
            id: record.id,
            text: sanitize(&record.text),
            category_id: record.category_id,
            options,
        });
    }
    Ok(questions)
}

async fn insert_options(
    tx: &mut Transaction<'_, Sqlite>,
    question_id: i64,
    options: &[NewOption],
) -> Result<Vec<AnswerOption>, StoreError> {
    let mut inserted = Vec::with_capacity(options.len());
    for option in options {
        let text = sanitize(&option.text);
        let id = sqlx::query("INSERT INTO options (text, is_correct, question_id) VALUES (?1, ?2, ?3)")
            .bind(&text)
            .bind(option.is_correct)
            .bind(question_id)
            .execute(&mut **tx)
            .await?
            .last_insert_rowid();
        inserted.push(AnswerOption {
            id,
            text,
            is_correct: option.is_correct,
            question_id,
        });
    }
    Ok(inserted)
}

pub async fn list_questions(
    pool: &SqlitePool,
    pagination: Pagination,
) -> Result<Page<Question>, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    let records = sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT id, text, category_id FROM questions
        ORDER BY id
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(pagination.limit as i64)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(attach_options(pool, records).await?, total, pagination))
}

pub async fn list_questions_by_category(
    pool: &SqlitePool,
    category_id: i64,
    pagination: Pagination,
) -> Result<Page<Question>, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE category_id = ?1")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    let records = sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT id, text, category_id FROM questions
        WHERE category_id = ?1
        ORDER BY id
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(category_id)
    .bind(pagination.limit as i64)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Page::new(attach_options(pool, records).await?, total, pagination))
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> Result<Option<Question>, StoreError> {
    let record = sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT id, text, category_id FROM questions WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let Some(record) = record else {
        return Ok(None);
    };
    Ok(attach_options(pool, vec![record]).await?.pop())
}

/// Creates a question and its full option set in one transaction; if any
/// option insert fails the question row is rolled back with it.
pub async fn create_question(
    pool: &SqlitePool,
    new: NewQuestion,
) -> Result<Question, StoreError> {
    let text = sanitize(&new.text);
    validate_question_text(&text)?;
    validate_options(&new.options)?;

    let mut tx = pool.begin().await?;
    let id = sqlx::query("INSERT INTO questions (text, category_id) VALUES (?1, ?2)")
        .bind(&text)
        .bind(new.category_id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?
        .last_insert_rowid();
    let options = insert_options(&mut tx, id, &new.options).await?;
    tx.commit().await?;

    Ok(Question {
        id,
        text,
        category_id: new.category_id,
        options,
    })
}

/// Partial update. When `options` is present the previous option set is
/// deleted wholesale and the new one inserted; there is no merging.
pub async fn update_question(
    pool: &SqlitePool,
    id: i64,
    update: QuestionUpdate,
) -> Result<Option<Question>, StoreError> {
    let new_text = update.text.as_deref().map(sanitize);
    if let Some(text) = &new_text {
        validate_question_text(text)?;
    }
    if let Some(options) = &update.options {
        validate_options(options)?;
    }

    let existing = sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT id, text, category_id FROM questions WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let text = new_text.unwrap_or(existing.text);
    let category_id = update.category_id.unwrap_or(existing.category_id);

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE questions SET text = ?1, category_id = ?2 WHERE id = ?3")
        .bind(&text)
        .bind(category_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;
    if let Some(options) = &update.options {
        sqlx::query("DELETE FROM options WHERE question_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_options(&mut tx, id, options).await?;
    }
    tx.commit().await?;

    get_question(pool, id).await
}

/// Deletes a question and its options; deleting an id that does not exist
/// is a no-op.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM options WHERE question_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM questions WHERE id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn get_all_questions(pool: &SqlitePool) -> Result<Vec<QuestionRecord>, StoreError> {
    Ok(sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT id, text, category_id FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?)
}

pub async fn get_all_options(pool: &SqlitePool) -> Result<Vec<AnswerOption>, StoreError> {
    Ok(sqlx::query_as::<_, AnswerOption>(
        r#"
        SELECT id, text, is_correct, question_id FROM options ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?)
}

/// Bulk insert preserving ids, used by the import CLI. Categories must be
/// imported first or the foreign keys will reject the rows.
pub async fn import_questions(
    pool: &SqlitePool,
    questions: Vec<QuestionRecord>,
    options: Vec<AnswerOption>,
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query("INSERT INTO questions (id, text, category_id) VALUES (?1, ?2, ?3)")
            .bind(question.id)
            .bind(sanitize(&question.text))
            .bind(question.category_id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
    }
    for option in options {
        sqlx::query("INSERT INTO options (id, text, is_correct, question_id) VALUES (?1, ?2, ?3, ?4)")
            .bind(option.id)
            .bind(sanitize(&option.text))
            .bind(option.is_correct)
            .bind(option.question_id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
    }
    tx.commit().await?;
    Ok(())
}
