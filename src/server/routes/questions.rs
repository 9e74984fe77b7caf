use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::db::pagination::Page;
use crate::db::queries::questions;
use crate::db::{NewQuestion, Question, QuestionUpdate};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::telemetry::STORE_WRITES;

use super::PaginationQuery;

#[derive(Deserialize)]
struct QuestionsQuery {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category_id: Option<i64>,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    Query(query): Query<QuestionsQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<Json<Page<Question>>> {
    let pagination = pagination.into();
    let page = match query.category_id {
        Some(category_id) => {
            questions::list_questions_by_category(&pool, category_id, pagination).await?
        }
        None => questions::list_questions(&pool, pagination).await?,
    };
    Ok(Json(page))
}

async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Question>> {
    let question = questions::get_question(&pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(question))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    Json(body): Json<NewQuestion>,
) -> ApiResult<(StatusCode, Json<Question>)> {
    let question = questions::create_question(&pool, body).await?;
    STORE_WRITES.with_label_values(&["question", "create"]).inc();
    Ok((StatusCode::CREATED, Json(question)))
}

async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(body): Json<QuestionUpdate>,
) -> ApiResult<Json<Question>> {
    let question = questions::update_question(&pool, id, body)
        .await?
        .ok_or(ApiError::NotFound)?;
    STORE_WRITES.with_label_values(&["question", "update"]).inc();
    Ok(Json(question))
}

async fn delete_question(State(pool): State<SqlitePool>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    questions::delete_question(&pool, id).await?;
    STORE_WRITES.with_label_values(&["question", "delete"]).inc();
    Ok(StatusCode::NO_CONTENT)
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/{id}",
            get(get_question)
                .put(update_question)
                .delete(delete_question),
        )
        .with_state(state)
}
