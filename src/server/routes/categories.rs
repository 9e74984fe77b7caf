use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::pagination::Page;
use crate::db::queries::categories;
use crate::db::Category;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::telemetry::STORE_WRITES;

use super::PaginationQuery;

#[derive(Deserialize)]
struct CategoryBody {
    title: String,
}

async fn list_categories(
    State(pool): State<SqlitePool>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<Json<Page<Category>>> {
    let page = categories::list_categories(&pool, pagination.into()).await?;
    Ok(Json(page))
}

async fn get_category(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    let category = categories::get_category(&pool, &slug)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(category))
}

async fn create_category(
    State(pool): State<SqlitePool>,
    Json(body): Json<CategoryBody>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = categories::create_category(&pool, &body.title).await?;
    STORE_WRITES.with_label_values(&["category", "create"]).inc();
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
    Json(body): Json<CategoryBody>,
) -> ApiResult<Json<Category>> {
    let category = categories::update_category(&pool, &slug, &body.title)
        .await?
        .ok_or(ApiError::NotFound)?;
    STORE_WRITES.with_label_values(&["category", "update"]).inc();
    Ok(Json(category))
}

async fn delete_category(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Category>> {
    let category = categories::delete_category(&pool, &slug)
        .await?
        .ok_or(ApiError::NotFound)?;
    STORE_WRITES.with_label_values(&["category", "delete"]).inc();
    Ok(Json(category))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{slug}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .with_state(state)
}
