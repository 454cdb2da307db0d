use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};

use savora_core::errors::ApiError;
use savora_core::models::tag::{self, Column as TagCol, Entity as Tag};
use savora_core::views::user_auth::auth_from_header;
use savora_core::AppState;

use crate::serializers::tag::{TagOut, TagWriteReq};

// ---------- handlers ----------

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Vec<TagOut>>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;

    let tags = Tag::find()
        .filter(TagCol::UserId.eq(user.id))
        .order_by_desc(TagCol::Name)
        .all(&state.db)
        .await?;

    let body = tags.into_iter().map(TagOut::from_entity).collect();
    Ok((StatusCode::OK, Json(body)))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TagWriteReq>,
) -> Result<(StatusCode, Json<TagOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let name = valid_name(&req)?;
    ensure_name_free(&state, user.id, &name, None).await?;

    let created = tag::ActiveModel {
        id: NotSet,
        user_id: Set(user.id),
        name: Set(name),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(TagOut::from_entity(created))))
}

pub async fn retrieve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<TagOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let tag = owned_tag(&state, user.id, id).await?;
    Ok((StatusCode::OK, Json(TagOut::from_entity(tag))))
}

pub async fn partial_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<TagWriteReq>,
) -> Result<(StatusCode, Json<TagOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let tag = owned_tag(&state, user.id, id).await?;

    let name = valid_name(&req)?;
    ensure_name_free(&state, user.id, &name, Some(tag.id)).await?;

    let mut pending: tag::ActiveModel = tag.into();
    pending.name = Set(name);
    let updated = pending.update(&state.db).await?;

    Ok((StatusCode::OK, Json(TagOut::from_entity(updated))))
}

pub async fn destroy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let tag = owned_tag(&state, user.id, id).await?;
    // recipe links cascade; the recipes themselves are untouched
    tag.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- helpers ----------

async fn owned_tag(state: &AppState, user_id: i64, id: i64) -> Result<tag::Model, ApiError> {
    Tag::find_by_id(id)
        .filter(TagCol::UserId.eq(user_id))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)
}

fn valid_name(req: &TagWriteReq) -> Result<String, ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("tag name must not be empty".into()));
    }
    Ok(name.to_string())
}

/// (user_id, name) is unique; `exclude` lets a rename keep its own name.
async fn ensure_name_free(
    state: &AppState,
    user_id: i64,
    name: &str,
    exclude: Option<i64>,
) -> Result<(), ApiError> {
    let mut query = Tag::find()
        .filter(TagCol::UserId.eq(user_id))
        .filter(TagCol::Name.eq(name));
    if let Some(id) = exclude {
        query = query.filter(TagCol::Id.ne(id));
    }
    if query.one(&state.db).await?.is_some() {
        return Err(ApiError::Validation(
            "tag with this name already exists".into(),
        ));
    }
    Ok(())
}
