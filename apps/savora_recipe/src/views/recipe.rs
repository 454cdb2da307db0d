use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, LoaderTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use savora_core::errors::ApiError;
use savora_core::models::recipe::{self, Column as RecipeCol, Entity as Recipe};
use savora_core::models::recipe_tag::{self, Column as RecipeTagCol, Entity as RecipeTag};
use savora_core::models::tag;
use savora_core::views::user_auth::auth_from_header;
use savora_core::AppState;

use crate::serializers::recipe::{RecipeDetailOut, RecipeOut, RecipeWriteReq};
use crate::serializers::tag::TagDescriptor;

// ---------- handlers ----------

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Vec<RecipeOut>>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;

    let recipes = Recipe::find()
        .filter(RecipeCol::UserId.eq(user.id))
        .order_by_desc(RecipeCol::Id)
        .all(&state.db)
        .await?;
    let tags = recipes
        .load_many_to_many(tag::Entity, RecipeTag, &state.db)
        .await?;

    let body = recipes
        .into_iter()
        .zip(tags)
        .map(|(recipe, tags)| RecipeOut::from_entity(recipe, tags))
        .collect();
    Ok((StatusCode::OK, Json(body)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeDetailOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let recipe = owned_recipe(&state, user.id, id).await?;
    let tags = recipe.find_related(tag::Entity).all(&state.db).await?;
    Ok((StatusCode::OK, Json(RecipeDetailOut::from_entity(recipe, tags))))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RecipeWriteReq>,
) -> Result<(StatusCode, Json<RecipeDetailOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let (title, time_minutes, price) = require_core_fields(&req)?;

    // Insert and tag attachment commit or roll back together.
    let txn = state.db.begin().await?;
    let created = recipe::ActiveModel {
        id: NotSet,
        user_id: Set(user.id),
        title: Set(title),
        time_minutes: Set(time_minutes),
        price: Set(price),
        description: Set(req.description),
        link: Set(req.link),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;

    if let Some(descriptors) = &req.tags {
        let tag_ids = get_or_create_tags(&txn, user.id, descriptors).await?;
        link_tags(&txn, created.id, &tag_ids).await?;
    }
    txn.commit().await?;

    tracing::info!(user_id = user.id, recipe_id = created.id, "created recipe");

    let tags = created.find_related(tag::Entity).all(&state.db).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeDetailOut::from_entity(created, tags)),
    ))
}

pub async fn full_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<RecipeWriteReq>,
) -> Result<(StatusCode, Json<RecipeDetailOut>), ApiError> {
    update_inner(state, headers, id, req, true).await
}

pub async fn partial_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<RecipeWriteReq>,
) -> Result<(StatusCode, Json<RecipeDetailOut>), ApiError> {
    update_inner(state, headers, id, req, false).await
}

pub async fn destroy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let recipe = owned_recipe(&state, user.id, id).await?;
    // join rows cascade with the recipe; tags themselves stay
    recipe.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------- update ----------

async fn update_inner(
    state: AppState,
    headers: HeaderMap,
    id: i64,
    req: RecipeWriteReq,
    require_all: bool,
) -> Result<(StatusCode, Json<RecipeDetailOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    let existing = owned_recipe(&state, user.id, id).await?;

    if require_all {
        require_core_fields(&req)?;
    }
    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation("title must not be empty".into()));
        }
    }

    let txn = state.db.begin().await?;
    let recipe_id = existing.id;

    let mut pending: recipe::ActiveModel = existing.clone().into();
    if let Some(title) = req.title {
        pending.title = Set(title);
    }
    if let Some(time_minutes) = req.time_minutes {
        pending.time_minutes = Set(time_minutes);
    }
    if let Some(price) = req.price {
        pending.price = Set(price);
    }
    if let Some(description) = req.description {
        pending.description = Set(Some(description));
    }
    if let Some(link) = req.link {
        pending.link = Set(Some(link));
    }
    let updated = if pending.is_changed() {
        pending.update(&txn).await?
    } else {
        existing
    };

    // A present tags field (even an empty list) replaces the whole set; an
    // absent one leaves it untouched.
    if let Some(descriptors) = &req.tags {
        RecipeTag::delete_many()
            .filter(RecipeTagCol::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        let tag_ids = get_or_create_tags(&txn, user.id, descriptors).await?;
        link_tags(&txn, recipe_id, &tag_ids).await?;
    }
    txn.commit().await?;

    let tags = updated.find_related(tag::Entity).all(&state.db).await?;
    Ok((StatusCode::OK, Json(RecipeDetailOut::from_entity(updated, tags))))
}

// ---------- helpers ----------

async fn owned_recipe(state: &AppState, user_id: i64, id: i64) -> Result<recipe::Model, ApiError> {
    Recipe::find_by_id(id)
        .filter(RecipeCol::UserId.eq(user_id))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)
}

fn require_core_fields(req: &RecipeWriteReq) -> Result<(String, i32, Decimal), ApiError> {
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty());
    let (Some(title), Some(time_minutes), Some(price)) = (title, req.time_minutes, req.price)
    else {
        return Err(ApiError::Validation(
            "title, time_minutes and price are required".into(),
        ));
    };
    Ok((title.to_string(), time_minutes, price))
}

/// Resolve each descriptor to the owner's tag of that name, creating the
/// ones that do not exist yet. Repeated names resolve to one id.
async fn get_or_create_tags(
    txn: &DatabaseTransaction,
    user_id: i64,
    descriptors: &[TagDescriptor],
) -> Result<Vec<i64>, ApiError> {
    let mut ids = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let name = descriptor.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("tag name must not be empty".into()));
        }

        let existing = tag::Entity::find()
            .filter(tag::Column::UserId.eq(user_id))
            .filter(tag::Column::Name.eq(name))
            .one(txn)
            .await?;
        let id = match existing {
            Some(tag) => tag.id,
            None => {
                tag::ActiveModel {
                    id: NotSet,
                    user_id: Set(user_id),
                    name: Set(name.to_string()),
                }
                .insert(txn)
                .await?
                .id
            }
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

async fn link_tags(
    txn: &DatabaseTransaction,
    recipe_id: i64,
    tag_ids: &[i64],
) -> Result<(), ApiError> {
    for &tag_id in tag_ids {
        recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        }
        .insert(txn)
        .await?;
    }
    Ok(())
}
