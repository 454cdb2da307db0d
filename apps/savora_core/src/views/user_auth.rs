use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use rand::rngs::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::api_token::{self, Column as TokenCol, Entity as ApiToken};
use crate::models::user::{self, normalize_email, Column as UserCol, Entity as User};
use crate::serializers::user_auth::{
    CreateTokenReq, CreateUserReq, TokenOut, UpdateMeReq, UserOut,
};
use crate::AppState;

pub const PASSWORD_MIN_LEN: usize = 5;

// ---------- handlers ----------

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserReq>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let email = normalize_email(&req.email);
    validate_email(&email)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    validate_password(&req.password)?;

    if User::find()
        .filter(UserCol::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation(
            "user with this email already exists".into(),
        ));
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        id: NotSet,
        email: Set(email),
        name: Set(req.name),
        password_hash: Set(hash_password(&req.password)?),
        is_active: Set(true),
        is_staff: Set(false),
        is_superuser: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(user_id = created.id, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(UserOut {
            email: created.email,
            name: created.name,
        }),
    ))
}

pub async fn create_token(
    State(state): State<AppState>,
    Json(req): Json<CreateTokenReq>,
) -> Result<(StatusCode, Json<TokenOut>), ApiError> {
    // One indistinguishable answer for empty password, unknown email and
    // wrong password.
    if req.password.is_empty() {
        return Err(ApiError::BadCredentials);
    }

    let Some(found) = User::find()
        .filter(UserCol::Email.eq(normalize_email(&req.email)))
        .one(&state.db)
        .await?
    else {
        tracing::warn!("token request for unknown email");
        return Err(ApiError::BadCredentials);
    };

    if !found.is_active || !verify_password(&found.password_hash, &req.password)? {
        tracing::warn!(user_id = found.id, "token request with bad password");
        return Err(ApiError::BadCredentials);
    }

    // Reuse the key if one was already issued.
    if let Some(existing) = ApiToken::find()
        .filter(TokenCol::UserId.eq(found.id))
        .one(&state.db)
        .await?
    {
        return Ok((StatusCode::OK, Json(TokenOut { token: existing.key })));
    }

    let created = api_token::ActiveModel {
        id: NotSet,
        user_id: Set(found.id),
        key: Set(Uuid::new_v4().simple().to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::OK, Json(TokenOut { token: created.key })))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;
    Ok((
        StatusCode::OK,
        Json(UserOut {
            email: user.email,
            name: user.name,
        }),
    ))
}

pub async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateMeReq>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let user = auth_from_header(&state, &headers).await?;

    let mut pending: user::ActiveModel = user.into();
    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
        pending.name = Set(name);
    }
    if let Some(password) = req.password {
        validate_password(&password)?;
        pending.password_hash = Set(hash_password(&password)?);
    }
    pending.updated_at = Set(Utc::now());
    let updated = pending.update(&state.db).await?;

    Ok((
        StatusCode::OK,
        Json(UserOut {
            email: updated.email,
            name: updated.name,
        }),
    ))
}

// ---------- bearer resolution ----------

/// Resolve `Authorization: Bearer <key>` to an active user, or 401. Runs
/// before any resource query on every owner-scoped endpoint.
pub async fn auth_from_header(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<user::Model, ApiError> {
    let key = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let Some(row) = ApiToken::find()
        .filter(TokenCol::Key.eq(key))
        .one(&state.db)
        .await?
    else {
        return Err(ApiError::Unauthorized);
    };

    let Some(user) = User::find_by_id(row.user_id).one(&state.db).await? else {
        return Err(ApiError::Unauthorized);
    };
    if !user.is_active {
        return Err(ApiError::Unauthorized);
    }
    Ok(user)
}

// ---------- field validation ----------

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email
        .rsplit_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(ApiError::Validation("enter a valid email address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < PASSWORD_MIN_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

// ---------- password hashing ----------

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("password hashing failed: {err}");
            ApiError::Internal
        })
}

fn verify_password(phc: &str, password: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(phc).map_err(|err| {
        tracing::error!("stored password hash is unreadable: {err}");
        ApiError::Internal
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "wrong horse").unwrap());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("1234").is_err());
        assert!(validate_password("12345").is_ok());
    }
}
