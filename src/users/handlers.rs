use axum::{
    extract::{FromRef, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::{credentials, extractors::CurrentUser, jwt::JwtKeys, password::hash_password},
    crud,
    error::AppError,
    response,
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, UpdateUserRequest},
        repo::{NewUser, UserPatch, Users},
        validator,
    },
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validator::validate_register(&payload).into_result()?;

    let password_hash = hash_password(payload.password.as_deref().unwrap_or_default())?;
    let users = Users::new(state.db.clone());
    let user = crud::create(
        &users,
        NewUser {
            name: payload.name.unwrap_or_default(),
            email: payload.email.unwrap_or_default(),
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, "user registered");
    Ok(response::created(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.as_deref().unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    let users = Users::new(state.db.clone());
    let user = credentials::authenticate(&users, email, password).await?;
    let token = JwtKeys::from_ref(&state).issue(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(response::ok(
        "success",
        LoginResponse {
            user: user.into(),
            token,
        },
    ))
}

#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    response::ok("success", PublicUser::from(user))
}

#[instrument(skip(state, user, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validator::validate_update(&payload).into_result()?;

    let password_hash = match payload.password.as_deref() {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };
    let users = Users::new(state.db.clone());
    let updated = crud::update(
        &users,
        &user.id,
        UserPatch {
            name: payload.name,
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, "user updated");
    Ok(response::ok("updated", PublicUser::from(updated)))
}
