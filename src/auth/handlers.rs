use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, PublicUser, SignupRequest},
        jwt::{AuthSession, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup with existing email");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, &payload.email, &payload.name, &hash).await {
        Ok(u) => u,
        // Two signups can race past the existence check; the unique index
        // on email decides, and the loser gets the same duplicate error.
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "signup lost uniqueness race");
            return Err(ApiError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "user signed up");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::UnknownEmail);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::IncorrectPassword);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, session))]
pub async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<MeResponse>, ApiError> {
    let user = User::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(MeResponse {
        user: PublicUser::from(user),
        token: session.token,
    }))
}
