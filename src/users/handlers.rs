use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUser, DeleteResponse, LoginRequest, LoginResponse, UpdateUser, UserDetails},
        repo_types::{CommentWithPost, PostSummary, User},
        service::{self, is_valid_email, MIN_PASSWORD_LEN},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/login", post(login))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserDetails>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(ApiError::no_such_user)?;

    let posts = PostSummary::list_by_author(&state.db, id).await?;
    let comments = CommentWithPost::list_by_author(&state.db, id).await?;
    let voted_posts = PostSummary::list_voted_by(&state.db, id).await?;

    Ok(Json(UserDetails {
        user,
        posts,
        comments,
        voted_posts,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUser>,
) -> Result<Json<User>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Validation("Email already in use".into()));
    }

    let hash = service::hash_password(payload.password, state.config.hash.clone()).await?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash)
        .await
        .map_err(map_unique_violation)?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Authentication("No user with that email address"));
        }
    };

    let ok = service::verify_password(payload.password, user.password.clone()).await?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::Authentication("Incorrect password!"));
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        user,
        message: "You are now logged in",
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            warn!(%email, "invalid email");
            return Err(ApiError::Validation("Invalid email address".into()));
        }
        if let Some(other) = User::find_by_email(&state.db, email).await? {
            if other.id != id {
                warn!(%email, "email already registered");
                return Err(ApiError::Validation("Email already in use".into()));
            }
        }
    }

    // Re-hash only when the payload actually carries a password.
    let hash = match payload.password {
        Some(plain) => {
            if plain.chars().count() < MIN_PASSWORD_LEN {
                warn!("password too short");
                return Err(ApiError::Validation(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            Some(service::hash_password(plain, state.config.hash.clone()).await?)
        }
        None => None,
    };

    let user = User::update_by_id(
        &state.db,
        id,
        payload.username.as_deref(),
        payload.email.as_deref(),
        hash.as_ref(),
    )
    .await
    .map_err(map_unique_violation)?
    .ok_or_else(ApiError::no_such_user)?;

    info!(user_id = user.id, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = User::delete_by_id(&state.db, id).await?;
    if deleted == 0 {
        return Err(ApiError::no_such_user());
    }
    info!(user_id = id, "user deleted");
    Ok(Json(DeleteResponse { deleted }))
}

// The email pre-check races with concurrent inserts; the unique index is the
// authority, so its violation still surfaces as a validation failure.
fn map_unique_violation(e: anyhow::Error) -> ApiError {
    if let Some(sqlx::Error::Database(db)) = e.downcast_ref::<sqlx::Error>() {
        if db.is_unique_violation() {
            return ApiError::Validation("Email already in use".into());
        }
    }
    ApiError::Internal(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::ErrorKind;

    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn db_error(unique: bool) -> anyhow::Error {
        sqlx::Error::Database(Box::new(StubDbError { unique })).into()
    }

    #[test]
    fn duplicate_email_surfaces_as_validation() {
        let err = map_unique_violation(db_error(true));
        assert!(matches!(err, ApiError::Validation(m) if m == "Email already in use"));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = map_unique_violation(db_error(false));
        assert!(matches!(err, ApiError::Internal(_)));

        let err = map_unique_violation(anyhow::anyhow!("connection refused"));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
