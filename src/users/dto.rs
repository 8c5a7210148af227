use serde::{Deserialize, Serialize};

use crate::users::repo_types::{CommentWithPost, PostSummary, User};

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for a partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub message: &'static str,
}

/// User detail view with the eager-loaded association graph.
#[derive(Debug, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub posts: Vec<PostSummary>,
    pub comments: Vec<CommentWithPost>,
    pub voted_posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}
