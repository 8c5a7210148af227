use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // Argon2 hash, not exposed in JSON
}

/// Post row as it appears in the user detail view, either authored by the
/// user or reached through their votes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub post_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Comment row joined with the title of the post it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentWithPost {
    pub id: i32,
    pub comment_text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub post_id: i32,
    pub post_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_json_never_contains_password() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "a@example.com".into(),
            password: "$argon2id$v=19$secret".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("username"));
        assert!(obj.contains_key("email"));
        assert!(!obj.contains_key("password"));
    }
}
