use sqlx::PgPool;

use crate::users::password::HashedPassword;
use crate::users::repo_types::{CommentWithPost, PostSummary, User};

impl User {
    /// List every user, newest id last.
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM "user"
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM "user"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM "user"
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with an already-hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password: &HashedPassword,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "user" (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password.as_str())
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Update whichever fields are present; absent fields keep their value.
    /// Returns None when no row matches the id.
    pub async fn update_by_id(
        db: &PgPool,
        id: i32,
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&HashedPassword>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE "user"
            SET username = COALESCE($2, username),
                email    = COALESCE($3, email),
                password = COALESCE($4, password)
            WHERE id = $1
            RETURNING id, username, email, password
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password.map(HashedPassword::as_str))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Delete a user by id, returning the number of rows removed.
    pub async fn delete_by_id(db: &PgPool, id: i32) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

impl PostSummary {
    /// Posts authored by the user.
    pub async fn list_by_author(db: &PgPool, user_id: i32) -> anyhow::Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT id, title, post_url, created_at
            FROM post
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(posts)
    }

    /// Posts the user has voted on, reached through the vote join table.
    pub async fn list_voted_by(db: &PgPool, user_id: i32) -> anyhow::Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            r#"
            SELECT p.id, p.title, p.post_url, p.created_at
            FROM post p
            JOIN vote v ON v.post_id = p.id
            WHERE v.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(posts)
    }
}

impl CommentWithPost {
    /// Comments written by the user, each carrying its post's title.
    pub async fn list_by_author(db: &PgPool, user_id: i32) -> anyhow::Result<Vec<CommentWithPost>> {
        let comments = sqlx::query_as::<_, CommentWithPost>(
            r#"
            SELECT c.id, c.comment_text, c.created_at, c.post_id, p.title AS post_title
            FROM comment c
            JOIN post p ON p.id = c.post_id
            WHERE c.user_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(comments)
    }
}
