use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewUser, User, UserProfileUpdate, UserStatus},
    traits::{data_objects::UserQueryFilter, UserApiError},
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, UserApiError> {
    let now = Utc::now();
    let email = user.email.clone();
    let result = sqlx::query_as::<_, User>(
        r#"
            INSERT INTO users (name, email, cpf, phone, password_hash, role, pix_key, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.cpf)
    .bind(user.phone)
    .bind(user.password_hash)
    .bind(user.role)
    .bind(user.pix_key)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(user) => {
            debug!("🗃️ User #{} ({}) created with role {}", user.id, user.email, user.role);
            Ok(user)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            if e.message().contains("users.email") {
                Err(UserApiError::EmailAlreadyRegistered(email))
            } else {
                Err(UserApiError::CpfAlreadyRegistered)
            }
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email.trim()).fetch_optional(conn).await
}

/// Fetches users according to the criteria in the `UserQueryFilter`, ordered by name.
pub async fn search_users(query: UserQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM users ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(role) = query.role {
        where_clause.push("role = ");
        where_clause.push_bind_unseparated(role);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(blocked) = query.is_blocked {
        where_clause.push("is_blocked = ");
        where_clause.push_bind_unseparated(blocked);
    }
    if let Some(search) = query.search {
        let pattern = format!("%{}%", search.trim());
        where_clause.push("(name LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR email LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR cpf LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY name ASC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let users = builder.build_query_as::<User>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_users: {}", users.len());
    Ok(users)
}

pub async fn update_profile(
    user_id: i64,
    update: UserProfileUpdate,
    conn: &mut SqliteConnection,
) -> Result<User, UserApiError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for user #{user_id}. Update request skipped.");
        return Err(UserApiError::UserModificationNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE users SET updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(", ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(phone) = update.phone {
        set_clause.push("phone = ");
        set_clause.push_bind_unseparated(phone);
    }
    if let Some(pix_key) = update.pix_key {
        set_clause.push("pix_key = ");
        set_clause.push_bind_unseparated(pix_key);
    }
    if let Some(hash) = update.password_hash {
        set_clause.push("password_hash = ");
        set_clause.push_bind_unseparated(hash);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(user_id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let user = builder.build_query_as::<User>().fetch_optional(conn).await?;
    user.ok_or(UserApiError::UserNotFound(user_id))
}

/// Writes the block flag and status of a user, returning the updated record, or `None` if the user does not exist.
pub async fn set_status(
    user_id: i64,
    status: UserStatus,
    is_blocked: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("UPDATE users SET status = $1, is_blocked = $2, updated_at = $3 WHERE id = $4 RETURNING *")
        .bind(status)
        .bind(is_blocked)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_optional(conn)
        .await
}
