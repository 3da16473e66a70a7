use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{
    bad_request, conflict, constraint_field, db_result, server_error, unique_violation,
};
use crate::models::common::ApiResponse;
use crate::models::user::{
    CreateUserRequest, UserListQuery, UserPublic, UserRole, UserWithCounts, UserWithCountsRow,
};
use crate::ok_or_return;
use crate::utils::password::hash_password;

const USER_COLUMNS: &str = "u.id, u.email, u.username, u.first_name, u.last_name, \
                            u.phone, u.role, u.avatar, u.is_active, u.created_at";

/// List active users with organizer/membership counts.
/// Supports `role` and a case-insensitive `search` over name, email and
/// username. The password hash is never selected.
pub async fn list_users(
    query: web::Query<UserListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let mut qb = sqlx::QueryBuilder::new(format!(
        r#"
        SELECT {USER_COLUMNS},
            (SELECT COUNT(*) FROM events e WHERE e.organizer_id = u.id) AS organized_events_count,
            (SELECT COUNT(*) FROM team_members tm WHERE tm.user_id = u.id) AS team_memberships_count
        FROM users u
        WHERE u.is_active = TRUE
        "#
    ));

    if let Some(role) = query.role {
        qb.push(" AND u.role = ");
        qb.push_bind(role);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (u.first_name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR u.last_name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR u.email ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR u.username ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" ORDER BY u.created_at DESC");

    let rows: Vec<UserWithCountsRow> = ok_or_return!(db_result(
        qb.build_query_as().fetch_all(pool.get_ref()).await
    ));

    let users: Vec<UserWithCounts> = rows.into_iter().map(UserWithCounts::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success("Success", users)))
}

#[tracing::instrument(name = "Create user", skip_all)]
pub async fn create_user(
    body: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (email, username, password, first_name, last_name) = match (
        body.email.as_deref().filter(|s| !s.is_empty()),
        body.username.as_deref().filter(|s| !s.is_empty()),
        body.password.as_deref().filter(|s| !s.is_empty()),
        body.first_name.as_deref().filter(|s| !s.is_empty()),
        body.last_name.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(email), Some(username), Some(password), Some(first_name), Some(last_name)) => {
            (email, username, password, first_name, last_name)
        }
        _ => return Ok(bad_request("Missing required fields")),
    };

    let password_hash = hash_password(password);
    let now = Utc::now();

    let result = sqlx::query_as::<_, UserPublic>(&format!(
        r#"
        INSERT INTO users AS u (
            id, email, username, password_hash, first_name, last_name,
            phone, role, avatar, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind(&password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(&body.phone)
    .bind(body.role.unwrap_or(UserRole::User))
    .bind(&body.avatar)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(user) => {
            tracing::info!("Created user '{}' with id {}", user.username, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success("User created successfully", user)))
        }
        Err(e) => {
            if let Some(constraint) = unique_violation(&e) {
                let field = constraint_field(&constraint, "users");
                return Ok(conflict(&format!("User with this {} already exists", field)));
            }
            tracing::error!("Failed to create user: {}", e);
            Ok(server_error("Failed to create user"))
        }
    }
}
