// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Organizer,
    Admin,
}

/// Public projection of a user row. The password hash is never selected
/// into this type.
#[derive(Debug, FromRow, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Minimal user projection embedded in hydrated responses
/// (team members, organizers, referees, scorecard authors).
#[derive(Debug, FromRow, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserBrief {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct UserWithCountsRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub organized_events_count: i64,
    pub team_memberships_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub user: UserPublic,
    pub counts: UserCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub organized_events: i64,
    pub team_memberships: i64,
}

impl From<UserWithCountsRow> for UserWithCounts {
    fn from(row: UserWithCountsRow) -> Self {
        Self {
            user: UserPublic {
                id: row.id,
                email: row.email,
                username: row.username,
                first_name: row.first_name,
                last_name: row.last_name,
                phone: row.phone,
                role: row.role,
                avatar: row.avatar,
                is_active: row.is_active,
                created_at: row.created_at,
            },
            counts: UserCounts {
                organized_events: row.organized_events_count,
                team_memberships: row.team_memberships_count,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}
