// src/models/sport.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::common::double_option;
use crate::models::event::Event;
use crate::models::team::Team;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Sport {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List row: sport plus how many events and teams reference it.
#[derive(Debug, FromRow)]
pub struct SportWithCountsRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub events_count: i64,
    pub teams_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportWithCounts {
    #[serde(flatten)]
    pub sport: Sport,
    pub counts: SportCounts,
}

#[derive(Debug, Serialize)]
pub struct SportCounts {
    pub events: i64,
    pub teams: i64,
}

impl From<SportWithCountsRow> for SportWithCounts {
    fn from(row: SportWithCountsRow) -> Self {
        Self {
            sport: Sport {
                id: row.id,
                name: row.name,
                description: row.description,
                icon: row.icon,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            counts: SportCounts {
                events: row.events_count,
                teams: row.teams_count,
            },
        }
    }
}

/// Detail view: sport plus its latest events and teams.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportDetail {
    #[serde(flatten)]
    pub sport: Sport,
    pub events: Vec<Event>,
    pub teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSportRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Allow-listed PATCH body. Fields absent from the body are left unchanged;
/// fields present are applied, including `null` for nullable columns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSportRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    pub is_active: Option<bool>,
}
