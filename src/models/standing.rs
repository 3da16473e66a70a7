// src/models/standing.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::team::Team;

/// Per-team, per-event points-table row.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub id: Uuid,
    pub event_id: Uuid,
    pub team_id: Uuid,
    pub position: i32,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingWithTeam {
    #[serde(flatten)]
    pub standing: Standing,
    pub team: Team,
}
