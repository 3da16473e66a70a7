// src/models/team.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::common::double_option;
use crate::models::event::{EventSummary, RegistrationStatus};
use crate::models::sport::Sport;
use crate::models::user::UserBrief;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub sport_id: Uuid,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub jersey_number: Option<i32>,
    pub position: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberWithUser {
    #[serde(flatten)]
    pub member: TeamMember,
    pub user: UserBrief,
}

/// Join row: team member plus the user columns needed for hydration.
#[derive(Debug, FromRow)]
pub struct TeamMemberUserRow {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub jersey_number: Option<i32>,
    pub position: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<TeamMemberUserRow> for TeamMemberWithUser {
    fn from(row: TeamMemberUserRow) -> Self {
        Self {
            member: TeamMember {
                id: row.id,
                team_id: row.team_id,
                user_id: row.user_id,
                role: row.role,
                jersey_number: row.jersey_number,
                position: row.position,
                joined_at: row.joined_at,
            },
            user: UserBrief {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                avatar: row.avatar,
            },
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TeamWithCountsRow {
    pub id: Uuid,
    pub name: String,
    pub sport_id: Uuid,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub registrations_count: i64,
    pub home_matches_count: i64,
    pub away_matches_count: i64,
}

impl TeamWithCountsRow {
    pub fn into_team(self) -> (Team, TeamCounts) {
        (
            Team {
                id: self.id,
                name: self.name,
                sport_id: self.sport_id,
                logo: self.logo,
                description: self.description,
                is_active: self.is_active,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            TeamCounts {
                registrations: self.registrations_count,
                home_matches: self.home_matches_count,
                away_matches: self.away_matches_count,
            },
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCounts {
    pub registrations: i64,
    pub home_matches: i64,
    pub away_matches: i64,
}

/// List item: team hydrated with its sport, members and usage counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListItem {
    #[serde(flatten)]
    pub team: Team,
    pub sport: Sport,
    pub members: Vec<TeamMemberWithUser>,
    pub counts: TeamCounts,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMemberWithUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWithSportAndMembers {
    #[serde(flatten)]
    pub team: Team,
    pub sport: Sport,
    pub members: Vec<TeamMemberWithUser>,
}

/// A registration as seen from the team side, with the event summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRegistrationEntry {
    pub id: Uuid,
    pub event_id: Uuid,
    pub team_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub event: EventSummary,
}

/// A past or upcoming match as seen from the team side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMatchEntry {
    #[serde(flatten)]
    pub details: crate::models::matches::Match,
    pub opponent: Team,
    pub event_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub sport: Sport,
    pub members: Vec<TeamMemberWithUser>,
    pub registrations: Vec<TeamRegistrationEntry>,
    pub home_matches: Vec<TeamMatchEntry>,
    pub away_matches: Vec<TeamMatchEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: Option<String>,
    pub sport_id: Option<Uuid>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<CreateTeamMemberRequest>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberRequest {
    pub user_id: Uuid,
    pub role: Option<String>,
    pub jersey_number: Option<i32>,
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub logo: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListQuery {
    pub sport_id: Option<Uuid>,
    pub search: Option<String>,
}
