// src/models/matches.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::common::double_option;
use crate::models::sport::Sport;
use crate::models::team::{Team, TeamMemberWithUser, TeamWithMembers};
use crate::models::user::UserBrief;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
    Postponed,
    Cancelled,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub event_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub referee_id: Option<Uuid>,
    pub venue: String,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub round: Option<i32>,
    pub match_number: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event projection embedded in match responses.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchEventBrief {
    pub id: Uuid,
    pub name: String,
    pub sport: Sport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithRelations {
    #[serde(flatten)]
    pub details: Match,
    pub event: MatchEventBrief,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee: Option<UserBrief>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCounts {
    pub scorecards: i64,
    pub statistics: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListItem {
    #[serde(flatten)]
    pub base: MatchWithRelations,
    pub counts: MatchCounts,
}

#[derive(Debug, FromRow, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub id: Uuid,
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub event_type: String,
    pub minute: Option<i32>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardWithUser {
    #[serde(flatten)]
    pub scorecard: Scorecard,
    pub user: UserBrief,
}

#[derive(Debug, FromRow, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatistic {
    pub id: Uuid,
    pub match_id: Uuid,
    pub member_id: Uuid,
    pub stat_type: String,
    pub value: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticWithPlayer {
    #[serde(flatten)]
    pub statistic: MatchStatistic,
    pub player: TeamMemberWithUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEventDetail {
    pub id: Uuid,
    pub name: String,
    pub sport: Sport,
    pub venue: String,
    pub status: crate::models::event::EventStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    #[serde(flatten)]
    pub details: Match,
    pub event: MatchEventDetail,
    pub home_team: TeamWithMembers,
    pub away_team: TeamWithMembers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee: Option<UserBrief>,
    pub scorecards: Vec<ScorecardWithUser>,
    pub statistics: Vec<StatisticWithPlayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub event_id: Option<Uuid>,
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    pub referee_id: Option<Uuid>,
    pub venue: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub round: Option<i32>,
    pub match_number: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    pub venue: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub started_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ended_at: Option<Option<DateTime<Utc>>>,
    pub status: Option<MatchStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub home_score: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub away_score: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub round: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub match_number: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub referee_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListQuery {
    pub event_id: Option<Uuid>,
    pub status: Option<MatchStatus>,
    pub team_id: Option<Uuid>,
}
