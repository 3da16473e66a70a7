// src/models/event.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::common::{double_option, Pagination};
use crate::models::matches::Match;
use crate::models::sport::Sport;
use crate::models::standing::StandingWithTeam;
use crate::models::team::{Team, TeamWithMembers};
use crate::models::user::UserBrief;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Upcoming,
    RegistrationOpen,
    RegistrationClosed,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sport_id: Uuid,
    pub organizer_id: Uuid,
    pub venue: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_teams: i32,
    pub min_teams_per_match: i32,
    pub max_teams_per_match: i32,
    pub entry_fee: f64,
    pub prize_pool: Option<f64>,
    pub status: EventStatus,
    pub is_public: bool,
    pub rules: Option<String>,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short event projection embedded in team/match hydrations.
#[derive(Debug, FromRow, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: EventStatus,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub team_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct EventWithCountsRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sport_id: Uuid,
    pub organizer_id: Uuid,
    pub venue: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub max_teams: i32,
    pub min_teams_per_match: i32,
    pub max_teams_per_match: i32,
    pub entry_fee: f64,
    pub prize_pool: Option<f64>,
    pub status: EventStatus,
    pub is_public: bool,
    pub rules: Option<String>,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub registrations_count: i64,
    pub matches_count: i64,
}

impl EventWithCountsRow {
    pub fn into_event(self) -> (Event, EventCounts) {
        (
            Event {
                id: self.id,
                name: self.name,
                description: self.description,
                sport_id: self.sport_id,
                organizer_id: self.organizer_id,
                venue: self.venue,
                start_date: self.start_date,
                end_date: self.end_date,
                registration_deadline: self.registration_deadline,
                max_teams: self.max_teams,
                min_teams_per_match: self.min_teams_per_match,
                max_teams_per_match: self.max_teams_per_match,
                entry_fee: self.entry_fee,
                prize_pool: self.prize_pool,
                status: self.status,
                is_public: self.is_public,
                rules: self.rules,
                banner: self.banner,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            EventCounts {
                registrations: self.registrations_count,
                matches: self.matches_count,
            },
        )
    }
}

#[derive(Debug, Serialize)]
pub struct EventCounts {
    pub registrations: i64,
    pub matches: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListItem {
    #[serde(flatten)]
    pub event: Event,
    pub sport: Sport,
    pub organizer: UserBrief,
    pub counts: EventCounts,
}

/// Paginated list payload: `data` carries the page plus its metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    pub events: Vec<EventListItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithRelations {
    #[serde(flatten)]
    pub event: Event,
    pub sport: Sport,
    pub organizer: UserBrief,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationWithTeam {
    #[serde(flatten)]
    pub registration: EventRegistration,
    pub team: TeamWithMembers,
}

/// A match as embedded in the event detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMatchEntry {
    #[serde(flatten)]
    pub details: Match,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee: Option<UserBrief>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub sport: Sport,
    pub organizer: UserBrief,
    pub registrations: Vec<RegistrationWithTeam>,
    pub matches: Vec<EventMatchEntry>,
    pub standings: Vec<StandingWithTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sport_id: Option<Uuid>,
    pub organizer_id: Option<Uuid>,
    pub venue: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_teams: Option<i32>,
    pub min_teams_per_match: Option<i32>,
    pub max_teams_per_match: Option<i32>,
    pub entry_fee: Option<f64>,
    pub prize_pool: Option<f64>,
    pub rules: Option<String>,
    pub banner: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub venue: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_teams: Option<i32>,
    pub min_teams_per_match: Option<i32>,
    pub max_teams_per_match: Option<i32>,
    pub entry_fee: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub prize_pool: Option<Option<f64>>,
    pub status: Option<EventStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub rules: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub banner: Option<Option<String>>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub sport_id: Option<Uuid>,
    pub status: Option<EventStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamRequest {
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRegistrationRequest {
    pub status: Option<RegistrationStatus>,
}
