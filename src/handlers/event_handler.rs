use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{
    bad_request, conflict, db_result, not_found, require_record, server_error, unique_violation,
};
use crate::handlers::hydration;
use crate::models::common::{ApiResponse, Pagination};
use crate::models::event::{
    CreateEventRequest, Event, EventDetail, EventListItem, EventListQuery, EventMatchEntry,
    EventRegistration, EventStatus, EventWithCountsRow, EventWithRelations, EventsPage,
    RegisterTeamRequest, RegistrationWithTeam, UpdateEventRequest, UpdateRegistrationRequest,
};
use crate::models::matches::Match;
use crate::models::sport::Sport;
use crate::models::standing::{Standing, StandingWithTeam};
use crate::models::team::{Team, TeamWithMembers};
use crate::models::user::UserBrief;
use crate::ok_or_return;

const EVENT_COUNTS: &str = r#"
    (SELECT COUNT(*) FROM event_registrations er WHERE er.event_id = e.id) AS registrations_count,
    (SELECT COUNT(*) FROM matches m WHERE m.event_id = e.id) AS matches_count"#;

fn push_event_filters<'a>(
    qb: &mut sqlx::QueryBuilder<'a, sqlx::Postgres>,
    query: &'a EventListQuery,
) {
    if let Some(sport_id) = query.sport_id {
        qb.push(" AND e.sport_id = ");
        qb.push_bind(sport_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND e.status = ");
        qb.push_bind(status);
    }
}

/// Paginated event list, newest start date first, with sport, organizer
/// and registration/match counts.
pub async fn list_events(
    query: web::Query<EventListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let mut count_qb = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM events e WHERE 1 = 1");
    push_event_filters(&mut count_qb, &query);
    let (total,): (i64,) = ok_or_return!(db_result(
        count_qb.build_query_as().fetch_one(pool.get_ref()).await
    ));

    let mut qb = sqlx::QueryBuilder::new(format!(
        "SELECT e.*,{EVENT_COUNTS} FROM events e WHERE 1 = 1"
    ));
    push_event_filters(&mut qb, &query);
    qb.push(" ORDER BY e.start_date DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows: Vec<EventWithCountsRow> = ok_or_return!(db_result(
        qb.build_query_as().fetch_all(pool.get_ref()).await
    ));

    let sport_ids: Vec<Uuid> = rows.iter().map(|r| r.sport_id).collect();
    let organizer_ids: Vec<Uuid> = rows.iter().map(|r| r.organizer_id).collect();
    let sports = ok_or_return!(db_result(
        hydration::sports_by_ids(pool.get_ref(), &sport_ids).await
    ));
    let organizers = ok_or_return!(db_result(
        hydration::users_by_ids(pool.get_ref(), &organizer_ids).await
    ));

    let events: Vec<EventListItem> = rows
        .into_iter()
        .filter_map(|row| {
            let (event, counts) = row.into_event();
            let sport = sports.get(&event.sport_id).cloned()?;
            let organizer = organizers.get(&event.organizer_id).cloned()?;
            Some(EventListItem {
                event,
                sport,
                organizer,
                counts,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Success",
        EventsPage {
            events,
            pagination: Pagination::new(total, page, limit),
        },
    )))
}

/// Full event view: sport, organizer, registrations with their teams,
/// matches in schedule order, standings by position.
pub async fn get_event_by_id(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();

    let event: Event = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Event not found"
    ));

    let (sport, organizer) = ok_or_return!(event_relations(pool.get_ref(), &event).await);

    // Registrations, each with the registered team and its members
    let registrations: Vec<EventRegistration> = ok_or_return!(db_result(
        sqlx::query_as(
            "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY registered_at ASC",
        )
        .bind(event_id)
        .fetch_all(pool.get_ref())
        .await
    ));
    let reg_team_ids: Vec<Uuid> = registrations.iter().map(|r| r.team_id).collect();
    let reg_teams = ok_or_return!(db_result(
        hydration::teams_by_ids(pool.get_ref(), &reg_team_ids).await
    ));
    let mut reg_members = ok_or_return!(db_result(
        hydration::members_by_team_ids(pool.get_ref(), &reg_team_ids).await
    ));
    let registrations: Vec<RegistrationWithTeam> = registrations
        .into_iter()
        .filter_map(|registration| {
            let team = reg_teams.get(&registration.team_id).cloned()?;
            let members = reg_members.remove(&registration.team_id).unwrap_or_default();
            Some(RegistrationWithTeam {
                registration,
                team: TeamWithMembers { team, members },
            })
        })
        .collect();

    // Matches in schedule order
    let match_rows: Vec<Match> = ok_or_return!(db_result(
        sqlx::query_as("SELECT * FROM matches WHERE event_id = $1 ORDER BY scheduled_at ASC")
            .bind(event_id)
            .fetch_all(pool.get_ref())
            .await
    ));
    let mut match_team_ids: Vec<Uuid> = Vec::new();
    let mut referee_ids: Vec<Uuid> = Vec::new();
    for m in &match_rows {
        match_team_ids.push(m.home_team_id);
        match_team_ids.push(m.away_team_id);
        if let Some(referee_id) = m.referee_id {
            referee_ids.push(referee_id);
        }
    }
    let match_teams = ok_or_return!(db_result(
        hydration::teams_by_ids(pool.get_ref(), &match_team_ids).await
    ));
    let referees = ok_or_return!(db_result(
        hydration::users_by_ids(pool.get_ref(), &referee_ids).await
    ));
    let matches: Vec<EventMatchEntry> = match_rows
        .into_iter()
        .filter_map(|m| {
            let home_team = match_teams.get(&m.home_team_id).cloned()?;
            let away_team = match_teams.get(&m.away_team_id).cloned()?;
            let referee = m.referee_id.and_then(|id| referees.get(&id).cloned());
            Some(EventMatchEntry {
                details: m,
                home_team,
                away_team,
                referee,
            })
        })
        .collect();

    // Standings ordered by table position
    let standing_rows: Vec<Standing> = ok_or_return!(db_result(
        sqlx::query_as("SELECT * FROM standings WHERE event_id = $1 ORDER BY position ASC")
            .bind(event_id)
            .fetch_all(pool.get_ref())
            .await
    ));
    let standing_team_ids: Vec<Uuid> = standing_rows.iter().map(|s| s.team_id).collect();
    let standing_teams = ok_or_return!(db_result(
        hydration::teams_by_ids(pool.get_ref(), &standing_team_ids).await
    ));
    let standings: Vec<StandingWithTeam> = standing_rows
        .into_iter()
        .filter_map(|standing| {
            let team = standing_teams.get(&standing.team_id).cloned()?;
            Some(StandingWithTeam { standing, team })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Success",
        EventDetail {
            event,
            sport,
            organizer,
            registrations,
            matches,
            standings,
        },
    )))
}

#[tracing::instrument(name = "Create event", skip_all)]
pub async fn create_event(
    body: web::Json<CreateEventRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (name, sport_id, organizer_id, venue, start_date, end_date, registration_deadline, max_teams) =
        match (
            body.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            body.sport_id,
            body.organizer_id,
            body.venue.as_deref().filter(|s| !s.is_empty()),
            body.start_date,
            body.end_date,
            body.registration_deadline,
            body.max_teams,
        ) {
            (
                Some(name),
                Some(sport_id),
                Some(organizer_id),
                Some(venue),
                Some(start_date),
                Some(end_date),
                Some(registration_deadline),
                Some(max_teams),
            ) => (
                name,
                sport_id,
                organizer_id,
                venue,
                start_date,
                end_date,
                registration_deadline,
                max_teams,
            ),
            _ => return Ok(bad_request("Missing required fields")),
        };

    let now = Utc::now();
    let result = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (
            id, name, description, sport_id, organizer_id, venue,
            start_date, end_date, registration_deadline, max_teams,
            min_teams_per_match, max_teams_per_match, entry_fee, prize_pool,
            status, is_public, rules, banner, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $19)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&body.description)
    .bind(sport_id)
    .bind(organizer_id)
    .bind(venue)
    .bind(start_date)
    .bind(end_date)
    .bind(registration_deadline)
    .bind(max_teams)
    .bind(body.min_teams_per_match.unwrap_or(2))
    .bind(body.max_teams_per_match.unwrap_or(2))
    .bind(body.entry_fee.unwrap_or(0.0))
    .bind(body.prize_pool)
    .bind(EventStatus::RegistrationOpen)
    .bind(body.is_public.unwrap_or(true))
    .bind(&body.rules)
    .bind(&body.banner)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(event) => {
            tracing::info!("Created event '{}' with id {}", event.name, event.id);
            let (sport, organizer) = ok_or_return!(event_relations(pool.get_ref(), &event).await);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                "Event created successfully",
                EventWithRelations {
                    event,
                    sport,
                    organizer,
                },
            )))
        }
        Err(e) => {
            tracing::error!("Failed to create event: {}", e);
            Ok(server_error("Failed to create event"))
        }
    }
}

#[tracing::instrument(name = "Update event", skip_all)]
pub async fn update_event(
    path: web::Path<Uuid>,
    body: web::Json<UpdateEventRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();

    let mut qb = sqlx::QueryBuilder::new("UPDATE events SET updated_at = ");
    qb.push_bind(Utc::now());
    if let Some(name) = &body.name {
        qb.push(", name = ");
        qb.push_bind(name);
    }
    if let Some(description) = &body.description {
        qb.push(", description = ");
        qb.push_bind(description);
    }
    if let Some(venue) = &body.venue {
        qb.push(", venue = ");
        qb.push_bind(venue);
    }
    if let Some(start_date) = body.start_date {
        qb.push(", start_date = ");
        qb.push_bind(start_date);
    }
    if let Some(end_date) = body.end_date {
        qb.push(", end_date = ");
        qb.push_bind(end_date);
    }
    if let Some(registration_deadline) = body.registration_deadline {
        qb.push(", registration_deadline = ");
        qb.push_bind(registration_deadline);
    }
    if let Some(max_teams) = body.max_teams {
        qb.push(", max_teams = ");
        qb.push_bind(max_teams);
    }
    if let Some(min_teams_per_match) = body.min_teams_per_match {
        qb.push(", min_teams_per_match = ");
        qb.push_bind(min_teams_per_match);
    }
    if let Some(max_teams_per_match) = body.max_teams_per_match {
        qb.push(", max_teams_per_match = ");
        qb.push_bind(max_teams_per_match);
    }
    if let Some(entry_fee) = body.entry_fee {
        qb.push(", entry_fee = ");
        qb.push_bind(entry_fee);
    }
    if let Some(prize_pool) = &body.prize_pool {
        qb.push(", prize_pool = ");
        qb.push_bind(prize_pool);
    }
    if let Some(status) = body.status {
        qb.push(", status = ");
        qb.push_bind(status);
    }
    if let Some(rules) = &body.rules {
        qb.push(", rules = ");
        qb.push_bind(rules);
    }
    if let Some(banner) = &body.banner {
        qb.push(", banner = ");
        qb.push_bind(banner);
    }
    if let Some(is_public) = body.is_public {
        qb.push(", is_public = ");
        qb.push_bind(is_public);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(event_id);
    qb.push(" RETURNING *");

    match qb.build_query_as::<Event>().fetch_optional(pool.get_ref()).await {
        Ok(Some(event)) => {
            let (sport, organizer) = ok_or_return!(event_relations(pool.get_ref(), &event).await);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                "Event updated successfully",
                EventWithRelations {
                    event,
                    sport,
                    organizer,
                },
            )))
        }
        Ok(None) => Ok(not_found("Event not found")),
        Err(e) => {
            tracing::error!("Failed to update event {}: {}", event_id, e);
            Ok(server_error("Failed to update event"))
        }
    }
}

#[tracing::instrument(name = "Delete event", skip_all)]
pub async fn delete_event(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let event_id = path.into_inner();

    match sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(pool.get_ref())
        .await
    {
        Ok(result) if result.rows_affected() > 0 => Ok(HttpResponse::Ok()
            .json(ApiResponse::<serde_json::Value>::success_message("Event deleted successfully"))),
        Ok(_) => Ok(not_found("Event not found")),
        Err(e) => {
            tracing::error!("Failed to delete event {}: {}", event_id, e);
            Ok(server_error("Failed to delete event"))
        }
    }
}

/// Register a team for an event. The event must exist and be open for
/// registration; a team can register at most once per event.
#[tracing::instrument(name = "Register team for event", skip_all)]
pub async fn register_team(
    path: web::Path<Uuid>,
    body: web::Json<RegisterTeamRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();
    let team_id = match body.team_id {
        Some(team_id) => team_id,
        None => return Ok(bad_request("Team id is required")),
    };

    let event: Event = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Event not found"
    ));
    if event.status != EventStatus::RegistrationOpen {
        return Ok(bad_request("Event is not open for registration"));
    }

    let team: Team = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Team not found"
    ));

    let result = sqlx::query_as::<_, EventRegistration>(
        r#"
        INSERT INTO event_registrations (id, event_id, team_id, status, registered_at)
        VALUES ($1, $2, $3, 'PENDING', $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(team_id)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(registration) => {
            let mut members_map = ok_or_return!(db_result(
                hydration::members_by_team_ids(pool.get_ref(), &[team_id]).await
            ));
            let members = members_map.remove(&team_id).unwrap_or_default();
            Ok(HttpResponse::Created().json(ApiResponse::success(
                "Team registered successfully",
                RegistrationWithTeam {
                    registration,
                    team: TeamWithMembers { team, members },
                },
            )))
        }
        Err(e) => {
            if unique_violation(&e).is_some() {
                return Ok(conflict("Team is already registered for this event"));
            }
            tracing::error!("Failed to register team {} for event {}: {}", team_id, event_id, e);
            Ok(server_error("Failed to register team"))
        }
    }
}

/// Update a registration's approval status.
#[tracing::instrument(name = "Update registration", skip_all)]
pub async fn update_registration(
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateRegistrationRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (event_id, registration_id) = path.into_inner();
    let status = match body.status {
        Some(status) => status,
        None => return Ok(bad_request("No fields to update")),
    };

    let result = sqlx::query_as::<_, EventRegistration>(
        "UPDATE event_registrations SET status = $1 WHERE id = $2 AND event_id = $3 RETURNING *",
    )
    .bind(status)
    .bind(registration_id)
    .bind(event_id)
    .fetch_optional(pool.get_ref())
    .await;

    match result {
        Ok(Some(registration)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success("Registration updated successfully", registration))),
        Ok(None) => Ok(not_found("Registration not found")),
        Err(e) => {
            tracing::error!("Failed to update registration {}: {}", registration_id, e);
            Ok(server_error("Failed to update registration"))
        }
    }
}

/// Load the sport and organizer referenced by an event.
async fn event_relations(
    pool: &PgPool,
    event: &Event,
) -> std::result::Result<(Sport, UserBrief), HttpResponse> {
    let sport: Sport = require_record(
        sqlx::query_as("SELECT * FROM sports WHERE id = $1")
            .bind(event.sport_id)
            .fetch_optional(pool)
            .await,
        "Sport not found",
    )?;
    let organizer: UserBrief = require_record(
        sqlx::query_as(
            "SELECT id, first_name, last_name, email, avatar FROM users WHERE id = $1",
        )
        .bind(event.organizer_id)
        .fetch_optional(pool)
        .await,
        "Organizer not found",
    )?;
    Ok((sport, organizer))
}
