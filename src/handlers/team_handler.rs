use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{bad_request, db_result, not_found, require_record, server_error};
use crate::handlers::hydration;
use crate::models::common::ApiResponse;
use crate::models::event::{EventStatus, EventSummary, RegistrationStatus};
use crate::models::matches::Match;
use crate::models::sport::Sport;
use crate::models::team::{
    CreateTeamRequest, Team, TeamDetail, TeamListItem, TeamListQuery, TeamMatchEntry,
    TeamRegistrationEntry, TeamWithCountsRow, TeamWithSportAndMembers, UpdateTeamRequest,
};
use crate::ok_or_return;

const TEAM_COUNTS: &str = r#"
    (SELECT COUNT(*) FROM event_registrations er WHERE er.team_id = t.id) AS registrations_count,
    (SELECT COUNT(*) FROM matches m WHERE m.home_team_id = t.id) AS home_matches_count,
    (SELECT COUNT(*) FROM matches m WHERE m.away_team_id = t.id) AS away_matches_count"#;

/// List active teams, optionally filtered by sport and name substring,
/// hydrated with sport, members and usage counts.
pub async fn list_teams(
    query: web::Query<TeamListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let mut qb = sqlx::QueryBuilder::new(format!(
        "SELECT t.*,{TEAM_COUNTS} FROM teams t WHERE t.is_active = TRUE"
    ));
    if let Some(sport_id) = query.sport_id {
        qb.push(" AND t.sport_id = ");
        qb.push_bind(sport_id);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND t.name ILIKE ");
        qb.push_bind(format!("%{}%", search));
    }
    qb.push(" ORDER BY t.name ASC");

    let rows: Vec<TeamWithCountsRow> = ok_or_return!(db_result(
        qb.build_query_as().fetch_all(pool.get_ref()).await
    ));

    let team_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let sport_ids: Vec<Uuid> = rows.iter().map(|r| r.sport_id).collect();
    let sports = ok_or_return!(db_result(
        hydration::sports_by_ids(pool.get_ref(), &sport_ids).await
    ));
    let mut members = ok_or_return!(db_result(
        hydration::members_by_team_ids(pool.get_ref(), &team_ids).await
    ));

    let teams: Vec<TeamListItem> = rows
        .into_iter()
        .filter_map(|row| {
            let (team, counts) = row.into_team();
            let sport = sports.get(&team.sport_id).cloned()?;
            let members = members.remove(&team.id).unwrap_or_default();
            Some(TeamListItem {
                team,
                sport,
                members,
                counts,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success("Success", teams)))
}

/// Get one team fully hydrated: sport, members, registrations and the
/// latest home/away matches.
pub async fn get_team_by_id(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let team_id = path.into_inner();

    let team: Team = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Team not found"
    ));

    let sport: Sport = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM sports WHERE id = $1")
            .bind(team.sport_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Sport not found"
    ));

    let mut members_map = ok_or_return!(db_result(
        hydration::members_by_team_ids(pool.get_ref(), &[team_id]).await
    ));
    let members = members_map.remove(&team_id).unwrap_or_default();

    let registration_rows: Vec<TeamRegistrationRow> = ok_or_return!(db_result(
        sqlx::query_as(
            r#"
            SELECT er.id, er.event_id, er.team_id, er.status, er.registered_at,
                   e.name AS event_name, e.start_date, e.end_date,
                   e.status AS event_status
            FROM event_registrations er
            JOIN events e ON er.event_id = e.id
            WHERE er.team_id = $1
            ORDER BY er.registered_at DESC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool.get_ref())
        .await
    ));
    let registrations = registration_rows
        .into_iter()
        .map(TeamRegistrationEntry::from)
        .collect();

    let home_matches = ok_or_return!(team_match_history(pool.get_ref(), team_id, true).await);
    let away_matches = ok_or_return!(team_match_history(pool.get_ref(), team_id, false).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Success",
        TeamDetail {
            team,
            sport,
            members,
            registrations,
            home_matches,
            away_matches,
        },
    )))
}

#[tracing::instrument(name = "Create team", skip_all)]
pub async fn create_team(
    body: web::Json<CreateTeamRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let name = match body.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => return Ok(bad_request("Team name and sport are required")),
    };
    let sport_id = match body.sport_id {
        Some(sport_id) => sport_id,
        None => return Ok(bad_request("Team name and sport are required")),
    };

    let team_id = Uuid::new_v4();
    let now = Utc::now();

    // Team and inline members are created atomically
    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            tracing::error!("Failed to start transaction: {}", e);
            return Ok(server_error("Failed to create team"));
        }
    };

    let team: Team = match sqlx::query_as(
        r#"
        INSERT INTO teams (id, name, sport_id, logo, description, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
        RETURNING *
        "#,
    )
    .bind(team_id)
    .bind(&name)
    .bind(sport_id)
    .bind(&body.logo)
    .bind(&body.description)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(team) => team,
        Err(e) => {
            tracing::error!("Failed to create team: {}", e);
            let _ = tx.rollback().await;
            return Ok(server_error("Failed to create team"));
        }
    };

    for member in body.members.as_deref().unwrap_or_default() {
        if let Err(e) = sqlx::query(
            r#"
            INSERT INTO team_members (id, team_id, user_id, role, jersey_number, position, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(team_id)
        .bind(member.user_id)
        .bind(member.role.as_deref().unwrap_or("PLAYER"))
        .bind(member.jersey_number)
        .bind(&member.position)
        .bind(now)
        .execute(&mut *tx)
        .await
        {
            tracing::error!("Failed to add team member: {}", e);
            let _ = tx.rollback().await;
            return Ok(server_error("Failed to create team"));
        }
    }

    if let Err(e) = tx.commit().await {
        tracing::error!("Failed to commit team creation: {}", e);
        return Ok(server_error("Failed to create team"));
    }
    tracing::info!("Created team '{}' with id {}", team.name, team.id);

    let hydrated = ok_or_return!(hydrate_team(pool.get_ref(), team).await);
    Ok(HttpResponse::Created().json(ApiResponse::success("Team created successfully", hydrated)))
}

#[tracing::instrument(name = "Update team", skip_all)]
pub async fn update_team(
    path: web::Path<Uuid>,
    body: web::Json<UpdateTeamRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();

    let mut qb = sqlx::QueryBuilder::new("UPDATE teams SET updated_at = ");
    qb.push_bind(Utc::now());
    if let Some(name) = &body.name {
        qb.push(", name = ");
        qb.push_bind(name);
    }
    if let Some(logo) = &body.logo {
        qb.push(", logo = ");
        qb.push_bind(logo);
    }
    if let Some(description) = &body.description {
        qb.push(", description = ");
        qb.push_bind(description);
    }
    if let Some(is_active) = body.is_active {
        qb.push(", is_active = ");
        qb.push_bind(is_active);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(team_id);
    qb.push(" RETURNING *");

    match qb.build_query_as::<Team>().fetch_optional(pool.get_ref()).await {
        Ok(Some(team)) => {
            let hydrated = ok_or_return!(hydrate_team(pool.get_ref(), team).await);
            Ok(HttpResponse::Ok().json(ApiResponse::success("Team updated successfully", hydrated)))
        }
        Ok(None) => Ok(not_found("Team not found")),
        Err(e) => {
            tracing::error!("Failed to update team {}: {}", team_id, e);
            Ok(server_error("Failed to update team"))
        }
    }
}

#[tracing::instrument(name = "Delete team", skip_all)]
pub async fn delete_team(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let team_id = path.into_inner();

    match sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(team_id)
        .execute(pool.get_ref())
        .await
    {
        Ok(result) if result.rows_affected() > 0 => Ok(HttpResponse::Ok()
            .json(ApiResponse::<serde_json::Value>::success_message("Team deleted successfully"))),
        Ok(_) => Ok(not_found("Team not found")),
        Err(e) => {
            tracing::error!("Failed to delete team {}: {}", team_id, e);
            Ok(server_error("Failed to delete team"))
        }
    }
}

/// Attach sport and members to a freshly written team row.
async fn hydrate_team(
    pool: &PgPool,
    team: Team,
) -> std::result::Result<TeamWithSportAndMembers, HttpResponse> {
    let sport: Sport = require_record(
        sqlx::query_as("SELECT * FROM sports WHERE id = $1")
            .bind(team.sport_id)
            .fetch_optional(pool)
            .await,
        "Sport not found",
    )?;
    let mut members_map = db_result(hydration::members_by_team_ids(pool, &[team.id]).await)?;
    let members = members_map.remove(&team.id).unwrap_or_default();
    Ok(TeamWithSportAndMembers {
        team,
        sport,
        members,
    })
}

/// Latest five matches a team played on one side, with opponent and event name.
async fn team_match_history(
    pool: &PgPool,
    team_id: Uuid,
    home: bool,
) -> std::result::Result<Vec<TeamMatchEntry>, HttpResponse> {
    let sql = if home {
        "SELECT * FROM matches WHERE home_team_id = $1 ORDER BY scheduled_at DESC LIMIT 5"
    } else {
        "SELECT * FROM matches WHERE away_team_id = $1 ORDER BY scheduled_at DESC LIMIT 5"
    };
    let matches: Vec<Match> = db_result(
        sqlx::query_as(sql)
            .bind(team_id)
            .fetch_all(pool)
            .await,
    )?;

    let opponent_ids: Vec<Uuid> = matches
        .iter()
        .map(|m| if home { m.away_team_id } else { m.home_team_id })
        .collect();
    let event_ids: Vec<Uuid> = matches.iter().map(|m| m.event_id).collect();

    let opponents = db_result(hydration::teams_by_ids(pool, &opponent_ids).await)?;
    let event_names = db_result(hydration::event_names_by_ids(pool, &event_ids).await)?;

    Ok(matches
        .into_iter()
        .filter_map(|m| {
            let opponent_id = if home { m.away_team_id } else { m.home_team_id };
            let opponent = opponents.get(&opponent_id).cloned()?;
            let event_name = event_names.get(&m.event_id).cloned()?;
            Some(TeamMatchEntry {
                details: m,
                opponent,
                event_name,
            })
        })
        .collect())
}

/// Flat join row used by the team detail view.
#[derive(sqlx::FromRow)]
struct TeamRegistrationRow {
    id: Uuid,
    event_id: Uuid,
    team_id: Uuid,
    status: RegistrationStatus,
    registered_at: chrono::DateTime<Utc>,
    event_name: String,
    start_date: chrono::DateTime<Utc>,
    end_date: chrono::DateTime<Utc>,
    event_status: EventStatus,
}

impl From<TeamRegistrationRow> for TeamRegistrationEntry {
    fn from(row: TeamRegistrationRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            team_id: row.team_id,
            status: row.status,
            registered_at: row.registered_at,
            event: EventSummary {
                id: row.event_id,
                name: row.event_name,
                start_date: row.start_date,
                end_date: row.end_date,
                status: row.event_status,
            },
        }
    }
}
