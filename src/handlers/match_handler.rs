use actix_web::{web, HttpResponse, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{bad_request, db_result, not_found, require_record, server_error};
use crate::handlers::hydration;
use crate::models::common::ApiResponse;
use crate::models::event::EventStatus;
use crate::models::matches::{
    CreateMatchRequest, Match, MatchCounts, MatchDetail, MatchEventBrief, MatchEventDetail,
    MatchListItem, MatchListQuery, MatchStatistic, MatchStatus, MatchWithRelations, Scorecard,
    ScorecardWithUser, StatisticWithPlayer, UpdateMatchRequest,
};
use crate::models::sport::Sport;
use crate::models::team::{TeamMemberUserRow, TeamMemberWithUser, TeamWithMembers};
use crate::ok_or_return;
use crate::standings::StandingsService;

const MATCH_COUNTS: &str = r#"
    (SELECT COUNT(*) FROM scorecards sc WHERE sc.match_id = m.id) AS scorecards_count,
    (SELECT COUNT(*) FROM match_statistics ms WHERE ms.match_id = m.id) AS statistics_count"#;

/// List matches in schedule order. Filters: event, status, and team
/// (matching either side).
pub async fn list_matches(
    query: web::Query<MatchListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let mut qb = sqlx::QueryBuilder::new(format!(
        "SELECT m.*,{MATCH_COUNTS} FROM matches m WHERE 1 = 1"
    ));
    if let Some(event_id) = query.event_id {
        qb.push(" AND m.event_id = ");
        qb.push_bind(event_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND m.status = ");
        qb.push_bind(status);
    }
    if let Some(team_id) = query.team_id {
        qb.push(" AND (m.home_team_id = ");
        qb.push_bind(team_id);
        qb.push(" OR m.away_team_id = ");
        qb.push_bind(team_id);
        qb.push(")");
    }
    qb.push(" ORDER BY m.scheduled_at ASC");

    let rows: Vec<MatchWithCountsRow> = ok_or_return!(db_result(
        qb.build_query_as().fetch_all(pool.get_ref()).await
    ));

    let mut event_ids: Vec<Uuid> = Vec::new();
    let mut team_ids: Vec<Uuid> = Vec::new();
    let mut referee_ids: Vec<Uuid> = Vec::new();
    for row in &rows {
        event_ids.push(row.event_id);
        team_ids.push(row.home_team_id);
        team_ids.push(row.away_team_id);
        if let Some(referee_id) = row.referee_id {
            referee_ids.push(referee_id);
        }
    }

    let event_briefs = ok_or_return!(event_briefs_by_ids(pool.get_ref(), &event_ids).await);
    let teams = ok_or_return!(db_result(
        hydration::teams_by_ids(pool.get_ref(), &team_ids).await
    ));
    let referees = ok_or_return!(db_result(
        hydration::users_by_ids(pool.get_ref(), &referee_ids).await
    ));

    let matches: Vec<MatchListItem> = rows
        .into_iter()
        .filter_map(|row| {
            let (details, counts) = row.into_match();
            let event = event_briefs.get(&details.event_id).cloned()?;
            let home_team = teams.get(&details.home_team_id).cloned()?;
            let away_team = teams.get(&details.away_team_id).cloned()?;
            let referee = details.referee_id.and_then(|id| referees.get(&id).cloned());
            Some(MatchListItem {
                base: MatchWithRelations {
                    details,
                    event,
                    home_team,
                    away_team,
                    referee,
                },
                counts,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success("Success", matches)))
}

/// Full match view: event, both squads, referee, scorecard timeline and
/// per-player statistics.
pub async fn get_match_by_id(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();

    let details: Match = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM matches WHERE id = $1")
            .bind(match_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Match not found"
    ));

    let event_row: (Uuid, String, Uuid, String, EventStatus) = ok_or_return!(require_record(
        sqlx::query_as("SELECT id, name, sport_id, venue, status FROM events WHERE id = $1")
            .bind(details.event_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Event not found"
    ));
    let sport: Sport = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM sports WHERE id = $1")
            .bind(event_row.2)
            .fetch_optional(pool.get_ref())
            .await,
        "Sport not found"
    ));
    let event = MatchEventDetail {
        id: event_row.0,
        name: event_row.1,
        sport,
        venue: event_row.3,
        status: event_row.4,
    };

    let team_ids = [details.home_team_id, details.away_team_id];
    let teams = ok_or_return!(db_result(
        hydration::teams_by_ids(pool.get_ref(), &team_ids).await
    ));
    let mut members = ok_or_return!(db_result(
        hydration::members_by_team_ids(pool.get_ref(), &team_ids).await
    ));
    let home_team = match teams.get(&details.home_team_id).cloned() {
        Some(team) => TeamWithMembers {
            members: members.remove(&team.id).unwrap_or_default(),
            team,
        },
        None => return Ok(not_found("Team not found")),
    };
    let away_team = match teams.get(&details.away_team_id).cloned() {
        Some(team) => TeamWithMembers {
            members: members.remove(&team.id).unwrap_or_default(),
            team,
        },
        None => return Ok(not_found("Team not found")),
    };

    let referee = match details.referee_id {
        Some(referee_id) => {
            let referees = ok_or_return!(db_result(
                hydration::users_by_ids(pool.get_ref(), &[referee_id]).await
            ));
            referees.get(&referee_id).cloned()
        }
        None => None,
    };

    // Scorecard timeline with the recording user
    let scorecard_rows: Vec<Scorecard> = ok_or_return!(db_result(
        sqlx::query_as("SELECT * FROM scorecards WHERE match_id = $1 ORDER BY recorded_at ASC")
            .bind(match_id)
            .fetch_all(pool.get_ref())
            .await
    ));
    let scorecard_user_ids: Vec<Uuid> = scorecard_rows.iter().map(|s| s.user_id).collect();
    let scorecard_users = ok_or_return!(db_result(
        hydration::users_by_ids(pool.get_ref(), &scorecard_user_ids).await
    ));
    let scorecards: Vec<ScorecardWithUser> = scorecard_rows
        .into_iter()
        .filter_map(|scorecard| {
            let user = scorecard_users.get(&scorecard.user_id).cloned()?;
            Some(ScorecardWithUser { scorecard, user })
        })
        .collect();

    // Per-player statistics
    let statistic_rows: Vec<MatchStatistic> = ok_or_return!(db_result(
        sqlx::query_as("SELECT * FROM match_statistics WHERE match_id = $1")
            .bind(match_id)
            .fetch_all(pool.get_ref())
            .await
    ));
    let member_ids: Vec<Uuid> = statistic_rows.iter().map(|s| s.member_id).collect();
    let players = ok_or_return!(members_by_ids(pool.get_ref(), &member_ids).await);
    let statistics: Vec<StatisticWithPlayer> = statistic_rows
        .into_iter()
        .filter_map(|statistic| {
            let player = players
                .iter()
                .find(|p| p.member.id == statistic.member_id)
                .cloned()?;
            Some(StatisticWithPlayer { statistic, player })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Success",
        MatchDetail {
            details,
            event,
            home_team,
            away_team,
            referee,
            scorecards,
            statistics,
        },
    )))
}

#[tracing::instrument(name = "Create match", skip_all)]
pub async fn create_match(
    body: web::Json<CreateMatchRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let (event_id, home_team_id, away_team_id, venue, scheduled_at) = match (
        body.event_id,
        body.home_team_id,
        body.away_team_id,
        body.venue.as_deref().filter(|s| !s.is_empty()),
        body.scheduled_at,
    ) {
        (Some(event_id), Some(home), Some(away), Some(venue), Some(scheduled_at)) => {
            (event_id, home, away, venue, scheduled_at)
        }
        _ => return Ok(bad_request("Missing required fields")),
    };

    if home_team_id == away_team_id {
        return Ok(bad_request("Home team and away team cannot be the same"));
    }

    let now = Utc::now();
    let result = sqlx::query_as::<_, Match>(
        r#"
        INSERT INTO matches (
            id, event_id, home_team_id, away_team_id, referee_id, venue,
            scheduled_at, status, round, match_number, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(home_team_id)
    .bind(away_team_id)
    .bind(body.referee_id)
    .bind(venue)
    .bind(scheduled_at)
    .bind(MatchStatus::Scheduled)
    .bind(body.round)
    .bind(body.match_number)
    .bind(&body.notes)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(details) => {
            tracing::info!("Created match {} for event {}", details.id, event_id);
            let hydrated = ok_or_return!(hydrate_match(pool.get_ref(), details).await);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success("Match created successfully", hydrated)))
        }
        Err(e) => {
            tracing::error!("Failed to create match: {}", e);
            Ok(server_error("Failed to create match"))
        }
    }
}

#[tracing::instrument(name = "Update match", skip_all)]
pub async fn update_match(
    path: web::Path<Uuid>,
    body: web::Json<UpdateMatchRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();

    let mut qb = sqlx::QueryBuilder::new("UPDATE matches SET updated_at = ");
    qb.push_bind(Utc::now());
    if let Some(venue) = &body.venue {
        qb.push(", venue = ");
        qb.push_bind(venue);
    }
    if let Some(scheduled_at) = body.scheduled_at {
        qb.push(", scheduled_at = ");
        qb.push_bind(scheduled_at);
    }
    if let Some(started_at) = body.started_at {
        qb.push(", started_at = ");
        qb.push_bind(started_at);
    }
    if let Some(ended_at) = body.ended_at {
        qb.push(", ended_at = ");
        qb.push_bind(ended_at);
    }
    if let Some(status) = body.status {
        qb.push(", status = ");
        qb.push_bind(status);
    }
    if let Some(home_score) = body.home_score {
        qb.push(", home_score = ");
        qb.push_bind(home_score);
    }
    if let Some(away_score) = body.away_score {
        qb.push(", away_score = ");
        qb.push_bind(away_score);
    }
    if let Some(round) = body.round {
        qb.push(", round = ");
        qb.push_bind(round);
    }
    if let Some(match_number) = body.match_number {
        qb.push(", match_number = ");
        qb.push_bind(match_number);
    }
    if let Some(notes) = &body.notes {
        qb.push(", notes = ");
        qb.push_bind(notes);
    }
    if let Some(referee_id) = body.referee_id {
        qb.push(", referee_id = ");
        qb.push_bind(referee_id);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(match_id);
    qb.push(" RETURNING *");

    match qb.build_query_as::<Match>().fetch_optional(pool.get_ref()).await {
        Ok(Some(details)) => {
            // A completed result feeds the event's points table
            if details.status == MatchStatus::Completed
                && details.home_score.is_some()
                && details.away_score.is_some()
            {
                let standings = StandingsService::new(pool.get_ref().clone());
                if let Err(e) = standings.recompute_for_event(details.event_id).await {
                    tracing::warn!(
                        "Failed to recompute standings for event {}: {}",
                        details.event_id,
                        e
                    );
                }
            }
            let hydrated = ok_or_return!(hydrate_match(pool.get_ref(), details).await);
            Ok(HttpResponse::Ok().json(ApiResponse::success("Match updated successfully", hydrated)))
        }
        Ok(None) => Ok(not_found("Match not found")),
        Err(e) => {
            tracing::error!("Failed to update match {}: {}", match_id, e);
            Ok(server_error("Failed to update match"))
        }
    }
}

#[tracing::instrument(name = "Delete match", skip_all)]
pub async fn delete_match(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let match_id = path.into_inner();

    match sqlx::query("DELETE FROM matches WHERE id = $1")
        .bind(match_id)
        .execute(pool.get_ref())
        .await
    {
        Ok(result) if result.rows_affected() > 0 => Ok(HttpResponse::Ok()
            .json(ApiResponse::<serde_json::Value>::success_message("Match deleted successfully"))),
        Ok(_) => Ok(not_found("Match not found")),
        Err(e) => {
            tracing::error!("Failed to delete match {}: {}", match_id, e);
            Ok(server_error("Failed to delete match"))
        }
    }
}

/// Attach event, teams and referee to a freshly written match row.
async fn hydrate_match(
    pool: &PgPool,
    details: Match,
) -> std::result::Result<MatchWithRelations, HttpResponse> {
    let event_briefs = event_briefs_by_ids(pool, &[details.event_id]).await?;
    let event = match event_briefs.get(&details.event_id).cloned() {
        Some(event) => event,
        None => return Err(not_found("Event not found")),
    };
    let teams = db_result(
        hydration::teams_by_ids(pool, &[details.home_team_id, details.away_team_id]).await,
    )?;
    let home_team = match teams.get(&details.home_team_id).cloned() {
        Some(team) => team,
        None => return Err(not_found("Team not found")),
    };
    let away_team = match teams.get(&details.away_team_id).cloned() {
        Some(team) => team,
        None => return Err(not_found("Team not found")),
    };
    let referee = match details.referee_id {
        Some(referee_id) => {
            let referees = db_result(hydration::users_by_ids(pool, &[referee_id]).await)?;
            referees.get(&referee_id).cloned()
        }
        None => None,
    };
    Ok(MatchWithRelations {
        details,
        event,
        home_team,
        away_team,
        referee,
    })
}

/// Event summaries (with their sport) keyed by event id.
async fn event_briefs_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> std::result::Result<std::collections::HashMap<Uuid, MatchEventBrief>, HttpResponse> {
    if ids.is_empty() {
        return Ok(std::collections::HashMap::new());
    }
    let rows: Vec<(Uuid, String, Uuid)> = db_result(
        sqlx::query_as("SELECT id, name, sport_id FROM events WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await,
    )?;
    let sport_ids: Vec<Uuid> = rows.iter().map(|(_, _, sport_id)| *sport_id).collect();
    let sports = db_result(hydration::sports_by_ids(pool, &sport_ids).await)?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, name, sport_id)| {
            let sport = sports.get(&sport_id).cloned()?;
            Some((id, MatchEventBrief { id, name, sport }))
        })
        .collect())
}

/// Team members (with user) looked up by member id.
async fn members_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> std::result::Result<Vec<TeamMemberWithUser>, HttpResponse> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<TeamMemberUserRow> = db_result(
        sqlx::query_as(
            r#"
            SELECT tm.id, tm.team_id, tm.user_id, tm.role, tm.jersey_number,
                   tm.position, tm.joined_at,
                   u.first_name, u.last_name, u.email, u.avatar
            FROM team_members tm
            JOIN users u ON tm.user_id = u.id
            WHERE tm.id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await,
    )?;
    Ok(rows.into_iter().map(TeamMemberWithUser::from).collect())
}

/// Flat list row: match columns plus scorecard/statistic counts.
#[derive(sqlx::FromRow)]
struct MatchWithCountsRow {
    id: Uuid,
    event_id: Uuid,
    home_team_id: Uuid,
    away_team_id: Uuid,
    referee_id: Option<Uuid>,
    venue: String,
    scheduled_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    status: MatchStatus,
    home_score: Option<i32>,
    away_score: Option<i32>,
    round: Option<i32>,
    match_number: Option<i32>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    scorecards_count: i64,
    statistics_count: i64,
}

impl MatchWithCountsRow {
    fn into_match(self) -> (Match, MatchCounts) {
        (
            Match {
                id: self.id,
                event_id: self.event_id,
                home_team_id: self.home_team_id,
                away_team_id: self.away_team_id,
                referee_id: self.referee_id,
                venue: self.venue,
                scheduled_at: self.scheduled_at,
                started_at: self.started_at,
                ended_at: self.ended_at,
                status: self.status,
                home_score: self.home_score,
                away_score: self.away_score,
                round: self.round,
                match_number: self.match_number,
                notes: self.notes,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            MatchCounts {
                scorecards: self.scorecards_count,
                statistics: self.statistics_count,
            },
        )
    }
}
