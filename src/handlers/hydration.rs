//! Batch lookups used to hydrate list/detail responses without N+1 queries:
//! fetch the base rows first, then pull every related entity in one query
//! per relation keyed by the collected ids.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::sport::Sport;
use crate::models::team::{Team, TeamMemberUserRow, TeamMemberWithUser};
use crate::models::user::UserBrief;

pub async fn sports_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Sport>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sports: Vec<Sport> = sqlx::query_as("SELECT * FROM sports WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(sports.into_iter().map(|s| (s.id, s)).collect())
}

pub async fn teams_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Team>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let teams: Vec<Team> = sqlx::query_as("SELECT * FROM teams WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(teams.into_iter().map(|t| (t.id, t)).collect())
}

pub async fn users_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserBrief>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users: Vec<UserBrief> = sqlx::query_as(
        "SELECT id, first_name, last_name, email, avatar FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Members for a set of teams, grouped by team id, ordered by join time.
pub async fn members_by_team_ids(
    pool: &PgPool,
    team_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<TeamMemberWithUser>>, sqlx::Error> {
    if team_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<TeamMemberUserRow> = sqlx::query_as(
        r#"
        SELECT tm.id, tm.team_id, tm.user_id, tm.role, tm.jersey_number,
               tm.position, tm.joined_at,
               u.first_name, u.last_name, u.email, u.avatar
        FROM team_members tm
        JOIN users u ON tm.user_id = u.id
        WHERE tm.team_id = ANY($1)
        ORDER BY tm.joined_at ASC
        "#,
    )
    .bind(team_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<TeamMemberWithUser>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.team_id)
            .or_default()
            .push(TeamMemberWithUser::from(row));
    }
    Ok(grouped)
}

/// Event names keyed by id, for summaries embedded in match history.
pub async fn event_names_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM events WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}
