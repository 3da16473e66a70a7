use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::helpers::{
    bad_request, conflict, db_result, not_found, require_record, server_error, unique_violation,
};
use crate::models::common::ApiResponse;
use crate::models::event::Event;
use crate::models::sport::{
    CreateSportRequest, Sport, SportDetail, SportWithCounts, SportWithCountsRow,
    UpdateSportRequest,
};
use crate::models::team::Team;
use crate::ok_or_return;

/// List all active sports with event/team counts, ordered by name.
pub async fn list_sports(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let rows: Vec<SportWithCountsRow> = ok_or_return!(db_result(
        sqlx::query_as(
            r#"
            SELECT s.*,
                (SELECT COUNT(*) FROM events e WHERE e.sport_id = s.id) AS events_count,
                (SELECT COUNT(*) FROM teams t WHERE t.sport_id = s.id) AS teams_count
            FROM sports s
            WHERE s.is_active = TRUE
            ORDER BY s.name ASC
            "#,
        )
        .fetch_all(pool.get_ref())
        .await
    ));

    let sports: Vec<SportWithCounts> = rows.into_iter().map(SportWithCounts::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success("Success", sports)))
}

/// Get one sport with its latest events and teams.
pub async fn get_sport_by_id(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let sport_id = path.into_inner();

    let sport: Sport = ok_or_return!(require_record(
        sqlx::query_as("SELECT * FROM sports WHERE id = $1")
            .bind(sport_id)
            .fetch_optional(pool.get_ref())
            .await,
        "Sport not found"
    ));

    let events: Vec<Event> = ok_or_return!(db_result(
        sqlx::query_as(
            "SELECT * FROM events WHERE sport_id = $1 ORDER BY start_date DESC LIMIT 10",
        )
        .bind(sport_id)
        .fetch_all(pool.get_ref())
        .await
    ));

    let teams: Vec<Team> = ok_or_return!(db_result(
        sqlx::query_as("SELECT * FROM teams WHERE sport_id = $1 ORDER BY name ASC LIMIT 10")
            .bind(sport_id)
            .fetch_all(pool.get_ref())
            .await
    ));

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Success",
        SportDetail {
            sport,
            events,
            teams,
        },
    )))
}

#[tracing::instrument(name = "Create sport", skip_all)]
pub async fn create_sport(
    body: web::Json<CreateSportRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let name = match body.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => return Ok(bad_request("Sport name is required")),
    };

    let now = Utc::now();
    let result = sqlx::query_as::<_, Sport>(
        r#"
        INSERT INTO sports (id, name, description, icon, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, TRUE, $5, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(&body.description)
    .bind(&body.icon)
    .bind(now)
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(sport) => {
            tracing::info!("Created sport '{}' with id {}", sport.name, sport.id);
            Ok(HttpResponse::Created().json(ApiResponse::success("Sport created successfully", sport)))
        }
        Err(e) => {
            if unique_violation(&e).is_some() {
                return Ok(conflict("Sport with this name already exists"));
            }
            tracing::error!("Failed to create sport: {}", e);
            Ok(server_error("Failed to create sport"))
        }
    }
}

#[tracing::instrument(name = "Update sport", skip_all)]
pub async fn update_sport(
    path: web::Path<Uuid>,
    body: web::Json<UpdateSportRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let sport_id = path.into_inner();

    let mut qb = sqlx::QueryBuilder::new("UPDATE sports SET updated_at = ");
    qb.push_bind(Utc::now());
    if let Some(name) = &body.name {
        qb.push(", name = ");
        qb.push_bind(name);
    }
    if let Some(description) = &body.description {
        qb.push(", description = ");
        qb.push_bind(description);
    }
    if let Some(icon) = &body.icon {
        qb.push(", icon = ");
        qb.push_bind(icon);
    }
    if let Some(is_active) = body.is_active {
        qb.push(", is_active = ");
        qb.push_bind(is_active);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(sport_id);
    qb.push(" RETURNING *");

    match qb.build_query_as::<Sport>().fetch_optional(pool.get_ref()).await {
        Ok(Some(sport)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success("Sport updated successfully", sport)))
        }
        Ok(None) => Ok(not_found("Sport not found")),
        Err(e) => {
            if unique_violation(&e).is_some() {
                return Ok(conflict("Sport with this name already exists"));
            }
            tracing::error!("Failed to update sport {}: {}", sport_id, e);
            Ok(server_error("Failed to update sport"))
        }
    }
}

#[tracing::instrument(name = "Delete sport", skip_all)]
pub async fn delete_sport(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let sport_id = path.into_inner();

    match sqlx::query("DELETE FROM sports WHERE id = $1")
        .bind(sport_id)
        .execute(pool.get_ref())
        .await
    {
        Ok(result) if result.rows_affected() > 0 => Ok(HttpResponse::Ok()
            .json(ApiResponse::<serde_json::Value>::success_message("Sport deleted successfully"))),
        Ok(_) => Ok(not_found("Sport not found")),
        Err(e) => {
            tracing::error!("Failed to delete sport {}: {}", sport_id, e);
            Ok(server_error("Failed to delete sport"))
        }
    }
}
