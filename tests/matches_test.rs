use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::fixtures::{create_event, create_match, create_sport, create_team, create_user};
use common::utils::spawn_app;

struct MatchSetup {
    event_id: String,
    home_team_id: String,
    away_team_id: String,
}

async fn setup_event_with_teams(client: &Client, address: &str) -> MatchSetup {
    let sport = create_sport(client, address).await;
    let organizer = create_user(client, address).await;
    let event = create_event(
        client,
        address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;
    let home = create_team(client, address, sport["id"].as_str().unwrap()).await;
    let away = create_team(client, address, sport["id"].as_str().unwrap()).await;
    MatchSetup {
        event_id: event["id"].as_str().unwrap().to_string(),
        home_team_id: home["id"].as_str().unwrap().to_string(),
        away_team_id: away["id"].as_str().unwrap().to_string(),
    }
}

#[tokio::test]
async fn create_match_with_identical_teams_returns_400() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let response = client
        .post(format!("{}/matches", app.address))
        .json(&json!({
            "eventId": setup.event_id,
            "homeTeamId": setup.home_team_id,
            "awayTeamId": setup.home_team_id,
            "venue": "Central Arena",
            "scheduledAt": "2026-09-01T15:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        "Home team and away team cannot be the same",
        body["message"].as_str().unwrap()
    );

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM matches")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count matches");
    assert_eq!(0, count.0);
}

#[tokio::test]
async fn create_match_with_missing_fields_returns_400() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let response = client
        .post(format!("{}/matches", app.address))
        .json(&json!({
            "eventId": setup.event_id,
            "homeTeamId": setup.home_team_id,
            "awayTeamId": setup.away_team_id
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn create_match_succeeds_and_defaults_to_scheduled() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let created = create_match(
        &client,
        &app.address,
        &setup.event_id,
        &setup.home_team_id,
        &setup.away_team_id,
    )
    .await;

    assert_eq!("SCHEDULED", created["status"].as_str().unwrap());
    assert!(created["homeScore"].is_null());
    assert!(created["awayScore"].is_null());
    assert_eq!(setup.home_team_id, created["homeTeam"]["id"].as_str().unwrap());
    assert_eq!(setup.away_team_id, created["awayTeam"]["id"].as_str().unwrap());
    assert_eq!(setup.event_id, created["event"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn list_matches_filters_by_team_on_either_side() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let sport_id: (Uuid,) = sqlx::query_as("SELECT sport_id FROM teams LIMIT 1")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to read sport");
    let third = create_team(&client, &app.address, &sport_id.0.to_string()).await;
    let third_id = third["id"].as_str().unwrap();

    create_match(
        &client,
        &app.address,
        &setup.event_id,
        &setup.home_team_id,
        &setup.away_team_id,
    )
    .await;
    create_match(
        &client,
        &app.address,
        &setup.event_id,
        third_id,
        &setup.home_team_id,
    )
    .await;

    // home_team appears in both matches, on different sides
    let response = client
        .get(format!("{}/matches?teamId={}", app.address, setup.home_team_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(2, body["data"].as_array().unwrap().len());

    // third team appears in one
    let response = client
        .get(format!("{}/matches?teamId={}", app.address, third_id))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(1, body["data"].as_array().unwrap().len());

    // event filter returns both
    let response = client
        .get(format!("{}/matches?eventId={}", app.address, setup.event_id))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(2, body["data"].as_array().unwrap().len());
}

#[tokio::test]
async fn update_match_scores_reflects_exact_values() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let created = create_match(
        &client,
        &app.address,
        &setup.event_id,
        &setup.home_team_id,
        &setup.away_team_id,
    )
    .await;
    let match_id = created["id"].as_str().unwrap();

    let response = client
        .patch(format!("{}/matches/{}", app.address, match_id))
        .json(&json!({ "homeScore": 2, "awayScore": 1 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(2, body["data"]["homeScore"].as_i64().unwrap());
    assert_eq!(1, body["data"]["awayScore"].as_i64().unwrap());
    // Status untouched by a score-only update
    assert_eq!("SCHEDULED", body["data"]["status"].as_str().unwrap());

    // A zero score is applied, not skipped
    let response = client
        .patch(format!("{}/matches/{}", app.address, match_id))
        .json(&json!({ "homeScore": 0 }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(0, body["data"]["homeScore"].as_i64().unwrap());
    assert_eq!(1, body["data"]["awayScore"].as_i64().unwrap());
}

#[tokio::test]
async fn update_match_after_delete_returns_404() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let created = create_match(
        &client,
        &app.address,
        &setup.event_id,
        &setup.home_team_id,
        &setup.away_team_id,
    )
    .await;
    let match_id = created["id"].as_str().unwrap().to_string();

    let delete = client
        .delete(format!("{}/matches/{}", app.address, match_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, delete.status().as_u16());

    let response = client
        .patch(format!("{}/matches/{}", app.address, match_id))
        .json(&json!({ "homeScore": 2, "awayScore": 1 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn get_match_returns_hydrated_detail() {
    let app = spawn_app().await;
    let client = Client::new();
    let setup = setup_event_with_teams(&client, &app.address).await;

    let created = create_match(
        &client,
        &app.address,
        &setup.event_id,
        &setup.home_team_id,
        &setup.away_team_id,
    )
    .await;
    let match_id = created["id"].as_str().unwrap();

    let response = client
        .get(format!("{}/matches/{}", app.address, match_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(setup.event_id, body["data"]["event"]["id"].as_str().unwrap());
    assert!(body["data"]["event"]["sport"]["name"].is_string());
    assert!(body["data"]["homeTeam"]["members"].as_array().unwrap().is_empty());
    assert!(body["data"]["scorecards"].as_array().unwrap().is_empty());
    assert!(body["data"]["statistics"].as_array().unwrap().is_empty());
}
