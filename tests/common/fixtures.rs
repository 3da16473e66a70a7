//! API-level fixtures: each helper drives the public endpoints the same
//! way a client would, and returns the created record's JSON.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn create_sport(client: &Client, address: &str) -> Value {
    let name = format!("Sport {}", &Uuid::new_v4().to_string()[..8]);
    let response = client
        .post(format!("{}/sports", address))
        .json(&json!({ "name": name, "description": "Test sport", "icon": "⚽" }))
        .send()
        .await
        .expect("Failed to create sport");
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse sport response");
    body["data"].clone()
}

pub async fn create_user(client: &Client, address: &str) -> Value {
    let suffix = &Uuid::new_v4().to_string()[..8];
    let response = client
        .post(format!("{}/users", address))
        .json(&json!({
            "email": format!("user{}@example.com", suffix),
            "username": format!("user{}", suffix),
            "password": "password123",
            "firstName": "Test",
            "lastName": "User"
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse user response");
    body["data"].clone()
}

pub async fn create_team(client: &Client, address: &str, sport_id: &str) -> Value {
    let name = format!("Team {}", &Uuid::new_v4().to_string()[..8]);
    let response = client
        .post(format!("{}/teams", address))
        .json(&json!({ "name": name, "sportId": sport_id }))
        .send()
        .await
        .expect("Failed to create team");
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse team response");
    body["data"].clone()
}

pub async fn create_event(
    client: &Client,
    address: &str,
    sport_id: &str,
    organizer_id: &str,
) -> Value {
    create_event_with(client, address, sport_id, organizer_id, json!({})).await
}

/// Create an event with the required fields plus `extra` merged on top.
pub async fn create_event_with(
    client: &Client,
    address: &str,
    sport_id: &str,
    organizer_id: &str,
    extra: Value,
) -> Value {
    let start = Utc::now() + Duration::days(30);
    let mut body = json!({
        "name": format!("Event {}", &Uuid::new_v4().to_string()[..8]),
        "sportId": sport_id,
        "organizerId": organizer_id,
        "venue": "Central Arena",
        "startDate": start.to_rfc3339(),
        "endDate": (start + Duration::days(2)).to_rfc3339(),
        "registrationDeadline": (start - Duration::days(7)).to_rfc3339(),
        "maxTeams": 8
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }

    let response = client
        .post(format!("{}/events", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to create event");
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse event response");
    body["data"].clone()
}

pub async fn create_match(
    client: &Client,
    address: &str,
    event_id: &str,
    home_team_id: &str,
    away_team_id: &str,
) -> Value {
    let response = client
        .post(format!("{}/matches", address))
        .json(&json!({
            "eventId": event_id,
            "homeTeamId": home_team_id,
            "awayTeamId": away_team_id,
            "venue": "Central Arena",
            "scheduledAt": (Utc::now() + Duration::days(31)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to create match");
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse match response");
    body["data"].clone()
}
