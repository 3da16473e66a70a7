use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::fixtures::{create_event, create_event_with, create_sport, create_team, create_user};
use common::utils::spawn_app;

#[tokio::test]
async fn create_event_applies_defaults_and_opens_registration() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;

    assert_eq!("REGISTRATION_OPEN", event["status"].as_str().unwrap());
    assert_eq!(8, event["maxTeams"].as_i64().unwrap());
    assert_eq!(2, event["minTeamsPerMatch"].as_i64().unwrap());
    assert_eq!(2, event["maxTeamsPerMatch"].as_i64().unwrap());
    assert_eq!(0.0, event["entryFee"].as_f64().unwrap());
    assert_eq!(true, event["isPublic"].as_bool().unwrap());
    assert_eq!(sport["id"], event["sport"]["id"]);
    assert_eq!(organizer["id"], event["organizer"]["id"]);
}

#[tokio::test]
async fn create_event_with_missing_required_field_returns_400() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;

    // maxTeams missing
    let response = client
        .post(format!("{}/events", app.address))
        .json(&json!({
            "name": "Autumn Cup",
            "sportId": sport["id"],
            "organizerId": organizer["id"],
            "venue": "Main Hall",
            "startDate": "2026-09-01T10:00:00Z",
            "endDate": "2026-09-03T18:00:00Z",
            "registrationDeadline": "2026-08-20T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!("Missing required fields", body["message"].as_str().unwrap());

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count events");
    assert_eq!(0, count.0);
}

#[tokio::test]
async fn get_event_returns_detail_with_empty_collections() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;

    let response = client
        .get(format!(
            "{}/events/{}",
            app.address,
            event["id"].as_str().unwrap()
        ))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(event["name"], body["data"]["name"]);
    assert_eq!("REGISTRATION_OPEN", body["data"]["status"].as_str().unwrap());
    assert!(body["data"]["registrations"].as_array().unwrap().is_empty());
    assert!(body["data"]["matches"].as_array().unwrap().is_empty());
    assert!(body["data"]["standings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_events_paginates_with_ceiling_division() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    for _ in 0..3 {
        create_event(
            &client,
            &app.address,
            sport["id"].as_str().unwrap(),
            organizer["id"].as_str().unwrap(),
        )
        .await;
    }

    let response = client
        .get(format!("{}/events?page=1&limit=2", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(2, body["data"]["events"].as_array().unwrap().len());
    let pagination = &body["data"]["pagination"];
    assert_eq!(3, pagination["total"].as_i64().unwrap());
    assert_eq!(1, pagination["page"].as_i64().unwrap());
    assert_eq!(2, pagination["limit"].as_i64().unwrap());
    assert_eq!(2, pagination["totalPages"].as_i64().unwrap());

    let response = client
        .get(format!("{}/events?page=2&limit=2", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(1, body["data"]["events"].as_array().unwrap().len());
}

#[tokio::test]
async fn list_events_filters_by_status() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;

    let cancel = client
        .patch(format!(
            "{}/events/{}",
            app.address,
            event["id"].as_str().unwrap()
        ))
        .json(&json!({ "status": "CANCELLED" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, cancel.status().as_u16());

    let response = client
        .get(format!("{}/events?status=CANCELLED", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(1, body["data"]["events"].as_array().unwrap().len());

    let response = client
        .get(format!("{}/events?status=ONGOING", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(0, body["data"]["events"].as_array().unwrap().len());
}

#[tokio::test]
async fn update_event_applies_falsy_values_exactly() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event_with(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
        json!({ "entryFee": 25.0, "prizePool": 1000.0 }),
    )
    .await;
    let event_id = event["id"].as_str().unwrap();

    let response = client
        .patch(format!("{}/events/{}", app.address, event_id))
        .json(&json!({ "isPublic": false, "entryFee": 0, "prizePool": null }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(false, body["data"]["isPublic"].as_bool().unwrap());
    assert_eq!(0.0, body["data"]["entryFee"].as_f64().unwrap());
    assert!(body["data"]["prizePool"].is_null());
    // Absent fields untouched
    assert_eq!(event["name"], body["data"]["name"]);
    assert_eq!(8, body["data"]["maxTeams"].as_i64().unwrap());
}

#[tokio::test]
async fn update_event_returns_404_for_unknown_id() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .patch(format!("{}/events/{}", app.address, Uuid::new_v4()))
        .json(&json!({ "name": "Ghost event" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn register_team_for_event_succeeds_once() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;
    let team = create_team(&client, &app.address, sport["id"].as_str().unwrap()).await;
    let event_id = event["id"].as_str().unwrap();

    let response = client
        .post(format!("{}/events/{}/registrations", app.address, event_id))
        .json(&json!({ "teamId": team["id"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!("PENDING", body["data"]["status"].as_str().unwrap());
    assert_eq!(team["id"], body["data"]["team"]["id"]);

    // Registering the same team twice conflicts
    let duplicate = client
        .post(format!("{}/events/{}/registrations", app.address, event_id))
        .json(&json!({ "teamId": team["id"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(409, duplicate.status().as_u16());

    // The event detail now carries the registration
    let detail = client
        .get(format!("{}/events/{}", app.address, event_id))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = detail.json().await.expect("Failed to parse response");
    let registrations = body["data"]["registrations"].as_array().unwrap();
    assert_eq!(1, registrations.len());
    assert_eq!(team["name"], registrations[0]["team"]["name"]);
}

#[tokio::test]
async fn register_team_is_rejected_when_registration_closed() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;
    let team = create_team(&client, &app.address, sport["id"].as_str().unwrap()).await;
    let event_id = event["id"].as_str().unwrap();

    let close = client
        .patch(format!("{}/events/{}", app.address, event_id))
        .json(&json!({ "status": "REGISTRATION_CLOSED" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, close.status().as_u16());

    let response = client
        .post(format!("{}/events/{}/registrations", app.address, event_id))
        .json(&json!({ "teamId": team["id"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        "Event is not open for registration",
        body["message"].as_str().unwrap()
    );
}

#[tokio::test]
async fn update_registration_status() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;
    let team = create_team(&client, &app.address, sport["id"].as_str().unwrap()).await;
    let event_id = event["id"].as_str().unwrap();

    let created = client
        .post(format!("{}/events/{}/registrations", app.address, event_id))
        .json(&json!({ "teamId": team["id"] }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = created.json().await.expect("Failed to parse response");
    let registration_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = client
        .patch(format!(
            "{}/events/{}/registrations/{}",
            app.address, event_id, registration_id
        ))
        .json(&json!({ "status": "APPROVED" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!("APPROVED", body["data"]["status"].as_str().unwrap());
}

#[tokio::test]
async fn delete_event_removes_record() {
    let app = spawn_app().await;
    let client = Client::new();

    let sport = create_sport(&client, &app.address).await;
    let organizer = create_user(&client, &app.address).await;
    let event = create_event(
        &client,
        &app.address,
        sport["id"].as_str().unwrap(),
        organizer["id"].as_str().unwrap(),
    )
    .await;
    let event_id = event["id"].as_str().unwrap();

    let response = client
        .delete(format!("{}/events/{}", app.address, event_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let get = client
        .get(format!("{}/events/{}", app.address, event_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(404, get.status().as_u16());
}
