//! End-to-end league flows through the HTTP router.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use leagueos::server::create_app;
use serde_json::{Value, json};
use tower::ServiceExt;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::test_state;

struct Client {
    app: Router,
}

impl Client {
    async fn new() -> Result<Self> {
        let state = test_state(2).await?;
        Ok(Self {
            app: create_app(state),
        })
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        tenant: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tenant) = tenant {
            builder = builder.header("X-Tenant-ID", tenant);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn register_league(&self, name: &str, subdomain: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/leagues/tenants",
                None,
                Some(json!({ "name": name, "subdomain": subdomain })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_team(&self, tenant: &str, name: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/leagues/teams",
                Some(tenant),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_active_season(&self, tenant: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/leagues/seasons",
                Some(tenant),
                Some(json!({
                    "name": "Spring 2025",
                    "start_date": "2025-03-01",
                    "end_date": "2025-06-30",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["data"]["status"], "draft");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = self
            .call(
                Method::POST,
                &format!("/api/leagues/seasons/{id}/activate"),
                Some(tenant),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "active");
        id
    }
}

#[tokio::test]
async fn root_and_health_respond() -> Result<()> {
    let client = Client::new().await?;

    let (status, body) = client.call(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "leagueos");

    let (status, body) = client.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    Ok(())
}

#[tokio::test]
async fn tenant_registry_is_tenant_agnostic() -> Result<()> {
    let client = Client::new().await?;
    let id = client.register_league("Sunday League", "Sunday").await;

    let (status, body) = client
        .call(
            Method::GET,
            "/api/leagues/tenants/by-subdomain/sunday",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["sport_type"], "soccer");

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/tenants",
            None,
            Some(json!({ "name": "Copycats", "subdomain": "sunday" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/tenants",
            None,
            Some(json!({ "name": "Bad", "subdomain": "-bad-" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "subdomain");

    let (status, _) = client
        .call(
            Method::GET,
            "/api/leagues/tenants/by-subdomain/nowhere",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn team_names_are_unique_per_league_only() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;

    client.create_team(&a, "Eagles").await;
    client.create_team(&b, "Eagles").await;

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/teams",
            Some(&a),
            Some(json!({ "name": "Eagles" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/teams",
            None,
            Some(json!({ "name": "Eagles" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "TENANT_REQUIRED");

    Ok(())
}

#[tokio::test]
async fn registration_and_transfers_stay_inside_the_league() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;
    let eagles = client.create_team(&a, "Eagles").await;
    let hawks = client.create_team(&a, "Hawks").await;
    let foreign = client.create_team(&b, "Ravens").await;

    let (status, body) = client
        .call(
            Method::POST,
            &format!("/api/registration/teams/{eagles}/players"),
            Some(&a),
            Some(json!({ "first_name": "Alex", "last_name": "Morgan" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["tenant_id"], a);
    let player = body["data"]["id"].as_str().unwrap().to_string();

    // League B cannot see or move A's player.
    let (status, _) = client
        .call(
            Method::POST,
            &format!("/api/registration/players/{player}/transfer"),
            Some(&b),
            Some(json!({ "team_id": foreign })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // League A cannot move the player into B's team.
    let (status, _) = client
        .call(
            Method::POST,
            &format!("/api/registration/players/{player}/transfer"),
            Some(&a),
            Some(json!({ "team_id": foreign })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client
        .call(
            Method::POST,
            &format!("/api/registration/players/{player}/transfer"),
            Some(&a),
            Some(json!({ "team_id": hawks })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["team_id"], hawks);
    assert_eq!(body["data"]["status"], "inactive");

    let (status, body) = client
        .call(
            Method::GET,
            &format!("/api/registration/teams/{hawks}/players"),
            Some(&a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn roster_limit_comes_from_the_active_season() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let eagles = client.create_team(&a, "Eagles").await;

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/seasons",
            Some(&a),
            Some(json!({
                "name": "Tiny",
                "start_date": "2025-03-01",
                "end_date": "2025-03-31",
                "max_active_players_per_team": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let season = body["data"]["id"].as_str().unwrap().to_string();
    client
        .call(
            Method::POST,
            &format!("/api/leagues/seasons/{season}/activate"),
            Some(&a),
            None,
        )
        .await;

    let uri = format!("/api/registration/teams/{eagles}/players");
    let (status, _) = client
        .call(
            Method::POST,
            &uri,
            Some(&a),
            Some(json!({ "first_name": "First", "last_name": "Player" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = client
        .call(
            Method::POST,
            &uri,
            Some(&a),
            Some(json!({ "first_name": "Second", "last_name": "Player" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "team_id");

    Ok(())
}

#[tokio::test]
async fn season_lifecycle_keeps_one_active_season() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let first = client.create_active_season(&a).await;
    let second = client.create_active_season(&a).await;

    let (_, body) = client
        .call(Method::GET, "/api/leagues/seasons", Some(&a), None)
        .await;
    let seasons = body["data"].as_array().unwrap();
    let status_of = |id: &str| {
        seasons
            .iter()
            .find(|season| season["id"] == id)
            .map(|season| season["status"].clone())
    };
    assert_eq!(status_of(&first), Some(json!("completed")));
    assert_eq!(status_of(&second), Some(json!("active")));

    let (status, body) = client
        .call(
            Method::POST,
            &format!("/api/leagues/seasons/{second}/advance-matchday"),
            Some(&a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["current_matchday"], 2);

    let (status, _) = client
        .call(
            Method::POST,
            &format!("/api/leagues/seasons/{first}/advance-matchday"),
            Some(&a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/seasons",
            Some(&a),
            Some(json!({
                "name": "Backwards",
                "start_date": "2025-06-30",
                "end_date": "2025-03-01",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "end_date");

    Ok(())
}

#[tokio::test]
async fn matches_are_scheduled_and_scored_within_the_league() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;
    let season = client.create_active_season(&a).await;
    let eagles = client.create_team(&a, "Eagles").await;
    let hawks = client.create_team(&a, "Hawks").await;
    let foreign_eagles = client.create_team(&b, "Eagles").await;

    let (status, _) = client
        .call(
            Method::POST,
            "/api/competition/matches",
            Some(&a),
            Some(json!({
                "season_id": season,
                "home_team_id": eagles,
                "away_team_id": foreign_eagles,
                "match_date": "2025-03-01T10:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client
        .call(
            Method::POST,
            "/api/competition/matches",
            Some(&a),
            Some(json!({
                "season_id": season,
                "home_team_id": eagles,
                "away_team_id": eagles,
                "match_date": "2025-03-01T10:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "away_team_id");

    let (status, body) = client
        .call(
            Method::POST,
            "/api/competition/matches",
            Some(&a),
            Some(json!({
                "season_id": season,
                "home_team_id": eagles,
                "away_team_id": hawks,
                "match_date": "2025-03-01T10:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let fixture = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = client
        .call(
            Method::POST,
            &format!("/api/competition/matches/{fixture}/result"),
            Some(&a),
            Some(json!({ "home_score": -1, "away_score": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = client
        .call(
            Method::POST,
            &format!("/api/competition/matches/{fixture}/result"),
            Some(&b),
            Some(json!({ "home_score": 2, "away_score": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client
        .call(
            Method::POST,
            &format!("/api/competition/matches/{fixture}/result"),
            Some(&a),
            Some(json!({ "home_score": 2, "away_score": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "finished");
    assert_eq!(body["data"]["home_score"], 2);

    let (status, body) = client
        .call(
            Method::GET,
            &format!("/api/competition/seasons/{season}/matches"),
            Some(&a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = client
        .call(
            Method::GET,
            &format!("/api/competition/seasons/{season}/matches"),
            Some(&b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn round_robin_calendar_covers_every_pairing() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;
    let season = client.create_active_season(&a).await;
    for name in ["Eagles", "Hawks", "Owls", "Ravens"] {
        client.create_team(&a, name).await;
    }
    client.create_team(&b, "Intruders").await;

    let uri = format!("/api/competition/seasons/{season}/fixtures/generate");
    let (status, body) = client.call(Method::POST, &uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let matches = body["data"].as_array().unwrap();
    assert_eq!(matches.len(), 6);
    assert!(matches.iter().all(|m| m["tenant_id"] == a));
    assert_eq!(matches[0]["matchday"], 1);
    assert_eq!(matches[0]["match_date"], "2025-03-01T10:00:00+00:00");
    assert_eq!(matches[5]["matchday"], 3);
    assert_eq!(matches[5]["match_date"], "2025-03-15T10:00:00+00:00");

    let (status, body) = client.call(Method::POST, &uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "season_id");

    Ok(())
}

#[tokio::test]
async fn settings_default_then_persist_per_league() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;

    let (status, body) = client
        .call(Method::GET, "/api/tenants/settings", Some(&a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme_class"], "theme-default");

    let updated = json!({
        "show_offense_defense_widgets": false,
        "show_discipline_widget": true,
        "enable_auto_suspensions": false,
        "min_matches_for_playoffs": 5,
        "theme_class": "theme-dark",
    });
    for _ in 0..2 {
        let (status, body) = client
            .call(
                Method::PUT,
                "/api/tenants/settings",
                Some(&a),
                Some(updated.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"], updated);
    }

    let (_, body) = client
        .call(Method::GET, "/api/tenants/settings", Some(&b), None)
        .await;
    assert_eq!(body["data"]["theme_class"], "theme-default");
    assert_eq!(body["data"]["min_matches_for_playoffs"], 0);

    let (status, _) = client
        .call(Method::GET, "/api/tenants/settings", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn responses_carry_trace_ids() -> Result<()> {
    let client = Client::new().await?;

    let request = Request::builder()
        .uri("/api/leagues/teams")
        .header("x-trace-id", "trace-abc")
        .body(Body::empty())
        .unwrap();
    let response = client.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-trace-id").unwrap(), "trace-abc");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["trace_id"], "trace-abc");

    Ok(())
}

#[tokio::test]
async fn concurrent_calendar_generation_writes_one_calendar() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let season = client.create_active_season(&a).await;
    for name in ["Eagles", "Hawks", "Owls", "Ravens"] {
        client.create_team(&a, name).await;
    }

    let uri = format!("/api/competition/seasons/{season}/fixtures/generate");
    let (first, second) = tokio::join!(
        client.call(Method::POST, &uri, Some(&a), None),
        client.call(Method::POST, &uri, Some(&a), None),
    );
    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let (status, body) = client
        .call(
            Method::GET,
            &format!("/api/competition/seasons/{season}/matches"),
            Some(&a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let matches = body["data"].as_array().unwrap();
    assert_eq!(matches.len(), 6);

    // A team's home slot on a matchday is taken once.
    let first_match = &matches[0];
    let (status, body) = client
        .call(
            Method::POST,
            "/api/competition/matches",
            Some(&a),
            Some(json!({
                "season_id": season,
                "home_team_id": first_match["home_team_id"],
                "away_team_id": first_match["away_team_id"],
                "match_date": "2025-03-01T18:00:00Z",
                "matchday": first_match["matchday"],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    Ok(())
}

#[tokio::test]
async fn activating_an_unknown_season_keeps_the_active_one() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;
    let active = client.create_active_season(&a).await;
    let foreign = client.create_active_season(&b).await;

    for id in [foreign, uuid::Uuid::new_v4().to_string()] {
        let (status, _) = client
            .call(
                Method::POST,
                &format!("/api/leagues/seasons/{id}/activate"),
                Some(&a),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, body) = client
        .call(Method::GET, "/api/leagues/seasons", Some(&a), None)
        .await;
    let seasons = body["data"].as_array().unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0]["id"], active);
    assert_eq!(seasons[0]["status"], "active");

    Ok(())
}

#[tokio::test]
async fn writes_for_an_unregistered_tenant_are_not_found() -> Result<()> {
    let client = Client::new().await?;
    let stranger = uuid::Uuid::new_v4().to_string();

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/teams",
            Some(&stranger),
            Some(json!({ "name": "Ghosts" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn match_report_scores_the_match_and_suspends_red_cards() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;
    let season = client.create_active_season(&a).await;
    let eagles = client.create_team(&a, "Eagles").await;
    let hawks = client.create_team(&a, "Hawks").await;
    let ravens = client.create_team(&b, "Ravens").await;

    let register = |tenant: String, team: String, last_name: &'static str| {
        let client = &client;
        async move {
            let (status, body) = client
                .call(
                    Method::POST,
                    &format!("/api/registration/teams/{team}/players"),
                    Some(&tenant),
                    Some(json!({ "first_name": "Sam", "last_name": last_name })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["data"]["id"].as_str().unwrap().to_string()
        }
    };
    let striker = register(a.clone(), eagles.clone(), "Striker").await;
    let defender = register(a.clone(), hawks.clone(), "Defender").await;
    let outsider = register(b.clone(), ravens.clone(), "Outsider").await;

    let uri = format!("/api/competition/seasons/{season}/fixtures/generate");
    let (status, body) = client.call(Method::POST, &uri, Some(&a), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = client
        .call(
            Method::GET,
            "/api/competition/matchdays/1/matches",
            Some(&a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let matchday_one = body["data"].as_array().unwrap();
    assert_eq!(matchday_one.len(), 1);
    let fixture = matchday_one[0]["id"].as_str().unwrap().to_string();
    let report_uri = format!("/api/competition/matches/{fixture}/report");

    // A player of another league is invisible here.
    let (status, _) = client
        .call(
            Method::POST,
            &report_uri,
            Some(&a),
            Some(json!({ "events": [
                { "team_id": eagles, "player_id": outsider, "event_type": "goal" },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = client
        .call(
            Method::POST,
            &report_uri,
            Some(&a),
            Some(json!({ "events": [
                { "team_id": ravens, "event_type": "goal" },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "team_id");

    let (status, body) = client
        .call(
            Method::POST,
            &report_uri,
            Some(&a),
            Some(json!({ "events": [
                { "team_id": eagles, "player_id": striker, "event_type": "goal" },
                { "team_id": eagles, "player_id": striker, "event_type": "goal" },
                { "team_id": hawks, "event_type": "goal" },
                { "team_id": hawks, "player_id": defender, "event_type": "red_card" },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let report = &body["data"];
    assert_eq!(report["match"]["status"], "finished");
    assert_eq!(report["events"].as_array().unwrap().len(), 4);
    assert_eq!(report["suspended_players"], json!([defender]));
    let (eagles_score, hawks_score) = if report["match"]["home_team_id"] == eagles {
        (&report["match"]["home_score"], &report["match"]["away_score"])
    } else {
        (&report["match"]["away_score"], &report["match"]["home_score"])
    };
    assert_eq!(eagles_score, 2);
    assert_eq!(hawks_score, 1);

    let defender_status = || async {
        let (_, body) = client
            .call(
                Method::GET,
                &format!("/api/registration/teams/{hawks}/players"),
                Some(&a),
                None,
            )
            .await;
        body["data"][0].clone()
    };
    let player = defender_status().await;
    assert_eq!(player["status"], "suspended");
    assert_eq!(player["suspended_until_matchday"], 2);

    // Matchday 2 is still served; the suspension ends before matchday 3.
    let advance = format!("/api/leagues/seasons/{season}/advance-matchday");
    client.call(Method::POST, &advance, Some(&a), None).await;
    assert_eq!(defender_status().await["status"], "suspended");
    client.call(Method::POST, &advance, Some(&a), None).await;
    let player = defender_status().await;
    assert_eq!(player["status"], "active");
    assert_eq!(player["suspended_until_matchday"], Value::Null);

    Ok(())
}

#[tokio::test]
async fn players_move_between_active_and_inactive_within_the_roster_limit() -> Result<()> {
    let client = Client::new().await?;
    let a = client.register_league("League A", "league-a").await;
    let b = client.register_league("League B", "league-b").await;
    let eagles = client.create_team(&a, "Eagles").await;

    let (status, body) = client
        .call(
            Method::POST,
            "/api/leagues/seasons",
            Some(&a),
            Some(json!({
                "name": "Tiny",
                "start_date": "2025-03-01",
                "end_date": "2025-03-31",
                "max_active_players_per_team": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let season = body["data"]["id"].as_str().unwrap().to_string();
    client
        .call(
            Method::POST,
            &format!("/api/leagues/seasons/{season}/activate"),
            Some(&a),
            None,
        )
        .await;

    let roster = format!("/api/registration/teams/{eagles}/players");
    let (_, body) = client
        .call(
            Method::POST,
            &roster,
            Some(&a),
            Some(json!({ "first_name": "First", "last_name": "Player" })),
        )
        .await;
    let first = body["data"]["id"].as_str().unwrap().to_string();
    let set_status = |player: String, action: &'static str, tenant: String| {
        let client = &client;
        async move {
            client
                .call(
                    Method::PATCH,
                    &format!("/api/registration/players/{player}/{action}"),
                    Some(&tenant),
                    None,
                )
                .await
        }
    };

    let (status, body) = set_status(first.clone(), "deactivate", a.clone()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "inactive");

    let (status, body) = client
        .call(
            Method::POST,
            &roster,
            Some(&a),
            Some(json!({ "first_name": "Second", "last_name": "Player" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let second = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = set_status(first.clone(), "activate", a.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["details"]["field"], "team_id");

    // Another league cannot touch the roster.
    let (status, _) = set_status(second.clone(), "deactivate", b.clone()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    set_status(second, "deactivate", a.clone()).await;
    let (status, body) = set_status(first, "activate", a.clone()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "active");

    Ok(())
}
