use handball_api::client::{ApiError, GENERIC_SAVE_ERROR, LeagueApi};
use handball_api::config::ApiConfig;
use handball_api::form::{Draft, GameDraft};
use handball_api::{Game, Record, Resource, Team};
use mockito::{Matcher, Server};
use serde_json::json;

fn api_for(server: &Server) -> LeagueApi {
    LeagueApi::new(ApiConfig::new(server.url()))
}

#[tokio::test]
async fn list_decodes_bare_array() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/teams")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":1,"name":"Sharks","league_id":2},{"id":2,"name":"Wolves"}]"#)
        .create_async()
        .await;

    let teams: Vec<Team> = api_for(&server).list(Resource::Teams).await.expect("teams");
    mock.assert_async().await;
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].league_id, Some(2));
    assert_eq!(teams[1].league_id, None);
}

#[tokio::test]
async fn list_unwraps_data_envelope() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/leagues")
        .with_status(200)
        .with_body(r#"{"data":[{"id":5,"name":"Premier","tournament":{"name":"Cup"}}]}"#)
        .create_async()
        .await;

    let leagues: Vec<handball_api::League> = api_for(&server).list(Resource::Leagues).await.expect("leagues");
    assert_eq!(leagues[0].tournament.as_ref().map(|t| t.name.as_str()), Some("Cup"));
}

#[tokio::test]
async fn non_2xx_get_is_a_fetch_error() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/players").with_status(500).create_async().await;

    let api = api_for(&server);
    let err = api.list::<handball_api::Player>(Resource::Players).await.unwrap_err();
    assert!(matches!(err, ApiError::Fetch(500, _)), "got {err:?}");
    assert_eq!(err.user_message(), "Failed to load data (HTTP 500).");

    let empty: Vec<handball_api::Player> = api.list_or_empty(Resource::Players).await;
    assert!(empty.is_empty());
}

#[tokio::test]
async fn garbage_body_is_a_parsing_error() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/news").with_status(200).with_body("<html>").create_async().await;

    let err = api_for(&server).list::<handball_api::News>(Resource::News).await.unwrap_err();
    assert!(matches!(err, ApiError::Parsing(..)));
}

#[tokio::test]
async fn fixtures_request_games_with_referee() {
    let mut server = Server::new_async().await;
    let games = server
        .mock("GET", "/games")
        .match_query(Matcher::UrlEncoded("include".into(), "referee".into()))
        .with_status(200)
        .with_body(
            json!([{
                "id": 1,
                "league_id": 5,
                "match_date": "2024-03-01",
                "status": "completed",
                "home_score": 3,
                "away_score": 1,
                "referee": {"id": 9, "name": "Jo Park", "license_number": "HB-1", "level": "national"}
            }])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/leagues")
        .with_status(200)
        .with_body(r#"[{"id":5,"name":"Premier","tournament":{"name":"Cup"}}]"#)
        .create_async()
        .await;
    server.mock("GET", "/tournaments").with_status(503).create_async().await;
    server.mock("GET", "/teams").with_status(200).with_body("[]").create_async().await;

    let fixtures = api_for(&server).fixtures().await.expect("fixtures");
    games.assert_async().await;

    let grouped = fixtures.grouped(&fixtures.games);
    let leaf = &grouped["Cup"]["Premier"];
    assert_eq!(leaf[0].referee.as_ref().map(|r| r.name.as_str()), Some("Jo Park"));
    assert_eq!(leaf[0].outcome().map(|o| o.label()), Some("Home Win"));
}

#[tokio::test]
async fn create_posts_json_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/games")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "league_id": 5,
            "home_team_id": 1,
            "away_team_id": 2,
            "match_date": "2024-03-01",
            "status": "scheduled",
            "home_score": null,
            "away_score": null,
            "referee_id": null,
            "venue": null
        })))
        .with_status(201)
        .with_body(r#"{"id":10}"#)
        .create_async()
        .await;

    let draft = GameDraft {
        league_id: "5".into(),
        home_team_id: "1".into(),
        away_team_id: "2".into(),
        match_date: "2024-03-01".into(),
        ..Default::default()
    };
    let payload = draft.validate().expect("valid game");
    api_for(&server).create(Resource::Games, &payload).await.expect("created");
    mock.assert_async().await;
}

#[tokio::test]
async fn update_puts_to_record_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/teams/4")
        .match_body(Matcher::PartialJson(json!({"name": "Wolves"})))
        .with_status(200)
        .create_async()
        .await;

    api_for(&server)
        .update(Resource::Teams, 4, &json!({"name": "Wolves", "league_id": null}))
        .await
        .expect("updated");
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_save_prefers_server_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/rankings")
        .with_status(422)
        .with_body(r#"{"message":"This team already has a ranking in that league."}"#)
        .create_async()
        .await;

    let err = api_for(&server).create(Resource::Rankings, &json!({})).await.unwrap_err();
    assert_eq!(err.user_message(), "This team already has a ranking in that league.");
}

#[tokio::test]
async fn rejected_save_without_message_is_generic() {
    let mut server = Server::new_async().await;
    server.mock("POST", "/news").with_status(500).with_body("oops").create_async().await;

    let err = api_for(&server).create(Resource::News, &json!({})).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(500, _)));
    assert_eq!(err.user_message(), GENERIC_SAVE_ERROR);
}

#[tokio::test]
async fn delete_hits_record_path() {
    let mut server = Server::new_async().await;
    let ok = server.mock("DELETE", "/users/3").with_status(204).create_async().await;
    server.mock("DELETE", "/users/4").with_status(403).create_async().await;

    let api = api_for(&server);
    api.delete(Resource::Users, 3).await.expect("deleted");
    ok.assert_async().await;
    assert!(matches!(api.delete(Resource::Users, 4).await, Err(ApiError::Rejected(403, _))));
}

#[tokio::test]
async fn dashboard_survives_a_failing_collection() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/tournaments").with_status(200).with_body(r#"[{"id":1,"name":"Cup"}]"#).create_async().await;
    server.mock("GET", "/leagues").with_status(200).with_body("[]").create_async().await;
    server.mock("GET", "/teams").with_status(200).with_body("[]").create_async().await;
    server
        .mock("GET", "/players")
        .with_status(200)
        .with_body(r#"[{"id":1,"name":"Ana","goals":7},{"id":2,"name":"Bo","goals":5}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/games")
        .with_status(200)
        .with_body(r#"[{"id":1,"status":"live"},{"id":2,"status":"completed","match_date":"2024-01-01"}]"#)
        .create_async()
        .await;
    server.mock("GET", "/referees").with_status(500).create_async().await;

    let dashboard = api_for(&server).dashboard().await;
    assert_eq!(dashboard.stats.tournaments, 1);
    assert_eq!(dashboard.stats.active_referees, 0);
    assert_eq!(dashboard.stats.total_goals, 12);
    assert_eq!(dashboard.live_games.len(), 1);
    assert_eq!(dashboard.recent_results.iter().map(|g: &Game| g.id).collect::<Vec<_>>(), vec![2]);
}

#[tokio::test]
async fn list_records_wraps_each_collection() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/referees")
        .with_status(200)
        .with_body(r#"[{"id":7,"name":"Jo Park","license_number":"HB-7","level":"international"}]"#)
        .create_async()
        .await;

    let records = api_for(&server).list_records(Resource::Referees).await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource(), Resource::Referees);
    let Record::Referee(referee) = &records[0] else {
        panic!("expected a referee");
    };
    assert!(referee.is_active, "missing is_active defaults to active");
}

#[tokio::test]
async fn form_options_are_labelled() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/tournaments").with_status(200).with_body("[]").create_async().await;
    server
        .mock("GET", "/leagues")
        .with_status(200)
        .with_body(r#"[{"id":5,"name":"Premier","tournament":{"name":"Cup"}}]"#)
        .create_async()
        .await;
    server.mock("GET", "/teams").with_status(404).create_async().await;
    server.mock("GET", "/referees").with_status(200).with_body("[]").create_async().await;

    let options = api_for(&server).form_options().await;
    assert_eq!(options.label(Resource::Leagues, 5), Some("Premier (Cup)"));
    assert!(options.teams.is_empty());
}

#[tokio::test]
async fn get_record_fetches_by_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/teams/4")
        .with_status(200)
        .with_body(r#"{"data":{"id":4,"name":"Wolves HC","league_id":2,"coach":"Ana Ruiz"}}"#)
        .create_async()
        .await;

    let record = api_for(&server).get_record(Resource::Teams, 4).await.expect("team");
    mock.assert_async().await;
    let Record::Team(team) = record else {
        panic!("expected a team, got {record:?}");
    };
    assert_eq!(team.name, "Wolves HC");
    assert_eq!(team.coach.as_deref(), Some("Ana Ruiz"));
}

#[tokio::test]
async fn edit_form_needs_the_record_but_not_the_options() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/teams/4")
        .with_status(200)
        .with_body(r#"{"id":4,"name":"Wolves HC","league_id":2}"#)
        .create_async()
        .await;
    server.mock("GET", "/tournaments").with_status(500).create_async().await;
    server
        .mock("GET", "/leagues")
        .with_status(200)
        .with_body(r#"[{"id":2,"name":"Premier"}]"#)
        .create_async()
        .await;
    server.mock("GET", "/teams").with_status(200).with_body("[]").create_async().await;
    server.mock("GET", "/referees").with_status(200).with_body("[]").create_async().await;
    server.mock("GET", "/players/9").with_status(404).create_async().await;

    let api = api_for(&server);
    let (record, options) = api.edit_form(Resource::Teams, 4).await.expect("edit data");
    assert_eq!(record.id(), 4);
    assert_eq!(options.label(Resource::Leagues, 2), Some("Premier"));
    assert!(options.tournaments.is_empty());

    let err = api.edit_form(Resource::Players, 9).await.unwrap_err();
    assert!(matches!(err, ApiError::Fetch(404, _)), "got {err:?}");
}

#[tokio::test]
async fn standings_need_rankings_but_not_lookups() {
    let mut server = Server::new_async().await;
    let rankings = server.mock("GET", "/rankings").with_status(500).create_async().await;
    server.mock("GET", "/leagues").with_status(200).with_body("[]").create_async().await;
    server.mock("GET", "/teams").with_status(200).with_body("[]").create_async().await;

    let api = api_for(&server);
    let err = api.standings().await.unwrap_err();
    assert!(matches!(err, ApiError::Fetch(500, _)), "got {err:?}");
    rankings.remove_async().await;

    server
        .mock("GET", "/rankings")
        .with_status(200)
        .with_body(r#"[{"id":1,"league_id":5,"team_id":3,"played":2,"wins":1,"draws":1,"losses":0,"points":3}]"#)
        .create_async()
        .await;
    server.mock("GET", "/leagues").with_status(503).create_async().await;
    server.mock("GET", "/teams").with_status(503).create_async().await;

    let standings = api.standings().await.expect("rankings alone are enough");
    assert_eq!(standings.rankings.len(), 1);
    assert!(standings.leagues.is_empty());
    assert!(standings.teams.is_empty());
}

#[tokio::test]
async fn rosters_need_teams_but_not_players() {
    let mut server = Server::new_async().await;
    let teams = server.mock("GET", "/teams").with_status(500).create_async().await;
    server.mock("GET", "/players").with_status(200).with_body("[]").create_async().await;
    server.mock("GET", "/leagues").with_status(200).with_body("[]").create_async().await;
    server.mock("GET", "/tournaments").with_status(200).with_body("[]").create_async().await;

    let api = api_for(&server);
    let err = api.rosters().await.unwrap_err();
    assert!(matches!(err, ApiError::Fetch(500, _)), "got {err:?}");
    teams.remove_async().await;

    server
        .mock("GET", "/teams")
        .with_status(200)
        .with_body(r#"[{"id":3,"name":"Sharks"}]"#)
        .create_async()
        .await;
    server.mock("GET", "/players").with_status(500).create_async().await;

    let rosters = api.rosters().await.expect("teams alone are enough");
    assert_eq!(rosters.teams.len(), 1);
    assert!(rosters.players.is_empty());
}

#[tokio::test]
async fn news_lists_published_first_then_newest() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/news")
        .with_status(200)
        .with_body(
            r#"[
                {"id":1,"title":"Old result","status":"published","published_at":"2023-12-30"},
                {"id":2,"title":"Draft preview","status":"draft","published_at":"2024-05-01"},
                {"id":3,"title":"New season","status":"published","published_at":"2024-01-02"},
                {"id":4,"title":"Undated note","status":"draft"}
            ]"#,
        )
        .create_async()
        .await;

    let news = api_for(&server).news().await.expect("news");
    let ids: Vec<u64> = news.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![3, 1, 2, 4]);
}
