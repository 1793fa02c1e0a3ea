use std::time::Duration;

use skillfarm_board::api::ApiClient;
use skillfarm_board::config::types::ServerConfig;
use skillfarm_board::confirm::Submission;
use skillfarm_board::engine::{Endpoint, Engine, Event, Request, ServerEngine};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_config(server: &MockServer) -> ServerConfig {
    ServerConfig {
        base_url: format!("{}/skillfarm/", server.uri()),
        csrf_token: Some("tok".to_owned()),
        session_cookie: Some("sess".to_owned()),
        character_id: 90_000_001,
        ..ServerConfig::default()
    }
}

/// Wait for the next engine event without blocking the test runtime.
async fn next_event(rx: std::sync::mpsc::Receiver<Event>) -> Event {
    tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
        .await
        .unwrap()
        .expect("engine should reply within 5 seconds")
}

#[tokio::test]
async fn fetch_details_sends_session_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/skillfarm/api/character/90000001/details/"))
        .and(header("cookie", "sessionid=sess; csrftoken=tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(include_str!("fixtures/details.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server_config(&server)).unwrap();
    let payload = client.fetch_details().await.unwrap();
    assert_eq!(payload.details.len(), 3);
    assert_eq!(payload.inactive.len(), 2);
}

#[tokio::test]
async fn fetch_roster_decodes_groups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/skillfarm/api/character/90000001/skillfarm/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(include_str!("fixtures/roster.json")),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server_config(&server)).unwrap();
    let payload = client.fetch_roster().await.unwrap();
    assert_eq!(payload.groups.len(), 2);
    assert_eq!(
        payload.known_skills(90_000_004),
        ["Mining".to_owned(), "Refining".to_owned()]
    );
}

#[tokio::test]
async fn malformed_payload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"details\": 5}"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server_config(&server)).unwrap();
    let err = client.fetch_details().await.unwrap_err();
    assert!(format!("{err:#}").contains("decoding payload"));
}

#[tokio::test]
async fn toggle_all_posts_form_with_id_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skillfarm/switch_alarm/0/"))
        .and(header("x-csrftoken", "tok"))
        .and(body_string_contains("csrfmiddlewaretoken=tok"))
        .and(body_string_contains("character_id=0"))
        .and(body_string_contains("confirm=yes"))
        .respond_with(ResponseTemplate::new(302))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server_config(&server)).unwrap();
    client.submit(&Submission::ToggleAllAlarms).await.unwrap();
}

#[tokio::test]
async fn mark_as_read_posts_to_its_own_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skillfarm/mark_as_read/90000003/"))
        .and(header("x-csrftoken", "tok"))
        .and(body_string_contains("character_id=90000003"))
        .and(body_string_contains("confirm=yes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server_config(&server)).unwrap();
    client
        .submit(&Submission::MarkAsRead {
            character_id: 90_000_003,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn skillset_post_carries_selected_skills_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skillfarm/skillset/90000002/"))
        .and(body_string_contains("character_id=90000002"))
        .and(body_string_contains(
            "selected_skills=%5B%7B%22value%22%3A%22Cybernetics%22%2C%22text%22%3A%22Cybernetics%22%7D",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server_config(&server)).unwrap();
    client
        .submit(&Submission::SaveSkillset {
            character_id: 90_000_002,
            skills: vec!["Cybernetics".to_owned(), "  ".to_owned()],
        })
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    // The blank entry is dropped before posting.
    assert_eq!(body.matches("%22value%22").count(), 1);
}

#[tokio::test]
async fn server_engine_reports_http_failure_as_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let handle = ServerEngine::new(ApiClient::new(&server_config(&server)).unwrap()).start();
    let (tx, rx) = std::sync::mpsc::channel::<Event>();
    handle.send(Request::FetchRoster { reply_tx: tx });

    match next_event(rx).await {
        Event::FetchError { endpoint, message } => {
            assert_eq!(endpoint, Endpoint::Roster);
            assert!(message.contains("500"), "got {message}");
        }
        _other => panic!("expected FetchError, got a different event variant"),
    }
}

#[tokio::test]
async fn server_engine_acknowledges_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/skillfarm/switch_alarm/90000001/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let handle = ServerEngine::new(ApiClient::new(&server_config(&server)).unwrap()).start();
    let (tx, rx) = std::sync::mpsc::channel::<Event>();
    handle.send(Request::Submit {
        submission: Submission::ToggleAlarm {
            character_id: 90_000_001,
        },
        description: "toggle Aria".to_owned(),
        reply_tx: tx,
    });

    match next_event(rx).await {
        Event::SubmissionSent { description } => assert_eq!(description, "toggle Aria"),
        _other => panic!("expected SubmissionSent, got a different event variant"),
    }
}
