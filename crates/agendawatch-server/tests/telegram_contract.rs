//! Telegram Bot API contract tests.
//!
//! These run the real [`TelegramNotifier`] against a local mock of the Bot
//! API and check request shape, response parsing and error mapping.

use agendawatch_server::{Notifier, NotifyError, TelegramConfig, TelegramNotifier};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:test-token";

fn notifier(server: &MockServer) -> TelegramNotifier {
    let base = Url::parse(&server.uri()).unwrap();
    TelegramNotifier::new(TelegramConfig::new(base, TOKEN, "987654321")).unwrap()
}

#[tokio::test]
async fn verify_returns_bot_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "id": 42,
                "is_bot": true,
                "first_name": "Agenda watcher",
                "username": "agenda_watch_bot"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = notifier(&server).verify().await.unwrap();
    assert_eq!(identity.id, 42);
    assert_eq!(identity.to_string(), "@agenda_watch_bot");
}

#[tokio::test]
async fn verify_rejects_bad_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let err = notifier(&server).verify().await.unwrap_err();
    match err {
        NotifyError::Status {
            status,
            description,
        } => {
            assert_eq!(status, 401);
            assert_eq!(description, "Unauthorized");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn verify_rejects_ok_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/bot{TOKEN}/getMe")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "bot was blocked"
        })))
        .mount(&server)
        .await;

    let err = notifier(&server).verify().await.unwrap_err();
    assert!(matches!(err, NotifyError::Rejected(ref d) if d == "bot was blocked"));
}

#[tokio::test]
async fn send_posts_chat_id_and_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "chat_id": "987654321",
            "text": "[NEW EVENT] 10:00–11:00 | Standup"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 7, "date": 0, "chat": {"id": 987654321}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server)
        .send("[NEW EVENT] 10:00–11:00 | Standup")
        .await
        .unwrap();
}

#[tokio::test]
async fn send_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = notifier(&server).send("hello").await.unwrap_err();
    assert!(matches!(err, NotifyError::Status { status: 400, .. }));
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = notifier(&server).send("hello").await.unwrap_err();
    assert!(matches!(err, NotifyError::InvalidResponse(_)));
}

#[tokio::test]
async fn network_errors_do_not_leak_token() {
    // Nothing listens here.
    let base = Url::parse("http://127.0.0.1:9").unwrap();
    let notifier = TelegramNotifier::new(TelegramConfig::new(base, TOKEN, "1")).unwrap();

    let err = notifier.send("hello").await.unwrap_err();
    assert!(matches!(err, NotifyError::Network(_)));
    assert!(!err.to_string().contains(TOKEN));
}
