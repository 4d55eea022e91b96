use std::{sync::Arc, time::Duration};

use indoc::indoc;
use integration_tests::{RecordingMailer, TestServer};

fn file_config(path: &std::path::Path) -> String {
    format!(
        "[send_limit.storage]\ntype = \"file\"\npath = {}\n",
        toml::Value::String(path.display().to_string())
    )
}

#[tokio::test]
async fn log_file_is_created_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("email_log.json");

    let _server = TestServer::builder().build(&file_config(&path)).await;

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[tokio::test]
async fn eleventh_email_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("email_log.json");

    let server = TestServer::builder().build(&file_config(&path)).await;
    server.client.login("admin", "admin").await;

    for i in 0..10 {
        let response = server
            .client
            .send_email("tarou@example.com", &format!("Mail {i}"), "<p>Hi</p>")
            .await;

        assert_eq!(response.status(), 200);
    }

    let response = server.client.send_email("tarou@example.com", "One too many", "<p>Hi</p>").await;
    assert_eq!(response.status(), 429);

    let body = response.text().await.unwrap();
    assert!(body.contains("You have reached the limit of 10 emails in 24 hours (10 sent)."));
    assert!(body.contains("Your limit will reset in about 23h 59m."));

    assert_eq!(server.mailer.sent().len(), 10);

    let count = server.client.email_count().await;
    assert_eq!(count["count"], 10);
    assert_eq!(count["remaining"], 0);
    assert_eq!(count["resetInHuman"], "23h 59m");

    let stored: Vec<i64> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.len(), 10);
    assert!(stored.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn sends_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("email_log.json");
    let mailer = Arc::new(RecordingMailer::default());

    let first = TestServer::builder()
        .mailer(mailer.clone())
        .build(&file_config(&path))
        .await;

    first.client.login("admin", "admin").await;

    for _ in 0..3 {
        first.client.send_email("tarou@example.com", "Hi", "<p>Hi</p>").await;
    }

    let second = TestServer::builder().mailer(mailer.clone()).build(&file_config(&path)).await;
    second.client.login("admin", "admin").await;

    assert_eq!(second.client.email_count().await["count"], 3);
    assert_eq!(mailer.sent().len(), 3);
}

#[tokio::test]
async fn corrupt_log_file_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("email_log.json");
    std::fs::write(&path, "[1, 2, oops").unwrap();

    let server = TestServer::builder().build(&file_config(&path)).await;
    server.client.login("admin", "admin").await;

    assert_eq!(server.client.email_count().await["count"], 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");

    let response = server.client.send_email("tarou@example.com", "Hi", "<p>Hi</p>").await;
    assert_eq!(response.status(), 200);
    assert_eq!(server.client.email_count().await["count"], 1);
}

#[tokio::test]
async fn unreadable_log_refuses_to_send() {
    let dir = tempfile::tempdir().unwrap();

    // A directory where the log file should be cannot be read as one.
    let server = TestServer::builder().build(&file_config(dir.path())).await;
    server.client.login("admin", "admin").await;

    let response = server.client.get("/email-count").await;
    assert_eq!(response.status(), 503);

    let response = server.client.send_email("tarou@example.com", "Hi", "<p>Hi</p>").await;
    assert_eq!(response.status(), 503);

    assert!(server.mailer.sent().is_empty());
}

#[tokio::test]
async fn send_is_recorded_when_the_client_hangs_up() {
    let mailer = Arc::new(RecordingMailer::slow(Duration::from_millis(300)));

    let server = TestServer::builder()
        .mailer(mailer.clone())
        .build(indoc! {r#"
            [send_limit.storage]
            type = "memory"
        "#})
        .await;

    server
        .client
        .send_email_and_disconnect("tarou@example.com", Duration::from_millis(100))
        .await;

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(server.client.email_count().await["count"], 1);
}
