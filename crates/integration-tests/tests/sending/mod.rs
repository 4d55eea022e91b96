use indoc::indoc;
use integration_tests::TestServer;
use reqwest::multipart::{Form, Part};

const CONFIG: &str = indoc! {r#"
    [send_limit.storage]
    type = "memory"
"#};

#[tokio::test]
async fn dashboard_form_delivers_mail() {
    let server = TestServer::builder().build(CONFIG).await;
    server.client.login("admin", "admin").await;

    let form = Form::new()
        .text("to", "tarou@example.com")
        .text("cc", "hanako@example.com, jirou@example.com")
        .text("subject", "Quarterly report")
        .text("body", "<h1>Report</h1>")
        .part(
            "attachment",
            Part::bytes(b"a,b\n1,2\n".to_vec())
                .file_name("report.csv")
                .mime_str("text/csv")
                .unwrap(),
        );

    let response = server.client.send_form(form).await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"<p>Email sent successfully!</p><a href="/dashboard">Back</a>"#);

    let sent = server.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["tarou@example.com"]);
    assert_eq!(sent[0].cc, vec!["hanako@example.com", "jirou@example.com"]);
    assert_eq!(sent[0].subject, "Quarterly report");

    let attachment = sent[0].attachment.as_ref().unwrap();
    assert_eq!(attachment.filename, "report.csv");
    assert_eq!(attachment.content_type.as_deref(), Some("text/csv"));
    assert_eq!(attachment.content, b"a,b\n1,2\n");
}

#[tokio::test]
async fn count_reflects_sends() {
    let server = TestServer::builder().build(CONFIG).await;
    server.client.login("admin", "admin").await;

    let body = server.client.get("/email-count").await.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"count":0,"limit":10,"remaining":10,"resetInMs":0,"resetInHuman":"0h 0m"}"#);

    server.client.send_email("tarou@example.com", "One", "<p>1</p>").await;
    server.client.send_email("tarou@example.com", "Two", "<p>2</p>").await;

    let count = server.client.email_count().await;
    assert_eq!(count["count"], 2);
    assert_eq!(count["remaining"], 8);
    assert_eq!(count["resetInMs"], 0);
}

#[tokio::test]
async fn invalid_recipient_is_rejected() {
    let server = TestServer::builder().build(CONFIG).await;
    server.client.login("admin", "admin").await;

    let response = server.client.send_email("not an address", "Hi", "<p>Hi</p>").await;
    assert_eq!(response.status(), 400);

    let body = response.text().await.unwrap();
    assert!(body.contains("Email NOT sent."));

    assert!(server.mailer.sent().is_empty());
    assert_eq!(server.client.email_count().await["count"], 0);
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let config = indoc! {r#"
        [server]
        max_upload_size = 1024

        [send_limit.storage]
        type = "memory"
    "#};

    let server = TestServer::builder().build(config).await;
    server.client.login("admin", "admin").await;

    let form = Form::new()
        .text("to", "tarou@example.com")
        .text("subject", "Big")
        .text("body", "<p>Big</p>")
        .part("attachment", Part::bytes(vec![0u8; 4096]).file_name("big.bin"));

    let response = server.client.send_form(form).await;
    assert_eq!(response.status(), 413);

    assert!(server.mailer.sent().is_empty());
    assert_eq!(server.client.email_count().await["count"], 0);
}
