use indoc::indoc;
use integration_tests::TestServer;

#[tokio::test]
async fn health_endpoint_enabled_by_default() {
    let config = indoc! {r#"
        [send_limit.storage]
        type = "memory"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"status":"healthy"}"#);
}

#[tokio::test]
async fn health_endpoint_custom_path() {
    let config = indoc! {r#"
        [server.health]
        path = "/status"

        [send_limit.storage]
        type = "memory"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = server.client.get("/status").await;
    assert_eq!(response.status(), 200);

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let config = indoc! {r#"
        [server.health]
        enabled = false

        [send_limit.storage]
        type = "memory"
    "#};

    let server = TestServer::builder().build(config).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn health_endpoint_separate_listener() {
    let health_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let health_addr = health_listener.local_addr().unwrap();
    drop(health_listener);

    let config = format!(
        indoc! {r#"
            [server.health]
            listen = "{}"

            [send_limit.storage]
            type = "memory"
        "#},
        health_addr
    );

    let server = TestServer::builder().build(&config).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 404);

    // The health listener binds in its own task.
    let mut response = None;

    for _ in 0..20 {
        if let Ok(ok) = reqwest::get(format!("http://{health_addr}/health")).await {
            response = Some(ok);
            break;
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let response = response.unwrap();
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    insta::assert_snapshot!(body, @r#"{"status":"healthy"}"#);
}
