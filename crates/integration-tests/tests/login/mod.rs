use indoc::indoc;
use integration_tests::TestServer;

const CONFIG: &str = indoc! {r#"
    [auth]
    username = "operator"
    password = "hunter2"

    [send_limit.storage]
    type = "memory"
"#};

fn location(response: &reqwest::Response) -> &str {
    response.headers()["location"].to_str().unwrap()
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let server = TestServer::builder().build(CONFIG).await;

    let response = server.client.get("/").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/dashboard");

    let response = server.client.get("/dashboard").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");

    let response = server.client.get("/login").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn configured_credentials_open_the_dashboard() {
    let server = TestServer::builder().build(CONFIG).await;

    let response = server.client.login("admin", "admin").await;
    assert_eq!(location(&response), "/login?error=1");

    let response = server.client.login("operator", "hunter2").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/dashboard");

    let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let response = server.client.get("/dashboard").await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("Logged in as operator"));
}

#[tokio::test]
async fn sessions_are_per_client() {
    let server = TestServer::builder().build(CONFIG).await;
    server.client.login("operator", "hunter2").await;

    let stranger = server.new_client();
    let response = stranger.get("/email-count").await;

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn logout_closes_the_session() {
    let server = TestServer::builder().build(CONFIG).await;
    server.client.login("operator", "hunter2").await;

    let response = server.client.logout().await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");

    let response = server.client.get("/dashboard").await;
    assert_eq!(location(&response), "/login");
}
