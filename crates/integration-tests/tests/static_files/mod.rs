use integration_tests::TestServer;

#[tokio::test]
async fn assets_are_served_without_login() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();

    let config = format!(
        "[server]\nstatic_dir = {}\n\n[send_limit.storage]\ntype = \"memory\"\n",
        toml::Value::String(dir.path().display().to_string())
    );

    let server = TestServer::builder().build(&config).await;

    let response = server.client.get("/style.css").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/css");
    assert_eq!(response.text().await.unwrap(), "body { margin: 0; }");

    let response = server.client.get("/missing.css").await;
    assert_eq!(response.status(), 404);
}
