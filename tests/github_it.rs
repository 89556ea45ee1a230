use httpmock::prelude::*;
use reqwest::Url;
use serde_json::{json, Value};
use tg_releasebot::github::{GithubClient, Project, ReleaseSource, PROJECTS};

const TWO_PROJECTS: &[Project] = &[
    Project { key: "moon", owner: "aerokube", name: "moon" },
    Project { key: "images", owner: "aerokube", name: "images" },
];

fn client(server: &MockServer) -> GithubClient {
    let endpoint = Url::parse(&server.url("/graphql")).unwrap();
    GithubClient::new("test-token".into(), endpoint).unwrap()
}

fn repo(key: &str, tag: &str) -> Value {
    json!({
        "releases": {
            "nodes": [{
                "url": format!("https://github.com/aerokube/{}/releases/tag/{}", key, tag),
                "publishedAt": "2021-03-01T10:00:00Z",
                "tag": { "name": tag }
            }]
        }
    })
}

fn all_projects() -> Value {
    let mut data = serde_json::Map::new();
    for (i, project) in PROJECTS.iter().enumerate() {
        data.insert(project.key.to_string(), repo(project.key, &format!("1.{}.0", i)));
    }
    json!({ "data": data })
}

#[tokio::test]
async fn six_projects_give_six_sorted_lines() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .header("Authorization", "Bearer test-token")
                .header_exists("user-agent")
                .body_contains("selenoid_ui: repository(owner: \\\"aerokube\\\", name: \\\"selenoid-ui\\\")");
            then.status(200).json_body(all_projects());
        })
        .await;

    let reply = client(&server).fetch_releases().await.unwrap();
    mock.assert_async().await;

    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), 6);

    let keys: Vec<&str> = lines
        .iter()
        .map(|line| line.trim_start_matches('*').split('*').next().unwrap())
        .collect();
    assert_eq!(keys, vec!["cm", "ggr", "ggr_ui", "moon", "selenoid", "selenoid_ui"]);

    for (i, project) in PROJECTS.iter().enumerate() {
        let tag = format!("1.{}.0", i);
        let prefix = format!(
            "*{key}*: [{tag}](https://github.com/aerokube/{key}/releases/tag/{tag}) - ",
            key = project.key,
            tag = tag
        );
        let line = lines
            .iter()
            .find(|line| line.starts_with(&prefix))
            .unwrap_or_else(|| panic!("missing line for {}", project.key));
        assert!(line.ends_with(" years ago"), "unexpected relative time in {}", line);
    }
}

#[tokio::test]
async fn custom_project_list_drives_the_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("images: repository(owner: \\\"aerokube\\\", name: \\\"images\\\")")
                .body_contains("moon: repository(");
            then.status(200).json_body(json!({
                "data": {
                    "moon": repo("moon", "2.4.0"),
                    "images": repo("images", "1.0.0")
                }
            }));
        })
        .await;

    let github = client(&server).with_projects(TWO_PROJECTS);
    let reply = github.fetch_releases().await.unwrap();
    mock.assert_async().await;

    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("*images*: [1.0.0]"));
    assert!(lines[1].starts_with("*moon*: [2.4.0]"));
}

#[tokio::test]
async fn project_without_releases_is_omitted() {
    let server = MockServer::start_async().await;
    let mut body = all_projects();
    body["data"]["moon"] = json!({ "releases": { "nodes": [] } });
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(body);
        })
        .await;

    let reply = client(&server).fetch_releases().await.unwrap();
    assert_eq!(reply.lines().count(), 5);
    assert!(!reply.contains("*moon*"));
    assert!(reply.contains("*selenoid*"));
}

#[tokio::test]
async fn identical_upstream_data_gives_identical_replies() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(all_projects());
        })
        .await;

    let github = client(&server);
    let first = github.fetch_releases().await.unwrap();
    let second = github.fetch_releases().await.unwrap();
    mock.assert_hits_async(2).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn error_status_fails_the_fetch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(401).body("{\"message\":\"Bad credentials\"}");
        })
        .await;

    let err = client(&server).fetch_releases().await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn malformed_body_fails_the_fetch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).body("<html>oops</html>");
        })
        .await;

    assert!(client(&server).fetch_releases().await.is_err());
}

#[tokio::test]
async fn unreachable_endpoint_fails_the_fetch() {
    let endpoint = Url::parse("http://127.0.0.1:1/graphql").unwrap();
    let github = GithubClient::new("test-token".into(), endpoint).unwrap();
    assert!(github.fetch_releases().await.is_err());
}
