//! End-to-end tests for the REST API.

mod common;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use common::{APP_VERSION, TestServer};

async fn post(server: &TestServer, path: &str, body: Value) -> (StatusCode, Value) {
    let response = Client::new()
        .post(server.http(path))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    let status = response.status();
    (status, response.json().await.expect("body is not JSON"))
}

async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = reqwest::get(server.http(path)).await.expect("request failed");
    let status = response.status();
    (status, response.json().await.expect("body is not JSON"))
}

async fn delete(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = Client::new()
        .delete(server.http(path))
        .send()
        .await
        .expect("request failed");
    let status = response.status();
    (status, response.json().await.expect("body is not JSON"))
}

#[tokio::test]
async fn test_register_and_login() {
    // テスト項目: ユーザー登録とログインのステータスコードとレスポンス
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (created, user) = post(
        &server,
        "/api/users",
        json!({"username": "  alice ", "password": "secret"}),
    )
    .await;
    let (duplicate, duplicate_body) = post(
        &server,
        "/api/users",
        json!({"username": "alice", "password": "other"}),
    )
    .await;
    let (empty, _) = post(&server, "/api/users", json!({"username": "", "password": "x"})).await;
    let (logged_in, login_body) = post(
        &server,
        "/api/users/login",
        json!({"username": "alice", "password": "secret"}),
    )
    .await;
    let (wrong_password, _) = post(
        &server,
        "/api/users/login",
        json!({"username": "alice", "password": "nope"}),
    )
    .await;
    let (unknown, _) = post(
        &server,
        "/api/users/login",
        json!({"username": "nobody", "password": "secret"}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(created, StatusCode::CREATED);
    assert_eq!(user["username"], "alice");
    assert!(user["id"].as_i64().unwrap() > 0);
    assert!(user.get("password").is_none());

    assert_eq!(duplicate, StatusCode::CONFLICT);
    assert_eq!(duplicate_body["status"], 409);
    assert_eq!(duplicate_body["error"], "Username is already taken");

    assert_eq!(empty, StatusCode::BAD_REQUEST);
    assert_eq!(logged_in, StatusCode::OK);
    assert_eq!(login_body, user);
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    // テスト項目: JSON として不正なボディは 400 になる
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = Client::new()
        .post(server.http("/api/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(body["status"], 400);

    server.stop().await;
}

#[tokio::test]
async fn test_create_and_list_channels() {
    // テスト項目: チャンネル作成の検証と一覧の内容
    // given (前提条件):
    let server = TestServer::start().await;
    let alice = server.create_user("alice").await;

    // when (操作):
    let (created, channel) = post(
        &server,
        "/api/channels",
        json!({"name": "general", "description": "everything", "userId": alice}),
    )
    .await;
    let (duplicate, _) = post(
        &server,
        "/api/channels",
        json!({"name": "general", "userId": alice}),
    )
    .await;
    let (missing, _) = post(&server, "/api/channels", json!({"name": "random"})).await;
    let (unknown_creator, unknown_body) = post(
        &server,
        "/api/channels",
        json!({"name": "random", "userId": 999}),
    )
    .await;
    let (listed, channels) = get(&server, "/api/channels").await;

    // then (期待する結果):
    assert_eq!(created, StatusCode::CREATED);
    assert_eq!(channel["name"], "general");
    assert_eq!(channel["description"], "everything");
    assert_eq!(channel["createdBy"], alice);
    assert_eq!(channel["createdByUsername"], "alice");
    assert!(channel["createdAt"].as_str().is_some());

    assert_eq!(duplicate, StatusCode::CONFLICT);
    assert_eq!(missing, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_creator, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_body["error"], "User not found");

    assert_eq!(listed, StatusCode::OK);
    assert_eq!(channels, json!([channel]));

    server.stop().await;
}

#[tokio::test]
async fn test_only_creator_can_delete_channel() {
    // テスト項目: チャンネルを削除できるのは作成者だけで、削除後は 404 になる
    // given (前提条件):
    let server = TestServer::start().await;
    let alice = server.create_user("alice").await;
    let bob = server.create_user("bob").await;
    let general = server.create_channel("general", alice).await;

    // when (操作):
    let (forbidden, _) = delete(&server, &format!("/api/channels/{}/users/{}", general, bob)).await;
    let (deleted, body) =
        delete(&server, &format!("/api/channels/{}/users/{}", general, alice)).await;
    let (gone, _) = delete(&server, &format!("/api/channels/{}/users/{}", general, alice)).await;
    let (invalid, invalid_body) = delete(&server, "/api/channels/abc/users/1").await;

    // then (期待する結果):
    assert_eq!(forbidden, StatusCode::FORBIDDEN);
    assert_eq!(deleted, StatusCode::OK);
    assert_eq!(body["message"], "Channel 'general' deleted successfully");
    assert_eq!(body["channelId"], general);
    assert_eq!(gone, StatusCode::NOT_FOUND);
    assert_eq!(invalid, StatusCode::BAD_REQUEST);
    assert_eq!(invalid_body["error"], "Invalid channel ID");

    let (_, channels) = get(&server, "/api/channels").await;
    assert_eq!(channels, json!([]));

    server.stop().await;
}

#[tokio::test]
async fn test_message_history_for_unknown_channel_is_empty() {
    // テスト項目: 存在しないチャンネルの履歴は空配列、不正な ID は 400
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (unknown, history) = get(&server, "/api/channels/42/messages").await;
    let (invalid, _) = get(&server, "/api/channels/zero/messages").await;

    // then (期待する結果):
    assert_eq!(unknown, StatusCode::OK);
    assert_eq!(history, json!([]));
    assert_eq!(invalid, StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックはデータベース疎通とバージョンを返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (status, body) = get(&server, "/api/health").await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "version": APP_VERSION}));

    server.stop().await;
}
