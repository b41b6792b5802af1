use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use steambots_api_client::auth::StaticCredentials;
use steambots_api_client::error::SteamBotsError;
use steambots_api_client::rest::{ApiRequest, QueryParams, SteamBotsApi, SteamBotsRestClient};
use steambots_api_client::SteamBots;

const TRADE_LINK: &str = "https://steamcommunity.com/tradeoffer/new/?partner=34202358&token=AbCdEf";

fn build_client(server: &MockServer) -> SteamBotsRestClient {
    SteamBotsRestClient::builder()
        .base_url(server.uri())
        .credentials(Arc::new(StaticCredentials::new("test_key")))
        .build()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_get_trade_sends_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trades/abc123"))
        .and(header("Key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc123",
            "state": "accepted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let trade = client.get_trade("abc123").await.unwrap();
    assert_eq!(trade["state"], "accepted");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn test_non_200_rejects_with_decoded_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bots"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad"})))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client.get_bots().await.unwrap_err();
    match err {
        SteamBotsError::Api(api_error) => {
            assert_eq!(api_error.body, json!({"error": "bad"}));
            assert_eq!(api_error.status, 400);
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_200_success_status_is_still_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deposits"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "d1"})))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client
        .create_deposit(TRADE_LINK, &["1"])
        .await
        .unwrap_err();
    let api_error = err.as_api_error().unwrap();
    assert_eq!(api_error.status, 201);
    assert_eq!(api_error.body, json!({"id": "d1"}));
}

#[tokio::test]
async fn test_create_deposit_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deposits"))
        .and(header("Key", "test_key"))
        .and(body_json(json!({
            "trade_link": TRADE_LINK,
            "asset_ids": ["15012345678", "15012345679"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "dep-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let deposit = client
        .create_deposit(TRADE_LINK, &["15012345678", "15012345679"])
        .await
        .unwrap();
    assert_eq!(deposit["id"], "dep-1");
}

#[tokio::test]
async fn test_create_deposit_validates_before_network() {
    let server = MockServer::start().await;
    let client = build_client(&server);

    let no_assets: [&str; 0] = [];
    let err = client.create_deposit(TRADE_LINK, &no_assets).await.unwrap_err();
    assert!(matches!(err, SteamBotsError::InvalidArgument(_)));
    assert!(err.to_string().contains("asset_ids"));

    let err = client.create_deposit("not a link", &["1"]).await.unwrap_err();
    assert!(err.to_string().contains("trade_link"));

    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_create_withdrawal_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/withdrawals"))
        .and(body_json(json!({
            "trade_link": TRADE_LINK,
            "item_ids": ["item-9"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wd-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let item_ids = vec!["item-9".to_string()];
    let withdrawal = client.create_withdrawal(TRADE_LINK, &item_ids).await.unwrap();
    assert_eq!(withdrawal["id"], "wd-1");
}

#[tokio::test]
async fn test_create_withdrawal_rejects_blank_item() {
    let server = MockServer::start().await;
    let client = build_client(&server);

    let err = client
        .create_withdrawal(TRADE_LINK, &["item-1", ""])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("item_ids[1]"));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_resend_trade_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trades/t-1/resend"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resent": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/trades/t-2/resend"))
        .and(body_json(json!({"trade_link": TRADE_LINK})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resent": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    client.resend_trade("t-1", None).await.unwrap();
    client.resend_trade("t-2", Some(TRADE_LINK)).await.unwrap();
}

#[tokio::test]
async fn test_get_trades_with_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trades"))
        .and(query_param("state", "accepted"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "t-1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let filter = QueryParams::new().param("state", "accepted").param("limit", 25);
    let trades = client.get_trades(Some(&filter)).await.unwrap();
    assert_eq!(trades.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_items_and_inventory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory/76561197994468086"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"assetid": "1"}]})))
        .mount(&server)
        .await;

    let client = build_client(&server);
    assert_eq!(client.get_items(None).await.unwrap(), json!([]));

    let inventory = client.load_inventory("76561197994468086").await.unwrap();
    assert_eq!(inventory["items"][0]["assetid"], "1");

    let err = client.load_inventory("../bots").await.unwrap_err();
    assert!(matches!(err, SteamBotsError::InvalidArgument(_)));
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_invalid_json_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bots"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = build_client(&server);
    let err = client.get_bots().await.unwrap_err();
    assert!(matches!(err, SteamBotsError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_missing_credentials() {
    let server = MockServer::start().await;
    let client = SteamBotsRestClient::builder().base_url(server.uri()).build();

    let err = client.get_bots().await.unwrap_err();
    assert!(matches!(err, SteamBotsError::MissingCredentials));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_raw_call_put_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/bots/b-1"))
        .and(query_param("notify", "false"))
        .and(body_json(json!({"paused": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paused": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/trades/t-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(&server);
    let updated = client
        .call(
            ApiRequest::put("/bots/b-1")
                .query_param("notify", false)
                .json(json!({"paused": true})),
        )
        .await
        .unwrap();
    assert_eq!(updated["paused"], true);

    let err = client.call(ApiRequest::delete("/trades/t-1")).await.unwrap_err();
    assert!(err.as_api_error().unwrap().is_not_found());
}

async fn bot_count<C: SteamBotsApi>(client: &C) -> usize {
    client
        .get_bots()
        .await
        .map(|bots| bots.as_array().map(Vec::len).unwrap_or(0))
        .unwrap_or(0)
}

#[tokio::test]
async fn test_trait_over_rest_client_and_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bots"))
        .and(header("Key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(2)
        .mount(&server)
        .await;

    let rest = build_client(&server);
    assert_eq!(bot_count(&rest).await, 2);

    let handle = SteamBots::builder(Arc::new(StaticCredentials::new("test_key")))
        .api_url(server.uri())
        .build();
    assert_eq!(bot_count(&handle).await, 2);
}
