//! Integration tests for `TwitterClient` using wiremock HTTP mocks.

use leaderpulse_core::Credentials;
use leaderpulse_twitter::{
    collect_backfill, BackfillPlan, ClientSettings, StopCondition, StopReason, TimelineQuery,
    TwitterClient, TwitterError,
};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMELINE: &str = "/1.1/statuses/user_timeline.json";

fn credentials() -> Credentials {
    Credentials {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "at".to_string(),
        access_secret: "as".to_string(),
    }
}

fn settings(base_url: &str, max_retries: u32) -> ClientSettings {
    ClientSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        user_agent: "leaderpulse-test".to_string(),
        max_retries,
        backoff_base_secs: 0,
    }
}

fn tweet(id: u64, created_at: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "full_text": format!("Working for Canadians, post {id}"),
        "created_at": created_at,
        "lang": "en",
        "retweet_count": 3,
        "favorite_count": 10,
        "user": { "id": 1, "screen_name": "JustinTrudeau", "name": "Justin Trudeau" },
        "entities": { "hashtags": [] }
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        // base64("ck:cs")
        .and(header("authorization", "Basic Y2s6Y3M="))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "bearer",
            "access_token": "test-bearer"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer, max_retries: u32) -> TwitterClient {
    TwitterClient::connect(&credentials(), &settings(&server.uri(), max_retries))
        .await
        .expect("token exchange should succeed")
}

#[tokio::test]
async fn user_timeline_sends_expected_query_and_parses_page() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(header("authorization", "Bearer test-bearer"))
        .and(query_param("screen_name", "JustinTrudeau"))
        .and(query_param("count", "200"))
        .and(query_param("exclude_replies", "true"))
        .and(query_param("include_rts", "false"))
        .and(query_param("tweet_mode", "extended"))
        .and(query_param("max_id", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            tweet(500, "Wed Jun 10 14:05:09 +0000 2020"),
            tweet(499, "Tue Jun 09 09:00:00 +0000 2020")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server, 0).await;
    let mut query = TimelineQuery::new("JustinTrudeau", 200, false);
    query.max_id = Some(500);
    let page = client
        .user_timeline(&query)
        .await
        .expect("should parse timeline page");

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, 500);
    assert_eq!(page[1].body(), "Working for Canadians, post 499");
}

#[tokio::test]
async fn rate_limit_is_retried_transparently() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([tweet(
            42,
            "Wed Jun 10 14:05:09 +0000 2020"
        )])))
        .mount(&server)
        .await;

    let client = connect(&server, 3).await;
    let page = client
        .user_timeline(&TimelineQuery::new("JustinTrudeau", 200, false))
        .await
        .expect("429 should be retried");

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, 42);
}

#[tokio::test]
async fn server_errors_surface_after_retries_exhausted() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = connect(&server, 1).await;
    let err = client
        .user_timeline(&TimelineQuery::new("JustinTrudeau", 200, false))
        .await
        .unwrap_err();

    assert!(
        matches!(err, TwitterError::UnexpectedStatus { status: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn rejected_credentials_fail_at_connect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = TwitterClient::connect(&credentials(), &settings(&server.uri(), 3))
        .await
        .unwrap_err();

    assert!(matches!(err, TwitterError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn non_bearer_token_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "mac",
            "access_token": "x"
        })))
        .mount(&server)
        .await;

    let err = TwitterClient::connect(&credentials(), &settings(&server.uri(), 0))
        .await
        .unwrap_err();

    assert!(matches!(err, TwitterError::Auth(ref m) if m.contains("mac")));
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"errors\": \"nope\"}"))
        .mount(&server)
        .await;

    let client = connect(&server, 3).await;
    let err = client
        .user_timeline(&TimelineQuery::new("JustinTrudeau", 200, false))
        .await
        .unwrap_err();

    assert!(
        matches!(err, TwitterError::Deserialize { ref context, .. } if context.contains("JustinTrudeau")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn backfill_over_http_follows_the_cursor() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("max_id", "98"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            tweet(100, "Wed Jun 10 14:05:09 +0000 2020"),
            tweet(99, "Mon Jun 01 08:00:00 +0000 2020")
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = connect(&server, 0).await;
    let plan = BackfillPlan {
        handle: "JustinTrudeau".to_string(),
        page_size: 2,
        include_retweets: false,
        stops: vec![StopCondition::MaxIterations(10)],
    };
    let outcome = collect_backfill(&client, &plan).await;

    assert_eq!(outcome.stop_reason, StopReason::EmptyPage);
    assert_eq!(outcome.pages, 2);
    let ids: Vec<u64> = outcome.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![100, 99]);
    assert_eq!(outcome.posts[1].date_week.to_string(), "2020-06-01");
}
