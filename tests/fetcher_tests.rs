mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use common::{ScriptedSource, T0, payload, weather_config};
use serde_json::json;
use weatherbot::BotError;
use weatherbot::core::clock::ManualClock;
use weatherbot::weather::{
    CaiyunClient, FixedSelector, Fetcher, RoundRobinSelector, WeatherSource,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(
    dir: &std::path::Path,
    retry: u32,
    failures: usize,
) -> (Fetcher, Arc<ManualClock>, Arc<std::sync::atomic::AtomicUsize>) {
    let clock = Arc::new(ManualClock::new(T0));
    let source = ScriptedSource::new(failures, clock.clone());
    let calls = source.calls.clone();
    let mut config = weather_config(dir);
    config.retry = retry;
    let fetcher = Fetcher::new(
        &config,
        Box::new(source),
        Box::new(FixedSelector(0)),
        clock.clone(),
    );
    (fetcher, clock, calls)
}

#[tokio::test]
async fn test_cache_served_within_ttl_and_refetched_after() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, clock, calls) = fetcher(dir.path(), 3, 0);

    let first = fetcher.fetch().await.unwrap();
    assert_eq!(first.server_time, T0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(fetcher.cache().path().exists());

    clock.advance(100);
    let cached = fetcher.fetch().await.unwrap();
    assert_eq!(cached.server_time, T0);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "served from cache");

    clock.advance(300);
    let fresh = fetcher.fetch().await.unwrap();
    assert_eq!(fresh.server_time, T0 + 400);
    assert_eq!(calls.load(Ordering::SeqCst), 2, "stale cache refetched");
}

#[tokio::test]
async fn test_cache_expires_exactly_at_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, clock, calls) = fetcher(dir.path(), 1, 0);

    fetcher.fetch().await.unwrap();
    clock.advance(299);
    fetcher.fetch().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    clock.advance(1);
    fetcher.fetch().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retries_until_success() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, _clock, calls) = fetcher(dir.path(), 3, 2);

    let response = fetcher.fetch().await.unwrap();
    assert!(response.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_attempts_are_bounded_by_retry() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, _clock, calls) = fetcher(dir.path(), 3, usize::MAX);

    let err = fetcher.fetch().await.unwrap_err();
    match err {
        BotError::FetchExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("timeout #3"), "{last_error}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(!fetcher.cache().path().exists(), "failures are never cached");
}

#[tokio::test]
async fn test_fixed_delay_between_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let source = ScriptedSource::new(usize::MAX, clock.clone());
    let calls = source.calls.clone();
    let mut config = weather_config(dir.path());
    config.retry = 3;
    config.retry_delay = Duration::from_millis(40);
    let fetcher = Fetcher::new(&config, Box::new(source), Box::new(FixedSelector(0)), clock);

    let started = Instant::now();
    let err = fetcher.fetch().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, BotError::FetchExhausted { attempts: 3, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Two waits between three attempts, none after the last.
    assert!(elapsed >= Duration::from_millis(80), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_zero_retry_makes_no_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, _clock, calls) = fetcher(dir.path(), 0, 0);

    let err = fetcher.fetch().await.unwrap_err();
    assert!(matches!(err, BotError::FetchExhausted { attempts: 0, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_corrupt_cache_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, _clock, calls) = fetcher(dir.path(), 1, 0);
    std::fs::write(fetcher.cache().path(), b"{not json").unwrap();

    let response = fetcher.fetch().await.unwrap();
    assert_eq!(response.server_time, T0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let rewritten = fetcher.cache().read().unwrap();
    assert_eq!(rewritten, response);
}

#[tokio::test]
async fn test_cache_round_trip_keeps_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, _clock, _calls) = fetcher(dir.path(), 1, 0);

    let fetched = fetcher.fetch().await.unwrap();
    let stored = fetcher.cache().read().unwrap();
    assert_eq!(stored, fetched);
    assert_eq!(stored.extra.get("api_version"), Some(&json!("v2.6")));
}

#[tokio::test]
async fn test_round_robin_rotates_credentials_between_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let source = ScriptedSource::new(2, clock.clone());
    let tokens = source.tokens.clone();
    let fetcher = Fetcher::new(
        &weather_config(dir.path()),
        Box::new(source),
        Box::<RoundRobinSelector>::default(),
        clock,
    );

    fetcher.fetch().await.unwrap();
    assert_eq!(
        *tokens.lock().unwrap(),
        vec!["token-a", "token-b", "token-a"]
    );
}

#[tokio::test]
async fn test_caiyun_client_requests_forecast_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/token-a/121.47,31.23/weather.json"))
        .and(query_param("lang", "zh_CN"))
        .and(query_param("alert", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload(T0)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = weather_config(dir.path());
    config.api_base = server.uri();
    let client = CaiyunClient::new(&config).unwrap();

    let response = client.request("token-a").await.unwrap();
    assert_eq!(response.server_time, T0);
    assert!(response.realtime().is_some_and(|r| r.is_ok()));
}

#[tokio::test]
async fn test_caiyun_client_rejects_failed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "failed", "error": "token is invalid" })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = weather_config(dir.path());
    config.api_base = server.uri();
    let client = CaiyunClient::new(&config).unwrap();

    let err = client.request("bad").await.unwrap_err();
    assert!(matches!(err, BotError::ApiStatus(ref s) if s == "failed"));
}

#[tokio::test]
async fn test_caiyun_client_http_error_hides_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = weather_config(dir.path());
    config.api_base = server.uri();
    let client = CaiyunClient::new(&config).unwrap();

    let err = client.request("secret-token").await.unwrap_err();
    assert!(matches!(err, BotError::HttpError(_)));
    assert!(!err.to_string().contains("secret-token"));
}
