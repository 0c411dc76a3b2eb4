//! Integration tests for the CaiYun client using wiremock
//!
//! These tests run the client against a mock HTTP server to cover URL layout,
//! query parameters, vendor headers and error mapping.

use integration_caiyun::{CaiyunApi, CaiyunClient, CaiyunConfig, CaiyunError, WeatherQuery};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const TOKEN: &str = "test-token";
const VENDOR_TOKEN: &str = "UR8ASaplvIwavDfR";

fn sample_weather_response() -> serde_json::Value {
    serde_json::from_str(include_str!("fixtures/weather.json")).expect("fixture is valid JSON")
}

fn sample_life_index_response() -> serde_json::Value {
    serde_json::from_str(include_str!("fixtures/lifeindex.json")).expect("fixture is valid JSON")
}

fn create_test_client(mock_server: &MockServer, token: &str) -> CaiyunClient {
    let mut config = CaiyunConfig::new(token);
    config.base_url = mock_server.uri();
    config.timeout_secs = 5;
    CaiyunClient::new(config).expect("Failed to create client")
}

fn shanghai_query() -> WeatherQuery {
    WeatherQuery {
        latitude: 31.23,
        longitude: 121.47,
        daily_steps: 5,
        hourly_steps: 24,
        alert: true,
        unit: "metric:v2".to_string(),
        timestamp: 1_714_528_800,
    }
}

fn weather_path(token: &str) -> String {
    format!("/v2.6/{token}/121.47,31.23/weather.json")
}

#[tokio::test]
async fn test_get_weather_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .and(query_param("dailysteps", "5"))
        .and(query_param("hourlysteps", "24"))
        .and(query_param("alert", "true"))
        .and(query_param("unit", "metric:v2"))
        .and(query_param("timestamp", "1714528800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let response = client
        .get_weather(&shanghai_query())
        .await
        .expect("Should fetch weather");

    assert_eq!(response.status, "ok");
    assert_eq!(response.tzshift, 28800);
    assert_eq!(response.server_time, 1_714_528_800);

    let result = response.result.expect("result block");
    assert_eq!(result.realtime.skycon, "CLOUDY");
    assert_eq!(result.hourly.precipitation.len(), 4);
    assert_eq!(result.hourly.skycon[2].value, "LIGHT_RAIN");
    assert_eq!(result.daily.skycon.len(), 2);
    assert!(result.daily.life_index.contains_key("carWashing"));

    let alert = result.alert.expect("alert block");
    assert_eq!(alert.content.len(), 1);
    assert_eq!(alert.adcodes.len(), 2);
    assert_eq!(alert.adcodes[1].name, "浦东新区");
}

#[tokio::test]
async fn test_imperial_unit_is_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .and(query_param("unit", "imperial"))
        .and(query_param("alert", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let mut query = shanghai_query();
    query.unit = "imperial".to_string();
    query.alert = false;

    assert!(client.get_weather(&query).await.is_ok());
}

#[tokio::test]
async fn test_vendor_token_sends_app_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(VENDOR_TOKEN)))
        .and(header("device-id", "D9AB80E9-B5CE-40FD-96CD-8E38CF5287B7"))
        .and(header("app-version", "6.7.2"))
        .and(header("app-name", "weather"))
        .and(header("accept-language", "zh-Hans-CN;q=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, VENDOR_TOKEN);
    assert!(client.get_weather(&shanghai_query()).await.is_ok());
}

#[tokio::test]
async fn test_regular_token_sends_no_app_headers() {
    let mock_server = MockServer::start().await;

    // Only a request carrying the vendor header would match this mock
    Mock::given(method("GET"))
        .and(header("device-id", "D9AB80E9-B5CE-40FD-96CD-8E38CF5287B7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_weather(&shanghai_query()).await;

    // wiremock answers unmatched requests with 404
    assert!(matches!(result, Err(CaiyunError::RequestFailed(_))));
}

#[tokio::test]
async fn test_failed_status_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "failed",
            "error": "'token is invalid'",
            "api_version": "v2.6"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_weather(&shanghai_query()).await;

    match result {
        Err(CaiyunError::ApiStatus { status, message }) => {
            assert_eq!(status, "failed");
            assert!(message.contains("token is invalid"));
        },
        other => panic!("Expected ApiStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ok_status_without_result_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_weather(&shanghai_query()).await;

    assert!(matches!(result, Err(CaiyunError::ParseError(_))));
}

#[tokio::test]
async fn test_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_weather(&shanghai_query()).await;

    assert!(matches!(result, Err(CaiyunError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_weather(&shanghai_query()).await;

    assert!(matches!(result, Err(CaiyunError::RateLimitExceeded)));
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_weather(&shanghai_query()).await;

    assert!(matches!(result, Err(CaiyunError::ParseError(_))));
}

#[tokio::test]
async fn test_truncated_body_is_connection_failure() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0_u8; 4096];
        let _ = socket.read(&mut request).await;
        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 1000\r\n\r\n";
        socket.write_all(head.as_bytes()).await.expect("write head");
        socket.write_all(br#"{"status":"ok","#).await.expect("write body");
        socket.shutdown().await.expect("shutdown");
    });

    let mut config = CaiyunConfig::new(TOKEN);
    config.base_url = format!("http://{addr}");
    config.timeout_secs = 5;
    let client = CaiyunClient::new(config).expect("Failed to create client");
    let result = client.get_weather(&shanghai_query()).await;

    assert!(
        matches!(result, Err(CaiyunError::ConnectionFailed(_))),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(weather_path(TOKEN)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sample_weather_response())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = CaiyunConfig::new(TOKEN);
    config.base_url = mock_server.uri();
    config.timeout_secs = 1;
    let client = CaiyunClient::new(config).expect("Failed to create client");

    let result = client.get_weather(&shanghai_query()).await;

    assert!(matches!(result, Err(CaiyunError::Timeout(_))));
}

#[tokio::test]
async fn test_invalid_coordinates() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server, TOKEN);

    let mut query = shanghai_query();
    query.latitude = 95.0;
    assert!(matches!(
        client.get_weather(&query).await,
        Err(CaiyunError::InvalidCoordinates)
    ));

    assert!(matches!(
        client.get_life_index(0.0, 200.0).await,
        Err(CaiyunError::InvalidCoordinates)
    ));
}

#[tokio::test]
async fn test_get_life_index_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/lifeindex/"))
        .and(query_param("token", TOKEN))
        .and(query_param("lng", "121.47"))
        .and(query_param("lat", "31.23"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_life_index_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let response = client
        .get_life_index(31.23, 121.47)
        .await
        .expect("Should fetch life index");

    let categories = response.categories().expect("categories");
    assert!(categories.contains_key("CarWashingIndex"));
    assert!(categories.contains_key("DressingIndex"));
    assert!(categories.contains_key("meta"));
}

#[tokio::test]
async fn test_life_index_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/lifeindex/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "ok", "result": {}})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let response = client
        .get_life_index(31.23, 121.47)
        .await
        .expect("Should fetch life index");

    assert!(response.categories().is_none());
}

#[tokio::test]
async fn test_life_index_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/lifeindex/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, TOKEN);
    let result = client.get_life_index(31.23, 121.47).await;

    assert!(matches!(result, Err(CaiyunError::ServiceUnavailable(_))));
}
