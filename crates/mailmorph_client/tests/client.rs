use std::time::Duration;

use mailmorph_client::{
    Backend, ClientConfig, ExtractContract, ExtractOptions, ReqwestClient, RequestError,
    TransportSettings,
};
use mailmorph_core::{BrokerDetails, LogRecord, NormalizedTimestamp};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestClient {
    let config = ClientConfig::new().with_env_base_url(server.uri()).unwrap();
    ReqwestClient::new(config).unwrap()
}

#[tokio::test]
async fn extract_passes_broker_document_through() {
    let server = MockServer::start().await;
    let text = "Hi Jane, I am interested in 123 Main St.";
    let document = json!({
        "broker_name": "Jane",
        "broker_email": "jane@x.com",
        "brokerage": "X Realty",
        "complete_address": "123 Main St."
    });
    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "text": text })))
        .respond_with(ResponseTemplate::new(200).set_body_json(document.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .extract(text, &ExtractOptions::default())
        .await
        .expect("extract ok");

    assert_eq!(serde_json::to_value(&result).unwrap(), document);
    assert_eq!(result.len(), 4);
    let broker: BrokerDetails = result.decode().unwrap();
    assert_eq!(broker.broker_email, "jane@x.com");
}

#[tokio::test]
async fn extract_keeps_unknown_keys() {
    let server = MockServer::start().await;
    let document = json!({ "extracted_text": "Hello there", "word_count": 2, "extra": [1, 2] });
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document.clone()))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .extract("Hello there", &ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(result.get("extra"), Some(&json!([1, 2])));
    assert_eq!(serde_json::to_value(&result).unwrap(), document);
}

#[tokio::test]
async fn legacy_contract_sends_default_word_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_json(json!({ "text": "one two", "max_words": 10 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "extracted_text": "one two" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .with_env_base_url(server.uri())
        .unwrap()
        .with_contract(ExtractContract::Legacy);
    let client = ReqwestClient::new(config).unwrap();

    client
        .extract("one two", &ExtractOptions::default())
        .await
        .expect("legacy extract ok");
}

#[tokio::test]
async fn legacy_contract_sends_explicit_word_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_json(json!({ "text": "one two three", "max_words": 2 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "extracted_text": "one two" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .with_env_base_url(server.uri())
        .unwrap()
        .with_contract(ExtractContract::Legacy);
    let options = ExtractOptions {
        max_words: Some(2),
        ..ExtractOptions::default()
    };

    ReqwestClient::new(config)
        .unwrap()
        .extract("one two three", &options)
        .await
        .unwrap();
}

#[tokio::test]
async fn extract_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Agent error: boom"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .extract("text", &ExtractOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Extraction {
            status: 500,
            body: "Agent error: boom".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Extraction failed (500): Agent error: boom");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn extract_failure_without_body_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .extract("text", &ExtractOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RequestError::Extraction {
            status: 503,
            body: String::new(),
        }
    );
    assert_eq!(err.to_string(), "Extraction failed (503): ");
}

#[tokio::test]
async fn extract_non_object_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .extract("text", &ExtractOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::InvalidBody { .. }));
}

#[tokio::test]
async fn metrics_parse_rows_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "tokens_used": 5, "latency": 120, "timestamp": "2024-01-15T10:30:00Z" },
            { "_id": { "$oid": "abc" }, "tokens_used": 7, "latency": 80.5,
              "timestamp": { "$date": { "$numberLong": "1705314600000" } } },
            { "tokens_used": 1, "latency": 1, "timestamp": { "foo": "bar" } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client_for(&server).fetch_metrics(None).await.unwrap();

    assert_eq!(
        rows.iter().map(|row| row.tokens_used).collect::<Vec<_>>(),
        vec![Some(5), Some(7), Some(1)]
    );
    assert_eq!(rows[0].normalized_timestamp(), rows[1].normalized_timestamp());
    assert_eq!(
        rows[2].normalized_timestamp(),
        NormalizedTimestamp::Unparseable(r#"{"foo":"bar"}"#.to_string())
    );
}

#[tokio::test]
async fn null_and_empty_bodies_are_empty_lists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logging"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);

    assert!(client.fetch_metrics(None).await.unwrap().is_empty());
    assert!(client.fetch_logs(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn telemetry_failures_report_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logging"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.fetch_metrics(None).await.unwrap_err();
    assert_eq!(err, RequestError::HttpStatus { status: 500 });
    assert_eq!(err.to_string(), "HTTP 500");

    let err = client.fetch_logs(None).await.unwrap_err();
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn logs_parse_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "request_id": "r-1", "source_hash": "9f2c", "cache_hit": true,
              "latency": 12, "timestamp": { "$date": "2024-01-15T10:30:00Z" } }
        ])))
        .mount(&server)
        .await;

    let rows = client_for(&server).fetch_logs(None).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].request_id.as_deref(), Some("r-1"));
    assert_eq!(rows[0].cache_hit, Some(true));
    assert!(rows[0].normalized_timestamp().is_parsed());
}

#[tokio::test]
async fn malformed_json_is_invalid_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_metrics(None).await.unwrap_err();

    assert!(matches!(err, RequestError::InvalidBody { .. }));
}

#[tokio::test]
async fn explicit_base_url_beats_configured_one() {
    let configured = MockServer::start().await;
    let explicit = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&configured)
        .await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&explicit)
        .await;

    let rows = client_for(&configured)
        .fetch_metrics(Some(&explicit.uri()))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    // Nothing listens on the discard port.
    let config = ClientConfig::new()
        .with_env_base_url("http://127.0.0.1:9")
        .unwrap();
    let client = ReqwestClient::new(config).unwrap();

    let err = client.fetch_logs(None).await.unwrap_err();

    assert!(err.is_network(), "unexpected error: {err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn extract_against_unreachable_backend_is_network_error() {
    let config = ClientConfig::new()
        .with_env_base_url("http://127.0.0.1:9")
        .unwrap();
    let client = ReqwestClient::new(config).unwrap();

    let err = client
        .extract("Hi Jane", &ExtractOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_network(), "unexpected error: {err:?}");
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn bad_telemetry_row_does_not_fail_the_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "tokens_used": 5, "latency": 120, "timestamp": "2024-01-15T10:30:00Z" },
            { "tokens_used": null, "latency": "80.5", "timestamp": "2024-01-15T10:30:00Z" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "request_id": "r-1", "source_hash": "9f2c", "cache_hit": true,
              "latency": 12, "timestamp": "2024-01-15T10:30:00Z" },
            { "request_id": "r-2", "latency": 7 },
            "not a row"
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let metrics = client.fetch_metrics(None).await.unwrap();
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].tokens_used, Some(5));
    assert_eq!(metrics[1].tokens_used, None);
    assert_eq!(metrics[1].latency, None);
    assert!(metrics[1].normalized_timestamp().is_parsed());

    let logs = client.fetch_logs(None).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].cache_hit, Some(true));
    assert_eq!(logs[1].request_id.as_deref(), Some("r-2"));
    assert_eq!(logs[1].cache_hit, None);
    assert_eq!(logs[2], LogRecord::default());
}

#[tokio::test]
async fn transport_timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .with_env_base_url(server.uri())
        .unwrap()
        .with_transport(TransportSettings {
            request_timeout: Some(Duration::from_millis(50)),
            ..TransportSettings::default()
        });
    let client = ReqwestClient::new(config).unwrap();

    let err = client.fetch_metrics(None).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn invalid_explicit_url_is_rejected_before_sending() {
    let client = ReqwestClient::new(ClientConfig::new()).unwrap();

    let err = client.fetch_metrics(Some("not a url")).await.unwrap_err();

    assert!(matches!(err, RequestError::InvalidUrl { .. }));
}

#[tokio::test]
async fn health_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let health = client_for(&server).health(None).await.unwrap();

    assert!(health.is_ok());
}
