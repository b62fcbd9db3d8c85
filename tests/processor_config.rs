//! End-to-end tests over the sample processor configuration.

use telemetry_processors::config::{ActionType, MatchType};
use telemetry_processors::{
    ConfigError, Disposition, Pipeline, PipelineConfig, PipelineHandle, ProcessorType, Record,
};

const SAMPLE: &str = include_str!("fixtures/processors.json");

fn sample_pipeline() -> Pipeline {
    Pipeline::from_json_str(SAMPLE).unwrap()
}

#[test]
fn test_sample_config_parses() {
    let config = PipelineConfig::from_json_str(SAMPLE).unwrap();
    assert_eq!(config.processors.len(), 11);

    let insert = &config.processors[0];
    assert_eq!(insert.id, "attributes/insert");
    assert_eq!(insert.processor_type, ProcessorType::Attribute);
    let actions = insert.actions.as_ref().unwrap();
    assert_eq!(actions[0].action, ActionType::Insert);
    assert_eq!(actions[0].key, "attribute1");
    assert_eq!(actions[0].value.as_deref(), Some("123"));
    assert_eq!(actions[1].from_attribute.as_deref(), Some("anotherKey"));

    let selective = &config.processors[2];
    let include = selective.include.as_ref().unwrap();
    assert_eq!(include.match_type, MatchType::Strict);
    assert_eq!(include.span_names, vec!["svcA", "svcB"]);
    let exclude = selective.exclude.as_ref().unwrap();
    assert_eq!(exclude.attributes[0].key, "redact_trace");
    assert_eq!(exclude.attributes[0].value.as_deref(), Some("false"));

    let log_body = config.processors[3].body.as_ref().unwrap();
    assert_eq!(log_body.from_attributes.as_deref(), Some(&["loggerName".to_string()][..]));
    assert_eq!(log_body.separator.as_deref(), Some("::"));

    let span_name = config.processors[7].name.as_ref().unwrap();
    let span_rules = &span_name.to_attributes.as_ref().unwrap().rules;
    assert_eq!(span_rules, &vec!["^/api/v1/document/(?<documentId>.*)/update$".to_string()]);

    let filter = &config.processors[9];
    assert_eq!(filter.processor_type, ProcessorType::MetricFilter);
    assert_eq!(
        filter.exclude.as_ref().unwrap().metric_names,
        vec!["a_test_metric", "another_test_metric"]
    );

    let mask = &config.processors[10].actions.as_ref().unwrap()[0];
    assert_eq!(mask.action, ActionType::Mask);
    assert_eq!(mask.replace.as_deref(), Some("${uriNoCard}****${cardEnd}"));
}

#[test]
fn test_sample_pipeline_builds_in_order() {
    let pipeline = sample_pipeline();
    assert_eq!(pipeline.len(), 11);
    assert_eq!(
        pipeline.processor_ids(),
        vec![
            "attributes/insert",
            "attributes/update",
            "attributes/selectiveProcessing",
            "log/updateLogBodyWithLoggerName",
            "log/extractAttributes",
            "log/updateLogBodyWithRegex",
            "span/updateName",
            "span/extractAttributes",
            "attributes/extract",
            "metric-filter/exclude-two-metrics",
            "attributes/mask",
        ]
    );
    assert!(pipeline.pipeline_id().starts_with("pipeline-"));
}

#[test]
fn test_selective_processing_redacts_only_when_requested() {
    let pipeline = sample_pipeline();

    let redacted = pipeline
        .process_owned(
            Record::span("svcA")
                .with_attribute("credit_card", "4111111111111111")
                .with_attribute("redact_trace", "true"),
        )
        .unwrap();
    assert_eq!(redacted.attribute("attribute1"), Some("123"));
    assert!(redacted.attribute("credit_card").is_none());

    let kept = pipeline
        .process_owned(
            Record::span("svcA")
                .with_attribute("credit_card", "4111111111111111")
                .with_attribute("redact_trace", "false"),
        )
        .unwrap();
    assert_eq!(kept.attribute("attribute1"), Some("123"));
    assert_eq!(kept.attribute("credit_card"), Some("4111111111111111"));

    let other_service = pipeline
        .process_owned(Record::span("svcC").with_attribute("credit_card", "4111111111111111"))
        .unwrap();
    assert_eq!(other_service.attribute("credit_card"), Some("4111111111111111"));
}

#[test]
fn test_selective_processing_leaves_logs_alone() {
    let pipeline = sample_pipeline();

    let log = pipeline
        .process_owned(
            Record::log("unrelated log line")
                .with_attribute("loggerName", "svcA")
                .with_attribute("credit_card", "4111")
                .with_attribute("redact_trace", "true"),
        )
        .unwrap();
    assert_eq!(log.attribute("credit_card"), Some("4111"));
    assert_eq!(log.attribute("attribute1"), Some("123"));
    assert_eq!(log.body.as_deref(), Some("svcA"));
}

#[test]
fn test_exclude_span_names_does_not_exclude_logs() {
    let pipeline = Pipeline::from_json_str(
        r#"{"processors": [{"id": "attributes/notHealth", "type": "attribute",
            "exclude": {"matchType": "strict", "spanNames": ["health"]},
            "actions": [{"action": "hash", "key": "user"}]}]}"#,
    )
    .unwrap();

    let span = pipeline.process_owned(Record::span("health").with_attribute("user", "u1")).unwrap();
    assert_eq!(span.attribute("user"), Some("u1"));

    let log = pipeline.process_owned(Record::log("health").with_attribute("user", "u1")).unwrap();
    assert_ne!(log.attribute("user"), Some("u1"));
    assert_eq!(log.attribute("user").map(str::len), Some(64));
}

#[test]
fn test_insert_and_update_from_attributes() {
    let pipeline = sample_pipeline();

    let without_source = pipeline.process_owned(Record::span("svcC")).unwrap();
    assert!(without_source.attribute("attribute2").is_none());

    let record = pipeline
        .process_owned(
            Record::span("svcC")
                .with_attribute("attribute1", "original")
                .with_attribute("anotherKey", "copied")
                .with_attribute("foo", "bar")
                .with_attribute("boo", "old")
                .with_attribute("db.secret", "hunter2"),
        )
        .unwrap();
    assert_eq!(record.attribute("attribute1"), Some("original"));
    assert_eq!(record.attribute("attribute2"), Some("copied"));
    assert_eq!(record.attribute("boo"), Some("bar"));
    assert_eq!(record.attribute("db.secret"), Some("redacted"));

    // update never creates
    assert!(without_source.attribute("boo").is_none());
    assert!(without_source.attribute("db.secret").is_none());
}

#[test]
fn test_metric_filter_drops_excluded_names() {
    let pipeline = sample_pipeline();

    let mut excluded = Record::metric("a_test_metric");
    assert_eq!(pipeline.process(&mut excluded), Disposition::Dropped { processor: 9 });
    assert!(pipeline.process_owned(Record::metric("another_test_metric")).is_none());

    let kept = pipeline.process_owned(Record::metric("requests_total")).unwrap();
    assert!(kept.attribute("attribute1").is_none());
}

#[test]
fn test_log_body_rewrites() {
    let pipeline = sample_pipeline();

    let no_logger = pipeline.process_owned(Record::log("hello")).unwrap();
    assert_eq!(no_logger.body.as_deref(), Some(""));
    assert_eq!(no_logger.attribute("attribute1"), Some("123"));

    let named = pipeline
        .process_owned(Record::log("hello").with_attribute("loggerName", "com.example.Orders"))
        .unwrap();
    assert_eq!(named.body.as_deref(), Some("com.example.Orders"));

    let document = pipeline
        .process_owned(Record::log("x").with_attribute("loggerName", "/api/v1/document/42/update"))
        .unwrap();
    assert_eq!(document.attribute("documentId"), Some("42"));
    assert_eq!(document.body.as_deref(), Some("/api/v1/document/{documentId}/update"));

    let password = pipeline
        .process_owned(
            Record::log("x")
                .with_attribute("loggerName", "password reset")
                .with_attribute("LoggerName", "Auth"),
        )
        .unwrap();
    assert_eq!(password.body.as_deref(), Some("Auth"));
}

#[test]
fn test_span_name_rewrites() {
    let pipeline = sample_pipeline();

    let renamed = pipeline
        .process_owned(Record::span("reset password").with_attribute("spanName", "auth.reset"))
        .unwrap();
    assert_eq!(renamed.name, "auth.reset");

    let untouched = pipeline.process_owned(Record::span("GET /orders")).unwrap();
    assert_eq!(untouched.name, "GET /orders");

    let document = pipeline.process_owned(Record::span("/api/v1/document/77/update")).unwrap();
    assert_eq!(document.attribute("documentId"), Some("77"));
    assert_eq!(document.name, "/api/v1/document/{documentId}/update");
}

#[test]
fn test_extract_and_mask_http_url() {
    let pipeline = sample_pipeline();

    let extracted = pipeline
        .process_owned(
            Record::span("GET").with_attribute("http.url", "https://example.com/api/items?id=5"),
        )
        .unwrap();
    assert_eq!(extracted.attribute("httpProtocol"), Some("https"));
    assert_eq!(extracted.attribute("httpDomain"), Some("example.com"));
    assert_eq!(extracted.attribute("httpPath"), Some("api/items"));
    assert_eq!(extracted.attribute("httpQueryParams"), Some("id=5"));
    assert_eq!(extracted.attribute("http.url"), Some("https://example.com/api/items?id=5"));

    let masked = pipeline
        .process_owned(
            Record::span("GET")
                .with_attribute("http.url", "http://localhost:8080/cardid/1234562222227899"),
        )
        .unwrap();
    assert_eq!(masked.attribute("http.url"), Some("http://localhost:8080/cardid/****7899"));
    assert!(masked.attribute("httpProtocol").is_none());
}

#[test]
fn test_batch_over_mixed_records() {
    let pipeline = sample_pipeline();
    let result = pipeline.process_batch(vec![
        Record::span("svcA").with_attribute("credit_card", "1"),
        Record::metric("a_test_metric"),
        Record::log("started"),
        Record::metric("cpu"),
    ]);

    assert_eq!(result.received_count, 4);
    assert_eq!(result.forwarded_count, 3);
    assert_eq!(result.dropped_count, 1);
    assert_eq!(result.records[0].name, "svcA");
    assert!(result.records[0].attribute("credit_card").is_none());
    assert_eq!(result.records[2].metric_name.as_deref(), Some("cpu"));
}

#[test]
fn test_reload_swaps_whole_pipeline() {
    let handle = PipelineHandle::new(sample_pipeline());
    let before = handle.load();

    let err = handle
        .reload_from_json(r#"{"processors": [{"id": "bad", "type": "metric-filter"}]}"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { .. }));
    assert_eq!(handle.load().pipeline_id(), before.pipeline_id());

    let next = handle
        .reload_from_json(
            r#"{"processors": [{"id": "attributes/tag", "type": "attribute",
                "actions": [{"action": "insert", "key": "reloaded", "value": "yes"}]}]}"#,
        )
        .unwrap();
    assert_eq!(next.len(), 1);

    let record = handle.load().process_owned(Record::span("svcA")).unwrap();
    assert_eq!(record.attribute("reloaded"), Some("yes"));
    assert!(record.attribute("attribute1").is_none());

    let old = before.process_owned(Record::span("svcA")).unwrap();
    assert_eq!(old.attribute("attribute1"), Some("123"));
}

#[test]
fn test_invalid_configs_name_the_processor() {
    let cases = [
        (
            r#"{"processors": [{"id": "p1", "type": "span", "name": {"toAttributes": {"rules": ["(unclosed"]}}}]}"#,
            "p1",
        ),
        (
            r#"{"processors": [{"id": "p2", "type": "attribute", "actions": [{"action": "insert", "key": "k"}]}]}"#,
            "p2",
        ),
        (
            r#"{"processors": [{"id": "p3", "type": "log", "name": {"fromAttributes": ["a"]}}]}"#,
            "p3",
        ),
        (
            r#"{"processors": [{"id": "p4", "type": "attribute", "actions": [{"action": "mask", "key": "k",
                "pattern": "(?<a>\\d+)", "replace": "${b}"}]}]}"#,
            "p4",
        ),
        (
            r#"{"processors": [{"id": "p5", "type": "span",
                "include": {"matchType": "regexp", "spanNames": ["svc)|(x"]},
                "name": {"fromAttributes": ["a"]}}]}"#,
            "p5",
        ),
    ];

    for (json, id) in cases {
        let err = Pipeline::from_json_str(json).unwrap_err();
        assert_eq!(err.processor_id(), Some(id), "{}", err);
    }
}
