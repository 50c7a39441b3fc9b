#[cfg(test)]
mod test {

    use std::sync::Arc;

    use http::StatusCode;
    use serde_json::{json, Value};

    use crate::config::proc_loader::parse_config;
    use crate::observability::metrics::get_metrics;
    use crate::server::server::{parse_payload, router};
    use crate::record::ValidationError;
    use crate::tests::common::{build_reqwest_client, memory_backend, spawn_axum, MockRunner};

    const CONFIG: &str = r#"
settings:
  server:
    host: 127.0.0.1
    port: "0"
  mount_point: streamnative/
  metrics:
    is_enabled: true
    path: /metrics
"#;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn write_read_exists_delete_over_http() {
        let service_config = parse_config(CONFIG).expect("config");
        let runner = MockRunner::new();
        let (backend, _root) = memory_backend(runner.clone());
        let app = router(&service_config.settings, Arc::new(backend), get_metrics().await);
        let (_handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();
        let url = format!("http://{}/v1/streamnative/team/acct1", addr);

        let head = client.head(&url).send().await.unwrap();
        assert_eq!(head.status(), StatusCode::NOT_FOUND);

        let missing = client.get(&url).send().await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let body: Value = missing.json().await.unwrap();
        assert_eq!(body["errors"][0], "No value at streamnative/team/acct1");

        let created = client
            .put(&url)
            .json(&json!({"key-file": "k", "organization": "org1", "cluster": "c1", "ttl": "60"}))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::NO_CONTENT);
        assert_eq!(client.head(&url).send().await.unwrap().status(), StatusCode::OK);

        for _ in 0..2 {
            let read = client.get(&url).send().await.unwrap();
            assert_eq!(read.status(), StatusCode::OK);
            let body: Value = read.json().await.unwrap();
            assert_eq!(body, json!({"token": "token-1"}));
        }
        assert_eq!(runner.issued(), 1);

        let deleted = client.delete(&url).send().await.unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        assert_eq!(client.get(&url).send().await.unwrap().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn user_errors_map_to_bad_request_and_failures_to_500() {
        let service_config = parse_config(CONFIG).expect("config");
        let runner = MockRunner::new();
        runner.fail_with("get-token", 1, "boom");
        let (backend, _root) = memory_backend(runner);
        let app = router(&service_config.settings, Arc::new(backend), get_metrics().await);
        let (_handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();
        let url = format!("http://{}/v1/streamnative/acct", addr);

        let not_object = client.post(&url).body("[1, 2]").send().await.unwrap();
        assert_eq!(not_object.status(), StatusCode::BAD_REQUEST);

        let bad_ttl = client
            .post(&url)
            .json(&json!({"key-file": "k", "organization": "o", "cluster": "c", "ttl": true}))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_ttl.status(), StatusCode::BAD_REQUEST);
        let body: Value = bad_ttl.json().await.unwrap();
        assert_eq!(body["errors"][0], "ttl is not a scalar: bool");

        client
            .post(&url)
            .json(&json!({"key-file": "k", "cluster": "c"}))
            .send()
            .await
            .unwrap();
        let invalid = client.get(&url).send().await.unwrap();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        let body: Value = invalid.json().await.unwrap();
        assert_eq!(body["errors"][0], "No 'organization' set");

        client
            .post(&url)
            .json(&json!({"key-file": "k", "organization": "o", "cluster": "c"}))
            .send()
            .await
            .unwrap();
        let failed = client.get(&url).send().await.unwrap();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // empty body clears
        let cleared = client.put(&url).send().await.unwrap();
        assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
        assert_eq!(client.head(&url).send().await.unwrap().status(), StatusCode::NOT_FOUND);

        let metrics = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
        assert_eq!(metrics.status(), StatusCode::OK);
        let text = metrics.text().await.unwrap();
        assert!(text.contains("snctltokenagent_token_requests_total"), "{}", text);
    }

    #[test]
    fn payload_parsing() {
        assert!(parse_payload(b"").unwrap().is_empty());
        assert!(parse_payload(b"  \n").unwrap().is_empty());
        assert!(parse_payload(b"{}").unwrap().is_empty());
        assert_eq!(parse_payload(b"\"x\""), Err(ValidationError::PayloadNotObject));
        assert!(matches!(parse_payload(b"{"), Err(ValidationError::MalformedPayload(_))));
        assert_eq!(parse_payload(br#"{"cluster":"c"}"#).unwrap()["cluster"], "c");
    }
}
