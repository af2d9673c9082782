//! # End-to-End Sensor Flow
//!
//! Configuration ─► install ─► renew ─► events ─► files on disk, using the
//! real HTTP router and a real filesystem output.

#[cfg(test)]
mod tests {
    use crate::support::{hidden_files, read_published};
    use axum::body::{to_bytes, Body};
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use gateway_runtime::GatewayConfig;
    use serde_json::{json, Value};
    use sg_01_install_auth::{new_key, new_verifier, Key};
    use sg_03_events::ParserRegistry;
    use sg_04_output::{build_router, OutputRouter};
    use sg_05_sensor_api::{router, InstallResponse, SensorApi};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use uuid::Uuid;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Gateway {
        app: Router,
        outputs: OutputRouter,
        key: Key,
        dir: TempDir,
    }

    /// Build the gateway exactly as the server does, from TOML.
    fn gateway() -> Gateway {
        let dir = TempDir::new().unwrap();
        let key = new_key(Uuid::new_v4()).unwrap();
        let verifier = new_verifier(&key).unwrap();
        let secret = sg_02_token::SigningSecret::from_bytes([42; 64]).to_base64();

        let content = format!(
            r#"
[sensor.token]
duration = "1h"
[sensor.token.secrets]
current = "{secret}"

[[outputs]]
type = "filesystem"
directory = "{}"
age = "1h"
size = 1000000

[[sensor.install.verifiers]]
{}
"#,
            dir.path().join("events").display(),
            toml_body(&verifier)
        );

        let config = GatewayConfig::parse(&content).unwrap();
        config.validate().unwrap();

        let outputs = build_router(&config.outputs).unwrap();
        let api = SensorApi::new(
            config.token_processor().unwrap(),
            config.sensor.install.verifiers.clone(),
            Arc::new(ParserRegistry::with_defaults()),
            outputs.clone(),
        );

        Gateway {
            app: router(Arc::new(api), config.sensor.api.max_body_bytes),
            outputs,
            key,
            dir,
        }
    }

    fn toml_body(verifier: &sg_01_install_auth::Verifier) -> String {
        let value = serde_json::to_value(verifier).unwrap();
        ["group", "salt", "hash", "checksum"]
            .iter()
            .map(|field| format!("{field} = {}", value[field]))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn request(path: &str, token: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn install(gateway: &Gateway, token: Option<&str>, label: &str) -> InstallResponse {
        let body = json!({ "key": gateway.key, "label": label }).to_string();
        let response = gateway
            .app
            .clone()
            .oneshot(request("/install", token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_events(gateway: &Gateway, token: &str, batch: Value) -> StatusCode {
        gateway
            .app
            .clone()
            .oneshot(request("/events", Some(token), batch.to_string()))
            .await
            .unwrap()
            .status()
    }

    fn location(time: i64) -> Value {
        json!({
            "type": "WindowLocation",
            "time": time,
            "protocol": "https",
            "hostname": "weaklayer.com",
            "port": 443,
            "path": "",
            "search": "",
            "hash": "",
            "windowReference": 1
        })
    }

    // =============================================================================
    // END-TO-END FLOWS
    // =============================================================================

    /// Install, renew, submit one WindowLocation and find everything on disk.
    #[tokio::test]
    async fn test_install_renew_and_events_reach_disk() {
        let gateway = gateway();
        let group = gateway.key.group;

        let first = install(&gateway, None, "first").await;
        let renewed = install(&gateway, Some(&first.token), "renewed").await;
        assert_eq!(first.sensor, renewed.sensor);

        let status = post_events(&gateway, &renewed.token, json!([location(45678)])).await;
        assert_eq!(status, StatusCode::OK);

        assert!(gateway.outputs.shutdown(Duration::from_secs(5)).await);

        let group_dir = gateway.dir.path().join("events").join(group.to_string());
        assert!(hidden_files(&group_dir).is_empty());

        let events: Vec<Value> = read_published(&group_dir).into_iter().flatten().collect();
        assert_eq!(events.len(), 3);

        assert_eq!(events[0]["type"], "Install");
        assert_eq!(events[0]["label"], "first");
        assert_eq!(events[1]["type"], "Install");
        assert_eq!(events[1]["label"], "renewed");

        let location = &events[2];
        assert_eq!(location["type"], "WindowLocation");
        assert_eq!(location["time"], 45678);
        assert_eq!(location["sensor"], first.sensor.to_string());
        assert_eq!(location["group"], group.to_string());
        assert_eq!(location["hostname"], "weaklayer.com");
        assert_eq!(location["windowReference"], 1);
    }

    /// Sensors cannot claim another identity through the event body.
    #[tokio::test]
    async fn test_identity_comes_from_token() {
        let gateway = gateway();
        let installed = install(&gateway, None, "lab").await;

        let mut spoofed = location(1);
        spoofed["sensor"] = json!(Uuid::new_v4());
        spoofed["group"] = json!(Uuid::new_v4());

        let status = post_events(&gateway, &installed.token, json!([spoofed])).await;
        assert_eq!(status, StatusCode::OK);
        assert!(gateway.outputs.shutdown(Duration::from_secs(5)).await);

        let group_dir = gateway.dir.path().join("events").join(gateway.key.group.to_string());
        let events: Vec<Value> = read_published(&group_dir).into_iter().flatten().collect();

        let location = events
            .iter()
            .find(|event| event["type"] == "WindowLocation")
            .unwrap();
        assert_eq!(location["sensor"], installed.sensor.to_string());
        assert_eq!(location["group"], gateway.key.group.to_string());
    }

    /// Bad elements are skipped. Good ones around them still land.
    #[tokio::test]
    async fn test_partial_batch() {
        let gateway = gateway();
        let installed = install(&gateway, None, "lab").await;

        let batch = json!([
            location(1),
            { "type": "WindowLocation", "time": 2 },
            { "type": "no-digits-1", "time": 3 },
            { "type": "Custom", "time": 4, "extra": true },
            location(5)
        ]);
        assert_eq!(post_events(&gateway, &installed.token, batch).await, StatusCode::OK);
        assert!(gateway.outputs.shutdown(Duration::from_secs(5)).await);

        let group_dir = gateway.dir.path().join("events").join(gateway.key.group.to_string());
        let times: Vec<i64> = read_published(&group_dir)
            .into_iter()
            .flatten()
            .filter(|event| event["type"] != "Install")
            .map(|event| event["time"].as_i64().unwrap())
            .collect();

        assert_eq!(times, vec![1, 4, 5]);
    }

    /// Requests after shutdown fail with 500 rather than vanishing.
    #[tokio::test]
    async fn test_events_after_shutdown_fail() {
        let gateway = gateway();
        let installed = install(&gateway, None, "lab").await;
        gateway.outputs.shutdown(Duration::from_secs(5)).await;

        let status = post_events(&gateway, &installed.token, json!([location(1)])).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
