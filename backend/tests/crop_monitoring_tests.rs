//! Crop monitoring integration tests
//!
//! Tests for crop monitoring including:
//! - Unary health and pest checks
//! - Duplex NDJSON monitor ordering and error frames

use agri_server::{
    config::Config,
    create_app,
    services::{HealthAdvice, HealthPolicy},
    simulation::{FixedClock, FixedEntropy},
    AppState,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{CropHealthObservation, HealthStatus};
use tower::ServiceExt;

fn state(sample: f64) -> AppState {
    AppState::from_config(Config::default())
        .unwrap()
        .with_entropy(FixedEntropy::new(sample))
        .with_clock(FixedClock::new(9))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// POST an NDJSON body to the monitor and collect the answer lines
async fn monitor(app: Router, body: String) -> (StatusCode, String, Vec<Value>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/crop-monitoring/monitor")
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let frames = String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (status, content_type, frames)
}

fn observations(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| format!("{}\n", json!({ "field_id": field, "readings": { "ndvi": 0.7 } })))
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_crop_health_summary() {
        let (status, body) = get(
            create_app(state(0.5)),
            "/api/v1/crop-monitoring/health?field_id=cork",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health_status"], "Fair");
        assert_eq!(body["summary"], "Health at Cork: Fair");
        assert_eq!(body["recommendation"], "No action needed");
    }

    #[tokio::test]
    async fn test_poor_health_recommends_inspection() {
        let (_, body) = get(
            create_app(state(0.9)),
            "/api/v1/crop-monitoring/health?field_id=Dublin",
        )
        .await;
        assert_eq!(body["health_status"], "Poor");
        assert_eq!(body["recommendation"], "Inspect for pests or diseases");
    }

    #[tokio::test]
    async fn test_pest_detection_threshold() {
        let (_, body) = get(
            create_app(state(0.6)),
            "/api/v1/crop-monitoring/pests?field_id=Wicklow",
        )
        .await;
        assert_eq!(body["pests_detected"], true);
        assert_eq!(body["pest_type"], "Aphids");
        assert_eq!(body["summary"], "Pest at Wicklow: Aphids");
        assert_eq!(body["recommendation"], "Apply organic pesticides");

        let (_, body) = get(
            create_app(state(0.5)),
            "/api/v1/crop-monitoring/pests?field_id=Wicklow",
        )
        .await;
        assert_eq!(body["pests_detected"], false);
    }

    #[tokio::test]
    async fn test_unknown_field_is_not_found() {
        let (status, body) = get(
            create_app(state(0.5)),
            "/api/v1/crop-monitoring/health?field_id=Galway",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "UNKNOWN_LOCATION");
    }

    #[tokio::test]
    async fn test_monitor_answers_each_observation_in_order() {
        let (status, content_type, frames) = monitor(
            create_app(state(0.5)),
            observations(&["Cork", "dublin", "Wicklow", "Cork"]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/x-ndjson");
        assert_eq!(frames.len(), 4);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame["sequence"], (i + 1) as u64);
            assert_eq!(frame["health_status"], "Good");
            assert_eq!(frame["recommendation"], "Maintain current care");
        }
        assert_eq!(frames[1]["field_id"], "Dublin");
    }

    #[tokio::test]
    async fn test_monitor_empty_inbound_closes() {
        let (status, _, frames) = monitor(create_app(state(0.5)), String::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn test_monitor_invalid_observation_ends_with_error_frame() {
        let mut body = observations(&["Cork"]);
        body.push_str("{\"field_id\":\"\"}\n");
        body.push_str(&observations(&["Cork"]));

        let (status, _, frames) = monitor(create_app(state(0.5)), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["sequence"], 1);
        assert_eq!(frames[1]["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_monitor_uses_injected_policy() {
        struct Cautious;

        impl HealthPolicy for Cautious {
            fn respond(&self, observation: &CropHealthObservation) -> HealthAdvice {
                HealthAdvice {
                    health_status: HealthStatus::Poor,
                    recommendation: format!("Walk {}", observation.field_id),
                }
            }
        }

        let app = create_app(state(0.5).with_health_policy(Cautious));
        let (_, _, frames) = monitor(app, observations(&["North Field"])).await;
        assert_eq!(frames[0]["health_status"], "Poor");
        assert_eq!(frames[0]["recommendation"], "Walk North Field");
    }

    #[tokio::test]
    async fn test_crop_dashboard_joins_health_and_pests() {
        let (status, body) = get(
            create_app(state(0.0)),
            "/api/v1/dashboard/crop-health?location=Cork",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["crop_health"]["health_status"], "Good");
        assert_eq!(body["pest_detection"]["pests_detected"], false);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// K observations in, K answers out, numbered 1..=K
        #[test]
        fn prop_monitor_one_out_per_in(count in 0usize..25) {
            let fields = vec!["Cork"; count];
            let (status, _, frames) =
                tokio_test::block_on(monitor(create_app(state(0.5)), observations(&fields)));

            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(frames.len(), count);
            for (i, frame) in frames.iter().enumerate() {
                prop_assert_eq!(frame["sequence"].as_u64(), Some(i as u64 + 1));
            }
        }
    }
}
