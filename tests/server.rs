use axum::{
    body::{
        to_bytes,
        Body
    },
    http::{
        header,
        Request,
        StatusCode
    },
    Router
};
use serde_json::Value;
use tower::ServiceExt;

use fouriercoef::configuration::Configuration;
use fouriercoef::server::server::Server;

fn router_with(configuration: &Configuration) -> Router {
    Server::new(configuration).unwrap().router()
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn terms(body: &Value, key: &str) -> Vec<f64> {
    body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn default_request_returns_twenty_harmonics() {
    let (status, body) = get_json(router_with(&Configuration::default()), "/fourier_coefficients").await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["a0"].as_f64().unwrap() - 0.25).abs() < 1e-9);
    assert_eq!(terms(&body, "A").len(), 20);
    let b = terms(&body, "B");
    assert_eq!(b.len(), 20);
    assert!(b.iter().all(|b_i| b_i.abs() < 1e-6));
}

#[tokio::test]
async fn explicit_harmonic_count() {
    let router = router_with(&Configuration::default());

    let (status, body) = get_json(router.clone(), "/fourier_coefficients?n=1").await;
    assert_eq!(status, StatusCode::OK);
    let a = terms(&body, "A");
    assert_eq!(a.len(), 1);
    assert!((a[0] - 0.242_268_457_674_873_9).abs() < 1e-7);

    let (status, body) = get_json(router, "/fourier_coefficients?n=0").await;
    assert_eq!(status, StatusCode::OK);
    assert!(terms(&body, "A").is_empty());
    assert!(terms(&body, "B").is_empty());
    assert!(body["a0"].is_number());
}

#[tokio::test]
async fn malformed_harmonic_counts_are_rejected() {
    let router = router_with(&Configuration::default());
    for uri in [
        "/fourier_coefficients?n=-1",
        "/fourier_coefficients?n=abc",
        "/fourier_coefficients?n=2.5",
        "/fourier_coefficients?n=1001",
    ] {
        let (status, body) = get_json(router.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].as_str().unwrap().contains("harmonic count"), "{}", uri);
    }
}

#[tokio::test]
async fn unextractable_query_is_rejected_as_json() {
    let (status, body) = get_json(router_with(&Configuration::default()), "/fourier_coefficients?n=1&n=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid query"));
}

#[tokio::test]
async fn sampled_target_from_configuration_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/json/sampled.json");
    let configuration = Configuration::from_file(path).unwrap();
    let (status, body) = get_json(router_with(&configuration), "/fourier_coefficients?n=3").await;
    assert_eq!(status, StatusCode::OK);
    // 取樣半圓，誤差來自邊界附近的插值
    assert!((body["a0"].as_f64().unwrap() - 0.25).abs() < 2e-3);
    assert_eq!(terms(&body, "B").len(), 3);
}

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let response = router_with(&Configuration::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn any_origin_is_allowed_by_default() {
    let response = router_with(&Configuration::default())
        .oneshot(
            Request::builder()
                .uri("/fourier_coefficients?n=2")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap()
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn configured_origins_restrict_cors() {
    let json = r#"{ "server": { "allowed_origins": ["https://*.example.com"] } }"#;
    let configuration = Configuration::from_reader(json.as_bytes()).unwrap();
    let router = router_with(&configuration);

    let request = |origin: &str| {
        Request::builder()
            .uri("/fourier_coefficients?n=1")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let allowed = router.clone().oneshot(request("https://app.example.com")).await.unwrap();
    assert_eq!(allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example.com");

    let denied = router.oneshot(request("https://example.org")).await.unwrap();
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
