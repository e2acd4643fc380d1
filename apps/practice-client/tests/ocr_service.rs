//! OCR client and writing drill against an in-process fake OCR service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lingo_core::ink::{Dimensions, ElementRect, PointerEvent, PointerPhase, StaticHost};
use lingo_core::{ConversionOutcome, InkSurface, SizeClass, SurfaceOptions};
use lingo_practice_client::config::{ClientConfig, EndpointConfig};
use lingo_practice_client::controller::{DrawingCheck, WritingDrill};
use lingo_practice_client::ocr::{OcrClient, OcrError};
use serde_json::{json, Value};

#[derive(Clone)]
struct FakeOcr {
    reply: Option<&'static str>,
    requests: Arc<AtomicUsize>,
}

async fn convert(State(fake): State<FakeOcr>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    fake.requests.fetch_add(1, Ordering::SeqCst);

    let Some(image) = body.get("image").and_then(Value::as_str) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No image provided" })));
    };
    let Ok(bytes) = STANDARD.decode(image) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad base64" })));
    };
    if !bytes.starts_with(b"\x89PNG") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "not a png" })));
    }

    match fake.reply {
        Some(text) => (StatusCode::OK, Json(json!({ "text": text }))),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "model unavailable" })),
        ),
    }
}

/// Serve the fake on an ephemeral port and return its base URL.
async fn spawn_fake(reply: Option<&'static str>) -> (String, Arc<AtomicUsize>) {
    let requests = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/ocr/convert", post(convert))
        .with_state(FakeOcr {
            reply,
            requests: Arc::clone(&requests),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), requests)
}

fn client_for(base: &str) -> OcrClient {
    let config = ClientConfig {
        endpoints: EndpointConfig {
            ocr: base.to_string(),
            ..EndpointConfig::default()
        },
        http_timeout_secs: 5,
    };
    OcrClient::new(&config).unwrap()
}

fn drawn_surface(client: OcrClient) -> InkSurface {
    let options = SurfaceOptions {
        size_class: SizeClass::Small,
        stroke_width: 4,
        allow_resize: true,
    };
    let mut surface = InkSurface::new(options, StaticHost::new(2.0, None))
        .unwrap()
        .with_converter(client);
    let rect = ElementRect::at(10.0, 10.0, Dimensions::new(300, 200));
    surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Down, 40.0, 40.0), &rect);
    surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Move, 120.0, 160.0), &rect);
    surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Move, 200.0, 40.0), &rect);
    surface.handle_pointer(&PointerEvent::mouse(PointerPhase::Up, 200.0, 40.0), &rect);
    surface
}

#[tokio::test]
async fn client_returns_recognized_text() {
    let (base, requests) = spawn_fake(Some("hello")).await;
    let client = client_for(&base);

    let png = {
        let surface = drawn_surface(client.clone());
        surface.export().unwrap()
    };
    assert_eq!(client.convert(&png).await.unwrap(), "hello");
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backend_failure_is_reported() {
    let (base, _) = spawn_fake(None).await;
    let client = client_for(&base);

    let err = client.convert(&drawn_surface(client.clone()).export().unwrap()).await.unwrap_err();
    match err {
        OcrError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("model unavailable"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn surface_conversion_through_service() {
    let (base, requests) = spawn_fake(Some("A")).await;
    let surface = drawn_surface(client_for(&base));

    assert_eq!(
        surface.request_conversion().await,
        ConversionOutcome::Converted("A".to_string())
    );
    assert!(!surface.is_converting());
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn surface_reports_service_failure() {
    let (base, _) = spawn_fake(None).await;
    let surface = drawn_surface(client_for(&base));

    match surface.request_conversion().await {
        ConversionOutcome::Failed(reason) => assert!(reason.contains("500")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!surface.is_converting());
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let err = client.convert("aGVsbG8=").await.unwrap_err();
    assert!(matches!(err, OcrError::Network(_)));
}

#[tokio::test]
async fn writing_drill_grades_service_text() {
    let (base, _) = spawn_fake(Some("Kat\n")).await;
    let mut drill = WritingDrill::new(drawn_surface(client_for(&base)), 2);

    match drill.check("cat").await {
        DrawingCheck::Graded { recognized, result } => {
            assert_eq!(recognized, "Kat");
            assert!(result.is_correct);
            assert_eq!(result.distance, 1);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(drill.session().correct, 1);
}
