use std::{path::Path, sync::Arc};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use snapfinder::{
    cdx::{CdxClient, CdxOptions},
    server::{router, AppState},
};
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path as upstream_path},
    Mock, MockServer, ResponseTemplate,
};

macro_rules! aw {
    ($e:expr) => {
        tokio_test::block_on($e)
    };
}

fn app_for(upstream: &str, public_dir: &Path) -> Router {
    let cdx = CdxClient::new(
        CdxOptions::default_builder()
            .url(format!("{}/cdx/search/cdx", upstream))
            .build()
            .unwrap(),
    );
    router(Arc::new(AppState { cdx }), public_dir)
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn missing_url_parameter_is_bad_request() {
    aw!(async {
        let public = tempfile::tempdir().unwrap();
        let app = app_for("http://127.0.0.1:1", public.path());

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/snapshots")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "missing or empty target url");
    });
}

#[test]
fn success_passes_raw_rows_through_with_cors() {
    aw!(async {
        let server = MockServer::start().await;
        let payload = json!([
            ["timestamp", "original", "statuscode", "mimetype"],
            ["20200101000000", "http://example.com", "200", "text/html"],
        ]);
        Mock::given(method("GET"))
            .and(upstream_path("/cdx/search/cdx"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .mount(&server)
            .await;

        let public = tempfile::tempdir().unwrap();
        let app = app_for(&server.uri(), public.path());

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/snapshots?url=example.com")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(body_json(res).await, payload);
    });
}

#[test]
fn upstream_failure_surfaces_as_server_error() {
    aw!(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(upstream_path("/cdx/search/cdx"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let public = tempfile::tempdir().unwrap();
        let app = app_for(&server.uri(), public.path());

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/api/snapshots?url=example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["error"], "no snapshots found for this url");
    });
}

#[test]
fn serves_static_files_from_public_dir() {
    aw!(async {
        let public = tempfile::tempdir().unwrap();
        std::fs::write(
            public.path().join("index.html"),
            "<h1>snapshot finder</h1>",
        )
        .unwrap();

        let app = app_for("http://127.0.0.1:1", public.path());

        let res = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(std::str::from_utf8(&bytes).unwrap().contains("snapshot finder"));

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/missing.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    });
}
