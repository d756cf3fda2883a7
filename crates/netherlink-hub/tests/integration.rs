//! End-to-end tests for the hub HTTP API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use netherlink_hub::auth::JwtManager;
use netherlink_hub::server::{AppState, build_router};
use netherlink_hub::storage::HubDatabase;

const TEST_SECRET: &[u8] = b"integration-test-secret";

struct TestApp {
    router: axum::Router,
    jwt: Arc<JwtManager>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_policy(600, 10).await
    }

    async fn with_policy(claim_ttl_secs: i64, max_active_claims: u32) -> Self {
        let db = HubDatabase::open_in_memory().await.unwrap();
        let jwt = Arc::new(JwtManager::new(TEST_SECRET, 3600));
        let router = build_router(AppState {
            db,
            jwt: Arc::clone(&jwt),
            claim_ttl_secs,
            max_active_claims,
        });
        Self { router, jwt }
    }

    fn token_for(&self, user_id: &str, username: &str) -> String {
        let (token, _) = self.jwt.issue_access_token(user_id, username).unwrap();
        token
    }

    /// Send a request and return (status, parsed JSON body or Null).
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn healthz_is_public() {
    let app = TestApp::new().await;
    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/healthz", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn issuance_requires_auth() {
    let app = TestApp::new().await;

    let (status, body) = app.send(request("POST", "/v1/claims", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app
        .send(request("POST", "/v1/claims", Some("not-a-token"), None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issue_redeem_roundtrip() {
    let app = TestApp::new().await;
    let token = app.token_for("u1", "alice");

    // Operator mints a claim.
    let (status, body) = app
        .send(request("POST", "/v1/claims", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);
    assert!(body["expires_at"].as_i64().unwrap() > 0);

    // The claim shows as pending while the agent has not called in.
    let (status, body) = app
        .send(request(
            "GET",
            &format!("/v1/claims/{code}"),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    // Host agent redeems without a session.
    let (status, body) = app
        .send(request(
            "POST",
            "/v1/hosts/redeem",
            None,
            Some(json!({ "code": code, "name": "host-1", "description": "rack 3" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "host-1");
    assert_eq!(body["owner_id"], "u1");
    assert_eq!(body["verified"], 1);
    let host_id = body["id"].as_str().unwrap().to_string();

    // The operator's status view flips to linked.
    let (_, body) = app
        .send(request(
            "GET",
            &format!("/v1/claims/{code}"),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(body["status"], "linked");
    assert_eq!(body["host_id"], host_id.as_str());

    // A second redemption of the same code is rejected distinctly.
    let (status, body) = app
        .send(request(
            "POST",
            "/v1/hosts/redeem",
            None,
            Some(json!({ "code": code, "name": "host-2" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_redeemed");

    // Exactly one host exists and it belongs to the issuer.
    let (status, body) = app
        .send(request("GET", "/v1/hosts", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    let hosts = body.as_array().unwrap();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0]["id"], host_id.as_str());
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let app = TestApp::new().await;
    let token = app.token_for("u1", "alice");

    let (status, body) = app
        .send(request(
            "POST",
            "/v1/hosts/redeem",
            None,
            Some(json!({ "code": "DOESNOTEXIST", "name": "host-1" })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (_, body) = app
        .send(request("GET", "/v1/hosts", Some(&token), None))
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn expired_claim_is_rejected() {
    // TTL of -1 makes every claim already expired at issue time.
    let app = TestApp::with_policy(-1, 10).await;
    let token = app.token_for("u1", "alice");

    let (status, body) = app
        .send(request("POST", "/v1/claims", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["code"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(request(
            "POST",
            "/v1/hosts/redeem",
            None,
            Some(json!({ "code": code, "name": "host-1" })),
        ))
        .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "expired");

    let (_, body) = app
        .send(request(
            "GET",
            &format!("/v1/claims/{code}"),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(body["status"], "expired");
}

#[tokio::test]
async fn revoked_claim_redeems_as_expired() {
    let app = TestApp::new().await;
    let token = app.token_for("u1", "alice");

    let (_, body) = app
        .send(request("POST", "/v1/claims", Some(&token), None))
        .await;
    let code = body["code"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(request(
            "DELETE",
            &format!("/v1/claims/{code}"),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send(request(
            "POST",
            "/v1/hosts/redeem",
            None,
            Some(json!({ "code": code, "name": "host-1" })),
        ))
        .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "expired");

    // Nothing left to revoke.
    let (status, _) = app
        .send(request(
            "DELETE",
            &format!("/v1/claims/{code}"),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn active_claim_cap_applies_per_user() {
    let app = TestApp::with_policy(600, 1).await;
    let alice = app.token_for("u1", "alice");
    let bob = app.token_for("u2", "bob");

    let (status, _) = app
        .send(request("POST", "/v1/claims", Some(&alice), None))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(request("POST", "/v1/claims", Some(&alice), None))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "too_many_active_claims");
    assert_eq!(body["limit"], 1);

    // The cap is per user, not global.
    let (status, _) = app
        .send(request("POST", "/v1/claims", Some(&bob), None))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn claim_status_is_scoped_to_issuer() {
    let app = TestApp::new().await;
    let alice = app.token_for("u1", "alice");
    let bob = app.token_for("u2", "bob");

    let (_, body) = app
        .send(request("POST", "/v1/claims", Some(&alice), None))
        .await;
    let code = body["code"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(request(
            "GET",
            &format!("/v1/claims/{code}"),
            Some(&bob),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn heartbeat_marks_host_alive() {
    let app = TestApp::new().await;
    let token = app.token_for("u1", "alice");

    let (_, body) = app
        .send(request("POST", "/v1/claims", Some(&token), None))
        .await;
    let code = body["code"].as_str().unwrap().to_string();

    let (_, body) = app
        .send(request(
            "POST",
            "/v1/hosts/redeem",
            None,
            Some(json!({ "code": code, "name": "host-1" })),
        ))
        .await;
    let host_id = body["id"].as_str().unwrap().to_string();
    assert!(body["last_heartbeat"].is_null());

    let (status, _) = app
        .send(request(
            "POST",
            &format!("/v1/hosts/{host_id}/heartbeat"),
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .send(request("GET", "/v1/hosts", Some(&token), None))
        .await;
    assert!(body[0]["last_heartbeat"].as_i64().is_some());

    let (status, _) = app
        .send(request(
            "POST",
            "/v1/hosts/missing-host/heartbeat",
            None,
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn claim_list_covers_lifecycle() {
    let app = TestApp::new().await;
    let token = app.token_for("u1", "alice");

    let (_, body) = app
        .send(request("POST", "/v1/claims", Some(&token), None))
        .await;
    let redeemed = body["code"].as_str().unwrap().to_string();
    app.send(request("POST", "/v1/claims", Some(&token), None))
        .await;

    app.send(request(
        "POST",
        "/v1/hosts/redeem",
        None,
        Some(json!({ "code": redeemed, "name": "host-1" })),
    ))
    .await;

    let (status, body) = app
        .send(request("GET", "/v1/claims", Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    let claims = body.as_array().unwrap();
    assert_eq!(claims.len(), 2);

    let statuses: Vec<&str> = claims
        .iter()
        .map(|c| c["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"linked"));
    assert!(statuses.contains(&"pending"));
}
