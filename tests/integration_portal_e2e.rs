//! End-to-end exercises against a running server.
//!
//! Requires the service on 127.0.0.1:3000 with PostgreSQL (schema.sql
//! applied) and Redis behind it, which is why every test is `#[ignore]`d;
//! run them with `cargo test -- --ignored` once the stack is up. Admin
//! flows additionally need an account promoted via
//! `UPDATE users SET role = 'admin' ...`.

use std::time::{SystemTime, UNIX_EPOCH};
use serde_json::{json, Value};

// Shared test context
struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap(),
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    /// Registers a fresh user and returns (email, csrf token).
    async fn register_user(&self) -> (String, String) {
        let email = format!("driver_{}@garage.test", Self::get_timestamp());

        let response = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&json!({
                "email": email,
                "password": "SecurePass123!@#",
                "first_name": "Test",
                "last_name": "Driver"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 201, "Registration failed");

        let csrf_token = response
            .cookies()
            .find(|c| c.name() == "csrf_token")
            .expect("CSRF token not set at registration")
            .value()
            .to_string();

        (email, csrf_token)
    }

    /// Picks the first service type from the catalog.
    async fn first_service_type(&self, csrf_token: &str) -> String {
        let response = self
            .client
            .get(format!("{}/api/service-types", self.base_url))
            .header("X-CSRF-Token", csrf_token)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        body[0]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
#[ignore = "requires a running server, PostgreSQL, and Redis"]
async fn register_login_and_me_roundtrip() {
    let context = TestContext::new();
    let (email, _csrf) = context.register_user().await;

    let login_response = context
        .client
        .post(format!("{}/api/auth/login", context.base_url))
        .json(&json!({
            "email": email,
            "password": "SecurePass123!@#"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(login_response.status().as_u16(), 200, "Login failed");

    let me_response = context
        .client
        .get(format!("{}/api/auth/me", context.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(me_response.status().as_u16(), 200);
    let me: Value = me_response.json().await.unwrap();
    assert_eq!(me["email"], email.as_str());
    assert_eq!(me["role"], "user");
    assert!(me.get("password_hash").is_none(), "hash must never leak");
}

#[tokio::test]
#[ignore = "requires a running server, PostgreSQL, and Redis"]
async fn wrong_password_is_rejected() {
    let context = TestContext::new();
    let (email, _csrf) = context.register_user().await;

    let response = context
        .client
        .post(format!("{}/api/auth/login", context.base_url))
        .json(&json!({
            "email": email,
            "password": "not-the-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "requires a running server, PostgreSQL, and Redis"]
async fn logout_invalidates_the_session() {
    let context = TestContext::new();
    let (_email, csrf_token) = context.register_user().await;

    let logout_response = context
        .client
        .post(format!("{}/api/auth/logout", context.base_url))
        .header("X-CSRF-Token", &csrf_token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout_response.status().as_u16(), 200);

    let me_response = context
        .client
        .get(format!("{}/api/auth/me", context.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(me_response.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "requires a running server, PostgreSQL, and Redis"]
async fn submit_then_list_then_stats() {
    let context = TestContext::new();
    let (_email, csrf_token) = context.register_user().await;
    let service_type_id = context.first_service_type(&csrf_token).await;

    let submit_response = context
        .client
        .post(format!("{}/api/requests", context.base_url))
        .header("X-CSRF-Token", &csrf_token)
        .json(&json!({
            "service_type_id": service_type_id,
            "title": "Grinding noise from front left",
            "description": "Started after a long downhill drive last weekend.",
            "priority": "standard"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(submit_response.status().as_u16(), 201);
    let request: Value = submit_response.json().await.unwrap();
    assert_eq!(request["status"], "pending");
    assert!(request["request_code"]
        .as_str()
        .unwrap()
        .starts_with("REQ-"));

    let list_response = context
        .client
        .get(format!("{}/api/requests", context.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(list_response.status().as_u16(), 200);
    let listed: Value = list_response.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let stats_response = context
        .client
        .get(format!("{}/api/requests/stats", context.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(stats_response.status().as_u16(), 200);
    let stats: Value = stats_response.json().await.unwrap();
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["total"], 1);
}

#[tokio::test]
#[ignore = "requires a running server, PostgreSQL, and Redis"]
async fn non_admin_cannot_transition_a_request() {
    let context = TestContext::new();
    let (_email, csrf_token) = context.register_user().await;
    let service_type_id = context.first_service_type(&csrf_token).await;

    let submit_response = context
        .client
        .post(format!("{}/api/requests", context.base_url))
        .header("X-CSRF-Token", &csrf_token)
        .json(&json!({
            "service_type_id": service_type_id,
            "title": "Oil change",
            "description": "Regular maintenance.",
            "priority": "standard"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(submit_response.status().as_u16(), 201);
    let request: Value = submit_response.json().await.unwrap();
    let request_id = request["id"].as_str().unwrap();

    // With ALLOW_SELF_CANCEL unset, even the owner may not transition.
    let transition_response = context
        .client
        .post(format!(
            "{}/api/requests/{}/transition",
            context.base_url, request_id
        ))
        .header("X-CSRF-Token", &csrf_token)
        .json(&json!({ "target_status": "approved" }))
        .send()
        .await
        .unwrap();

    assert_eq!(transition_response.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "requires a running server, PostgreSQL, and Redis"]
async fn mutations_without_a_csrf_header_are_rejected() {
    let context = TestContext::new();
    let (_email, _csrf) = context.register_user().await;
    let service_type_id = {
        // catalog read is exempt from CSRF
        let response = context
            .client
            .get(format!("{}/api/service-types", context.base_url))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        body[0]["id"].as_str().unwrap().to_string()
    };

    let response = context
        .client
        .post(format!("{}/api/requests", context.base_url))
        .json(&json!({
            "service_type_id": service_type_id,
            "title": "No CSRF",
            "description": "Should bounce.",
            "priority": "standard"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}
