use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    web::{Bytes, ServiceConfig},
    App,
};
use chrono::{TimeZone, Utc};
use fest_common::Rupees;
use fest_engine::db_types::{ParticipationType, Registration};
use log::debug;

use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    routes::{json_error, query_error},
};

pub const TEST_ADMIN_PASSWORD: &str = "organiser-pass";
// DO NOT re-use this key anywhere.
pub const TEST_JWT_SECRET: &str = "endpoint-test-jwt-secret";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_ADMIN_PASSWORD, TEST_JWT_SECRET)
}

pub fn issue_token() -> String {
    TokenIssuer::new(&get_auth_config()).issue_token().expect("Failed to sign token")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response is not JSON")
    }
}

/// Runs a single request against an app configured like the real server: same extractor error handlers, and a token
/// issuer built from [`get_auth_config`].
pub async fn send_request<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = test::read_body(res).await;
    TestResponse { status, headers, body }
}

pub async fn get_request<F>(auth_token: &str, path: &str, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let mut req = TestRequest::get().uri(path);
    if !auth_token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_token}")));
    }
    send_request(req, configure).await
}

pub async fn post_request<F>(path: &str, body: serde_json::Value, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::post().uri(path).set_json(body);
    send_request(req, configure).await
}

pub fn sample_registration(registration_id: i64, name: &str, event: &str) -> Registration {
    Registration {
        id: registration_id - 1000,
        registration_id,
        leader_name: name.into(),
        leader_email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        leader_mobile: "9000000001".into(),
        leader_college: "ADCET Ashta".into(),
        leader_department: "Computer Science".into(),
        leader_year: "Third Year".into(),
        leader_city: "Sangli".into(),
        selected_event: event.into(),
        paper_presentation_dept: String::new(),
        participation_type: ParticipationType::Solo,
        team_size: 1,
        team_members: vec![],
        payment_id: "pay_P1".into(),
        order_id: "order_O1".into(),
        signature: "0".repeat(64),
        total_fee: Rupees::from(150),
        created_at: Utc.with_ymd_and_hms(2025, 1, 20, 10, 30, 0).unwrap(),
    }
}
