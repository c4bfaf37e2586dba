use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use fest_engine::{
    db_types::Registration,
    helpers::RetryPolicy,
    notifications::TransportError,
    registration_objects::RegistrationSubmission,
    test_utils::prepare_env::{paid_submission, test_secret},
    traits::StoreError,
    RegistrationFlowApi,
};
use serde_json::json;

use super::helpers::post_request;
use crate::{
    endpoint_tests::mocks::{MockMailer, MockRegistrationStore},
    routes::{PaymentVerificationRoute, RegisterRoute},
};

fn submission_json(submission: &RegistrationSubmission) -> serde_json::Value {
    serde_json::to_value(submission).expect("submission serializes")
}

fn configure(store: MockRegistrationStore, mailer: MockMailer) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = RegistrationFlowApi::new(store, mailer, test_secret())
            .with_persist_policy(RetryPolicy::new(3, Duration::from_millis(1)))
            .with_notify_policy(RetryPolicy::new(2, Duration::from_millis(1)));
        cfg.service(RegisterRoute::<MockRegistrationStore, MockMailer>::new())
            .service(PaymentVerificationRoute::<MockRegistrationStore, MockMailer>::new())
            .app_data(web::Data::new(api));
    }
}

fn accepting_store() -> MockRegistrationStore {
    let mut store = MockRegistrationStore::new();
    store.expect_registration_exists().returning(|_, _, _| Ok(false));
    store.expect_insert_registration().times(1).returning(|reg| Ok(Registration::from_new(1, 1001, Utc::now(), reg)));
    store
}

#[actix_web::test]
async fn register_paid_submission() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store
        .expect_registration_exists()
        .withf(|event, email, mobile| {
            event.to_string() == "robo race" && email.to_string() == "ana@example.com" && mobile.to_string() == "9000000001"
        })
        .times(1)
        .returning(|_, _, _| Ok(false));
    store.expect_insert_registration().times(1).returning(|reg| Ok(Registration::from_new(1, 1001, Utc::now(), reg)));
    let mut mailer = MockMailer::new();
    mailer.expect_send().withf(|msg| msg.to == "ana@example.com").times(1).returning(|_| Ok(()));

    let submission = paid_submission("Ana Patil", " Ana@Example.com ", "9000000001", "Robo Race", 150);
    let res = post_request("/register", submission_json(&submission), configure(store, mailer)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json(), json!({"success": true, "message": "Registration successful", "registrationId": 1001}));
}

#[actix_web::test]
async fn register_duplicate() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_exists().times(1).returning(|_, _, _| Ok(true));
    store.expect_insert_registration().never();
    let mut mailer = MockMailer::new();
    mailer.expect_send().never();

    let submission = paid_submission("Ana Patil", "ana@example.com", "9000000001", "Robo Race", 150);
    let res = post_request("/register", submission_json(&submission), configure(store, mailer)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(
        res.json(),
        json!({"success": false, "error": "User with this email or phone already registered for this event"})
    );
}

#[actix_web::test]
async fn register_with_forged_signature() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_exists().returning(|_, _, _| Ok(false));
    store.expect_insert_registration().never();
    let mut submission = paid_submission("Ana Patil", "ana@example.com", "9000000001", "Robo Race", 150);
    submission.signature = Some("ab".repeat(32));
    let res = post_request("/register", submission_json(&submission), configure(store, MockMailer::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Payment verification failed: Invalid payment signature. Registration cannot proceed without valid payment."
    );
}

#[actix_web::test]
async fn register_without_payment() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_exists().returning(|_, _, _| Ok(false));
    store.expect_insert_registration().never();
    let mut submission = paid_submission("Ana Patil", "ana@example.com", "9000000001", "Robo Race", 150);
    submission.payment_id = None;
    let res = post_request("/register", submission_json(&submission), configure(store, MockMailer::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Payment details are required. Registration cannot proceed without completing payment."
    );
}

#[actix_web::test]
async fn register_missing_contact_details() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_exists().never();
    let res = post_request(
        "/register",
        json!({"leaderName": "Ana", "selectedEvent": "Robo Race"}),
        configure(store, MockMailer::new()),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Missing required fields for registration validation");
}

#[actix_web::test]
async fn register_when_mail_is_down() {
    let _ = env_logger::try_init().ok();
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let mut mailer = MockMailer::new();
    mailer.expect_send().returning(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::SendFailed("connection refused".into()))
    });
    let submission = paid_submission("Ana Patil", "ana@example.com", "9000000001", "Robo Race", 150);
    let res = post_request("/register", submission_json(&submission), configure(accepting_store(), mailer)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let body = res.json();
    assert_eq!(body["registrationId"], 1001);
    assert_eq!(body["notificationSent"], false);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[actix_web::test]
async fn register_when_store_keeps_failing() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_exists().returning(|_, _, _| Ok(false));
    store.expect_insert_registration().times(3).returning(|_| Err(StoreError::Transient("database is locked".into())));
    let submission = paid_submission("Ana Patil", "ana@example.com", "9000000001", "Robo Race", 150);
    let res = post_request("/register", submission_json(&submission), configure(store, MockMailer::new())).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"success": false, "error": "Failed to register user"}));
}

#[actix_web::test]
async fn register_malformed_body() {
    let _ = env_logger::try_init().ok();
    let res = post_request(
        "/register",
        json!({"leaderName": ["not", "text"]}),
        configure(MockRegistrationStore::new(), MockMailer::new()),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body = res.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body."));
}

#[actix_web::test]
async fn verify_payment_with_gateway_field_names() {
    let _ = env_logger::try_init().ok();
    let submission = paid_submission("Ana Patil", "ana@example.com", "9000000001", "Robo Race", 150);
    let body = json!({
        "razorpay_order_id": submission.order_id,
        "razorpay_payment_id": submission.payment_id,
        "razorpay_signature": submission.signature,
    });
    let res = post_request("/payment-verification", body, configure(MockRegistrationStore::new(), MockMailer::new()))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"success": true, "message": "Payment verified"}));
}

#[actix_web::test]
async fn verify_payment_failures() {
    let _ = env_logger::try_init().ok();
    let body = json!({"orderId": "order_O1", "paymentId": "pay_P1"});
    let res = post_request("/payment-verification", body, configure(MockRegistrationStore::new(), MockMailer::new()))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Payment verification failed: Missing payment details. Registration requires completed payment."
    );

    let body = json!({"orderId": "order_O1", "paymentId": "pay_P1", "signature": "00".repeat(32)});
    let res = post_request("/payment-verification", body, configure(MockRegistrationStore::new(), MockMailer::new()))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
