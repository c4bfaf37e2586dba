#![allow(dead_code)]
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use fest_common::Secret;
use fest_engine::{
    helpers::{sign_payment, RetryPolicy},
    notifications::{MailMessage, MessageTransport, TransportError},
    registration_objects::RegistrationSubmission,
    RegistrationFlowApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub const PAYMENT_SECRET: &str = "integration_test_secret";

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("fest_it_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn new_database() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    db.run_migrations().await.expect("Error running migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub async fn tear_down(db: &SqliteDatabase) {
    db.close().await;
    if let Err(e) = Sqlite::drop_database(db.url()).await {
        warn!("🚀️ Could not drop {}: {e}", db.url());
    }
}

pub fn secret() -> Secret<String> {
    Secret::new(PAYMENT_SECRET.to_string())
}

/// Retries quickly so that failure paths do not slow the suite down.
pub fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::from_millis(5))
}

pub fn flow_api<T>(db: SqliteDatabase, transport: T) -> RegistrationFlowApi<SqliteDatabase, T> {
    RegistrationFlowApi::new(db, transport, secret())
        .with_persist_policy(fast_policy(3))
        .with_notify_policy(fast_policy(2))
}

pub fn paid_submission(name: &str, email: &str, mobile: &str, event: &str) -> RegistrationSubmission {
    let order_id = format!("order_{}", rand::random::<u32>());
    let payment_id = format!("pay_{}", rand::random::<u32>());
    let signature = sign_payment(&order_id, &payment_id, &secret()).expect("valid secret");
    RegistrationSubmission {
        leader_name: Some(name.into()),
        leader_email: Some(email.into()),
        leader_mobile: Some(mobile.into()),
        leader_college: Some("ADCET Ashta".into()),
        leader_department: Some("Computer Science".into()),
        leader_year: Some("Third Year".into()),
        leader_city: Some("Sangli".into()),
        selected_event: Some(event.into()),
        participation_type: Some("solo".into()),
        team_size: Some("1".into()),
        total_fee: Some("150".into()),
        payment_id: Some(payment_id),
        order_id: Some(order_id),
        signature: Some(signature),
        ..Default::default()
    }
}

/// Records every message instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageTransport for RecordingTransport {
    async fn send(&self, message: MailMessage) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// A relay that is always down.
#[derive(Clone, Default)]
pub struct UnreachableRelay {
    attempts: Arc<Mutex<u32>>,
}

impl UnreachableRelay {
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

impl MessageTransport for UnreachableRelay {
    async fn send(&self, _message: MailMessage) -> Result<(), TransportError> {
        *self.attempts.lock().unwrap() += 1;
        Err(TransportError::SendFailed("connection refused".into()))
    }
}
