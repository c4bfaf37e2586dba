use std::path::Path;

use fest_common::Secret;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{helpers::sign_payment, registration_objects::RegistrationSubmission, SqliteDatabase};

pub const TEST_PAYMENT_SECRET: &str = "test_key_secret";

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A fresh database URL in the system temp directory.
pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("fest_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

pub fn test_secret() -> Secret<String> {
    Secret::new(TEST_PAYMENT_SECRET.to_string())
}

/// A complete solo submission for `event`, paid and signed with [`TEST_PAYMENT_SECRET`].
pub fn paid_submission(name: &str, email: &str, mobile: &str, event: &str, fee: i64) -> RegistrationSubmission {
    let order_id = format!("order_{}", rand::random::<u32>());
    let payment_id = format!("pay_{}", rand::random::<u32>());
    let signature = sign_payment(&order_id, &payment_id, &test_secret()).expect("test secret is valid");
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
        total_fee: Some(fee.to_string()),
        payment_id: Some(payment_id),
        order_id: Some(order_id),
        signature: Some(signature),
        ..Default::default()
    }
}
