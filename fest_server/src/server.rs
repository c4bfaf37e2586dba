use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use fest_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    helpers::RetryPolicy,
    notifications::NotificationDispatcher,
    AdminApi,
    RegistrationFlowApi,
    SqliteDatabase,
};
use log::*;
use razorpay_tools::RazorpayApi;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::mailer::SmtpMailer,
    routes::{
        admin_login,
        health,
        index,
        json_error,
        not_found,
        query_error,
        AdminExportRoute,
        AdminRegistrationsRoute,
        AdminStatsRoute,
        CreateOrderRoute,
        PaymentVerificationRoute,
        RegisterRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_lazy(config.database_url.as_str(), config.db_max_connections, config.db_connect_timeout);
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
    }
    if !config.razorpay.is_configured() {
        error!("🪛️ Razorpay credentials are missing. Payment orders and registrations will fail until they are set.");
    }
    let gateway = RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let mailer = SmtpMailer::new(&config.mail);
    let hooks = create_event_hooks(&config, mailer.clone());
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db.clone(), gateway, mailer, producers)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    db.close().await;
    result
}

/// Wires up the registration event hooks. An undelivered confirmation mail gets one more attempt after the configured
/// redelivery delay, by which time a transient relay outage has usually cleared.
pub fn create_event_hooks(config: &ServerConfig, mailer: SmtpMailer) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_registration_created(|ev| {
        Box::pin(async move {
            let reg = ev.registration;
            info!(
                "🪝️ Registration #{} stored: {} for {} ({})",
                reg.registration_id, reg.leader_name, reg.selected_event, reg.total_fee
            );
        })
    });
    let policy = RetryPolicy::for_notifications().with_base_delay(config.retry.notify_base_delay);
    let dispatcher = NotificationDispatcher::new(mailer).with_policy(policy);
    let delay = config.retry.redelivery_delay;
    hooks.on_notification_failed(move |ev| {
        let dispatcher = dispatcher.clone();
        Box::pin(async move {
            let id = ev.registration.registration_id;
            warn!("🪝️ Mail for registration #{id} was not delivered ({}). Trying again in {delay:?}", ev.reason);
            tokio::time::sleep(delay).await;
            match dispatcher.notify(&ev.registration).await {
                Ok(()) => info!("🪝️ Mail for registration #{id} delivered on redelivery"),
                Err(e) => error!(
                    "🪝️ Giving up on the mail for registration #{id} to {}. Contact them manually. {e}",
                    ev.registration.leader_email
                ),
            }
        })
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: RazorpayApi,
    mailer: SmtpMailer,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let persist_policy = RetryPolicy::for_persistence().with_base_delay(config.retry.persist_base_delay);
        let notify_policy = RetryPolicy::for_notifications().with_base_delay(config.retry.notify_base_delay);
        let flow_api = RegistrationFlowApi::new(db.clone(), mailer.clone(), config.razorpay.key_secret.clone())
            .with_persist_policy(persist_policy)
            .with_notify_policy(notify_policy)
            .with_producers(producers.clone());
        let admin_api = AdminApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<RazorpayApi>::new())
            .service(RegisterRoute::<SqliteDatabase, SmtpMailer>::new())
            .service(PaymentVerificationRoute::<SqliteDatabase, SmtpMailer>::new())
            .service(admin_login)
            .service(AdminRegistrationsRoute::<SqliteDatabase>::new())
            .service(AdminExportRoute::<SqliteDatabase>::new())
            .service(AdminStatsRoute::<SqliteDatabase>::new())
            .default_service(web::to(not_found));
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fest::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(admin_api))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(jwt_signer))
            .service(health)
            .service(index)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
