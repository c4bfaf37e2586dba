//! Request handler definitions
//!
//! Define each route and its handler here. Anything more involved than extracting the request, calling into
//! `fest_engine` and shaping the response belongs in the engine, not in this module.
//!
//! Handlers are generic over the store, mail transport and payment gateway so that the endpoint tests can swap in
//! mocks. Actix cannot register generic handlers directly, hence the [`route!`] macro, which generates a
//! `<Name>Route<..>` service factory for each handler. Admin routes are declared with `where requires admin`, which
//! wraps them in [`AdminAuthMiddlewareFactory`](crate::middleware::AdminAuthMiddlewareFactory).
//!
//! All I/O is async. Never block a worker thread in a handler, since each worker processes its requests sequentially.
use actix_web::{
    get,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    post,
    web,
    HttpResponse,
    Responder,
};
use fest_engine::{
    admin_objects::{ExportParams, ListParams},
    notifications::MessageTransport,
    registration_objects::RegistrationSubmission,
    AdminApi,
    AdminApiError,
    RegistrationFlowApi,
    RegistrationManagement,
    RegistrationQueries,
};
use log::*;
use razorpay_tools::OrderIssuer;

use crate::{
    auth::TokenIssuer,
    data_objects::{
        DataResponse,
        JsonResponse,
        LoginRequest,
        LoginResponse,
        OrderRequest,
        OrderResponse,
        RegistrationResponse,
    },
    errors::ServerError,
};

pub const BANNER: &str = "Discovery ADCET Backend Server is running!";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AdminAuthMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body(BANNER)
}

//----------------------------------------------   Payment orders  ----------------------------------------------------
route!(create_order => Post "/order" impl OrderIssuer);
/// Opens an order with the payment gateway. The gateway's order object is relayed as-is, since the checkout widget in
/// the browser needs its id and amount.
pub async fn create_order<G: OrderIssuer>(
    body: web::Json<OrderRequest>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError> {
    let new_order = body.into_inner().validate()?;
    debug!("💻️ POST order for {} {} ({})", new_order.amount, new_order.currency, new_order.receipt);
    let order = gateway.create_order(new_order).await?;
    info!("💻️ Created payment order {}", order.id);
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

//----------------------------------------------   Registration  ----------------------------------------------------
route!(register => Post "/register" impl RegistrationManagement, MessageTransport);
/// Route handler for the registration endpoint
///
/// The submission must carry a payment proof for a completed checkout. The registration is stored only if the
/// contact has not already registered for the event and the proof checks out. A 201 is returned even when the
/// confirmation mail could not be delivered; in that case the body also carries `"notificationSent": false`.
pub async fn register<B, T>(
    body: web::Json<RegistrationSubmission>,
    api: web::Data<RegistrationFlowApi<B, T>>,
) -> Result<HttpResponse, ServerError>
where
    B: RegistrationManagement,
    T: MessageTransport,
{
    let submission = body.into_inner();
    debug!("💻️ POST register for {:?}", submission.selected_event);
    let outcome = api.register(submission).await?;
    info!("💻️ Registration #{} created", outcome.registration.registration_id);
    Ok(HttpResponse::Created().json(RegistrationResponse::from(&outcome)))
}

route!(payment_verification => Post "/payment-verification" impl RegistrationManagement, MessageTransport);
/// Checks a payment proof on its own, without registering anything. Both the gateway's field names and the form's
/// camelCase names are accepted.
pub async fn payment_verification<B, T>(
    body: web::Json<RegistrationSubmission>,
    api: web::Data<RegistrationFlowApi<B, T>>,
) -> Result<HttpResponse, ServerError>
where
    B: RegistrationManagement,
    T: MessageTransport,
{
    let proof = body.into_inner().payment_proof();
    debug!("💻️ POST payment-verification for order {}", proof.order_id);
    api.verify_signature(&proof)?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Payment verified")))
}

//----------------------------------------------   Admin  ----------------------------------------------------
#[post("/admin/login")]
pub async fn admin_login(
    body: web::Json<LoginRequest>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let password = body.into_inner().password.unwrap_or_default();
    signer.check_password(&password).map_err(|e| {
        warn!("💻️ Failed admin login attempt");
        e
    })?;
    let token = signer.issue_token()?;
    info!("💻️ Admin logged in");
    Ok(HttpResponse::Ok().json(LoginResponse::new(token)))
}

route!(admin_registrations => Get "/admin/registrations" impl RegistrationQueries where requires admin);
/// Paginated, filterable, sortable list of registrations for the dashboard.
pub async fn admin_registrations<B: RegistrationQueries>(
    query: web::Query<ListParams>,
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin registrations. {:?}", query);
    let page = api.list_registrations(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(page)))
}

route!(admin_export => Get "/admin/export" impl RegistrationQueries where requires admin);
/// Streams the matching registrations as a spreadsheet download.
pub async fn admin_export<B: RegistrationQueries>(
    query: web::Query<ExportParams>,
    api: web::Data<AdminApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin export. {:?}", query);
    let file = api.export(query.into_inner()).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(file.file_name)],
    };
    Ok(HttpResponse::Ok().content_type(file.content_type).insert_header(disposition).body(file.bytes))
}

route!(admin_stats => Get "/admin/stats" impl RegistrationQueries where requires admin);
pub async fn admin_stats<B: RegistrationQueries>(api: web::Data<AdminApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin stats");
    let stats = api.statistics().await.map_err(|e| match e {
        AdminApiError::Query(inner) => {
            error!("💻️ Could not compute statistics. {inner}");
            ServerError::BackendError("Failed to fetch statistics".into())
        },
        e => ServerError::from(e),
    })?;
    Ok(HttpResponse::Ok().json(DataResponse::new(stats)))
}

/// The `/api` fallback for paths that match no route.
pub async fn not_found() -> Result<HttpResponse, ServerError> {
    Err(ServerError::NoRecordFound("Route not found".into()))
}

/// Used as the error handler of the JSON extractor, so that malformed bodies get the usual error envelope.
pub fn json_error(err: actix_web::error::JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejected request body. {err}");
    ServerError::InvalidRequestBody(format!("Invalid request body. {err}")).into()
}

/// Same as [`json_error`], for query strings.
pub fn query_error(err: actix_web::error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejected query string. {err}");
    ServerError::InvalidRequestBody(format!("Invalid query parameters. {err}")).into()
}
