//! Admin access middleware.
//!
//! Wrap any route or service with this middleware to restrict it to the organisers. The request must carry a valid
//! admin token in an `Authorization: Bearer <token>` header. If it doesn't, the request is answered with a 401 and the
//! wrapped service is never called. The validated claims are stored in the request extensions.
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
    ResponseError,
};
use futures::future::{ok, Ready};
use log::*;

use crate::{
    auth::{bearer_token, TokenIssuer},
    errors::{AuthError, ServerError},
};

#[derive(Default)]
pub struct AdminAuthMiddlewareFactory;

impl AdminAuthMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AdminAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminAuthMiddlewareService { service: Rc::new(service) })
    }
}

pub struct AdminAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let claims = {
                let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
                match req.app_data::<web::Data<TokenIssuer>>() {
                    Some(issuer) => bearer_token(header).and_then(|token| issuer.validate_token(token)),
                    None => {
                        error!("🔐️ No token issuer has been registered with the app. Denying admin access.");
                        Err(AuthError::InvalidToken)
                    },
                }
            };
            match claims {
                Ok(claims) => {
                    trace!("🔐️ Admin access granted for {} {}", req.method(), req.path());
                    req.extensions_mut().insert(claims);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => {
                    debug!("🔐️ Admin access denied for {} {}. {e}", req.method(), req.path());
                    let response = ServerError::from(e).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                },
            }
        })
    }
}
