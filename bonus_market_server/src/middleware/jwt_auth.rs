//! Access token middleware for the bonus market server.
//! This middleware can be placed on any route or service.
//!
//! It looks for an access token in the `auth_token` cookie, or failing that in an `Authorization: Bearer` header. If
//! the token is valid, its claims are stored in the request extensions and the request is allowed to continue.
//! Otherwise, a 401 Unauthorized response is returned.
//!
//! The [`TokenIssuer`] used to check tokens is taken from the application data.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::{JwtClaims, TokenIssuer, AUTH_COOKIE},
    errors::{AuthError, ServerError},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct JwtAuthMiddlewareFactory;

impl JwtAuthMiddlewareFactory {
    pub fn new() -> Self {
        JwtAuthMiddlewareFactory
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtAuthMiddlewareService { service: Rc::new(service) })
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
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
        match authenticate(&req) {
            Ok(claims) => {
                trace!("🔑️ Request to {} authenticated for user #{}", req.path(), claims.sub);
                req.extensions_mut().insert(claims);
                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) })
            },
            Err(e) => {
                debug!("🔑️ Unauthenticated request to {}. {e}", req.path());
                let res = req.error_response(e).map_into_right_body();
                Box::pin(async move { Ok(res) })
            },
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req.app_data::<web::Data<TokenIssuer>>().ok_or_else(|| {
        error!("🔑️ No TokenIssuer has been registered with the app. Every authenticated route will fail.");
        ServerError::ConfigurationError("No token issuer configured".into())
    })?;
    let token = req
        .cookie(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(req))
        .ok_or(ServerError::AuthenticationError(AuthError::MissingToken))?;
    let claims = issuer.verify_token(&token)?;
    Ok(claims)
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
